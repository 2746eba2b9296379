//! Supported currencies and their display symbols.
//!
//! Amounts are stored as plain numbers; the currency code on an invoice,
//! payslip or transaction only changes how they are shown.

/// A supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
}

/// INR first: it is the fallback for unknown or missing codes.
pub const CURRENCIES: [Currency; 8] = [
    Currency { code: "INR", symbol: "₹", name: "Indian Rupee" },
    Currency { code: "USD", symbol: "$", name: "US Dollar" },
    Currency { code: "EUR", symbol: "€", name: "Euro" },
    Currency { code: "GBP", symbol: "£", name: "British Pound" },
    Currency { code: "AED", symbol: "د.إ", name: "UAE Dirham" },
    Currency { code: "SGD", symbol: "S$", name: "Singapore Dollar" },
    Currency { code: "CAD", symbol: "C$", name: "Canadian Dollar" },
    Currency { code: "AUD", symbol: "A$", name: "Australian Dollar" },
];

pub fn find(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Symbol for `code`, falling back to the rupee sign.
pub fn symbol_for(code: Option<&str>) -> &'static str {
    code.and_then(find)
        .map(|c| c.symbol)
        .unwrap_or(CURRENCIES[0].symbol)
}

/// `₹2596.00` style display with two decimals.
pub fn format_amount(amount: f64, code: Option<&str>) -> String {
    format!("{}{:.2}", symbol_for(code), amount)
}
