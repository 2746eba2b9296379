//! # Invoice Module
//!
//! The line-item totaler and everything an invoice editor does around it.
//!
//! ## Line-Item Arithmetic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     compute_line_item                                   │
//! │                                                                         │
//! │  gross    = quantity × rate                                             │
//! │  discount = PERCENT ? gross × discount_value / 100 : discount_value     │
//! │  taxable  = gross − discount          (may go negative, not clamped)    │
//! │  tax      = taxable × tax_rate / 100                                    │
//! │  amount   = taxable + tax                                               │
//! │                                                                         │
//! │  Example: 2 × 100, 10% off, 18% tax                                     │
//! │    gross 200 → discount 20 → taxable 180 → tax 32.4 → amount 212.4     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why f64 and not integer cents?
//! Invoices are mirrored documents whose figures are plain JSON numbers, and
//! the totals must match what every other reader of those documents
//! computes. The arithmetic therefore runs on `f64` with no rounding and no
//! input checks: negative or NaN input yields negative or NaN output. Callers
//! that want to reject such input use [`crate::validation`] first.
//!
//! ## Recompute, Never Patch
//! Every mutation of the item list ends in [`Invoice::recalculate`], which
//! recomputes each item and then re-sums the invoice from scratch.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::ledger::{PaymentMode, Transaction, TransactionKind, INVOICING_CATEGORY};
use crate::{DEFAULT_INVOICE_SEQUENCE, DEFAULT_PAYMENT_TERMS, DEFAULT_TAX_RATE, INVOICE_DUE_DAYS};

// =============================================================================
// Discount Type
// =============================================================================

/// How a line item's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `discount_value` is a percentage of `quantity × rate`.
    #[default]
    Percent,
    /// `discount_value` is an absolute amount, regardless of the gross.
    Fixed,
}

// =============================================================================
// Line-Item Totaler
// =============================================================================

/// Derived figures for one line item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemTotals {
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub amount: f64,
}

/// Computes discount, tax and net amount for a single line.
///
/// ## Example
/// ```rust
/// use paymate_core::invoice::{compute_line_item, DiscountType};
///
/// let totals = compute_line_item(1.0, 500.0, 50.0, DiscountType::Fixed, 0.0);
/// assert_eq!(totals.discount_amount, 50.0);
/// assert_eq!(totals.amount, 450.0);
/// ```
pub fn compute_line_item(
    quantity: f64,
    rate: f64,
    discount_value: f64,
    discount_type: DiscountType,
    tax_rate: f64,
) -> LineItemTotals {
    let gross = quantity * rate;
    let discount_amount = match discount_type {
        DiscountType::Percent => gross * discount_value / 100.0,
        DiscountType::Fixed => discount_value,
    };
    let taxable = gross - discount_amount;
    let tax_amount = taxable * tax_rate / 100.0;

    LineItemTotals {
        discount_amount,
        tax_amount,
        amount: taxable + tax_amount,
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A reusable product/service with default line-item values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub default_rate: f64,
    pub default_tax_rate: f64,
    pub default_discount_value: f64,
    pub default_discount_type: DiscountType,
    pub default_hsn_code: Option<String>,
    /// Owner of the catalog entry.
    pub enterprise_id: String,
}

impl CatalogItem {
    /// Case-insensitive match on name or category (the catalog search box).
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.category.to_lowercase().contains(&term)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A single billable row on an invoice.
///
/// The three derived fields are stored alongside the inputs because the
/// document carries them; [`LineItem::recompute`] is the only writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub hsn_code: Option<String>,
    pub quantity: f64,
    pub rate: f64,
    pub tax_rate: f64,
    pub discount_value: f64,
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub amount: f64,
}

impl LineItem {
    /// Creates a line with the given inputs and computes its totals.
    pub fn new(
        description: impl Into<String>,
        quantity: f64,
        rate: f64,
        discount_value: f64,
        discount_type: DiscountType,
        tax_rate: f64,
    ) -> Self {
        let mut item = LineItem {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            hsn_code: None,
            quantity,
            rate,
            tax_rate,
            discount_value,
            discount_type,
            discount_amount: 0.0,
            tax_amount: 0.0,
            amount: 0.0,
        };
        item.recompute();
        item
    }

    /// An empty row as the editor adds it: qty 1, rate 0, default tax, no discount.
    pub fn blank() -> Self {
        LineItem::new("", 1.0, 0.0, 0.0, DiscountType::Percent, DEFAULT_TAX_RATE)
    }

    /// A row pre-filled from a catalog entry, quantity 1.
    pub fn from_catalog(catalog: &CatalogItem) -> Self {
        let mut item = LineItem::new(
            catalog.name.clone(),
            1.0,
            catalog.default_rate,
            catalog.default_discount_value,
            catalog.default_discount_type,
            catalog.default_tax_rate,
        );
        item.hsn_code = catalog.default_hsn_code.clone();
        item
    }

    /// `quantity × rate`, before discount and tax.
    #[inline]
    pub fn gross(&self) -> f64 {
        self.quantity * self.rate
    }

    /// Returns the derived figures for the current inputs.
    pub fn totals(&self) -> LineItemTotals {
        compute_line_item(
            self.quantity,
            self.rate,
            self.discount_value,
            self.discount_type,
            self.tax_rate,
        )
    }

    /// Rewrites the derived fields from the inputs.
    pub fn recompute(&mut self) {
        let totals = self.totals();
        self.discount_amount = totals.discount_amount;
        self.tax_amount = totals.tax_amount;
        self.amount = totals.amount;
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Invoice-level sums.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    /// Σ quantity × rate
    pub subtotal: f64,
    /// Σ discount_amount
    pub discount_amount: f64,
    /// Σ tax_amount
    pub tax_amount: f64,
    /// Σ amount
    pub total: f64,
}

/// Sums the four invoice figures over `items`.
///
/// Each item's totals are computed from its inputs here rather than read
/// from its stored fields, so a stale item cannot leak into the sums.
pub fn aggregate_invoice(items: &[LineItem]) -> InvoiceTotals {
    items.iter().fold(InvoiceTotals::default(), |acc, item| {
        let line = item.totals();
        InvoiceTotals {
            subtotal: acc.subtotal + item.gross(),
            discount_amount: acc.discount_amount + line.discount_amount,
            tax_amount: acc.tax_amount + line.tax_amount,
            total: acc.total + line.amount,
        }
    })
}

// =============================================================================
// Invoice Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "DRAFT"),
            InvoiceStatus::Sent => write!(f, "SENT"),
            InvoiceStatus::Paid => write!(f, "PAID"),
            InvoiceStatus::Overdue => write!(f, "OVERDUE"),
        }
    }
}

// =============================================================================
// Payment Details
// =============================================================================

/// Where the client should pay. Copied from the issuer's profile defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub account_holder: String,
    pub upi_id: String,
}

// =============================================================================
// Invoice
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub client_name: String,
    pub client_email: String,
    pub client_address: String,
    #[serde(default)]
    pub client_gst_number: Option<String>,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: InvoiceStatus,
    pub enterprise_id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payment: PaymentDetails,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl Invoice {
    /// Creates a draft dated `date`, due 30 days later, with one blank row.
    pub fn new_draft(
        invoice_number: impl Into<String>,
        enterprise_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let mut invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number: invoice_number.into(),
            date,
            due_date: date + Duration::days(INVOICE_DUE_DAYS),
            client_name: String::new(),
            client_email: String::new(),
            client_address: String::new(),
            client_gst_number: None,
            items: vec![LineItem::blank()],
            subtotal: 0.0,
            tax_amount: 0.0,
            discount_amount: 0.0,
            total: 0.0,
            notes: None,
            status: InvoiceStatus::Draft,
            enterprise_id: enterprise_id.into(),
            timestamp: Utc::now(),
            payment: PaymentDetails::default(),
            terms: Some(DEFAULT_PAYMENT_TERMS.to_string()),
            currency: None,
        };
        invoice.recalculate();
        invoice
    }

    /// Returns the current sums without touching the stored fields.
    pub fn totals(&self) -> InvoiceTotals {
        aggregate_invoice(&self.items)
    }

    /// Recomputes every item and then the invoice sums.
    pub fn recalculate(&mut self) {
        for item in &mut self.items {
            item.recompute();
        }
        let totals = aggregate_invoice(&self.items);
        self.subtotal = totals.subtotal;
        self.discount_amount = totals.discount_amount;
        self.tax_amount = totals.tax_amount;
        self.total = totals.total;
    }

    /// Appends a blank row. Returns its id.
    pub fn add_blank_item(&mut self) -> String {
        self.push_item(LineItem::blank())
    }

    /// Appends a row pre-filled from the catalog. Returns its id.
    pub fn add_catalog_item(&mut self, catalog: &CatalogItem) -> String {
        self.push_item(LineItem::from_catalog(catalog))
    }

    /// Appends an arbitrary row. Returns its id.
    pub fn push_item(&mut self, item: LineItem) -> String {
        let id = item.id.clone();
        self.items.push(item);
        self.recalculate();
        id
    }

    /// Edits one row in place, then recomputes the whole invoice.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use paymate_core::invoice::Invoice;
    ///
    /// let mut inv = Invoice::new_draft("INV-1001", "ent-1", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    /// let id = inv.items[0].id.clone();
    /// inv.update_item(&id, |item| {
    ///     item.quantity = 2.0;
    ///     item.rate = 100.0;
    /// }).unwrap();
    /// assert_eq!(inv.subtotal, 200.0);
    /// ```
    pub fn update_item<F>(&mut self, item_id: &str, edit: F) -> CoreResult<()>
    where
        F: FnOnce(&mut LineItem),
    {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| CoreError::LineItemNotFound(item_id.to_string()))?;
        edit(item);
        self.recalculate();
        Ok(())
    }

    /// Removes one row, then recomputes.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<LineItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| CoreError::LineItemNotFound(item_id.to_string()))?;
        let removed = self.items.remove(index);
        self.recalculate();
        Ok(removed)
    }

    /// Marks the invoice paid and returns the income entry for the ledger.
    ///
    /// ## Errors
    /// `InvalidStatus` if the invoice is already paid, so a receipt is never
    /// booked twice.
    pub fn mark_paid(&mut self, paid_on: NaiveDate) -> CoreResult<Transaction> {
        if self.status == InvoiceStatus::Paid {
            return Err(CoreError::InvalidStatus {
                entity: "Invoice".to_string(),
                id: self.invoice_number.clone(),
                status: self.status.to_string(),
            });
        }

        self.recalculate();
        self.status = InvoiceStatus::Paid;

        Ok(Transaction::new(
            TransactionKind::Income,
            self.total,
            paid_on,
            INVOICING_CATEGORY,
            self.enterprise_id.clone(),
        )
        .with_payment_mode(PaymentMode::BankTransfer)
        .with_reference(self.invoice_number.clone())
        .with_description(format!(
            "Payment received for Invoice: {} ({})",
            self.invoice_number, self.client_name
        ))
        .with_currency(self.currency.clone()))
    }

    /// True when unpaid and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != InvoiceStatus::Paid && today > self.due_date
    }

    /// Case-insensitive match on client name or invoice number.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.client_name.to_lowercase().contains(&term)
            || self.invoice_number.to_lowercase().contains(&term)
    }
}

// =============================================================================
// Invoice Numbering
// =============================================================================

/// `{prefix}{sequence}` invoice numbers, e.g. `INV-2024-1001`.
///
/// Issuing a number consumes it; the caller persists `next_sequence` back to
/// the issuer's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceNumbering {
    pub prefix: String,
    pub next_sequence: u32,
}

impl InvoiceNumbering {
    pub fn new(prefix: impl Into<String>, next_sequence: u32) -> Self {
        InvoiceNumbering {
            prefix: prefix.into(),
            next_sequence,
        }
    }

    /// `INV-{year}-` starting at 1001.
    pub fn default_for(date: NaiveDate) -> Self {
        InvoiceNumbering::new(format!("INV-{}-", date.year()), DEFAULT_INVOICE_SEQUENCE)
    }

    /// Fills in whichever of prefix / sequence the profile left unset.
    pub fn from_profile(prefix: Option<&str>, next_sequence: Option<u32>, date: NaiveDate) -> Self {
        let defaults = InvoiceNumbering::default_for(date);
        InvoiceNumbering {
            prefix: prefix
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.prefix),
            next_sequence: next_sequence.unwrap_or(defaults.next_sequence),
        }
    }

    /// The number the next call to [`issue`](Self::issue) will return.
    pub fn peek(&self) -> String {
        format!("{}{}", self.prefix, self.next_sequence)
    }

    /// Returns the next number and advances the sequence.
    pub fn issue(&mut self) -> String {
        let number = self.peek();
        self.next_sequence += 1;
        number
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_percent_discount_with_tax() {
        let totals = compute_line_item(2.0, 100.0, 10.0, DiscountType::Percent, 18.0);
        assert_close(totals.discount_amount, 20.0);
        assert_close(totals.tax_amount, 32.4);
        assert_close(totals.amount, 212.4);
    }

    #[test]
    fn test_fixed_discount_without_tax() {
        let totals = compute_line_item(1.0, 500.0, 50.0, DiscountType::Fixed, 0.0);
        assert_eq!(totals.discount_amount, 50.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.amount, 450.0);
    }

    #[test]
    fn test_fixed_discount_ignores_gross() {
        for (qty, rate) in [(1.0, 10.0), (3.0, 99.5), (0.0, 0.0), (100.0, 1_000.0)] {
            let totals = compute_line_item(qty, rate, 25.0, DiscountType::Fixed, 5.0);
            assert_eq!(totals.discount_amount, 25.0);
        }
    }

    #[test]
    fn test_amount_identity_holds_exactly() {
        let quantities = [0.0, 1.0, 2.5, 7.0, 1_000.0];
        let rates = [0.0, 0.1, 99.99, 1_250.0];
        let tax_rates = [0.0, 5.0, 12.0, 18.0, 28.0, 100.0];
        let discounts = [0.0, 3.0, 10.0, 50.0, 150.0];

        for &q in &quantities {
            for &r in &rates {
                for &t in &tax_rates {
                    for &d in &discounts {
                        for kind in [DiscountType::Percent, DiscountType::Fixed] {
                            let totals = compute_line_item(q, r, d, kind, t);
                            let expected_discount = match kind {
                                DiscountType::Percent => q * r * d / 100.0,
                                DiscountType::Fixed => d,
                            };
                            assert_eq!(totals.discount_amount, expected_discount);
                            assert_eq!(
                                totals.amount,
                                q * r - totals.discount_amount + totals.tax_amount
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_discount_larger_than_gross_goes_negative() {
        let totals = compute_line_item(1.0, 10.0, 50.0, DiscountType::Fixed, 10.0);
        assert_eq!(totals.discount_amount, 50.0);
        assert_eq!(totals.tax_amount, -4.0);
        assert_eq!(totals.amount, -44.0);
    }

    #[test]
    fn test_nan_input_propagates() {
        let totals = compute_line_item(f64::NAN, 10.0, 0.0, DiscountType::Percent, 18.0);
        assert!(totals.amount.is_nan());
    }

    #[test]
    fn test_aggregate_sums_all_fields() {
        let items = vec![
            LineItem::new("Design", 2.0, 100.0, 10.0, DiscountType::Percent, 18.0),
            LineItem::new("Hosting", 1.0, 500.0, 50.0, DiscountType::Fixed, 0.0),
        ];
        let totals = aggregate_invoice(&items);
        assert_close(totals.subtotal, 700.0);
        assert_close(totals.discount_amount, 70.0);
        assert_close(totals.tax_amount, 32.4);
        assert_close(totals.total, 662.4);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let items = vec![
            LineItem::new("A", 3.0, 19.99, 5.0, DiscountType::Percent, 12.0),
            LineItem::new("B", 1.0, 1_000.0, 100.0, DiscountType::Fixed, 18.0),
            LineItem::new("C", 12.0, 7.5, 0.0, DiscountType::Percent, 5.0),
            LineItem::new("D", 0.5, 240.0, 2.5, DiscountType::Percent, 28.0),
        ];
        let forward = aggregate_invoice(&items);

        let mut reversed = items.clone();
        reversed.reverse();
        let backward = aggregate_invoice(&reversed);

        let mut rotated = items.clone();
        rotated.rotate_left(2);
        let shifted = aggregate_invoice(&rotated);

        for other in [backward, shifted] {
            assert_close(forward.subtotal, other.subtotal);
            assert_close(forward.discount_amount, other.discount_amount);
            assert_close(forward.tax_amount, other.tax_amount);
            assert_close(forward.total, other.total);
        }
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        assert_eq!(aggregate_invoice(&[]), InvoiceTotals::default());
    }

    #[test]
    fn test_recalculate_is_idempotent() {
        let mut inv = Invoice::new_draft("INV-2024-1001", "ent-1", jan_1());
        inv.push_item(LineItem::new("A", 3.0, 19.99, 5.0, DiscountType::Percent, 12.0));
        inv.recalculate();
        let first = (inv.subtotal, inv.discount_amount, inv.tax_amount, inv.total);
        inv.recalculate();
        let second = (inv.subtotal, inv.discount_amount, inv.tax_amount, inv.total);
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_draft_defaults() {
        let inv = Invoice::new_draft("INV-2024-1001", "ent-1", jan_1());
        assert_eq!(inv.status, InvoiceStatus::Draft);
        assert_eq!(inv.due_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(inv.items.len(), 1);
        assert_eq!(inv.items[0].quantity, 1.0);
        assert_eq!(inv.items[0].tax_rate, DEFAULT_TAX_RATE);
        assert_eq!(inv.total, 0.0);
    }

    #[test]
    fn test_update_and_remove_recompute_totals() {
        let mut inv = Invoice::new_draft("INV-2024-1001", "ent-1", jan_1());
        let first = inv.items[0].id.clone();
        inv.update_item(&first, |item| {
            item.quantity = 2.0;
            item.rate = 100.0;
            item.discount_value = 10.0;
        })
        .unwrap();
        assert_close(inv.total, 212.4);

        let second = inv.push_item(LineItem::new("Fee", 1.0, 500.0, 50.0, DiscountType::Fixed, 0.0));
        assert_close(inv.total, 662.4);

        inv.remove_item(&second).unwrap();
        assert_close(inv.total, 212.4);

        assert!(matches!(
            inv.remove_item("missing"),
            Err(CoreError::LineItemNotFound(_))
        ));
    }

    #[test]
    fn test_add_catalog_item_uses_defaults() {
        let catalog = CatalogItem {
            id: "cat-1".to_string(),
            name: "Consulting Hour".to_string(),
            category: "Services".to_string(),
            default_rate: 1500.0,
            default_tax_rate: 18.0,
            default_discount_value: 100.0,
            default_discount_type: DiscountType::Fixed,
            default_hsn_code: Some("998311".to_string()),
            enterprise_id: "ent-1".to_string(),
        };
        assert!(catalog.matches("consult"));
        assert!(catalog.matches("SERVICES"));

        let mut inv = Invoice::new_draft("INV-2024-1001", "ent-1", jan_1());
        let id = inv.add_catalog_item(&catalog);
        let item = inv.items.iter().find(|i| i.id == id).unwrap();
        assert_eq!(item.description, "Consulting Hour");
        assert_eq!(item.hsn_code.as_deref(), Some("998311"));
        assert_close(item.amount, 1652.0);
        assert_close(inv.total, 1652.0);
    }

    #[test]
    fn test_mark_paid_books_income_once() {
        let mut inv = Invoice::new_draft("INV-2024-1001", "ent-1", jan_1());
        inv.client_name = "Acme".to_string();
        let id = inv.items[0].id.clone();
        inv.update_item(&id, |item| item.rate = 1000.0).unwrap();

        let tx = inv.mark_paid(jan_1()).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.category, INVOICING_CATEGORY);
        assert_eq!(tx.reference, "INV-2024-1001");
        assert_close(tx.amount, 1180.0);
        assert!(tx.description.contains("Acme"));

        assert!(matches!(
            inv.mark_paid(jan_1()),
            Err(CoreError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_overdue() {
        let inv = Invoice::new_draft("INV-2024-1001", "ent-1", jan_1());
        assert!(!inv.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(inv.is_overdue(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }

    #[test]
    fn test_numbering_issue_and_defaults() {
        let mut numbering = InvoiceNumbering::default_for(jan_1());
        assert_eq!(numbering.peek(), "INV-2024-1001");
        assert_eq!(numbering.issue(), "INV-2024-1001");
        assert_eq!(numbering.issue(), "INV-2024-1002");
        assert_eq!(numbering.next_sequence, 1003);

        let custom = InvoiceNumbering::from_profile(Some("ACME/"), None, jan_1());
        assert_eq!(custom.peek(), "ACME/1001");

        let empty_prefix = InvoiceNumbering::from_profile(Some(""), Some(42), jan_1());
        assert_eq!(empty_prefix.peek(), "INV-2024-42");
    }

    #[test]
    fn test_invoice_json_shape() {
        let inv = Invoice::new_draft("INV-2024-1001", "ent-1", jan_1());
        let json = serde_json::to_value(&inv).unwrap();
        assert_eq!(json["invoiceNumber"], "INV-2024-1001");
        assert_eq!(json["status"], "DRAFT");
        assert_eq!(json["items"][0]["discountType"], "PERCENT");
        // payment details are flattened onto the invoice document
        assert!(json.get("bankName").is_some());

        let back: Invoice = serde_json::from_value(json).unwrap();
        assert_eq!(back, inv);
    }
}
