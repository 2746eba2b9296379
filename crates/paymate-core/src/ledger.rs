//! # Ledger
//!
//! Income/expense transactions and the running summary shown on the expense
//! tracker. Invoices marked paid and processed payslips both land here.
//!
//! ```text
//!   Invoice::mark_paid ──► Transaction { kind: Income,  category: "Invoicing" }
//!   Payslip::payout    ──► Transaction { kind: Expense, category: "Payroll"   }
//!                                   │
//!                                   ▼
//!                          LedgerSummary { income, expense, balance }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Ledger category for invoice receipts.
pub const INVOICING_CATEGORY: &str = "Invoicing";

/// Ledger category for salary payouts.
pub const PAYROLL_CATEGORY: &str = "Payroll";

// =============================================================================
// Transaction Kind / Payment Mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    #[default]
    Cash,
    Upi,
    Card,
    BankTransfer,
    Other,
}

// =============================================================================
// Transaction
// =============================================================================

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub category: String,
    pub payment_mode: PaymentMode,
    pub reference: String,
    pub description: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    /// Owner of the record (enterprise id, or the user id for solo accounts).
    pub enterprise_id: String,
    pub currency: Option<String>,
}

impl Transaction {
    /// Creates a transaction dated `date` with a fresh id and timestamp.
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        date: NaiveDate,
        category: impl Into<String>,
        enterprise_id: impl Into<String>,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            kind,
            amount,
            date,
            category: category.into(),
            payment_mode: PaymentMode::default(),
            reference: String::new(),
            description: String::new(),
            timestamp: Utc::now(),
            enterprise_id: enterprise_id.into(),
            currency: None,
        }
    }

    pub fn with_payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = mode;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency;
        self
    }

    /// Amount with sign applied: income positive, expense negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Income, expense and net balance over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

impl LedgerSummary {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = LedgerSummary::default();
        for tx in transactions {
            match tx.kind {
                TransactionKind::Income => summary.total_income += tx.amount,
                TransactionKind::Expense => summary.total_expense += tx.amount,
            }
        }
        summary.balance = summary.total_income - summary.total_expense;
        summary
    }
}

/// Keeps only transactions of `kind` (the tracker's INCOME / EXPENSE filter).
pub fn filter_by_kind(
    transactions: &[Transaction],
    kind: TransactionKind,
) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(move |tx| tx.kind == kind)
}
