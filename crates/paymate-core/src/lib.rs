//! # paymate-core: Pure Business Logic for PayMate
//!
//! Invoice, payroll, leave and ledger rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PayMate Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front end (web forms)                        │   │
//! │  │   Invoice Maker ──► Payroll Desk ──► Leave Form ──► Ledger      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ paymate-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────┐ │   │
//! │  │  │ invoice  │ │ payroll  │ │  leave   │ │  ledger  │ │export │ │   │
//! │  │  │ LineItem │ │ Payslip  │ │ Request  │ │   Tx     │ │  CSV  │ │   │
//! │  │  │ Totals   │ │ PayPeriod│ │ Balance  │ │ Summary  │ │       │ │   │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └──────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 paymate-db (Document Store)                     │   │
//! │  │        SQLite documents, subscriptions, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`invoice`] - Line items, invoice totals, numbering, mark-paid
//! - [`payroll`] - Salary structures, pay periods, payslips
//! - [`leave`] - Leave requests, balances, LOP derivation
//! - [`ledger`] - Income/expense transactions and summaries
//! - [`attendance`] - Check-in records and the holiday calendar
//! - [`types`] - Profiles, team members, expense claims
//! - [`export`] - CSV text generation
//! - [`currency`] - Currency symbols
//! - [`validation`] - Form input checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: persistence lives in `paymate-db`
//! 3. **Float Money**: amounts are `f64`, unrounded; only LOP is rounded to a
//!    whole unit
//! 4. **Total Arithmetic**: line-item and invoice math never fails; validation
//!    is a separate, opt-in step
//!
//! ## Example Usage
//!
//! ```rust
//! use paymate_core::invoice::{compute_line_item, DiscountType};
//!
//! // 2 × 1500, 10% off, 18% GST
//! let totals = compute_line_item(2.0, 1500.0, 10.0, DiscountType::Percent, 18.0);
//!
//! assert_eq!(totals.discount_amount, 300.0);
//! assert_eq!(totals.tax_amount, 486.0);
//! assert_eq!(totals.amount, 3186.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod attendance;
pub mod currency;
pub mod error;
pub mod export;
pub mod invoice;
pub mod leave;
pub mod ledger;
pub mod payroll;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use attendance::{AttendanceRecord, Holiday};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{aggregate_invoice, compute_line_item, Invoice, InvoiceTotals, LineItem};
pub use leave::{lop_days_for_period, LeaveBalance, LeaveRequest};
pub use ledger::{LedgerSummary, Transaction, TransactionKind};
pub use payroll::{compute_payslip, PayPeriod, Payslip, PayslipFigures, SalaryStructure};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// First sequence number for a profile that has never issued an invoice.
pub const DEFAULT_INVOICE_SEQUENCE: u32 = 1001;

/// Tax rate pre-filled on a new line item (GST, percent).
pub const DEFAULT_TAX_RATE: f64 = 18.0;

/// Days between invoice date and due date on a new draft.
pub const INVOICE_DUE_DAYS: i64 = 30;

/// Terms printed on a new draft when the profile has none.
pub const DEFAULT_PAYMENT_TERMS: &str = "Payment is expected within 30 days.";

/// Longest line-item description accepted by validation.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Longest invoice number accepted by validation.
pub const MAX_INVOICE_NUMBER_LENGTH: usize = 40;
