//! # Invoice Repository
//!
//! Draft creation with numbering, saves with full recompute, and mark-paid.
//!
//! ## Draft Lifecycle
//! ```text
//! create_draft(profile)            save(invoice)             mark_paid(id)
//!      │                                │                          │
//!      │ number = prefix + seq          │ recalculate totals       │ status = PAID
//!      │ profile.seq += 1 (stored)      │ store invoice            │ store invoice
//!      │ draft NOT stored               │                          │ store INCOME tx
//!      ▼                                ▼                          ▼
//!   Invoice (DRAFT) ─────────────► invoices/{id} ────────────► transactions/{id}
//! ```
//!
//! A draft that is never saved still consumes its number.

use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::stream::BoxStream;
use paymate_core::export::to_csv;
use paymate_core::invoice::Invoice;
use paymate_core::ledger::Transaction;
use paymate_core::types::UserProfile;
use paymate_core::validation::{validate_invoice_number, validate_line_item};
use paymate_core::CoreError;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::store::{Collection, DocumentStore};

/// Currency stamped on drafts when the profile has none.
const FALLBACK_CURRENCY: &str = "INR";

#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    invoices: Collection<Invoice>,
    profiles: Collection<UserProfile>,
    transactions: Collection<Transaction>,
}

impl InvoiceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        InvoiceRepository {
            invoices: Collection::new(Arc::clone(&store)),
            profiles: Collection::new(Arc::clone(&store)),
            transactions: Collection::new(store),
        }
    }

    /// Starts a new draft for `profile_id`, issuing the next invoice number
    /// and storing the advanced sequence on the profile.
    ///
    /// The draft carries the profile's payment details, terms and currency.
    /// It is returned unsaved; call [`save`](Self::save) to keep it.
    pub async fn create_draft(&self, profile_id: &str, today: NaiveDate) -> DbResult<Invoice> {
        let mut profile = self.profiles.require(profile_id).await?;

        let mut numbering = profile.invoice_numbering(today);
        let number = numbering.issue();

        let mut draft = Invoice::new_draft(number, profile.owner_id(), today);
        draft.currency = Some(
            profile
                .default_currency
                .clone()
                .unwrap_or_else(|| FALLBACK_CURRENCY.to_string()),
        );
        if let Some(payment) = &profile.default_payment {
            draft.payment = payment.clone();
        }
        if draft.payment.account_holder.is_empty() {
            draft.payment.account_holder = profile.name.clone();
        }
        if let Some(terms) = profile.default_terms.as_ref().filter(|t| !t.is_empty()) {
            draft.terms = Some(terms.clone());
        }

        // Only the sequence is kept; an unset prefix follows the draft's year.
        profile.next_invoice_sequence = Some(numbering.next_sequence);
        self.profiles.put(&profile).await?;

        info!(
            number = %draft.invoice_number,
            owner = %draft.enterprise_id,
            "Created invoice draft"
        );
        Ok(draft)
    }

    /// Recomputes every derived figure, then stores the invoice.
    pub async fn save(&self, invoice: &mut Invoice) -> DbResult<()> {
        invoice.recalculate();
        debug!(
            number = %invoice.invoice_number,
            total = invoice.total,
            "Saving invoice"
        );
        self.invoices.put(invoice).await
    }

    /// Like [`save`](Self::save), but first rejects a malformed number or
    /// any line item with a blank description or out-of-range figure.
    ///
    /// ## Errors
    /// - `Core(Validation)` naming the first offending field
    pub async fn save_validated(&self, invoice: &mut Invoice) -> DbResult<()> {
        validate_invoice_number(&invoice.invoice_number).map_err(CoreError::from)?;
        for item in &invoice.items {
            validate_line_item(item).map_err(CoreError::from)?;
        }
        self.save(invoice).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Invoice>> {
        self.invoices.get(id).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        self.invoices.delete(id).await
    }

    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<Invoice>> {
        self.invoices.list(owner_id).await
    }

    pub fn subscribe(&self, owner_id: &str) -> BoxStream<'static, DbResult<Vec<Invoice>>> {
        self.invoices.subscribe(owner_id)
    }

    /// Invoices whose client name or number contains `term`.
    pub async fn search(&self, owner_id: &str, term: &str) -> DbResult<Vec<Invoice>> {
        let all = self.list(owner_id).await?;
        Ok(all.into_iter().filter(|inv| inv.matches(term)).collect())
    }

    /// Unpaid invoices past their due date.
    pub async fn overdue(&self, owner_id: &str, today: NaiveDate) -> DbResult<Vec<Invoice>> {
        let all = self.list(owner_id).await?;
        Ok(all.into_iter().filter(|inv| inv.is_overdue(today)).collect())
    }

    /// Marks the invoice paid and books the receipt in the ledger.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown id
    /// - `Core(InvalidStatus)` if it is already paid
    pub async fn mark_paid(&self, id: &str, paid_on: NaiveDate) -> DbResult<(Invoice, Transaction)> {
        let mut invoice = self.invoices.require(id).await?;
        let receipt = invoice.mark_paid(paid_on)?;

        self.invoices.put(&invoice).await?;
        self.transactions.put(&receipt).await?;

        info!(
            number = %invoice.invoice_number,
            amount = receipt.amount,
            "Invoice marked paid"
        );
        Ok((invoice, receipt))
    }

    /// The owner's invoices as CSV, `None` when there are none.
    ///
    /// Line items are written as a JSON array in the `items` column.
    pub async fn export_csv(&self, owner_id: &str) -> DbResult<Option<String>> {
        let all = self.list(owner_id).await?;
        Ok(to_csv(&all)?)
    }
}
