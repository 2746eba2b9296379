//! # Repository Module
//!
//! Typed operations over the document store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                                 │
//! │       │  db.invoices().mark_paid(id, today)                             │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                      │
//! │  ├── load invoice          (Collection<Invoice>)                        │
//! │  ├── Invoice::mark_paid    (paymate-core, pure)                         │
//! │  ├── store invoice                                                      │
//! │  └── store income entry    (Collection<Transaction>)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dyn DocumentStore (SQLite or memory)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories hold no state beyond the store handle and are cheap to
//! clone. Multi-document operations are not atomic: each write lands on its
//! own, last writer wins.
//!
//! ## Available Repositories
//!
//! - [`InvoiceRepository`] - Drafts, numbering, saves, mark-paid
//! - [`PayrollRepository`] - Payslip processing, monthly payout
//! - [`LeaveRepository`] - Submission, approval, LOP days
//! - [`LedgerRepository`] - Transactions and summaries
//! - [`ProfileRepository`] - Profiles, default-profile synthesis
//! - [`AttendanceRepository`] - Daily check-in and check-out

pub mod attendance;
pub mod invoice;
pub mod leave;
pub mod ledger;
pub mod payroll;
pub mod profile;

use std::sync::Arc;

use paymate_core::attendance::Holiday;
use paymate_core::invoice::CatalogItem;
use paymate_core::types::{ExpenseClaim, TeamMember};

use crate::store::{Collection, DocumentStore, MemoryDocumentStore};

pub use attendance::AttendanceRepository;
pub use invoice::InvoiceRepository;
pub use leave::LeaveRepository;
pub use ledger::LedgerRepository;
pub use payroll::PayrollRepository;
pub use profile::ProfileRepository;

/// Every repository over one store.
#[derive(Debug, Clone)]
pub struct Repositories {
    store: Arc<dyn DocumentStore>,
}

impl Repositories {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Repositories { store }
    }

    /// Repositories over a fresh [`MemoryDocumentStore`].
    pub fn in_memory() -> Self {
        Repositories::new(Arc::new(MemoryDocumentStore::default()))
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.store())
    }

    pub fn payroll(&self) -> PayrollRepository {
        PayrollRepository::new(self.store())
    }

    pub fn leave(&self) -> LeaveRepository {
        LeaveRepository::new(self.store())
    }

    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.store())
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.store())
    }

    pub fn attendance(&self) -> AttendanceRepository {
        AttendanceRepository::new(self.store())
    }

    /// Plain collections with no extra rules.
    pub fn team(&self) -> Collection<TeamMember> {
        Collection::new(self.store())
    }

    pub fn claims(&self) -> Collection<ExpenseClaim> {
        Collection::new(self.store())
    }

    pub fn catalog(&self) -> Collection<CatalogItem> {
        Collection::new(self.store())
    }

    pub fn holidays(&self) -> Collection<Holiday> {
        Collection::new(self.store())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use futures_util::StreamExt;
    use paymate_core::leave::{LeaveRequest, LeaveStatus};
    use paymate_core::payroll::PayPeriod;
    use paymate_core::types::{EnterpriseRole, MemberStatus};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    async fn month_end_close(repos: Repositories) {
        let owner = repos.profiles().ensure("ent-1", Some("Studio"), None).await.unwrap();
        let mut summaries = repos.ledger().subscribe_summary(owner.owner_id());
        assert_eq!(summaries.next().await.unwrap().unwrap().balance, 0.0);

        let mut invoice = repos.invoices().create_draft("ent-1", d(1)).await.unwrap();
        invoice.client_name = "Acme".to_string();
        let row = invoice.items[0].id.clone();
        invoice
            .update_item(&row, |item| {
                item.quantity = 1.0;
                item.rate = 100000.0;
                item.tax_rate = 0.0;
            })
            .unwrap();
        repos.invoices().save(&mut invoice).await.unwrap();
        repos.invoices().mark_paid(&invoice.id, d(20)).await.unwrap();

        let member = TeamMember {
            id: "m1".to_string(),
            name: "Asha".to_string(),
            role: "Designer".to_string(),
            email: "asha@example.com".to_string(),
            enterprise_role: EnterpriseRole::Staff,
            status: MemberStatus::Active,
            enterprise_id: "ent-1".to_string(),
            salary_structure: None,
        };
        repos.team().put(&member).await.unwrap();

        let leave = LeaveRequest::new("m1", "ent-1", "Medical / Sick Leave", d(3), d(3), "flu").unwrap();
        let leave = repos.leave().submit(leave).await.unwrap();
        repos.leave().set_status(&leave.id, LeaveStatus::Approved).await.unwrap();

        let june = PayPeriod::new(2024, 6).unwrap();
        let run = repos.payroll().process(&member, june, d(30), None).await.unwrap();
        assert_eq!(run.payslip.lop_days, 1);

        let summary = repos.ledger().summary("ent-1").await.unwrap();
        assert_eq!(summary.total_income, 100000.0);
        assert_eq!(summary.total_expense, run.payslip.net_pay);
        assert_eq!(summary.balance, 100000.0 - run.payslip.net_pay);

        // The live summary has caught up with both ledger writes.
        let mut latest = None;
        while latest != Some(summary) {
            latest = Some(summaries.next().await.unwrap().unwrap());
        }
    }

    #[tokio::test]
    async fn test_month_end_close_in_memory() {
        month_end_close(Repositories::in_memory()).await;
    }

    #[tokio::test]
    async fn test_month_end_close_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        month_end_close(db.repositories()).await;
    }

    async fn calendar_and_claims(repos: Repositories) {
        use paymate_core::attendance::{split_calendar, HolidayKind};
        use paymate_core::types::{ClaimCategory, ClaimStatus};

        let holidays = repos.holidays();
        holidays
            .put(&Holiday::new("Eid", d(17), HolidayKind::Public, "ent-1"))
            .await
            .unwrap();
        holidays
            .put(&Holiday::new("Offsite", d(2), HolidayKind::Institutional, "ent-2"))
            .await
            .unwrap();

        let ours = holidays.list("ent-1").await.unwrap();
        let (upcoming, past) = split_calendar(&ours, "", d(10));
        assert_eq!(upcoming.len(), 1);
        assert!(past.is_empty());

        let claim = ExpenseClaim {
            id: "c1".to_string(),
            user_id: "uid-7".to_string(),
            user_name: "Kiran".to_string(),
            category: ClaimCategory::Internet,
            amount: 999.0,
            status: ClaimStatus::Pending,
            date: d(5),
            description: "Router".to_string(),
            receipt: None,
            enterprise_id: None,
        };
        repos.claims().put(&claim).await.unwrap();
        assert_eq!(repos.claims().list("uid-7").await.unwrap(), vec![claim]);
        assert!(repos.claims().list("ent-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_calendar_and_claims_in_memory() {
        calendar_and_claims(Repositories::in_memory()).await;
    }

    #[tokio::test]
    async fn test_calendar_and_claims_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        calendar_and_claims(db.repositories()).await;
    }
}
