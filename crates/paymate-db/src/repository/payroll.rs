//! # Payroll Repository
//!
//! Runs payroll for one member and month and keeps the ledger in step.
//!
//! ## Processing a Member
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process(member, period, paid_on)                                       │
//! │       │                                                                 │
//! │       ├── lop_days  = approved leave starting in period                 │
//! │       ├── payslip   = Payslip::generate(structure, period, lop_days)    │
//! │       │                                                                 │
//! │       ├── existing payslip for (member, month, year)?                   │
//! │       │      yes → overwrite it (same id)                               │
//! │       │                                                                 │
//! │       └── payout EXPENSE tx                                             │
//! │              existing payout for the same slip? → overwrite it          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reprocessing a month therefore never leaves two payslips or two payout
//! entries for one member.

use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::stream::BoxStream;
use paymate_core::leave::{lop_days_for_period, LeaveRequest};
use paymate_core::ledger::{Transaction, PAYROLL_CATEGORY};
use paymate_core::payroll::{monthly_payout, PayPeriod, Payslip};
use paymate_core::types::TeamMember;
use tracing::info;

use crate::error::DbResult;
use crate::store::{Collection, DocumentStore};

/// A processed payslip and the ledger entry booked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollRun {
    pub payslip: Payslip,
    pub payout: Transaction,
    /// True when an earlier payslip for the same slot was replaced.
    pub replaced: bool,
}

#[derive(Debug, Clone)]
pub struct PayrollRepository {
    payslips: Collection<Payslip>,
    leave: Collection<LeaveRequest>,
    transactions: Collection<Transaction>,
}

impl PayrollRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        PayrollRepository {
            payslips: Collection::new(Arc::clone(&store)),
            leave: Collection::new(Arc::clone(&store)),
            transactions: Collection::new(store),
        }
    }

    /// Generates and stores `member`'s payslip for `period`, booking the net
    /// pay as a payroll expense dated `paid_on`.
    ///
    /// `currency` is stamped on both records (the owner's default currency).
    pub async fn process(
        &self,
        member: &TeamMember,
        period: PayPeriod,
        paid_on: NaiveDate,
        currency: Option<String>,
    ) -> DbResult<PayrollRun> {
        let owner = member.enterprise_id.as_str();

        let requests = self.leave.list(owner).await?;
        let lop_days = lop_days_for_period(&requests, &member.id, period);

        let mut payslip = Payslip::generate(
            member.id.clone(),
            member.name.clone(),
            owner,
            member.salary(),
            period,
            lop_days,
        )?;
        payslip.currency = currency;

        let existing = self
            .payslips
            .list(owner)
            .await?
            .into_iter()
            .find(|slip| slip.same_slot(&payslip));
        let replaced = existing.is_some();
        if let Some(previous) = existing {
            payslip.id = previous.id;
        }
        self.payslips.put(&payslip).await?;

        let mut payout = payslip.payout_transaction(paid_on);
        if let Some(previous) = self.find_payout(&payout).await? {
            payout.id = previous.id;
        }
        self.transactions.put(&payout).await?;

        info!(
            member = %member.id,
            period = %period,
            lop_days,
            net_pay = payslip.net_pay,
            replaced,
            "Payroll processed"
        );

        Ok(PayrollRun {
            payslip,
            payout,
            replaced,
        })
    }

    /// Processes every member in `members`, stopping at the first error.
    pub async fn process_all(
        &self,
        members: &[TeamMember],
        period: PayPeriod,
        paid_on: NaiveDate,
        currency: Option<String>,
    ) -> DbResult<Vec<PayrollRun>> {
        let mut runs = Vec::with_capacity(members.len());
        for member in members {
            runs.push(self.process(member, period, paid_on, currency.clone()).await?);
        }
        Ok(runs)
    }

    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<Payslip>> {
        self.payslips.list(owner_id).await
    }

    pub async fn for_period(&self, owner_id: &str, period: PayPeriod) -> DbResult<Vec<Payslip>> {
        let all = self.list(owner_id).await?;
        Ok(all.into_iter().filter(|slip| slip.is_for(period)).collect())
    }

    /// Total net pay of `period`'s payslips.
    pub async fn monthly_payout(&self, owner_id: &str, period: PayPeriod) -> DbResult<f64> {
        let all = self.list(owner_id).await?;
        Ok(monthly_payout(&all, period))
    }

    pub fn subscribe(&self, owner_id: &str) -> BoxStream<'static, DbResult<Vec<Payslip>>> {
        self.payslips.subscribe(owner_id)
    }

    /// The payout booked earlier for the same member and month. The reference
    /// omits the year, so the description is compared too.
    async fn find_payout(&self, payout: &Transaction) -> DbResult<Option<Transaction>> {
        let all = self.transactions.list(&payout.enterprise_id).await?;
        Ok(all.into_iter().find(|tx| {
            tx.category == PAYROLL_CATEGORY
                && tx.reference == payout.reference
                && tx.description == payout.description
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use paymate_core::leave::LeaveStatus;
    use paymate_core::ledger::{PaymentMode, TransactionKind};
    use paymate_core::payroll::SalaryStructure;
    use paymate_core::types::{EnterpriseRole, MemberStatus};

    fn member(id: &str, name: &str) -> TeamMember {
        TeamMember {
            id: id.to_string(),
            name: name.to_string(),
            role: "Engineer".to_string(),
            email: format!("{id}@example.com"),
            enterprise_role: EnterpriseRole::Staff,
            status: MemberStatus::Active,
            enterprise_id: "ent-1".to_string(),
            salary_structure: None,
        }
    }

    fn paid_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn june() -> PayPeriod {
        PayPeriod::new(2024, 6).unwrap()
    }

    fn setup() -> (PayrollRepository, Collection<LeaveRequest>, Collection<Transaction>) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::default());
        (
            PayrollRepository::new(Arc::clone(&store)),
            Collection::new(Arc::clone(&store)),
            Collection::new(store),
        )
    }

    #[tokio::test]
    async fn test_process_without_leave() {
        let (payroll, _, ledger) = setup();
        let run = payroll
            .process(&member("abcd1234", "Asha"), june(), paid_on(), Some("INR".to_string()))
            .await
            .unwrap();

        let expected_net = SalaryStructure::default().gross_monthly()
            - SalaryStructure::default().fixed_deductions();
        assert_eq!(run.payslip.net_pay, expected_net);
        assert_eq!(run.payslip.working_days, 30);
        assert_eq!(run.payslip.lop_days, 0);
        assert!(!run.replaced);

        assert_eq!(run.payout.kind, TransactionKind::Expense);
        assert_eq!(run.payout.amount, expected_net);
        assert_eq!(run.payout.payment_mode, PaymentMode::BankTransfer);
        assert_eq!(run.payout.reference, "PAY-ABCD-JUN");
        assert_eq!(run.payout.description, "Salary Payout: Asha (June 2024)");
        assert_eq!(ledger.list("ent-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approved_leave_becomes_lop() {
        let (payroll, leave, _) = setup();
        let mut req = LeaveRequest::new(
            "m1",
            "ent-1",
            "Casual Leave (CL)",
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            "travel",
        )
        .unwrap();
        req.status = LeaveStatus::Approved;
        leave.put(&req).await.unwrap();

        let run = payroll
            .process(&member("m1", "Ravi"), june(), paid_on(), None)
            .await
            .unwrap();

        // 42000 / 30 * 3 = 4200
        assert_eq!(run.payslip.lop_days, 3);
        assert_eq!(run.payslip.paid_days, 27);
        let lop = run.payslip.deductions.last().unwrap();
        assert_eq!(lop.label, "LOP (3 Days)");
        assert_eq!(lop.amount, 4200.0);
        assert_eq!(run.payslip.net_pay, 42000.0 - 2000.0 - 4200.0);
    }

    #[tokio::test]
    async fn test_reprocess_overwrites_payslip_and_payout() {
        let (payroll, _, ledger) = setup();
        let asha = member("m1", "Asha");

        let first = payroll.process(&asha, june(), paid_on(), None).await.unwrap();
        let second = payroll.process(&asha, june(), paid_on(), None).await.unwrap();

        assert!(second.replaced);
        assert_eq!(first.payslip.id, second.payslip.id);
        assert_eq!(first.payout.id, second.payout.id);
        assert_eq!(payroll.list("ent-1").await.unwrap().len(), 1);
        assert_eq!(ledger.list("ent-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_monthly_payout() {
        let (payroll, _, _) = setup();
        let mut senior = member("m2", "Dev");
        senior.salary_structure = Some(SalaryStructure {
            basic: 50000.0,
            ..SalaryStructure::default()
        });

        let runs = payroll
            .process_all(&[member("m1", "Asha"), senior], june(), paid_on(), None)
            .await
            .unwrap();
        let may = PayPeriod::new(2024, 5).unwrap();
        payroll.process(&member("m1", "Asha"), may, paid_on(), None).await.unwrap();

        let expected: f64 = runs.iter().map(|r| r.payslip.net_pay).sum();
        assert_eq!(payroll.monthly_payout("ent-1", june()).await.unwrap(), expected);
        assert_eq!(payroll.for_period("ent-1", june()).await.unwrap().len(), 2);
    }
}
