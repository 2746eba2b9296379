//! # Leave Repository
//!
//! Submission with balance checks, approval with balance debits, and the
//! LOP-day lookup payroll uses.
//!
//! ```text
//! submit ──► PENDING ──set_status(APPROVED)──► APPROVED   (bucket -= duration)
//!               │                                 │
//!               └──set_status(REJECTED)──► REJECTED ◄──┘ (bucket += duration)
//! ```

use std::sync::Arc;

use futures_util::stream::BoxStream;
use paymate_core::leave::{lop_days_for_period, LeaveBalance, LeaveRequest, LeaveStatus};
use paymate_core::payroll::PayPeriod;
use paymate_core::types::{EmployeeType, UserProfile};
use tracing::{info, warn};

use crate::error::DbResult;
use crate::store::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct LeaveRepository {
    requests: Collection<LeaveRequest>,
    profiles: Collection<UserProfile>,
}

impl LeaveRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        LeaveRepository {
            requests: Collection::new(Arc::clone(&store)),
            profiles: Collection::new(store),
        }
    }

    /// Checks the request against the applicant's balance and stores it as
    /// pending. An applicant without a profile is checked against the
    /// default entitlement.
    pub async fn submit(&self, mut request: LeaveRequest) -> DbResult<LeaveRequest> {
        let (balance, employee_type) = self.applicant_balance(&request.applicant_id).await?;
        request.status = LeaveStatus::Pending;
        request.check_balance(&balance, employee_type)?;

        info!(
            id = %request.id,
            applicant = %request.applicant_id,
            leave_type = %request.leave_type,
            days = request.duration,
            "Leave request submitted"
        );
        self.requests.put(&request).await?;
        Ok(request)
    }

    /// Moves a request to `status`, debiting or crediting the applicant's
    /// bucket when it enters or leaves APPROVED.
    ///
    /// ## Errors
    /// `Core(InsufficientLeaveBalance)` if approval would overdraw the
    /// bucket; nothing is stored in that case.
    pub async fn set_status(&self, id: &str, status: LeaveStatus) -> DbResult<LeaveRequest> {
        let mut request = self.requests.require(id).await?;
        let was_approved = request.is_approved();
        let approving = status == LeaveStatus::Approved;

        if was_approved != approving {
            self.adjust_balance(&request, approving).await?;
        }

        request.status = status;
        self.requests.put(&request).await?;
        info!(id = %id, status = %status, "Leave status updated");
        Ok(request)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<LeaveRequest>> {
        self.requests.get(id).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        self.requests.delete(id).await
    }

    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<LeaveRequest>> {
        self.requests.list(owner_id).await
    }

    /// One applicant's requests within an owner's collection.
    pub async fn list_for_applicant(
        &self,
        owner_id: &str,
        applicant_id: &str,
    ) -> DbResult<Vec<LeaveRequest>> {
        let all = self.list(owner_id).await?;
        Ok(all
            .into_iter()
            .filter(|req| req.applicant_id == applicant_id)
            .collect())
    }

    pub fn subscribe(&self, owner_id: &str) -> BoxStream<'static, DbResult<Vec<LeaveRequest>>> {
        self.requests.subscribe(owner_id)
    }

    /// Approved leave days for `member_id` starting in `period`.
    pub async fn lop_days(&self, owner_id: &str, member_id: &str, period: PayPeriod) -> DbResult<u32> {
        let all = self.list(owner_id).await?;
        Ok(lop_days_for_period(&all, member_id, period))
    }

    async fn applicant_balance(&self, applicant_id: &str) -> DbResult<(LeaveBalance, EmployeeType)> {
        Ok(match self.profiles.get(applicant_id).await? {
            Some(profile) => (profile.leave_balance(), profile.employee_type()),
            None => (LeaveBalance::default(), EmployeeType::default()),
        })
    }

    async fn adjust_balance(&self, request: &LeaveRequest, debit: bool) -> DbResult<()> {
        let Some(mut profile) = self.profiles.get(&request.applicant_id).await? else {
            warn!(
                applicant = %request.applicant_id,
                "No profile for applicant, balance not adjusted"
            );
            return Ok(());
        };
        if profile.employee_type().is_student_or_intern() {
            return Ok(());
        }

        let mut balance = profile.leave_balance();
        if debit {
            balance.debit(&request.leave_type, request.duration)?;
        } else {
            balance.credit(&request.leave_type, request.duration);
        }
        profile.balance = Some(balance);
        self.profiles.put(&profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::ProfileRepository;
    use crate::store::MemoryDocumentStore;
    use chrono::NaiveDate;
    use paymate_core::CoreError;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    async fn setup() -> (LeaveRepository, ProfileRepository) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::default());
        let profiles = ProfileRepository::new(Arc::clone(&store));
        profiles.ensure("emp-1", Some("Kiran"), None).await.unwrap();
        (LeaveRepository::new(store), profiles)
    }

    fn request(leave_type: &str, start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        LeaveRequest::new("emp-1", "ent-1", leave_type, start, end, "personal").unwrap()
    }

    #[tokio::test]
    async fn test_submit_rejects_overdraw() {
        let (leave, _) = setup().await;
        // Restricted holiday bucket holds 3 days.
        let err = leave
            .submit(request("Restricted Holiday (RH)", d(6, 3), d(6, 6)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientLeaveBalance { requested: 4, available: 3, .. })
        ));
        assert!(leave.list("ent-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approval_debits_and_reversal_credits() {
        let (leave, profiles) = setup().await;
        let submitted = leave
            .submit(request("Casual Leave (CL)", d(6, 3), d(6, 5)))
            .await
            .unwrap();
        assert_eq!(submitted.status, LeaveStatus::Pending);

        leave.set_status(&submitted.id, LeaveStatus::Approved).await.unwrap();
        assert_eq!(profiles.require("emp-1").await.unwrap().leave_balance().cl, 10);

        // Approving twice does not debit twice.
        leave.set_status(&submitted.id, LeaveStatus::Approved).await.unwrap();
        assert_eq!(profiles.require("emp-1").await.unwrap().leave_balance().cl, 10);

        leave.set_status(&submitted.id, LeaveStatus::Rejected).await.unwrap();
        assert_eq!(profiles.require("emp-1").await.unwrap().leave_balance().cl, 13);
    }

    #[tokio::test]
    async fn test_lop_days_counts_approved_only() {
        let (leave, _) = setup().await;
        let june = PayPeriod::new(2024, 6).unwrap();

        let a = leave.submit(request("Earned Leave (EL)", d(6, 10), d(6, 11))).await.unwrap();
        let b = leave.submit(request("Earned Leave (EL)", d(6, 20), d(6, 20))).await.unwrap();
        leave.submit(request("Earned Leave (EL)", d(6, 24), d(6, 28))).await.unwrap();
        leave.set_status(&a.id, LeaveStatus::Approved).await.unwrap();
        leave.set_status(&b.id, LeaveStatus::Approved).await.unwrap();

        assert_eq!(leave.lop_days("ent-1", "emp-1", june).await.unwrap(), 3);
        assert_eq!(leave.list_for_applicant("ent-1", "emp-1").await.unwrap().len(), 3);
    }
}
