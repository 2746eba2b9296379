//! # Attendance Repository
//!
//! One record per member per day: check in opens it, check out closes it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use paymate_core::attendance::{today_record, AttendanceRecord};
use paymate_core::types::TeamMember;
use paymate_core::CoreError;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::store::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    records: Collection<AttendanceRecord>,
}

impl AttendanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        AttendanceRepository {
            records: Collection::new(store),
        }
    }

    /// Opens today's record for `member`.
    ///
    /// ## Errors
    /// `Core(InvalidStatus)` if the member already has a record dated today.
    pub async fn check_in(
        &self,
        member: &TeamMember,
        at: DateTime<Utc>,
    ) -> DbResult<AttendanceRecord> {
        let existing = self.records.list(&member.enterprise_id).await?;
        if today_record(&existing, &member.id, at.date_naive()).is_some() {
            return Err(CoreError::InvalidStatus {
                entity: "Attendance".to_string(),
                id: member.id.clone(),
                status: "CHECKED_IN".to_string(),
            }
            .into());
        }

        let record =
            AttendanceRecord::check_in(&member.id, &member.name, &member.enterprise_id, at);
        self.records.put(&record).await?;

        info!(member = %member.id, date = %record.date, "Checked in");
        Ok(record)
    }

    /// Closes the member's record dated the day of `at`.
    ///
    /// ## Errors
    /// - `NotFound` if the member has not checked in that day
    /// - `Core(InvalidStatus)` if they already checked out
    pub async fn check_out(
        &self,
        member: &TeamMember,
        at: DateTime<Utc>,
    ) -> DbResult<AttendanceRecord> {
        let existing = self.records.list(&member.enterprise_id).await?;
        let mut record = today_record(&existing, &member.id, at.date_naive())
            .cloned()
            .ok_or_else(|| DbError::not_found("Attendance", member.id.as_str()))?;

        record.check_out(at)?;
        self.records.put(&record).await?;

        info!(
            member = %member.id,
            worked = %record.worked_label(),
            "Checked out"
        );
        Ok(record)
    }

    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<AttendanceRecord>> {
        self.records.list(owner_id).await
    }

    pub fn subscribe(&self, owner_id: &str) -> BoxStream<'static, DbResult<Vec<AttendanceRecord>>> {
        self.records.subscribe(owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use chrono::TimeZone;
    use paymate_core::types::{EnterpriseRole, MemberStatus};

    fn member() -> TeamMember {
        TeamMember {
            id: "m1".to_string(),
            name: "Asha".to_string(),
            role: "Designer".to_string(),
            email: "asha@example.com".to_string(),
            enterprise_role: EnterpriseRole::Staff,
            status: MemberStatus::Active,
            enterprise_id: "ent-1".to_string(),
            salary_structure: None,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    fn setup() -> AttendanceRepository {
        AttendanceRepository::new(Arc::new(MemoryDocumentStore::default()))
    }

    #[tokio::test]
    async fn test_check_in_then_out() {
        let repo = setup();
        let asha = member();

        let opened = repo.check_in(&asha, at(3, 9)).await.unwrap();
        assert!(opened.is_active());

        let closed = repo.check_out(&asha, at(3, 17)).await.unwrap();
        assert_eq!(closed.id, opened.id);
        assert_eq!(closed.worked_label(), "8h 0m");

        let stored = repo.list("ent-1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].check_out, Some(at(3, 17)));
    }

    #[tokio::test]
    async fn test_one_record_per_day() {
        let repo = setup();
        let asha = member();

        repo.check_in(&asha, at(3, 9)).await.unwrap();
        let again = repo.check_in(&asha, at(3, 11)).await.unwrap_err();
        assert!(matches!(again, DbError::Core(CoreError::InvalidStatus { .. })));

        // A new day opens a new record.
        repo.check_in(&asha, at(4, 9)).await.unwrap();
        assert_eq!(repo.list("ent-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_check_out_requires_check_in() {
        let repo = setup();
        let asha = member();

        let missing = repo.check_out(&asha, at(3, 17)).await.unwrap_err();
        assert!(matches!(missing, DbError::NotFound { .. }));

        repo.check_in(&asha, at(3, 9)).await.unwrap();
        repo.check_out(&asha, at(3, 17)).await.unwrap();
        let twice = repo.check_out(&asha, at(3, 18)).await.unwrap_err();
        assert!(matches!(twice, DbError::Core(CoreError::InvalidStatus { .. })));
    }
}
