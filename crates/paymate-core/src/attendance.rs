//! # Attendance Module
//!
//! Daily check-in/check-out records and the enterprise holiday calendar.
//!
//! ```text
//! no record today ──check_in──► active (check_out = None) ──check_out──► logged out
//!                                   │                                      │
//!                                   └── worked: "Active"                   └── worked: "{h}h {m}m"
//! ```
//!
//! A member has at most one record per calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Attendance
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Late,
    HalfDay,
    Absent,
}

/// Where the check-in was made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[ts(as = "String")]
    pub check_in: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub enterprise_id: Option<String>,
}

impl AttendanceRecord {
    /// Opens a PRESENT record dated the day of `at`.
    pub fn check_in(
        member_id: impl Into<String>,
        member_name: impl Into<String>,
        enterprise_id: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            date: at.date_naive(),
            member_id: Some(member_id.into()),
            member_name: Some(member_name.into()),
            check_in: at,
            check_out: None,
            location: None,
            status: AttendanceStatus::Present,
            enterprise_id: Some(enterprise_id.into()),
        }
    }

    /// Closes the record at `at`.
    ///
    /// ## Errors
    /// `InvalidStatus` if the record is already closed.
    pub fn check_out(&mut self, at: DateTime<Utc>) -> CoreResult<()> {
        if self.check_out.is_some() {
            return Err(CoreError::InvalidStatus {
                entity: "Attendance".to_string(),
                id: self.id.clone(),
                status: "CHECKED_OUT".to_string(),
            });
        }
        self.check_out = Some(at);
        Ok(())
    }

    /// Checked in and not yet out.
    pub fn is_active(&self) -> bool {
        self.check_out.is_none()
    }

    /// Whole minutes between check-in and check-out, `None` while active.
    pub fn worked_minutes(&self) -> Option<i64> {
        self.check_out.map(|out| (out - self.check_in).num_minutes())
    }

    /// `"Active"` while checked in, otherwise `"{h}h {m}m"`.
    pub fn worked_label(&self) -> String {
        match self.worked_minutes() {
            None => "Active".to_string(),
            Some(minutes) => format!("{}h {}m", minutes / 60, minutes % 60),
        }
    }

    pub fn owner_id(&self) -> &str {
        self.enterprise_id
            .as_deref()
            .or(self.member_id.as_deref())
            .unwrap_or_default()
    }
}

/// The member's record dated `today`, if any.
pub fn today_record<'a>(
    records: &'a [AttendanceRecord],
    member_id: &str,
    today: NaiveDate,
) -> Option<&'a AttendanceRecord> {
    records
        .iter()
        .find(|r| r.member_id.as_deref() == Some(member_id) && r.date == today)
}

// =============================================================================
// Holidays
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HolidayKind {
    #[default]
    Public,
    Institutional,
    Festival,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    pub enterprise_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Holiday {
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        kind: HolidayKind,
        enterprise_id: impl Into<String>,
    ) -> Self {
        Holiday {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            date,
            kind,
            enterprise_id: enterprise_id.into(),
            description: None,
        }
    }
}

/// Holidays whose name contains `term` (case-insensitive), earliest first,
/// split into those after `today` and the rest.
pub fn split_calendar<'a>(
    holidays: &'a [Holiday],
    term: &str,
    today: NaiveDate,
) -> (Vec<&'a Holiday>, Vec<&'a Holiday>) {
    let needle = term.to_lowercase();
    let mut matching: Vec<&Holiday> = holidays
        .iter()
        .filter(|h| h.name.to_lowercase().contains(&needle))
        .collect();
    matching.sort_by_key(|h| h.date);
    matching.into_iter().partition(|h| h.date > today)
}
