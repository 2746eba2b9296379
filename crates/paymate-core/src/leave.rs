//! # Leave Module
//!
//! Leave requests, balance buckets, and the LOP-day derivation payroll
//! consumes.
//!
//! ## Where Leave Meets Payroll
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LeaveRequest { applicant, start, duration, status }                    │
//! │       │                                                                 │
//! │       │  lop_days_for_period(requests, member, period)                  │
//! │       │    • applicant == member                                        │
//! │       │    • status == APPROVED                                         │
//! │       │    • start date inside the period's month                       │
//! │       ▼                                                                 │
//! │  Σ duration ──► payroll::compute_payslip(structure, days, lop_days)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A request is attributed entirely to the month it starts in, even when it
//! runs into the next month.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::payroll::PayPeriod;
use crate::types::EmployeeType;

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "PENDING"),
            LeaveStatus::Approved => write!(f, "APPROVED"),
            LeaveStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

// =============================================================================
// Balance Buckets
// =============================================================================

/// The balance a leave type draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveBucket {
    Cl,
    El,
    Hpl,
    Medical,
    Rh,
    Ccl,
    Maternity,
    Paternity,
    Other,
}

impl LeaveBucket {
    /// Maps a leave-type label to its bucket. Unknown labels draw from `Other`.
    pub fn for_leave_type(leave_type: &str) -> Self {
        match leave_type {
            "Casual Leave (CL)" => LeaveBucket::Cl,
            "Earned Leave (EL)" => LeaveBucket::El,
            "Half Pay Leave (HPL)" => LeaveBucket::Hpl,
            "Commuted Leave (Medical)" | "Medical / Sick Leave" => LeaveBucket::Medical,
            "Restricted Holiday (RH)" => LeaveBucket::Rh,
            "Child Care Leave (CCL)" => LeaveBucket::Ccl,
            "Maternity Leave" => LeaveBucket::Maternity,
            "Paternity Leave" => LeaveBucket::Paternity,
            _ => LeaveBucket::Other,
        }
    }

    /// Buckets whose unused days carry forward year over year.
    pub fn carries_forward(&self) -> bool {
        matches!(
            self,
            LeaveBucket::El | LeaveBucket::Hpl | LeaveBucket::Medical | LeaveBucket::Ccl
        )
    }
}

/// Days available per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaveBalance {
    pub cl: u32,
    pub el: u32,
    pub hpl: u32,
    pub medical: u32,
    pub rh: u32,
    pub ccl: u32,
    pub maternity: u32,
    pub paternity: u32,
    pub other: u32,
}

/// Default annual entitlement.
impl Default for LeaveBalance {
    fn default() -> Self {
        LeaveBalance {
            cl: 13,
            el: 30,
            hpl: 20,
            medical: 10,
            rh: 3,
            ccl: 730,
            maternity: 180,
            paternity: 15,
            other: 0,
        }
    }
}

impl LeaveBalance {
    pub fn get(&self, bucket: LeaveBucket) -> u32 {
        match bucket {
            LeaveBucket::Cl => self.cl,
            LeaveBucket::El => self.el,
            LeaveBucket::Hpl => self.hpl,
            LeaveBucket::Medical => self.medical,
            LeaveBucket::Rh => self.rh,
            LeaveBucket::Ccl => self.ccl,
            LeaveBucket::Maternity => self.maternity,
            LeaveBucket::Paternity => self.paternity,
            LeaveBucket::Other => self.other,
        }
    }

    fn slot(&mut self, bucket: LeaveBucket) -> &mut u32 {
        match bucket {
            LeaveBucket::Cl => &mut self.cl,
            LeaveBucket::El => &mut self.el,
            LeaveBucket::Hpl => &mut self.hpl,
            LeaveBucket::Medical => &mut self.medical,
            LeaveBucket::Rh => &mut self.rh,
            LeaveBucket::Ccl => &mut self.ccl,
            LeaveBucket::Maternity => &mut self.maternity,
            LeaveBucket::Paternity => &mut self.paternity,
            LeaveBucket::Other => &mut self.other,
        }
    }

    /// Takes `days` out of the bucket for `leave_type`.
    ///
    /// `Other` is untracked and is never debited.
    ///
    /// ## Errors
    /// `InsufficientLeaveBalance` if the bucket holds fewer than `days`;
    /// the balance is left untouched.
    pub fn debit(&mut self, leave_type: &str, days: u32) -> CoreResult<()> {
        let bucket = LeaveBucket::for_leave_type(leave_type);
        if bucket == LeaveBucket::Other {
            return Ok(());
        }
        let slot = self.slot(bucket);
        let available = *slot;
        *slot = available
            .checked_sub(days)
            .ok_or_else(|| CoreError::InsufficientLeaveBalance {
                leave_type: leave_type.to_string(),
                requested: days,
                available,
            })?;
        Ok(())
    }

    /// Returns `days` to the bucket (e.g. an approval that was reverted).
    pub fn credit(&mut self, leave_type: &str, days: u32) {
        let bucket = LeaveBucket::for_leave_type(leave_type);
        if bucket != LeaveBucket::Other {
            let slot = self.slot(bucket);
            *slot = slot.saturating_add(days);
        }
    }
}

// =============================================================================
// Duration
// =============================================================================

/// Inclusive day count between two dates.
///
/// ## Errors
/// `InvalidLeaveDuration` when `end` is before `start`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use paymate_core::leave::leave_duration;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
/// assert_eq!(leave_duration(start, end).unwrap(), 3);
/// ```
pub fn leave_duration(start: NaiveDate, end: NaiveDate) -> CoreResult<u32> {
    let diff = end.signed_duration_since(start).num_days();
    if diff < 0 {
        return Err(CoreError::InvalidLeaveDuration(diff));
    }
    Ok((diff + 1) as u32)
}

// =============================================================================
// Leave Request
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: String,
    pub duration: u32,
    #[serde(default)]
    pub status: LeaveStatus,
    pub applicant_id: String,
    #[serde(default)]
    pub applicant_name: Option<String>,
    pub enterprise_id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl LeaveRequest {
    /// Creates a pending request, computing its duration from the dates.
    pub fn new(
        applicant_id: impl Into<String>,
        enterprise_id: impl Into<String>,
        leave_type: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> CoreResult<Self> {
        let duration = leave_duration(start_date, end_date)?;
        Ok(LeaveRequest {
            id: Uuid::new_v4().to_string(),
            start_date,
            end_date,
            leave_type: leave_type.into(),
            reason: reason.into(),
            duration,
            status: LeaveStatus::Pending,
            applicant_id: applicant_id.into(),
            applicant_name: None,
            enterprise_id: enterprise_id.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn bucket(&self) -> LeaveBucket {
        LeaveBucket::for_leave_type(&self.leave_type)
    }

    /// Checks the request against the applicant's balance.
    ///
    /// Tracked buckets must hold at least `duration` days. Untracked leave,
    /// and any leave for students or interns, only needs a positive
    /// duration.
    pub fn check_balance(&self, balance: &LeaveBalance, employee_type: EmployeeType) -> CoreResult<()> {
        let bucket = self.bucket();
        if bucket != LeaveBucket::Other && !employee_type.is_student_or_intern() {
            let available = balance.get(bucket);
            if self.duration > available {
                return Err(CoreError::InsufficientLeaveBalance {
                    leave_type: self.leave_type.clone(),
                    requested: self.duration,
                    available,
                });
            }
        }
        if self.duration == 0 {
            return Err(CoreError::InvalidLeaveDuration(0));
        }
        Ok(())
    }

    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }
}

// =============================================================================
// LOP Derivation
// =============================================================================

/// Unpaid-leave days for `member_id` in `period`: the summed duration of the
/// member's approved requests starting in that month.
pub fn lop_days_for_period(requests: &[LeaveRequest], member_id: &str, period: PayPeriod) -> u32 {
    requests
        .iter()
        .filter(|req| req.applicant_id == member_id)
        .filter(|req| req.is_approved())
        .filter(|req| period.contains(req.start_date))
        .map(|req| req.duration)
        .sum()
}
