//! # Error Types
//!
//! Domain-specific error types for paymate-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  paymate-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  paymate-db errors (separate crate)                                    │
//! │  └── DbError          - Store / repository failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The line-item and payroll arithmetic never returns these: a nonsensical
//! quantity produces a nonsensical amount. Errors only come from the rules
//! built around the arithmetic (periods, leave balances, invoice lifecycle).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A payslip was requested for a period with zero working days.
    ///
    /// ## When This Occurs
    /// - A caller passes `working_days = 0` directly to the payroll computer
    /// - Never for a real calendar month (28-31 days)
    #[error("Payroll period has no working days")]
    NoWorkingDays,

    /// Month number outside 1-12 or a year chrono cannot represent.
    #[error("Invalid pay period: {year}-{month}")]
    InvalidPeriod { year: i32, month: u32 },

    /// The leave request asks for more days than the bucket holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Leave Form (Casual Leave, 5 days)
    ///      │
    ///      ▼
    /// Check bucket: cl = 3
    ///      │
    ///      ▼
    /// InsufficientLeaveBalance { leave_type: "Casual Leave (CL)", requested: 5, available: 3 }
    /// ```
    #[error("Insufficient {leave_type} balance: requested {requested}d, available {available}d")]
    InsufficientLeaveBalance {
        leave_type: String,
        requested: u32,
        available: u32,
    },

    /// End date before start date, or a zero-day request.
    #[error("Invalid leave duration: {0} day(s)")]
    InvalidLeaveDuration(i64),

    /// Operation requires a status the record is not in.
    #[error("{entity} {id} is {status}, cannot perform operation")]
    InvalidStatus {
        entity: String,
        id: String,
        status: String,
    },

    /// A line item id that is not on the invoice.
    #[error("Line item not found: {0}")]
    LineItemNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The CSV writer failed.
    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used by callers that want to reject input before it reaches the arithmetic.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientLeaveBalance {
            leave_type: "Casual Leave (CL)".to_string(),
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient Casual Leave (CL) balance: requested 5d, available 3d"
        );

        assert_eq!(
            CoreError::NoWorkingDays.to_string(),
            "Payroll period has no working days"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "description".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
