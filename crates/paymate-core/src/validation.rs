//! # Validation Module
//!
//! Input validation for invoice and payroll form values.
//!
//! ## Where Validation Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form input (strings, numbers)                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  THIS MODULE: reject empty, non-finite, out-of-range values             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  invoice / payroll arithmetic (total functions, never fail)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The arithmetic itself accepts anything; a caller that skips this module
//! gets whatever the numbers compute to.
//!
//! ## Usage
//! ```rust
//! use paymate_core::validation::{validate_quantity, validate_tax_rate};
//!
//! validate_quantity(2.0).unwrap();
//! assert!(validate_tax_rate(120.0).is_err());
//! ```

use uuid::Uuid;

use crate::error::ValidationError;
use crate::invoice::{DiscountType, LineItem};
use crate::{MAX_DESCRIPTION_LENGTH, MAX_INVOICE_NUMBER_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

fn finite(field: &str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(value)
}

fn non_negative(field: &str, value: f64) -> ValidationResult<f64> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Quantity must be finite and non-negative. Fractional quantities are
/// allowed (hours, kilograms).
pub fn validate_quantity(quantity: f64) -> ValidationResult<()> {
    non_negative("quantity", quantity).map(|_| ())
}

/// Unit rate must be finite and non-negative.
pub fn validate_rate(rate: f64) -> ValidationResult<()> {
    non_negative("rate", rate).map(|_| ())
}

/// Tax rate is a percentage between 0 and 100.
///
/// ## Example
/// ```rust
/// use paymate_core::validation::validate_tax_rate;
///
/// assert!(validate_tax_rate(18.0).is_ok());
/// assert!(validate_tax_rate(-1.0).is_err());
/// ```
pub fn validate_tax_rate(tax_rate: f64) -> ValidationResult<()> {
    let tax_rate = finite("taxRate", tax_rate)?;
    if !(0.0..=100.0).contains(&tax_rate) {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

/// Discount must be non-negative; a percentage discount is capped at 100.
pub fn validate_discount(value: f64, discount_type: DiscountType) -> ValidationResult<()> {
    let value = non_negative("discountValue", value)?;
    if discount_type == DiscountType::Percent && value > 100.0 {
        return Err(ValidationError::OutOfRange {
            field: "discountValue".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

/// Working days for a pay period: 1 to 31.
pub fn validate_working_days(days: u32) -> ValidationResult<()> {
    if !(1..=31).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "workingDays".to_string(),
            min: 1.0,
            max: 31.0,
        });
    }
    Ok(())
}

/// Salary component amounts: finite and non-negative.
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    non_negative(field, amount).map(|_| ())
}

// =============================================================================
// String Validators
// =============================================================================

/// Line-item description: required, at most [`MAX_DESCRIPTION_LENGTH`] chars.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(())
}

/// Invoice number: required, no whitespace, bounded length.
pub fn validate_invoice_number(number: &str) -> ValidationResult<()> {
    if number.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "invoiceNumber".to_string(),
        });
    }

    if number.chars().count() > MAX_INVOICE_NUMBER_LENGTH {
        return Err(ValidationError::TooLong {
            field: "invoiceNumber".to_string(),
            max: MAX_INVOICE_NUMBER_LENGTH,
        });
    }

    if number.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "invoiceNumber".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string and returns it parsed.
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Runs every field check for a line item.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_description(&item.description)?;
    validate_quantity(item.quantity)?;
    validate_rate(item.rate)?;
    validate_tax_rate(item.tax_rate)?;
    validate_discount(item.discount_value, item.discount_type)?;
    Ok(())
}
