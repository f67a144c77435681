//! # Validation Module
//!
//! Input validation for the two things an operator types: a product code
//! and a quantity.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      When Validation Runs                               │
//! │                                                                         │
//! │  Scan input ── validate_scan_code() ── before the catalog is called    │
//! │                                                                         │
//! │  Quantity popup ── typing: NOTHING (draft stored verbatim)             │
//! │                 └─ "OK":  parse_quantity() ── before the cart mutates  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use regi_core::validation::{parse_quantity, validate_scan_code};
//!
//! assert_eq!(validate_scan_code("  A1 ").unwrap(), "A1");
//! assert_eq!(parse_quantity("5").unwrap(), 5);
//! assert!(parse_quantity("100").is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_LINE_QUANTITY, MIN_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a scanned or typed product code and returns it trimmed.
///
/// Barcode scanners often append whitespace, and a whitespace-only field is
/// as empty as a blank one.
pub fn validate_scan_code(code: &str) -> ValidationResult<&str> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "product code".to_string(),
        });
    }

    Ok(code)
}

/// Validates a quantity against the per-line range (1..=99).
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if !(MIN_LINE_QUANTITY as i64..=MAX_LINE_QUANTITY as i64).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: MIN_LINE_QUANTITY as i64,
            max: MAX_LINE_QUANTITY as i64,
        });
    }

    Ok(qty as u32)
}

/// Parses the quantity popup's draft text.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must be a whole number (`"2.5"`, `"abc"`, `""` are invalid)
/// - Must be within 1..=99 (`"0"`, `"-3"`, `"100"` are out of range)
pub fn parse_quantity(draft: &str) -> ValidationResult<u32> {
    let trimmed = draft.trim();

    let value: i64 = trimmed.parse().map_err(|_| {
        let unsigned = trimmed.trim_start_matches(['-', '+']);
        if trimmed.is_empty() {
            ValidationError::Required {
                field: "quantity".to_string(),
            }
        } else if !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit()) {
            // Digits only, but too large for i64
            ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: MIN_LINE_QUANTITY as i64,
                max: MAX_LINE_QUANTITY as i64,
            }
        } else {
            ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: "must be a whole number".to_string(),
            }
        }
    })?;

    validate_quantity(value)
}
