//! # Error Types
//!
//! Domain-specific error types for regi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  regi-core errors (this file)                                          │
//! │  ├── CoreError        - Session operation failures                     │
//! │  ├── ValidationError  - Scan code / quantity input failures            │
//! │  └── AdapterError     - Catalog / ledger call failures                 │
//! │                                                                         │
//! │  regi-client errors (separate crate)                                   │
//! │  └── ClientError      - Config + HTTP client setup                     │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        AdapterError ────┴─► CoreError ──► operator notice              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: the session is left in its last known-good
//! state and the operator sees the message.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by [`CartSession`](crate::session::CartSession) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The scan code was empty.
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationError),

    /// The catalog has no product for this code, or the lookup failed.
    ///
    /// ## When This Occurs
    /// - Catalog answered 404 or `null`
    /// - Catalog unreachable, timed out, or answered garbage (`cause` is set)
    ///
    /// Either way nothing is staged and the typed code stays on screen.
    #[error("Product not found: {code}")]
    ProductNotFound {
        code: String,
        #[source]
        cause: Option<AdapterError>,
    },

    /// Re-scanning a product whose line is already at the maximum.
    #[error("Quantity for {code} is already at the maximum of {max}")]
    QuantityLimit { code: String, max: u32 },

    /// No cart line has this code.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// A quantity operation was invoked with no quantity popup open.
    #[error("No quantity edit in progress")]
    NoQuantityEdit,

    /// The draft quantity failed validation; the popup stays open.
    #[error("{0}")]
    InvalidQuantity(ValidationError),

    /// The operation is blocked by an open popup.
    #[error("Close the {0} popup first")]
    PopupOpen(Popup),

    /// Another call of the same kind is still in flight.
    #[error("A {0} is already in progress")]
    Busy(Operation),

    /// A lookup completion arrived for a lookup that is no longer pending.
    #[error("Lookup result for {0} is no longer expected")]
    StaleLookup(String),

    /// The ledger did not record the purchase. The cart is untouched.
    #[error("Checkout failed: {0}")]
    CheckoutFailed(#[source] AdapterError),

    /// A checkout completion arrived with no checkout pending.
    #[error("No checkout in progress")]
    NoCheckoutPending,
}

impl CoreError {
    /// Returns true if the failure came from a remote service rather than
    /// from operator input.
    pub fn is_adapter_failure(&self) -> bool {
        matches!(
            self,
            CoreError::CheckoutFailed(_) | CoreError::ProductNotFound { cause: Some(_), .. }
        )
    }
}

/// Popups that make the session modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Popup {
    Quantity,
    Totals,
}

impl std::fmt::Display for Popup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Popup::Quantity => write!(f, "quantity"),
            Popup::Totals => write!(f, "totals"),
        }
    }
}

/// Operation kinds guarded by the single-flight rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lookup,
    Checkout,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Lookup => write!(f, "product lookup"),
            Operation::Checkout => write!(f, "checkout"),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., a quantity that is not a whole number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Adapter Error
// =============================================================================

/// Failures reported by the catalog or ledger adapters.
///
/// Lives in the core because the session consumes adapter results;
/// regi-client maps reqwest/serde failures onto these variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The service did not answer in time.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The service answered with an unexpected HTTP status.
    #[error("Service returned HTTP {status}")]
    Status { status: u16 },

    /// The body could not be decoded or violated the contract.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The ledger answered but declined the purchase.
    #[error("Purchase rejected: {0}")]
    Rejected(String),
}

impl AdapterError {
    /// Returns true if repeating the same idempotent request may succeed.
    ///
    /// Only lookups are ever retried; purchases have no idempotency key.
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Transport(_) | AdapterError::Timeout(_) => true,
            AdapterError::Status { status } => *status >= 500,
            AdapterError::InvalidResponse(_) | AdapterError::Rejected(_) => false,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityLimit {
            code: "4901234567890".to_string(),
            max: 99,
        };
        assert_eq!(
            err.to_string(),
            "Quantity for 4901234567890 is already at the maximum of 99"
        );

        let err = CoreError::Busy(Operation::Checkout);
        assert_eq!(err.to_string(), "A checkout is already in progress");

        let err = CoreError::PopupOpen(Popup::Totals);
        assert_eq!(err.to_string(), "Close the totals popup first");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product code".to_string(),
        };
        assert_eq!(err.to_string(), "product code is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 99,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 99");
    }

    #[test]
    fn test_product_not_found_keeps_cause() {
        let err = CoreError::ProductNotFound {
            code: "A1".to_string(),
            cause: Some(AdapterError::Timeout(10)),
        };
        assert_eq!(err.to_string(), "Product not found: A1");
        assert!(err.source().is_some());
        assert!(err.is_adapter_failure());

        let plain = CoreError::ProductNotFound {
            code: "A1".to_string(),
            cause: None,
        };
        assert!(plain.source().is_none());
        assert!(!plain.is_adapter_failure());
    }

    #[test]
    fn test_transient_adapter_errors() {
        assert!(AdapterError::Transport("refused".into()).is_transient());
        assert!(AdapterError::Timeout(10).is_transient());
        assert!(AdapterError::Status { status: 503 }.is_transient());

        assert!(!AdapterError::Status { status: 400 }.is_transient());
        assert!(!AdapterError::InvalidResponse("eof".into()).is_transient());
        assert!(!AdapterError::Rejected("declined".into()).is_transient());
    }
}
