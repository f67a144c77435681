//! # Adapter Contracts
//!
//! The two remote collaborators of the register, as traits. The HTTP
//! implementations live in [`crate::http`]; tests substitute in-memory fakes.
//!
//! ```text
//! ┌──────────────┐  fetch_product(code)   ┌──────────────────┐
//! │              │ ─────────────────────► │ ProductCatalog   │
//! │   Register   │ ◄───────────────────── │ Some / None / Err│
//! │              │                        └──────────────────┘
//! │              │  submit_purchase(req)  ┌──────────────────┐
//! │              │ ─────────────────────► │ PurchaseLedger   │
//! │              │ ◄───────────────────── │ totals / Err     │
//! └──────────────┘                        └──────────────────┘
//! ```

use std::future::Future;

use regi_core::{AdapterError, Product, PurchaseRequest, PurchaseTotals};

/// Resolves product codes against the catalog.
///
/// Idempotent and side-effect free, so implementations may retry.
pub trait ProductCatalog: Send + Sync {
    /// Looks up one product.
    ///
    /// ## Returns
    /// - `Ok(Some(product))` when the catalog knows the code
    /// - `Ok(None)` when it does not (a well-formed "not found")
    /// - `Err(_)` when the catalog could not be asked or answered nonsense
    fn fetch_product(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Product>, AdapterError>> + Send;
}

/// Records purchases and prices them.
///
/// No idempotency key exists, so callers must not retry a failed submit
/// automatically.
pub trait PurchaseLedger: Send + Sync {
    /// Submits a purchase. On success the ledger has recorded it in full.
    fn submit_purchase(
        &self,
        request: &PurchaseRequest,
    ) -> impl Future<Output = Result<PurchaseTotals, AdapterError>> + Send;
}
