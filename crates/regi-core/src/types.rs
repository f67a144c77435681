//! # Domain Types
//!
//! Core domain types shared by the session, the adapters, and the UI.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ PurchaseRequest │   │ PurchaseTotals  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code           │   │  emp_code       │   │  incl. tax      │       │
//! │  │  name           │   │  store_code     │   │  excl. tax      │       │
//! │  │  price (Money)  │   │  pos_no         │   │                 │       │
//! │  └─────────────────┘   │  products[]     │   └─────────────────┘       │
//! │                        │   {code, qty}   │                              │
//! │  ┌─────────────────┐   └─────────────────┘                              │
//! │  │TerminalIdentity │     (no prices: the ledger prices the sale)       │
//! │  │  emp/store/pos  │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog item as returned by the lookup service.
///
/// Immutable once fetched. The catalog keys products by an integer code, so
/// `code` deserializes from either a JSON string or a JSON integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Product code (barcode digits or a typed code). Unique key.
    #[serde(deserialize_with = "code_from_string_or_number")]
    pub code: String,

    /// Display name shown to the operator.
    pub name: String,

    /// Tax-inclusive unit price in the smallest currency unit.
    pub price: Money,
}

impl Product {
    /// Creates a product.
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Product {
            code: code.into(),
            name: name.into(),
            price,
        }
    }
}

fn code_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Int(u64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s,
        Code::Int(n) => n.to_string(),
    })
}

// =============================================================================
// Terminal Identity
// =============================================================================

/// Operator and register identifiers sent with every purchase.
///
/// Passed through verbatim; the terminal does not authenticate anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TerminalIdentity {
    /// Operator (cashier) code.
    pub emp_code: String,

    /// Store code.
    pub store_code: String,

    /// Register number within the store.
    pub pos_no: String,
}

impl TerminalIdentity {
    /// Creates an identity.
    pub fn new(
        emp_code: impl Into<String>,
        store_code: impl Into<String>,
        pos_no: impl Into<String>,
    ) -> Self {
        TerminalIdentity {
            emp_code: emp_code.into(),
            store_code: store_code.into(),
            pos_no: pos_no.into(),
        }
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// One line of a purchase request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseLine {
    pub code: String,
    pub quantity: u32,
}

/// Body of `POST /purchase/`.
///
/// ## Wire Format
/// ```json
/// {
///   "emp_code": "9999999999",
///   "store_code": "30",
///   "pos_no": "90",
///   "products": [{ "code": "A1", "quantity": 2 }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseRequest {
    pub emp_code: String,
    pub store_code: String,
    pub pos_no: String,
    pub products: Vec<PurchaseLine>,
}

/// Totals computed by the ledger for a recorded purchase.
///
/// Passed through verbatim; the terminal never recomputes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseTotals {
    /// Grand total including consumption tax.
    pub total_inclusive_tax: Money,

    /// Grand total excluding consumption tax.
    pub total_exclusive_tax: Money,
}

impl PurchaseTotals {
    /// Creates totals from the two ledger amounts.
    pub fn new(total_inclusive_tax: Money, total_exclusive_tax: Money) -> Self {
        PurchaseTotals {
            total_inclusive_tax,
            total_exclusive_tax,
        }
    }

    /// Tax portion implied by the two totals (display only).
    pub fn tax(&self) -> Money {
        Money::from_minor(self.total_inclusive_tax.minor() - self.total_exclusive_tax.minor())
    }
}
