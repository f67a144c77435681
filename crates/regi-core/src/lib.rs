//! # regi-core: Pure Business Logic for the Regi Terminal
//!
//! This crate is the **heart** of the register. It owns the cart and the
//! session state machine as plain data with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Regi Terminal Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator Console (apps/terminal)                │   │
//! │  │      scan ──► add ──► qty / rm ──► buy ──► close               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               regi-client (Register + HTTP adapters)            │   │
//! │  │     lock ─► begin_* ─► unlock ─► await adapter ─► finish_*      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ regi-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  session  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │CartSession│  │   │
//! │  │   │ Purchase* │  │           │  │ CartLine  │  │   Mode    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO ASYNC • PURE STATE TRANSITIONS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, PurchaseRequest, PurchaseTotals)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart with the merge-by-code rule
//! - [`session`] - The register state machine
//! - [`snapshot`] - Serializable read model for rendering
//! - [`error`] - Domain error types
//! - [`validation`] - Scan code and quantity validation
//!
//! ## Example Usage
//!
//! ```rust
//! use regi_core::{CartSession, Money, Product, PurchaseTotals, TerminalIdentity};
//!
//! let mut session = CartSession::new(TerminalIdentity::new("9999999999", "30", "90"));
//!
//! // The caller performs the catalog call between begin and finish
//! let ticket = session.begin_lookup("A1").unwrap();
//! let tea = Product::new("A1", "Tea", Money::from_minor(150));
//! session.finish_lookup(ticket, Ok(Some(tea))).unwrap();
//! session.add_staged_to_cart().unwrap();
//!
//! let request = session.begin_checkout().unwrap();
//! assert_eq!(request.products[0].quantity, 1);
//!
//! let totals = PurchaseTotals::new(Money::from_minor(165), Money::from_minor(150));
//! session.finish_checkout(Ok(totals)).unwrap();
//! session.dismiss_totals().unwrap();
//! assert!(session.cart().is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{AdapterError, CoreError, CoreResult, Operation, Popup, ValidationError};
pub use money::Money;
pub use session::{CartSession, LookupTicket, Mode, QuantityEdit, SessionPhase};
pub use snapshot::{LineView, SessionSnapshot};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest quantity a cart line can hold.
pub const MIN_LINE_QUANTITY: u32 = 1;

/// Largest quantity a cart line can hold.
///
/// ## Business Reason
/// The quantity field on the register is two digits wide.
pub const MAX_LINE_QUANTITY: u32 = 99;
