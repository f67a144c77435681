//! # regi-client: Remote Services and the Register
//!
//! This crate connects the pure [`regi_core::CartSession`] to the outside
//! world: the product catalog, the purchase ledger, and the terminal's
//! configuration file.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Register Architecture                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     Register (register.rs)                       │  │
//! │  │                                                                  │  │
//! │  │  tokio Mutex<CartSession>, never held across a network call     │  │
//! │  │  Publishes snapshots + notices to a RegisterEventEmitter         │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┴─────────────────────┐                  │
//! │         ▼                                           ▼                   │
//! │  ┌────────────────┐                        ┌────────────────┐          │
//! │  │ ProductCatalog │                        │ PurchaseLedger │          │
//! │  │  HttpCatalog   │                        │  HttpLedger    │          │
//! │  │                │                        │                │          │
//! │  │ GET /products/ │                        │ POST /purchase/│          │
//! │  │ retry+backoff  │                        │ exactly once   │          │
//! │  └────────────────┘                        └────────────────┘          │
//! │                                                                         │
//! │  TerminalConfig (config.rs): defaults → terminal.toml → REGI_* env    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`adapter`] - `ProductCatalog` / `PurchaseLedger` contracts
//! - [`config`] - Terminal configuration (identity, service URL, timeouts)
//! - [`error`] - Client error types
//! - [`http`] - reqwest implementations of the adapters
//! - [`register`] - The async register driving the session
//!
//! ## Usage
//!
//! ```rust,ignore
//! use regi_client::{http, Register, TerminalConfig};
//!
//! let config = TerminalConfig::load(None)?;
//! let (catalog, ledger) = http::connect(&config.service)?;
//! let register = Register::new(config.identity(), catalog, ledger);
//!
//! register.load_product("4901234567890").await?;
//! register.add_staged_to_cart().await?;
//! let totals = register.submit_purchase().await?;
//! println!("Total: {}", totals.total_inclusive_tax);
//! register.dismiss_totals().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapter;
pub mod config;
pub mod error;
pub mod http;
pub mod register;

// =============================================================================
// Re-exports
// =============================================================================

pub use adapter::{ProductCatalog, PurchaseLedger};
pub use config::{ServiceSettings, TerminalConfig, TerminalSettings};
pub use error::{ClientError, ClientResult};
pub use http::{HttpCatalog, HttpLedger};
pub use register::{NoOpEmitter, Register, RegisterEventEmitter};
