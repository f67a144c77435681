//! # Register
//!
//! The async owner of one [`CartSession`] and its two adapters.
//!
//! ## Lock Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    load_product("A1")                                   │
//! │                                                                         │
//! │  lock ──► begin_lookup ──► unlock                                       │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                 catalog.fetch_product("A1").await   (no lock held)      │
//! │                              │                                          │
//! │  lock ──► finish_lookup ◄────┘ ──► emit snapshot ──► unlock             │
//! │                                                                         │
//! │  While the call is out:                                                 │
//! │  • a second load_product fails fast with Busy(Lookup)                  │
//! │  • during a checkout every cart mutation fails with Busy(Checkout)     │
//! │  • reads (snapshot) are always served                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every completed operation publishes a fresh [`SessionSnapshot`] through
//! the [`RegisterEventEmitter`]; refused or failed ones also publish an
//! operator notice.
//!
//! ## Dropped Operations
//! A `load_product` or `submit_purchase` future dropped while the adapter call
//! is out (`tokio::time::timeout`, `select!`, an aborted task) undoes its
//! `begin_*` step on drop: the lookup is forgotten, or the frozen cart is
//! released untouched. A dropped submit may still have reached the ledger.

use std::sync::Arc;

use regi_core::{
    CartLine, CartSession, CoreResult, Product, PurchaseTotals, QuantityEdit, SessionSnapshot,
    TerminalIdentity,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapter::{ProductCatalog, PurchaseLedger};

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives register state changes (implemented by a UI integration).
pub trait RegisterEventEmitter: Send + Sync {
    /// Emits the session state after an operation.
    fn emit_snapshot(&self, snapshot: &SessionSnapshot);

    /// Emits a message the operator should see.
    fn emit_notice(&self, message: &str, from_service: bool);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl RegisterEventEmitter for NoOpEmitter {
    fn emit_snapshot(&self, _snapshot: &SessionSnapshot) {}
    fn emit_notice(&self, _message: &str, _from_service: bool) {}
}

// =============================================================================
// Register
// =============================================================================

/// One register: session, catalog, ledger.
pub struct Register<C, L> {
    session: Arc<Mutex<CartSession>>,
    catalog: C,
    ledger: L,
    emitter: Arc<dyn RegisterEventEmitter>,
    session_id: Uuid,
}

impl<C, L> Register<C, L>
where
    C: ProductCatalog,
    L: PurchaseLedger,
{
    /// Creates a register with an empty session.
    pub fn new(identity: TerminalIdentity, catalog: C, ledger: L) -> Self {
        Self::with_emitter(identity, catalog, ledger, Arc::new(NoOpEmitter))
    }

    /// Creates a register that reports state changes to `emitter`.
    pub fn with_emitter(
        identity: TerminalIdentity,
        catalog: C,
        ledger: L,
        emitter: Arc<dyn RegisterEventEmitter>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        info!(
            %session_id,
            store_code = %identity.store_code,
            pos_no = %identity.pos_no,
            "Register session started"
        );

        Register {
            session: Arc::new(Mutex::new(CartSession::new(identity))),
            catalog,
            ledger,
            emitter,
            session_id,
        }
    }

    /// Id attached to this register's log lines.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current state for rendering.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Executes a function with read access to the session.
    pub async fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartSession) -> R,
    {
        let session = self.session.lock().await;
        f(&session)
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Replaces the scan field's text.
    pub async fn set_scan_input(&self, text: &str) -> CoreResult<()> {
        self.mutate("set_scan_input", |s| s.set_scan_input(text))
            .await
    }

    /// Looks `code` up in the catalog and stages the result.
    pub async fn load_product(&self, code: &str) -> CoreResult<Product> {
        let ticket = self
            .mutate("load_product", |s| s.begin_lookup(code))
            .await?;

        let in_flight = self.undo_on_drop(InFlight::Lookup(ticket.code().to_string()));

        debug!(session_id = %self.session_id, code = ticket.code(), "Catalog lookup started");
        let outcome = self.catalog.fetch_product(ticket.code()).await;

        self.mutate("load_product", move |s| {
            in_flight.disarm();
            s.finish_lookup(ticket, outcome).map(Product::clone)
        })
        .await
    }

    /// Moves the staged product into the cart.
    pub async fn add_staged_to_cart(&self) -> CoreResult<Option<CartLine>> {
        self.mutate("add_staged_to_cart", |s| {
            s.add_staged_to_cart().map(|line| line.cloned())
        })
        .await
    }

    // =========================================================================
    // Cart Editing
    // =========================================================================

    /// Removes a line (no-op if absent) and closes the quantity popup.
    pub async fn remove_from_cart(&self, code: &str) -> CoreResult<Option<CartLine>> {
        self.mutate("remove_from_cart", |s| s.remove_from_cart(code))
            .await
    }

    /// Opens the quantity popup for a line.
    pub async fn begin_quantity_edit(&self, code: &str) -> CoreResult<QuantityEdit> {
        self.mutate("begin_quantity_edit", |s| {
            s.begin_quantity_edit(code).map(QuantityEdit::clone)
        })
        .await
    }

    /// Stores the popup's draft text verbatim.
    pub async fn update_draft_quantity(&self, value: &str) -> CoreResult<()> {
        self.mutate("update_draft_quantity", |s| s.update_draft_quantity(value))
            .await
    }

    /// Validates and applies the draft.
    pub async fn commit_quantity_edit(&self) -> CoreResult<CartLine> {
        self.mutate("commit_quantity_edit", |s| {
            s.commit_quantity_edit().map(CartLine::clone)
        })
        .await
    }

    /// Closes the quantity popup. Returns false if none was open.
    pub async fn cancel_quantity_edit(&self) -> bool {
        let mut session = self.session.lock().await;
        let closed = session.cancel_quantity_edit();
        if closed {
            self.emitter.emit_snapshot(&session.snapshot());
        }
        closed
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submits the cart to the ledger and opens the totals popup.
    ///
    /// A failed submit leaves the cart as it was so the operator can retry.
    /// The ledger is called exactly once per invocation.
    pub async fn submit_purchase(&self) -> CoreResult<PurchaseTotals> {
        let request = self
            .mutate("submit_purchase", |s| s.begin_checkout())
            .await?;

        let in_flight = self.undo_on_drop(InFlight::Checkout);

        let attempt_id = Uuid::new_v4();
        info!(
            session_id = %self.session_id,
            %attempt_id,
            lines = request.products.len(),
            "Submitting purchase"
        );
        let outcome = self.ledger.submit_purchase(&request).await;

        let result = self
            .mutate("submit_purchase", move |s| {
                in_flight.disarm();
                s.finish_checkout(outcome)
            })
            .await;
        match &result {
            Ok(totals) => info!(
                session_id = %self.session_id,
                %attempt_id,
                total = %totals.total_inclusive_tax,
                total_ex_tax = %totals.total_exclusive_tax,
                "Purchase recorded"
            ),
            Err(e) => warn!(session_id = %self.session_id, %attempt_id, error = %e, "Purchase not recorded"),
        }
        result
    }

    /// Closes the totals popup and empties the register.
    pub async fn dismiss_totals(&self) -> CoreResult<Option<PurchaseTotals>> {
        self.mutate("dismiss_totals", |s| s.dismiss_totals())
            .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn undo_on_drop(&self, work: InFlight) -> InFlightGuard {
        InFlightGuard {
            session: Arc::clone(&self.session),
            emitter: Arc::clone(&self.emitter),
            session_id: self.session_id,
            work: Some(work),
        }
    }

    /// Runs one session transition under the lock and publishes the result.
    async fn mutate<R, F>(&self, op: &'static str, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut CartSession) -> CoreResult<R>,
    {
        let mut session = self.session.lock().await;
        let result = f(&mut session);

        match &result {
            Ok(_) => debug!(
                session_id = %self.session_id,
                op,
                phase = ?session.phase(),
                lines = session.cart().len(),
                "Session updated"
            ),
            Err(e) if e.is_adapter_failure() => {
                warn!(session_id = %self.session_id, op, error = %e, "Remote service failed");
                self.emitter.emit_notice(&e.to_string(), true);
            }
            Err(e) => {
                debug!(session_id = %self.session_id, op, error = %e, "Operation refused");
                self.emitter.emit_notice(&e.to_string(), false);
            }
        }

        self.emitter.emit_snapshot(&session.snapshot());
        result
    }
}

// =============================================================================
// In-Flight Guard
// =============================================================================

/// A `begin_*` step whose `finish_*` has not run yet.
#[derive(Debug)]
enum InFlight {
    Lookup(String),
    Checkout,
}

impl InFlight {
    fn undo(self, session: &mut CartSession, emitter: &dyn RegisterEventEmitter, session_id: Uuid) {
        let undone = match &self {
            InFlight::Lookup(code) => session.abandon_lookup(code),
            InFlight::Checkout => session.abandon_checkout(),
        };
        if undone {
            warn!(%session_id, work = ?self, "Operation dropped before the service answered");
            emitter.emit_snapshot(&session.snapshot());
        }
    }
}

/// Undoes an [`InFlight`] step if dropped before [`disarm`](Self::disarm).
struct InFlightGuard {
    session: Arc<Mutex<CartSession>>,
    emitter: Arc<dyn RegisterEventEmitter>,
    session_id: Uuid,
    work: Option<InFlight>,
}

impl InFlightGuard {
    /// Called under the session lock, right before `finish_*`.
    fn disarm(mut self) {
        self.work = None;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let Some(work) = self.work.take() else {
            return;
        };

        if let Ok(mut session) = self.session.try_lock() {
            work.undo(&mut session, self.emitter.as_ref(), self.session_id);
            return;
        }

        // Another task holds the session; undo once it is released
        let session = Arc::clone(&self.session);
        let emitter = Arc::clone(&self.emitter);
        let session_id = self.session_id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut session = session.lock().await;
                    work.undo(&mut session, emitter.as_ref(), session_id);
                });
            }
            Err(_) => warn!(%session_id, ?work, "No runtime left to undo a dropped operation"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
