//! # Cart Session
//!
//! The terminal's state machine. One `CartSession` exists per register; every
//! operator action is a method call here, and every screen is rendered from
//! the state it holds.
//!
//! ## Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Modes                                   │
//! │                                                                         │
//! │              begin_quantity_edit                                        │
//! │   ┌──────────┐ ─────────────────► ┌─────────────────┐                  │
//! │   │ Browsing │                    │ QuantityEditing │                  │
//! │   │          │ ◄───────────────── │  (draft, error) │                  │
//! │   └──────────┘  commit / cancel   └─────────────────┘                  │
//! │     │     ▲          / remove                                          │
//! │     │     │                                                             │
//! │     │     │ finish_checkout(Err)  ── cart untouched, retry allowed     │
//! │     │     │                                                             │
//! │     │  ┌─────────────────┐  finish_checkout(Ok)  ┌─────────────┐       │
//! │     └─►│ CheckoutPending │ ────────────────────► │ TotalsShown │       │
//! │ begin_ └─────────────────┘                       └──────┬──────┘       │
//! │ checkout                                                │               │
//! │     ▲                       dismiss_totals: cart, staged product and   │
//! │     └────────────────────── scan input all cleared ◄────┘               │
//! │                             (a no-op in any other mode)                 │
//! │                                                                         │
//! │  Orthogonal: `staged` (at most one scanned product awaiting "add")     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The popups and the in-flight checkout share one [`Mode`] enum, so the
//! quantity popup and the totals popup can never be open at once.
//!
//! ## No I/O
//! Adapter calls are split in two: `begin_lookup` / `finish_lookup` and
//! `begin_checkout` / `finish_checkout`. The caller performs the network call
//! in between, without holding any lock on the session.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::error::{AdapterError, CoreError, CoreResult, Operation, Popup};
use crate::snapshot::SessionSnapshot;
use crate::types::{Product, PurchaseRequest, PurchaseTotals, TerminalIdentity};
use crate::validation::{parse_quantity, validate_scan_code};

// =============================================================================
// Mode / Phase
// =============================================================================

/// What the session is doing besides holding the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// No popup open, nothing submitted.
    #[default]
    Browsing,

    /// The quantity popup is open for one line.
    QuantityEditing(QuantityEdit),

    /// A purchase request is in flight. The cart is frozen.
    CheckoutPending,

    /// The ledger recorded the purchase; its totals are on screen.
    TotalsShown(PurchaseTotals),
}

/// Coarse phase of the session, as a UI would label it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SessionPhase {
    Idle,
    ProductStaged,
    QuantityEditing,
    CheckoutPending,
    TotalsShown,
}

/// State of the quantity popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuantityEdit {
    /// Code of the line being edited.
    pub code: String,

    /// Name of the line being edited (popup title).
    pub name: String,

    /// Text in the quantity field, stored exactly as typed.
    pub draft: String,

    /// Message from the last rejected commit.
    pub error: Option<String>,
}

/// Proof that a lookup was started. Hand it back to
/// [`CartSession::finish_lookup`] with the adapter's answer.
#[derive(Debug)]
#[must_use = "a lookup must be finished with CartSession::finish_lookup"]
pub struct LookupTicket {
    code: String,
}

impl LookupTicket {
    /// The trimmed code to send to the catalog.
    pub fn code(&self) -> &str {
        &self.code
    }
}

// =============================================================================
// Cart Session
// =============================================================================

/// The register's working state: cart, staged product, scan field, popups.
#[derive(Debug, Clone)]
pub struct CartSession {
    identity: TerminalIdentity,
    cart: Cart,
    scan_input: String,
    staged: Option<Product>,
    mode: Mode,
    pending_lookup: Option<String>,
}

impl CartSession {
    /// Creates an empty session for the given operator/register identity.
    pub fn new(identity: TerminalIdentity) -> Self {
        CartSession {
            identity,
            cart: Cart::new(),
            scan_input: String::new(),
            staged: None,
            mode: Mode::Browsing,
            pending_lookup: None,
        }
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Replaces the text in the scan field (operator typing).
    pub fn set_scan_input(&mut self, text: impl Into<String>) -> CoreResult<()> {
        self.ensure_no_popup()?;
        self.scan_input = text.into();
        Ok(())
    }

    /// Starts a catalog lookup for `code`.
    ///
    /// ## Behavior
    /// - Empty/blank code: `InvalidInput`, nothing changes
    /// - Otherwise: the code is kept in the scan field, any previously staged
    ///   product is discarded, and the lookup is marked in flight
    /// - A second call before [`finish_lookup`](Self::finish_lookup) fails
    ///   with `Busy(Lookup)`
    pub fn begin_lookup(&mut self, code: &str) -> CoreResult<LookupTicket> {
        self.ensure_browsing()?;
        if self.pending_lookup.is_some() {
            return Err(CoreError::Busy(Operation::Lookup));
        }
        let trimmed = validate_scan_code(code).map_err(CoreError::InvalidInput)?;

        self.scan_input = code.to_string();
        self.staged = None;
        self.pending_lookup = Some(trimmed.to_string());

        Ok(LookupTicket {
            code: trimmed.to_string(),
        })
    }

    /// Applies the catalog's answer to a lookup started by
    /// [`begin_lookup`](Self::begin_lookup).
    ///
    /// ## Outcomes
    /// - `Ok(Some(product))`: the product is staged
    /// - `Ok(None)`: `ProductNotFound`, nothing staged, scan field kept
    /// - `Err(adapter)`: `ProductNotFound` with the adapter error as cause
    pub fn finish_lookup(
        &mut self,
        ticket: LookupTicket,
        outcome: Result<Option<Product>, AdapterError>,
    ) -> CoreResult<&Product> {
        if self.pending_lookup.as_deref() != Some(ticket.code.as_str()) {
            return Err(CoreError::StaleLookup(ticket.code));
        }
        self.pending_lookup = None;

        match outcome {
            Ok(Some(product)) => Ok(self.staged.insert(product)),
            Ok(None) => Err(CoreError::ProductNotFound {
                code: ticket.code,
                cause: None,
            }),
            Err(cause) => Err(CoreError::ProductNotFound {
                code: ticket.code,
                cause: Some(cause),
            }),
        }
    }

    /// Moves the staged product into the cart.
    ///
    /// ## Behavior
    /// - Nothing staged: `Ok(None)`, no effect
    /// - Same code already in cart: that line's quantity goes up by one
    /// - New code: appended with quantity 1
    /// - Afterwards the staged product and the scan field are cleared
    ///
    /// A line already at 99 rejects the increment with `QuantityLimit` and
    /// leaves everything (including the staged product) as it was.
    pub fn add_staged_to_cart(&mut self) -> CoreResult<Option<&CartLine>> {
        let Some(product) = self.staged.as_ref() else {
            return Ok(None);
        };
        self.ensure_browsing()?;

        let code = self.cart.add_product(product)?.code().to_string();
        self.staged = None;
        self.scan_input.clear();

        Ok(self.cart.get(&code))
    }

    // =========================================================================
    // Cart Editing
    // =========================================================================

    /// Removes the line with `code` (no-op if absent) and closes any open
    /// quantity popup.
    pub fn remove_from_cart(&mut self, code: &str) -> CoreResult<Option<CartLine>> {
        self.ensure_cart_editable()?;

        let removed = self.cart.remove(code);
        self.mode = Mode::Browsing;
        Ok(removed)
    }

    /// Opens the quantity popup for the line with `code`, seeding the draft
    /// with its current quantity. Re-targets an already open popup.
    pub fn begin_quantity_edit(&mut self, code: &str) -> CoreResult<&QuantityEdit> {
        self.ensure_cart_editable()?;

        let line = self
            .cart
            .get(code)
            .ok_or_else(|| CoreError::NotInCart(code.to_string()))?;

        let edit = QuantityEdit {
            code: line.code().to_string(),
            name: line.product.name.clone(),
            draft: line.quantity.to_string(),
            error: None,
        };
        self.mode = Mode::QuantityEditing(edit);

        match &self.mode {
            Mode::QuantityEditing(edit) => Ok(edit),
            _ => Err(CoreError::NoQuantityEdit),
        }
    }

    /// Stores the quantity field's text verbatim. Validation happens on
    /// commit so the operator can type freely.
    pub fn update_draft_quantity(&mut self, value: impl Into<String>) -> CoreResult<()> {
        match &mut self.mode {
            Mode::QuantityEditing(edit) => {
                edit.draft = value.into();
                Ok(())
            }
            _ => Err(CoreError::NoQuantityEdit),
        }
    }

    /// Validates the draft and, if it is within 1..=99, writes it to the line.
    ///
    /// ## Behavior
    /// - Invalid draft: the popup stays open with `error` set, the cart is
    ///   untouched, `InvalidQuantity` is returned
    /// - Valid draft: quantity overwritten, popup closed, staged product and
    ///   scan field cleared (same reset as after an add)
    pub fn commit_quantity_edit(&mut self) -> CoreResult<&CartLine> {
        let Mode::QuantityEditing(edit) = &mut self.mode else {
            return Err(CoreError::NoQuantityEdit);
        };

        let quantity = match parse_quantity(&edit.draft) {
            Ok(q) => q,
            Err(e) => {
                edit.error = Some(e.to_string());
                return Err(CoreError::InvalidQuantity(e));
            }
        };

        let code = edit.code.clone();
        self.mode = Mode::Browsing;
        self.cart.set_quantity(&code, quantity)?;
        self.staged = None;
        self.scan_input.clear();

        self.cart.get(&code).ok_or(CoreError::NotInCart(code))
    }

    /// Closes the quantity popup without touching the cart. Returns false if
    /// no popup was open.
    pub fn cancel_quantity_edit(&mut self) -> bool {
        if matches!(self.mode, Mode::QuantityEditing(_)) {
            self.mode = Mode::Browsing;
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Builds the purchase request and freezes the session until
    /// [`finish_checkout`](Self::finish_checkout).
    ///
    /// An empty cart is allowed; the ledger decides whether to accept it.
    /// Prices are never sent.
    pub fn begin_checkout(&mut self) -> CoreResult<PurchaseRequest> {
        self.ensure_browsing()?;

        let request = PurchaseRequest {
            emp_code: self.identity.emp_code.clone(),
            store_code: self.identity.store_code.clone(),
            pos_no: self.identity.pos_no.clone(),
            products: self.cart.purchase_lines(),
        };
        self.mode = Mode::CheckoutPending;

        Ok(request)
    }

    /// Applies the ledger's answer.
    ///
    /// ## Outcomes
    /// - `Ok(totals)`: the totals popup opens; the cart is kept until dismissed
    /// - `Err(adapter)`: back to browsing with cart, staged product and scan
    ///   field exactly as before `begin_checkout`; `CheckoutFailed` returned
    pub fn finish_checkout(
        &mut self,
        outcome: Result<PurchaseTotals, AdapterError>,
    ) -> CoreResult<PurchaseTotals> {
        if self.mode != Mode::CheckoutPending {
            return Err(CoreError::NoCheckoutPending);
        }

        match outcome {
            Ok(totals) => {
                self.mode = Mode::TotalsShown(totals);
                Ok(totals)
            }
            Err(cause) => {
                self.mode = Mode::Browsing;
                Err(CoreError::CheckoutFailed(cause))
            }
        }
    }

    /// Closes the totals popup and resets the register for the next customer:
    /// cart, staged product and scan field are all cleared.
    ///
    /// Returns the totals that were on screen. Without an open totals popup
    /// this is `Ok(None)` and nothing changes; while a checkout is in flight
    /// it is refused with `Busy(Checkout)`.
    pub fn dismiss_totals(&mut self) -> CoreResult<Option<PurchaseTotals>> {
        let shown = match &self.mode {
            Mode::TotalsShown(totals) => *totals,
            Mode::CheckoutPending => return Err(CoreError::Busy(Operation::Checkout)),
            Mode::Browsing | Mode::QuantityEditing(_) => return Ok(None),
        };

        self.mode = Mode::Browsing;
        self.cart.clear();
        self.staged = None;
        self.scan_input.clear();

        Ok(Some(shown))
    }

    /// Forgets a lookup whose answer will never be applied (the caller gave
    /// up on it). Returns false if `code` is not the lookup in flight.
    pub fn abandon_lookup(&mut self, code: &str) -> bool {
        if self.pending_lookup.as_deref() != Some(code) {
            return false;
        }
        self.pending_lookup = None;
        true
    }

    /// Unfreezes the session after a checkout whose answer will never be
    /// applied. The cart is kept as it was, same as after a failed submit.
    /// Returns false if no checkout was in flight.
    pub fn abandon_checkout(&mut self) -> bool {
        if self.mode != Mode::CheckoutPending {
            return false;
        }
        self.mode = Mode::Browsing;
        true
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn identity(&self) -> &TerminalIdentity {
        &self.identity
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn scan_input(&self) -> &str {
        &self.scan_input
    }

    pub fn staged(&self) -> Option<&Product> {
        self.staged.as_ref()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// The open quantity popup, if any.
    pub fn quantity_edit(&self) -> Option<&QuantityEdit> {
        match &self.mode {
            Mode::QuantityEditing(edit) => Some(edit),
            _ => None,
        }
    }

    /// The totals on screen, if the totals popup is open.
    pub fn totals(&self) -> Option<&PurchaseTotals> {
        match &self.mode {
            Mode::TotalsShown(totals) => Some(totals),
            _ => None,
        }
    }

    /// Code of the lookup currently in flight.
    pub fn pending_lookup(&self) -> Option<&str> {
        self.pending_lookup.as_deref()
    }

    pub fn is_checkout_pending(&self) -> bool {
        self.mode == Mode::CheckoutPending
    }

    /// The session's phase, derived from its mode and staged product.
    pub fn phase(&self) -> SessionPhase {
        match &self.mode {
            Mode::TotalsShown(_) => SessionPhase::TotalsShown,
            Mode::CheckoutPending => SessionPhase::CheckoutPending,
            Mode::QuantityEditing(_) => SessionPhase::QuantityEditing,
            Mode::Browsing if self.staged.is_some() => SessionPhase::ProductStaged,
            Mode::Browsing => SessionPhase::Idle,
        }
    }

    /// Serializable view of everything the UI renders.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(self)
    }

    // =========================================================================
    // Guards
    // =========================================================================

    fn ensure_browsing(&self) -> CoreResult<()> {
        match self.mode {
            Mode::Browsing => Ok(()),
            Mode::QuantityEditing(_) => Err(CoreError::PopupOpen(Popup::Quantity)),
            Mode::CheckoutPending => Err(CoreError::Busy(Operation::Checkout)),
            Mode::TotalsShown(_) => Err(CoreError::PopupOpen(Popup::Totals)),
        }
    }

    /// Remove and re-target are allowed from behind the quantity popup.
    fn ensure_cart_editable(&self) -> CoreResult<()> {
        match self.mode {
            Mode::QuantityEditing(_) => Ok(()),
            _ => self.ensure_browsing(),
        }
    }

    fn ensure_no_popup(&self) -> CoreResult<()> {
        match self.mode {
            Mode::QuantityEditing(_) => Err(CoreError::PopupOpen(Popup::Quantity)),
            Mode::TotalsShown(_) => Err(CoreError::PopupOpen(Popup::Totals)),
            Mode::Browsing | Mode::CheckoutPending => Ok(()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
