//! # Session Snapshot
//!
//! A flat, serializable copy of everything the register screen shows.
//! Built from a [`CartSession`] while its lock is held, then rendered or
//! shipped to a UI after the lock is released.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::money::Money;
use crate::session::{CartSession, QuantityEdit, SessionPhase};
use crate::types::{Product, PurchaseTotals};

/// One cart row as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineView {
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl From<&CartLine> for LineView {
    fn from(line: &CartLine) -> Self {
        LineView {
            code: line.code().to_string(),
            name: line.product.name.clone(),
            unit_price: line.product.price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub scan_input: String,
    pub staged: Option<Product>,
    pub lines: Vec<LineView>,
    pub total_quantity: u32,
    pub subtotal: Money,
    pub quantity_edit: Option<QuantityEdit>,
    pub totals: Option<PurchaseTotals>,
    pub lookup_pending: bool,
}

impl From<&CartSession> for SessionSnapshot {
    fn from(session: &CartSession) -> Self {
        let cart = session.cart();
        SessionSnapshot {
            phase: session.phase(),
            scan_input: session.scan_input().to_string(),
            staged: session.staged().cloned(),
            lines: cart.lines().iter().map(LineView::from).collect(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            quantity_edit: session.quantity_edit().cloned(),
            totals: session.totals().copied(),
            lookup_pending: session.pending_lookup().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TerminalIdentity;

    #[test]
    fn test_snapshot_reflects_session() {
        let mut session = CartSession::new(TerminalIdentity::new("1", "30", "90"));
        let ticket = session.begin_lookup("A1").unwrap();
        session
            .finish_lookup(
                ticket,
                Ok(Some(Product::new("A1", "Tea", Money::from_minor(150)))),
            )
            .unwrap();
        session.add_staged_to_cart().unwrap();
        session.begin_quantity_edit("A1").unwrap();
        session.update_draft_quantity("3").unwrap();
        session.commit_quantity_edit().unwrap();

        let snap = session.snapshot();
        assert_eq!(snap.phase, SessionPhase::Idle);
        assert_eq!(snap.lines.len(), 1);
        assert_eq!(snap.lines[0].line_total, Money::from_minor(450));
        assert_eq!(snap.subtotal, Money::from_minor(450));
        assert_eq!(snap.total_quantity, 3);
        assert!(snap.quantity_edit.is_none());
        assert!(!snap.lookup_pending);
    }

    #[test]
    fn test_snapshot_serializes_phase_in_snake_case() {
        let session = CartSession::new(TerminalIdentity::new("1", "30", "90"));
        let value = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(value["phase"], "idle");
        assert_eq!(value["subtotal"], 0);
    }
}
