//! # Screen Rendering
//!
//! Draws a [`SessionSnapshot`] as plain text.
//!
//! ```text
//! ════════════════════════════════════════════════════════════
//!  Scan: A1                         Staged: Tea  ¥150
//! ────────────────────────────────────────────────────────────
//!   #  Code             Name                 Price  Qty  Subtotal
//!   1  A1               Tea                   ¥150    5      ¥750
//! ────────────────────────────────────────────────────────────
//!   Items: 5                                    Subtotal: ¥750
//! ════════════════════════════════════════════════════════════
//! ```

use std::fmt::Write;

use regi_core::{SessionPhase, SessionSnapshot};

const HEAVY_RULE: &str = "════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str = "────────────────────────────────────────────────────────────";

/// Renders the whole screen.
pub fn render(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = write_screen(&mut out, snapshot);
    out
}

fn write_screen(out: &mut String, snap: &SessionSnapshot) -> std::fmt::Result {
    writeln!(out, "{HEAVY_RULE}")?;

    let staged = match (&snap.staged, snap.lookup_pending) {
        (_, true) => "looking up...".to_string(),
        (Some(product), false) => format!("Staged: {}  {}", product.name, product.price),
        (None, false) => String::new(),
    };
    writeln!(out, " Scan: {:<26} {}", snap.scan_input, staged)?;
    writeln!(out, "{LIGHT_RULE}")?;

    if snap.lines.is_empty() {
        writeln!(out, "  (cart is empty)")?;
    } else {
        writeln!(
            out,
            "  {:>2}  {:<16} {:<18} {:>7} {:>4} {:>9}",
            "#", "Code", "Name", "Price", "Qty", "Subtotal"
        )?;
        for (i, line) in snap.lines.iter().enumerate() {
            writeln!(
                out,
                "  {:>2}  {:<16} {:<18} {:>7} {:>4} {:>9}",
                i + 1,
                line.code,
                line.name,
                line.unit_price.to_string(),
                line.quantity,
                line.line_total.to_string()
            )?;
        }
    }

    writeln!(out, "{LIGHT_RULE}")?;
    writeln!(
        out,
        "  Items: {:<28} Subtotal: {}",
        snap.total_quantity, snap.subtotal
    )?;

    if let Some(edit) = &snap.quantity_edit {
        writeln!(out, "{LIGHT_RULE}")?;
        writeln!(out, "  [ Quantity: {} ({}) ]", edit.name, edit.code)?;
        writeln!(out, "    Quantity: {}_", edit.draft)?;
        if let Some(error) = &edit.error {
            writeln!(out, "    ! {error}")?;
        }
        writeln!(out, "    'set <n>' then 'ok', or 'cancel'")?;
    }

    if snap.phase == SessionPhase::CheckoutPending {
        writeln!(out, "{LIGHT_RULE}")?;
        writeln!(out, "  Submitting purchase...")?;
    }

    if let Some(totals) = &snap.totals {
        writeln!(out, "{LIGHT_RULE}")?;
        writeln!(out, "  [ Purchase complete ]")?;
        writeln!(out, "    Total (incl. tax): {}", totals.total_inclusive_tax)?;
        writeln!(out, "    Total (excl. tax): {}", totals.total_exclusive_tax)?;
        writeln!(out, "    'close' for the next customer")?;
    }

    writeln!(out, "{HEAVY_RULE}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use regi_core::{CartSession, Money, Product, PurchaseTotals, TerminalIdentity};

    fn session_with_tea(quantity: &str) -> CartSession {
        let mut session = CartSession::new(TerminalIdentity::new("9999999999", "30", "90"));
        let ticket = session.begin_lookup("A1").unwrap();
        session
            .finish_lookup(ticket, Ok(Some(Product::new("A1", "Tea", Money::from_minor(150)))))
            .unwrap();
        session.add_staged_to_cart().unwrap();
        session.begin_quantity_edit("A1").unwrap();
        session.update_draft_quantity(quantity).unwrap();
        session.commit_quantity_edit().unwrap();
        session
    }

    #[test]
    fn test_render_empty_session() {
        let session = CartSession::new(TerminalIdentity::new("9999999999", "30", "90"));
        let screen = render(&session.snapshot());
        assert!(screen.contains("(cart is empty)"));
        assert!(screen.contains("Subtotal: ¥0"));
    }

    #[test]
    fn test_render_lines_and_subtotal() {
        let session = session_with_tea("12");
        let screen = render(&session.snapshot());

        assert!(screen.contains("Tea"));
        assert!(screen.contains("¥150"));
        assert!(screen.contains("¥1,800"));
        assert!(screen.contains("Items: 12"));
    }

    #[test]
    fn test_render_quantity_popup_with_error() {
        let mut session = session_with_tea("2");
        session.begin_quantity_edit("A1").unwrap();
        session.update_draft_quantity("0").unwrap();
        session.commit_quantity_edit().unwrap_err();

        let screen = render(&session.snapshot());
        assert!(screen.contains("[ Quantity: Tea (A1) ]"));
        assert!(screen.contains("Quantity: 0_"));
        assert!(screen.contains("! quantity must be between 1 and 99"));
    }

    #[test]
    fn test_render_totals_popup() {
        let mut session = session_with_tea("5");
        session.begin_checkout().unwrap();
        session
            .finish_checkout(Ok(PurchaseTotals::new(
                Money::from_minor(825),
                Money::from_minor(750),
            )))
            .unwrap();

        let screen = render(&session.snapshot());
        assert!(screen.contains("[ Purchase complete ]"));
        assert!(screen.contains("Total (incl. tax): ¥825"));
        assert!(screen.contains("Total (excl. tax): ¥750"));
    }
}
