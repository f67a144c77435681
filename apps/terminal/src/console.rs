//! # Operator Console
//!
//! Reads commands line by line, runs them against the [`Register`], and
//! redraws the screen after each one.
//!
//! ```text
//! ┌──────────┐   parse    ┌─────────┐  execute  ┌──────────┐
//! │  line    │ ─────────► │ Command │ ────────► │ Register │
//! └──────────┘            └─────────┘           └────┬─────┘
//!      ▲                                             │
//!      │        "! notice" on refusal / failure      │
//!      └──────────── render(snapshot) ◄──────────────┘
//! ```
//!
//! No operator error ends the loop; only `quit`, end of input, or a broken
//! stdout does.

use regi_client::{ClientResult, ProductCatalog, PurchaseLedger, Register};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::command::{Command, HELP};
use crate::error::TerminalResult;
use crate::render::render;

/// Runs one session-changing command and describes what happened.
///
/// `Show`, `Help` and `Quit` are console-only and produce no message.
pub async fn execute<C, L>(register: &Register<C, L>, command: &Command) -> ClientResult<Option<String>>
where
    C: ProductCatalog,
    L: PurchaseLedger,
{
    let message = match command {
        Command::Scan(code) => {
            let product = register.load_product(code).await?;
            format!(
                "Found {} ({}). Type 'add' to add it.",
                product.name, product.price
            )
        }
        Command::Add => match register.add_staged_to_cart().await? {
            Some(line) => format!("Added {} (qty {})", line.product.name, line.quantity),
            None => "Nothing staged. Scan a product first.".to_string(),
        },
        Command::Remove(code) => match register.remove_from_cart(code).await? {
            Some(line) => format!("Removed {}", line.product.name),
            None => format!("{code} is not in the cart"),
        },
        Command::Quantity(code) => {
            let edit = register.begin_quantity_edit(code).await?;
            format!("Editing quantity of {}", edit.name)
        }
        Command::Set(value) => {
            register.update_draft_quantity(value).await?;
            return Ok(None);
        }
        Command::Confirm => {
            let line = register.commit_quantity_edit().await?;
            format!("{} quantity set to {}", line.product.name, line.quantity)
        }
        Command::Cancel => {
            if register.cancel_quantity_edit().await {
                "Quantity unchanged".to_string()
            } else {
                "No quantity popup is open".to_string()
            }
        }
        Command::Buy => {
            let totals = register.submit_purchase().await?;
            format!("Purchase recorded: {}", totals.total_inclusive_tax)
        }
        Command::Close => match register.dismiss_totals().await? {
            Some(_) => "Ready for the next customer".to_string(),
            None => "No totals popup is open".to_string(),
        },
        Command::Show | Command::Help | Command::Quit => return Ok(None),
    };

    Ok(Some(message))
}

/// The read/execute/render loop.
pub async fn run_console<C, L, R, W>(
    register: &Register<C, L>,
    input: R,
    mut output: W,
) -> TerminalResult<()>
where
    C: ProductCatalog,
    L: PurchaseLedger,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    output
        .write_all(b"Regi terminal ready. Type 'help' for commands.\n")
        .await?;
    output
        .write_all(render(&register.snapshot().await).as_bytes())
        .await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                output.write_all(format!("! {e}\n").as_bytes()).await?;
                output.flush().await?;
                continue;
            }
        };
        debug!(?command, "Console command");

        match command {
            Command::Quit => break,
            Command::Help => {
                output.write_all(format!("{HELP}\n").as_bytes()).await?;
            }
            _ => {
                match execute(register, &command).await {
                    Ok(Some(message)) => {
                        output.write_all(format!("{message}\n").as_bytes()).await?;
                    }
                    Ok(None) => {}
                    Err(e) if e.is_operator_notice() => {
                        output.write_all(format!("! {e}\n").as_bytes()).await?;
                    }
                    Err(e) => return Err(e.into()),
                }
                output
                    .write_all(render(&register.snapshot().await).as_bytes())
                    .await?;
            }
        }
        output.flush().await?;
    }

    output.write_all(b"Bye.\n").await?;
    output.flush().await?;
    Ok(())
}
