//! # Operator Commands
//!
//! One command per input line: a keyword, then (for some) an argument.
//!
//! ```text
//! scan 4901234567890     look a code up and stage it
//! add                    put the staged product in the cart
//! rm A1                  remove a line
//! qty A1                 open the quantity popup
//! set 5                  type into the quantity popup
//! ok | cancel            confirm or close the quantity popup
//! buy                    submit the purchase
//! close                  close the totals popup, next customer
//! show | help | quit
//! ```

use std::str::FromStr;

use thiserror::Error;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan(String),
    Add,
    Remove(String),
    Quantity(String),
    Set(String),
    Confirm,
    Cancel,
    Buy,
    Close,
    Show,
    Help,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list.")]
    Unknown(String),

    #[error("'{command}' needs a {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |command: &'static str, argument: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingArgument { command, argument })
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_lowercase().as_str() {
            // The session reports an empty code itself
            "scan" | "s" => Ok(Command::Scan(rest.to_string())),
            "add" | "a" => Ok(Command::Add),
            "rm" | "remove" => required("rm", "product code").map(Command::Remove),
            "qty" | "q" => required("qty", "product code").map(Command::Quantity),
            // Argument is trimmed like the others; an empty draft is allowed
            "set" => Ok(Command::Set(rest.to_string())),
            "ok" => Ok(Command::Confirm),
            "cancel" => Ok(Command::Cancel),
            "buy" => Ok(Command::Buy),
            "close" => Ok(Command::Close),
            "show" | "ls" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Text printed by `help`.
pub const HELP: &str = "\
Commands:
  scan <code>   look up a product and stage it
  add           add the staged product to the cart
  rm <code>     remove a line from the cart
  qty <code>    change a line's quantity
  set <value>   type a quantity into the open popup
  ok            confirm the quantity
  cancel        close the quantity popup
  buy           submit the purchase
  close         close the totals and start the next customer
  show          redraw the screen
  quit          leave the terminal";
