//! Line-oriented cart session.
//!
//! Reads one command per line and applies it to a shared cart:
//!
//! ```text
//! add <id> [key=value ...]
//! remove <id>
//! qty <id> <quantity>
//! clear
//! revision on|off
//! show
//! help
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::Result;
use serde_json::Value;
use std::io::{BufRead, Write};
use tepian_app::{CartOutcome, ItemId, Product, UiCart};
use thiserror::Error;

const HELP: &str = "commands: add <id> [key=value ...] | remove <id> | qty <id> <n> | clear \
                    | revision on|off | show | help";

/// A parsed session line.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Add one unit of a product
    Add {
        /// Product id
        id: ItemId,
        /// Extra product fields
        fields: Vec<(String, Value)>,
    },
    /// Remove an item
    Remove {
        /// Item id
        id: ItemId,
    },
    /// Set an item's quantity
    Quantity {
        /// Item id
        id: ItemId,
        /// New quantity; below 1 removes
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Enter or leave revision mode
    Revision(bool),
    /// Print the cart
    Show,
    /// Print the command list
    Help,
}

/// Session line parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// First word is not a known command.
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    /// A required argument is absent.
    #[error("'{command}' needs <{argument}>")]
    MissingArgument {
        /// Command being parsed
        command: &'static str,
        /// Name of the missing argument
        argument: &'static str,
    },

    /// Quantity is not an integer.
    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),

    /// Field is not `key=value`.
    #[error("invalid field '{0}', expected key=value")]
    InvalidField(String),

    /// Revision flag is not `on`/`off`.
    #[error("invalid revision flag '{0}', expected on or off")]
    InvalidRevision(String),

    /// Extra words after a complete command.
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// Parse `key=value`. Values that are valid JSON scalars keep their type;
/// anything else becomes a string.
pub fn parse_field(raw: &str) -> Result<(String, Value), ParseError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| ParseError::InvalidField(raw.to_string()))?;

    let value = match serde_json::from_str::<Value>(value) {
        Ok(parsed @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => parsed,
        _ => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

fn parse_id(
    words: &mut std::str::SplitWhitespace<'_>,
    command: &'static str,
) -> Result<ItemId, ParseError> {
    let raw = words.next().ok_or(ParseError::MissingArgument {
        command,
        argument: "id",
    })?;
    Ok(raw.parse().unwrap_or_else(|never| match never {}))
}

fn expect_end(words: &mut std::str::SplitWhitespace<'_>) -> Result<(), ParseError> {
    match words.next() {
        Some(extra) => Err(ParseError::UnexpectedArgument(extra.to_string())),
        None => Ok(()),
    }
}

/// Parse one line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<SessionCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let parsed = match command {
        "add" => {
            let id = parse_id(&mut words, "add")?;
            let fields = words.map(parse_field).collect::<Result<Vec<_>, _>>()?;
            return Ok(Some(SessionCommand::Add { id, fields }));
        }
        "remove" | "rm" => SessionCommand::Remove {
            id: parse_id(&mut words, "remove")?,
        },
        "qty" | "quantity" => {
            let id = parse_id(&mut words, "qty")?;
            let raw = words.next().ok_or(ParseError::MissingArgument {
                command: "qty",
                argument: "quantity",
            })?;
            let quantity = raw
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidQuantity(raw.to_string()))?;
            SessionCommand::Quantity { id, quantity }
        }
        "clear" => SessionCommand::Clear,
        "revision" => {
            let raw = words.next().ok_or(ParseError::MissingArgument {
                command: "revision",
                argument: "on|off",
            })?;
            match raw {
                "on" | "true" => SessionCommand::Revision(true),
                "off" | "false" => SessionCommand::Revision(false),
                other => return Err(ParseError::InvalidRevision(other.to_string())),
            }
        }
        "show" => SessionCommand::Show,
        "help" => SessionCommand::Help,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    expect_end(&mut words)?;
    Ok(Some(parsed))
}

/// Build a product from an id and `key=value` fields.
pub fn product(id: ItemId, fields: Vec<(String, Value)>) -> Product {
    fields
        .into_iter()
        .fold(Product::new(id), |product, (key, value)| product.with_field(key, value))
}

/// Apply a command and render the line to print.
pub fn execute(cart: &UiCart, command: SessionCommand) -> Result<String> {
    let outcome = match command {
        SessionCommand::Add { id, fields } => cart.add_item(product(id, fields)),
        SessionCommand::Remove { id } => cart.remove_item(&id),
        SessionCommand::Quantity { id, quantity } => cart.update_quantity(&id, quantity),
        SessionCommand::Clear => cart.clear_cart(),
        SessionCommand::Revision(flag) => cart.set_revision_mode(flag),
        SessionCommand::Show => return Ok(serde_json::to_string_pretty(&cart.snapshot())?),
        SessionCommand::Help => return Ok(HELP.to_string()),
    };
    Ok(summary(cart, outcome))
}

/// One-line status after a mutation.
pub fn summary(cart: &UiCart, outcome: CartOutcome) -> String {
    let label = match outcome {
        CartOutcome::Applied => "ok",
        CartOutcome::Unchanged => "unchanged",
        CartOutcome::Suppressed => "suppressed (revision mode)",
    };
    let core = cart.read();
    format!(
        "{label}: items={} count={} revision={}",
        core.items().len(),
        core.count(),
        core.revision_mode()
    )
}

/// Run commands from `input` until EOF, writing results to `output`.
///
/// Parse errors are reported inline and do not stop the session.
pub fn run<R: BufRead, W: Write>(cart: &UiCart, input: R, mut output: W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(Some(command)) => writeln!(output, "{}", execute(cart, command)?)?,
            Ok(None) => {}
            Err(e) => writeln!(output, "error: {e}")?,
        }
    }
    output.flush()?;
    Ok(())
}
