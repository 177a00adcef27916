//! Tepian CLI
//!
//! Command-line host for the Tepian K3 cart. Loads configuration, sets up
//! logging, opens the configured storage, and builds the cart once before
//! dispatching a subcommand against it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tepian_app::{CartCore, CartObserver, CartWarning, ItemId, UiCart};
use tepian_core::{StorageEffects, TepianConfig};
use tepian_effects::storage_from_config;
use tracing_subscriber::EnvFilter;

mod session;

use session::SessionCommand;

#[derive(Parser)]
#[command(name = "tepian")]
#[command(about = "Tepian K3 - equipment and personnel cart", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "tepian.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored cart as JSON
    Show,

    /// Add one unit of a product
    Add {
        /// Product id (integer or text)
        id: ItemId,

        /// Product field as key=value; repeatable
        #[arg(short, long = "field", value_parser = parse_field_arg)]
        fields: Vec<(String, Value)>,
    },

    /// Remove an item
    Remove {
        /// Item id
        id: ItemId,
    },

    /// Set an item's quantity; values below 1 remove it
    SetQuantity {
        /// Item id
        id: ItemId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove every item
    Clear,

    /// Delete the stored cart entry
    ResetStorage,

    /// Read commands from stdin, one per line (revision mode lives for the session)
    Session,
}

fn parse_field_arg(raw: &str) -> Result<(String, Value), session::ParseError> {
    session::parse_field(raw)
}

/// Prints cart warnings to stderr so stdout stays machine-readable.
struct ConsoleObserver;

impl CartObserver for ConsoleObserver {
    fn on_warning(&self, warning: &CartWarning) {
        eprintln!("warning: {warning}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TepianConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Initialize logging; stdout is reserved for command output
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(io::stderr)
        .init();

    let storage = storage_from_config(&config.storage).context("opening cart storage")?;
    tracing::debug!(
        backend = storage.backend_type(),
        key = %config.cart.storage_key,
        "Opened cart storage"
    );

    let command = match cli.command {
        Commands::ResetStorage => {
            return reset_storage(storage.as_ref(), &config.cart.storage_key);
        }
        Commands::Show => Some(SessionCommand::Show),
        Commands::Add { id, fields } => Some(SessionCommand::Add { id, fields }),
        Commands::Remove { id } => Some(SessionCommand::Remove { id }),
        Commands::SetQuantity { id, quantity } => Some(SessionCommand::Quantity { id, quantity }),
        Commands::Clear => Some(SessionCommand::Clear),
        Commands::Session => None,
    };

    let core = CartCore::load(storage, &config.cart).with_observer(Arc::new(ConsoleObserver));
    let cart = UiCart::new(core);

    match command {
        Some(command) => println!("{}", session::execute(&cart, command)?),
        None => session::run(&cart, io::stdin().lock(), io::stdout().lock())?,
    }
    Ok(())
}

fn reset_storage(storage: &dyn StorageEffects, key: &str) -> Result<()> {
    let removed = storage
        .remove(key)
        .with_context(|| format!("removing stored cart '{key}'"))?;
    if removed {
        println!("stored cart '{key}' removed");
    } else {
        println!("no stored cart under '{key}'");
    }
    Ok(())
}
