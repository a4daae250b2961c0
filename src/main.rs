//! Checkout CLI
//!
//! Runs an interactive checkout session against a directory-backed cart. Each
//! line read from stdin is one command (`help` lists them).

use std::{
    io::{self, Write},
    ops::ControlFlow,
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use checkout::{
    observability::{LoggingConfig, init_subscriber},
    prelude::*,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "checkout", about = "Food delivery checkout", long_about = None)]
struct Cli {
    /// Directory holding the saved cart
    #[arg(long, env = "CHECKOUT_DATA_DIR", default_value = ".checkout")]
    data_dir: PathBuf,

    /// YAML checkout configuration; built-in defaults when omitted
    #[arg(short, long, env = "CHECKOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    logging: LoggingConfig,
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the cart
    #[command(alias = "ls")]
    Show,

    /// Add one to an item's quantity
    #[command(alias = "+")]
    Inc { id: String },

    /// Remove one from an item's quantity
    #[command(alias = "-")]
    Dec { id: String },

    /// Remove an item (can be undone)
    #[command(alias = "rm")]
    Cancel { id: String },

    /// Restore the last removed item
    Undo,

    /// Confirm the last removal
    Dismiss,

    /// Apply a promotion code
    Promo { code: String },

    /// Remove the promotion
    Unpromo,

    /// Place the order and exit
    Place,

    /// Exit without placing the order
    #[command(alias = "exit")]
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    init_subscriber(&cli.logging)?;

    let config = match &cli.config {
        Some(path) => CheckoutConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CheckoutConfig::default(),
    };

    let storage = Arc::new(FileStorage::new(&cli.data_dir));
    let mut store = CartStore::load(storage, config).await;
    let mut out = io::stdout();

    store.receipt().write_to(out.lock())?;
    prompt(&mut out)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();

        if !words.is_empty() {
            match Line::try_parse_from(words) {
                Ok(Line { command }) => {
                    if run(&mut store, command, &mut out).await?.is_break() {
                        break;
                    }
                }
                Err(error) => write!(out, "{}", error.render())?,
            }
        }

        prompt(&mut out)?;
    }

    store.close().await;

    Ok(())
}

async fn run(
    store: &mut CartStore,
    command: Command,
    out: &mut impl Write,
) -> Result<ControlFlow<()>> {
    match command {
        Command::Show => {}
        Command::Inc { id } => store.increment_quantity(&ItemId::new(id)),
        Command::Dec { id } => store.decrement_quantity(&ItemId::new(id)),
        Command::Cancel { id } => store.cancel_item(&ItemId::new(id)),
        Command::Undo => {
            if !store.undo_cancel() {
                writeln!(out, "Nothing to undo.")?;
            }
        }
        Command::Dismiss => store.dismiss_undo(),
        Command::Promo { code } => match store.apply_promotion(&code) {
            PromotionOutcome::Accepted => writeln!(out, "Promotion applied.")?,
            PromotionOutcome::Rejected => writeln!(out, "Promotion code not recognised.")?,
        },
        Command::Unpromo => store.remove_promotion(),
        Command::Place => {
            let receipt = store.place_order().await?;

            receipt.write_to(&mut *out)?;
            writeln!(out, "Order placed.")?;

            return Ok(ControlFlow::Break(()));
        }
        Command::Quit => return Ok(ControlFlow::Break(())),
    }

    store.receipt().write_to(&mut *out)?;

    if let Some(item) = store.pending_undo() {
        writeln!(
            out,
            "Removed {}. `undo` to restore, `dismiss` to confirm.",
            item.name()
        )?;
    }

    Ok(ControlFlow::Continue(()))
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}
