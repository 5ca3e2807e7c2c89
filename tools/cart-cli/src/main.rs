//! Cart CLI - Command line tool for a persisted TurboCommerce cart.
//!
//! Every invocation is one cart session: the cart is hydrated from the data
//! directory, one command is applied, pending writes are flushed, and the
//! resulting cart is printed.
//!
//! Commands:
//! - `cart show` - Print the cart
//! - `cart add` - Add one unit of a product
//! - `cart inc` - Increase a product's quantity
//! - `cart dec` - Decrease a product's quantity
//! - `cart config` - Print the effective configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AddArgs, AdjustArgs};

/// Cart CLI - Inspect and edit a persisted shopping cart
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding the persisted cart (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,

    /// Add one unit of a product
    Add(AddArgs),

    /// Increase a product's quantity by one
    Inc(AdjustArgs),

    /// Decrease a product's quantity by one, removing it at zero
    Dec(AdjustArgs),

    /// Print the effective configuration
    Config,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to setup logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose)?;

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let mut ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };
    if let Some(dir) = cli.data_dir {
        ctx.config.store.data_dir = dir;
    }

    // Execute command
    let result = match cli.command {
        Commands::Show => commands::cart::show(&ctx).await,
        Commands::Add(args) => commands::cart::add(args, &ctx).await,
        Commands::Inc(args) => commands::cart::increment(args, &ctx).await,
        Commands::Dec(args) => commands::cart::decrement(args, &ctx).await,
        Commands::Config => commands::config::show(&ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
