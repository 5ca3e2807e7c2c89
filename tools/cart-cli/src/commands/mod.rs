//! CLI command implementations.

pub mod cart;
pub mod config;

use clap::Args;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product id.
    pub id: String,

    /// Display title (defaults to the product id).
    #[arg(short, long)]
    pub title: Option<String>,

    /// Image reference.
    #[arg(short, long, default_value = "")]
    pub image_url: String,

    /// Unit price.
    #[arg(short, long)]
    pub price: f64,
}

/// Arguments for the inc and dec commands.
#[derive(Args)]
pub struct AdjustArgs {
    /// Product id.
    pub id: String,
}
