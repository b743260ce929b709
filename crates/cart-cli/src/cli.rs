use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cart",
    about = "Cart Keeper — a persistent shopping cart",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted cart (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the cart
    List,
    /// Add one unit of a product
    Add(AddArgs),
    /// Raise a line's quantity by one
    Increment(IdArgs),
    /// Lower a line's quantity by one, removing it at zero
    Decrement(IdArgs),
    /// Show item count and total price
    Total,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub image_url: String,
    #[arg(long)]
    pub price: f64,
}

#[derive(Args)]
pub struct IdArgs {
    /// Product id
    pub id: String,
}
