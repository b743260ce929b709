use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use cart_storage::FileKeyValueStore;
use cart_store::{CartConfig, CartHandle, CartScope, CartStore, MutationOutcome};
use cart_types::{CartSnapshot, ProductDescriptor};
use colored::Colorize;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.data_dir)?;
    let cart = open_cart(&config).await?;

    let outcome = match cli.command {
        Command::List => None,
        Command::Total => {
            println!("{}", render_total(&cart.products(), &cli.format)?);
            return Ok(());
        }
        Command::Add(args) => {
            let product = product_from_args(args)?;
            let id = product.id.clone();
            Some((cart.add_to_cart(product), id))
        }
        Command::Increment(args) => Some((cart.increment(&args.id), args.id)),
        Command::Decrement(args) => Some((cart.decrement(&args.id), args.id)),
    };

    if let Some((outcome, id)) = outcome {
        if outcome == MutationOutcome::Unchanged && cli.format == OutputFormat::Text {
            println!("{} no line with id {}", "!".yellow().bold(), id.yellow());
        }
        cart.flush().await.context("cart change was not persisted")?;
    }

    println!("{}", render_cart(&cart.products(), &cli.format)?);
    Ok(())
}

/// Config file (if any), then command-line overrides.
fn resolve_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> anyhow::Result<CartConfig> {
    let mut config = match path {
        Some(path) => CartConfig::load(path)?,
        None => CartConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    debug!(data_dir = %config.data_dir.display(), key = %config.storage_key, "config resolved");
    Ok(config)
}

async fn open_cart(config: &CartConfig) -> anyhow::Result<CartHandle> {
    let storage = FileKeyValueStore::open(&config.data_dir)
        .await
        .with_context(|| format!("cannot open cart data dir {}", config.data_dir.display()))?;
    let store = CartStore::initialize(Arc::new(storage), config).await?;
    Ok(CartScope::new().provide(store)?)
}

fn product_from_args(args: AddArgs) -> anyhow::Result<ProductDescriptor> {
    if !args.price.is_finite() || args.price < 0.0 {
        bail!("price must be a non-negative number, got {}", args.price);
    }
    Ok(ProductDescriptor::new(args.id, args.title, args.image_url, args.price))
}

fn render_cart(snapshot: &CartSnapshot, format: &OutputFormat) -> anyhow::Result<String> {
    if *format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(snapshot)?);
    }
    if snapshot.is_empty() {
        return Ok("Cart is empty.".to_string());
    }
    let mut out = String::new();
    for item in snapshot {
        out.push_str(&format!(
            "{:>4}  {}  {}  {}\n",
            format!("x{}", item.quantity).bold(),
            item.title,
            item.id.dimmed(),
            format!("{:.2}", item.line_total()).green(),
        ));
    }
    out.push_str(&render_total(snapshot, format)?);
    Ok(out)
}

fn render_total(snapshot: &CartSnapshot, format: &OutputFormat) -> anyhow::Result<String> {
    if *format == OutputFormat::Json {
        let summary = serde_json::json!({
            "lines": snapshot.len(),
            "quantity": snapshot.total_quantity(),
            "total": snapshot.total_price(),
        });
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    Ok(format!(
        "{} items, total {}",
        snapshot.total_quantity().to_string().bold(),
        format!("{:.2}", snapshot.total_price()).green().bold(),
    ))
}
