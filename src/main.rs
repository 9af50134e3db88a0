use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cartstore::config::Config;
use cartstore::logging::init_tracing;
use cartstore::persistence::open_backend;
use cartstore::{use_cart, CartProvider, CartStore, NewItem};

/// Inspect and edit the persisted shopping cart.
#[derive(Debug, Parser)]
#[command(name = "cartstore", version)]
struct Cli {
    /// Config file (default: <config_dir>/cartstore/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the storage directory from the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the cart as JSON.
    List,
    /// Add a product, or one more of it if already present.
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        image_url: String,
        #[arg(long, value_parser = parse_price)]
        price: f64,
    },
    /// Add one to an existing line.
    Increment { id: String },
    /// Remove one from an existing line.
    Decrement { id: String },
}

fn parse_price(raw: &str) -> Result<f64, String> {
    let price: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if price.is_finite() {
        Ok(price)
    } else {
        Err(format!("price must be a finite number, got {raw}"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.dir = Some(dir);
    }

    init_tracing(&config.logging);

    let backend = open_backend(&config.storage);
    let store = CartStore::from_config(backend, &config)?;
    let provider = CartProvider::new(store);

    provider.run(run_command(cli.command)).await
}

async fn run_command(command: Command) -> anyhow::Result<()> {
    let cart = use_cart()?;
    cart.ready().await?;

    let commit = match command {
        Command::List => None,
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => Some(cart.add_to_cart(NewItem::new(id, title, image_url, price))?),
        Command::Increment { id } => Some(cart.increment(&id)?),
        Command::Decrement { id } => Some(cart.decrement(&id)?),
    };

    if let Some(commit) = commit {
        if !commit.changed() {
            tracing::info!("Item not in cart, nothing changed");
        }
        commit.durable().await.context("persisting cart")?;
    }
    cart.flush().await?;

    println!("{}", serde_json::to_string_pretty(&cart.products())?);
    Ok(())
}
