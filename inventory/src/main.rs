//! Rebuilds the datacenter inventory from the metal source of truth.

mod config;

use anyhow::Context;
use catalog::Catalog;
use clap::{Parser, Subcommand};
use config::{Config, SourceKind};
use importer::Importer;
use importer::asset::import_order;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inventory")]
#[command(about = "Datacenter inventory import and topology reconciliation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true, env = "INVENTORY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Empty the store and import everything from the source of truth
    Import {
        /// Answer queries from a recorded fixture instead of over ssh
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Store connection url, e.g. sqlite://inventory.db?mode=rwc
        #[arg(long)]
        store_url: Option<String>,

        /// Fail when a node renders a network its server is not cabled to
        #[arg(long)]
        strict_topology: bool,
    },

    /// Print the order in which asset kinds are imported
    Plan,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Plan => {
            for (step, spec) in import_order()?.iter().enumerate() {
                println!("{:>2}. {:<16} {}", step + 1, spec.kind, spec.query);
            }
            Ok(())
        }
        Commands::Import {
            fixture,
            store_url,
            strict_topology,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            config.apply_env(|var| std::env::var(var).ok());
            if let Some(path) = fixture {
                config.source.kind = SourceKind::Fixture;
                config.source.path = Some(path);
            }
            if store_url.is_some() {
                config.store.url = store_url;
            }
            config.import.strict_topology |= strict_topology;

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to create tokio runtime")?;
            rt.block_on(import(config))
        }
    }
}

async fn import(config: Config) -> anyhow::Result<()> {
    let catalog = Catalog::connect(config.store.backend()?)
        .await
        .context("Failed to open the store")?;
    info!(endpoint = catalog.endpoint(), "Store ready");

    let source = config.source.build()?;
    let importer = Importer::new(source, catalog, config.import.into());

    let summary = importer.run().await.context("Import failed")?;
    println!("{summary}");
    Ok(())
}
