//! `erpd` — the ERP server binary.
//!
//! Usage:
//!   erpd --data-dir <dir> [--listen <addr>] [--unique-constraint]
//!
//! `--unique-constraint` activates the storage-level uniqueness constraint
//! on variant ownership (skipped with a warning when existing data already
//! violates it).

mod routes;

use std::path::PathBuf;

use clap::Parser;
use erp_core::Module;
use product_variant_unique::ProductModule;
use product_variant_unique::service::{Enforcement, ProductService};
use tracing::info;

/// ERP server.
#[derive(Parser, Debug)]
#[command(name = "erpd", about = "ERP server")]
struct Cli {
    /// Directory holding the server's data files.
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Path to the SQLite database file (overrides `{data_dir}/data.sqlite`).
    #[arg(long = "sqlite")]
    sqlite: Option<PathBuf>,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Declare the storage-level unique constraint on variant ownership.
    #[arg(long = "unique-constraint")]
    unique_constraint: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = erp_core::ServiceConfig {
        data_dir: cli.data_dir.clone(),
        sqlite_path: cli.sqlite.clone(),
        listen: cli.listen.clone(),
    };

    if let Some(dir) = &config.data_dir {
        std::fs::create_dir_all(dir)?;
    }

    let sqlite_path = config.resolve_sqlite_path();
    info!("Opening SQLite store at {}", sqlite_path.display());
    let sql = Box::new(
        erp_sql::SqliteStore::open(&sqlite_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let enforcement = if cli.unique_constraint {
        Enforcement::Constrained
    } else {
        Enforcement::Validated
    };

    let product_module = ProductModule::new(ProductService::new(sql, enforcement)?);
    info!("Product module initialized ({:?} mode)", enforcement);

    let module_routes = vec![(product_module.name().to_string(), product_module.routes())];
    let app = routes::build_router(module_routes);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("ERP server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
