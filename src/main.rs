mod api;
mod error;
mod items;
mod models;
mod movements;
mod schema;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::store::Store;

#[derive(Parser)]
#[command(name = "stockroom")]
struct Args {
    /// Path to the SQLite database file; created on first start.
    #[arg(long, env = "DATABASE_PATH", default_value = "stockroom.db")]
    database_path: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let store = Store::open(&args.database_path)?;
    info!("Database ready at {}", args.database_path);

    let app = api::create_router(api::AppState { store });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;
    info!("Stockroom service listening on port {}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
