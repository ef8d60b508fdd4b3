//! Standalone REST API server binary.
//!
//! Runs the registro REST API on its own. The workspace's main
//! `registro-run` binary does the same thing; this one exists so the API
//! crate can be developed and deployed independently.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entry point for the registro REST API server.
///
/// # Environment Variables
/// - `REGISTRO_REST_ADDR`: server address (default: "0.0.0.0:8000")
/// - `REGISTRO_DATA_FILE`: ledger file path (default: "data.xlsx")
/// - `REGISTRO_CATALOG_DIR`: maestro workbook directory (default: ".")
/// - `REGISTRO_SCHEMA_MODE`: "strict" (default) or "lenient"
/// - `REGISTRO_PATIENT_POLICY`: "allow-new" (default) or "require-existing"
///
/// # Errors
/// Returns an error if the catalogs or ledger cannot be loaded, the
/// address cannot be bound, or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("registro_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("REGISTRO_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let cfg = api_rest::config_from_env()?;
    let state = api_rest::build_state(&cfg)?;

    api_rest::serve(&addr, state).await
}
