use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the registro application.
///
/// Loads the reference catalogs and the ledger file, then serves the REST
/// API for the browser front end.
///
/// # Environment Variables
/// - `REGISTRO_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `REGISTRO_DATA_FILE`: ledger file path (default: "data.xlsx")
/// - `REGISTRO_CATALOG_DIR`: maestro workbook directory (default: ".")
/// - `REGISTRO_SCHEMA_MODE`: "strict" (default) or "lenient"
/// - `REGISTRO_PATIENT_POLICY`: "allow-new" (default) or "require-existing"
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or the running server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registro_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("REGISTRO_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    tracing::info!("++ Starting registro REST on {}", addr);

    let cfg = api_rest::config_from_env()?;
    let state = api_rest::build_state(&cfg)?;

    api_rest::serve(&addr, state).await
}
