//! ragserve binary: load configuration and run the HTTP server.

use ragserve::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env when present
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    ragserve::start_server(config).await?;

    Ok(())
}
