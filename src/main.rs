use dotenv::dotenv;
use tracing::info;

use revalio_forum::{config::settings::Settings, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;

    info!("forwarding forum reads to {}", settings.api_base_url);

    let app = router(AppState::new(settings.clone())?);

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
