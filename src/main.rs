use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yatube::{config::settings::Settings, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("yatube=info")),
        )
        .init();

    let settings = Settings::new()?;

    let pool = db::connect(&settings.database_url).await?;

    info!("database connected");

    let app = yatube::app(AppState::new(pool, settings.clone()));

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
