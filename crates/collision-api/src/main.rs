use collision_api::Server;
use collision_core::{CollisionError, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> collision_core::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collision_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load(None)
        .map_err(|e| CollisionError::Configuration(format!("{:#}", e)))?;
    settings
        .validate()
        .map_err(|e| CollisionError::Configuration(format!("{:#}", e)))?;

    let server = Server::new(settings).await?;
    server.run().await
}
