use std::net::SocketAddr;

use collision_core::{CollisionError, Result, Settings};
use tokio::signal;
use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub async fn new(settings: Settings) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
            .parse()
            .map_err(|e| CollisionError::Configuration(format!("invalid server address: {}", e)))?;

        let state = AppState::new(settings).await?;
        Ok(Self { state, addr })
    }

    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(CollisionError::Io)?;

        info!("collision engine API listening on http://{}", self.addr);
        info!("  POST /collisions/generate - Generate an idea collision");
        info!("  GET  /collisions/history - Session history");
        info!("  PUT  /collisions/:id/rate - Rate a session");
        info!("  GET  /collisions/usage - Weekly usage status");
        info!("  GET  /domains/basic - Basic domain catalog");
        info!("  GET  /domains/premium - Premium domain catalog");
        info!("  GET  /health - Service health");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(CollisionError::Io)?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
