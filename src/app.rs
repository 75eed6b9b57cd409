use crate::config::Config;
use crate::notify::Notifier;
use crate::storage::Storage;
use anyhow::Result;
use axum::Router;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub struct AppStateInner {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub client: reqwest::Client,
    pub notifier: Notifier,
    pub token: CancellationToken,
    pub started_at: DateTime<Utc>,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.config.outbound_timeout_secs)
    }
}

pub struct AppStateBuilder {
    config: Option<Config>,
    storage: Option<Storage>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            storage: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> Result<AppState> {
        let config = Arc::new(self.config.unwrap_or_default());
        let storage = match self.storage {
            Some(storage) => storage,
            None => Storage::new(&config.storage)?,
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.outbound_timeout_secs))
            .build()?;
        let notifier = Notifier::new(client.clone(), config.chat.clone());

        Ok(Arc::new(AppStateInner {
            config,
            storage,
            client,
            notifier,
            token: CancellationToken::new(),
            started_at: Utc::now(),
        }))
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_router(state: AppState) -> Router {
    crate::handler::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(state: AppState) -> Result<()> {
    let token = state.token.clone();
    let app = create_router(state.clone());
    let addr: SocketAddr = state.config.http_addr.parse()?;
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return Err(anyhow::anyhow!("Failed to bind to {}: {}", addr, e));
        }
    };

    select! {
        result = axum::serve(listener, app) => {
            match result {
                Ok(_) => info!("Server shut down gracefully"),
                Err(e) => {
                    error!("Server error: {}", e);
                    return Err(anyhow::anyhow!("Server error: {}", e));
                }
            }
        }
        _ = token.cancelled() => {
            info!("Shutting down due to cancellation");
        }
    }
    Ok(())
}
