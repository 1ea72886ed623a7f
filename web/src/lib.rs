use axum::http::{header, HeaderValue, Method};
use domain::retention::Sweeper;
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod controller;
mod error;
pub mod router;
mod ws;

pub use error::{Error, Result};

// Web-level state shared by every handler
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay_manager: Arc<relay::Manager>,
    pub sweeper: Sweeper,
}

impl AppState {
    pub fn new(config: Config, relay_manager: Arc<relay::Manager>, sweeper: Sweeper) -> Self {
        Self {
            config,
            relay_manager,
            sweeper,
        }
    }
}

/// Bind the configured interface and serve until `shutdown` is cancelled.
pub async fn init_server(app_state: AppState, shutdown: CancellationToken) -> std::io::Result<()> {
    let server_url = format!("{}:{}", app_state.config.interface, app_state.config.port);
    let cors = cors_layer(&app_state.config);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server ready on {server_url}");

    axum::serve(listener, router::define_routes(app_state).layer(cors))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
}
