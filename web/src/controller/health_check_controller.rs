use crate::controller::ApiResponse;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    online_users: usize,
    connections: usize,
}

/// GET liveness plus a snapshot of how many users and connections are live
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    let registry = app_state.relay_manager.registry();

    Json(ApiResponse::new(
        StatusCode::OK.into(),
        Health {
            status: "healthy",
            online_users: registry.user_count(),
            connections: registry.connection_count(),
        },
    ))
}
