use crate::{
    controller::{health_check_controller, retention_controller},
    ws::handler,
    AppState,
};
use axum::{routing::get, Router};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes(app_state.clone()))
        .merge(realtime_routes(app_state.clone()))
        .merge(retention_routes(app_state))
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

fn realtime_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(handler::ws_upgrade))
        .with_state(app_state)
}

fn retention_routes(app_state: AppState) -> Router {
    Router::new()
        // Path kept for the external cron that already calls it
        .route("/api/run-cron-job", get(retention_controller::run))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Utc};
    use clap::Parser;
    use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind};
    use domain::retention::{MessageStore, Sweeper};
    use relay::connection::{ConnectionId, Handshake};
    use serde_json::Value;
    use service::config::Config;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    struct FixedStore(Option<u64>);

    #[async_trait]
    impl MessageStore for FixedStore {
        async fn delete_messages_older_than(
            &self,
            _cutoff: DateTime<Utc>,
        ) -> Result<u64, DomainError> {
            self.0.ok_or_else(|| DomainError {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::StoreUnavailable),
            })
        }
    }

    fn app_state(store: FixedStore) -> AppState {
        AppState::new(
            Config::try_parse_from(["chat_relay"]).unwrap(),
            Arc::new(relay::Manager::new()),
            Sweeper::new(Arc::new(store)),
        )
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Option<Value>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn health_reports_live_connections() {
        let state = app_state(FixedStore(Some(0)));
        let (tx, _rx) = mpsc::unbounded_channel();
        let _context = state
            .relay_manager
            .connect(
                Handshake::new(ConnectionId::new(), Some("u1".to_owned())),
                tx,
            )
            .unwrap();

        let (status, body) = get_json(define_routes(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        let data = &body["data"];
        assert_eq!(data["status"], "healthy");
        assert_eq!(data["online_users"], 1);
        assert_eq!(data["connections"], 1);
    }

    #[tokio::test]
    async fn retention_trigger_reports_deleted_messages() {
        let (status, body) =
            get_json(define_routes(app_state(FixedStore(Some(12)))), "/api/run-cron-job").await;

        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["data"]["deleted_count"], 12);
        assert!(body["data"]["cutoff"].is_string());
    }

    #[tokio::test]
    async fn retention_trigger_reports_store_failures() {
        let (status, _) =
            get_json(define_routes(app_state(FixedStore(None))), "/api/run-cron-job").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
