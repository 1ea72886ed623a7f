use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use log::*;

/// GET run the message retention sweep now and report what it deleted.
///
/// Runs the same deletion as the scheduled sweeper, so calling it from an
/// external cron is safe even while the internal schedule is enabled.
pub async fn run(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    info!("Running on-demand task to delete old messages");

    let report = app_state.sweeper.sweep().await?;

    debug!("Retention sweep report: {report:?}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), report)))
}
