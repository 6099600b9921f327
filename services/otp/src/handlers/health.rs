use axum::{extract::State, http::StatusCode};

use vouch_core::health::readiness;

use crate::state::AppState;

/// `GET /readyz`: ready once the challenge store answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}
