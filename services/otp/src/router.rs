use axum::{
    Router,
    routing::{get, post},
};

use vouch_core::health::healthz;
use vouch_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    challenge::{issue_challenge, verify_challenge},
    health::readyz,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Challenges
        .route("/otp/challenges", post(issue_challenge))
        .route("/otp/challenges/verify", post(verify_challenge))
        .with_state(state)
        // Last layer added runs first: the id must exist before the trace span opens.
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
