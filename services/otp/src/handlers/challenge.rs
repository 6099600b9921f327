use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{ChallengePurpose, EmailAddress};
use crate::error::OtpServiceError;
use crate::state::AppState;
use crate::usecase::issue::{IssueChallengeInput, IssueChallengeUseCase};
use crate::usecase::verify::{VerifyChallengeInput, VerifyChallengeUseCase};

// ── POST /otp/challenges ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IssueChallengeRequest {
    pub email: String,
    pub purpose: ChallengePurpose,
}

#[derive(Serialize)]
pub struct IssueChallengeResponse {
    #[serde(serialize_with = "vouch_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn issue_challenge(
    State(state): State<AppState>,
    Json(body): Json<IssueChallengeRequest>,
) -> Result<(StatusCode, Json<IssueChallengeResponse>), OtpServiceError> {
    let email = EmailAddress::parse(&body.email).map_err(|_| OtpServiceError::InvalidEmail)?;
    let usecase = IssueChallengeUseCase {
        challenges: state.challenge_store(),
        notifier: state.notifier(),
        codes: state.code_generator(),
        clock: state.clock(),
        ttl: state.challenge_ttl,
    };
    let issued = usecase
        .execute(IssueChallengeInput {
            email,
            purpose: body.purpose,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(IssueChallengeResponse {
            expires_at: issued.expires_at,
        }),
    ))
}

// ── POST /otp/challenges/verify ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyChallengeRequest {
    pub email: String,
    pub code: String,
    pub purpose: ChallengePurpose,
}

#[derive(Serialize)]
pub struct VerifyChallengeResponse {
    pub email_confirmed: bool,
}

pub async fn verify_challenge(
    State(state): State<AppState>,
    Json(body): Json<VerifyChallengeRequest>,
) -> Result<Json<VerifyChallengeResponse>, OtpServiceError> {
    let usecase = VerifyChallengeUseCase {
        challenges: state.challenge_store(),
        identity: state.identity_provider(),
        clock: state.clock(),
    };
    let verified = usecase
        .execute(VerifyChallengeInput {
            email: body.email,
            code: body.code,
            purpose: body.purpose,
        })
        .await?;
    Ok(Json(VerifyChallengeResponse {
        email_confirmed: verified.email_confirmed,
    }))
}
