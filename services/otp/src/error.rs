use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

/// OTP service error variants.
///
/// `InvalidOrExpired` is the only verification outcome a caller ever sees; wrong
/// code, unknown key, reuse and expiry all collapse into it.
#[derive(Debug, thiserror::Error)]
pub enum OtpServiceError {
    #[error("invalid or expired code")]
    InvalidOrExpired,
    #[error("invalid email")]
    InvalidEmail,
    #[error("challenge store unavailable")]
    PersistenceFailure(#[from] anyhow::Error),
    /// The challenge was stored but could not be delivered; it stays claimable.
    #[error("code delivery failed")]
    NotificationFailure {
        challenge_id: Uuid,
        #[source]
        source: anyhow::Error,
    },
    /// The code was consumed but the identity provider rejected the confirmation.
    #[error("email confirmation failed")]
    ConfirmationFailure(#[source] anyhow::Error),
}

impl OtpServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidOrExpired => "INVALID_OR_EXPIRED",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::NotificationFailure { .. } => "NOTIFICATION_FAILURE",
            Self::ConfirmationFailure(_) => "CONFIRMATION_FAILURE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidOrExpired => StatusCode::UNAUTHORIZED,
            Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::PersistenceFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotificationFailure { .. } | Self::ConfirmationFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for OtpServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client outcomes and TraceLayer already records them.
        // 5xx carry an anyhow chain that is the only trace of the root cause.
        match &self {
            Self::PersistenceFailure(e) | Self::ConfirmationFailure(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "upstream failure");
            }
            Self::NotificationFailure {
                challenge_id,
                source,
            } => {
                tracing::error!(
                    error = ?source,
                    kind = self.kind(),
                    %challenge_id,
                    "upstream failure"
                );
            }
            Self::InvalidOrExpired | Self::InvalidEmail => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
