use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a challenge proves control of an address *for*.
///
/// Codes never cross purposes: a code issued for one variant is unclaimable
/// under the other, even if the digit strings happen to coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePurpose {
    SignupConfirmation,
    PasswordRecovery,
}

impl ChallengePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignupConfirmation => "signup_confirmation",
            Self::PasswordRecovery => "password_recovery",
        }
    }
}

impl fmt::Display for ChallengePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown challenge purpose: {0}")]
pub struct UnknownPurpose(pub String);

impl FromStr for ChallengePurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup_confirmation" => Ok(Self::SignupConfirmation),
            "password_recovery" => Ok(Self::PasswordRecovery),
            other => Err(UnknownPurpose(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("malformed email address")]
pub struct MalformedEmail;

/// Email address in canonical form (trimmed, lowercased).
///
/// Half of the challenge key, so two spellings of the same address must map
/// to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, MalformedEmail> {
        let normalized = raw.trim().to_lowercase();
        match normalized.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !normalized.chars().any(char::is_whitespace) =>
            {
                Ok(Self(normalized))
            }
            _ => Err(MalformedEmail),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The secret digit string. `Debug` is redacted so codes never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

/// Everything the issuer knows before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub email: EmailAddress,
    pub purpose: ChallengePurpose,
    pub code: OtpCode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A persisted challenge row.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub id: Uuid,
    pub email: EmailAddress,
    pub purpose: ChallengePurpose,
    pub code: OtpCode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl Challenge {
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Pending: unconsumed and strictly before expiry.
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        !self.is_consumed() && now < self.expires_at
    }

    /// Why a claim for `code` at `now` could not have won against this row.
    /// Only meaningful after the store already reported [`ClaimOutcome::Lost`].
    pub fn loss_reason(&self, code: &OtpCode, now: DateTime<Utc>) -> LossReason {
        if self.code != *code {
            LossReason::CodeMismatch
        } else if self.is_consumed() {
            LossReason::AlreadyConsumed
        } else if now >= self.expires_at {
            LossReason::Expired
        } else {
            // Row looks claimable now; it was re-issued between the claim and this read.
            LossReason::Raced
        }
    }
}

/// Result of the atomic validate-and-consume step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Won,
    Lost,
}

/// Internal classification of a lost claim. Logged, never returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    MalformedEmail,
    NotFound,
    CodeMismatch,
    AlreadyConsumed,
    Expired,
    Raced,
}

impl LossReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedEmail => "malformed_email",
            Self::NotFound => "not_found",
            Self::CodeMismatch => "code_mismatch",
            Self::AlreadyConsumed => "already_consumed",
            Self::Expired => "expired",
            Self::Raced => "raced",
        }
    }
}

/// Number of digits in a generated code.
pub const OTP_CODE_LEN: usize = 6;

/// Default challenge time-to-live in seconds.
pub const DEFAULT_CHALLENGE_TTL_SECS: i64 = 300;
