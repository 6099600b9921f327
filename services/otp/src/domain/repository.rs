#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    Challenge, ChallengePurpose, ClaimOutcome, EmailAddress, NewChallenge, OtpCode,
};
use crate::error::OtpServiceError;

/// Durable storage for outstanding challenges, keyed by `(email, purpose)`.
pub trait ChallengeStore: Send + Sync {
    /// Replace whatever row sits at `(email, purpose)` with a fresh, unconsumed
    /// challenge. Any previous code for the key becomes unclaimable. Returns the
    /// new challenge id.
    async fn upsert(&self, challenge: &NewChallenge) -> Result<Uuid, OtpServiceError>;

    /// Consume the challenge matching `(email, purpose, code)` if it is unconsumed
    /// and `now < expires_at`, as a single conditional write. `Won` iff exactly
    /// one row changed. Implementations must not read-then-write.
    async fn claim_if_valid(
        &self,
        email: &EmailAddress,
        purpose: ChallengePurpose,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome, OtpServiceError>;

    /// Plain read of the current row for a key. Diagnostics only; never decides a claim.
    async fn inspect(
        &self,
        email: &EmailAddress,
        purpose: ChallengePurpose,
    ) -> Result<Option<Challenge>, OtpServiceError>;

    /// Delete rows consumed or expired before `cutoff`. Returns the number removed.
    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, OtpServiceError>;
}

/// Out-of-band delivery of a code to its destination.
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        destination: &EmailAddress,
        code: &OtpCode,
        purpose: ChallengePurpose,
    ) -> anyhow::Result<()>;
}

/// Owner of the "account confirmed" flag.
pub trait IdentityProvider: Send + Sync {
    async fn confirm_email(&self, email: &EmailAddress) -> anyhow::Result<()>;
}
