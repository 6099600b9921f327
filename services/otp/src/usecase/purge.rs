use chrono::Duration;

use crate::domain::clock::Clock;
use crate::domain::repository::ChallengeStore;
use crate::error::OtpServiceError;

/// Maintenance sweep: drops challenges that have been terminal for longer than
/// `retention`. Claim correctness never depends on it running.
pub struct PurgeStaleChallengesUseCase<S, C>
where
    S: ChallengeStore,
    C: Clock,
{
    pub challenges: S,
    pub clock: C,
    pub retention: Duration,
}

impl<S, C> PurgeStaleChallengesUseCase<S, C>
where
    S: ChallengeStore,
    C: Clock,
{
    pub async fn execute(&self) -> Result<u64, OtpServiceError> {
        let cutoff = self.clock.now() - self.retention;
        let purged = self.challenges.purge_stale(cutoff).await?;
        if purged > 0 {
            tracing::info!(purged, %cutoff, "purged stale challenges");
        }
        Ok(purged)
    }
}
