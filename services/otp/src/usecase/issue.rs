use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::code::CodeGenerator;
use crate::domain::repository::{ChallengeStore, Notifier};
use crate::domain::types::{ChallengePurpose, EmailAddress, NewChallenge};
use crate::error::OtpServiceError;

pub struct IssueChallengeInput {
    pub email: EmailAddress,
    pub purpose: ChallengePurpose,
}

#[derive(Debug)]
pub struct IssuedChallenge {
    pub challenge_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

pub struct IssueChallengeUseCase<S, N, G, C>
where
    S: ChallengeStore,
    N: Notifier,
    G: CodeGenerator,
    C: Clock,
{
    pub challenges: S,
    pub notifier: N,
    pub codes: G,
    pub clock: C,
    pub ttl: Duration,
}

impl<S, N, G, C> IssueChallengeUseCase<S, N, G, C>
where
    S: ChallengeStore,
    N: Notifier,
    G: CodeGenerator,
    C: Clock,
{
    pub async fn execute(
        &self,
        input: IssueChallengeInput,
    ) -> Result<IssuedChallenge, OtpServiceError> {
        let code = self.codes.generate();
        let now = self.clock.now();
        let challenge = NewChallenge {
            email: input.email,
            purpose: input.purpose,
            code,
            created_at: now,
            expires_at: now + self.ttl,
        };

        // Supersedes any earlier challenge for the key; the notifier is never
        // reached when this fails.
        let challenge_id = self.challenges.upsert(&challenge).await?;

        if let Err(source) = self
            .notifier
            .send(&challenge.email, &challenge.code, challenge.purpose)
            .await
        {
            tracing::warn!(
                %challenge_id,
                purpose = %challenge.purpose,
                error = ?source,
                "challenge stored but delivery failed"
            );
            return Err(OtpServiceError::NotificationFailure {
                challenge_id,
                source,
            });
        }

        tracing::info!(%challenge_id, purpose = %challenge.purpose, "challenge issued");
        Ok(IssuedChallenge {
            challenge_id,
            expires_at: challenge.expires_at,
        })
    }
}
