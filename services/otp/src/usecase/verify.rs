use chrono::{DateTime, Utc};

use crate::domain::clock::Clock;
use crate::domain::repository::{ChallengeStore, IdentityProvider};
use crate::domain::types::{ChallengePurpose, ClaimOutcome, EmailAddress, LossReason, OtpCode};
use crate::error::OtpServiceError;

pub struct VerifyChallengeInput {
    pub email: String,
    pub code: String,
    pub purpose: ChallengePurpose,
}

#[derive(Debug, PartialEq, Eq)]
pub struct VerifiedChallenge {
    /// True when the identity provider was told to mark the account confirmed.
    pub email_confirmed: bool,
}

pub struct VerifyChallengeUseCase<S, I, C>
where
    S: ChallengeStore,
    I: IdentityProvider,
    C: Clock,
{
    pub challenges: S,
    pub identity: I,
    pub clock: C,
}

impl<S, I, C> VerifyChallengeUseCase<S, I, C>
where
    S: ChallengeStore,
    I: IdentityProvider,
    C: Clock,
{
    pub async fn execute(
        &self,
        input: VerifyChallengeInput,
    ) -> Result<VerifiedChallenge, OtpServiceError> {
        // A malformed address cannot hold a challenge; answer exactly as a wrong code would.
        let Ok(email) = EmailAddress::parse(&input.email) else {
            tracing::info!(
                purpose = %input.purpose,
                reason = LossReason::MalformedEmail.as_str(),
                "challenge claim lost"
            );
            return Err(OtpServiceError::InvalidOrExpired);
        };
        let code = OtpCode::new(input.code);
        let now = self.clock.now();

        match self
            .challenges
            .claim_if_valid(&email, input.purpose, &code, now)
            .await?
        {
            ClaimOutcome::Won => {}
            ClaimOutcome::Lost => {
                tracing::info!(purpose = %input.purpose, "challenge claim lost");
                // Classifying costs a second read; only pay for it when someone is listening.
                if tracing::enabled!(tracing::Level::DEBUG) {
                    self.classify_lost_claim(&email, input.purpose, &code, now).await;
                }
                return Err(OtpServiceError::InvalidOrExpired);
            }
        }

        tracing::info!(purpose = %input.purpose, "challenge claimed");

        match input.purpose {
            ChallengePurpose::SignupConfirmation => {
                self.identity
                    .confirm_email(&email)
                    .await
                    .map_err(OtpServiceError::ConfirmationFailure)?;
                Ok(VerifiedChallenge {
                    email_confirmed: true,
                })
            }
            ChallengePurpose::PasswordRecovery => Ok(VerifiedChallenge {
                email_confirmed: false,
            }),
        }
    }

    /// Best-effort classification for logs, judged at the instant the claim was
    /// decided. A failure here changes nothing for the caller.
    async fn classify_lost_claim(
        &self,
        email: &EmailAddress,
        purpose: ChallengePurpose,
        code: &OtpCode,
        decided_at: DateTime<Utc>,
    ) {
        let reason = match self.challenges.inspect(email, purpose).await {
            Ok(Some(challenge)) => challenge.loss_reason(code, decided_at),
            Ok(None) => LossReason::NotFound,
            Err(e) => {
                tracing::debug!(error = ?e, "could not classify lost claim");
                return;
            }
        };
        tracing::debug!(%purpose, reason = reason.as_str(), "lost claim classified");
    }
}
