use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use vouch_otp_schema::otp_challenges;

use crate::domain::repository::ChallengeStore;
use crate::domain::types::{
    Challenge, ChallengePurpose, ClaimOutcome, EmailAddress, NewChallenge, OtpCode,
};
use crate::error::OtpServiceError;

// ── Challenge store ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbChallengeStore {
    pub db: Arc<DatabaseConnection>,
}

impl ChallengeStore for DbChallengeStore {
    async fn upsert(&self, challenge: &NewChallenge) -> Result<Uuid, OtpServiceError> {
        let id = Uuid::new_v4();
        let row = otp_challenges::ActiveModel {
            id: Set(id),
            email: Set(challenge.email.as_str().to_owned()),
            purpose: Set(challenge.purpose.as_str().to_owned()),
            code: Set(challenge.code.as_str().to_owned()),
            created_at: Set(challenge.created_at),
            expires_at: Set(challenge.expires_at),
            consumed_at: Set(None),
        };
        otp_challenges::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    otp_challenges::Column::Email,
                    otp_challenges::Column::Purpose,
                ])
                .update_columns([
                    otp_challenges::Column::Id,
                    otp_challenges::Column::Code,
                    otp_challenges::Column::CreatedAt,
                    otp_challenges::Column::ExpiresAt,
                    otp_challenges::Column::ConsumedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .context("upsert otp challenge")?;
        Ok(id)
    }

    async fn claim_if_valid(
        &self,
        email: &EmailAddress,
        purpose: ChallengePurpose,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome, OtpServiceError> {
        // One conditional UPDATE: validation and consumption cannot be split by
        // a concurrent claimer.
        let result = otp_challenges::Entity::update_many()
            .col_expr(otp_challenges::Column::ConsumedAt, Expr::value(now))
            .filter(otp_challenges::Column::Email.eq(email.as_str()))
            .filter(otp_challenges::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_challenges::Column::Code.eq(code.as_str()))
            .filter(otp_challenges::Column::ConsumedAt.is_null())
            .filter(otp_challenges::Column::ExpiresAt.gt(now))
            .exec(self.db.as_ref())
            .await
            .context("claim otp challenge")?;
        Ok(if result.rows_affected == 1 {
            ClaimOutcome::Won
        } else {
            ClaimOutcome::Lost
        })
    }

    async fn inspect(
        &self,
        email: &EmailAddress,
        purpose: ChallengePurpose,
    ) -> Result<Option<Challenge>, OtpServiceError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::Email.eq(email.as_str()))
            .filter(otp_challenges::Column::Purpose.eq(purpose.as_str()))
            .one(self.db.as_ref())
            .await
            .context("inspect otp challenge")?;
        Ok(model.map(challenge_from_model).transpose()?)
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, OtpServiceError> {
        let result = otp_challenges::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(otp_challenges::Column::ConsumedAt.lt(cutoff))
                    .add(otp_challenges::Column::ExpiresAt.lt(cutoff)),
            )
            .exec(self.db.as_ref())
            .await
            .context("purge stale otp challenges")?;
        Ok(result.rows_affected)
    }
}

fn challenge_from_model(model: otp_challenges::Model) -> anyhow::Result<Challenge> {
    Ok(Challenge {
        id: model.id,
        email: EmailAddress::parse(&model.email)
            .with_context(|| format!("stored email for challenge {}", model.id))?,
        purpose: model.purpose.parse()?,
        code: OtpCode::new(model.code),
        created_at: model.created_at,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
    })
}
