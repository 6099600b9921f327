use sea_orm::entity::prelude::*;

/// Outstanding one-time-passcode challenge.
/// At most one row per `(email, purpose)`; a new issuance overwrites the row in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_challenges")]
pub struct Model {
    /// Regenerated on every issuance, so a superseded challenge's id never reappears.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Normalized (trimmed, lowercased) address.
    pub email: String,
    /// `signup_confirmation` or `password_recovery`.
    pub purpose: String,
    pub code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// Set exactly once, by a winning claim.
    pub consumed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
