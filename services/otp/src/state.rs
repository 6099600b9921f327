use std::sync::Arc;

use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::domain::clock::SystemClock;
use crate::domain::code::RandomCodeGenerator;
use crate::infra::db::DbChallengeStore;
use crate::infra::grpc::GrpcIdentityProvider;
use crate::infra::notifier::HttpNotifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub notifier: HttpNotifier,
    pub identity: GrpcIdentityProvider,
    pub challenge_ttl: Duration,
}

impl AppState {
    pub fn challenge_store(&self) -> DbChallengeStore {
        DbChallengeStore {
            db: Arc::clone(&self.db),
        }
    }

    pub fn notifier(&self) -> HttpNotifier {
        self.notifier.clone()
    }

    pub fn identity_provider(&self) -> GrpcIdentityProvider {
        self.identity.clone()
    }

    pub fn code_generator(&self) -> RandomCodeGenerator {
        RandomCodeGenerator
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }
}
