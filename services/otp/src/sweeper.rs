use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::domain::clock::Clock;
use crate::domain::repository::ChallengeStore;
use crate::usecase::purge::PurgeStaleChallengesUseCase;

/// Run the purge use case every `every` until `shutdown` flips to `true` or its
/// sender is dropped. Failures are logged and the loop keeps going.
pub async fn run_sweeper<S, C>(
    usecase: &PurgeStaleChallengesUseCase<S, C>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: ChallengeStore,
    C: Clock,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = usecase.execute().await {
                    tracing::warn!(error = ?e, "challenge sweep failed");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::info!("challenge sweeper stopped");
}
