use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use vouch_core::tracing::init_tracing;
use vouch_otp::config::OtpConfig;
use vouch_otp::infra::grpc::GrpcIdentityProvider;
use vouch_otp::infra::notifier::HttpNotifier;
use vouch_otp::router::build_router;
use vouch_otp::state::AppState;
use vouch_otp::sweeper::run_sweeper;
use vouch_otp::usecase::purge::PurgeStaleChallengesUseCase;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = OtpConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let notifier = HttpNotifier::new(config.notifier_url.clone()).expect("invalid NOTIFIER_URL");

    let identity_channel = tonic::transport::Channel::from_shared(config.identity_grpc_url.clone())
        .expect("invalid IDENTITY_GRPC_URL")
        .connect_lazy();

    let state = AppState {
        db: Arc::new(db),
        notifier,
        identity: GrpcIdentityProvider::new(identity_channel),
        challenge_ttl: config.ttl(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = (config.purge_interval_secs > 0).then(|| {
        let usecase = PurgeStaleChallengesUseCase {
            challenges: state.challenge_store(),
            clock: state.clock(),
            retention: config.purge_retention(),
        };
        let every = Duration::from_secs(config.purge_interval_secs);
        info!(every_secs = config.purge_interval_secs, "challenge sweeper enabled");
        tokio::spawn(async move { run_sweeper(&usecase, every, shutdown_rx).await })
    });

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.otp_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("otp service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
