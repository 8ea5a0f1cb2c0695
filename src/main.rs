#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use rsvp_server::adapters;
use rsvp_server::adapters::database::rsvp_repo::RsvpRepository;
use rsvp_server::adapters::email::resend::ResendMailer;
use rsvp_server::api::{self, AppState};
use rsvp_server::config::Config;
use rsvp_server::services::events::{EventSink, TelemetrySink};
use rsvp_server::services::health_service::HealthService;
use rsvp_server::services::notification::composer::NotificationComposer;
use rsvp_server::services::notification::dispatcher::NotificationDispatcher;
use rsvp_server::services::notification::sender::RetryingSender;
use rsvp_server::services::rate_limit_service::RateLimitService;
use rsvp_server::services::rsvp_service::RsvpService;
use rsvp_server::services::store::SubmissionStore;
use rsvp_server::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let boot_span = tracing::info_span!("boot_server");
    let (listener, app) = async {
        // Phase 1: Infrastructure
        let pool = adapters::database::init_pool(&config.database).await?;
        adapters::database::run_migrations(&pool).await?;

        // Phase 2: Component wiring
        let store: Arc<dyn SubmissionStore> = Arc::new(RsvpRepository::new(pool.clone()));
        let sink: Arc<dyn EventSink> = Arc::new(TelemetrySink::new());
        let provider = Arc::new(ResendMailer::new(&config.email)?);
        let sender = RetryingSender::new(provider, Arc::clone(&sink));
        let dispatcher = NotificationDispatcher::new(
            NotificationComposer::new(config.event.clone()),
            sender,
            Arc::clone(&sink),
            &config.email,
        );
        let rate_limiter = RateLimitService::new(Arc::clone(&store), config.rate_limit.clone());
        let rsvp_service = RsvpService::new(store, rate_limiter, dispatcher, sink);
        let health_service = HealthService::new(pool, config.database.health_timeout_ms);

        // Phase 3: Runtime
        let state = AppState { config: config.clone(), rsvp_service, health_service };
        let app = api::app_router(state);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        tracing::info!(address = %addr, "listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;

        Ok::<(tokio::net::TcpListener, axum::Router), anyhow::Error>((listener, app))
    }
    .instrument(boot_span)
    .await?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry_guard.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
