use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use shared_config::AppConfig;
use shared_notifications::{MailRelayClient, NotificationDispatcher, TwilioClient};
use shared_utils::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Healthcare API server");

    let config = Arc::new(AppConfig::from_env());
    if !config.is_configured() {
        warn!("Database or JWT settings are missing; requests will fail until they are set");
    }
    if !config.is_email_configured() {
        warn!("Mail relay is not configured; emails will be dropped");
    }
    if !config.is_sms_configured() {
        warn!("Twilio is not configured; SMS will be dropped");
    }

    // Notification transports are built once and shared by the worker.
    let email = Arc::new(MailRelayClient::new(&config));
    let sms = Arc::new(TwilioClient::new(&config));
    let (notifier, _worker) = NotificationDispatcher::spawn(email, sms);

    let state = AppState::new(config.clone(), notifier);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
