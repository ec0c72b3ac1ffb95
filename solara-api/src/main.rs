use std::net::SocketAddr;
use std::sync::Arc;

use solara_api::{app, AppState};
use solara_booking::BookingOrchestrator;
use solara_core::repository::WebhookSink;
use solara_relay::SubmissionRelay;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solara_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = solara_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Solara API on port {}", config.server.port);

    // Redis Connection
    let redis_client = solara_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    // Outbound clients
    let routing = Arc::new(solara_store::RoutingClient::new(&config.routing));
    let webhooks: Arc<dyn WebhookSink> = Arc::new(solara_store::WebhookClient::new());
    let drive = Arc::new(solara_store::DriveClient::new(config.drive.clone()));

    let relay = Arc::new(SubmissionRelay::new(
        Arc::new(redis_client),
        webhooks.clone(),
        config.webhooks.intake_url.clone(),
        config.webhooks.survey_url.clone(),
    ));
    let orchestrator = Arc::new(BookingOrchestrator::new(routing));

    let app_state = AppState {
        relay,
        orchestrator,
        drive,
        webhooks,
        proxy_url: config.webhooks.proxy_url.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
