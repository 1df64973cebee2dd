use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::ConsultationRecorder;
use doctor_cell::SupabaseDoctorDirectory;
use shared_config::AppConfig;
use waiting_queue_cell::WaitingQueueService;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Front Desk API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Wire the queue engine to its external collaborators
    let directory = Arc::new(SupabaseDoctorDirectory::new(&config));
    let sink = Arc::new(ConsultationRecorder::new(&config));
    let queue_service = Arc::new(WaitingQueueService::new(directory, sink));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(config.clone(), queue_service)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
    axum::serve(listener, app)
        .await
        .unwrap();
}
