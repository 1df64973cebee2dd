use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;
use waiting_queue_cell::{create_waiting_queue_router, WaitingQueueService};

pub fn create_router(config: Arc<AppConfig>, queue_service: Arc<WaitingQueueService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Front Desk API is running!" }))
        .nest(
            "/waiting-queue",
            create_waiting_queue_router(config, queue_service),
        )
}
