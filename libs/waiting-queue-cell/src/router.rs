use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{
    admit_patient, advance_doctor, get_queue, get_queue_stats, queue_updates_ws, remove_patient,
    reorder_queue, QueueCellState,
};
use crate::services::WaitingQueueService;

pub fn create_waiting_queue_router(
    config: Arc<AppConfig>,
    service: Arc<WaitingQueueService>,
) -> Router {
    let state = QueueCellState {
        config: config.clone(),
        service,
    };

    let protected_routes = Router::new()
        .route("/", get(get_queue))
        .route("/patients", post(admit_patient))
        .route("/patients/{entry_id}", delete(remove_patient))
        .route("/doctors/{doctor_id}/advance", post(advance_doctor))
        .route("/order", put(reorder_queue))
        .route("/stats", get(get_queue_stats))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    // The WebSocket endpoint authenticates via query token inside the handler
    Router::new()
        .merge(protected_routes)
        .route("/ws", get(queue_updates_ws))
        .with_state(state)
}
