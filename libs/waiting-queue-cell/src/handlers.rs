use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{Json, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError};
use shared_utils::extractor::require_clinic;
use shared_utils::jwt::validate_token;

use crate::error::QueueError;
use crate::models::{AdmitPatientRequest, AdvanceOutcome, QueueEntry, QueueSnapshot, QueueStats, ReorderRequest};
use crate::services::WaitingQueueService;

#[derive(Clone)]
pub struct QueueCellState {
    pub config: Arc<AppConfig>,
    pub service: Arc<WaitingQueueService>,
}

/// Get the clinic's current queue snapshot
pub async fn get_queue(
    State(state): State<QueueCellState>,
    Extension(user): Extension<User>,
) -> Result<Json<QueueSnapshot>, AppError> {
    let clinic_id = require_clinic(&user)?;
    Ok(Json(state.service.snapshot(clinic_id).await))
}

/// Admit a patient at the tail of the queue
pub async fn admit_patient(
    State(state): State<QueueCellState>,
    Extension(user): Extension<User>,
    Json(request): Json<AdmitPatientRequest>,
) -> Result<(StatusCode, Json<QueueEntry>), AppError> {
    let clinic_id = require_clinic(&user)?;
    info!(
        "Admit request for doctor {} from user: {}",
        request.doctor_id, user.id
    );

    let entry = state
        .service
        .admit(clinic_id, request)
        .await
        .map_err(queue_error_response)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Serve the doctor's current patient
pub async fn advance_doctor(
    State(state): State<QueueCellState>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<AdvanceOutcome>, AppError> {
    let clinic_id = require_clinic(&user)?;
    info!(
        "Advance request for doctor {} from user: {}",
        doctor_id, user.id
    );

    let outcome = state
        .service
        .advance(clinic_id, doctor_id)
        .await
        .map_err(queue_error_response)?;

    Ok(Json(outcome))
}

/// Remove a waiting patient from the queue
pub async fn remove_patient(
    State(state): State<QueueCellState>,
    Extension(user): Extension<User>,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let clinic_id = require_clinic(&user)?;
    info!(
        "Remove request for entry {} from user: {}",
        entry_id, user.id
    );

    state
        .service
        .remove(clinic_id, entry_id)
        .await
        .map_err(queue_error_response)?;

    Ok(Json(json!({
        "success": true,
        "message": "Patient removed from queue"
    })))
}

/// Replace the queue order with a full permutation of the current entries
pub async fn reorder_queue(
    State(state): State<QueueCellState>,
    Extension(user): Extension<User>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Value>, AppError> {
    let clinic_id = require_clinic(&user)?;
    info!(
        "Reorder request with {} entries from user: {}",
        request.order.len(),
        user.id
    );

    state
        .service
        .reorder(clinic_id, request.order)
        .await
        .map_err(queue_error_response)?;

    Ok(Json(json!({
        "success": true,
        "message": "Queue reordered successfully"
    })))
}

/// Per-doctor waiting counts
pub async fn get_queue_stats(
    State(state): State<QueueCellState>,
    Extension(user): Extension<User>,
) -> Result<Json<QueueStats>, AppError> {
    let clinic_id = require_clinic(&user)?;
    Ok(Json(state.service.stats(clinic_id).await))
}

#[derive(Debug, Deserialize)]
pub struct WsAuthParams {
    pub token: String,
}

/// Subscribe to queue snapshots over WebSocket. Browsers cannot set an
/// Authorization header on the upgrade request, so the token rides in
/// the query string.
pub async fn queue_updates_ws(
    State(state): State<QueueCellState>,
    Query(params): Query<WsAuthParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let user = validate_token(&params.token, &state.config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;
    let clinic_id = require_clinic(&user)?;

    info!(
        "Queue subscription for clinic {} from user: {}",
        clinic_id, user.id
    );

    let service = Arc::clone(&state.service);
    Ok(ws.on_upgrade(move |socket| queue_updates_session(socket, service, clinic_id)))
}

async fn queue_updates_session(
    mut socket: WebSocket,
    service: Arc<WaitingQueueService>,
    clinic_id: Uuid,
) {
    // Subscribe before reading the snapshot so no commit can slip between
    let mut updates = service.subscribe(clinic_id).await;

    let snapshot = service.snapshot(clinic_id).await;
    if send_snapshot(&mut socket, &snapshot).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(snapshot) => {
                    if send_snapshot(&mut socket, &snapshot).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Queue subscriber for clinic {} lagged {} snapshots, resyncing",
                        clinic_id, skipped
                    );
                    let latest = service.snapshot(clinic_id).await;
                    if send_snapshot(&mut socket, &latest).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            message = socket.recv() => match message {
                // The stream is one-way; client messages are ignored
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }

    debug!("Queue subscription closed for clinic {}", clinic_id);
}

async fn send_snapshot(socket: &mut WebSocket, snapshot: &QueueSnapshot) -> Result<(), axum::Error> {
    let message = json!({
        "type": "queue_snapshot",
        "data": snapshot
    })
    .to_string();

    socket.send(Message::Text(message.into())).await
}

fn queue_error_response(e: QueueError) -> AppError {
    match e {
        QueueError::Validation(_) | QueueError::UnknownDoctor(_) => {
            AppError::BadRequest(e.to_string())
        }
        QueueError::NotFound(_) => AppError::NotFound(e.to_string()),
        // Expected under concurrent use: the client refreshes and retries
        QueueError::Permutation(_) | QueueError::EmptyQueue(_) => AppError::Conflict(e.to_string()),
        QueueError::Directory(_) => AppError::ExternalService(e.to_string()),
        QueueError::SinkDelivery(_) => AppError::Internal("Operation failed".to_string()),
    }
}
