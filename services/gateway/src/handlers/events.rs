use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use feed_types::event::Event;

/// All live events, tombstones excluded, sorted by id.
pub async fn get_state(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.store.current_events())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    // Tombstones are internal; to a client a removed event does not exist.
    match state.store.get(&event_id) {
        Some(event) if !event.is_removed() => Ok(Json(event)),
        _ => Err(AppError::NotFound(format!("Event {} not found", event_id))),
    }
}
