use crate::handlers::events;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let client_routes = Router::new()
        .route("/state", get(events::get_state))
        .route("/state/{id}", get(events::get_event));

    Router::new()
        .nest("/client", client_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
