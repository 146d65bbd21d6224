pub mod bouquets;
pub mod error;
pub mod flowers;
pub mod state;
pub mod validation;

use axum::{Json, Router, extract::State, routing::get};

use petal_types::api::HealthResponse;

use crate::state::AppState;

/// All petal routes. Transport layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/flowers", get(flowers::list_flowers))
        .route("/flowers/{slug}", get(flowers::get_flower))
        .route(
            "/bouquets",
            get(bouquets::list_bouquets).post(bouquets::create_bouquet),
        )
        .route("/bouquets/{id}", get(bouquets::get_bouquet))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        backend: state.store.backend().to_string(),
    })
}
