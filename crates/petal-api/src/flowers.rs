use axum::{Json, extract::Path, http::StatusCode};

use petal_types::Flower;
use petal_types::catalog;

/// GET /flowers
pub async fn list_flowers() -> Json<&'static [Flower]> {
    Json(catalog::all())
}

/// GET /flowers/{slug}
pub async fn get_flower(Path(slug): Path<String>) -> Result<Json<&'static Flower>, StatusCode> {
    catalog::lookup_by_slug(&slug)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
