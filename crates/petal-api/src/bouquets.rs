use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use petal_db::ListOptions;
use petal_types::api::{BouquetView, CreateBouquetRequest, CreateBouquetResponse};
use petal_types::{BouquetId, Cursor, NewBouquet, Page, catalog};

use crate::error::{ApiError, Operation};
use crate::state::AppState;
use crate::validation::{ValidationError, validate_new_bouquet};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub count: Option<u32>,
    /// Opaque token from the previous page's `next_cursor`.
    pub cursor: Option<String>,
}

/// POST /bouquets. Validates and snapshots the chosen flower before storing.
pub async fn create_bouquet(
    State(state): State<AppState>,
    payload: Result<Json<CreateBouquetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let flower = catalog::resolve(&req.flower)
        .ok_or_else(|| ValidationError::UnknownFlower(req.flower.clone()))?
        .clone();

    let message = req
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let data = NewBouquet {
        flower,
        recipient_name: req.recipient_name.trim().to_string(),
        message,
        delivery_type: req.delivery_type,
        delivery_date: req.delivery_date,
    };
    validate_new_bouquet(&data, &state.policy, Utc::now())?;

    let delivery_type = data.delivery_type;
    let id = state
        .store
        .create(data)
        .await
        .map_err(|e| ApiError::store(Operation::Create, e))?;

    info!("Created {} bouquet {}", delivery_type, id);
    Ok((StatusCode::CREATED, Json(CreateBouquetResponse { id })))
}

/// GET /bouquets/{id}
pub async fn get_bouquet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BouquetView>, ApiError> {
    let bouquet = state
        .store
        .get(&BouquetId::new(id))
        .await
        .map_err(|e| ApiError::store(Operation::Get, e))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(BouquetView::at(bouquet, Utc::now())))
}

/// GET /bouquets?count=&cursor=: the public garden, newest first.
pub async fn list_bouquets(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Page>, ApiError> {
    let Query(query) = query?;
    let options = ListOptions {
        count: query.count,
        cursor: query.cursor.filter(|c| !c.is_empty()).map(Cursor::new),
    };

    let page = state
        .store
        .list_public(options)
        .await
        .map_err(|e| ApiError::store(Operation::List, e))?;

    Ok(Json(page))
}
