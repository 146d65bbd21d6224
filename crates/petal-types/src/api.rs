use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Bouquet, BouquetId, DeliveryType, Flower};

// -- Bouquets --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBouquetRequest {
    /// Catalog id or slug of the chosen flower.
    pub flower: String,
    #[serde(default)]
    pub recipient_name: String,
    pub message: Option<String>,
    pub delivery_type: DeliveryType,
    pub delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBouquetResponse {
    pub id: BouquetId,
}

/// A bouquet as shown to a reader. Sealed timed bouquets withhold the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BouquetView {
    pub id: BouquetId,
    pub flower: Flower,
    pub recipient_name: String,
    pub message: Option<String>,
    pub delivery_type: DeliveryType,
    pub delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub sealed: bool,
}

impl BouquetView {
    pub fn at(bouquet: Bouquet, now: DateTime<Utc>) -> Self {
        let sealed = bouquet.is_sealed(now);
        Self {
            id: bouquet.id,
            flower: bouquet.flower,
            recipient_name: bouquet.recipient_name,
            message: if sealed { None } else { bouquet.message },
            delivery_type: bouquet.delivery_type,
            delivery_date: bouquet.delivery_date,
            created_at: bouquet.created_at,
            sealed,
        }
    }
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

// -- Health --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}
