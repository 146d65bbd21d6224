//! Database row types. These map directly to SQLite rows and stay distinct
//! from the petal-types models so the storage layout can change on its own.

use chrono::{DateTime, Utc};

use petal_types::{Bouquet, BouquetId, Flower};

use crate::store::StoreError;

pub struct BouquetRow {
    pub seq: i64,
    pub id: String,
    pub flower: String,
    pub recipient_name: String,
    pub message: Option<String>,
    pub delivery_type: String,
    pub delivery_date: Option<String>,
    pub created_at: String,
}

impl BouquetRow {
    pub fn into_bouquet(self) -> Result<Bouquet, StoreError> {
        let flower: Flower = serde_json::from_str(&self.flower)
            .map_err(|e| StoreError::corrupt(&self.id, format!("flower snapshot: {}", e)))?;
        let delivery_type = self
            .delivery_type
            .parse()
            .map_err(|e| StoreError::corrupt(&self.id, e))?;
        let delivery_date = self
            .delivery_date
            .as_deref()
            .map(|raw| parse_timestamp(&self.id, raw))
            .transpose()?;
        let created_at = parse_timestamp(&self.id, &self.created_at)?;

        Ok(Bouquet {
            id: BouquetId::new(self.id),
            flower,
            recipient_name: self.recipient_name,
            message: self.message,
            delivery_type,
            delivery_date,
            created_at,
        })
    }
}

fn parse_timestamp(id: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::corrupt(id, format!("timestamp '{}': {}", raw, e)))
}
