use crate::Database;
use crate::models::BouquetRow;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, Row};

use petal_types::{BouquetId, DeliveryType, NewBouquet};

const BOUQUET_COLUMNS: &str =
    "seq, id, flower, recipient_name, message, delivery_type, delivery_date, created_at";

/// Stored timestamps keep microseconds so they sort lexically and stay distinct.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Caller-supplied dates are stored at full precision.
pub fn format_delivery_date(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl Database {
    // -- Bouquets --

    /// Insert a bouquet and return the `created_at` it was stamped with.
    ///
    /// The stamp is taken under the writer lock and forced past the previous
    /// row's, so `created_at` order always matches insertion order.
    pub fn insert_bouquet(&self, id: &BouquetId, data: &NewBouquet) -> Result<DateTime<Utc>> {
        let flower = serde_json::to_string(&data.flower)?;
        let delivery_date = data.delivery_date.as_ref().map(format_delivery_date);

        self.with_conn_mut(|conn| {
            let created_at = next_timestamp(conn)?;
            conn.execute(
                "INSERT INTO bouquets (id, flower, recipient_name, message, delivery_type, delivery_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id.as_str(),
                    flower,
                    data.recipient_name,
                    data.message,
                    data.delivery_type.as_str(),
                    delivery_date,
                    format_timestamp(&created_at),
                ],
            )?;
            Ok(created_at)
        })
    }

    pub fn get_bouquet(&self, id: &str) -> Result<Option<BouquetRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM bouquets WHERE id = ?1", BOUQUET_COLUMNS);
            conn.query_row(&sql, [id], map_bouquet_row).optional()
        })
    }

    /// Public bouquets newest first, starting strictly before `before_seq`.
    pub fn list_public_bouquets(&self, before_seq: Option<i64>, limit: u32) -> Result<Vec<BouquetRow>> {
        self.with_conn(|conn| query_public(conn, before_seq, limit))
    }
}

fn next_timestamp(conn: &Connection) -> Result<DateTime<Utc>> {
    let now = Utc::now().trunc_subsecs(6);

    let last: Option<String> = conn
        .query_row(
            "SELECT created_at FROM bouquets ORDER BY seq DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let Some(last) = last else {
        return Ok(now);
    };
    let last = DateTime::parse_from_rfc3339(&last)
        .map_err(|e| anyhow!("Corrupt created_at '{}': {}", last, e))?
        .with_timezone(&Utc);

    if now > last {
        Ok(now)
    } else {
        Ok(last + Duration::microseconds(1))
    }
}

fn query_public(conn: &Connection, before_seq: Option<i64>, limit: u32) -> Result<Vec<BouquetRow>> {
    let sql = format!(
        "SELECT {}
         FROM bouquets
         WHERE delivery_type = ?1
           AND (?2 IS NULL OR seq < ?2)
         ORDER BY seq DESC
         LIMIT ?3",
        BOUQUET_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(
            rusqlite::params![DeliveryType::Public.as_str(), before_seq, limit],
            map_bouquet_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_bouquet_row(row: &Row<'_>) -> rusqlite::Result<BouquetRow> {
    Ok(BouquetRow {
        seq: row.get(0)?,
        id: row.get(1)?,
        flower: row.get(2)?,
        recipient_name: row.get(3)?,
        message: row.get(4)?,
        delivery_type: row.get(5)?,
        delivery_date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petal_types::catalog;

    fn note(delivery_type: DeliveryType) -> NewBouquet {
        NewBouquet {
            flower: catalog::lookup_by_slug("daisy").unwrap().clone(),
            recipient_name: "Ada".into(),
            message: Some("Thinking of you".into()),
            delivery_type,
            delivery_date: None,
        }
    }

    #[test]
    fn created_at_strictly_increases() {
        let db = Database::open_in_memory().unwrap();
        let mut previous = None;
        for _ in 0..50 {
            let stamp = db
                .insert_bouquet(&BouquetId::generate(), &note(DeliveryType::Public))
                .unwrap();
            if let Some(prev) = previous {
                assert!(stamp > prev);
            }
            previous = Some(stamp);
        }
    }

    #[test]
    fn public_query_skips_other_delivery_types() {
        let db = Database::open_in_memory().unwrap();
        db.insert_bouquet(&BouquetId::generate(), &note(DeliveryType::Private)).unwrap();
        db.insert_bouquet(&BouquetId::generate(), &note(DeliveryType::Public)).unwrap();

        let rows = db.list_public_bouquets(None, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].delivery_type, "public");
    }

    #[test]
    fn missing_row_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_bouquet("nope").unwrap().is_none());
    }
}
