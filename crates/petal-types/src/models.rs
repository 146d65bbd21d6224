use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A symbolic flower from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flower {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub meaning: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    /// Reachable only through its link
    Private,
    /// Listed in the public garden
    Public,
    /// Revealed on `delivery_date`
    Timed,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Timed => "timed",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            "timed" => Ok(Self::Timed),
            other => Err(format!("unknown delivery type '{}'", other)),
        }
    }
}

/// Bouquet identifier. Local stores mint UUIDs; the remote document store
/// assigns its own ids, so the type stays a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BouquetId(String);

impl BouquetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BouquetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BouquetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Fields supplied by the caller when creating a bouquet.
///
/// `flower` is copied by value into the stored record; later catalog edits
/// never reach existing bouquets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBouquet {
    pub flower: Flower,
    #[serde(default)]
    pub recipient_name: String,
    pub message: Option<String>,
    pub delivery_type: DeliveryType,
    pub delivery_date: Option<DateTime<Utc>>,
}

/// A stored bouquet. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bouquet {
    pub id: BouquetId,
    pub flower: Flower,
    pub recipient_name: String,
    pub message: Option<String>,
    pub delivery_type: DeliveryType,
    pub delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Bouquet {
    pub fn from_new(id: BouquetId, data: NewBouquet, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            flower: data.flower,
            recipient_name: data.recipient_name,
            message: data.message,
            delivery_type: data.delivery_type,
            delivery_date: data.delivery_date,
            created_at,
        }
    }

    pub fn is_public(&self) -> bool {
        self.delivery_type == DeliveryType::Public
    }

    /// A timed bouquet stays sealed until its delivery date has passed.
    pub fn is_sealed(&self, now: DateTime<Utc>) -> bool {
        self.delivery_type == DeliveryType::Timed
            && self.delivery_date.is_some_and(|date| date > now)
    }
}

/// Opaque pagination token. Only the store that issued it can interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the items of a page were ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrdering {
    /// Newest-first across all pages, ordered by the backend.
    Global,
    /// Newest-first within this page only. The backend could not order the
    /// query, so consecutive pages may interleave.
    PageLocal,
}

/// One page of public bouquets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Bouquet>,
    pub next_cursor: Option<Cursor>,
    pub ordering: PageOrdering,
}

impl Page {
    pub fn empty(ordering: PageOrdering) -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rose() -> Flower {
        Flower {
            id: "1".into(),
            name: "Rose".into(),
            slug: "rose".into(),
            meaning: "For love, admiration, or remembrance.".into(),
            image_ref: "rose".into(),
        }
    }

    fn timed(delivery_date: Option<DateTime<Utc>>) -> Bouquet {
        Bouquet {
            id: BouquetId::generate(),
            flower: rose(),
            recipient_name: String::new(),
            message: Some("See you soon".into()),
            delivery_type: DeliveryType::Timed,
            delivery_date,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn delivery_type_wire_names() {
        assert_eq!(serde_json::to_string(&DeliveryType::Timed).unwrap(), "\"timed\"");
        assert_eq!("public".parse::<DeliveryType>(), Ok(DeliveryType::Public));
        assert!("secret".parse::<DeliveryType>().is_err());
    }

    #[test]
    fn timed_bouquet_sealed_until_delivery() {
        let now = Utc::now();
        let b = timed(Some(now + Duration::days(2)));
        assert!(b.is_sealed(now));
        assert!(!b.is_sealed(now + Duration::days(3)));
    }

    #[test]
    fn non_timed_never_sealed() {
        let now = Utc::now();
        let mut b = timed(Some(now + Duration::days(2)));
        b.delivery_type = DeliveryType::Private;
        assert!(!b.is_sealed(now));
    }

    #[test]
    fn recipient_name_defaults_to_empty() {
        let json = serde_json::json!({
            "flower": rose(),
            "message": "hi",
            "delivery_type": "public",
            "delivery_date": null,
        });
        let data: NewBouquet = serde_json::from_value(json).unwrap();
        assert_eq!(data.recipient_name, "");
    }
}
