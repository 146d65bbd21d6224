use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use petal_types::{DeliveryType, NewBouquet};

/// Creation rules that vary between deployments.
#[derive(Debug, Clone, Copy)]
pub struct ValidationPolicy {
    /// Reject bouquets without a non-blank message.
    pub require_message: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            require_message: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A message is required.")]
    MessageRequired,

    #[error("Your {field} contains inappropriate language. Please revise it.")]
    InappropriateLanguage { field: &'static str },

    #[error("Timed bouquets need a delivery date.")]
    DeliveryDateRequired,

    #[error("The delivery date must be in the future.")]
    DeliveryDateNotInFuture,

    #[error("Only timed bouquets take a delivery date.")]
    UnexpectedDeliveryDate,

    #[error("Unknown flower '{0}'.")]
    UnknownFlower(String),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MessageRequired => "message_required",
            Self::InappropriateLanguage { .. } => "inappropriate_language",
            Self::DeliveryDateRequired => "delivery_date_required",
            Self::DeliveryDateNotInFuture => "delivery_date_not_in_future",
            Self::UnexpectedDeliveryDate => "unexpected_delivery_date",
            Self::UnknownFlower(_) => "unknown_flower",
        }
    }
}

/// Check a bouquet before it reaches the store. `now` is the reference point
/// for timed deliveries.
pub fn validate_new_bouquet(
    data: &NewBouquet,
    policy: &ValidationPolicy,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    let message = data.message.as_deref().unwrap_or("");
    if policy.require_message && message.trim().is_empty() {
        return Err(ValidationError::MessageRequired);
    }

    check_language("message", message)?;
    check_language("recipient name", &data.recipient_name)?;

    match (data.delivery_type, data.delivery_date) {
        (DeliveryType::Timed, None) => Err(ValidationError::DeliveryDateRequired),
        (DeliveryType::Timed, Some(date)) if date <= now => {
            Err(ValidationError::DeliveryDateNotInFuture)
        }
        (DeliveryType::Private | DeliveryType::Public, Some(_)) => {
            Err(ValidationError::UnexpectedDeliveryDate)
        }
        _ => Ok(()),
    }
}

fn check_language(field: &'static str, text: &str) -> Result<(), ValidationError> {
    if petal_filter::is_admissible(text) {
        return Ok(());
    }

    // Log categories only, never the text itself
    let categories: Vec<&str> = petal_filter::blocked_terms(text)
        .iter()
        .map(|t| t.category.as_str())
        .collect();
    warn!("Rejected bouquet {}: blocked terms ({})", field, categories.join(", "));
    Err(ValidationError::InappropriateLanguage { field })
}
