//! Core value types: transaction identifiers, validated drafts, and the
//! stored transaction record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_fields, ValidationError};

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// Opaque, store-assigned transaction identifier.
///
/// Backed by a random (v4) UUID, so two ids drawn independently collide with
/// probability around 2^-122. Rendered as lowercase hyphenated hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Draws a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TransactionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// TransactionDraft
// ---------------------------------------------------------------------------

/// A create request that has passed validation.
///
/// Fields are private: the only ways to get a draft are the validator and
/// [`TransactionDraft::new`], and both enforce the same field rules. Holding
/// a draft therefore means holding valid input.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    amount: f64,
    currency: String,
    description: String,
}

impl TransactionDraft {
    /// Builds a draft from typed values, applying the amount, currency, and
    /// description rules.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every rule the values break.
    pub fn new(
        amount: f64,
        currency: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let currency = currency.into();
        let description = description.into();
        validate_fields(amount, &currency, &description)?;
        Ok(Self::from_validated(amount, currency, description))
    }

    /// Assembles a draft from values the caller has already validated.
    pub(crate) fn from_validated(amount: f64, currency: String, description: String) -> Self {
        Self {
            amount,
            currency,
            description,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A stored transaction. Immutable once the store hands it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned unique identifier.
    pub id: TransactionId,
    /// Positive amount, qualified by `currency`.
    pub amount: f64,
    /// Three-character currency code. Not checked against a currency list.
    pub currency: String,
    /// Free-form description, 1 to 255 characters.
    pub description: String,
    /// When the store accepted the transaction.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Stamps a validated draft with its identity and acceptance time.
    pub fn from_draft(draft: TransactionDraft, id: TransactionId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            amount: draft.amount,
            currency: draft.currency,
            description: draft.description,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_display_roundtrips_through_from_str() {
        let id = TransactionId::generate();
        let parsed: TransactionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn transaction_id_renders_lowercase_hyphenated() {
        let uuid = Uuid::parse_str("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        let id = TransactionId::from(uuid);
        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn transaction_id_rejects_garbage() {
        assert!("nonexistent-id".parse::<TransactionId>().is_err());
        assert!("".parse::<TransactionId>().is_err());
    }

    #[test]
    fn generated_ids_are_random() {
        assert_ne!(TransactionId::generate(), TransactionId::generate());
    }

    #[test]
    fn transaction_id_serializes_as_plain_string() {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let json = serde_json::to_value(TransactionId::from(uuid)).unwrap();
        assert_eq!(json, serde_json::json!("67e55044-10b1-426f-9247-bb680e5fe0c8"));
    }

    #[test]
    fn draft_new_accepts_valid_values() {
        let draft = TransactionDraft::new(100.0, "USD", "Coffee").unwrap();
        assert_eq!(draft.amount(), 100.0);
        assert_eq!(draft.currency(), "USD");
        assert_eq!(draft.description(), "Coffee");
    }

    #[test]
    fn draft_new_rejects_invalid_values() {
        let err = TransactionDraft::new(0.0, "US", "").unwrap_err();
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn from_draft_copies_fields() {
        let draft = TransactionDraft::new(42.5, "EUR", "Lunch").unwrap();
        let id = TransactionId::generate();
        let now = Utc::now();
        let tx = Transaction::from_draft(draft, id, now);

        assert_eq!(tx.id, id);
        assert_eq!(tx.amount, 42.5);
        assert_eq!(tx.currency, "EUR");
        assert_eq!(tx.description, "Lunch");
        assert_eq!(tx.timestamp, now);
    }
}
