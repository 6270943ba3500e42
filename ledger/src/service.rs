//! # Transaction Service
//!
//! The pipeline transports call: validate, store, return. It is a thin,
//! deterministic composition that recovers nothing on its own. Validation
//! failures and store faults go back to the caller untouched, and the
//! transport decides what they look like on the wire.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::storage::{StoreError, TransactionStore};
use crate::transaction::{
    validate_candidate, Transaction, TransactionDraft, TransactionId, ValidationError,
};

/// Errors returned by [`TransactionService::create_transaction`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The candidate broke one or more field rules. The caller's problem.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store could not accept the transaction. Our problem.
    #[error("store fault: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// `true` when the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}

/// The create/read pipeline over a shared [`TransactionStore`].
///
/// Cheap to clone: the store sits behind an `Arc`.
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
}

impl fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionService").finish_non_exhaustive()
    }
}

impl TransactionService {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Validates a raw candidate and, if it passes, stores it.
    ///
    /// Once this returns `Ok`, the transaction is visible to every subsequent
    /// [`get_transaction_details`](Self::get_transaction_details) call.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Validation`] if any field rule fails. Nothing is stored.
    /// - [`ServiceError::Store`] if the store refuses the insert.
    pub fn create_transaction(&self, candidate: &Value) -> Result<Transaction, ServiceError> {
        let draft = validate_candidate(candidate).map_err(|err| {
            tracing::debug!(violations = err.violations().len(), "candidate rejected: {}", err);
            err
        })?;
        self.create_from_draft(draft)
    }

    /// Stores a draft that is already known to be valid.
    pub fn create_from_draft(&self, draft: TransactionDraft) -> Result<Transaction, ServiceError> {
        let tx = self.store.insert(draft).map_err(|err| {
            tracing::warn!(error = %err, "failed to store transaction");
            err
        })?;

        tracing::info!(
            id = %tx.id,
            amount = tx.amount,
            currency = %tx.currency,
            "transaction created"
        );
        Ok(tx)
    }

    /// Looks up a transaction by its string id.
    ///
    /// Returns `None` for ids that were never created, including strings that
    /// aren't ids at all. Never an error: "not there" is a normal answer.
    pub fn get_transaction_details(&self, id: &str) -> Option<Transaction> {
        let Ok(parsed) = id.parse::<TransactionId>() else {
            tracing::debug!(id, "lookup for malformed transaction id");
            return None;
        };

        let found = self.store.find_by_id(&parsed);
        tracing::debug!(id = %parsed, found = found.is_some(), "transaction lookup");
        found
    }

    /// Number of transactions held by the underlying store.
    pub fn stored_count(&self) -> usize {
        self.store.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
