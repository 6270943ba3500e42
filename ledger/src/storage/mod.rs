//! # Storage Module
//!
//! Keyed storage for transactions. The pipeline only ever talks to the
//! [`TransactionStore`] trait, so a different backend can be swapped in
//! without touching validation or transport code.
//!
//! ## Architecture
//!
//! ```text
//! mod.rs    TransactionStore trait and StoreError
//! memory.rs InMemoryTransactionStore, a DashMap-backed process-lifetime store
//! ```
//!
//! ## Contract
//!
//! - `insert` assigns a fresh unique id and the current time, stores the
//!   complete transaction, and returns it. Readers never observe a partially
//!   built entry.
//! - `find_by_id` returns `None` for ids it has never seen. It does not fail.
//! - `len` counts complete transactions only.
//! - There is no update and no delete.

pub mod memory;

pub use memory::InMemoryTransactionStore;

use thiserror::Error;

use crate::transaction::{Transaction, TransactionDraft, TransactionId};

/// Internal store faults. None of these are the caller's fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store was built with a capacity limit and it has been reached.
    /// Nothing is evicted; the insert is refused.
    #[error("transaction store is full ({capacity} transactions)")]
    CapacityExhausted { capacity: usize },

    /// Every identifier drawn for this insert was already taken.
    #[error("could not generate a unique transaction id after {attempts} attempts")]
    IdGeneration { attempts: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage for transactions.
///
/// Implementations must be safe to share across threads: concurrent inserts
/// each get a distinct id, and lookups see either nothing or a complete
/// transaction.
pub trait TransactionStore: Send + Sync {
    /// Stamps `draft` with a fresh id and the current time, stores it, and
    /// returns the stored transaction.
    fn insert(&self, draft: TransactionDraft) -> StoreResult<Transaction>;

    /// Returns the transaction with the given id, or `None` if there isn't one.
    fn find_by_id(&self, id: &TransactionId) -> Option<Transaction>;

    /// Number of stored transactions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
