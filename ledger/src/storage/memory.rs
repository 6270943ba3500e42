//! In-memory transaction store.
//!
//! Transactions live for as long as the process does. Reads and writes go
//! through a `DashMap`, so lookups on different shards never contend and a
//! lookup only holds its shard's read lock long enough to clone one entry.
//!
//! ## Capacity
//!
//! A store built with [`InMemoryTransactionStore::with_capacity_limit`]
//! refuses inserts once the limit is reached. Slots are reserved with an
//! atomic counter *before* touching the map, so concurrent inserts can't
//! overshoot the limit between a length check and the write.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{StoreError, StoreResult, TransactionStore};
use crate::config::MAX_ID_ATTEMPTS;
use crate::transaction::{Transaction, TransactionDraft, TransactionId};

/// A thread-safe, process-lifetime transaction store.
pub struct InMemoryTransactionStore {
    /// Stored transactions, keyed by id.
    transactions: DashMap<TransactionId, Transaction>,

    /// Number of slots taken or reserved. Only ever grows.
    reserved: AtomicUsize,

    /// Maximum number of transactions, if bounded.
    capacity: Option<usize>,
}

impl fmt::Debug for InMemoryTransactionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTransactionStore")
            .field("len", &self.transactions.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransactionStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            reserved: AtomicUsize::new(0),
            capacity: None,
        }
    }

    /// Creates a store that holds at most `capacity` transactions.
    ///
    /// The limit is a refusal threshold only. Nothing is allocated up front.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            transactions: DashMap::new(),
            reserved: AtomicUsize::new(0),
            capacity: Some(capacity),
        }
    }

    /// The configured capacity limit, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Claims one slot against the capacity limit.
    fn reserve_slot(&self) -> StoreResult<()> {
        let Some(capacity) = self.capacity else {
            self.reserved.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        };

        self.reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |taken| {
                (taken < capacity).then_some(taken + 1)
            })
            .map(|_| ())
            .map_err(|_| StoreError::CapacityExhausted { capacity })
    }

    /// Hands back a slot claimed by an insert that didn't complete.
    fn release_slot(&self) {
        self.reserved.fetch_sub(1, Ordering::AcqRel);
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn insert(&self, draft: TransactionDraft) -> StoreResult<Transaction> {
        self.reserve_slot()?;

        // The vacant-entry API holds the shard write lock between the
        // existence check and the write, so a colliding id can never
        // overwrite an existing transaction.
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = TransactionId::generate();
            match self.transactions.entry(id) {
                Entry::Occupied(_) => {
                    tracing::warn!(%id, attempt, "transaction id collision, drawing a new one");
                }
                Entry::Vacant(slot) => {
                    let tx = Transaction::from_draft(draft, id, Utc::now());
                    slot.insert(tx.clone());
                    tracing::debug!(%id, "transaction stored");
                    return Ok(tx);
                }
            }
        }

        self.release_slot();
        Err(StoreError::IdGeneration {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn find_by_id(&self, id: &TransactionId) -> Option<Transaction> {
        self.transactions.get(id).map(|entry| entry.value().clone())
    }

    fn len(&self) -> usize {
        self.transactions.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
