// Copyright (c) 2026 Tally Contributors. MIT License.
// See LICENSE for details.

//! # Tally Ledger: Core Library
//!
//! One pipeline, written once: validate a candidate transaction, give it an
//! identifier and a timestamp, keep it, and hand it back on request. Every
//! transport (HTTP today, whatever comes next tomorrow) calls into this crate
//! and only worries about shaping requests and responses.
//!
//! ## Architecture
//!
//! - **transaction**: The `Transaction` record, the validated `TransactionDraft`,
//!   and the canonical validator.
//! - **storage**: The `TransactionStore` trait and its in-memory implementation.
//! - **service**: `TransactionService`, the only entry point transports call.
//! - **config**: Field limits, default ports, and other constants.
//!
//! ## Error Model
//!
//! 1. Bad input is a [`ValidationError`] listing every violated rule.
//! 2. A missing transaction is `None`. It is an answer, not a failure.
//! 3. Store faults are [`StoreError`]s and never look like bad input.

pub mod config;
pub mod service;
pub mod storage;
pub mod transaction;

pub use service::{ServiceError, TransactionService};
pub use storage::{InMemoryTransactionStore, StoreError, TransactionStore};
pub use transaction::{
    validate_candidate, Rule, Transaction, TransactionDraft, TransactionId, ValidationError,
    Violation,
};
