//! # Transaction Module
//!
//! The one entity Tally knows about, plus the rules a create request must
//! satisfy before it becomes one.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      Transaction, TransactionId, and the validated TransactionDraft
//! validation.rs The canonical validator: rules, violations, ValidationError
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Validate**: A transport hands a raw candidate to [`validate_candidate`],
//!    which returns a [`TransactionDraft`] or every rule the candidate broke.
//! 2. **Store**: The store stamps the draft with an id and a timestamp,
//!    producing an immutable [`Transaction`].
//! 3. **Read**: Lookups return clones. Nothing is ever updated or deleted.

pub mod types;
pub mod validation;

pub use types::{Transaction, TransactionDraft, TransactionId};
pub use validation::{validate_candidate, validate_fields, Rule, ValidationError, Violation};
