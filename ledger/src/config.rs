//! # Service Configuration & Constants
//!
//! Field limits, default ports, and the few other numbers the pipeline
//! and its transports agree on. If a limit shows up as a literal anywhere
//! else, it belongs here instead.

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Version of the transaction API contract. Separate from the crate version
/// because a refactor doesn't always mean the wire shape changed.
pub const API_VERSION: &str = "1.0.0";

// ---------------------------------------------------------------------------
// Field Limits
// ---------------------------------------------------------------------------

/// ISO-4217 style currency codes: three characters, no more, no less.
pub const CURRENCY_CODE_LENGTH: usize = 3;

/// A description must say *something*.
pub const MIN_DESCRIPTION_LENGTH: usize = 1;

/// Upper bound on description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// The complete set of fields a create request may carry. Anything else is
/// rejected rather than silently dropped.
pub const ALLOWED_CANDIDATE_FIELDS: [&str; 3] = ["amount", "currency", "description"];

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// How many fresh identifiers the store will draw before giving up on an
/// insert. With 122 random bits per UUID a single retry is already a
/// once-in-the-universe event; eight means something is badly broken.
pub const MAX_ID_ATTEMPTS: usize = 8;

// ---------------------------------------------------------------------------
// Network Defaults
// ---------------------------------------------------------------------------

/// Default HTTP API port.
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default Prometheus metrics port.
pub const DEFAULT_METRICS_PORT: u16 = 9100;

/// Default upper bound on request body size, in bytes. A valid create
/// request is well under 1 KiB; 64 KiB leaves plenty of slack.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_bounds_sanity() {
        assert!(MIN_DESCRIPTION_LENGTH >= 1);
        assert!(MIN_DESCRIPTION_LENGTH < MAX_DESCRIPTION_LENGTH);
    }

    #[test]
    fn test_allowed_fields_are_distinct() {
        let mut fields = ALLOWED_CANDIDATE_FIELDS.to_vec();
        fields.sort_unstable();
        fields.dedup();
        assert_eq!(fields.len(), ALLOWED_CANDIDATE_FIELDS.len());
    }

    #[test]
    fn test_default_ports_do_not_collide() {
        assert_ne!(DEFAULT_HTTP_PORT, DEFAULT_METRICS_PORT);
    }

    #[test]
    fn test_id_attempts_allow_a_retry() {
        assert!(MAX_ID_ATTEMPTS > 1);
    }
}
