//! The canonical create-request validator.
//!
//! Every transport funnels its request body through [`validate_candidate`].
//! Rules are evaluated independently and never short-circuit, so a caller
//! gets the full list of problems in one round trip instead of fixing them
//! one at a time.
//!
//! Violation order is deterministic: `amount`, `currency`, `description`,
//! then unknown fields in the order the JSON map yields them.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::TransactionDraft;
use crate::config::{
    ALLOWED_CANDIDATE_FIELDS, CURRENCY_CODE_LENGTH, MAX_DESCRIPTION_LENGTH,
    MIN_DESCRIPTION_LENGTH,
};

// ---------------------------------------------------------------------------
// Rules & Violations
// ---------------------------------------------------------------------------

/// A single rule a candidate field can break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The field is missing.
    Required,
    /// The field has the wrong JSON type.
    InvalidType { expected: &'static str },
    /// The number is NaN or infinite.
    NotFinite,
    /// The number is zero or negative.
    NotPositive,
    /// The string must have exactly `expected` characters.
    ExactLength { expected: usize, actual: usize },
    /// The string has fewer than `min` characters.
    TooShort { min: usize, actual: usize },
    /// The string has more than `max` characters.
    TooLong { max: usize, actual: usize },
    /// The field is not part of the create contract.
    UnknownField,
    /// The candidate itself is not a JSON object.
    NotAnObject,
}

impl Rule {
    /// Stable machine-readable code, suitable for API clients to switch on.
    pub fn code(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::InvalidType { .. } => "invalid_type",
            Rule::NotFinite => "not_finite",
            Rule::NotPositive => "not_positive",
            Rule::ExactLength { .. } => "exact_length",
            Rule::TooShort { .. } => "too_short",
            Rule::TooLong { .. } => "too_long",
            Rule::UnknownField => "unknown_field",
            Rule::NotAnObject => "not_an_object",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "is required"),
            Rule::InvalidType { expected } => write!(f, "must be a {}", expected),
            Rule::NotFinite => write!(f, "must be a finite number"),
            Rule::NotPositive => write!(f, "must be greater than 0"),
            Rule::ExactLength { expected, actual } => {
                write!(f, "must be exactly {} characters (got {})", expected, actual)
            }
            Rule::TooShort { min, actual } => {
                write!(f, "must be at least {} characters (got {})", min, actual)
            }
            Rule::TooLong { max, actual } => {
                write!(f, "must be at most {} characters (got {})", max, actual)
            }
            Rule::UnknownField => write!(f, "is not an allowed field"),
            Rule::NotAnObject => write!(f, "must be a JSON object"),
        }
    }
}

/// One broken rule on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Offending field name. Empty when the rule applies to the whole candidate.
    pub field: String,
    /// The rule that was broken.
    pub rule: Rule,
}

impl Violation {
    pub fn new(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "request {}", self.rule)
        } else {
            write!(f, "`{}` {}", self.field, self.rule)
        }
    }
}

/// A candidate failed one or more rules.
///
/// Always non-empty. Recoverable: the caller fixes the request and tries again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    fn new(violations: Vec<Violation>) -> Self {
        debug_assert!(!violations.is_empty(), "validation error without violations");
        Self { violations }
    }

    /// Every violation, in evaluation order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Returns `true` if any violation names `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Field Rules
// ---------------------------------------------------------------------------

fn check_amount(amount: f64) -> Option<Rule> {
    if !amount.is_finite() {
        Some(Rule::NotFinite)
    } else if amount <= 0.0 {
        Some(Rule::NotPositive)
    } else {
        None
    }
}

fn check_currency(currency: &str) -> Option<Rule> {
    let actual = currency.chars().count();
    (actual != CURRENCY_CODE_LENGTH).then_some(Rule::ExactLength {
        expected: CURRENCY_CODE_LENGTH,
        actual,
    })
}

fn check_description(description: &str) -> Option<Rule> {
    let actual = description.chars().count();
    if actual < MIN_DESCRIPTION_LENGTH {
        Some(Rule::TooShort {
            min: MIN_DESCRIPTION_LENGTH,
            actual,
        })
    } else if actual > MAX_DESCRIPTION_LENGTH {
        Some(Rule::TooLong {
            max: MAX_DESCRIPTION_LENGTH,
            actual,
        })
    } else {
        None
    }
}

/// Applies the amount, currency, and description rules to typed values.
///
/// # Errors
///
/// Returns every violated rule, in field order.
pub fn validate_fields(amount: f64, currency: &str, description: &str) -> Result<(), ValidationError> {
    let violations: Vec<Violation> = [
        ("amount", check_amount(amount)),
        ("currency", check_currency(currency)),
        ("description", check_description(description)),
    ]
    .into_iter()
    .filter_map(|(field, rule)| rule.map(|r| Violation::new(field, r)))
    .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}

// ---------------------------------------------------------------------------
// Candidate Validation
// ---------------------------------------------------------------------------

fn number_field(
    object: &Map<String, Value>,
    field: &str,
    check: fn(f64) -> Option<Rule>,
    violations: &mut Vec<Violation>,
) -> Option<f64> {
    let rule = match object.get(field) {
        None => Rule::Required,
        // Literals outside the f64 range are rejected by the JSON parser, so
        // every number that gets this far converts.
        Some(Value::Number(n)) => {
            let value = n.as_f64().unwrap_or(f64::NAN);
            match check(value) {
                None => return Some(value),
                Some(rule) => rule,
            }
        }
        Some(_) => Rule::InvalidType { expected: "number" },
    };
    violations.push(Violation::new(field, rule));
    None
}

fn string_field<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    check: fn(&str) -> Option<Rule>,
    violations: &mut Vec<Violation>,
) -> Option<&'a str> {
    let rule = match object.get(field) {
        None => Rule::Required,
        Some(Value::String(s)) => match check(s) {
            None => return Some(s.as_str()),
            Some(rule) => rule,
        },
        Some(_) => Rule::InvalidType { expected: "string" },
    };
    violations.push(Violation::new(field, rule));
    None
}

/// Validates a raw create request.
///
/// The candidate is whatever JSON the transport received. On success the
/// result is a [`TransactionDraft`] ready for the store; on failure it is
/// a [`ValidationError`] naming every offending field and rule.
///
/// Pure: no side effects, no external state.
pub fn validate_candidate(candidate: &Value) -> Result<TransactionDraft, ValidationError> {
    let Some(object) = candidate.as_object() else {
        return Err(ValidationError::new(vec![Violation::new(
            "",
            Rule::NotAnObject,
        )]));
    };

    let mut violations = Vec::new();
    let amount = number_field(object, "amount", check_amount, &mut violations);
    let currency = string_field(object, "currency", check_currency, &mut violations);
    let description = string_field(object, "description", check_description, &mut violations);

    violations.extend(
        object
            .keys()
            .filter(|key| !ALLOWED_CANDIDATE_FIELDS.contains(&key.as_str()))
            .map(|key| Violation::new(key.as_str(), Rule::UnknownField)),
    );

    match (amount, currency, description) {
        (Some(amount), Some(currency), Some(description)) if violations.is_empty() => Ok(
            TransactionDraft::from_validated(amount, currency.to_owned(), description.to_owned()),
        ),
        _ => Err(ValidationError::new(violations)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
