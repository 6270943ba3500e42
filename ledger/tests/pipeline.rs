//! End-to-end tests for the Tally pipeline.
//!
//! These drive the public API only: build a store, wrap it in a service,
//! create and look up transactions. Each test owns its own store, so there
//! is no shared state and no ordering dependency between tests.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use tally_ledger::{
    InMemoryTransactionStore, Rule, ServiceError, StoreError, TransactionService, TransactionStore,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn setup() -> (TransactionService, Arc<InMemoryTransactionStore>) {
    let store = Arc::new(InMemoryTransactionStore::new());
    let service = TransactionService::new(store.clone());
    (service, store)
}

fn validation_fields(err: ServiceError) -> Vec<String> {
    match err {
        ServiceError::Validation(v) => v.into_violations().into_iter().map(|v| v.field).collect(),
        other => panic!("expected a validation error, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn coffee_is_created_and_read_back() {
    let (service, _) = setup();
    let before = Utc::now();

    let tx = service
        .create_transaction(&json!({
            "amount": 100,
            "currency": "USD",
            "description": "Coffee"
        }))
        .expect("valid candidate");

    assert!(!tx.id.to_string().is_empty());
    assert_eq!(tx.amount, 100.0);
    assert_eq!(tx.currency, "USD");
    assert_eq!(tx.description, "Coffee");
    assert!(tx.timestamp >= before);
    assert!(tx.timestamp - before < Duration::seconds(5));

    let fetched = service
        .get_transaction_details(&tx.id.to_string())
        .expect("just created");
    assert_eq!(fetched, tx);
}

#[test]
fn negative_amount_is_rejected() {
    let (service, _) = setup();
    let err = service
        .create_transaction(&json!({ "amount": -5, "currency": "USD", "description": "Bad" }))
        .unwrap_err();
    assert_eq!(validation_fields(err), vec!["amount"]);
}

#[test]
fn two_letter_currency_is_rejected() {
    let (service, _) = setup();
    let err = service
        .create_transaction(&json!({ "amount": 10, "currency": "US", "description": "Bad code" }))
        .unwrap_err();
    assert_eq!(validation_fields(err), vec!["currency"]);
}

#[test]
fn unknown_id_is_not_found() {
    let (service, _) = setup();
    assert!(service.get_transaction_details("nonexistent-id").is_none());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn non_positive_amounts_always_mention_amount() {
    let (service, store) = setup();
    for amount in [0.0, -0.0, -0.01, -1.0, -1e9, f64::MIN] {
        let err = service
            .create_transaction(&json!({ "amount": amount, "currency": "USD", "description": "x" }))
            .unwrap_err();
        assert!(validation_fields(err).contains(&"amount".to_string()), "amount {}", amount);
    }
    assert!(store.is_empty());
}

#[test]
fn wrong_length_currencies_always_mention_currency() {
    let (service, _) = setup();
    for currency in ["", "U", "US", "USDT", "DOLLARS"] {
        let err = service
            .create_transaction(&json!({ "amount": 1, "currency": currency, "description": "x" }))
            .unwrap_err();
        assert_eq!(validation_fields(err), vec!["currency"], "currency {:?}", currency);
    }
}

#[test]
fn out_of_range_descriptions_always_mention_description() {
    let (service, _) = setup();
    for description in [String::new(), "d".repeat(256), "d".repeat(1_000)] {
        let err = service
            .create_transaction(&json!({ "amount": 1, "currency": "USD", "description": description }))
            .unwrap_err();
        assert_eq!(validation_fields(err), vec!["description"]);
    }
}

#[test]
fn ten_thousand_creates_never_collide() {
    let (service, store) = setup();
    let mut ids = HashSet::with_capacity(10_000);

    for i in 0..10_000 {
        let tx = service
            .create_transaction(&json!({
                "amount": i + 1,
                "currency": "USD",
                "description": format!("tx-{:05}", i)
            }))
            .unwrap();
        assert!(ids.insert(tx.id), "duplicate id {}", tx.id);
    }

    assert_eq!(store.len(), 10_000);
}

#[test]
fn roundtrip_preserves_candidate_fields() {
    let (service, _) = setup();
    let candidates = [
        (0.01, "EUR", "Chewing gum"),
        (1234.5, "GBP", "Rent share"),
        (9_999_999.99, "JPY", "Something expensive"),
    ];

    for (amount, currency, description) in candidates {
        let tx = service
            .create_transaction(&json!({
                "amount": amount,
                "currency": currency,
                "description": description
            }))
            .unwrap();
        let fetched = service.get_transaction_details(&tx.id.to_string()).unwrap();
        assert_eq!(fetched.amount, amount);
        assert_eq!(fetched.currency, currency);
        assert_eq!(fetched.description, description);
    }
}

#[test]
fn repeated_reads_are_identical() {
    let (service, _) = setup();
    let tx = service
        .create_transaction(&json!({ "amount": 5, "currency": "CHF", "description": "Chocolate" }))
        .unwrap();
    let id = tx.id.to_string();

    let a = service.get_transaction_details(&id).unwrap();
    let b = service.get_transaction_details(&id).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.timestamp, b.timestamp);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_creates_produce_distinct_readable_transactions() {
    let (service, store) = setup();
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    let ids: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let service = service.clone();
                scope.spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| {
                            service
                                .create_transaction(&json!({
                                    "amount": 1,
                                    "currency": "USD",
                                    "description": format!("thread {} item {}", t, i)
                                }))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().expect("worker panicked"))
            .collect()
    });

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);
    assert_eq!(store.len(), THREADS * PER_THREAD);

    for id in &ids {
        assert!(store.find_by_id(id).is_some());
    }
}

#[test]
fn concurrent_creates_respect_capacity_limit() {
    let store = Arc::new(InMemoryTransactionStore::with_capacity_limit(100));
    let service = TransactionService::new(store.clone());

    let outcomes: Vec<Result<(), ServiceError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                scope.spawn(move || {
                    (0..50)
                        .map(|_| {
                            service
                                .create_transaction(&json!({
                                    "amount": 2,
                                    "currency": "USD",
                                    "description": "race"
                                }))
                                .map(|_| ())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().expect("worker panicked"))
            .collect()
    });

    let accepted = outcomes.iter().filter(|o| o.is_ok()).count();
    let refused = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                Err(ServiceError::Store(StoreError::CapacityExhausted { capacity: 100 }))
            )
        })
        .count();

    assert_eq!(accepted, 100);
    assert_eq!(refused, 100);
    assert_eq!(store.len(), 100);
}

#[test]
fn multiple_violations_arrive_together() {
    let (service, _) = setup();
    let err = service
        .create_transaction(&json!({
            "amount": "lots",
            "currency": "US",
            "description": "",
            "memo": "nope"
        }))
        .unwrap_err();

    match err {
        ServiceError::Validation(v) => {
            let rules: Vec<&Rule> = v.violations().iter().map(|v| &v.rule).collect();
            assert_eq!(rules.len(), 4);
            assert_eq!(rules[0], &Rule::InvalidType { expected: "number" });
            assert_eq!(rules[3], &Rule::UnknownField);
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}
