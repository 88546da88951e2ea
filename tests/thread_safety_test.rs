//! Tests for sharing schemas and the registry across threads.

use eav_schema::{Attribute, Schema, SchemaRegistry};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use stillwater::Validation;

fn schema() -> Schema {
    Schema::builder("users.Profile")
        .attribute("name", Attribute::string().max_length(20))
        .attribute("age", Attribute::integer().min_value(0))
        .attribute("score", Attribute::decimal().optional().decimal_places(2))
        .cross_field(|data| {
            if data.get("age").and_then(|v| v.as_i64()) == Some(13) {
                Validation::Failure(
                    eav_schema::ValidationError::cross_field("age", "unlucky").into(),
                )
            } else {
                Validation::Success(())
            }
        })
        .build()
}

#[test]
fn test_concurrent_validation_of_one_schema() {
    let schema = schema();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let schema = schema.clone();
            thread::spawn(move || {
                let result = schema.validate(Some(&json!({
                    "name": format!("User{}", i),
                    "age": 20 + i,
                    "score": "9.50"
                })));
                assert!(result.is_success());

                let result = schema.validate(Some(&json!({"name": i, "age": -1})));
                assert_eq!(result.into_result().unwrap_err().len(), 2);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registry_access() {
    let registry = Arc::new(SchemaRegistry::new());
    registry.register(schema()).unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let result = registry
                    .validate("users.Profile", &json!({"name": "a", "age": i}))
                    .unwrap();
                assert_eq!(result.is_success(), i != 13);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registration() {
    let registry = SchemaRegistry::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .register(Schema::builder(format!("tenant{}.Config", i)).build())
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.len(), 8);
}

#[test]
fn test_batch_validation_matches_sequential() {
    let schema = schema();
    let inputs: Vec<_> = (0..200)
        .map(|i| json!({"name": "n", "age": i % 30}))
        .collect();

    let batch = schema.validate_batch(&inputs);
    for (input, result) in inputs.iter().zip(batch) {
        let sequential = schema.validate(Some(input));
        assert_eq!(result.is_success(), sequential.is_success());
    }
}
