//! Integration tests for the schema registry and schema references.

use eav_schema::{
    Attribute, RegistryError, ResolveError, Schema, SchemaRef, SchemaRegistry, SchemaResolver,
};
use serde_json::json;
use std::collections::HashMap;

fn installment() -> Schema {
    Schema::builder("billing.InstallmentConfig")
        .attribute("supports_variable_rate", Attribute::boolean().optional().default(false))
        .attribute(
            "rate_floor",
            Attribute::decimal().optional().max_digits(7).decimal_places(5),
        )
        .build()
}

#[test]
fn test_register_and_validate() {
    let registry = SchemaRegistry::new();
    registry.register(installment()).unwrap();

    let result = registry
        .validate("billing.InstallmentConfig", &json!({"rate_floor": "0.065"}))
        .unwrap();
    let cleaned = result.into_result().unwrap();
    assert_eq!(cleaned["rate_floor"], json!("0.065"));
    assert_eq!(cleaned["supports_variable_rate"], json!(false));
}

#[test]
fn test_validation_errors_pass_through() {
    let registry = SchemaRegistry::new();
    registry.register(installment()).unwrap();

    let result = registry
        .validate("billing.InstallmentConfig", &json!({"rate_floor": "1.123456"}))
        .unwrap();
    let errors = result.into_result().unwrap_err();
    assert_eq!(
        errors.messages_for("rate_floor"),
        vec!["rate_floor must have at most 5 decimal places."]
    );
}

#[test]
fn test_duplicate_registration() {
    let registry = SchemaRegistry::new();
    registry.register(installment()).unwrap();

    let err = registry.register(installment()).unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("billing.InstallmentConfig".to_string()));
    assert_eq!(err.to_string(), "schema 'billing.InstallmentConfig' already registered");
}

#[test]
fn test_invalid_identifiers() {
    let registry = SchemaRegistry::new();

    for name in ["", "billing.", "billing-config", "1st.Config", "a b"] {
        let err = registry.register(Schema::builder(name).build()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidIdentifier(_)), "{:?}", name);
    }
    assert!(registry.is_empty());
}

#[test]
fn test_unknown_schema() {
    let registry = SchemaRegistry::new();
    let err = registry.validate("billing.Nope", &json!({})).unwrap_err();
    assert_eq!(err.to_string(), "schema 'billing.Nope' not found");
}

#[test]
fn test_ids_and_contains() {
    let registry = SchemaRegistry::new();
    registry.register(installment()).unwrap();
    registry.register(Schema::builder("billing.Account").build()).unwrap();

    assert_eq!(
        registry.ids(),
        vec!["billing.Account".to_string(), "billing.InstallmentConfig".to_string()]
    );
    assert!(registry.contains("billing.Account"));
    assert!(!registry.contains("billing"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_get_returns_shared_definition() {
    let schema = installment();
    let registry = SchemaRegistry::new();
    registry.register(schema.clone()).unwrap();

    let fetched = registry.get("billing.InstallmentConfig").unwrap();
    assert!(fetched.ptr_eq(&schema));
}

#[test]
fn test_deferred_reference_resolves_through_registry() {
    let registry = SchemaRegistry::new();
    let reference = SchemaRef::deferred("billing.InstallmentConfig");

    // Not yet registered
    assert_eq!(
        reference.resolve(&registry).unwrap_err(),
        ResolveError::Unresolved("billing.InstallmentConfig".to_string())
    );

    registry.register(installment()).unwrap();
    let schema = reference.resolve(&registry).unwrap();
    assert_eq!(schema.name(), "billing.InstallmentConfig");
}

#[test]
fn test_direct_reference_ignores_resolver() {
    let registry = SchemaRegistry::new();
    let reference = SchemaRef::from(installment());

    assert_eq!(reference.identifier(), "billing.InstallmentConfig");
    assert!(reference.resolve(&registry).is_ok());
}

struct MapResolver(HashMap<String, Schema>);

impl SchemaResolver for MapResolver {
    fn resolve_schema(&self, id: &str) -> Option<Schema> {
        self.0.get(id).cloned()
    }
}

#[test]
fn test_custom_resolver() {
    let mut schemas = HashMap::new();
    schemas.insert("local.Config".to_string(), installment());
    let resolver = MapResolver(schemas);

    let schema = SchemaRef::from("local.Config").resolve(&resolver).unwrap();
    assert_eq!(schema.name(), "billing.InstallmentConfig");
}
