//! Serde serialization/deserialization tests for core types.

use serde_json::json;

use crate::{Engine, ErrorDetail, FieldValue, Platform, Record};

// ============================================================================
// Platform Serde Tests
// ============================================================================

#[test]
fn test_platform_serde_roundtrip_all_variants() {
    for platform in Platform::all() {
        let json = serde_json::to_string(platform).unwrap();
        let deserialized: Platform = serde_json::from_str(&json).unwrap();
        assert_eq!(*platform, deserialized, "Round-trip failed for {:?}", platform);
    }
}

#[test]
fn test_platform_wire_names() {
    let test_cases = vec![
        (r#""windows""#, Platform::Windows),
        (r#""mac_os""#, Platform::MacOs),
        (r#""mobile""#, Platform::Mobile),
    ];

    for (json, expected) in test_cases {
        let result: Platform = serde_json::from_str(json).unwrap();
        assert_eq!(result, expected, "Failed for {}", json);
    }
}

// ============================================================================
// Engine Serde Tests
// ============================================================================

#[test]
fn test_engine_directory_entry_ignores_extra_fields() {
    let json = r#"[
        {"address": "engine-1.example.com", "name": "EMEA", "uid": "42"},
        {"address": "engine-2.example.com:1671"}
    ]"#;
    let engines: Vec<Engine> = serde_json::from_str(json).unwrap();
    assert_eq!(engines.len(), 2);
    assert_eq!(engines[0].name.as_deref(), Some("EMEA"));
    assert_eq!(engines[1].address, "engine-2.example.com:1671");
    assert!(engines[1].name.is_none());
}

#[test]
fn test_engine_missing_address_is_error() {
    let result: Result<Engine, _> = serde_json::from_str(r#"{"name": "x"}"#);
    assert!(result.is_err());
}

// ============================================================================
// ErrorDetail Serde Tests
// ============================================================================

#[test]
fn test_error_detail_uses_error_and_options_keys() {
    let detail = ErrorDetail {
        message: "Unknown field".to_string(),
        options: vec!["name".to_string(), "platform".to_string()],
    };
    let value = serde_json::to_value(&detail).unwrap();
    assert_eq!(
        value,
        json!({"Error": "Unknown field", "Options": ["name", "platform"]})
    );

    let parsed: ErrorDetail = serde_json::from_value(json!({"Error": "x"})).unwrap();
    assert!(!parsed.has_options());
}

// ============================================================================
// Record Serde Tests
// ============================================================================

#[test]
fn test_record_serializes_in_field_order() {
    let json = r#"{"name":"a","last_seen":"2024-01-02T03:04:05Z","tags":["x","y"],"count":3}"#;
    let record: Record = serde_json::from_str(json).unwrap();
    assert_eq!(serde_json::to_string(&record).unwrap(), json);
    assert!(matches!(record.get("last_seen"), Some(FieldValue::Timestamp(_))));
}

#[test]
fn test_nested_object_roundtrip() {
    let value = json!({"device": {"name": "pc-1", "ok": true}, "n": null});
    let record: Record = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(serde_json::to_value(&record).unwrap(), value);
}
