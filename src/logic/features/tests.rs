//! Integration Tests for the Feature Modules
//!
//! Validator output checked against the layout contract.

use std::collections::HashMap;

use super::{parse, FEATURE_LAYOUT};

fn form(values: [&str; 11]) -> HashMap<String, String> {
    FEATURE_LAYOUT
        .iter()
        .zip(values)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_parsed_values_follow_layout_order() {
    let vector = parse(&form(["female", "52", "6.1", "88", "8.4", "5.9", "2.4", "0.9", "3.6", "1.1", "33.7"])).unwrap();
    let values = vector.as_array();

    for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
        assert_eq!(vector.get_by_name(name), Some(values[i]), "feature {}", name);
    }
    assert_eq!(vector.get_by_name("hba1c"), Some(8.4));
    assert_eq!(vector.get_by_name("unknown"), None);
}

#[test]
fn test_log_entry_names_every_feature() {
    let vector = parse(&form(["male", "35", "4.5", "60", "5.5", "4.8", "1.2", "1.3", "2.8", "0.6", "25"])).unwrap();
    let entry = vector.to_log_entry();

    for name in FEATURE_LAYOUT {
        assert!(entry.get(*name).is_some(), "missing {}", name);
    }
    assert_eq!(entry["cr"], serde_json::json!(60.0));
}

#[test]
fn test_zero_measurement_is_accepted() {
    let vector = parse(&form(["male", "35", "0", "60", "5.5", "4.8", "1.2", "1.3", "2.8", "0", "25"])).unwrap();
    assert_eq!(vector.urea, 0.0);
    assert_eq!(vector.vldl, 0.0);
}
