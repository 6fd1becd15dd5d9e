//! Change detection between desired and existing state
//!
//! Only fields the caller set to a concrete value are compared. Nested
//! objects are compared key by key, so keys the remote store adds on its own
//! never count as a change.

use crate::types::{DesiredState, Object};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// How a desired field differs from the existing object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DifferenceKind {
    /// There is no existing object at all
    NoExisting,
    /// The existing object lacks the field
    Missing,
    /// Values differ
    Mismatch { existing: Value, desired: Value },
    /// Desired is an object, existing is not
    TypeMismatch,
}

/// First field found to differ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    /// Dotted path of the field (`tags.env`, `servers[1].address`)
    pub path: String,
    pub kind: DifferenceKind,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DifferenceKind::NoExisting => write!(f, "object does not exist"),
            DifferenceKind::Missing => write!(f, "{}: missing", self.path),
            DifferenceKind::Mismatch { existing, desired } => {
                write!(f, "{}: {} -> {}", self.path, existing, desired)
            }
            DifferenceKind::TypeMismatch => write!(f, "{}: not an object", self.path),
        }
    }
}

/// Find the first difference between desired and existing state.
///
/// No existing object is always a difference.
pub fn first_difference(desired: &DesiredState, existing: Option<&Object>) -> Option<Difference> {
    let Some(existing) = existing else {
        return Some(Difference {
            path: String::new(),
            kind: DifferenceKind::NoExisting,
        });
    };
    desired
        .values()
        .find_map(|(name, value)| compare_field(name.to_string(), value, existing.get(name)))
}

/// Check if reconciling would change anything
pub fn is_changed(desired: &DesiredState, existing: Option<&Object>) -> bool {
    first_difference(desired, existing).is_some()
}

fn compare_field(path: String, desired: &Value, existing: Option<&Value>) -> Option<Difference> {
    match existing {
        None => Some(Difference {
            path,
            kind: DifferenceKind::Missing,
        }),
        Some(existing) => compare_value(path, desired, existing),
    }
}

fn compare_object(path: &str, desired: &Object, existing: &Object) -> Option<Difference> {
    desired
        .iter()
        .filter(|(_, value)| !value.is_null())
        .find_map(|(name, value)| compare_field(format!("{path}.{name}"), value, existing.get(name)))
}

fn compare_value(path: String, desired: &Value, existing: &Value) -> Option<Difference> {
    match (desired, existing) {
        (Value::Object(desired), Value::Object(existing)) => {
            compare_object(&path, desired, existing)
        }
        (Value::Object(_), _) => Some(Difference {
            path,
            kind: DifferenceKind::TypeMismatch,
        }),
        (Value::Array(desired_items), Value::Array(existing_items))
            if desired_items.len() == existing_items.len() =>
        {
            desired_items
                .iter()
                .zip(existing_items)
                .enumerate()
                .find_map(|(index, (desired_item, existing_item))| {
                    let item_path = format!("{path}[{index}]");
                    if desired_item.is_object() && existing_item.is_object() {
                        compare_value(item_path, desired_item, existing_item)
                    } else {
                        mismatch(item_path, desired_item, existing_item)
                    }
                })
        }
        _ => mismatch(path, desired, existing),
    }
}

fn mismatch(path: String, desired: &Value, existing: &Value) -> Option<Difference> {
    (desired != existing).then(|| Difference {
        path,
        kind: DifferenceKind::Mismatch {
            existing: existing.clone(),
            desired: desired.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    fn desired(value: Value) -> DesiredState {
        DesiredState::from_object(object(value))
    }

    #[test]
    fn test_no_existing_is_changed() {
        assert!(is_changed(&desired(json!({"name": "x"})), None));
        assert!(is_changed(&DesiredState::new(), None));
    }

    #[test]
    fn test_equal_is_unchanged() {
        let existing = object(json!({"id": "1", "name": "zone1", "comment": "old"}));
        assert!(!is_changed(
            &desired(json!({"name": "zone1", "comment": "old"})),
            Some(&existing)
        ));
    }

    #[test]
    fn test_extra_existing_keys_ignored() {
        let existing = object(json!({"name": "v", "created_at": "2024-01-01", "tags": {"a": "1", "b": "2"}}));
        assert!(!is_changed(
            &desired(json!({"name": "v", "tags": {"a": "1"}})),
            Some(&existing)
        ));
    }

    #[test]
    fn test_null_desired_ignored() {
        let existing = object(json!({"name": "v", "comment": "kept"}));
        assert!(!is_changed(
            &desired(json!({"name": "v", "comment": null})),
            Some(&existing)
        ));
    }

    #[test]
    fn test_missing_key() {
        let existing = object(json!({"name": "v"}));
        let difference = first_difference(&desired(json!({"comment": "c"})), Some(&existing));
        assert_eq!(
            difference,
            Some(Difference {
                path: "comment".to_string(),
                kind: DifferenceKind::Missing
            })
        );
    }

    #[test]
    fn test_nested_mismatch_path() {
        let existing = object(json!({"tags": {"env": "dev"}}));
        let difference =
            first_difference(&desired(json!({"tags": {"env": "prod"}})), Some(&existing)).unwrap();
        assert_eq!(difference.path, "tags.env");
        assert_eq!(difference.to_string(), r#"tags.env: "dev" -> "prod""#);
    }

    #[test]
    fn test_nested_against_scalar() {
        let existing = object(json!({"tags": null}));
        let difference =
            first_difference(&desired(json!({"tags": {"env": "prod"}})), Some(&existing)).unwrap();
        assert_eq!(difference.kind, DifferenceKind::TypeMismatch);
    }

    #[test]
    fn test_array_length_change() {
        let existing = object(json!({"servers": ["a"]}));
        assert!(is_changed(
            &desired(json!({"servers": ["a", "b"]})),
            Some(&existing)
        ));
    }

    #[test]
    fn test_array_of_objects_ignores_server_keys() {
        let existing = object(json!({
            "nameservers": [{"address": "10.0.0.1", "protocol_fqdn": "ns1."}]
        }));
        assert!(!is_changed(
            &desired(json!({"nameservers": [{"address": "10.0.0.1"}]})),
            Some(&existing)
        ));
        let difference = first_difference(
            &desired(json!({"nameservers": [{"address": "10.0.0.2"}]})),
            Some(&existing),
        )
        .unwrap();
        assert_eq!(difference.path, "nameservers[0].address");
    }

    #[test]
    fn test_array_order_matters() {
        let existing = object(json!({"servers": ["a", "b"]}));
        assert!(is_changed(
            &desired(json!({"servers": ["b", "a"]})),
            Some(&existing)
        ));
    }

    #[test]
    fn test_number_exact_equality() {
        let existing = object(json!({"ttl": 3600}));
        assert!(!is_changed(&desired(json!({"ttl": 3600})), Some(&existing)));
        assert!(is_changed(&desired(json!({"ttl": "3600"})), Some(&existing)));
    }
}
