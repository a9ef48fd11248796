//! Response envelope normalization.
//!
//! The Simulation API grew organically and its list endpoints disagree on
//! shape: `/api/citizens` may answer `[{...}, ...]` while
//! `/api/resources` answers `{"resources": [{...}, ...], "count": 2}`.
//! [`Envelope::from_value`] accepts both, so every caller sees one type.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// A normalized list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    /// The items, regardless of which shape carried them.
    pub items: Vec<T>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Normalize a JSON response body into a typed list.
    ///
    /// Accepts a bare array, or an object containing exactly one array
    /// value (any other object keys are ignored as metadata).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedEnvelope`] if no list can be located,
    /// or [`ApiError::Serialization`] if the items do not match `T`.
    pub fn from_value(path: &str, value: Value) -> Result<Self, ApiError> {
        let list = match value {
            Value::Array(items) => items,
            Value::Object(map) => {
                let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                });
                let first = arrays.next();
                if arrays.next().is_some() {
                    return Err(ApiError::MalformedEnvelope {
                        path: path.to_owned(),
                        detail: "object contains more than one list".to_owned(),
                    });
                }
                first.ok_or_else(|| ApiError::MalformedEnvelope {
                    path: path.to_owned(),
                    detail: "object contains no list".to_owned(),
                })?
            }
            other => {
                return Err(ApiError::MalformedEnvelope {
                    path: path.to_owned(),
                    detail: format!("expected list or object, got {other}"),
                });
            }
        };

        let items = list
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Self { items })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        name: String,
    }

    #[test]
    fn accepts_bare_lists() {
        let envelope: Envelope<Item> =
            Envelope::from_value("/api/citizens", json!([{"name": "a"}, {"name": "b"}])).unwrap();
        assert_eq!(envelope.items.len(), 2);
    }

    #[test]
    fn accepts_keyed_objects_with_metadata() {
        let envelope: Envelope<Item> = Envelope::from_value(
            "/api/resources",
            json!({"resources": [{"name": "paper"}], "count": 1}),
        )
        .unwrap();
        assert_eq!(
            envelope.items,
            vec![Item {
                name: "paper".to_owned()
            }]
        );
    }

    #[test]
    fn rejects_objects_with_no_list() {
        let err = Envelope::<Item>::from_value("/api/problems", json!({"count": 0})).unwrap_err();
        assert!(matches!(err, ApiError::MalformedEnvelope { .. }));
    }

    #[test]
    fn rejects_ambiguous_objects() {
        let err = Envelope::<Item>::from_value(
            "/api/problems",
            json!({"a": [], "b": []}),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::MalformedEnvelope { .. }));
    }

    #[test]
    fn rejects_scalars() {
        let err = Envelope::<Item>::from_value("/api/citizens", json!(42)).unwrap_err();
        assert!(matches!(err, ApiError::MalformedEnvelope { .. }));
    }
}
