use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

pub const MASK: &str = "*****";

const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "authorization",
    "cookie",
    "x-api-key",
    "password",
    "token",
    "api_key",
    "secret",
];

/// Masks secret-bearing header and body values before they reach any sink.
///
/// Matching is by key name, case-insensitive, at any nesting depth of a JSON
/// body. Inputs are never mutated; redaction returns deep copies.
#[derive(Debug, Clone)]
pub struct Redactor {
    keys: BTreeSet<String>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self {
            keys: DEFAULT_SENSITIVE_KEYS
                .iter()
                .map(|key| (*key).to_owned())
                .collect(),
        }
    }
}

impl Redactor {
    #[must_use]
    pub fn with_extra_keys(extra: &[String]) -> Self {
        let mut redactor = Self::default();
        for key in extra {
            redactor.keys.insert(key.to_lowercase());
        }
        redactor
    }

    #[must_use]
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    #[must_use]
    pub fn redact_headers(&self, headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        headers
            .iter()
            .map(|(key, value)| {
                if self.is_sensitive(key) {
                    (key.clone(), MASK.to_owned())
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect()
    }

    #[must_use]
    pub fn redact_json(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, nested)| {
                        if self.is_sensitive(key) {
                            (key.clone(), Value::String(MASK.to_owned()))
                        } else {
                            (key.clone(), self.redact_json(nested))
                        }
                    })
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.redact_json(item)).collect())
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
        }
    }
}
