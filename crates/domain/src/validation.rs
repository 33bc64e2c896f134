//! Field validation errors returned by the API.
//!
//! The API reports rejected input as a JSON object mapping each field to
//! a list of messages, e.g. `{"username": ["already taken"]}`. Errors not
//! tied to a field arrive under `non_field_errors`.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Per-field validation messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Messages {
    Many(Vec<String>),
    One(String),
}

impl ValidationErrors {
    /// Parses an error body. Returns `None` unless it is a JSON object of messages.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let raw: BTreeMap<String, Messages> = serde_json::from_slice(body).ok()?;
        let fields = raw
            .into_iter()
            .map(|(field, messages)| match messages {
                Messages::Many(list) => (field, list),
                Messages::One(message) => (field, vec![message]),
            })
            .collect::<BTreeMap<_, _>>();
        (!fields.is_empty()).then_some(Self { fields })
    }

    /// One `field: message message` line per field.
    #[must_use]
    pub fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
