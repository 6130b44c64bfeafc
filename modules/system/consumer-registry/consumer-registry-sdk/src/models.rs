//! Control-plane snapshot model.
//!
//! Wire shape:
//!
//! ```text
//! {
//!   "<namespace>": {
//!     "<consumer name>": { "v": "<version token>", "d": "<serialized consumer>" }
//!   }
//! }
//! ```
//!
//! Namespaces and entries are kept as raw JSON until the registry decodes
//! them one by one, so a single malformed part cannot reject the whole
//! snapshot. A namespace value that is not an object reads as an empty
//! namespace.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Consumers of one namespace, keyed by consumer name, in document order.
pub type NamespaceEntries = Map<String, Value>;

/// A full consumer snapshot pushed by the control plane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    namespaces: IndexMap<String, Value>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not an object.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Convert an already decoded JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Add (or replace) a consumer entry.
    #[must_use]
    pub fn with_consumer(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let entry = SnapshotEntry {
            version: version.into(),
            body: body.into(),
        };
        let slot = self
            .namespaces
            .entry(namespace.into())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(entries) = slot {
            entries.insert(name.into(), entry.to_value());
        }
        self
    }

    /// Add a namespace with no consumers, which clears it on update.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces
            .entry(namespace.into())
            .or_insert_with(|| Value::Object(Map::new()));
        self
    }

    /// Iterate namespaces in document order.
    ///
    /// `None` marks a namespace whose value is not an object.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, Option<&NamespaceEntries>)> {
        self.namespaces
            .iter()
            .map(|(ns, raw)| (ns.as_str(), raw.as_object()))
    }

    /// Entries of `namespace`; `None` if it is absent or not an object.
    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Option<&NamespaceEntries> {
        self.namespaces.get(namespace).and_then(Value::as_object)
    }

    #[must_use]
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }
}

/// One consumer entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Opaque version token, only compared for equality.
    #[serde(rename = "v", default)]
    pub version: String,
    /// Serialized consumer body.
    #[serde(rename = "d")]
    pub body: String,
}

impl SnapshotEntry {
    /// Decode a raw snapshot entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `d` is missing or either field is not a string.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "v": self.version, "d": self.body })
    }
}
