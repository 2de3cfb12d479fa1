use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Data submitted through a rendered form.
///
/// Shape checks against the data schema belong to the renderer; this type
/// only guarantees a string-keyed map at the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(pub Map<String, Value>);

impl FormData {
    pub fn new() -> Self {
        FormData::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(map: Map<String, Value>) -> Self {
        FormData(map)
    }
}
