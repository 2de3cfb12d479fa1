use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{DataSchema, EditSchema, FormData, UiSchema};
use crate::error::{FormError, Result};

/// A value that crosses the raw-JSON text boundary.
///
/// `parse` separates text that is not JSON ([`FormError::Syntax`]) from JSON
/// of the wrong shape ([`FormError::Validation`]).
pub trait Document: Serialize + DeserializeOwned + Clone + PartialEq + Default {
    /// Human-readable name used in log messages.
    const KIND: &'static str;

    /// Shape rules beyond what deserialization enforces.
    fn check(&self) -> Result<()> {
        Ok(())
    }

    /// Build the value from already-parsed JSON.
    fn from_value(value: Value) -> Result<Self> {
        let doc: Self =
            serde_json::from_value(value).map_err(|e| FormError::validation("#", e.to_string()))?;
        doc.check()?;
        Ok(doc)
    }

    /// Parse and validate text.
    fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| FormError::from_json(&e))?;
        Self::from_value(value)
    }

    /// Pretty-printed JSON text.
    fn stringify(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FormError::validation("#", e.to_string()))
    }

    /// Convert to a JSON value.
    fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| FormError::validation("#", e.to_string()))
    }
}

impl Document for DataSchema {
    const KIND: &'static str = "data schema";

    fn check(&self) -> Result<()> {
        self.validate()
    }
}

impl Document for EditSchema {
    const KIND: &'static str = "edit schema";
}

impl Document for UiSchema {
    const KIND: &'static str = "ui schema";

    fn check(&self) -> Result<()> {
        self.validate()
    }
}

impl Document for FormData {
    const KIND: &'static str = "form data";
}
