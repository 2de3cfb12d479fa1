//! Editor options and file loading.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tunables for the editors a [`Designer`](crate::editor::Designer) hands out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Save dirty drafts when an editor is dropped.
    pub autosave_on_drop: bool,
    /// Debounce for the raw-JSON editors, in milliseconds.
    pub json_debounce_ms: Option<u64>,
    /// Debounce for the structured editors, in milliseconds.
    pub gui_debounce_ms: Option<u64>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        EditorOptions {
            autosave_on_drop: true,
            json_debounce_ms: Some(1500),
            gui_debounce_ms: None,
        }
    }
}

impl EditorOptions {
    /// Read options from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let value = read_value(path.as_ref())?;
        let options = serde_json::from_value(value)
            .with_context(|| format!("invalid editor options in {}", path.as_ref().display()))?;
        Ok(options)
    }

    pub fn json_debounce(&self) -> Option<Duration> {
        self.json_debounce_ms.map(Duration::from_millis)
    }

    pub fn gui_debounce(&self) -> Option<Duration> {
        self.gui_debounce_ms.map(Duration::from_millis)
    }
}

/// Read a JSON or TOML file into a JSON value, by extension.
///
/// An empty file reads as an empty object.
pub fn read_value(path: &Path) -> anyhow::Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let value = match ext {
        "json" => serde_json::from_str(&content)?,
        "toml" | "tml" => {
            let v: toml::Value = toml::from_str(&content)?;
            serde_json::to_value(v)?
        }
        _ => {
            bail!("Unsupported file extension: {ext:?}");
        }
    };
    Ok(value)
}

/// Write a JSON value as pretty JSON or TOML, by extension.
pub fn write_value(path: &Path, value: &Value) -> anyhow::Result<()> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let s = match ext {
        "toml" | "tml" => toml::to_string_pretty(value)?,
        "json" => serde_json::to_string_pretty(value)?,
        _ => {
            bail!("Unsupported file extension: {ext:?}");
        }
    };
    fs::write(path, s).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
