use std::path::Path;

use anyhow::{Context, Result};
use formkit::{
    Document,
    config::{read_value, write_value},
};
use serde_json::Value;

/// Read a JSON or TOML file as a formkit document.
pub fn load<D: Document>(path: &Path) -> Result<D> {
    let value = read_value(path)?;
    D::from_value(value).with_context(|| format!("invalid {} in {}", D::KIND, path.display()))
}

/// Write `value` to `output`, or pretty-print it to stdout.
pub fn emit(value: &Value, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_value(path, value)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit::{DataSchema, SchemaType};
    use std::fs;

    #[test]
    fn test_load_toml_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.toml");
        fs::write(
            &path,
            "type = \"object\"\nrequired = [\"name\"]\n\n[properties.name]\ntype = \"string\"\n",
        )
        .unwrap();

        let schema: DataSchema = load(&path).unwrap();
        assert_eq!(
            schema.property("name").map(|p| p.schema_type),
            Some(SchemaType::String)
        );
        assert!(schema.required.contains("name"));
    }

    #[test]
    fn test_load_reports_kind_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, r#"{"type": "string", "properties": {}}"#).unwrap();

        let err = load::<DataSchema>(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("data schema"));
        assert!(message.contains("schema.json"));
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let value = serde_json::json!({"type": "boolean"});
        emit(&value, Some(&path)).unwrap();
        assert_eq!(read_value(&path).unwrap(), value);
    }
}
