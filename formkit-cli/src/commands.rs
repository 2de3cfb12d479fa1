use std::path::Path;

use anyhow::{Result, bail};
use clap::ValueEnum;
use colored::Colorize;
use formkit::{
    DataSchema, Designer, Document, EditSchema, EditorOptions, FormSchema, UiSchema,
    build_scopes, config::read_value, convert::import_schema, meta, scope_options, to_canonical,
    to_editable,
};

use crate::io::{emit, load};

/// Which structured editor `meta` describes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaTarget {
    /// The data-schema record editor
    Schema,
    /// The layout element editor
    Uischema,
}

pub fn editable(schema: &Path, output: Option<&Path>) -> Result<()> {
    let schema: DataSchema = load(schema)?;
    let edit = to_editable(&schema)?;
    emit(&edit.to_value()?, output)
}

pub fn canonical(edit_schema: &Path, output: Option<&Path>) -> Result<()> {
    let edit: EditSchema = load(edit_schema)?;
    let schema = to_canonical(&edit)?;
    emit(&schema.to_value()?, output)
}

pub fn scopes(schema: &Path, root: bool, output: Option<&Path>) -> Result<()> {
    let schema: DataSchema = load(schema)?;
    let scopes = if root {
        scope_options(&schema)
    } else {
        build_scopes(&schema)
    };
    match output {
        Some(_) => emit(&serde_json::to_value(&scopes)?, output),
        None => {
            for scope in scopes {
                println!("{scope}");
            }
            Ok(())
        }
    }
}

pub fn check(bundle: &Path) -> Result<()> {
    let form: FormSchema = load(bundle)?;
    let unresolved = form.unresolved_scopes();
    if unresolved.is_empty() {
        println!("{} {}", "ok".green().bold(), bundle.display());
        return Ok(());
    }
    for scope in &unresolved {
        eprintln!("  {} {scope}", "unresolved".red());
    }
    bail!(
        "{} layout scope(s) in {} do not resolve",
        unresolved.len(),
        bundle.display()
    )
}

pub fn meta(
    target: MetaTarget,
    scopes_from: Option<&Path>,
    ui: bool,
    output: Option<&Path>,
) -> Result<()> {
    if scopes_from.is_some() && (target == MetaTarget::Schema || ui) {
        log::warn!("--scopes-from only applies to the layout editor schema");
    }
    let value = match target {
        MetaTarget::Schema if ui => meta::editing_uischema().to_value()?,
        MetaTarget::Schema => meta::editing_schema().to_value()?,
        MetaTarget::Uischema if ui => meta::ui_editing_uischema().to_value()?,
        MetaTarget::Uischema => {
            let scopes = match scopes_from {
                Some(path) => scope_options(&load::<DataSchema>(path)?),
                None => Vec::new(),
            };
            meta::ui_editing_schema(&scopes)?.to_value()?
        }
    };
    emit(&value, output)
}

pub fn import(json_schema: &Path, output: Option<&Path>) -> Result<()> {
    let value = read_value(json_schema)?;
    let schema = import_schema(&value)?;
    emit(&schema.to_value()?, output)
}

/// Run the given documents through the designer's structured editors and
/// emit the resulting bundle.
pub fn apply(
    bundle: &Path,
    schema: Option<&Path>,
    uischema: Option<&Path>,
    options: EditorOptions,
    output: Option<&Path>,
) -> Result<()> {
    let form: FormSchema = load(bundle)?;
    let mut designer = Designer::new(form).with_options(options);

    if let Some(path) = schema {
        let edit: EditSchema = load(path)?;
        let mut editor = designer.schema_gui();
        editor.set_value(edit);
        editor.save();
        if let Some(err) = editor.source().error() {
            bail!("schema from {} rejected: {err}", path.display());
        }
    }

    if let Some(path) = uischema {
        let layout: UiSchema = load(path)?;
        let mut editor = designer.uischema_gui();
        editor.set_value(layout);
        editor.save();
        if let Some(err) = editor.source().error() {
            bail!("layout from {} rejected: {err}", path.display());
        }
    }

    for scope in designer.unresolved_scopes() {
        log::warn!("layout scope {scope} no longer resolves");
    }
    emit(&designer.bundle().to_value()?, output)
}
