use anyhow::{Context, Result, bail};
use argot_metadata::{CommandSpec, DefinitionsFileV1, FORMAT_VERSION, OptionSpec, ValueType};
use argot_parse::RawOptionDefinition;
use std::fs;
use std::path::Path;

pub fn load(path: &Path) -> Result<DefinitionsFileV1> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read definitions: {}", path.display()))?;
    let file: DefinitionsFileV1 = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse definitions JSON: {}", path.display()))?;
    if file.format_version != FORMAT_VERSION {
        bail!(
            "unsupported format-version {} (expected {})",
            file.format_version,
            FORMAT_VERSION
        );
    }
    Ok(file)
}

pub fn to_raw(spec: &OptionSpec) -> RawOptionDefinition {
    let mut def = RawOptionDefinition::new(&spec.name);
    def.alias = spec.alias.clone();
    def = match spec.value_type {
        ValueType::String => def,
        ValueType::Number => def.number(),
        ValueType::Boolean => def.flag(),
    };
    def.multiple = spec.multiple;
    def.lazy_multiple = spec.lazy_multiple;
    def.default_option = spec.default_option;
    def.default_value = spec.default_value.clone();
    def.group = spec.group.names();
    def.description = spec.description.clone();
    def.type_label = spec.type_label.clone();
    def.required = spec.required;
    def.conflicts = spec.conflicts.clone();
    def.hidden = spec.hidden;
    def
}

/// Top-level options followed by the command's own options.
pub fn option_set(file: &DefinitionsFileV1, command: Option<&CommandSpec>) -> Vec<RawOptionDefinition> {
    let mut defs: Vec<RawOptionDefinition> = file.options.iter().map(to_raw).collect();
    if let Some(cmd) = command {
        defs.extend(cmd.options.iter().map(to_raw));
    }
    defs
}
