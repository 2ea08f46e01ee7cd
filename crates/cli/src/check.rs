use argot_metadata::DefinitionsFileV1;
use argot_parse::normalize;
use serde::Serialize;
use std::collections::HashMap;

use crate::definitions::option_set;

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckReport {
    pub definitions: String,
    pub valid: bool,
    pub options: usize,
    pub commands: Vec<CommandReport>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandReport {
    pub name: String,
    pub options: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Normalize the top-level option set and each command's effective set.
pub fn check_definitions(file: &DefinitionsFileV1, source: &str) -> CheckReport {
    let mut errors = Vec::new();

    let globals = option_set(file, None);
    if let Err(err) = normalize(&globals, false) {
        errors.push(format!("options: {err}"));
    }

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for cmd in &file.commands {
        for name in std::iter::once(&cmd.name).chain(&cmd.aliases) {
            if let Some(prev) = seen.insert(name.as_str(), cmd.name.as_str()) {
                errors.push(format!(
                    "command name '{name}' is used by both '{prev}' and '{}'",
                    cmd.name
                ));
            }
        }
    }

    let commands = file
        .commands
        .iter()
        .map(|cmd| {
            let defs = option_set(file, Some(cmd));
            let error = normalize(&defs, false).err().map(|e| e.to_string());
            if let Some(e) = &error {
                errors.push(format!("command '{}': {e}", cmd.name));
            }
            CommandReport {
                name: cmd.name.clone(),
                options: defs.len(),
                error,
            }
        })
        .collect();

    CheckReport {
        definitions: source.to_string(),
        valid: errors.is_empty(),
        options: globals.len(),
        commands,
        errors,
    }
}
