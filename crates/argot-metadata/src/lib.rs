//! Shared data model for argot definition files.
//!
//! This crate intentionally does **not** depend on `argot-parse`. The types
//! here are plain serde records that mirror `RawOptionDefinition` and are used
//! for:
//! - storing option/command definitions as JSON next to a CLI
//! - feeding definitions to the `argot` binary

use serde::{Deserialize, Serialize};

/// Current `format-version` of [`DefinitionsFileV1`].
pub const FORMAT_VERSION: u32 = 1;

/// Value type of an option. `boolean` options are presence-only flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Boolean,
}

/// `"group": "db"` or `"group": ["db", "net"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupSpec {
    One(String),
    Many(Vec<String>),
}

impl Default for GroupSpec {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl GroupSpec {
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name.clone()],
            Self::Many(names) => names.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(name) => name.is_empty(),
            Self::Many(names) => names.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub lazy_multiple: bool,
    #[serde(default)]
    pub default_option: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "GroupSpec::is_empty")]
    pub group: GroupSpec,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
}

/// Top-level JSON document.
///
/// `options` apply to every command; `commands` is optional. When
/// `allow-no-command` is set, argv without a leading command is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefinitionsFileV1 {
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSpec>,
    #[serde(default)]
    pub allow_no_command: bool,
}

impl Default for DefinitionsFileV1 {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            options: Vec::new(),
            commands: Vec::new(),
            allow_no_command: false,
        }
    }
}

impl DefinitionsFileV1 {
    pub fn find_command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands
            .iter()
            .find(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }

    /// Names and aliases that `split_command` should recognise.
    pub fn command_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for cmd in &self.commands {
            out.push(cmd.name.as_str());
            out.extend(cmd.aliases.iter().map(String::as_str));
        }
        out
    }

    /// Encode as pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> String {
        let mut out = serde_json::to_string_pretty(self).unwrap_or_default();
        out.push('\n');
        out
    }
}
