//! Option definitions: the author-facing builder and the normalized form the
//! resolver works with.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ParseError, Result};

/// Name of the implicit cell collecting unmatched tokens.
pub const UNKNOWN_NAME: &str = "_unknown";

/// User-supplied coercion from a raw token to a value.
pub type CoerceFn = dyn Fn(&str) -> std::result::Result<Value, String> + Send + Sync;

/// How a raw token becomes a value for a typed option.
#[derive(Clone, Default)]
pub enum Coercion {
    /// Pass the token through unchanged.
    #[default]
    String,
    /// Parse the token as a finite number.
    Number,
    /// Caller-provided conversion. `label` is used for diagnostics and help.
    Custom { label: String, func: Arc<CoerceFn> },
}

impl Coercion {
    pub fn custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self::Custom {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Custom { label, .. } => label.as_str(),
        }
    }

    pub fn coerce(&self, raw: &str) -> std::result::Result<Value, String> {
        match self {
            Self::String => Ok(Value::String(raw.to_string())),
            Self::Number => {
                let n: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("'{raw}' is not a number"))?;
                number_value(n).ok_or_else(|| format!("'{raw}' is not a finite number"))
            }
            Self::Custom { func, .. } => func(raw),
        }
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { label, .. } => f.debug_tuple("Custom").field(label).finish(),
            other => f.write_str(other.label()),
        }
    }
}

/// Integral numbers are stored as JSON integers so `"3"` projects as `3`, not `3.0`.
fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}

/// Decided once at normalization time.
#[derive(Debug, Clone)]
pub enum OptionKind {
    /// Presence-only boolean. Every assignment stores `true`.
    Flag,
    Typed(Coercion),
}

impl Default for OptionKind {
    fn default() -> Self {
        Self::Typed(Coercion::String)
    }
}

/// Author-supplied option descriptor, validated by [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct RawOptionDefinition {
    pub name: String,
    pub alias: Option<String>,
    pub kind: OptionKind,
    pub multiple: bool,
    pub lazy_multiple: bool,
    pub default_option: bool,
    pub default_value: Option<Value>,
    pub group: Vec<String>,
    pub description: String,
    pub type_label: Option<String>,
    pub required: bool,
    pub conflicts: Vec<String>,
    pub hidden: bool,
}

impl RawOptionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Make this a presence-only boolean flag.
    pub fn flag(mut self) -> Self {
        self.kind = OptionKind::Flag;
        self
    }

    pub fn number(mut self) -> Self {
        self.kind = OptionKind::Typed(Coercion::Number);
        self
    }

    pub fn coerce(mut self, coercion: Coercion) -> Self {
        self.kind = OptionKind::Typed(coercion);
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn lazy_multiple(mut self) -> Self {
        self.lazy_multiple = true;
        self
    }

    pub fn default_option(mut self) -> Self {
        self.default_option = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Add this option to a group. May be called more than once.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group.push(group.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn type_label(mut self, label: impl Into<String>) -> Self {
        self.type_label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn conflicts_with(mut self, name: impl Into<String>) -> Self {
        self.conflicts.push(name.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A validated option definition. Immutable once built.
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    name: String,
    alias: Option<char>,
    kind: OptionKind,
    multiple: bool,
    lazy_multiple: bool,
    default_option: bool,
    default_value: Option<Value>,
    group: Vec<String>,
    description: String,
    type_label: Option<String>,
    required: bool,
    conflicts: Vec<String>,
    hidden: bool,
}

impl OptionDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<char> {
        self.alias
    }

    pub fn kind(&self) -> &OptionKind {
        &self.kind
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, OptionKind::Flag)
    }

    /// Greedy or lazy: the cell holds a list.
    pub fn is_multiple(&self) -> bool {
        self.multiple || self.lazy_multiple
    }

    /// Keeps accepting bare values until the next option token.
    pub fn is_greedy(&self) -> bool {
        self.multiple
    }

    pub fn is_lazy_multiple(&self) -> bool {
        self.lazy_multiple && !self.multiple
    }

    pub fn is_default_option(&self) -> bool {
        self.default_option
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn groups(&self) -> &[String] {
        &self.group
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Label for help output: explicit `type_label`, else the coercion name.
    pub fn type_label(&self) -> &str {
        if let Some(label) = &self.type_label {
            return label;
        }
        match &self.kind {
            OptionKind::Flag => "boolean",
            OptionKind::Typed(c) => c.label(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Apply the definition's coercion to a raw token.
    pub fn coerce(&self, raw: &str) -> std::result::Result<Value, String> {
        match &self.kind {
            OptionKind::Flag => Ok(Value::Bool(true)),
            OptionKind::Typed(c) => c.coerce(raw),
        }
    }

    pub(crate) fn unknown_bucket() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            alias: None,
            kind: OptionKind::default(),
            multiple: true,
            lazy_multiple: false,
            default_option: false,
            default_value: None,
            group: Vec::new(),
            description: String::new(),
            type_label: None,
            required: false,
            conflicts: Vec::new(),
            hidden: true,
        }
    }

    fn from_raw(raw: &RawOptionDefinition, alias: Option<char>) -> Self {
        Self {
            name: raw.name.clone(),
            alias,
            kind: raw.kind.clone(),
            multiple: raw.multiple,
            lazy_multiple: raw.lazy_multiple,
            default_option: raw.default_option,
            default_value: raw.default_value.clone(),
            group: raw.group.clone(),
            description: raw.description.clone(),
            type_label: raw.type_label.clone(),
            required: raw.required,
            conflicts: raw.conflicts.clone(),
            hidden: raw.hidden,
        }
    }
}

/// Normalized definition set with lookup helpers.
#[derive(Debug, Clone)]
pub struct Definitions {
    defs: Vec<OptionDefinition>,
    case_insensitive: bool,
}

/// Validate and normalize a raw definition set.
pub fn normalize(raw: &[RawOptionDefinition], case_insensitive: bool) -> Result<Definitions> {
    Definitions::normalize(raw, case_insensitive)
}

impl Definitions {
    pub fn normalize(raw: &[RawOptionDefinition], case_insensitive: bool) -> Result<Self> {
        if raw.iter().any(|d| d.name.trim().is_empty()) {
            return Err(ParseError::invalid_definition(
                "the `name` property is required on each definition",
            ));
        }
        if raw.iter().any(|d| d.name == UNKNOWN_NAME) {
            return Err(ParseError::invalid_definition(format!(
                "the name `{UNKNOWN_NAME}` is reserved"
            )));
        }

        let mut defs = Vec::with_capacity(raw.len());
        for def in raw {
            let alias = match def.alias.as_deref() {
                None => None,
                Some(alias) => Some(validate_alias(&def.name, alias)?),
            };
            defs.push(OptionDefinition::from_raw(def, alias));
        }

        let fold = |s: &str| {
            if case_insensitive {
                s.to_ascii_lowercase()
            } else {
                s.to_string()
            }
        };

        let mut names: HashMap<String, &str> = HashMap::new();
        for def in &defs {
            if let Some(prev) = names.insert(fold(&def.name), &def.name) {
                return Err(ParseError::invalid_definition(format!(
                    "two or more option definitions have the same name [--{prev}, --{}]",
                    def.name
                )));
            }
        }

        let mut aliases: HashMap<String, &str> = HashMap::new();
        for def in &defs {
            let Some(alias) = def.alias else {
                continue;
            };
            if let Some(prev) = aliases.insert(fold(&alias.to_string()), &def.name) {
                return Err(ParseError::invalid_definition(format!(
                    "two or more option definitions have the same alias [-{alias}: --{prev}, --{}]",
                    def.name
                )));
            }
        }

        let default_options: Vec<&str> = defs
            .iter()
            .filter(|d| d.default_option)
            .map(|d| d.name.as_str())
            .collect();
        if default_options.len() > 1 {
            return Err(ParseError::invalid_definition(format!(
                "only one option definition can be the defaultOption [{}]",
                default_options.join(", ")
            )));
        }

        if let Some(def) = defs.iter().find(|d| d.default_option && d.is_flag()) {
            return Err(ParseError::invalid_definition(format!(
                "a boolean option [\"{}\"] can not also be the defaultOption",
                def.name
            )));
        }

        Ok(Self {
            defs,
            case_insensitive,
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn get(&self, index: usize) -> Option<&OptionDefinition> {
        self.defs.get(index)
    }

    /// Position of the definition named `name` (exact match).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.defs.iter().position(|d| d.name == name)
    }

    /// Look up by long name (without the leading `--`).
    pub fn find_long(&self, name: &str) -> Option<usize> {
        self.defs.iter().position(|d| {
            if self.case_insensitive {
                d.name.eq_ignore_ascii_case(name)
            } else {
                d.name == name
            }
        })
    }

    /// Look up by single-character alias.
    pub fn find_short(&self, alias: char) -> Option<usize> {
        self.defs.iter().position(|d| {
            d.alias.is_some_and(|a| {
                if self.case_insensitive {
                    a.eq_ignore_ascii_case(&alias)
                } else {
                    a == alias
                }
            })
        })
    }

    /// Definition addressed by a `--name` or `-a` argument.
    pub fn by_arg(&self, arg: &str) -> Option<&OptionDefinition> {
        let idx = if let Some(name) = arg.strip_prefix("--") {
            self.find_long(name)
        } else {
            let mut chars = arg.strip_prefix('-')?.chars();
            match (chars.next(), chars.next()) {
                (Some(alias), None) => self.find_short(alias),
                _ => None,
            }
        };
        idx.and_then(|i| self.defs.get(i))
    }

    pub fn by_name(&self, name: &str) -> Option<&OptionDefinition> {
        self.find_long(name).and_then(|i| self.defs.get(i))
    }

    pub fn default_option(&self) -> Option<usize> {
        self.defs.iter().position(|d| d.default_option)
    }

    pub fn is_grouped(&self) -> bool {
        self.defs.iter().any(|d| !d.group.is_empty())
    }
}

impl<'a> IntoIterator for &'a Definitions {
    type Item = &'a OptionDefinition;
    type IntoIter = std::slice::Iter<'a, OptionDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate_alias(name: &str, alias: &str) -> Result<char> {
    let mut chars = alias.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(ParseError::invalid_definition(format!(
            "an alias must be a single character [--{name} alias is -{alias}]"
        )));
    };
    if c.is_ascii_digit() {
        return Err(ParseError::invalid_definition(format!(
            "to avoid ambiguity an alias cannot be numeric [--{name} alias is -{c}]"
        )));
    }
    if c == '-' {
        return Err(ParseError::invalid_definition(format!(
            "an alias cannot be \"-\" [--{name}]"
        )));
    }
    Ok(c)
}
