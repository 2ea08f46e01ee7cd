//! Turns resolved cells into the caller-facing result.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::definition::{Definitions, UNKNOWN_NAME};
use crate::error::{ParseError, Result};
use crate::resolver::ResolvedCells;

const ALL_KEY: &str = "_all";
const NONE_KEY: &str = "_none";

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectOptions {
    /// Rename `output-dir` to `outputDir` in the result.
    pub camel_case: bool,
    /// Partition by definition `group` under `_all`, `<group>` and `_none`.
    pub grouped: bool,
    /// Drop the unknown bucket entirely.
    pub skip_unknown: bool,
}

/// The outcome of one `parse` call.
///
/// Flat results map option name to value. Grouped results map `_all`, each
/// group name and `_none` to JSON objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseResult {
    values: IndexMap<String, Value>,
    unknown: Vec<String>,
    grouped: bool,
}

impl ParseResult {
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a value in the `_all` bucket when grouped, or directly when flat.
    pub fn option(&self, name: &str) -> Option<&Value> {
        if self.grouped {
            self.values.get(ALL_KEY)?.get(name)
        } else {
            self.values.get(name)
        }
    }

    /// A group bucket (`_all`, `_none` or a group name). `None` when flat.
    pub fn group(&self, name: &str) -> Option<&Map<String, Value>> {
        if !self.grouped {
            return None;
        }
        self.values.get(name).and_then(Value::as_object)
    }

    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Render as a single JSON object; `_unknown` appears only when non-empty.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        let unknown = (!self.unknown.is_empty()).then(|| {
            Value::Array(self.unknown.iter().cloned().map(Value::String).collect())
        });

        for (key, value) in &self.values {
            out.insert(key.clone(), value.clone());
            if self.grouped && key == ALL_KEY {
                if let Some(unknown) = &unknown {
                    out.insert(UNKNOWN_NAME.to_string(), unknown.clone());
                }
            }
        }
        if !self.grouped {
            if let Some(unknown) = unknown {
                out.insert(UNKNOWN_NAME.to_string(), unknown);
            }
        }
        Value::Object(out)
    }
}

/// Project resolved cells into a [`ParseResult`].
pub fn project(cells: &ResolvedCells<'_>, options: ProjectOptions) -> ParseResult {
    let key = |name: &str| {
        if options.camel_case {
            camel_case(name)
        } else {
            name.to_string()
        }
    };

    let mut flat: IndexMap<String, Value> = IndexMap::new();
    for cell in cells.cells().iter().filter(|c| c.is_present()) {
        flat.insert(key(cell.definition().name()), cell.get());
    }

    let unknown = if options.skip_unknown {
        Vec::new()
    } else {
        cells.unknown()
    };

    if !options.grouped {
        return ParseResult {
            values: flat,
            unknown,
            grouped: false,
        };
    }

    let mut values: IndexMap<String, Value> = IndexMap::new();
    values.insert(ALL_KEY.to_string(), Value::Object(to_map(&flat)));

    let mut groups: IndexMap<String, Map<String, Value>> = IndexMap::new();
    let mut none: Option<Map<String, Value>> = None;
    for cell in cells.cells() {
        let def = cell.definition();
        let name = key(def.name());
        let value = cell.is_present().then(|| cell.get());

        if def.groups().is_empty() {
            if let Some(value) = value {
                none.get_or_insert_with(Map::new).insert(name, value);
            }
            continue;
        }
        for group in def.groups() {
            let bucket = groups.entry(group.clone()).or_default();
            if let Some(value) = &value {
                bucket.insert(name.clone(), value.clone());
            }
        }
    }

    for (group, bucket) in groups {
        values.insert(group, Value::Object(bucket));
    }
    if let Some(none) = none {
        values.insert(NONE_KEY.to_string(), Value::Object(none));
    }

    ParseResult {
        values,
        unknown,
        grouped: true,
    }
}

/// Fail when two definitions share a camelCase output key.
pub fn check_camel_case_keys(defs: &Definitions) -> Result<()> {
    let mut seen: IndexMap<String, &str> = IndexMap::new();
    for def in defs {
        let key = camel_case(def.name());
        if let Some(prev) = seen.insert(key.clone(), def.name()) {
            return Err(ParseError::invalid_definition(format!(
                "option names [--{prev}, --{}] both become `{key}` in camelCase output",
                def.name()
            )));
        }
    }
    Ok(())
}

fn to_map(values: &IndexMap<String, Value>) -> Map<String, Value> {
    values
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// `output-dir` → `outputDir`, `dry_run` → `dryRun`, `FOO-BAR` → `fooBar`.
pub fn camel_case(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for chunk in name.split(|c: char| !c.is_alphanumeric()) {
        let mut word = String::new();
        let mut prev_lower = false;
        for c in chunk.chars() {
            if c.is_uppercase() && prev_lower && !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            word.push(c);
        }
        if !word.is_empty() {
            words.push(word);
        }
    }

    let mut out = String::with_capacity(name.len());
    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
