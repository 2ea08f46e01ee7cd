//! Routes argv tokens to option cells.

use std::sync::LazyLock;

use serde_json::Value;

use crate::argv::{Token, tokenize};
use crate::cell::OptionValueCell;
use crate::definition::{Definitions, OptionDefinition};
use crate::error::{ParseError, Result};

static UNKNOWN_BUCKET: LazyLock<OptionDefinition> = LazyLock::new(OptionDefinition::unknown_bucket);

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Collect unknown options/values into `_unknown` instead of failing.
    pub partial: bool,
    /// After the first unknown token, send every remaining token to `_unknown`.
    /// Implies `partial`.
    pub stop_at_first_unknown: bool,
}

/// Cells after a completed scan, one per definition plus `_unknown`.
#[derive(Debug, Clone)]
pub struct ResolvedCells<'d> {
    definitions: &'d Definitions,
    cells: Vec<OptionValueCell<'d>>,
    unknown: OptionValueCell<'d>,
}

impl<'d> ResolvedCells<'d> {
    pub fn definitions(&self) -> &'d Definitions {
        self.definitions
    }

    /// Cells in definition order.
    pub fn cells(&self) -> &[OptionValueCell<'d>] {
        &self.cells
    }

    pub fn get(&self, name: &str) -> Option<&OptionValueCell<'d>> {
        self.definitions
            .position(name)
            .and_then(|idx| self.cells.get(idx))
    }

    /// Unmatched tokens in their original order.
    pub fn unknown(&self) -> Vec<String> {
        match self.unknown.get() {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
enum Unknown {
    Option,
    Value,
}

struct Resolver<'d> {
    definitions: &'d Definitions,
    options: ResolveOptions,
    cells: Vec<OptionValueCell<'d>>,
    unknown: OptionValueCell<'d>,
    /// Definition currently accepting bare values.
    pending: Option<usize>,
    singular_default_set: bool,
    unknown_found: bool,
}

/// Scan `argv` left to right against `definitions`.
pub fn resolve<'d>(
    definitions: &'d Definitions,
    argv: &[String],
    options: ResolveOptions,
) -> Result<ResolvedCells<'d>> {
    let mut resolver = Resolver {
        definitions,
        options,
        cells: definitions.iter().map(OptionValueCell::new).collect(),
        unknown: OptionValueCell::new(&UNKNOWN_BUCKET),
        pending: None,
        singular_default_set: false,
        unknown_found: false,
    };

    for tok in tokenize(argv) {
        if resolver.unknown_found && options.stop_at_first_unknown {
            resolver.unknown.set(Some(tok.arg.as_ref()))?;
            continue;
        }
        resolver.step(&tok.token, &tok.arg)?;
    }

    Ok(ResolvedCells {
        definitions,
        cells: resolver.cells,
        unknown: resolver.unknown,
    })
}

impl<'d> Resolver<'d> {
    fn partial(&self) -> bool {
        self.options.partial || self.options.stop_at_first_unknown
    }

    fn def(&self, idx: usize) -> Option<&'d OptionDefinition> {
        self.definitions.get(idx)
    }

    fn step(&mut self, token: &Token<'_>, arg: &str) -> Result<()> {
        match *token {
            Token::Long(name) => {
                let idx = self.definitions.find_long(name);
                self.option(idx, arg)
            }
            Token::Short(alias) => {
                let idx = self.definitions.find_short(alias);
                self.option(idx, arg)
            }
            Token::Equals { name, value } => {
                let Some(idx) = self.definitions.find_long(name) else {
                    return self.unknown(Unknown::Option, arg);
                };
                if self.def(idx).is_some_and(OptionDefinition::is_flag) {
                    // `--flag=x`: the value has nowhere to go, the flag still counts.
                    self.push_unknown(Unknown::Value, arg)?;
                    self.assign(idx, None)
                } else {
                    self.assign(idx, Some(value))
                }
            }
            Token::Value(value) => {
                if let Some(idx) = self.pending {
                    return self.assign(idx, Some(value));
                }
                match self.definitions.default_option() {
                    Some(idx) if !self.singular_default_set => self.assign(idx, Some(value)),
                    _ => self.unknown(Unknown::Value, arg),
                }
            }
        }
    }

    fn option(&mut self, idx: Option<usize>, arg: &str) -> Result<()> {
        match idx {
            Some(idx) => self.assign(idx, None),
            None => self.unknown(Unknown::Option, arg),
        }
    }

    /// Set a cell and update which definition (if any) takes the next value.
    fn assign(&mut self, idx: usize, value: Option<&str>) -> Result<()> {
        let Some(def) = self.def(idx) else {
            return Ok(());
        };
        tracing::trace!(option = def.name(), ?value, "assign");
        if let Some(cell) = self.cells.get_mut(idx) {
            cell.set(value)?;
        }

        if def.is_default_option() && !def.is_multiple() {
            self.singular_default_set = true;
        }

        self.pending = if def.is_flag() || (!def.is_greedy() && value.is_some()) {
            None
        } else {
            Some(idx)
        };
        Ok(())
    }

    /// Unknown token that ends the current option context.
    fn unknown(&mut self, kind: Unknown, arg: &str) -> Result<()> {
        self.pending = None;
        self.push_unknown(kind, arg)
    }

    fn push_unknown(&mut self, kind: Unknown, arg: &str) -> Result<()> {
        if !self.partial() {
            return Err(match kind {
                Unknown::Option => ParseError::UnknownOption {
                    option: arg.to_string(),
                },
                Unknown::Value => ParseError::UnknownValue {
                    value: arg.to_string(),
                },
            });
        }
        tracing::trace!(arg, "unknown");
        self.unknown_found = true;
        self.unknown.set(Some(arg))
    }
}
