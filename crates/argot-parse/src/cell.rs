//! Per-option value storage for a single parse call.

use serde_json::Value;

use crate::definition::OptionDefinition;
use crate::error::{ParseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Holding the seeded default (or nothing).
    Default,
    /// At least one explicit value has been assigned.
    Set,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Single(Value),
    List(Vec<Value>),
}

/// Current value(s) of one option.
///
/// Singular cells reject a second assignment once `Set`. Multiple cells
/// append, dropping any seeded default on the first explicit value.
#[derive(Debug, Clone)]
pub struct OptionValueCell<'d> {
    definition: &'d OptionDefinition,
    slot: Slot,
    state: CellState,
    touched: bool,
}

impl<'d> OptionValueCell<'d> {
    pub fn new(definition: &'d OptionDefinition) -> Self {
        let mut cell = Self {
            definition,
            slot: Slot::Single(Value::Null),
            state: CellState::Default,
            touched: false,
        };
        cell.reset_to_default();
        cell
    }

    pub fn definition(&self) -> &'d OptionDefinition {
        self.definition
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    /// Whether the resolver routed at least one token to this cell.
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// A cell is projected when it was mentioned or carries a default.
    pub fn is_present(&self) -> bool {
        self.touched || self.definition.default_value().is_some()
    }

    pub fn reset_to_default(&mut self) {
        let def = self.definition;
        self.slot = match (def.default_value(), def.is_multiple()) {
            (Some(Value::Array(items)), true) => Slot::List(items.clone()),
            (Some(value), true) => Slot::List(vec![value.clone()]),
            (Some(value), false) => Slot::Single(value.clone()),
            (None, true) => Slot::List(Vec::new()),
            (None, false) => Slot::Single(Value::Null),
        };
        self.state = CellState::Default;
    }

    pub fn get(&self) -> Value {
        match &self.slot {
            Slot::Single(v) => v.clone(),
            Slot::List(items) => Value::Array(items.clone()),
        }
    }

    /// Number of explicitly or default-held items (1 for a non-null singular).
    pub fn len(&self) -> usize {
        match &self.slot {
            Slot::Single(Value::Null) => 0,
            Slot::Single(_) => 1,
            Slot::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assign a raw token (`None` for an option given without a value).
    pub fn set(&mut self, raw: Option<&str>) -> Result<()> {
        self.touched = true;
        let def = self.definition;

        if def.is_multiple() {
            // Flags record every occurrence; other multiples skip valueless ones.
            let value = if def.is_flag() {
                Value::Bool(true)
            } else {
                let Some(raw) = raw else {
                    return Ok(());
                };
                self.coerce(raw)?
            };
            if self.state == CellState::Default {
                self.slot = Slot::List(Vec::new());
            }
            if let Slot::List(items) = &mut self.slot {
                items.push(value);
            }
            self.state = CellState::Set;
            return Ok(());
        }

        if self.state == CellState::Set {
            return Err(ParseError::AlreadySet {
                option: def.name().to_string(),
                previous: self.get(),
                value: raw.map(str::to_string),
            });
        }

        if def.is_flag() {
            self.slot = Slot::Single(Value::Bool(true));
            self.state = CellState::Set;
            return Ok(());
        }

        match raw {
            // Option named without a value: null, still open for one value.
            None => self.slot = Slot::Single(Value::Null),
            Some(raw) => {
                self.slot = Slot::Single(self.coerce(raw)?);
                self.state = CellState::Set;
            }
        }
        Ok(())
    }

    fn coerce(&self, raw: &str) -> Result<Value> {
        self.definition
            .coerce(raw)
            .map_err(|reason| ParseError::InvalidValue {
                option: self.definition.name().to_string(),
                value: raw.to_string(),
                reason,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{RawOptionDefinition, normalize};
    use crate::error::ErrorKind;
    use serde_json::json;

    fn def(raw: RawOptionDefinition) -> OptionDefinition {
        normalize(&[raw], false).unwrap().get(0).unwrap().clone()
    }

    #[test]
    fn default_is_preserved_when_untouched() {
        let d = def(RawOptionDefinition::new("cheese").default_value("mozzarella"));
        let cell = OptionValueCell::new(&d);
        assert_eq!(cell.get(), json!("mozzarella"));
        assert_eq!(cell.state(), CellState::Default);
        assert!(cell.is_present());
        assert!(!cell.touched());
    }

    #[test]
    fn singular_rejects_second_value() {
        let d = def(RawOptionDefinition::new("one"));
        let mut cell = OptionValueCell::new(&d);
        cell.set(Some("a")).unwrap();
        let err = cell.set(Some("b")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadySet);
        let ParseError::AlreadySet { option, previous, value } = err else {
            panic!("expected AlreadySet");
        };
        assert_eq!(option, "one");
        assert_eq!(previous, json!("a"));
        assert_eq!(value.as_deref(), Some("b"));
        assert_eq!(cell.get(), json!("a"));
    }

    #[test]
    fn singular_null_keeps_default_state() {
        let d = def(RawOptionDefinition::new("one").default_value("x"));
        let mut cell = OptionValueCell::new(&d);
        cell.set(None).unwrap();
        assert_eq!(cell.get(), Value::Null);
        assert_eq!(cell.state(), CellState::Default);
        cell.set(Some("y")).unwrap();
        assert_eq!(cell.get(), json!("y"));
    }

    #[test]
    fn singular_null_after_set_is_already_set() {
        let d = def(RawOptionDefinition::new("one"));
        let mut cell = OptionValueCell::new(&d);
        cell.set(Some("a")).unwrap();
        let err = cell.set(None).unwrap_err();
        assert!(matches!(err, ParseError::AlreadySet { value: None, .. }));
    }

    #[test]
    fn multiple_replaces_default_then_appends() {
        let d = def(RawOptionDefinition::new("n").number().multiple().default_value(json!([1])));
        let mut cell = OptionValueCell::new(&d);
        assert_eq!(cell.get(), json!([1]));
        cell.set(Some("2")).unwrap();
        cell.set(None).unwrap();
        cell.set(Some("3")).unwrap();
        assert_eq!(cell.get(), json!([2, 3]));
        assert_eq!(cell.len(), 2);
    }

    #[test]
    fn scalar_default_on_multiple_becomes_list() {
        let d = def(RawOptionDefinition::new("tag").lazy_multiple().default_value("a"));
        let cell = OptionValueCell::new(&d);
        assert_eq!(cell.get(), json!(["a"]));
    }

    #[test]
    fn flag_stores_true_regardless_of_input() {
        let d = def(RawOptionDefinition::new("verbose").flag());
        let mut cell = OptionValueCell::new(&d);
        assert_eq!(cell.get(), Value::Null);
        cell.set(Some("false")).unwrap();
        assert_eq!(cell.get(), json!(true));
        assert!(cell.set(None).is_err());
    }

    #[test]
    fn multiple_flag_accumulates_trues() {
        let d = def(RawOptionDefinition::new("verbose").flag().multiple());
        let mut cell = OptionValueCell::new(&d);
        for _ in 0..3 {
            cell.set(None).unwrap();
        }
        assert_eq!(cell.get(), json!([true, true, true]));
    }

    #[test]
    fn coercion_failure_is_invalid_value() {
        let d = def(RawOptionDefinition::new("count").number());
        let mut cell = OptionValueCell::new(&d);
        let err = cell.set(Some("lots")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(cell.state(), CellState::Default);
    }

    #[test]
    fn reset_restores_fresh_default_copy() {
        let d = def(RawOptionDefinition::new("n").multiple().default_value(json!(["a"])));
        let mut cell = OptionValueCell::new(&d);
        cell.set(Some("b")).unwrap();
        cell.reset_to_default();
        assert_eq!(cell.get(), json!(["a"]));
        assert_eq!(cell.state(), CellState::Default);
        assert_eq!(d.default_value(), Some(&json!(["a"])));
    }
}
