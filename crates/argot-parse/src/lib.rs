//! Command-line option parsing and resolution.
//!
//! The pipeline is:
//! - [`normalize`] validates raw definitions into [`Definitions`]
//! - [`resolve`] scans argv and fills one [`OptionValueCell`] per definition
//! - [`project`] turns the cells into a [`ParseResult`]
//!
//! [`parse`] runs all three. [`split_command`] is independent and is usually
//! called first to strip a sub-command off argv.
//!
//! ```
//! use argot_parse::{ParseOptions, RawOptionDefinition, parse};
//!
//! let defs = [
//!     RawOptionDefinition::new("verbose").alias("v").flag(),
//!     RawOptionDefinition::new("src").multiple().default_option(),
//! ];
//! let argv: Vec<String> = ["-v", "a.js", "b.js"].iter().map(|s| s.to_string()).collect();
//! let result = parse(&defs, &argv, &ParseOptions::default()).unwrap();
//! assert_eq!(result.get("verbose"), Some(&serde_json::json!(true)));
//! assert_eq!(result.get("src"), Some(&serde_json::json!(["a.js", "b.js"])));
//! ```
//!
//! Parsing is synchronous and keeps no state between calls.

mod argv;
pub mod cell;
pub mod command;
pub mod definition;
pub mod error;
pub mod output;
pub mod resolver;

pub use cell::{CellState, OptionValueCell};
pub use command::{CommandToken, split_command};
pub use definition::{
    Coercion, Definitions, OptionDefinition, OptionKind, RawOptionDefinition, UNKNOWN_NAME,
    normalize,
};
pub use error::{ErrorKind, ParseError, Result};
pub use output::{ParseResult, ProjectOptions, camel_case, check_camel_case_keys, project};
pub use resolver::{ResolveOptions, ResolvedCells, resolve};

/// Options for a single [`parse`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Collect unknown options and values into `_unknown` instead of failing.
    pub partial: bool,
    /// Stop matching at the first unknown token; the rest goes to `_unknown`.
    /// Implies `partial`.
    pub stop_at_first_unknown: bool,
    /// Camel-case option names in the output.
    pub camel_case: bool,
    /// Match option names and aliases ignoring ASCII case.
    pub case_insensitive: bool,
}

impl ParseOptions {
    fn is_partial(&self) -> bool {
        self.partial || self.stop_at_first_unknown
    }
}

/// Parse `argv` against `definitions`.
///
/// Definitions are validated before any token is read. The result is grouped
/// when at least one definition declares a `group`.
pub fn parse(
    definitions: &[RawOptionDefinition],
    argv: &[String],
    options: &ParseOptions,
) -> Result<ParseResult> {
    let defs = normalize(definitions, options.case_insensitive)?;
    parse_normalized(&defs, argv, options)
}

/// Like [`parse`] for a definition set that is already normalized.
///
/// With `camel_case`, definitions whose names collapse to the same key are
/// rejected as invalid.
pub fn parse_normalized(
    definitions: &Definitions,
    argv: &[String],
    options: &ParseOptions,
) -> Result<ParseResult> {
    if options.camel_case {
        check_camel_case_keys(definitions)?;
    }
    let cells = resolve(
        definitions,
        argv,
        ResolveOptions {
            partial: options.is_partial(),
            stop_at_first_unknown: options.stop_at_first_unknown,
        },
    )?;
    Ok(project(
        &cells,
        ProjectOptions {
            camel_case: options.camel_case,
            grouped: definitions.is_grouped(),
            skip_unknown: !options.is_partial(),
        },
    ))
}
