//! Commands and the toolbox handed to them.

use std::io::{self, Write};

use argot_parse::{ParseResult, RawOptionDefinition};
use serde_json::Value;

use crate::logging::LogLevel;

/// Process exit code returned by a command.
pub type ExitCode = u32;

/// Static description of a command.
#[derive(Debug, Clone, Default)]
pub struct CommandMeta {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub hidden: bool,
    /// Receives bare values; becomes the default option when parsing.
    pub argument: Option<RawOptionDefinition>,
    pub options: Vec<RawOptionDefinition>,
}

impl CommandMeta {
    /// The name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub(crate) fn definitions(&self) -> Vec<RawOptionDefinition> {
        let mut defs = self.options.clone();
        if let Some(arg) = &self.argument {
            let mut arg = arg.clone();
            arg.default_option = true;
            defs.push(arg);
        }
        defs
    }
}

/// Start building a [`CommandMeta`].
pub fn meta(name: impl Into<String>) -> MetaBuilder {
    MetaBuilder {
        inner: CommandMeta {
            name: name.into(),
            ..Default::default()
        },
    }
}

#[derive(Debug, Clone)]
pub struct MetaBuilder {
    inner: CommandMeta,
}

impl MetaBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.inner.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = description.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.inner.hidden = true;
        self
    }

    pub fn argument(mut self, definition: RawOptionDefinition) -> Self {
        self.inner.argument = Some(definition);
        self
    }

    pub fn option(mut self, definition: RawOptionDefinition) -> Self {
        self.inner.options.push(definition);
        self
    }

    pub fn build(self) -> CommandMeta {
        self.inner
    }
}

/// A runnable command.
///
/// ```
/// use argot_dispatch::{Command, CommandMeta, ExitCode, Toolbox, meta};
///
/// struct Hello;
///
/// impl Command for Hello {
///     fn meta(&self) -> CommandMeta {
///         meta("hello").description("Say hello").build()
///     }
///
///     fn execute(&self, tb: &mut Toolbox<'_>) -> anyhow::Result<ExitCode> {
///         tb.println("Hello!")?;
///         Ok(0)
///     }
/// }
/// ```
pub trait Command {
    fn meta(&self) -> CommandMeta;
    fn execute(&self, toolbox: &mut Toolbox<'_>) -> anyhow::Result<ExitCode>;
}

/// Per-run context shared by plugins and the selected command.
pub struct Toolbox<'a> {
    pub cli: &'a str,
    pub version: &'a str,
    /// Resolved command name; an alias is reported as the canonical name.
    pub command: Option<String>,
    /// argv after the command token was removed.
    pub argv: Vec<String>,
    pub options: ParseResult,
    pub log_level: LogLevel,
    notices: Vec<String>,
    out: &'a mut dyn Write,
}

impl<'a> Toolbox<'a> {
    pub(crate) fn new(
        cli: &'a str,
        version: &'a str,
        argv: Vec<String>,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            cli,
            version,
            command: None,
            argv,
            options: ParseResult::default(),
            log_level: LogLevel::default(),
            notices: Vec::new(),
            out,
        }
    }

    /// Value of an option, looking in `_all` when the result is grouped.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.option(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.option(name), Some(Value::Bool(true)))
    }

    pub fn unknown(&self) -> &[String] {
        self.options.unknown()
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn println(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    /// Queue a message printed after the command finishes.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub(crate) fn flush_notices(&mut self) -> io::Result<()> {
        for notice in std::mem::take(&mut self.notices) {
            writeln!(self.out, "{notice}")?;
        }
        self.out.flush()
    }
}
