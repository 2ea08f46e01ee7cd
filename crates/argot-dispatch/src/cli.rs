use std::io::{self, Write};

use argot_parse::{
    ParseError, ProjectOptions, RawOptionDefinition, ResolveOptions, normalize, project, resolve,
    split_command,
};
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandMeta, ExitCode, Toolbox};
use crate::error::DispatchError;
use crate::listeners::ListenerGuard;
use crate::logging::{self, LogLevel};
use crate::plugin::Plugin;
use crate::suggest;

/// Behaviour switches for a [`Cli`]. Every field has a default, so an empty
/// JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CliConfig {
    pub version: Option<String>,
    /// Command run when argv does not start with a registered name.
    pub default_command: Option<String>,
    /// Collect unknown options into `_unknown` instead of failing.
    pub partial: bool,
    /// Release the panic hook when `run` returns. When off, it is held until
    /// [`Cli::dispose`] or drop.
    pub auto_dispose: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset and no verbosity
    /// flag was given.
    pub log_filter: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: None,
            default_command: None,
            partial: false,
            auto_dispose: true,
            log_filter: None,
        }
    }
}

/// Options every command accepts.
pub fn builtin_options() -> Vec<RawOptionDefinition> {
    vec![
        RawOptionDefinition::new("version")
            .alias("V")
            .flag()
            .description("Print version information"),
        RawOptionDefinition::new("verbose")
            .alias("v")
            .flag()
            .description("Enable debug logging"),
        RawOptionDefinition::new("quiet")
            .alias("q")
            .flag()
            .description("Only log errors"),
        RawOptionDefinition::new("debug")
            .flag()
            .description("Enable trace logging"),
    ]
}

pub struct Cli {
    name: String,
    config: CliConfig,
    commands: Vec<Box<dyn Command>>,
    metas: Vec<CommandMeta>,
    global_options: Vec<RawOptionDefinition>,
    plugins: Vec<Box<dyn Plugin>>,
    out: Box<dyn Write>,
    listener: Option<ListenerGuard>,
}

impl Cli {
    pub fn new(name: impl Into<String>, config: CliConfig) -> Self {
        Self {
            name: name.into(),
            config,
            commands: Vec::new(),
            metas: Vec::new(),
            global_options: Vec::new(),
            plugins: Vec::new(),
            out: Box::new(io::stdout()),
            listener: None,
        }
    }

    /// Send command and notice output somewhere other than stdout.
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Registered commands in registration order, hidden ones included.
    pub fn commands(&self) -> &[CommandMeta] {
        &self.metas
    }

    /// Register a command. Fails when its name or an alias is taken.
    pub fn add_command(&mut self, command: Box<dyn Command>) -> Result<&mut Self, DispatchError> {
        let meta = command.meta();
        for name in meta.names() {
            if let Some(existing) = self.metas.iter().find(|m| m.names().any(|n| n == name)) {
                return Err(DispatchError::CommandConflict {
                    name: name.to_string(),
                    existing: existing.name.clone(),
                    new: meta.name.clone(),
                });
            }
        }
        tracing::trace!(command = %meta.name, "command registered");
        self.metas.push(meta);
        self.commands.push(command);
        Ok(self)
    }

    pub fn add_global_option(&mut self, definition: RawOptionDefinition) -> &mut Self {
        self.global_options.push(definition);
        self
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn Plugin>) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    /// Release a panic hook kept alive because `auto_dispose` is off.
    pub fn dispose(&mut self) {
        if self.listener.take().is_some() {
            tracing::trace!("listeners disposed");
        }
    }

    /// Resolve, parse and execute one command line.
    pub fn run(&mut self, argv: &[String]) -> Result<ExitCode, DispatchError> {
        let Self {
            name,
            config,
            commands,
            metas,
            global_options,
            plugins,
            out,
            listener,
        } = self;

        let guard = ListenerGuard::acquire();
        let _guard = if config.auto_dispose {
            Some(guard)
        } else {
            *listener = Some(guard);
            None
        };

        let version = config.version.as_deref().unwrap_or_default();
        let mut tb = Toolbox::new(name.as_str(), version, argv.to_vec(), &mut **out);

        run_hooks(plugins, |p| p.init(&mut tb))?;

        if matches!(argv.first().map(String::as_str), Some("--version" | "-V")) {
            print_version(&mut tb)?;
            return Ok(0);
        }

        let mut known: Vec<Option<&str>> = metas
            .iter()
            .flat_map(CommandMeta::names)
            .map(Some)
            .collect();
        if config.default_command.is_some() {
            known.push(None);
        }
        let split = split_command(&known, argv).map_err(|err| match err {
            ParseError::CommandNotRecognised { command } => {
                let alternatives = command
                    .as_deref()
                    .map(|c| {
                        suggest::similar(
                            c,
                            metas.iter().filter(|m| !m.hidden).flat_map(CommandMeta::names),
                        )
                    })
                    .unwrap_or_default();
                DispatchError::CommandNotFound {
                    command,
                    alternatives,
                }
            }
            other => other.into(),
        })?;

        let wanted = split
            .command
            .as_deref()
            .or(config.default_command.as_deref());
        let idx = wanted
            .and_then(|w| metas.iter().position(|m| m.names().any(|n| n == w)))
            .ok_or_else(|| DispatchError::CommandNotFound {
                command: wanted.map(str::to_string),
                alternatives: Vec::new(),
            })?;
        let meta = &metas[idx];
        tracing::debug!(command = %meta.name, argv = ?split.argv, "dispatching");

        let mut raw = builtin_options();
        raw.extend(global_options.iter().cloned());
        raw.extend(meta.definitions());
        let defs = normalize(&raw, false)?;
        let cells = resolve(
            &defs,
            &split.argv,
            ResolveOptions {
                partial: config.partial,
                stop_at_first_unknown: false,
            },
        )?;
        tb.command = Some(meta.name.clone());
        tb.argv = split.argv.clone();
        tb.options = project(
            &cells,
            ProjectOptions {
                camel_case: false,
                grouped: defs.is_grouped(),
                skip_unknown: !config.partial,
            },
        );

        if tb.flag("version") {
            print_version(&mut tb)?;
            return Ok(0);
        }

        tb.log_level =
            LogLevel::from_flags(tb.flag("quiet"), tb.flag("verbose"), tb.flag("debug"));
        let filter = match (tb.log_level, config.log_filter.as_deref()) {
            (LogLevel::Normal, Some(filter)) => filter,
            (level, _) => level.as_filter(),
        };
        logging::init_once(filter);

        let missing: Vec<String> = cells
            .cells()
            .iter()
            .filter(|c| c.definition().is_required() && !c.touched())
            .filter(|c| c.definition().default_value().is_none())
            .map(|c| c.definition().name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DispatchError::MissingRequiredOptions { options: missing });
        }

        for cell in cells.cells().iter().filter(|c| c.touched()) {
            let def = cell.definition();
            for other in def.conflicts() {
                if cells.get(other).is_some_and(|o| o.touched()) {
                    return Err(DispatchError::ConflictingOptions {
                        option: def.name().to_string(),
                        other: other.clone(),
                    });
                }
            }
        }

        run_hooks(plugins, |p| p.before_command(&mut tb))?;
        let code = commands[idx]
            .execute(&mut tb)
            .map_err(|source| DispatchError::Command {
                command: meta.name.clone(),
                source,
            })?;
        tracing::debug!(command = %meta.name, code, "command finished");
        run_hooks(plugins, |p| p.after_command(&mut tb, code))?;

        tb.flush_notices()?;
        Ok(code)
    }
}

fn run_hooks<F>(plugins: &[Box<dyn Plugin>], mut hook: F) -> Result<(), DispatchError>
where
    F: FnMut(&dyn Plugin) -> anyhow::Result<()>,
{
    for plugin in plugins {
        hook(plugin.as_ref()).map_err(|source| DispatchError::Plugin {
            plugin: plugin.name().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn print_version(tb: &mut Toolbox<'_>) -> io::Result<()> {
    let line = if tb.version.is_empty() {
        tb.cli.to_string()
    } else {
        format!("{} {}", tb.cli, tb.version)
    };
    tb.println(&line)?;
    tb.out().flush()
}
