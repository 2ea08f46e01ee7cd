//! Command dispatch on top of `argot-parse`.
//!
//! A [`Cli`] owns a set of [`Command`]s, global options and [`Plugin`]s.
//! [`Cli::run`] strips the command token, parses the rest against the
//! built-in, global and command options, validates required and conflicting
//! options, then executes the command between the plugin hooks.

pub mod cli;
pub mod command;
pub mod error;
pub mod listeners;
pub mod logging;
pub mod plugin;
pub mod suggest;
pub mod update;

pub use cli::{Cli, CliConfig, builtin_options};
pub use command::{Command, CommandMeta, ExitCode, MetaBuilder, Toolbox, meta};
pub use error::DispatchError;
pub use listeners::{ListenerGuard, active_listeners};
pub use logging::LogLevel;
pub use plugin::Plugin;
pub use update::{UpdateCache, UpdateChecker, UpdateNotifier};
