use argot_parse::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The first token is not a registered command or alias.
    #[error("{}", command_not_found_message(.command, .alternatives))]
    CommandNotFound {
        command: Option<String>,
        alternatives: Vec<String>,
    },

    #[error("command conflict: '{name}' is registered by both '{existing}' and '{new}'")]
    CommandConflict {
        name: String,
        existing: String,
        new: String,
    },

    #[error("missing required {}: {}", plural_options(.options), format_options(.options))]
    MissingRequiredOptions { options: Vec<String> },

    #[error("conflicting options: --{option} cannot be used with --{other}")]
    ConflictingOptions { option: String, other: String },

    #[error("plugin '{plugin}' failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("command '{command}' failed: {source}")]
    Command {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

fn command_not_found_message(command: &Option<String>, alternatives: &[String]) -> String {
    let mut msg = match command {
        Some(cmd) => format!("command not found: {cmd}"),
        None => "no command given".to_string(),
    };
    if !alternatives.is_empty() {
        msg.push_str(&format!(". Did you mean: {}?", alternatives.join(", ")));
    }
    msg
}

fn plural_options(options: &[String]) -> &'static str {
    if options.len() == 1 {
        "option"
    } else {
        "options"
    }
}

fn format_options(options: &[String]) -> String {
    options
        .iter()
        .map(|o| format!("--{o}"))
        .collect::<Vec<_>>()
        .join(", ")
}
