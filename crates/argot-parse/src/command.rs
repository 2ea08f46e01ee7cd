use crate::error::{ParseError, Result};

/// A recognised command and the argv that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandToken {
    /// `None` only when the command list allows running without one.
    pub command: Option<String>,
    pub argv: Vec<String>,
}

/// Split the leading command off `argv`.
///
/// `commands` lists the recognised names; a `None` entry means "no command"
/// is acceptable too, in which case an unrecognised first token is left in
/// place for option parsing.
pub fn split_command(commands: &[Option<&str>], argv: &[String]) -> Result<CommandToken> {
    if commands.is_empty() {
        return Err(ParseError::NoCommandsDefined);
    }

    if let Some(first) = argv.first() {
        if commands.iter().flatten().any(|c| *c == first.as_str()) {
            return Ok(CommandToken {
                command: Some(first.clone()),
                argv: argv[1..].to_vec(),
            });
        }
    }

    if commands.contains(&None) {
        return Ok(CommandToken {
            command: None,
            argv: argv.to_vec(),
        });
    }

    Err(ParseError::CommandNotRecognised {
        command: argv.first().cloned(),
    })
}
