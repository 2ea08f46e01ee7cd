use crate::command::{ExitCode, Toolbox};

/// Hooks run around command dispatch.
///
/// `init` runs before the command is resolved, so `toolbox.command` and
/// `toolbox.options` are still empty there.
pub trait Plugin {
    fn name(&self) -> &str;

    fn init(&self, _toolbox: &mut Toolbox<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn before_command(&self, _toolbox: &mut Toolbox<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_command(&self, _toolbox: &mut Toolbox<'_>, _code: ExitCode) -> anyhow::Result<()> {
        Ok(())
    }
}
