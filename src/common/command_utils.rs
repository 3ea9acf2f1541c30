use log::debug;
use std::ffi::OsStr;
use std::process::{Command, Output};

/// Execute a command and return its output
pub fn execute_command<I, S>(cmd: impl AsRef<OsStr>, args: I) -> std::io::Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(cmd);
    command.args(args);
    debug!("Running {:?}", command);

    let output = command.output()?;
    debug!("{:?} exited with {}", command.get_program(), output.status);
    Ok(output)
}

/// Check if a command runs successfully with the given probe arguments
pub fn is_command_available<I, S>(cmd: impl AsRef<OsStr>, probe: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    execute_command(cmd, probe)
        .map(|o| o.status.success())
        .unwrap_or(false)
}
