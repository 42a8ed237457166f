//! Downstream hand-off.
//!
//! Once the environment is populated, control goes to the downstream
//! binary with the cleaned argument list. On Unix the current process
//! image is replaced, so signals and exit status belong to rclone.

use crate::config::LauncherConfig;
use failure::{Fallible, ResultExt};
use std::ffi::OsString;
use std::process::Command;

/// Build the downstream command.
///
/// `args` holds the cleaned invocation arguments, program name included;
/// the program name is replaced by the configured binary.
pub(crate) fn command(cfg: &LauncherConfig, args: &[OsString]) -> Command {
    let mut cmd = Command::new(&cfg.binary);
    cmd.args(args.iter().skip(1));
    cmd
}

/// Hand control to the downstream binary.
///
/// Only returns on failure to start it.
#[cfg(unix)]
pub(crate) fn launch(cfg: &LauncherConfig, args: &[OsString]) -> Fallible<i32> {
    use std::os::unix::process::CommandExt;

    debug!("exec '{}' with {} argument(s)", cfg.binary, args.len().saturating_sub(1));
    let err = command(cfg, args).exec();
    Err(err)
        .context(format!("failed to exec '{}'", cfg.binary))
        .map_err(Into::into)
}

/// Run the downstream binary to completion and return its exit code.
#[cfg(not(unix))]
pub(crate) fn launch(cfg: &LauncherConfig, args: &[OsString]) -> Fallible<i32> {
    debug!("spawn '{}' with {} argument(s)", cfg.binary, args.len().saturating_sub(1));
    let status = command(cfg, args)
        .status()
        .context(format!("failed to run '{}'", cfg.binary))?;

    Ok(status.code().unwrap_or(1))
}
