//! rclone-me: rclone launcher with remote configuration.
//!
//! This binary fetches the configuration of a single rclone remote
//! from a configuration server, exposes it as `RCLONE_CONFIG_*`
//! environment variables, and then hands control to rclone.
//!
//! Start-up is a linear pipeline:
//!  * `args` - strips `--config_url <url>` from the command-line.
//!  * `remote` - HTTP client fetching the remote configuration document.
//!  * `materialize` - turns the document into environment variables.
//!  * `launcher` - runs rclone with the cleaned command-line.

extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate toml;

mod args;
mod bootstrap;
mod config;
mod launcher;
mod materialize;
mod remote;

use crate::config::LauncherConfig;
use crate::materialize::ProcessEnv;
use crate::remote::HttpFetcher;
use failure::{Fallible, ResultExt};
use std::io::Write;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            report_fatal(&e, &mut std::io::stderr());
            1
        }
    };
    std::process::exit(code);
}

fn run() -> Fallible<i32> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()?;
    trace!("starting rclone-me");

    let lookup_env = |name: &str| std::env::var(name).ok();

    let dirs = ["/usr/lib", "/run", "/etc"];
    let cfg = LauncherConfig::read_config(&dirs, lookup_env);

    let resolved =
        args::resolve(std::env::args_os(), lookup_env).context("command-line arguments")?;
    let fetcher = HttpFetcher::new().context("remote config client")?;
    bootstrap::setup_dynamic_config(&resolved, &fetcher, &mut ProcessEnv)?;

    let code = launcher::launch(&cfg, &resolved.args).context("launch")?;
    Ok(code)
}

/// Report a fatal start-up error as a single diagnostic line.
///
/// The line goes through the logger when it would be shown, and
/// straight to `out` otherwise (logging disabled or not initialized).
fn report_fatal<W: Write>(err: &failure::Error, out: &mut W) {
    let line = format!("dynamic config setup failed: {}", format_chain(err));
    if log_enabled!(log::Level::Error) {
        error!("{}", line);
    } else {
        let _ = writeln!(out, "{}", line);
    }
}

/// Render an error and all its causes on a single line.
fn format_chain(err: &failure::Error) -> String {
    let causes: Vec<String> = err.iter_chain().map(|c| c.to_string()).collect();
    causes.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_on_one_line() {
        let inner = failure::format_err!("connection refused");
        let err: failure::Error = inner.context("remote config fetch").into();
        assert_eq!(format_chain(&err), "remote config fetch: connection refused");
    }

    #[test]
    fn fatal_line_without_logger() {
        let inner = failure::format_err!("config server returned error status: 404 Not Found");
        let err: failure::Error = inner.context("remote config fetch").into();
        let mut out = Vec::new();

        report_fatal(&err, &mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "dynamic config setup failed: remote config fetch: \
             config server returned error status: 404 Not Found\n"
        );
    }
}
