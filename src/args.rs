//! Invocation arguments pre-scan.
//!
//! This module extracts the remote configuration source from the
//! command-line before the downstream tool gets to parse it.
//! The scan is pure: it returns a cleaned copy of the arguments and
//! never touches any global parser state.
//!
//! Only the two-token form `--config_url <url>` is recognized.
//! A combined `--config_url=<url>` token is not supported: it is left
//! untouched for the downstream parser and carries no value here.
//!
//! Arguments are kept as `OsString`: rclone happily takes file names
//! which are not valid UTF-8, only the URL value needs to be text.

use failure::Fail;
use std::ffi::{OsStr, OsString};

/// Command-line flag carrying the remote configuration URL.
pub(crate) static CONFIG_URL_FLAG: &str = "--config_url";

/// Environment variable used as fallback configuration source.
pub(crate) static CONFIG_URL_ENV: &str = "RCLONE_CONFIG_URL";

/// Where the remote configuration URL comes from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ConfigSource {
    /// Explicitly passed on the command-line.
    Flag(String),
    /// Taken from the fallback environment variable.
    Env(String),
    /// No remote configuration requested.
    Absent,
}

impl ConfigSource {
    /// Return the URL to fetch, if any.
    ///
    /// An empty URL (e.g. `--config_url ""`) means nothing to fetch.
    pub(crate) fn url(&self) -> Option<&str> {
        match self {
            ConfigSource::Flag(u) | ConfigSource::Env(u) if !u.is_empty() => Some(u.as_str()),
            _ => None,
        }
    }
}

/// Errors from the pre-scan.
#[derive(Debug, Fail)]
pub(crate) enum ArgsError {
    #[fail(display = "value of '{}' is not valid UTF-8: {:?}", _0, _1)]
    NonUtf8Url(&'static str, OsString),
}

/// Outcome of the pre-scan.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ResolvedArgs {
    pub(crate) source: ConfigSource,
    /// Invocation arguments, program name included, without the flag.
    pub(crate) args: Vec<OsString>,
}

/// Extract the configuration source and strip its flag from `args`.
///
/// The first argument is the program name and is never interpreted.
/// `lookup_env` is only consulted when the flag was not supplied.
pub(crate) fn resolve<I, F>(args: I, lookup_env: F) -> Result<ResolvedArgs, ArgsError>
where
    I: IntoIterator<Item = OsString>,
    F: Fn(&str) -> Option<String>,
{
    let mut input = args.into_iter();
    let mut cleaned: Vec<OsString> = input.next().into_iter().collect();
    let mut flag_value = None;

    while let Some(arg) = input.next() {
        if arg.as_os_str() == OsStr::new(CONFIG_URL_FLAG) {
            match input.next() {
                Some(value) => flag_value = Some(value),
                None => warn!("ignoring '{}' without a value", CONFIG_URL_FLAG),
            }
            continue;
        }

        if is_combined_form(&arg) {
            warn!(
                "unsupported syntax '{}=<url>', use '{} <url>' instead",
                CONFIG_URL_FLAG, CONFIG_URL_FLAG
            );
        }
        cleaned.push(arg);
    }

    let source = match flag_value {
        Some(url) => ConfigSource::Flag(
            url.into_string()
                .map_err(|raw| ArgsError::NonUtf8Url(CONFIG_URL_FLAG, raw))?,
        ),
        None => match lookup_env(CONFIG_URL_ENV) {
            Some(url) if !url.is_empty() => ConfigSource::Env(url),
            _ => ConfigSource::Absent,
        },
    };
    trace!("configuration source: {:?}", source);

    Ok(ResolvedArgs {
        source,
        args: cleaned,
    })
}

/// Whether `arg` is the unsupported `--config_url=<url>` form.
fn is_combined_form(arg: &OsStr) -> bool {
    arg.to_str()
        .and_then(|s| s.strip_prefix(CONFIG_URL_FLAG))
        .map_or(false, |rest| rest.starts_with('='))
}
