//! Launcher configuration parsing and validation.
//!
//! This module contains three logical entities:
//!  * Snippets: single configuration files, holding a subset of configuration entries.
//!  * Inputs: configuration snippets merged, but not yet validated.
//!  * LauncherConfig: validated configuration for the launcher.

mod inputs;
mod snippets;

/// Default downstream binary, looked up in `PATH`.
static DEFAULT_BINARY: &str = "rclone";

/// Environment variable overriding the configured binary.
pub(crate) static BINARY_ENV: &str = "RCLONE_ME_BINARY";

/// Runtime configuration for the launcher.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LauncherConfig {
    /// Downstream binary to hand control to.
    pub(crate) binary: String,
}

impl LauncherConfig {
    /// Read and validate launcher configuration.
    ///
    /// Broken snippets never block start-up: they are reported and the
    /// built-in defaults are used instead.
    pub(crate) fn read_config<F>(dirs: &[&str], lookup_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cfg = match inputs::ConfigInput::read_configs(dirs) {
            Ok(cfg) => cfg,
            Err(e) => {
                let causes: Vec<String> = e.iter_chain().map(|c| c.to_string()).collect();
                warn!("ignoring launcher config snippets: {}", causes.join(": "));
                inputs::ConfigInput::default()
            }
        };
        Self::from_input(cfg, lookup_env)
    }

    /// Validate inputs and return a valid launcher configuration.
    fn from_input<F>(cfg: inputs::ConfigInput, lookup_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let binary = match lookup_env(BINARY_ENV) {
            Some(b) if !b.is_empty() => b,
            _ if !cfg.launcher.binary.is_empty() => cfg.launcher.binary,
            _ => String::from(DEFAULT_BINARY),
        };

        let state = Self { binary };
        debug!("runtime configuration: {:?}", state);

        state
    }
}
