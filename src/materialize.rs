//! Remote configuration materialization.
//!
//! This module turns the `config` entries of a remote document into
//! environment variables, following the naming convention rclone
//! uses for remotes defined through the environment:
//! `RCLONE_CONFIG_<NAME>_<KEY>`.

use crate::remote::RemoteConfig;
use failure::Fail;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Namespace prefix for remote configuration variables.
pub(crate) static ENV_PREFIX: &str = "RCLONE_CONFIG_";

/// Errors from installing environment assignments.
#[derive(Debug, Fail)]
pub(crate) enum MaterializeError {
    #[fail(display = "failed to set environment variable {}: {}", key, reason)]
    EnvWrite { key: String, reason: String },
}

/// Destination for environment assignments.
pub(crate) trait EnvSink {
    fn set(&mut self, key: &str, value: &str) -> Result<(), MaterializeError>;
}

/// The real process environment.
///
/// This is the only place where process-wide environment state is
/// mutated. It must run before any other thread reads the environment.
#[derive(Debug, Default)]
pub(crate) struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn set(&mut self, key: &str, value: &str) -> Result<(), MaterializeError> {
        // `std::env::set_var` panics on these, reject them upfront.
        let reason = if key.is_empty() {
            Some("empty name")
        } else if key.contains('=') {
            Some("name contains '='")
        } else if key.contains('\0') {
            Some("name contains NUL")
        } else if value.contains('\0') {
            Some("value contains NUL")
        } else {
            None
        };
        if let Some(r) = reason {
            return Err(MaterializeError::EnvWrite {
                key: key.to_string(),
                reason: r.to_string(),
            });
        }

        std::env::set_var(key, value);
        Ok(())
    }
}

impl EnvSink for BTreeMap<String, String> {
    fn set(&mut self, key: &str, value: &str) -> Result<(), MaterializeError> {
        self.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON value, as seen by the environment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum EnvValue {
    String(String),
    Number(Number),
    Bool(bool),
    /// Objects, arrays and null.
    Other(Value),
}

impl From<Value> for EnvValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => EnvValue::String(s),
            Value::Number(n) => EnvValue::Number(n),
            Value::Bool(b) => EnvValue::Bool(b),
            other => EnvValue::Other(other),
        }
    }
}

impl EnvValue {
    /// Render this value as an environment variable value.
    pub(crate) fn into_env_string(self) -> String {
        match self {
            EnvValue::String(s) => s,
            EnvValue::Number(n) => render_number(&n),
            EnvValue::Bool(b) => b.to_string(),
            EnvValue::Other(v) => match serde_json::to_string(&v) {
                Ok(json) => json,
                Err(e) => {
                    warn!("failed to serialize value as JSON: {}", e);
                    v.to_string()
                }
            },
        }
    }
}

/// Render a JSON number as plain text.
///
/// Whole floats (`4.0`, `1e3`) are printed without a fractional part,
/// as rclone parses integer options strictly.
fn render_number(n: &Number) -> String {
    if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return (f as i64).to_string();
        }
    }
    n.to_string()
}

/// A single environment variable derived from a `config` entry.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EnvAssignment {
    pub(crate) key: String,
    pub(crate) value: String,
}

impl EnvAssignment {
    pub(crate) fn new(remote: &str, param: &str, value: Value) -> Self {
        Self {
            key: env_key(remote, param),
            value: EnvValue::from(value).into_env_string(),
        }
    }
}

/// Compute the variable name for parameter `param` of remote `remote`.
pub(crate) fn env_key(remote: &str, param: &str) -> String {
    format!(
        "{}{}_{}",
        ENV_PREFIX,
        remote.to_uppercase(),
        param.to_uppercase()
    )
}

/// Install all parameters of `cfg` into `sink`.
///
/// Stops at the first rejected assignment; earlier ones stay in place.
/// Returns the number of installed variables.
pub(crate) fn materialize<S: EnvSink>(
    cfg: RemoteConfig,
    sink: &mut S,
) -> Result<usize, MaterializeError> {
    let RemoteConfig { name, parameters } = cfg;

    let mut count = 0;
    for (param, value) in parameters {
        let assignment = EnvAssignment::new(&name, &param, value);
        trace!("setting environment variable '{}'", assignment.key);
        sink.set(&assignment.key, &assignment.value)?;
        count += 1;
    }

    debug!("installed {} variable(s) for remote '{}'", count, name);
    Ok(count)
}
