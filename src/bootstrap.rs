//! Dynamic configuration setup.
//!
//! Glue between the argument pre-scan, the remote configuration
//! client and the environment materializer. Every failure here is
//! fatal for the whole process start-up.

use crate::args::ResolvedArgs;
use crate::materialize::{self, EnvSink};
use crate::remote::ConfigFetcher;
use failure::{Fallible, ResultExt};

/// Fetch the remote configuration, if any, and install it into `sink`.
///
/// Returns the number of installed variables. Nothing is fetched when
/// no configuration source was resolved.
pub(crate) fn setup_dynamic_config<F, S>(
    resolved: &ResolvedArgs,
    fetcher: &F,
    sink: &mut S,
) -> Fallible<usize>
where
    F: ConfigFetcher + ?Sized,
    S: EnvSink,
{
    let url = match resolved.source.url() {
        Some(u) => u,
        None => {
            trace!("no remote config requested");
            return Ok(0);
        }
    };

    let cfg = fetcher.fetch(url).context("remote config fetch")?;
    let count = materialize::materialize(cfg, sink).context("remote config materialization")?;

    Ok(count)
}
