use crate::config::snippets;
use failure::{Fallible, ResultExt};
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Subdirectory holding configuration snippets, relative to a base dir.
static CONFIG_SUBDIR: &str = "rclone-me/config.d";

/// Configuration snippets merged together, not yet validated.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ConfigInput {
    pub(crate) launcher: LauncherInput,
}

impl ConfigInput {
    /// Read config snippets from `dirs` and merge them into a single config.
    ///
    /// Directories are scanned in order, snippets in each directory in
    /// lexical order. Later snippets override earlier ones.
    pub(crate) fn read_configs(dirs: &[&str]) -> Fallible<Self> {
        let mut snips = vec![];
        for dir in dirs {
            let confd = Path::new(dir).join(CONFIG_SUBDIR);
            for path in list_snippets(&confd)? {
                trace!("reading config snippet {:?}", path);
                let content = fs::read_to_string(&path)
                    .context(format!("failed to read file '{}'", path.display()))?;
                let snippet: snippets::ConfigSnippet = toml::from_str(&content)
                    .context(format!("failed to parse TOML in '{}'", path.display()))?;
                snips.push(snippet);
            }
        }

        let cfg = Self::merge_snippets(snips);
        debug!("configuration input: {:?}", cfg);

        Ok(cfg)
    }

    /// Merge multiple snippets into a single configuration.
    fn merge_snippets(snippets: Vec<snippets::ConfigSnippet>) -> Self {
        let launchers = snippets.into_iter().filter_map(|s| s.launcher).collect();

        Self {
            launcher: LauncherInput::from_snippets(launchers),
        }
    }
}

/// List `*.toml` files in `dir`, sorted by name.
///
/// A missing directory yields no snippets.
fn list_snippets(dir: &Path) -> Fallible<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => Err(e).context(format!("failed to list directory '{}'", dir.display()))?,
    };

    let mut paths = vec![];
    for entry in entries {
        let path = entry
            .context(format!("failed to read directory '{}'", dir.display()))?
            .path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths)
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct LauncherInput {
    pub(crate) binary: String,
}

impl LauncherInput {
    fn from_snippets(snippets: Vec<snippets::LauncherSnippet>) -> Self {
        let mut cfg = Self::default();

        for snip in snippets {
            if let Some(b) = snip.binary {
                cfg.binary = b;
            }
        }

        cfg
    }
}
