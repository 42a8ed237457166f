/// Top-level configuration stanza.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigSnippet {
    /// Launcher configuration.
    pub(crate) launcher: Option<LauncherSnippet>,
}

/// Config snippet for the downstream launcher.
#[derive(Debug, Deserialize)]
pub(crate) struct LauncherSnippet {
    /// Downstream binary to run (default: 'rclone')
    pub(crate) binary: Option<String>,
}
