use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::SyncError;
use crate::git::GitRemote;
use crate::registry::derive_name;

/// A plugin reconstructed from the filesystem. `name` comes from the
/// configured fetch remote, not from the directory name, so renamed
/// checkouts still resolve to their canonical identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub directory: PathBuf,
    pub name: String,
    pub source_url: String,
}

/// Rebuild the installed-plugin list from the plugin directory.
///
/// Only direct subdirectories count. Untracked ones are expected (plain
/// data directories live alongside plugins) and are skipped silently;
/// tracked ones missing a remote or a usable name are skipped with a
/// warning. A missing plugin directory is "nothing installed", not an
/// error. Only an unreadable directory is structural.
pub fn scan_installed<G: GitRemote>(
    git: &G,
    plugins_dir: &Path,
) -> Result<Vec<InstalledPlugin>, SyncError> {
    if !plugins_dir.exists() {
        return Ok(Vec::new());
    }

    let mut plugins = Vec::new();
    for entry in WalkBuilder::new(plugins_dir)
        .max_depth(Some(1))
        .hidden(false)
        .standard_filters(false)
        .build()
    {
        let entry = entry.map_err(|err| SyncError::PluginDirUnreadable {
            path: plugins_dir.to_path_buf(),
            source: std::io::Error::other(err),
        })?;

        let path = entry.path();
        if path == plugins_dir || !path.is_dir() {
            continue;
        }

        if !git.is_tracked(path) {
            continue;
        }

        let Some(source_url) = git.fetch_url(path) else {
            tracing::warn!("tracked directory has no fetch remote: {}", path.display());
            continue;
        };

        let Some(name) = derive_name(&source_url) else {
            tracing::warn!("remote URL yields no usable name: {source_url}");
            continue;
        };

        plugins.push(InstalledPlugin {
            directory: path.to_path_buf(),
            name,
            source_url,
        });
    }

    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(plugins)
}
