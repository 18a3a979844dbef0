use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Structural failures that abort the current operation.
///
/// Per-item failures (an unreachable source, a failed clone or pull, a
/// malformed registry line) are never represented here; batches inspect
/// every outcome and keep going, so those are classified result values on
/// the operations themselves.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cannot read registry {path}: {source}")]
    RegistryUnreadable { path: PathBuf, source: io::Error },

    #[error("cannot read plugin directory {path}: {source}")]
    PluginDirUnreadable { path: PathBuf, source: io::Error },

    #[error("cannot create plugin directory {path}: {source}")]
    PluginDirCreate { path: PathBuf, source: io::Error },
}
