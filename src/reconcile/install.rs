use std::path::Path;

use crate::git::GitRemote;
use crate::registry::{PluginSpec, clone_dir_name};

/// Per-run install tallies, fresh for every batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub installed_ok: usize,
    pub install_failed: usize,
    pub skipped_existing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    SkippedExisting,
    Failed(String),
}

/// Clone every spec that is not already present under `plugins_dir`.
///
/// Strictly sequential, input order; each outcome is observed before the
/// next spec starts. A failed clone leaves nothing behind and the batch
/// keeps going. Skip-if-exists makes a re-run over the same registry a
/// no-op, which is the only retry mechanism there is.
pub fn install_all<G: GitRemote>(
    git: &G,
    specs: &[PluginSpec],
    plugins_dir: &Path,
    mut observe: impl FnMut(usize, &PluginSpec, &InstallOutcome),
) -> Counters {
    let mut counters = Counters::default();

    for (index, spec) in specs.iter().enumerate() {
        let outcome = install_one(git, spec, plugins_dir);
        match outcome {
            InstallOutcome::Installed => counters.installed_ok += 1,
            InstallOutcome::SkippedExisting => counters.skipped_existing += 1,
            InstallOutcome::Failed(ref err) => {
                tracing::warn!("clone failed for {}: {err}", spec.source_url);
                counters.install_failed += 1;
            }
        }
        observe(index, spec, &outcome);
    }

    counters
}

fn install_one<G: GitRemote>(git: &G, spec: &PluginSpec, plugins_dir: &Path) -> InstallOutcome {
    // The skip check uses git's directory naming, not the capitalized
    // plugin name; the two differ for URLs with dots in the repo name.
    let Some(dir) = clone_dir_name(&spec.source_url) else {
        return InstallOutcome::Failed(format!("no usable directory name: {}", spec.source_url));
    };

    if plugins_dir.join(&dir).exists() {
        return InstallOutcome::SkippedExisting;
    }

    match git.clone_into(&spec.source_url, plugins_dir) {
        Ok(()) => InstallOutcome::Installed,
        Err(err) => InstallOutcome::Failed(err),
    }
}
