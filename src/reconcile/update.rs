use crate::git::GitRemote;
use crate::reconcile::scan::InstalledPlugin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    Updated,
    Failed(String),
}

/// Pull one plugin and classify the result.
///
/// A non-zero status is `Failed` no matter what the output says; a clean
/// pull is `UpToDate` only when the output indicates nothing was fetched.
/// This is the single place the core reads pull output text.
pub fn update_plugin<G: GitRemote>(git: &G, plugin: &InstalledPlugin) -> UpdateOutcome {
    let output = git.pull(&plugin.directory);

    if !output.success {
        tracing::warn!("pull failed for {}: {}", plugin.name, output.summary);
        return UpdateOutcome::Failed(output.summary);
    }

    if already_current(&output.summary) {
        UpdateOutcome::UpToDate
    } else {
        UpdateOutcome::Updated
    }
}

/// Batch update is just sequential application, continuing past failures.
pub fn update_all<G: GitRemote>(
    git: &G,
    plugins: &[InstalledPlugin],
    mut observe: impl FnMut(usize, &InstalledPlugin, &UpdateOutcome),
) {
    for (index, plugin) in plugins.iter().enumerate() {
        let outcome = update_plugin(git, plugin);
        observe(index, plugin, &outcome);
    }
}

// Both spellings, for older and newer git.
fn already_current(summary: &str) -> bool {
    summary.contains("Already up to date") || summary.contains("Already up-to-date")
}
