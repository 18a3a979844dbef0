use std::path::Path;
use std::process::{Command, Stdio};

/// Result of a pull: exit status plus the captured text.
///
/// The text is only ever inspected to tell "already current" apart from
/// "changes fetched"; everything else keys off `success`.
#[derive(Debug, Clone)]
pub struct PullOutput {
    pub success: bool,
    pub summary: String,
}

/// The abstract git-remote capability the reconciliation core consumes.
///
/// Every network or working-copy interaction goes through this trait so the
/// core stays testable with a fake and never parses raw subprocess output
/// itself.
pub trait GitRemote {
    /// Lightweight existence probe for a remote URL. Status only.
    fn probe(&self, url: &str) -> bool;

    /// Clone `url` into a working copy under `base`, named by git's own
    /// rule for the URL. The error text is for logging only.
    fn clone_into(&self, url: &str, base: &Path) -> Result<(), String>;

    /// Whether `dir` is a version-controlled working copy.
    fn is_tracked(&self, dir: &Path) -> bool;

    /// The first configured fetch remote URL of a tracked directory.
    fn fetch_url(&self, dir: &Path) -> Option<String>;

    /// Synchronize a tracked directory with its remote.
    fn pull(&self, dir: &Path) -> PullOutput;
}

/// `GitRemote` over the system `git` binary.
#[derive(Debug, Default)]
pub struct SystemGit;

impl SystemGit {
    /// Non-interactive git invocation. A missing or auth-gated remote must
    /// fail fast, never hang on a credential prompt.
    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes");
        cmd.stdin(Stdio::null());
        cmd
    }
}

impl GitRemote for SystemGit {
    fn probe(&self, url: &str) -> bool {
        self.command()
            .args(["ls-remote", "--exit-code", url, "HEAD"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn clone_into(&self, url: &str, base: &Path) -> Result<(), String> {
        let output = self
            .command()
            .arg("-C")
            .arg(base)
            .args(["clone", url])
            .output()
            .map_err(|err| format!("failed to run git clone: {err}"))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }

    fn is_tracked(&self, dir: &Path) -> bool {
        // rev-parse resolves upward through parent directories, so a plain
        // directory inside an enclosing repository would pass it. Require
        // the marker at this directory: only repo roots count as plugins.
        if !dir.join(".git").exists() {
            return false;
        }

        self.command()
            .arg("-C")
            .arg(dir)
            .args(["rev-parse", "--git-dir"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn fetch_url(&self, dir: &Path) -> Option<String> {
        // Same root guard as is_tracked: without it, git config resolves
        // against an enclosing repository and reports its remote.
        if !dir.join(".git").exists() {
            return None;
        }

        // Prefer origin; fall back to the first configured fetch remote.
        let origin = self
            .command()
            .arg("-C")
            .arg(dir)
            .args(["config", "--get", "remote.origin.url"])
            .output()
            .ok()?;

        if origin.status.success() {
            return first_line(&origin.stdout);
        }

        let remotes = self
            .command()
            .arg("-C")
            .arg(dir)
            .args(["remote"])
            .output()
            .ok()?;
        let first_remote = first_line(&remotes.stdout)?;

        let key = format!("remote.{first_remote}.url");
        let url = self
            .command()
            .arg("-C")
            .arg(dir)
            .args(["config", "--get", key.as_str()])
            .output()
            .ok()?;
        if url.status.success() {
            first_line(&url.stdout)
        } else {
            None
        }
    }

    fn pull(&self, dir: &Path) -> PullOutput {
        match self
            .command()
            .arg("-C")
            .arg(dir)
            .args(["pull", "--ff-only"])
            .output()
        {
            Ok(output) => {
                let success = output.status.success();
                // git reports pull errors on stderr; stdout carries the
                // up-to-date / fast-forward text the updater classifies.
                let summary = if success {
                    String::from_utf8_lossy(&output.stdout).trim().to_string()
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    if stderr.is_empty() {
                        String::from_utf8_lossy(&output.stdout).trim().to_string()
                    } else {
                        stderr
                    }
                };
                PullOutput { success, summary }
            }
            Err(err) => PullOutput {
                success: false,
                summary: format!("failed to run git pull: {err}"),
            },
        }
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn git_init(dir: &Path) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["init", "--quiet"])
            .status()
            .unwrap();
        assert!(status.success());
    }

    fn add_origin(dir: &Path, url: &str) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["remote", "add", "origin", url])
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn repo_root_is_tracked_with_its_own_remote() {
        let repo = tempfile::tempdir().unwrap();
        git_init(repo.path());
        add_origin(repo.path(), "https://host/dotfiles.git");

        let git = SystemGit;
        assert!(git.is_tracked(repo.path()));
        assert_eq!(
            git.fetch_url(repo.path()).as_deref(),
            Some("https://host/dotfiles.git")
        );
    }

    #[test]
    fn plain_subdir_of_enclosing_repo_is_not_tracked() {
        let repo = tempfile::tempdir().unwrap();
        git_init(repo.path());
        add_origin(repo.path(), "https://host/dotfiles.git");

        let plain = repo.path().join("bundle").join("plain-notes");
        fs::create_dir_all(&plain).unwrap();

        let git = SystemGit;
        assert!(!git.is_tracked(&plain));
        assert_eq!(git.fetch_url(&plain), None);
    }

    #[test]
    fn pull_failure_carries_error_text() {
        let repo = tempfile::tempdir().unwrap();
        git_init(repo.path());

        // No remote configured: the pull fails and git explains on stderr.
        let output = SystemGit.pull(repo.path());
        assert!(!output.success);
        assert!(!output.summary.is_empty());
    }
}
