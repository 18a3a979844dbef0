use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::SyncError;

/// One declared plugin source. `name` is always derived from the URL,
/// never user-supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSpec {
    pub name: String,
    pub source_url: String,
}

/// A registry line whose URL does not yield a usable plugin name.
/// Recorded as a data error; the rest of the registry still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSource {
    pub line: usize,
    pub source_url: String,
}

/// The declared-source list, loaded fresh from disk on every call.
#[derive(Debug, Default)]
pub struct Registry {
    /// Sorted ascending by name. Duplicate URLs stay as distinct specs.
    pub specs: Vec<PluginSpec>,
    pub malformed: Vec<MalformedSource>,
}

/// Canonical plugin name for a repository URL: the last path segment,
/// truncated at the first `.`, capitalized. Pure and deterministic.
///
/// Returns `None` when the result would be empty (trailing slash, bare
/// `.git` segment); callers treat that as a malformed source.
pub fn derive_name(url: &str) -> Option<String> {
    let segment = url.rsplit('/').next().unwrap_or(url);
    let stem = segment.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        None
    } else {
        Some(capitalize(stem))
    }
}

/// The directory `git clone` would create for a URL: the last path segment
/// with only a trailing `.git` removed. Distinct from `derive_name`: the
/// name truncates at the first dot and is capitalized, the clone dir is
/// not (`Foo.Bar.git` has name `Foo` but clone dir `Foo.Bar`).
pub fn clone_dir_name(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let dir = segment.strip_suffix(".git").unwrap_or(segment);
    if dir.is_empty() {
        None
    } else {
        Some(dir.to_string())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Read the declared-source file: one URL per line, blank lines ignored.
///
/// A missing file is a valid "no plugins declared" state and yields an
/// empty registry; any other read failure is structural.
pub fn load_registry(path: &Path) -> Result<Registry, SyncError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Registry::default()),
        Err(err) => {
            return Err(SyncError::RegistryUnreadable {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    let mut registry = Registry::default();
    for (index, line) in raw.lines().enumerate() {
        let url = line.trim();
        if url.is_empty() {
            continue;
        }

        match derive_name(url) {
            Some(name) => registry.specs.push(PluginSpec {
                name,
                source_url: url.to_string(),
            }),
            None => {
                tracing::warn!("registry line {} has no usable name: {url}", index + 1);
                registry.malformed.push(MalformedSource {
                    line: index + 1,
                    source_url: url.to_string(),
                });
            }
        }
    }

    // Stable sort keeps duplicate URLs in file order.
    registry.specs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn derive_name_is_deterministic() {
        let url = "https://host/user/some-plugin.git";
        assert_eq!(derive_name(url), derive_name(url));
    }

    #[test]
    fn derive_name_truncates_at_first_dot() {
        assert_eq!(derive_name("https://host/user/Foo.Bar.git").as_deref(), Some("Foo"));
    }

    #[test]
    fn derive_name_capitalizes_plain_segment() {
        assert_eq!(derive_name("https://host/user/plugin").as_deref(), Some("Plugin"));
    }

    #[test]
    fn derive_name_lowercases_the_rest() {
        assert_eq!(derive_name("https://host/u/NERDTree.git").as_deref(), Some("Nerdtree"));
    }

    #[test]
    fn derive_name_without_slash_uses_whole_string() {
        assert_eq!(derive_name("standalone").as_deref(), Some("Standalone"));
    }

    #[test]
    fn derive_name_rejects_empty_segment() {
        assert_eq!(derive_name("https://host/user/"), None);
        assert_eq!(derive_name("https://host/user/.git"), None);
        assert_eq!(derive_name(""), None);
    }

    #[test]
    fn clone_dir_keeps_inner_dots() {
        assert_eq!(
            clone_dir_name("https://host/user/Foo.Bar.git").as_deref(),
            Some("Foo.Bar")
        );
    }

    #[test]
    fn clone_dir_strips_trailing_slash() {
        assert_eq!(
            clone_dir_name("https://host/user/repo.git/").as_deref(),
            Some("repo")
        );
    }

    #[test]
    fn clone_dir_differs_from_name() {
        let url = "https://host/user/vim-surround.git";
        assert_eq!(derive_name(url).as_deref(), Some("Vim-surround"));
        assert_eq!(clone_dir_name(url).as_deref(), Some("vim-surround"));
    }

    #[test]
    fn load_sorts_by_derived_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos");
        fs::write(&path, "https://host/u/b-repo\nhttps://host/u/a-repo\n").unwrap();

        let registry = load_registry(&path).unwrap();
        let names: Vec<&str> = registry.specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A-repo", "B-repo"]);
        assert!(registry.malformed.is_empty());
    }

    #[test]
    fn load_missing_file_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = load_registry(&dir.path().join("absent")).unwrap();
        assert!(registry.specs.is_empty());
        assert!(registry.malformed.is_empty());
    }

    #[test]
    fn load_keeps_duplicate_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos");
        fs::write(&path, "https://host/u/repo.git\nhttps://host/u/repo.git\n").unwrap();

        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.specs.len(), 2);
        assert_eq!(registry.specs[0], registry.specs[1]);
    }

    #[test]
    fn load_records_malformed_lines_and_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos");
        fs::write(&path, "https://host/u/good.git\nhttps://host/u/\n").unwrap();

        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.specs.len(), 1);
        assert_eq!(registry.malformed.len(), 1);
        assert_eq!(registry.malformed[0].line, 2);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_a_structural_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos");
        fs::write(&path, "https://host/u/repo.git\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits don't apply to root.
        if fs::read_to_string(&path).is_ok() {
            return;
        }

        let err = load_registry(&path).unwrap_err();
        assert!(matches!(err, SyncError::RegistryUnreadable { .. }));
    }

    #[test]
    fn load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos");
        fs::write(&path, "\nhttps://host/u/one.git\n\n").unwrap();

        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.specs.len(), 1);
    }
}
