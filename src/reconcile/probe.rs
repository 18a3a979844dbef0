use crate::git::GitRemote;
use crate::registry::PluginSpec;

/// Declared sources partitioned by reachability. Both sides preserve the
/// relative input order.
#[derive(Debug, Default)]
pub struct Partition {
    pub ok: Vec<PluginSpec>,
    pub failed: Vec<PluginSpec>,
}

/// Probe every spec, strictly in input order, one at a time.
///
/// The observer fires after each probe so progress can be reported
/// positionally ("item 3 of N") before the next probe starts.
pub fn check_all<G: GitRemote>(
    git: &G,
    specs: &[PluginSpec],
    mut observe: impl FnMut(usize, &PluginSpec, bool),
) -> Partition {
    let mut partition = Partition::default();

    for (index, spec) in specs.iter().enumerate() {
        let reachable = git.probe(&spec.source_url);
        if reachable {
            partition.ok.push(spec.clone());
        } else {
            tracing::info!("unreachable source: {}", spec.source_url);
            partition.failed.push(spec.clone());
        }
        observe(index, spec, reachable);
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fake::FakeGit;

    fn spec(name: &str, url: &str) -> PluginSpec {
        PluginSpec {
            name: name.to_string(),
            source_url: url.to_string(),
        }
    }

    #[test]
    fn partitions_and_preserves_order() {
        let mut git = FakeGit::default();
        git.unreachable.insert("https://x/b.git".to_string());

        let specs = vec![
            spec("A", "https://x/a.git"),
            spec("B", "https://x/b.git"),
            spec("C", "https://x/c.git"),
        ];

        let partition = check_all(&git, &specs, |_, _, _| {});
        assert_eq!(partition.ok.len() + partition.failed.len(), specs.len());

        let ok: Vec<&str> = partition.ok.iter().map(|s| s.name.as_str()).collect();
        let failed: Vec<&str> = partition.failed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(ok, ["A", "C"]);
        assert_eq!(failed, ["B"]);
    }

    #[test]
    fn probes_in_input_order() {
        let git = FakeGit::default();
        let specs = vec![spec("B", "https://x/b.git"), spec("A", "https://x/a.git")];

        let mut seen = Vec::new();
        check_all(&git, &specs, |index, spec, reachable| {
            seen.push((index, spec.name.clone(), reachable));
        });

        assert_eq!(
            git.probe_calls.borrow().as_slice(),
            ["https://x/b.git", "https://x/a.git"]
        );
        assert_eq!(seen[0], (0, "B".to_string(), true));
        assert_eq!(seen[1], (1, "A".to_string(), true));
    }

    #[test]
    fn empty_input_yields_empty_partition() {
        let git = FakeGit::default();
        let partition = check_all(&git, &[], |_, _, _| {});
        assert!(partition.ok.is_empty());
        assert!(partition.failed.is_empty());
    }
}
