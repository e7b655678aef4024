use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::selection::ResolvedFile;

/// Snapshot of what the remote project currently holds: relative path →
/// content fingerprint. Supplied by the API-client layer; read-only here.
/// Ordered so plans are stable across runs.
pub type RemoteFileIndex = BTreeMap<String, String>;

/// Sync direction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Local is the source of truth; remote-only files are slated for
    /// deletion.
    OneWay,
    /// Remote-only files are preserved and reported as remote additions.
    TwoWay,
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-way" => Ok(SyncMode::OneWay),
            "two-way" => Ok(SyncMode::TwoWay),
            other => Err(format!(
                "invalid sync mode {other:?} (expected \"one-way\" or \"two-way\")"
            )),
        }
    }
}

/// A single step of a sync plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum SyncOperation {
    Upload { path: String, fingerprint: String },
    Delete { path: String },
    Noop { path: String },
}

impl SyncOperation {
    pub fn path(&self) -> &str {
        match self {
            SyncOperation::Upload { path, .. }
            | SyncOperation::Delete { path }
            | SyncOperation::Noop { path } => path,
        }
    }
}

/// The planner's output: an ordered operation list, plus (in two-way mode)
/// the remote-only paths left for the sync-application layer to reconcile.
///
/// The plan only classifies. Deletions in particular are destructive and must
/// be confirmed upstream before anything acts on them; [`deletions`]
/// (SyncPlan::deletions) exists so callers can surface them explicitly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncPlan {
    pub operations: Vec<SyncOperation>,
    pub remote_additions: Vec<String>,
}

impl SyncPlan {
    pub fn uploads(&self) -> impl Iterator<Item = &SyncOperation> {
        self.operations
            .iter()
            .filter(|op| matches!(op, SyncOperation::Upload { .. }))
    }

    pub fn deletions(&self) -> impl Iterator<Item = &SyncOperation> {
        self.operations
            .iter()
            .filter(|op| matches!(op, SyncOperation::Delete { .. }))
    }

    pub fn noops(&self) -> impl Iterator<Item = &SyncOperation> {
        self.operations
            .iter()
            .filter(|op| matches!(op, SyncOperation::Noop { .. }))
    }

    /// True when nothing would change on either side.
    pub fn is_settled(&self) -> bool {
        self.operations
            .iter()
            .all(|op| matches!(op, SyncOperation::Noop { .. }))
    }
}

/// Diff the selected local files against the remote index.
///
/// Local files in path order: missing remotely or fingerprint mismatch →
/// `Upload`, fingerprint match → `Noop`. Remote-only paths follow in path
/// order: `Delete` in one-way mode, reported untouched in two-way mode. An
/// empty remote index is the normal first-sync state, not an error: every
/// selected file uploads.
pub fn plan(resolved: &[ResolvedFile], remote: &RemoteFileIndex, mode: SyncMode) -> SyncPlan {
    let mut local: Vec<&ResolvedFile> = resolved.iter().filter(|f| f.included).collect();
    local.sort_by(|a, b| a.record.relative_path.cmp(&b.record.relative_path));

    let mut plan = SyncPlan::default();

    for file in &local {
        let path = &file.record.relative_path;
        match remote.get(path) {
            Some(fingerprint) if *fingerprint == file.record.fingerprint => {
                plan.operations.push(SyncOperation::Noop { path: path.clone() });
            }
            _ => plan.operations.push(SyncOperation::Upload {
                path: path.clone(),
                fingerprint: file.record.fingerprint.clone(),
            }),
        }
    }

    let local_paths: std::collections::BTreeSet<&str> = local
        .iter()
        .map(|f| f.record.relative_path.as_str())
        .collect();

    for path in remote.keys() {
        if !local_paths.contains(path.as_str()) {
            match mode {
                SyncMode::OneWay => plan
                    .operations
                    .push(SyncOperation::Delete { path: path.clone() }),
                SyncMode::TwoWay => plan.remote_additions.push(path.clone()),
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FileRecord;

    fn resolved(path: &str, fingerprint: &str, included: bool) -> ResolvedFile {
        ResolvedFile {
            record: FileRecord {
                relative_path: path.to_string(),
                size_bytes: 1,
                fingerprint: fingerprint.to_string(),
            },
            included,
        }
    }

    fn remote(entries: &[(&str, &str)]) -> RemoteFileIndex {
        entries
            .iter()
            .map(|(p, f)| (p.to_string(), f.to_string()))
            .collect()
    }

    #[test]
    fn test_one_way_noop_upload_delete_order() {
        let local = vec![
            resolved("src/a.py", "h1", true),
            resolved("src/b.py", "h2", true),
        ];
        let remote = remote(&[("src/a.py", "h1"), ("src/old.py", "hX")]);

        let plan = plan(&local, &remote, SyncMode::OneWay);
        assert_eq!(
            plan.operations,
            vec![
                SyncOperation::Noop {
                    path: "src/a.py".to_string()
                },
                SyncOperation::Upload {
                    path: "src/b.py".to_string(),
                    fingerprint: "h2".to_string()
                },
                SyncOperation::Delete {
                    path: "src/old.py".to_string()
                },
            ]
        );
        assert!(plan.remote_additions.is_empty());
    }

    #[test]
    fn test_two_way_preserves_remote_only() {
        let local = vec![resolved("a.py", "h1", true)];
        let remote = remote(&[("a.py", "h1"), ("remote-only.py", "hR")]);

        let plan = plan(&local, &remote, SyncMode::TwoWay);
        assert!(plan.deletions().next().is_none());
        assert_eq!(plan.remote_additions, vec!["remote-only.py"]);
        assert!(plan.is_settled());
    }

    #[test]
    fn test_changed_fingerprint_uploads() {
        let local = vec![resolved("a.py", "h2", true)];
        let remote = remote(&[("a.py", "h1")]);

        let plan = plan(&local, &remote, SyncMode::OneWay);
        assert_eq!(
            plan.operations,
            vec![SyncOperation::Upload {
                path: "a.py".to_string(),
                fingerprint: "h2".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_remote_is_first_sync() {
        let local = vec![resolved("a.py", "h1", true), resolved("b.py", "h2", true)];
        let plan = plan(&local, &RemoteFileIndex::new(), SyncMode::OneWay);

        assert_eq!(plan.uploads().count(), 2);
        assert_eq!(plan.deletions().count(), 0);
    }

    #[test]
    fn test_excluded_files_never_planned() {
        let local = vec![
            resolved("a.py", "h1", true),
            resolved("secret.env", "hS", false),
        ];
        let plan = plan(&local, &RemoteFileIndex::new(), SyncMode::OneWay);

        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].path(), "a.py");
    }

    #[test]
    fn test_excluded_local_counterpart_deletes_in_one_way() {
        // A file excluded locally but present remotely is remote-only from
        // the planner's point of view.
        let local = vec![resolved("secret.env", "hS", false)];
        let remote = remote(&[("secret.env", "hS")]);

        let plan = plan(&local, &remote, SyncMode::OneWay);
        assert_eq!(
            plan.operations,
            vec![SyncOperation::Delete {
                path: "secret.env".to_string()
            }]
        );
    }

    #[test]
    fn test_plan_is_stable() {
        let local = vec![
            resolved("b.py", "h2", true),
            resolved("a.py", "h1", true),
        ];
        let remote = remote(&[("a.py", "h1"), ("b.py", "h2"), ("c.py", "h3")]);

        let first = plan(&local, &remote, SyncMode::OneWay);
        let second = plan(&local, &remote, SyncMode::OneWay);
        assert_eq!(first.operations, second.operations);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("one-way".parse::<SyncMode>().unwrap(), SyncMode::OneWay);
        assert_eq!("two-way".parse::<SyncMode>().unwrap(), SyncMode::TwoWay);
        assert!("sideways".parse::<SyncMode>().is_err());
    }
}
