use crate::pattern::PatternSet;
use crate::project::ProjectConfig;
use crate::scanner::FileRecord;

/// A scanned file together with the authoritative inclusion decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub record: FileRecord,
    pub included: bool,
}

/// Decide, for every scanned file, whether it is in scope for sync.
///
/// Decision order per file:
/// 1. outside every push root → excluded (the scanner already guarantees
///    this; re-checked here so the resolver stands on its own)
/// 2. any exclude pattern matches → excluded
/// 3. any include pattern matches → included
/// 4. otherwise → excluded (a file must be explicitly included to sync)
pub fn resolve(records: &[FileRecord], config: &ProjectConfig) -> Vec<ResolvedFile> {
    let includes = PatternSet::compile(&config.includes);
    let excludes = PatternSet::compile(&config.excludes);

    records
        .iter()
        .map(|record| ResolvedFile {
            record: record.clone(),
            included: is_included(&record.relative_path, config, &includes, &excludes),
        })
        .collect()
}

fn is_included(
    path: &str,
    config: &ProjectConfig,
    includes: &PatternSet,
    excludes: &PatternSet,
) -> bool {
    if !config.within_push_roots(path) {
        return false;
    }
    // An exclude always overrides an include for the same path.
    if excludes.is_match(path) {
        return false;
    }
    includes.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str) -> FileRecord {
        FileRecord {
            relative_path: path.to_string(),
            size_bytes: 1,
            fingerprint: format!("fp-{path}"),
        }
    }

    fn config(includes: &[&str], excludes: &[&str]) -> ProjectConfig {
        ProjectConfig {
            includes: includes.iter().map(|s| s.to_string()).collect(),
            excludes: excludes.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn included_paths(resolved: &[ResolvedFile]) -> Vec<&str> {
        resolved
            .iter()
            .filter(|f| f.included)
            .map(|f| f.record.relative_path.as_str())
            .collect()
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let records = vec![record("src/generated.py")];
        let config = config(&["src/**"], &["*generated*"]);

        let resolved = resolve(&records, &config);
        assert!(!resolved[0].included);
    }

    #[test]
    fn test_default_deny() {
        let records = vec![record("docs/readme.md")];
        // No excludes at all, but no include matches either
        let resolved = resolve(&records, &config(&["src/**"], &[]));
        assert!(!resolved[0].included);
    }

    #[test]
    fn test_include_match() {
        let records = vec![
            record("src/a.py"),
            record("src/b.py"),
            record("docs/readme.md"),
        ];
        let resolved = resolve(&records, &config(&["src/**"], &[]));
        assert_eq!(included_paths(&resolved), vec!["src/a.py", "src/b.py"]);
    }

    #[test]
    fn test_push_root_revalidated() {
        // A record outside the push roots must come out excluded even though
        // an include pattern matches it.
        let records = vec![record("vendor/lib.py"), record("src/a.py")];
        let config = ProjectConfig {
            includes: vec!["**/*.py".to_string()],
            push_roots: vec!["src".to_string()],
            ..Default::default()
        };

        let resolved = resolve(&records, &config);
        assert_eq!(included_paths(&resolved), vec!["src/a.py"]);
    }

    #[test]
    fn test_malformed_include_matches_nothing() {
        let records = vec![record("src/a.py")];
        let resolved = resolve(&records, &config(&["[broken"], &[]));
        assert!(!resolved[0].included);
    }

    #[test]
    fn test_excluded_files_still_present_in_output() {
        let records = vec![record("src/a.py"), record("docs/readme.md")];
        let resolved = resolve(&records, &config(&["src/**"], &[]));

        // Every scanned file appears in the output with its decision
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.iter().filter(|f| f.included).count(), 1);
    }
}
