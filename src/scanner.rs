use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::fingerprint::content_fingerprint;
use crate::ignore_rules::{IgnoreFile, IgnoreStack};
use crate::project::{drop_nested_roots, normalize_root, ProjectConfig, PROJECT_STATE_DIR};

/// Directories never walked, regardless of ignore-file settings.
const ALWAYS_SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn", PROJECT_STATE_DIR];

/// One file found during a scan. Discarded after each scan cycle; identity
/// across scans is path + fingerprint only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// `/`-separated path relative to the project root
    pub relative_path: String,
    pub size_bytes: u64,
    pub fingerprint: String,
}

/// A non-fatal problem encountered during a scan. The scan continues; the
/// caller decides whether to surface these.
#[derive(Debug, Clone)]
pub struct ScanWarning {
    pub path: String,
    pub message: String,
}

/// Result of a full scan pass.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub files: Vec<FileRecord>,
    pub warnings: Vec<ScanWarning>,
}

/// Walks a project tree and produces [`FileRecord`]s for every candidate
/// file.
///
/// Each [`scan`](Scanner::scan) call re-walks from scratch; the scanner holds
/// no state between calls. Walk order is lexicographic per directory, so two
/// scans of an unchanged tree produce identical output. Push roots are a hard
/// gate: with a non-empty set, only those subtrees are visited at all.
/// Symbolic links are never followed.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    push_roots: Vec<String>,
    use_ignore_files: bool,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Scanner {
            root: root.into(),
            push_roots: Vec::new(),
            use_ignore_files: true,
        }
    }

    /// Scanner configured from a project config (push roots + ignore-file
    /// setting).
    pub fn for_project(root: impl Into<PathBuf>, config: &ProjectConfig) -> Self {
        Scanner::new(root)
            .with_push_roots(&config.push_roots)
            .with_ignore_files(config.use_ignore_files)
    }

    pub fn with_push_roots(mut self, roots: &[String]) -> Self {
        let mut roots: Vec<String> = roots.iter().map(|r| normalize_root(r)).collect();
        roots.retain(|r| !r.is_empty());
        roots.sort();
        roots.dedup();
        // A root nested under another would emit its files twice.
        self.push_roots = drop_nested_roots(roots);
        self
    }

    pub fn with_ignore_files(mut self, enabled: bool) -> Self {
        self.use_ignore_files = enabled;
        self
    }

    /// Walk the tree and fingerprint every candidate file.
    pub fn scan(&self) -> Result<ScanOutcome> {
        let mut outcome = ScanOutcome::default();

        if self.push_roots.is_empty() {
            self.scan_base("", &mut outcome);
        } else {
            for base in &self.push_roots {
                self.scan_base(base, &mut outcome);
            }
        }

        Ok(outcome)
    }

    fn scan_base(&self, base: &str, outcome: &mut ScanOutcome) {
        let base_dir = if base.is_empty() {
            self.root.clone()
        } else {
            self.root.join(base)
        };

        // A configured push root missing on disk contributes an empty
        // subtree, not an error.
        if !base_dir.exists() {
            log::debug!("push root {base:?} does not exist, skipping");
            return;
        }

        let mut stack = IgnoreStack::default();
        if self.use_ignore_files {
            for ancestor in ancestors_of(base) {
                let dir = if ancestor.is_empty() {
                    self.root.clone()
                } else {
                    self.root.join(&ancestor)
                };
                for file in IgnoreFile::load_dir(&dir, &ancestor) {
                    stack.push(file);
                }
            }
            if !base.is_empty() && stack.is_ignored(base) {
                log::debug!("push root {base:?} is ignored, skipping");
                return;
            }
        }

        let mut it = WalkDir::new(&base_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = it.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| self.relative(p))
                        .unwrap_or_default();
                    log::warn!("scan error at {path:?}: {e}");
                    outcome.warnings.push(ScanWarning {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let rel = self.relative(entry.path());

            if entry.file_type().is_dir() {
                if entry.depth() == 0 {
                    if self.use_ignore_files {
                        for file in IgnoreFile::load_dir(entry.path(), &rel) {
                            stack.push(file);
                        }
                    }
                    continue;
                }

                let name = entry.file_name().to_string_lossy();
                if ALWAYS_SKIP_DIRS.contains(&name.as_ref()) {
                    it.skip_current_dir();
                    continue;
                }

                if self.use_ignore_files {
                    stack.retain_ancestors_of(parent_of(&rel));
                    if stack.is_ignored(&rel) {
                        it.skip_current_dir();
                        continue;
                    }
                    for file in IgnoreFile::load_dir(entry.path(), &rel) {
                        stack.push(file);
                    }
                }
                continue;
            }

            // Symlinks and other non-regular entries are never emitted.
            if !entry.file_type().is_file() {
                continue;
            }

            if self.use_ignore_files {
                stack.retain_ancestors_of(parent_of(&rel));
                if stack.is_ignored(&rel) {
                    continue;
                }
            }

            match fs::read(entry.path()) {
                Ok(bytes) => outcome.files.push(FileRecord {
                    relative_path: rel,
                    size_bytes: bytes.len() as u64,
                    fingerprint: content_fingerprint(&bytes),
                }),
                Err(e) => {
                    log::warn!("skipping unreadable file {rel:?}: {e}");
                    outcome.warnings.push(ScanWarning {
                        path: rel,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Strict ancestors of a root-relative directory, outermost first. For
/// `"a/b/c"` this yields `""`, `"a"`, `"a/b"`; the root itself has none.
fn ancestors_of(base: &str) -> Vec<String> {
    if base.is_empty() {
        return Vec::new();
    }
    let mut ancestors = vec![String::new()];
    let mut prefix = String::new();
    let segments: Vec<&str> = base.split('/').collect();
    for segment in &segments[..segments.len() - 1] {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(segment);
        ancestors.push(prefix.clone());
    }
    ancestors
}

fn parent_of(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(idx) => &rel[..idx],
        None => "",
    }
}
