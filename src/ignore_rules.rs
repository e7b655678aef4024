use std::fs;
use std::path::Path;

use crate::pattern::Pattern;

/// Ignore file names recognized during a scan, in evaluation order.
pub const IGNORE_FILE_NAMES: &[&str] = &[".gitignore", ".claudeignore"];

/// One rule from an ignore file. `!` prefixed rules re-include a path that an
/// earlier rule ignored.
#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: Pattern,
    negated: bool,
}

/// The parsed rules of a single `.gitignore`/`.claudeignore` file, tied to
/// the directory it was found in (relative to the scan root, "" for the root
/// itself). Rules are matched against paths relative to that directory.
#[derive(Debug, Clone)]
pub struct IgnoreFile {
    base: String,
    rules: Vec<IgnoreRule>,
}

impl IgnoreFile {
    /// Parse ignore-file content. Blank lines and `#` comments are skipped;
    /// malformed rule globs are dropped with a warning.
    pub fn parse(base: &str, content: &str) -> Self {
        let mut rules = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (raw, negated) = match line.strip_prefix('!') {
                Some(rest) => (rest, true),
                None => (line, false),
            };

            match Pattern::new(raw) {
                Ok(pattern) => rules.push(IgnoreRule { pattern, negated }),
                Err(e) => {
                    log::warn!("skipping malformed ignore rule {raw:?} in {base:?}: {e}");
                }
            }
        }

        IgnoreFile {
            base: base.to_string(),
            rules,
        }
    }

    /// Load all recognized ignore files in `dir`, nearest-last order.
    pub fn load_dir(dir: &Path, base: &str) -> Vec<IgnoreFile> {
        let mut files = Vec::new();
        for name in IGNORE_FILE_NAMES {
            let path = dir.join(name);
            match fs::read_to_string(&path) {
                Ok(content) => files.push(IgnoreFile::parse(base, &content)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("could not read {}: {e}", path.display()),
            }
        }
        files
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Decide this file's verdict for a path relative to its own directory.
    /// The last matching rule wins. `None` means no rule matched.
    fn decide(&self, rel_to_base: &str) -> Option<bool> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.pattern.matches(rel_to_base))
            .map(|rule| !rule.negated)
    }
}

/// The chain of ignore files from the scan root down to the directory
/// currently being walked. Nearest file wins; within a file the last matching
/// rule wins.
#[derive(Debug, Clone, Default)]
pub struct IgnoreStack {
    files: Vec<IgnoreFile>,
}

impl IgnoreStack {
    pub fn push(&mut self, file: IgnoreFile) {
        self.files.push(file);
    }

    /// Drop ignore files that do not apply to `dir` (relative to the scan
    /// root). Called when the walk moves out of a subtree.
    pub fn retain_ancestors_of(&mut self, dir: &str) {
        self.files
            .retain(|f| f.base.is_empty() || dir == f.base || dir.starts_with(&format!("{}/", f.base)));
    }

    /// Test a scan-root-relative path against the stack.
    pub fn is_ignored(&self, path: &str) -> bool {
        for file in self.files.iter().rev() {
            let rel = if file.base.is_empty() {
                path
            } else if let Some(rest) = path.strip_prefix(&format!("{}/", file.base)) {
                rest
            } else {
                continue;
            };

            if let Some(verdict) = file.decide(rel) {
                return verdict;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_from(base: &str, content: &str) -> IgnoreStack {
        let mut stack = IgnoreStack::default();
        stack.push(IgnoreFile::parse(base, content));
        stack
    }

    #[test]
    fn test_basic_ignore() {
        let stack = stack_from("", "*.log\ntarget/\n");
        assert!(stack.is_ignored("debug.log"));
        assert!(stack.is_ignored("deep/nested/debug.log"));
        assert!(stack.is_ignored("target/release/app"));
        assert!(!stack.is_ignored("src/main.rs"));
    }

    #[test]
    fn test_negation_reincludes() {
        let stack = stack_from("", "*.log\n!important.log\n");
        assert!(stack.is_ignored("debug.log"));
        assert!(!stack.is_ignored("important.log"));
    }

    #[test]
    fn test_last_rule_wins_within_file() {
        let stack = stack_from("", "!keep.tmp\n*.tmp\n");
        // The later *.tmp rule overrides the earlier negation
        assert!(stack.is_ignored("keep.tmp"));
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let stack = stack_from("", "# comment\n\n*.bak\n");
        assert!(stack.is_ignored("old.bak"));
        assert!(!stack.is_ignored("# comment"));
    }

    #[test]
    fn test_nested_file_scoped_to_its_directory() {
        let mut stack = IgnoreStack::default();
        stack.push(IgnoreFile::parse("", "*.log\n"));
        stack.push(IgnoreFile::parse("sub", "*.tmp\n"));

        // Nested rules apply only below their directory
        assert!(stack.is_ignored("sub/x.tmp"));
        assert!(!stack.is_ignored("x.tmp"));
        // Root rules still apply inside the subtree
        assert!(stack.is_ignored("sub/x.log"));
    }

    #[test]
    fn test_nearest_file_wins() {
        let mut stack = IgnoreStack::default();
        stack.push(IgnoreFile::parse("", "*.log\n"));
        stack.push(IgnoreFile::parse("sub", "!debug.log\n"));

        assert!(stack.is_ignored("debug.log"));
        assert!(!stack.is_ignored("sub/debug.log"));
    }

    #[test]
    fn test_retain_ancestors() {
        let mut stack = IgnoreStack::default();
        stack.push(IgnoreFile::parse("", "*.log\n"));
        stack.push(IgnoreFile::parse("a/b", "*.tmp\n"));

        stack.retain_ancestors_of("a/b/c");
        assert!(stack.is_ignored("a/b/c/x.tmp"));

        stack.retain_ancestors_of("other");
        assert!(!stack.is_ignored("other/x.tmp"));
        assert!(stack.is_ignored("other/x.log"));
    }

    #[test]
    fn test_malformed_rule_dropped() {
        let stack = stack_from("", "[broken\n*.log\n");
        assert!(stack.is_ignored("a.log"));
        assert!(!stack.is_ignored("[broken"));
    }
}
