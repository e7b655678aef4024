use globset::{GlobBuilder, GlobMatcher};

/// Normalize a pattern string for comparison and matching: trim surrounding
/// whitespace and use `/` as the separator regardless of host OS.
pub fn normalize_pattern(raw: &str) -> String {
    raw.trim().replace('\\', "/")
}

/// A single gitignore-style glob pattern, compiled for repeated matching.
///
/// Supported syntax:
/// - `*` matches within a path segment, `**` matches across segments
/// - a leading `/` (or any interior `/`) anchors the pattern to the project
///   root; patterns without a separator match in any directory
/// - a trailing `/` restricts the pattern to directories
/// - a pattern matching a directory matches every file below it
///
/// Matching is case-sensitive and operates on `/`-separated relative paths.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    matchers: Vec<GlobMatcher>,
}

impl Pattern {
    /// Compile a pattern. Fails if the glob syntax is malformed. An empty
    /// pattern matches nothing.
    pub fn new(raw: &str) -> Result<Self, globset::Error> {
        let source = normalize_pattern(raw);
        if source.trim_matches('/').is_empty() {
            return Ok(Pattern {
                source,
                matchers: Vec::new(),
            });
        }

        let dir_only = source.ends_with('/');
        let trimmed = source.trim_matches('/');
        let anchored = source.starts_with('/') || trimmed.contains('/');

        let mut globs = Vec::new();
        let base = if anchored {
            trimmed.to_string()
        } else {
            format!("**/{trimmed}")
        };
        if !dir_only {
            globs.push(base.clone());
        }
        // A directory match covers everything beneath it.
        if !base.ends_with("**") {
            globs.push(format!("{base}/**"));
        }

        let mut matchers = Vec::with_capacity(globs.len());
        for glob in &globs {
            let matcher = GlobBuilder::new(glob)
                .literal_separator(true)
                .build()?
                .compile_matcher();
            matchers.push(matcher);
        }

        Ok(Pattern { source, matchers })
    }

    /// The normalized pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Test a `/`-separated relative path against the pattern.
    pub fn matches(&self, relative_path: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(relative_path))
    }
}

/// An ordered collection of patterns compiled together.
///
/// Patterns that fail to compile are dropped (they match nothing) and the
/// failure is recorded as a warning rather than an error, so one bad pattern
/// in a config never aborts a scan.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    warnings: Vec<String>,
}

impl PatternSet {
    pub fn compile(sources: &[String]) -> Self {
        let mut patterns = Vec::with_capacity(sources.len());
        let mut warnings = Vec::new();

        for raw in sources {
            match Pattern::new(raw) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => {
                    let warning = format!("ignoring malformed pattern {raw:?}: {e}");
                    log::warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        PatternSet { patterns, warnings }
    }

    pub fn is_match(&self, relative_path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(relative_path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Warnings accumulated while compiling (one per malformed pattern).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
