//! # claudesync
//!
//! A command-line tool for synchronizing a local file tree with a Claude.ai
//! project knowledge base.
//!
//! ## Overview
//!
//! `claudesync` decides which files of a project are in scope for sync,
//! fingerprints their content, diffs that set against what the remote project
//! currently holds, and produces a minimal plan of upload/delete operations
//! plus a hierarchical size/inclusion tree for visualization. Network
//! transport is deliberately outside this crate: the remote file index comes
//! in as data, and the plan goes out as data.
//!
//! ## Key Features
//!
//! - **Selection engine**: gitignore-style include/exclude patterns with
//!   exclude-wins precedence and default-deny semantics
//! - **Push roots**: hard scope boundaries that gate the scan itself
//! - **Ignore files**: `.gitignore`/`.claudeignore` rules composed per
//!   directory, nearest file wins
//! - **Stable diffs**: deterministic walk order and content fingerprints make
//!   repeated plans over an unchanged tree identical
//! - **Incremental config edits**: idempotent single-pattern add/remove that
//!   never mutates a config in place
//! - **Cross-platform**: Linux, macOS, and Windows with platform-specific
//!   config directories
//!
//! ## Architecture
//!
//! The engine is a straight pipeline: [`scanner`] → [`selection`] →
//! [`tree`] (visualization) and [`planner`] (push). [`editor`] produces the
//! next config snapshot for the next pass; [`dropped`] searches the scanned
//! universe by content fingerprint.

/// Platform-agnostic configuration directory management for claudesync.
///
/// Provides utilities for locating the configuration directory and log file
/// following platform conventions (XDG on Linux, Application Support on
/// macOS, AppData on Windows).
pub mod config;

/// Externally provided ("dropped") file resolution.
///
/// Matches file blobs against the scanned file universe by content
/// fingerprint so a user can turn dragged-in files into include patterns.
/// Also defines the JSON request/response types of the resolution endpoint.
pub mod dropped;

/// Incremental project-config edits.
///
/// Applies single add/remove include/exclude pattern actions, producing a new
/// immutable config value. Edits are idempotent and normalize pattern
/// spelling before comparison, so duplicates never accumulate.
pub mod editor;

/// Content fingerprinting.
///
/// Deterministic SHA-256 digests over line-ending-normalized content, so the
/// same file fingerprints identically across operating systems and a
/// fingerprint match means "identical content" regardless of path.
pub mod fingerprint;

/// Ignore-file parsing and evaluation.
///
/// Models `.gitignore`/`.claudeignore` files as ordered rule lists with `!`
/// negation support, and composes the chain of files from the scan root down
/// to the current directory (nearest file wins).
pub mod ignore_rules;

/// Logging configuration and utilities.
///
/// Sets up dual logging to both console (configurable via `RUST_LOG`) and a
/// persistent log file in the config directory. Includes automatic log
/// rotation when files exceed size limits.
pub mod logger;

/// Glob pattern matching with gitignore-compatible semantics.
///
/// `*` within a segment, `**` across segments, leading `/` anchoring,
/// trailing `/` for directory-only patterns. Malformed patterns match
/// nothing and surface as warnings, never as errors.
pub mod pattern;

/// Sync diff planning.
///
/// Compares selected local fingerprints against the remote file index and
/// emits an ordered Upload/Delete/Noop operation list. One-way mode slates
/// remote-only files for deletion; two-way mode reports them untouched.
pub mod planner;

/// Project configuration model and persistence.
///
/// The immutable [`project::ProjectConfig`] value consumed by the selection
/// engine, with load-boundary validation and normalization of patterns and
/// push roots. Persisted as JSON under the project's `.claudesync` directory.
pub mod project;

/// Directory tree scanning.
///
/// Walks the project tree in deterministic order, applies push roots and
/// ignore files, and yields size + fingerprint records for every candidate
/// file. Non-fatal problems (unreadable files) come back as scan warnings.
pub mod scanner;

/// Selection resolution.
///
/// Combines scanner output with the project's include/exclude patterns into
/// the authoritative included/excluded decision per file: push-root gate,
/// then excludes (which always win), then includes, then default-deny.
pub mod selection;

/// Tree aggregation for visualization.
///
/// Folds the resolved file list into a directory tree with per-node
/// aggregated size and Included/Excluded/Partial status, plus the flattened
/// parallel-array form consumed by the plotting layer.
pub mod tree;
