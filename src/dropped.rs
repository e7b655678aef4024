use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::fingerprint::content_fingerprint;
use crate::scanner::FileRecord;

/// An externally provided file blob to match against the project's file
/// universe, e.g. one dragged onto the dashboard.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub name: String,
    pub fingerprint: String,
}

impl DroppedFile {
    /// Build a dropped file from raw content, fingerprinting it the same way
    /// the scanner fingerprints files on disk.
    pub fn from_content(name: impl Into<String>, content: &[u8]) -> Self {
        DroppedFile {
            name: name.into(),
            fingerprint: content_fingerprint(content),
        }
    }
}

/// The outcome for one dropped file. An unresolved file is an expected
/// result (the content simply is not in the tracked tree), never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropResolution {
    pub original_name: String,
    pub resolved: bool,
    pub matched_paths: Vec<String>,
}

/// Match dropped files against the scanned file universe by content
/// fingerprint. The whole universe is searched, included or not, and every
/// matching path is returned (identical content may exist at several paths).
pub fn resolve(dropped: &[DroppedFile], universe: &[FileRecord]) -> Vec<DropResolution> {
    let mut by_fingerprint: HashMap<&str, Vec<&str>> = HashMap::new();
    for record in universe {
        by_fingerprint
            .entry(record.fingerprint.as_str())
            .or_default()
            .push(record.relative_path.as_str());
    }

    dropped
        .iter()
        .map(|file| {
            let mut matched_paths: Vec<String> = by_fingerprint
                .get(file.fingerprint.as_str())
                .map(|paths| paths.iter().map(|p| p.to_string()).collect())
                .unwrap_or_default();
            matched_paths.sort();

            DropResolution {
                original_name: file.name.clone(),
                resolved: !matched_paths.is_empty(),
                matched_paths,
            }
        })
        .collect()
}

/// Wire format of the dropped-file resolution endpoint: a list of blobs in,
/// a success envelope with per-file results out.
#[derive(Debug, Clone, Deserialize)]
pub struct DroppedFilePayload {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResponse {
    pub success: bool,
    pub results: Vec<ResolutionResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    pub resolved: bool,
    pub paths: Vec<String>,
}

/// Handle a dropped-file resolution request end to end.
pub fn resolve_payload(payload: &[DroppedFilePayload], universe: &[FileRecord]) -> ResolutionResponse {
    let dropped: Vec<DroppedFile> = payload
        .iter()
        .map(|p| DroppedFile::from_content(p.name.clone(), p.content.as_bytes()))
        .collect();

    let results = resolve(&dropped, universe)
        .into_iter()
        .map(|r| ResolutionResult {
            resolved: r.resolved,
            paths: r.matched_paths,
        })
        .collect();

    ResolutionResponse {
        success: true,
        results,
    }
}
