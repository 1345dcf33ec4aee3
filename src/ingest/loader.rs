//! Manifest file discovery and decoding
//!
//! Turns export files into normalized resources. Each file is decoded and
//! normalized independently on the rayon pool; results are joined back in
//! input order so a run over the same files is reproducible.

use super::normalize::Normalizer;
use crate::error::{GraphError, GraphResult};
use crate::models::{NormalizedResource, ParseStats};
use crate::services::CancellationFlag;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions picked up when walking a directory
const MANIFEST_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Normalized output of a set of files
#[derive(Debug, Default)]
pub struct LoadedResources {
    pub resources: Vec<NormalizedResource>,
    pub stats: ParseStats,
    pub files: usize,
}

/// Expand the given paths into manifest files.
///
/// Files are taken as-is; directories are walked recursively for `.json`,
/// `.yaml` and `.yml` files, in sorted order.
pub fn discover_files(paths: &[PathBuf]) -> GraphResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && has_manifest_extension(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            tracing::debug!("Found {} manifest file(s) in {}", found.len(), path.display());
            files.append(&mut found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(GraphError::Io {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            });
        }
    }

    Ok(files)
}

fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode a file into raw records.
///
/// `.json` is parsed as JSON, `.yaml`/`.yml` as multi-document YAML, and
/// anything else is tried as JSON first, then YAML.
pub fn decode_file(path: &Path) -> GraphResult<Vec<Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("json") => decode_json(&content, path),
        Some("yaml") | Some("yml") => decode_yaml(&content, path),
        _ => decode_json(&content, path).or_else(|_| decode_yaml(&content, path)),
    }
}

/// Decode JSON text into a single record
pub fn decode_json(content: &str, path: &Path) -> GraphResult<Vec<Value>> {
    serde_json::from_str::<Value>(content)
        .map(|value| vec![value])
        .map_err(|e| GraphError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Decode YAML text, one record per document
pub fn decode_yaml(content: &str, path: &Path) -> GraphResult<Vec<Value>> {
    serde_yaml::Deserializer::from_str(content)
        .map(|document| {
            Value::deserialize(document).map_err(|e| GraphError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })
        .collect()
}

enum FileOutcome {
    Loaded(Vec<NormalizedResource>, ParseStats),
    Failed(GraphError),
    Cancelled,
}

/// Decode and normalize files in parallel.
///
/// A file that cannot be decoded counts as one error and is skipped, unless
/// the normalizer is strict. The cancellation flag is checked before each
/// file starts.
pub fn load_files(
    files: &[PathBuf],
    normalizer: &Normalizer,
    cancel: &CancellationFlag,
) -> GraphResult<LoadedResources> {
    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| {
            if cancel.is_cancelled() {
                return FileOutcome::Cancelled;
            }
            tracing::debug!("Loading {}", path.display());
            let origin = path.display().to_string();
            match decode_file(path).and_then(|records| normalizer.normalize_all(records, &origin)) {
                Ok((resources, stats)) => FileOutcome::Loaded(resources, stats),
                Err(e) => FileOutcome::Failed(e),
            }
        })
        .collect();

    let mut loaded = LoadedResources::default();
    for (path, outcome) in files.iter().zip(outcomes) {
        match outcome {
            FileOutcome::Loaded(mut resources, stats) => {
                loaded.resources.append(&mut resources);
                loaded.stats.merge(stats);
                loaded.files += 1;
            }
            FileOutcome::Cancelled => return Err(GraphError::Cancelled),
            FileOutcome::Failed(e) if normalizer.strict => return Err(e),
            FileOutcome::Failed(e) => {
                tracing::error!("Error loading {}: {}", path.display(), e);
                loaded.stats.errors += 1;
            }
        }
    }

    tracing::info!(
        "Loaded {} resource(s) from {} file(s) ({} skipped, {} error(s))",
        loaded.resources.len(),
        loaded.files,
        loaded.stats.skipped,
        loaded.stats.errors
    );
    Ok(loaded)
}
