//! Ingest boundary
//!
//! Decodes manifest exports and normalizes them into [`NormalizedResource`]
//! records. Malformed records are rejected here and nowhere else.
//!
//! [`NormalizedResource`]: crate::models::NormalizedResource

pub mod loader;
mod normalize;

pub use loader::{LoadedResources, decode_file, discover_files, load_files};
pub use normalize::{Normalizer, expand_records, normalize_record};
