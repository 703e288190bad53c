//! GeoTIFF writers and metadata embedding for browse outputs.
use std::path::Path;
use tracing::warn;

pub mod metadata;
pub mod tiff;

/// Delete an output left behind by a failed write. Removal failures are logged,
/// never returned, so the caller can surface the original error.
pub(crate) fn remove_partial_output(output: &Path) {
    if output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            warn!("Could not remove partial output {:?}: {}", output, e);
        }
    }
}
