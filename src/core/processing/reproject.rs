//! Reprojection to a target CRS, written as a cloud-optimized GeoTIFF.
//!
//! Warping is delegated to `gdalwarp` with the COG driver; both the warp and the
//! COG encoding run on all available CPUs.
use gdal::spatial_ref::SpatialRef;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::core::params::ReprojectParams;
use crate::core::processing::naming::reprojected_output_name;
use crate::error::{Error, Result};
use crate::io::writers::remove_partial_output;

/// Parse `crs` (EPSG code, WKT, PROJ string...) before any warp is attempted.
pub fn validate_crs(crs: &str) -> Result<SpatialRef> {
    let trimmed = crs.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedCrs {
            crs: crs.to_string(),
            reason: "empty definition".to_string(),
        });
    }
    crate::io::gdal::init();
    SpatialRef::from_definition(trimmed).map_err(|e| Error::UnsupportedCrs {
        crs: crs.to_string(),
        reason: e.to_string(),
    })
}

/// Command-line arguments for one `gdalwarp` invocation.
pub fn warp_args(
    input: &Path,
    output: &Path,
    target_crs: &str,
    params: &ReprojectParams,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-overwrite",
        "-of",
        "COG",
        "-t_srs",
        target_crs.trim(),
        "-r",
        params.resample.gdal_name(),
        "-multi",
        "-wo",
        "NUM_THREADS=ALL_CPUS",
        "-co",
        "NUM_THREADS=ALL_CPUS",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    if !params.compress.is_empty() {
        args.push("-co".into());
        args.push(format!("COMPRESS={}", params.compress).into());
    }
    args.push(input.as_os_str().to_os_string());
    args.push(output.as_os_str().to_os_string());
    args
}

/// Reproject `input` into `target_crs`, writing `<stem>_reprojected.<ext>` into `out_dir`.
///
/// An unparseable CRS fails before the warper runs. On warp failure any partial
/// output is removed.
pub fn reproject(
    input: &Path,
    target_crs: &str,
    out_dir: &Path,
    params: &ReprojectParams,
) -> Result<PathBuf> {
    validate_crs(target_crs)?;
    if !input.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input raster not found: {}", input.display()),
        )));
    }

    let output = out_dir.join(reprojected_output_name(input)?);
    let args = warp_args(input, &output, target_crs, params);
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    info!(
        "Warping {:?} -> {} ({} resampling, {} threads)",
        input, target_crs, params.resample, threads
    );
    debug!("{} {:?}", params.gdalwarp, args);

    let result = Command::new(&params.gdalwarp)
        .args(&args)
        .output()
        .map_err(|e| Error::Warp(format!("cannot run {}: {}", params.gdalwarp, e)))?;

    if !result.status.success() {
        remove_partial_output(&output);
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(Error::Warp(format!(
            "{} exited with {}: {}",
            params.gdalwarp,
            result.status,
            stderr.trim()
        )));
    }

    info!("Reprojected raster written: {:?}", output);
    Ok(output)
}
