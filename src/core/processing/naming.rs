//! Output file-name conventions relied on by downstream consumers.
use std::path::Path;

use crate::error::{Error, Result};

/// Length of the polarization suffix on a band stem, e.g. `_VV`.
const POLARIZATION_SUFFIX_LEN: usize = 3;

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidName(path.display().to_string()))
}

/// `OPERA_L2_RTC-S1_..._VV.tif` -> `OPERA_L2_RTC-S1_..._rgb.tif`
pub fn browse_output_name(co_pol: &Path) -> Result<String> {
    let name = file_name(co_pol)?;
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let cut = stem
        .len()
        .checked_sub(POLARIZATION_SUFFIX_LEN)
        .filter(|&cut| cut > 0 && stem.is_char_boundary(cut))
        .ok_or_else(|| Error::InvalidName(name.to_string()))?;
    Ok(format!("{}_rgb.tif", &stem[..cut]))
}

/// `scene.tif` -> `scene_reprojected.tif`; missing extension defaults to `.tif`.
pub fn reprojected_output_name(input: &Path) -> Result<String> {
    let name = file_name(input)?;
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidName(name.to_string()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("tif");
    Ok(format!("{}_reprojected.{}", stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_name_strips_polarization_suffix() {
        let p = Path::new("/tmp/work/OPERA_L2_RTC-S1_T001_20240101_VV.tif");
        assert_eq!(
            browse_output_name(p).unwrap(),
            "OPERA_L2_RTC-S1_T001_20240101_rgb.tif"
        );
        assert_eq!(browse_output_name(Path::new("scene_HH.tiff")).unwrap(), "scene_rgb.tif");
    }

    #[test]
    fn browse_name_rejects_short_stems() {
        assert!(matches!(
            browse_output_name(Path::new("_VV.tif")),
            Err(Error::InvalidName(_))
        ));
        assert!(browse_output_name(Path::new("VV.tif")).is_err());
        assert!(browse_output_name(Path::new("/")).is_err());
    }

    #[test]
    fn reprojected_name_keeps_extension() {
        assert_eq!(
            reprojected_output_name(Path::new("/data/granule_VV.tif")).unwrap(),
            "granule_VV_reprojected.tif"
        );
        assert_eq!(
            reprojected_output_name(Path::new("a.b.TIFF")).unwrap(),
            "a.b_reprojected.TIFF"
        );
        assert_eq!(reprojected_output_name(Path::new("raw")).unwrap(), "raw_reprojected.tif");
    }
}
