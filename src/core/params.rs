use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::ResampleAlg;

/// Display range mapped onto 0..=255 by the normalizer. `vmax > vmin` always holds.
///
/// Serialized as a two-element array `[vmin, vmax]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct NormalizationRange {
    vmin: f64,
    vmax: f64,
}

impl NormalizationRange {
    /// Typical dynamic range of co-polarized backscatter (linear power).
    pub const CO_POL: NormalizationRange = NormalizationRange {
        vmin: 0.0,
        vmax: 0.15,
    };
    /// Cross-pol is roughly an order of magnitude dimmer and needs a tighter stretch.
    pub const CROSS_POL: NormalizationRange = NormalizationRange {
        vmin: 0.0,
        vmax: 0.025,
    };

    pub fn new(vmin: f64, vmax: f64) -> Result<Self> {
        // Written so NaN bounds fail as well
        if !(vmin.is_finite() && vmax.is_finite() && vmax > vmin) {
            return Err(Error::DegenerateRange { vmin, vmax });
        }
        Ok(Self { vmin, vmax })
    }

    pub fn vmin(&self) -> f64 {
        self.vmin
    }

    pub fn vmax(&self) -> f64 {
        self.vmax
    }

    pub fn span(&self) -> f64 {
        self.vmax - self.vmin
    }
}

impl TryFrom<(f64, f64)> for NormalizationRange {
    type Error = Error;

    fn try_from((vmin, vmax): (f64, f64)) -> Result<Self> {
        NormalizationRange::new(vmin, vmax)
    }
}

impl From<NormalizationRange> for (f64, f64) {
    fn from(r: NormalizationRange) -> Self {
        (r.vmin, r.vmax)
    }
}

/// Parses `MIN,MAX`, e.g. `0,0.15`.
impl FromStr for NormalizationRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument {
            arg: "range",
            value: s.to_string(),
        };
        let (lo, hi) = s.split_once(',').ok_or_else(invalid)?;
        let vmin = lo.trim().parse::<f64>().map_err(|_| invalid())?;
        let vmax = hi.trim().parse::<f64>().map_err(|_| invalid())?;
        NormalizationRange::new(vmin, vmax)
    }
}

/// Browse composite parameters. `None` means "derive from the band's 3rd/97th percentiles".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseParams {
    pub co_pol_range: Option<NormalizationRange>,
    pub cross_pol_range: Option<NormalizationRange>,
}

impl Default for BrowseParams {
    fn default() -> Self {
        Self {
            co_pol_range: Some(NormalizationRange::CO_POL),
            cross_pol_range: Some(NormalizationRange::CROSS_POL),
        }
    }
}

/// Reprojection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprojectParams {
    pub resample: ResampleAlg,
    /// COG compression codec (`-co COMPRESS=`)
    pub compress: String,
    /// Warper executable
    pub gdalwarp: String,
}

impl Default for ReprojectParams {
    fn default() -> Self {
        Self {
            resample: ResampleAlg::Nearest,
            compress: "DEFLATE".to_string(),
            gdalwarp: "gdalwarp".to_string(),
        }
    }
}

/// Pipeline configuration suitable for config files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub browse: BrowseParams,
    pub reproject: ReprojectParams,
}

impl PipelineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
