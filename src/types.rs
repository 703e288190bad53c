//! Shared types and enums used across sarbrowse.
//! Includes `Polarization`, `AssetRole`, `ResampleAlg` and the pipeline `Stage`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Media type of every raster this crate produces.
pub const TIFF_MEDIA_TYPE: &str = "image/tiff";

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Polarization {
    Vv,
    Vh,
    Hh,
    Hv,
}

impl Polarization {
    /// File-name suffix identifying a band of this polarization, e.g. `_VV.tif`.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Polarization::Vv => "_VV.tif",
            Polarization::Vh => "_VH.tif",
            Polarization::Hh => "_HH.tif",
            Polarization::Hv => "_HV.tif",
        }
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::Vv => write!(f, "VV"),
            Polarization::Vh => write!(f, "VH"),
            Polarization::Hh => write!(f, "HH"),
            Polarization::Hv => write!(f, "HV"),
        }
    }
}

/// Semantic role of an output asset handed to the staging collaborator.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    /// Reprojected data raster
    Data,
    /// Browse composite
    Visual,
}

impl AssetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRole::Data => "data",
            AssetRole::Visual => "visual",
        }
    }
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resampling kernel passed to the warper.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResampleAlg {
    #[default]
    Nearest,
    Bilinear,
    Cubic,
    Lanczos,
    Average,
}

impl ResampleAlg {
    /// Name understood by `gdalwarp -r`.
    pub fn gdal_name(&self) -> &'static str {
        match self {
            ResampleAlg::Nearest => "near",
            ResampleAlg::Bilinear => "bilinear",
            ResampleAlg::Cubic => "cubic",
            ResampleAlg::Lanczos => "lanczos",
            ResampleAlg::Average => "average",
        }
    }
}

impl std::fmt::Display for ResampleAlg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gdal_name())
    }
}

/// Step of per-item processing, used to tag item failures.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Stage {
    Fetch,
    Read,
    Normalize,
    Composite,
    Write,
    Reproject,
    Stage,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Fetch => "fetch",
            Stage::Read => "read",
            Stage::Normalize => "normalize",
            Stage::Composite => "composite",
            Stage::Write => "write",
            Stage::Reproject => "reproject",
            Stage::Stage => "stage",
        };
        write!(f, "{}", s)
    }
}
