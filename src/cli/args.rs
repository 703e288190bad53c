use clap::Parser;
use std::path::PathBuf;

use sarbrowse::{NormalizationRange, ResampleAlg};

#[derive(Parser)]
#[command(name = "sarbrowse", version, about = "SAR browse composites and COG reprojection")]
pub struct CliArgs {
    /// Co-polarized band (VV or HH) for the browse composite (single mode)
    #[arg(long, requires = "cross_pol")]
    pub co_pol: Option<PathBuf>,

    /// Cross-polarized band (VH or HV) for the browse composite (single mode)
    #[arg(long, requires = "co_pol")]
    pub cross_pol: Option<PathBuf>,

    /// Raster to reproject (single mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// JSON manifest `{ "items": [...] }` of items to process (batch mode)
    #[arg(long, conflicts_with_all = ["co_pol", "cross_pol", "input"])]
    pub items: Option<PathBuf>,

    /// Directory receiving the outputs
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Target CRS for reprojection (e.g., EPSG:4326, EPSG:32633, WKT)
    #[arg(long)]
    pub target_crs: Option<String>,

    /// Batch mode: file-name suffix of the data asset to reproject (e.g. _VV.tif)
    #[arg(long, default_value = "")]
    pub data_suffix: String,

    /// Batch mode: skip the browse composite
    #[arg(long, default_value_t = false)]
    pub no_browse: bool,

    /// JSON pipeline configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Resampling algorithm for reprojection (overrides config)
    #[arg(long, value_enum)]
    pub resample_alg: Option<ResampleAlg>,

    /// Co-pol display range as MIN,MAX (overrides config)
    #[arg(long, value_parser = parse_range)]
    pub co_pol_range: Option<NormalizationRange>,

    /// Cross-pol display range as MIN,MAX (overrides config)
    #[arg(long, value_parser = parse_range)]
    pub cross_pol_range: Option<NormalizationRange>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}

fn parse_range(s: &str) -> Result<NormalizationRange, String> {
    s.parse::<NormalizationRange>().map_err(|e| e.to_string())
}
