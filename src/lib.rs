#![doc = r#"
sarbrowse: browse composites and cloud-optimized reprojection for SAR backscatter.

This crate turns dual-polarization radar backscatter GeoTIFFs (e.g. OPERA RTC
VV/VH or HH/HV bands) into

- a 4-band RGBA browse GeoTIFF: co-pol in red and blue, cross-pol in green,
  each contrast-stretched with a gamma-0.5 curve, and an alpha channel that is
  opaque only where both bands hold data;
- a reprojected, cloud-optimized GeoTIFF in any CRS GDAL understands.

It powers the `sarbrowse` CLI and can be embedded in services that fetch and
stage files through their own collaborators.

Requirements
------------
- GDAL development headers and runtime available on your system.
- `gdalwarp` on `PATH` (or configured) for reprojection.

Quick start: browse composite from local files
----------------------------------------------
```rust,no_run
use std::path::Path;
use sarbrowse::{browse_from_paths, BrowseParams};

fn main() -> sarbrowse::Result<()> {
    let out = browse_from_paths(
        Path::new("/data/granule_VV.tif"),
        Path::new("/data/granule_VH.tif"),
        Path::new("granule_VV.tif"),
        Path::new("/out"),
        &BrowseParams::default(),
    )?;
    println!("wrote {}", out.display()); // /out/granule_rgb.tif
    Ok(())
}
```

Items with fetch/stage collaborators
------------------------------------
```rust,no_run
use sarbrowse::{
    process_item, Asset, DirectoryStager, Item, ItemRequest, LocalFetcher, PipelineConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    sarbrowse::io::gdal::init();
    let item = Item::new("granule")
        .with_asset("VV", Asset::new("/data/granule_VV.tif", &["data"]))
        .with_asset("VH", Asset::new("/data/granule_VH.tif", &["data"]));
    let request = ItemRequest {
        browse: true,
        target_crs: Some("EPSG:4326".to_string()),
        data_suffix: "_VV.tif".to_string(),
    };
    let stager = DirectoryStager::new("/out")?;
    let done = process_item(&item, &request, &PipelineConfig::default(), &LocalFetcher, &stager)?;
    for (role, asset) in &done.assets {
        println!("{role}: {}", asset.href);
    }
    Ok(())
}
```

Error handling
--------------
Library functions return `sarbrowse::Result<T>`; item processing returns
`ItemError`, which names the item and the failing `Stage` and wraps the
underlying `sarbrowse::Error`.

Useful modules
--------------
- [`api`]: item orchestration, asset lookup, fetch/stage seams.
- [`core`]: normalization, compositing, reprojection and their parameters.
- [`io`]: GDAL reader and GeoTIFF writers.
- [`types`]: shared enums (`Polarization`, `AssetRole`, `ResampleAlg`, `Stage`).
- [`error`]: crate-level `Error`, `ItemError` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use crate::core::params::{BrowseParams, NormalizationRange, PipelineConfig, ReprojectParams};
pub use error::{Error, ItemError, Result};
pub use types::{AssetRole, Polarization, ResampleAlg, Stage, TIFF_MEDIA_TYPE};

pub use crate::core::processing::{
    BrowseComposite, browse_output_name, composite, normalize, reproject,
    reprojected_output_name, write_browse_composite,
};
pub use io::{RasterBand, RasterReader, read_raster_band};

pub use api::{
    Asset, BatchReport, DirectoryStager, Fetcher, Item, ItemManifest, ItemRequest, LocalFetcher,
    OutputAsset, ProcessedItem, StagedAsset, Stager, browse_from_paths, find_asset,
    find_polarization_pair, process_item, process_items,
};
