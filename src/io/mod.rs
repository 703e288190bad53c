//! I/O layer for GDAL-backed rasters.
//! Provides the `gdal` reader and process-wide GDAL setup, and `writers`
//! for GeoTIFF outputs and metadata embedding.
pub mod gdal;
pub use gdal::{GdalError, RasterBand, RasterMetadata, RasterReader, read_raster_band};

pub mod writers;
