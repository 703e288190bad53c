use gdal::errors::{CplErrType, GdalError as GdalCrateError};
use gdal::raster::ResampleAlg;
use gdal::Dataset;
use ndarray::Array2;
use std::path::Path;
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors encountered when using GDAL reader
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),
}

static INIT: Once = Once::new();

/// Process-wide GDAL setup. Installs an error handler that reports every CPL
/// message through `tracing` instead of stderr; failures still surface as
/// `Err` from the call that raised them. Safe to call repeatedly.
pub fn init() {
    INIT.call_once(|| {
        gdal::config::set_error_handler(|class, code, msg| match class {
            CplErrType::Failure | CplErrType::Fatal => error!(code, "GDAL: {}", msg),
            CplErrType::Warning => warn!(code, "GDAL: {}", msg),
            CplErrType::Debug | CplErrType::None => debug!(code, "GDAL: {}", msg),
        });
        debug!("GDAL error handler installed");
    });
}

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct RasterMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height]);
    /// `None` when the dataset carries no georeferencing
    pub geotransform: Option<[f64; 6]>,
    /// Projection exactly as reported by the dataset (usually WKT, empty if unset)
    pub projection: String,
    /// `EPSG:<code>` when the projection carries an EPSG authority
    pub epsg: Option<String>,
}

/// A single band held in memory together with the georeferencing of its source.
///
/// Samples flagged by the band's no-data value are stored as NaN, so NaN is the
/// only no-data sentinel the processing code has to know about.
#[derive(Debug, Clone)]
pub struct RasterBand {
    /// Samples shaped (rows, cols)
    pub data: Array2<f64>,
    pub geotransform: Option<[f64; 6]>,
    pub projection: String,
}

impl RasterBand {
    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

// Helper to extract EPSG code from WKT authority tag
pub(crate) fn parse_epsg(wkt: &str) -> Option<String> {
    if wkt.starts_with("EPSG:") {
        return Some(wkt.to_string());
    }
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    if let Some(idx) = wkt.rfind(KEY) {
        let start = idx + KEY.len();
        if let Some(end) = wkt[start..].find('"') {
            let code = &wkt[start..start + end];
            return Some(format!("EPSG:{}", code));
        }
    }
    None
}

/// Reader for single- or multi-band geospatial rasters via GDAL
pub struct RasterReader {
    pub dataset: Dataset,
    pub metadata: RasterMetadata,
}

impl RasterReader {
    /// Open a GDAL-supported dataset (e.g., GeoTIFF, COG, ENVI)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        init();
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = dataset.geo_transform().ok();
        let projection = dataset.projection();
        let epsg = parse_epsg(&projection);
        debug!(
            "Opened {:?}: {}x{} px, {} band(s), crs={}",
            path.as_ref(),
            size_x,
            size_y,
            bands,
            epsg.as_deref().unwrap_or("unknown")
        );
        Ok(RasterReader {
            dataset,
            metadata: RasterMetadata {
                size_x: size_x as usize,
                size_y: size_y as usize,
                bands,
                geotransform,
                projection,
                epsg,
            },
        })
    }

    /// Read a single band (1-based index) as an f64 ndarray of shape (height, width).
    /// Samples equal to the band's declared no-data value become NaN.
    pub fn read_band(&self, index: usize) -> Result<Array2<f64>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            )));
        }
        let band = self.dataset.rasterband(index)?;
        let window = (self.metadata.size_x, self.metadata.size_y);
        // Full-resolution read, so the resampling hint never kicks in
        let buf = band.read_as::<f64>((0, 0), window, window, Some(ResampleAlg::NearestNeighbour))?;
        let mut data_vec = buf.data().to_vec();
        if let Some(nodata) = band.no_data_value().filter(|v| !v.is_nan()) {
            for v in data_vec.iter_mut().filter(|v| **v == nodata) {
                *v = f64::NAN;
            }
        }
        let len = data_vec.len();
        Array2::from_shape_vec((self.metadata.size_y, self.metadata.size_x), data_vec).map_err(
            |_| {
                GdalError::DimensionMismatch(
                    self.metadata.size_x,
                    self.metadata.size_y,
                    len,
                    1,
                )
            },
        )
    }

    /// Read a band together with the dataset's geotransform and projection
    pub fn read_raster_band(&self, index: usize) -> Result<RasterBand, GdalError> {
        Ok(RasterBand {
            data: self.read_band(index)?,
            geotransform: self.metadata.geotransform,
            projection: self.metadata.projection.clone(),
        })
    }
}

/// Open `path` and read its first band. The dataset is closed before returning.
pub fn read_raster_band<P: AsRef<Path>>(path: P) -> Result<RasterBand, GdalError> {
    let reader = RasterReader::open(path)?;
    reader.read_raster_band(1)
}
