//! Browse composite: two normalized polarization bands plus a validity alpha
//! stacked as `[co-pol, cross-pol, co-pol, alpha]`.
//!
//! Repeating co-pol in red and blue gives the usual magenta/green false-color
//! look for dual-pol backscatter.
use ndarray::{Array2, Array3, Axis, Zip, stack};
use std::path::Path;
use tracing::{debug, info};

use crate::core::params::BrowseParams;
use crate::core::processing::normalize::normalize;
use crate::error::{Error, Result};
use crate::io::RasterBand;
use crate::io::writers::metadata::{browse_metadata_fields, embed_tiff_metadata};
use crate::io::writers::remove_partial_output;
use crate::io::writers::tiff::write_tiff_rgba_u8;

/// 4-channel byte raster ready to be written, georeferenced like its co-pol source.
#[derive(Debug, Clone)]
pub struct BrowseComposite {
    /// Shaped (4, rows, cols): red, green, blue, alpha
    pub channels: Array3<u8>,
    pub geotransform: Option<[f64; 6]>,
    pub projection: String,
    pub params: BrowseParams,
}

impl BrowseComposite {
    pub fn rows(&self) -> usize {
        self.channels.len_of(Axis(1))
    }

    pub fn cols(&self) -> usize {
        self.channels.len_of(Axis(2))
    }

    pub fn red(&self) -> ndarray::ArrayView2<'_, u8> {
        self.channels.index_axis(Axis(0), 0)
    }

    pub fn green(&self) -> ndarray::ArrayView2<'_, u8> {
        self.channels.index_axis(Axis(0), 1)
    }

    pub fn blue(&self) -> ndarray::ArrayView2<'_, u8> {
        self.channels.index_axis(Axis(0), 2)
    }

    pub fn alpha(&self) -> ndarray::ArrayView2<'_, u8> {
        self.channels.index_axis(Axis(0), 3)
    }
}

/// 255 where both bands hold a sample, 0 otherwise.
pub fn combined_alpha(co_pol: &Array2<f64>, cross_pol: &Array2<f64>) -> Array2<u8> {
    let mut alpha = Array2::<u8>::zeros(co_pol.dim());
    Zip::from(&mut alpha)
        .and(co_pol)
        .and(cross_pol)
        .for_each(|a, &co, &cross| {
            *a = if !co.is_nan() && !cross.is_nan() { 255 } else { 0 };
        });
    alpha
}

/// Build the browse composite. Bands must share the same pixel grid.
pub fn composite(
    co_pol: &RasterBand,
    cross_pol: &RasterBand,
    params: &BrowseParams,
) -> Result<BrowseComposite> {
    if co_pol.shape() != cross_pol.shape() {
        return Err(Error::ShapeMismatch {
            co_pol: co_pol.shape(),
            cross_pol: cross_pol.shape(),
        });
    }
    let (rows, cols) = co_pol.shape();
    debug!("composite: {}x{} px", cols, rows);

    let co = normalize(&co_pol.data, params.co_pol_range)?;
    let cross = normalize(&cross_pol.data, params.cross_pol_range)?;
    let alpha = combined_alpha(&co_pol.data, &cross_pol.data);

    let channels = stack(
        Axis(0),
        &[co.view(), cross.view(), co.view(), alpha.view()],
    )
    .map_err(|e| Error::Processing(format!("channel stack: {}", e)))?;

    Ok(BrowseComposite {
        channels,
        geotransform: co_pol.geotransform,
        projection: co_pol.projection.clone(),
        params: *params,
    })
}

/// Write the composite as a 4-band Byte GeoTIFF carrying the co-pol georeferencing.
///
/// Nothing is left at `output` when any step fails.
pub fn write_browse_composite(
    browse: &BrowseComposite,
    output: &Path,
    co_pol_source: Option<&str>,
) -> Result<()> {
    let (rows, cols) = (browse.rows(), browse.cols());
    let planes: Vec<Vec<u8>> = browse
        .channels
        .outer_iter()
        .map(|plane| plane.iter().copied().collect())
        .collect();

    let mut ds = write_tiff_rgba_u8(
        output,
        cols,
        rows,
        [
            planes[0].as_slice(),
            planes[1].as_slice(),
            planes[2].as_slice(),
            planes[3].as_slice(),
        ],
    )?;
    let fields = browse_metadata_fields(&browse.params, co_pol_source);
    let embedded = embed_tiff_metadata(&mut ds, browse.geotransform, &browse.projection, &fields);
    drop(ds);
    if let Err(e) = embedded {
        remove_partial_output(output);
        return Err(e.into());
    }

    info!("Browse composite written: {:?} ({}x{})", output, cols, rows);
    Ok(())
}
