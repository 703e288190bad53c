use gdal::raster::{Buffer, ColorInterpretation};
use gdal::{Dataset, DriverManager};
use std::path::Path;

use crate::io::GdalError;
use crate::io::writers::remove_partial_output;

const BROWSE_INTERPRETATION: [ColorInterpretation; 4] = [
    ColorInterpretation::RedBand,
    ColorInterpretation::GreenBand,
    ColorInterpretation::BlueBand,
    ColorInterpretation::AlphaBand,
];

/// Create a 4-band Byte GeoTIFF and fill it with the given RGBA planes
/// (each `cols * rows`, row-major). The returned dataset is still open so the
/// caller can attach georeferencing and metadata before it is dropped.
///
/// Plane sizes are checked before anything touches the disk; if a band write
/// fails afterwards the half-written file is removed.
pub fn write_tiff_rgba_u8(
    output: &Path,
    cols: usize,
    rows: usize,
    planes: [&[u8]; 4],
) -> Result<Dataset, GdalError> {
    if let Some(plane) = planes.iter().find(|p| p.len() != cols * rows) {
        return Err(GdalError::DimensionMismatch(cols, rows, plane.len(), 1));
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let ds = driver.create_with_band_type::<u8, _>(output, cols, rows, 4)?;
    if let Err(e) = fill_rgba_bands(&ds, cols, rows, &planes) {
        drop(ds);
        remove_partial_output(output);
        return Err(e);
    }

    Ok(ds)
}

fn fill_rgba_bands(
    ds: &Dataset,
    cols: usize,
    rows: usize,
    planes: &[&[u8]; 4],
) -> Result<(), GdalError> {
    for (i, (plane, interp)) in planes.iter().zip(BROWSE_INTERPRETATION).enumerate() {
        let mut band = ds.rasterband(i + 1)?;
        band.set_color_interpretation(interp)?;
        let mut buf = Buffer::new((cols, rows), plane.to_vec());
        band.write((0, 0), (cols, rows), &mut buf)?;
    }
    Ok(())
}

/// Write a single-band Float32 GeoTIFF with georeferencing attached.
/// NaN samples are kept as-is and declared as the band's no-data value.
pub fn write_tiff_f32(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[f32],
    geotransform: [f64; 6],
    projection: &str,
) -> Result<(), GdalError> {
    if data.len() != cols * rows {
        return Err(GdalError::DimensionMismatch(cols, rows, data.len(), 1));
    }
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<f32, _>(output, cols, rows, 1)?;
    ds.set_geo_transform(&geotransform)?;
    if !projection.is_empty() {
        ds.set_projection(projection)?;
    }
    let mut band = ds.rasterband(1)?;
    band.set_no_data_value(Some(f64::NAN))?;
    let mut buf = Buffer::new((cols, rows), data.to_vec());
    band.write((0, 0), (cols, rows), &mut buf)?;
    Ok(())
}
