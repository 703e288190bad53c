use gdal::raster::ColorInterpretation;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata};
use ndarray::{Array3, array};
use sarbrowse::io::writers::tiff::{write_tiff_f32, write_tiff_rgba_u8};
use sarbrowse::{
    BrowseComposite, BrowseParams, Error, RasterReader, browse_from_paths, read_raster_band,
    write_browse_composite,
};
use std::path::{Path, PathBuf};

const GT: [f64; 6] = [500000.0, 30.0, 0.0, 4000000.0, 0.0, -30.0];

fn utm_wkt() -> String {
    SpatialRef::from_epsg(32633)
        .and_then(|srs| srs.to_wkt())
        .expect("EPSG:32633 should be known to GDAL")
}

fn write_band(dir: &Path, name: &str, data: &[f32], cols: usize, rows: usize) -> PathBuf {
    let path = dir.join(name);
    write_tiff_f32(&path, cols, rows, data, GT, &utm_wkt()).expect("fixture write failed");
    path
}

fn stretch(value: f64, vmax: f64) -> u8 {
    ((value / vmax).clamp(0.0, 1.0).sqrt() * 255.0).round_ties_even() as u8
}

#[test]
fn browse_from_two_by_two_bands() {
    let dir = tempfile::tempdir().unwrap();
    let co = write_band(dir.path(), "granule_VV.tif", &[0.0, 0.05, 0.1, f32::NAN], 2, 2);
    let cross = write_band(dir.path(), "granule_VH.tif", &[0.0, 0.01, 0.02, 0.03], 2, 2);
    let out_dir = dir.path().join("out");
    std::fs::create_dir_all(&out_dir).unwrap();

    let out = browse_from_paths(
        &co,
        &cross,
        Path::new("granule_VV.tif"),
        &out_dir,
        &BrowseParams::default(),
    )
    .unwrap();
    assert_eq!(out, out_dir.join("granule_rgb.tif"));

    let reader = RasterReader::open(&out).unwrap();
    assert_eq!(reader.metadata.bands, 4);
    assert_eq!((reader.metadata.size_x, reader.metadata.size_y), (2, 2));

    let red = reader.read_band(1).unwrap();
    let green = reader.read_band(2).unwrap();
    let blue = reader.read_band(3).unwrap();
    let alpha = reader.read_band(4).unwrap();

    // Co-pol samples were f32 on disk, so compare against the widened values
    let co_px = |v: f32| stretch(v as f64, 0.15) as f64;
    let cross_px = |v: f32| stretch(v as f64, 0.025) as f64;
    assert_eq!(red, array![[0.0, co_px(0.05)], [co_px(0.1), 0.0]]);
    assert_eq!(blue, red);
    assert_eq!(
        green,
        array![[0.0, cross_px(0.01)], [cross_px(0.02), 255.0]]
    );
    assert_eq!(alpha, array![[255.0, 255.0], [255.0, 0.0]]);

    let ds = Dataset::open(&out).unwrap();
    let interp: Vec<_> = (1..=4)
        .map(|i| ds.rasterband(i).unwrap().color_interpretation())
        .collect();
    assert_eq!(
        interp,
        vec![
            ColorInterpretation::RedBand,
            ColorInterpretation::GreenBand,
            ColorInterpretation::BlueBand,
            ColorInterpretation::AlphaBand,
        ]
    );
    assert_eq!(ds.metadata_item("GAMMA", "").as_deref(), Some("0.5"));
    assert_eq!(
        ds.metadata_item("CO_POL_SOURCE", "").as_deref(),
        Some("granule_VV.tif")
    );
}

#[test]
fn browse_keeps_co_pol_georeferencing() {
    let dir = tempfile::tempdir().unwrap();
    let co = write_band(dir.path(), "scene_HH.tif", &[0.02; 6], 3, 2);
    let cross = write_band(dir.path(), "scene_HV.tif", &[0.004; 6], 3, 2);

    let out = browse_from_paths(&co, &cross, &co, dir.path(), &BrowseParams::default()).unwrap();
    assert_eq!(out.file_name().unwrap(), "scene_rgb.tif");

    let source = RasterReader::open(&co).unwrap().metadata;
    let written = RasterReader::open(&out).unwrap().metadata;
    assert_eq!(written.geotransform, source.geotransform);
    assert_eq!(written.projection, source.projection);
    assert_eq!(written.epsg.as_deref(), Some("EPSG:32633"));
}

#[test]
fn shape_mismatch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let co = write_band(dir.path(), "a_VV.tif", &[0.1; 4], 2, 2);
    let cross = write_band(dir.path(), "a_VH.tif", &[0.01; 6], 3, 2);

    let err = browse_from_paths(&co, &cross, &co, dir.path(), &BrowseParams::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            co_pol: (2, 2),
            cross_pol: (2, 3)
        }
    ));
    assert!(!dir.path().join("a_rgb.tif").exists());
}

#[test]
fn declared_nodata_reads_as_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sentinel_VV.tif");
    {
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let mut ds = driver
            .create_with_band_type::<f32, _>(&path, 2, 1, 1)
            .unwrap();
        ds.set_geo_transform(&GT).unwrap();
        let mut band = ds.rasterband(1).unwrap();
        band.set_no_data_value(Some(-9999.0)).unwrap();
        let mut buf = gdal::raster::Buffer::new((2, 1), vec![-9999.0f32, 0.5]);
        band.write((0, 0), (2, 1), &mut buf).unwrap();
    }

    let band = read_raster_band(&path).unwrap();
    assert_eq!(band.shape(), (1, 2));
    assert!(band.data[[0, 0]].is_nan());
    assert_eq!(band.data[[0, 1]], 0.5);
    assert_eq!(band.geotransform, Some(GT));
}

#[test]
fn short_plane_leaves_no_rgba_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("short_rgb.tif");
    let full = [0u8; 4];
    let short = [0u8; 3];

    let res = write_tiff_rgba_u8(&out, 2, 2, [&full[..], &full[..], &short[..], &full[..]]);
    assert!(res.is_err());
    assert!(!out.exists());
}

#[test]
fn failed_metadata_embedding_removes_browse_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("broken_rgb.tif");
    let browse = BrowseComposite {
        channels: Array3::zeros((4, 2, 2)),
        geotransform: Some(GT),
        projection: "definitely not a coordinate system".to_string(),
        params: BrowseParams::default(),
    };

    assert!(write_browse_composite(&browse, &out, None).is_err());
    assert!(!out.exists());
}

#[test]
fn ungeoreferenced_source_gives_ungeoreferenced_browse() {
    let dir = tempfile::tempdir().unwrap();
    let write_plain = |name: &str, value: f32| {
        let path = dir.path().join(name);
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let ds = driver
            .create_with_band_type::<f32, _>(&path, 2, 2, 1)
            .unwrap();
        let mut band = ds.rasterband(1).unwrap();
        let mut buf = gdal::raster::Buffer::new((2, 2), vec![value; 4]);
        band.write((0, 0), (2, 2), &mut buf).unwrap();
        path
    };
    let co = write_plain("plain_VV.tif", 0.05);
    let cross = write_plain("plain_VH.tif", 0.01);

    let band = read_raster_band(&co).unwrap();
    assert_eq!(band.geotransform, None);

    let out = browse_from_paths(&co, &cross, &co, dir.path(), &BrowseParams::default()).unwrap();
    let written = RasterReader::open(&out).unwrap().metadata;
    assert_eq!(written.geotransform, None);
    assert!(written.projection.is_empty());
}
