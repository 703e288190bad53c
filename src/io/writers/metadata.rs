use gdal::{Dataset, Metadata};
use std::collections::BTreeMap;
use tracing::debug;

use crate::core::params::BrowseParams;
use crate::io::GdalError;

/// Provenance fields attached to every browse composite.
pub fn browse_metadata_fields(
    params: &BrowseParams,
    co_pol_source: Option<&str>,
) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    metadata.insert(
        "PROCESSING_SOFTWARE".to_string(),
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    );
    metadata.insert(
        "PROCESSING_TIMESTAMP".to_string(),
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    metadata.insert(
        "BROWSE_BANDS".to_string(),
        "CO_POL,CROSS_POL,CO_POL,VALID_MASK".to_string(),
    );

    let describe = |range: Option<crate::core::params::NormalizationRange>| match range {
        Some(r) => format!("{},{}", r.vmin(), r.vmax()),
        None => "p3,p97".to_string(),
    };
    metadata.insert("CO_POL_RANGE".to_string(), describe(params.co_pol_range));
    metadata.insert(
        "CROSS_POL_RANGE".to_string(),
        describe(params.cross_pol_range),
    );
    metadata.insert("GAMMA".to_string(), "0.5".to_string());

    if let Some(src) = co_pol_source {
        metadata.insert("CO_POL_SOURCE".to_string(), src.to_string());
    }

    metadata
}

/// Copy georeferencing unchanged onto `ds` and set metadata items in the default domain.
/// A missing geotransform stays missing.
pub fn embed_tiff_metadata(
    ds: &mut Dataset,
    geotransform: Option<[f64; 6]>,
    projection: &str,
    fields: &BTreeMap<String, String>,
) -> Result<(), GdalError> {
    if let Some(gt) = geotransform {
        ds.set_geo_transform(&gt)?;
    }
    if !projection.is_empty() {
        ds.set_projection(projection)?;
    }

    for (key, value) in fields {
        ds.set_metadata_item(key, value, "")?;
    }
    debug!("Embedded {} metadata item(s)", fields.len());

    Ok(())
}
