//! High-level, ergonomic library API: process catalog items end to end
//! (fetch, browse and/or reproject, stage) or run a single step on local files.
//! Prefer these entrypoints over the low-level processing modules.
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod assets;
pub mod collaborators;

pub use assets::{Asset, DATA_ROLE, Item, ItemManifest, find_asset, find_polarization_pair};
pub use collaborators::{
    DirectoryStager, Fetcher, LocalFetcher, OutputAsset, StagedAsset, Stager,
};

use crate::core::params::{BrowseParams, PipelineConfig};
use crate::core::processing::{
    browse_output_name, composite, reproject, reprojected_output_name, write_browse_composite,
};
use crate::error::{Error, ItemError, Result};
use crate::io::read_raster_band;
use crate::types::{AssetRole, Stage, TIFF_MEDIA_TYPE};

/// What to produce for each item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemRequest {
    /// Build the co-pol/cross-pol browse composite
    pub browse: bool,
    /// Reproject the data asset into this CRS
    pub target_crs: Option<String>,
    /// File-name suffix selecting the data asset to reproject; empty means
    /// the item must carry exactly one `data` asset
    pub data_suffix: String,
}

/// Result item: staged outputs keyed by role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedItem {
    pub id: String,
    pub assets: BTreeMap<String, StagedAsset>,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedItem>,
    pub failed: Vec<ItemError>,
}

/// Build the browse composite for a co-pol/cross-pol pair of local files.
///
/// `name_source` is the identifier the output name is derived from (usually
/// the co-pol asset's file name); the composite lands in `out_dir`.
pub fn browse_from_paths(
    co_pol: &Path,
    cross_pol: &Path,
    name_source: &Path,
    out_dir: &Path,
    params: &BrowseParams,
) -> Result<PathBuf> {
    let co = read_raster_band(co_pol)?;
    let cross = read_raster_band(cross_pol)?;
    let browse = composite(&co, &cross, params)?;
    let output = out_dir.join(browse_output_name(name_source)?);
    write_browse_composite(&browse, &output, name_source.to_str())?;
    Ok(output)
}

fn composite_stage(e: &Error) -> Stage {
    match e {
        Error::DegenerateRange { .. } => Stage::Normalize,
        _ => Stage::Composite,
    }
}

fn sanitize_prefix(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(48)
        .collect()
}

fn run_browse(
    item: &Item,
    config: &PipelineConfig,
    fetcher: &dyn Fetcher,
    work_dir: &Path,
) -> std::result::Result<OutputAsset, ItemError> {
    let fail = |stage: Stage| {
        let id = item.id.clone();
        move |e: Error| ItemError::new(id, stage, e)
    };

    let (co_pol, cross_pol) = find_polarization_pair(item).map_err(fail(Stage::Fetch))?;
    let co_asset =
        find_asset(item, DATA_ROLE, co_pol.file_suffix()).map_err(fail(Stage::Fetch))?;
    let cross_asset =
        find_asset(item, DATA_ROLE, cross_pol.file_suffix()).map_err(fail(Stage::Fetch))?;
    info!("[{}] browse from {} / {}", item.id, co_pol, cross_pol);

    let co_path = fetcher.fetch(co_asset, work_dir).map_err(fail(Stage::Fetch))?;
    let cross_path = fetcher
        .fetch(cross_asset, work_dir)
        .map_err(fail(Stage::Fetch))?;

    let co = read_raster_band(&co_path)
        .map_err(Error::from)
        .map_err(fail(Stage::Read))?;
    let cross = read_raster_band(&cross_path)
        .map_err(Error::from)
        .map_err(fail(Stage::Read))?;

    let browse = composite(&co, &cross, &config.browse)
        .map_err(|e| ItemError::new(item.id.clone(), composite_stage(&e), e))?;
    drop((co, cross));

    let name = browse_output_name(Path::new(co_asset.file_name())).map_err(fail(Stage::Write))?;
    let path = work_dir.join(&name);
    write_browse_composite(&browse, &path, Some(co_asset.file_name()))
        .map_err(fail(Stage::Write))?;

    Ok(OutputAsset {
        role: AssetRole::Visual,
        path,
        name,
        media_type: TIFF_MEDIA_TYPE.to_string(),
    })
}

fn run_reproject(
    item: &Item,
    target_crs: &str,
    data_suffix: &str,
    config: &PipelineConfig,
    fetcher: &dyn Fetcher,
    work_dir: &Path,
) -> std::result::Result<OutputAsset, ItemError> {
    let fail = |stage: Stage| {
        let id = item.id.clone();
        move |e: Error| ItemError::new(id, stage, e)
    };

    let asset = find_asset(item, DATA_ROLE, data_suffix).map_err(fail(Stage::Fetch))?;
    let input = fetcher.fetch(asset, work_dir).map_err(fail(Stage::Fetch))?;
    info!("[{}] reproject {} -> {}", item.id, asset.file_name(), target_crs);

    // The artifact name follows the asset's name, not the local copy's
    let out_dir = work_dir.join("reprojected");
    std::fs::create_dir_all(&out_dir)
        .map_err(Error::from)
        .map_err(fail(Stage::Reproject))?;
    let path = reproject(&input, target_crs, &out_dir, &config.reproject)
        .map_err(fail(Stage::Reproject))?;
    let name = reprojected_output_name(Path::new(asset.file_name()))
        .map_err(fail(Stage::Reproject))?;

    Ok(OutputAsset {
        role: AssetRole::Data,
        path,
        name,
        media_type: TIFF_MEDIA_TYPE.to_string(),
    })
}

/// Stage every output or none of them: when one fails, the outputs already
/// staged for this item are withdrawn again.
fn stage_outputs(
    item_id: &str,
    outputs: &[OutputAsset],
    stager: &dyn Stager,
) -> Result<BTreeMap<String, StagedAsset>> {
    let mut assets: BTreeMap<String, StagedAsset> = BTreeMap::new();
    for output in outputs {
        let href = match stager.stage(output) {
            Ok(href) => href,
            Err(e) => {
                for staged in assets.values() {
                    if let Err(undo) = stager.unstage(&staged.href) {
                        warn!("[{}] could not withdraw {}: {}", item_id, staged.href, undo);
                    }
                }
                return Err(e);
            }
        };
        assets.insert(
            output.role.as_str().to_string(),
            StagedAsset {
                href,
                title: output.name.clone(),
                media_type: output.media_type.clone(),
                roles: vec![output.role.as_str().to_string()],
            },
        );
    }
    Ok(assets)
}

/// Process one item: fetch inputs, build the requested outputs in a private
/// working directory, then stage them.
///
/// Outputs are staged only once every requested step has succeeded, and a
/// staging failure withdraws whatever this item already staged. The working
/// directory is removed on every exit path.
pub fn process_item(
    item: &Item,
    request: &ItemRequest,
    config: &PipelineConfig,
    fetcher: &dyn Fetcher,
    stager: &dyn Stager,
) -> std::result::Result<ProcessedItem, ItemError> {
    if !request.browse && request.target_crs.is_none() {
        return Err(ItemError::new(
            item.id.clone(),
            Stage::Fetch,
            Error::MissingArgument {
                arg: "browse or target CRS".to_string(),
            },
        ));
    }

    let work_dir = tempfile::Builder::new()
        .prefix(&format!("{}_", sanitize_prefix(&item.id)))
        .tempdir()
        .map_err(|e| ItemError::new(item.id.clone(), Stage::Fetch, e.into()))?;

    let mut outputs = Vec::new();
    if let Some(crs) = request.target_crs.as_deref() {
        outputs.push(run_reproject(
            item,
            crs,
            &request.data_suffix,
            config,
            fetcher,
            work_dir.path(),
        )?);
    }
    if request.browse {
        outputs.push(run_browse(item, config, fetcher, work_dir.path())?);
    }

    let assets = stage_outputs(&item.id, &outputs, stager)
        .map_err(|e| ItemError::new(item.id.clone(), Stage::Stage, e))?;
    info!("[{}] done: {} output(s) staged", item.id, assets.len());

    Ok(ProcessedItem {
        id: item.id.clone(),
        assets,
    })
}

/// Process items in parallel. Failures are collected per item and never
/// affect the other items.
pub fn process_items(
    items: &[Item],
    request: &ItemRequest,
    config: &PipelineConfig,
    fetcher: &dyn Fetcher,
    stager: &dyn Stager,
) -> BatchReport {
    let results: Vec<_> = items
        .par_iter()
        .map(|item| process_item(item, request, config, fetcher, stager))
        .collect();

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(done) => report.processed.push(done),
            Err(e) => {
                warn!("{}", e);
                report.failed.push(e);
            }
        }
    }
    info!(
        "Batch complete: processed={} failed={}",
        report.processed.len(),
        report.failed.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingStager(Mutex<Vec<String>>);

    impl Stager for RecordingStager {
        fn stage(&self, output: &OutputAsset) -> Result<String> {
            self.0.lock().unwrap().push(output.name.clone());
            Ok(format!("mem://{}", output.name))
        }
    }

    #[test]
    fn empty_request_is_rejected() {
        let stager = RecordingStager(Mutex::new(Vec::new()));
        let err = process_item(
            &Item::new("x"),
            &ItemRequest::default(),
            &PipelineConfig::default(),
            &LocalFetcher,
            &stager,
        )
        .unwrap_err();
        assert!(matches!(err.source, Error::MissingArgument { .. }));
    }

    #[test]
    fn missing_pair_fails_at_fetch_and_stages_nothing() {
        let stager = RecordingStager(Mutex::new(Vec::new()));
        let item = Item::new("vv-only").with_asset("VV", Asset::new("/nope/a_VV.tif", &["data"]));
        let request = ItemRequest {
            browse: true,
            ..ItemRequest::default()
        };
        let err = process_item(&item, &request, &PipelineConfig::default(), &LocalFetcher, &stager)
            .unwrap_err();
        assert_eq!(err.item, "vv-only");
        assert_eq!(err.stage, Stage::Fetch);
        assert!(matches!(err.source, Error::MissingAsset { .. }));
        assert!(stager.0.lock().unwrap().is_empty());
    }

    #[test]
    fn batch_isolates_failures() {
        let stager = RecordingStager(Mutex::new(Vec::new()));
        let items = vec![
            Item::new("a").with_asset("VV", Asset::new("/nope/a_VV.tif", &["data"])),
            Item::new("b"),
        ];
        let request = ItemRequest {
            browse: true,
            ..ItemRequest::default()
        };
        let report = process_items(
            &items,
            &request,
            &PipelineConfig::default(),
            &LocalFetcher,
            &stager,
        );
        assert!(report.processed.is_empty());
        let mut failed: Vec<_> = report.failed.iter().map(|e| e.item.as_str()).collect();
        failed.sort_unstable();
        assert_eq!(failed, vec!["a", "b"]);
    }

    struct FlakyStager {
        fail_on: &'static str,
        staged: Mutex<Vec<String>>,
        withdrawn: Mutex<Vec<String>>,
    }

    impl Stager for FlakyStager {
        fn stage(&self, output: &OutputAsset) -> Result<String> {
            if output.name == self.fail_on {
                return Err(Error::Io(std::io::Error::other("bucket unavailable")));
            }
            let href = format!("mem://{}", output.name);
            self.staged.lock().unwrap().push(href.clone());
            Ok(href)
        }

        fn unstage(&self, href: &str) -> Result<()> {
            self.withdrawn.lock().unwrap().push(href.to_string());
            Ok(())
        }
    }

    fn output(role: AssetRole, name: &str) -> OutputAsset {
        OutputAsset {
            role,
            path: PathBuf::from(name),
            name: name.to_string(),
            media_type: TIFF_MEDIA_TYPE.to_string(),
        }
    }

    #[test]
    fn staging_failure_withdraws_earlier_outputs() {
        let stager = FlakyStager {
            fail_on: "g_rgb.tif",
            staged: Mutex::new(Vec::new()),
            withdrawn: Mutex::new(Vec::new()),
        };
        let outputs = [
            output(AssetRole::Data, "g_VV_reprojected.tif"),
            output(AssetRole::Visual, "g_rgb.tif"),
        ];
        let err = stage_outputs("g", &outputs, &stager).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(
            *stager.withdrawn.lock().unwrap(),
            vec!["mem://g_VV_reprojected.tif".to_string()]
        );
    }

    #[test]
    fn staging_success_keys_assets_by_role() {
        let stager = FlakyStager {
            fail_on: "",
            staged: Mutex::new(Vec::new()),
            withdrawn: Mutex::new(Vec::new()),
        };
        let outputs = [
            output(AssetRole::Data, "g_VV_reprojected.tif"),
            output(AssetRole::Visual, "g_rgb.tif"),
        ];
        let assets = stage_outputs("g", &outputs, &stager).unwrap();
        assert_eq!(assets["data"].href, "mem://g_VV_reprojected.tif");
        assert_eq!(assets["visual"].roles, vec!["visual".to_string()]);
        assert!(stager.withdrawn.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_data_suffix_on_dual_pol_item_is_ambiguous() {
        let stager = RecordingStager(Mutex::new(Vec::new()));
        let item = Item::new("dual")
            .with_asset("VV", Asset::new("/nope/dual_VV.tif", &["data"]))
            .with_asset("VH", Asset::new("/nope/dual_VH.tif", &["data"]));
        let request = ItemRequest {
            browse: false,
            target_crs: Some("EPSG:4326".to_string()),
            data_suffix: String::new(),
        };
        let err = process_item(&item, &request, &PipelineConfig::default(), &LocalFetcher, &stager)
            .unwrap_err();
        assert_eq!(err.stage, Stage::Fetch);
        assert!(matches!(err.source, Error::AmbiguousAsset { .. }));
        assert!(stager.0.lock().unwrap().is_empty());
    }

    #[test]
    fn sanitized_prefix_is_filesystem_safe() {
        assert_eq!(sanitize_prefix("S1A/IW:001 x"), "S1A_IW_001_x");
    }
}
