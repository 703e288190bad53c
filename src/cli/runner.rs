use std::fs;
use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sarbrowse::{
    DirectoryStager, ItemManifest, ItemRequest, LocalFetcher, PipelineConfig, browse_from_paths,
    process_items, reproject,
};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep it
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(args: &CliArgs) -> Result<PipelineConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(range) = args.co_pol_range {
        config.browse.co_pol_range = Some(range);
    }
    if let Some(range) = args.cross_pol_range {
        config.browse.cross_pol_range = Some(range);
    }
    if let Some(alg) = args.resample_alg {
        config.reproject.resample = alg;
    }
    Ok(config)
}

fn run_single(args: &CliArgs, config: &PipelineConfig) -> Result<(), AppError> {
    let mut did_something = false;

    if let (Some(co), Some(cross)) = (&args.co_pol, &args.cross_pol) {
        let out = browse_from_paths(co, cross, co, &args.output_dir, &config.browse)?;
        info!("Browse composite: {:?}", out);
        did_something = true;
    }

    match (&args.input, &args.target_crs) {
        (Some(input), Some(crs)) => {
            let out = reproject(input, crs, &args.output_dir, &config.reproject)?;
            info!("Reprojected: {:?}", out);
            did_something = true;
        }
        (Some(_), None) => {
            return Err(AppError::MissingArgument {
                arg: "--target-crs".to_string(),
            });
        }
        (None, Some(_)) if args.co_pol.is_none() => {
            return Err(AppError::MissingArgument {
                arg: "--input".to_string(),
            });
        }
        _ => {}
    }

    if !did_something {
        return Err(AppError::NothingToDo);
    }
    Ok(())
}

fn run_batch(
    manifest_path: &Path,
    args: &CliArgs,
    config: &PipelineConfig,
) -> Result<(), AppError> {
    let manifest = ItemManifest::from_json_file(manifest_path)?;
    let request = ItemRequest {
        browse: !args.no_browse,
        target_crs: args.target_crs.clone(),
        data_suffix: args.data_suffix.clone(),
    };
    if !request.browse && request.target_crs.is_none() {
        return Err(AppError::NothingToDo);
    }

    info!(
        "Starting batch of {} item(s) from {:?}",
        manifest.items.len(),
        manifest_path
    );
    let stager = DirectoryStager::new(&args.output_dir)?;
    let report = process_items(&manifest.items, &request, config, &LocalFetcher, &stager);

    let results_path = args.output_dir.join("results.json");
    let json = serde_json::to_string_pretty(&report.processed).map_err(sarbrowse::Error::from)?;
    fs::write(&results_path, json)?;
    info!("Results written to {:?}", results_path);

    info!("Batch processing complete!");
    info!("Processed: {}", report.processed.len());
    info!("Errors: {}", report.failed.len());
    for failure in &report.failed {
        warn!("{}", failure);
    }

    if !report.failed.is_empty() {
        return Err(AppError::BatchFailed {
            failed: report.failed.len(),
            total: manifest.items.len(),
        });
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);
    sarbrowse::io::gdal::init();

    fs::create_dir_all(&args.output_dir)?;
    let config = load_config(&args)?;

    match &args.items {
        Some(manifest) => run_batch(manifest, &args, &config)?,
        None => run_single(&args, &config)?,
    }
    Ok(())
}
