//! Seams to the surrounding service: fetching inputs and staging outputs.
//!
//! Retry and redirect policies belong to implementations of these traits; the
//! processing core only ever sees resolved local paths.
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::assets::Asset;
use crate::error::{Error, Result};
use crate::types::AssetRole;

/// Output raster produced for one item, waiting to be staged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputAsset {
    pub role: AssetRole,
    /// Location inside the item's working directory
    pub path: PathBuf,
    /// Remote artifact name
    pub name: String,
    pub media_type: String,
}

/// Output after staging, as recorded on the result item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedAsset {
    pub href: String,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub roles: Vec<String>,
}

/// Resolves an input asset to a readable local file.
pub trait Fetcher: Sync {
    /// `work_dir` is owned by the caller and removed once the item is done.
    fn fetch(&self, asset: &Asset, work_dir: &Path) -> Result<PathBuf>;
}

/// Publishes an output file and returns where it landed.
pub trait Stager: Sync {
    fn stage(&self, output: &OutputAsset) -> Result<String>;

    /// Withdraw an artifact previously returned by `stage`. Called when a later
    /// output of the same item fails to stage. Stagers that cannot withdraw
    /// anything keep the default.
    fn unstage(&self, _href: &str) -> Result<()> {
        Ok(())
    }
}

/// Fetcher for hrefs that already point at local files (plain paths or `file://`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Path part of a `file://` URL (everything after the scheme). Only an empty
/// or `localhost` authority is local.
fn file_url_path(href: &str, rest: &str) -> Result<PathBuf> {
    let invalid = |why: &str| Error::InvalidArgument {
        arg: "href",
        value: format!("{} in {}", why, href),
    };
    let path = rest.strip_prefix("localhost").unwrap_or(rest);
    if !path.starts_with('/') {
        return Err(invalid("non-local host"));
    }
    percent_decode(path)
        .map(PathBuf::from)
        .ok_or_else(|| invalid("malformed percent-encoding"))
}

impl Fetcher for LocalFetcher {
    fn fetch(&self, asset: &Asset, _work_dir: &Path) -> Result<PathBuf> {
        let href = asset.href.as_str();
        let path = match href.split_once("://") {
            None => PathBuf::from(href),
            Some(("file", rest)) => file_url_path(href, rest)?,
            Some((scheme, _)) => {
                return Err(Error::InvalidArgument {
                    arg: "href",
                    value: format!("unsupported scheme `{}` in {}", scheme, href),
                });
            }
        };
        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input raster not found: {}", path.display()),
            )));
        }
        debug!("LocalFetcher: {} -> {:?}", href, path);
        Ok(path)
    }
}

/// Stager that copies outputs into a directory under their artifact name.
#[derive(Debug, Clone)]
pub struct DirectoryStager {
    pub root: PathBuf,
}

impl DirectoryStager {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

impl Stager for DirectoryStager {
    fn stage(&self, output: &OutputAsset) -> Result<String> {
        let dest = self.root.join(&output.name);
        std::fs::copy(&output.path, &dest)?;
        debug!("Staged {:?} -> {:?}", output.path, dest);
        Ok(dest.display().to_string())
    }

    fn unstage(&self, href: &str) -> Result<()> {
        let path = Path::new(href);
        if path.starts_with(&self.root) && path.is_file() {
            std::fs::remove_file(path)?;
            debug!("Withdrew {:?}", path);
        }
        Ok(())
    }
}
