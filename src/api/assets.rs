//! Item and asset model exchanged with the catalog layer, plus typed lookups
//! that refuse to guess when an item holds zero or several candidate assets.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Polarization;

/// Role carried by input rasters.
pub const DATA_ROLE: &str = "data";

/// Input asset as listed on a catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Local path, `file://` URL or remote URL, depending on the fetcher
    pub href: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Asset {
    pub fn new(href: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            href: href.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            title: None,
            media_type: None,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Last path segment of the href, without query string or fragment.
    pub fn file_name(&self) -> &str {
        let path = self
            .href
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.href);
        path.rsplit(['/', '\\']).next().unwrap_or(path)
    }
}

/// One unit of work: an identifier and its assets keyed by asset name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            assets: BTreeMap::new(),
        }
    }

    pub fn with_asset(mut self, key: impl Into<String>, asset: Asset) -> Self {
        self.assets.insert(key.into(), asset);
        self
    }
}

/// `{ "items": [...] }` document read by the CLI's batch mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemManifest {
    pub items: Vec<Item>,
}

impl ItemManifest {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// The single asset carrying `role` whose file name ends with `suffix`
/// (case-insensitive; an empty suffix matches any file).
///
/// Zero matches is `Error::MissingAsset`, more than one is `Error::AmbiguousAsset`.
pub fn find_asset<'a>(item: &'a Item, role: &str, suffix: &str) -> Result<&'a Asset> {
    let suffix_lc = suffix.to_ascii_lowercase();
    let matches: Vec<(&String, &Asset)> = item
        .assets
        .iter()
        .filter(|(_, a)| a.has_role(role))
        .filter(|(_, a)| a.file_name().to_ascii_lowercase().ends_with(&suffix_lc))
        .collect();

    match matches.as_slice() {
        [(_, asset)] => Ok(*asset),
        [] => Err(Error::MissingAsset {
            role: role.to_string(),
            suffix: suffix.to_string(),
        }),
        many => Err(Error::AmbiguousAsset {
            role: role.to_string(),
            suffix: suffix.to_string(),
            matches: many.iter().map(|(k, _)| (*k).clone()).collect(),
        }),
    }
}

/// Co-pol / cross-pol pair present on the item: VV+VH preferred, then HH+HV.
pub fn find_polarization_pair(item: &Item) -> Result<(Polarization, Polarization)> {
    for (co, cross) in [
        (Polarization::Vv, Polarization::Vh),
        (Polarization::Hh, Polarization::Hv),
    ] {
        let co_hit = find_asset(item, DATA_ROLE, co.file_suffix());
        let cross_hit = find_asset(item, DATA_ROLE, cross.file_suffix());
        match (co_hit, cross_hit) {
            (Ok(_), Ok(_)) => return Ok((co, cross)),
            (Err(e @ Error::AmbiguousAsset { .. }), _)
            | (_, Err(e @ Error::AmbiguousAsset { .. })) => return Err(e),
            _ => continue,
        }
    }
    let available: Vec<&str> = item.assets.values().map(|a| a.file_name()).collect();
    Err(Error::MissingAsset {
        role: DATA_ROLE.to_string(),
        suffix: format!("_VV/_VH or _HH/_HV pair (available: {})", available.join(", ")),
    })
}
