//! Raster processing steps: normalization, browse compositing, reprojection
//! and the output naming conventions they share.
pub mod composite;
pub mod naming;
pub mod normalize;
pub mod reproject;

pub use composite::{BrowseComposite, composite, write_browse_composite};
pub use naming::{browse_output_name, reprojected_output_name};
pub use normalize::normalize;
pub use reproject::reproject;
