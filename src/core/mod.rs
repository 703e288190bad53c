//! Core processing building blocks: band normalization, browse compositing,
//! reprojection and their parameters. These are the primitives consumed by
//! the high-level `api` module.
pub mod params;
pub mod processing;
