//! Segmentation algorithms.
//!
//! - **Region growing**: seed-based 4-connected fill with an intensity
//!   tolerance
//! - **Watershed**: marker-controlled flooding with boundaries painted red
//! - **Labeling**: 8-connected components, used to seed the watershed

pub mod label;
pub mod region_growing;
pub mod watershed;

pub use label::connected_components;
pub use region_growing::{region_growing, region_growing_detailed, RegionGrowingResult};
pub use watershed::{watershed, watershed_markers};
