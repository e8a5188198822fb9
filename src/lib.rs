// Public library interface for ParcelView-rs
// Aggregates property listings into weighted hierarchies and lays them out as squarified treemaps.

pub mod dataset;
pub mod error;
pub mod layout;
pub mod render;
pub mod tree;
pub mod views;

pub use crate::dataset::{Field, PriceBins, Record};
pub use crate::error::{Result, TreemapError};
pub use crate::layout::{compute_layout, layout, Layout, LayoutConfig, LayoutItem, Rect};
pub use crate::tree::{aggregate, aggregate_by_names, GroupNode};
pub use crate::views::{View, ViewLayout};
