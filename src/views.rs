use crate::dataset::{Field, Record};
use crate::error::Result;
use crate::layout::{compute_layout, Layout, LayoutConfig, Rect};
use crate::render::WeightUnit;
use crate::tree::{aggregate, GroupNode};

/// The standard property-hierarchy treemaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Listing count by type, then location
    CountByTypeAndLocation,
    /// Total price by type, then location
    ValueByTypeAndLocation,
    /// Total price by type only (single level)
    ValueByType,
    /// Listing count by type, then price range, then location
    CountByTypePriceRangeLocation,
}

impl View {
    pub const ALL: [View; 4] = [
        View::CountByTypeAndLocation,
        View::ValueByTypeAndLocation,
        View::ValueByType,
        View::CountByTypePriceRangeLocation,
    ];

    pub fn keys(self) -> &'static [Field] {
        match self {
            View::CountByTypeAndLocation | View::ValueByTypeAndLocation => {
                &[Field::Kind, Field::Location]
            }
            View::ValueByType => &[Field::Kind],
            View::CountByTypePriceRangeLocation => {
                &[Field::Kind, Field::PriceBucket, Field::Location]
            }
        }
    }

    /// Summed field, or None to count listings.
    pub fn weight(self) -> Option<Field> {
        match self {
            View::CountByTypeAndLocation | View::CountByTypePriceRangeLocation => None,
            View::ValueByTypeAndLocation | View::ValueByType => Some(Field::Price),
        }
    }

    pub fn unit(self) -> WeightUnit {
        match self.weight() {
            Some(_) => WeightUnit::Currency,
            None => WeightUnit::Count,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::CountByTypeAndLocation => "Property Type Hierarchy - Count by Type and Location",
            View::ValueByTypeAndLocation => {
                "Property Type Hierarchy - Total Value by Type and Location"
            }
            View::ValueByType => "Property Type Hierarchy - Total Market Value",
            View::CountByTypePriceRangeLocation => {
                "Multi-Level Property Hierarchy - Type / Price Range / Location"
            }
        }
    }

    /// File stem a renderer can save this view under.
    pub fn slug(self) -> &'static str {
        match self {
            View::CountByTypeAndLocation => "treemap_count",
            View::ValueByTypeAndLocation => "treemap_value",
            View::ValueByType => "treemap_squarify",
            View::CountByTypePriceRangeLocation => "treemap_multilevel",
        }
    }

    /// Aggregate `records` for this view and lay the result out in `bounds`.
    pub fn build(
        self,
        records: &[Record],
        bounds: Rect,
        config: &LayoutConfig,
    ) -> Result<ViewLayout> {
        let root = aggregate(records, self.keys(), self.weight())?;
        let layout = compute_layout(&root, bounds, config)?;
        tracing::debug!(
            "View {}: {} items, worst aspect {:.2}",
            self.slug(),
            layout.items.len(),
            layout.worst_aspect_ratio()
        );
        Ok(ViewLayout {
            view: self,
            root,
            layout,
        })
    }
}

/// A view's hierarchy together with its layout.
#[derive(Debug, Clone)]
pub struct ViewLayout {
    pub view: View,
    pub root: GroupNode,
    pub layout: Layout,
}
