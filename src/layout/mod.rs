pub mod squarify;

use std::collections::HashMap;

use compact_str::CompactString;

use self::squarify::squarify;
use crate::error::{Result, TreemapError};
use crate::tree::GroupNode;

/// Axis-aligned rectangle. `w` and `h` are never negative in layout output.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// True when there is nothing to subdivide.
    pub fn is_degenerate(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Longer side over shorter side (1.0 = square, infinite when degenerate).
    pub fn aspect_ratio(&self) -> f64 {
        if self.is_degenerate() {
            return f64::INFINITY;
        }
        (self.w / self.h).max(self.h / self.w)
    }

    /// Zero-area rectangle at this one's origin.
    pub fn collapsed(&self) -> Rect {
        Rect::new(self.x, self.y, 0.0, 0.0)
    }

    /// Shrink by `pad` on every side, never past the centre.
    pub fn inset(&self, pad: f64) -> Rect {
        let pad = pad.min(self.w / 2.0).min(self.h / 2.0).max(0.0);
        Rect::new(
            self.x + pad,
            self.y + pad,
            self.w - 2.0 * pad,
            self.h - 2.0 * pad,
        )
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        w.max(0.0) * h.max(0.0)
    }

    fn is_valid(&self) -> bool {
        [self.x, self.y, self.w, self.h]
            .iter()
            .all(|v| v.is_finite())
            && self.w >= 0.0
            && self.h >= 0.0
    }
}

/// A positioned group in the treemap.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    /// Key values from the layout root down to this group
    pub path: Vec<CompactString>,
    pub rect: Rect,
    pub weight: f64,
    /// Fraction of the parent's weight (1.0 for the layout root)
    pub share: f64,
    /// Frame of an internal group (only with `LayoutConfig::include_groups`)
    pub is_group: bool,
}

impl LayoutItem {
    fn new(node: &GroupNode, rect: Rect, share: f64, is_group: bool) -> Self {
        Self {
            path: node.path.clone(),
            rect,
            weight: node.weight,
            share,
            is_group,
        }
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Top-level key (None for the root item).
    pub fn top_key(&self) -> Option<&str> {
        self.path.first().map(|s| s.as_str())
    }

    pub fn key(&self) -> Option<&str> {
        self.path.last().map(|s| s.as_str())
    }
}

/// Configuration for treemap layout.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Inset applied inside each nested group (0.0 = leaves tile the bounds exactly)
    pub padding: f64,
    /// How much padding shrinks per nesting level (0.0 = only the first level, 0.75 = nice taper)
    pub padding_falloff: f64,
    /// Groups at this depth are emitted whole instead of being subdivided
    pub max_depth: u16,
    /// Also emit a frame item for every internal group, before its descendants
    pub include_groups: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 0.0,
            padding_falloff: 0.75,
            max_depth: 64,
            include_groups: false,
        }
    }
}

/// The full layout result (items + fast lookup by path).
#[derive(Debug, Clone)]
pub struct Layout {
    pub bounds: Rect,
    /// Depth-first, children in weight order
    pub items: Vec<LayoutItem>,
    /// path → index into `items`
    pub index: HashMap<Vec<CompactString>, usize>,
}

impl Layout {
    fn new(bounds: Rect, items: Vec<LayoutItem>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.path.clone(), i))
            .collect();
        Self {
            bounds,
            items,
            index,
        }
    }

    pub fn find(&self, path: &[&str]) -> Option<&LayoutItem> {
        let key: Vec<CompactString> = path.iter().map(|s| CompactString::new(s)).collect();
        self.index.get(&key).map(|&i| &self.items[i])
    }

    /// Terminal items (everything except group frames).
    pub fn leaves(&self) -> impl Iterator<Item = &LayoutItem> {
        self.items.iter().filter(|item| !item.is_group)
    }

    /// Fraction of `bounds` covered by leaf rectangles (1.0 without padding).
    pub fn coverage(&self) -> f64 {
        let total = self.bounds.area();
        if total <= 0.0 {
            return 0.0;
        }
        self.leaves().map(|item| item.rect.area()).sum::<f64>() / total
    }

    /// Largest aspect ratio among leaves with non-zero area (1.0 when there are none).
    pub fn worst_aspect_ratio(&self) -> f64 {
        self.leaves()
            .filter(|item| !item.rect.is_degenerate())
            .map(|item| item.rect.aspect_ratio())
            .fold(1.0, f64::max)
    }

    pub fn into_items(self) -> Vec<LayoutItem> {
        self.items
    }
}

/// Lay `root` out into `bounds` with the default configuration.
pub fn layout(root: &GroupNode, bounds: Rect) -> Result<Vec<LayoutItem>> {
    compute_layout(root, bounds, &LayoutConfig::default()).map(Layout::into_items)
}

/// A group waiting to be placed or subdivided.
struct Pending<'a> {
    node: &'a GroupNode,
    rect: Rect,
    share: f64,
    depth: u16,
}

/// Compute the squarified layout of any subtree.
///
/// Leaf areas are proportional to leaf weights. Zero-weight groups get a
/// zero-area rectangle and take no part in subdivision.
pub fn compute_layout(root: &GroupNode, bounds: Rect, config: &LayoutConfig) -> Result<Layout> {
    if !bounds.is_valid() {
        return Err(TreemapError::InvalidBounds {
            w: bounds.w,
            h: bounds.h,
        });
    }

    let mut items = Vec::with_capacity(root.leaf_count());
    let mut stack = vec![Pending {
        node: root,
        rect: bounds,
        share: 1.0,
        depth: 0,
    }];

    while let Some(Pending {
        node,
        rect,
        share,
        depth,
    }) = stack.pop()
    {
        if !has_weight(node.weight) {
            items.push(LayoutItem::new(node, rect.collapsed(), share, false));
            continue;
        }
        if node.is_leaf() || depth >= config.max_depth {
            items.push(LayoutItem::new(node, rect, share, false));
            continue;
        }

        if config.include_groups {
            items.push(LayoutItem::new(node, rect, share, true));
        }

        let slots = layout_children(node, rect, depth, config);
        // reversed so the first child is popped (and emitted) first
        stack.extend(slots.into_iter().rev());
    }

    tracing::debug!(
        "Laid out {} items (root weight={:.2}) in {:.0}x{:.0}",
        items.len(),
        root.weight,
        bounds.w,
        bounds.h
    );

    Ok(Layout::new(bounds, items))
}

/// Split `rect` among the children of `parent`.
fn layout_children<'a>(
    parent: &'a GroupNode,
    rect: Rect,
    depth: u16,
    config: &LayoutConfig,
) -> Vec<Pending<'a>> {
    // Padding tapers with depth; the outermost level is never padded
    let pad = if depth == 0 {
        0.0
    } else {
        config.padding * config.padding_falloff.powi(i32::from(depth) - 1)
    };
    let inner = rect.inset(pad);

    if inner.is_degenerate() {
        tracing::trace!(
            "Group {:?} has no room ({:?}), collapsing its children",
            parent.path,
            inner
        );
    }

    // Weights relative to the heaviest sibling, so sums of huge weights stay finite
    let scale = parent
        .children
        .iter()
        .filter(|c| has_weight(c.weight))
        .map(magnitude)
        .fold(0.0, f64::max);
    // Largest first; stable, so the aggregator's tie order survives
    let mut sized: Vec<(&GroupNode, f64)> = parent
        .children
        .iter()
        .filter(|c| has_weight(c.weight))
        .map(|c| (c, relative_weight(c, scale)))
        .collect();
    sized.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total: f64 = sized.iter().map(|(_, r)| r).sum();
    let total_area = inner.area();
    let share = |relative: f64| if total > 0.0 { relative / total } else { 0.0 };
    let areas: Vec<f64> = sized
        .iter()
        .map(|&(_, r)| share(r) * total_area)
        .collect();
    let rects = squarify(&areas, inner);

    let child_depth = depth.saturating_add(1);
    let mut slots: Vec<Pending<'a>> = sized
        .into_iter()
        .zip(rects)
        .map(|((node, r), rect)| Pending {
            node,
            rect,
            share: share(r),
            depth: child_depth,
        })
        .collect();

    slots.extend(
        parent
            .children
            .iter()
            .filter(|c| !has_weight(c.weight))
            .map(|node| Pending {
                node,
                rect: inner.collapsed(),
                share: 0.0,
                depth: child_depth,
            }),
    );

    slots
}

/// Positive weights take part in slicing. An infinite weight is a sum that
/// overflowed and still gets subdivided.
fn has_weight(weight: f64) -> bool {
    weight > 0.0
}

/// The node's weight, or its heaviest leaf when its own sum overflowed.
fn magnitude(node: &GroupNode) -> f64 {
    if node.weight.is_finite() {
        return node.weight;
    }
    node.leaves()
        .map(|leaf| leaf.weight)
        .filter(|w| w.is_finite())
        .fold(0.0, f64::max)
}

/// `node`'s weight divided by `scale`, re-summed from its leaves when it overflowed.
fn relative_weight(node: &GroupNode, scale: f64) -> f64 {
    if scale <= 0.0 {
        return 0.0;
    }
    if node.weight.is_finite() {
        return node.weight / scale;
    }
    node.leaves()
        .map(|leaf| leaf.weight)
        .filter(|w| w.is_finite() && *w > 0.0)
        .map(|w| w / scale)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Field, Record};
    use crate::tree::aggregate;

    const TOL: f64 = 1e-6;

    fn path(keys: &[&str]) -> Vec<CompactString> {
        keys.iter().map(|k| CompactString::new(k)).collect()
    }

    fn sample_tree() -> GroupNode {
        let rows = [
            ("Apartment", "Chicago", 410_000.0),
            ("Apartment", "Chicago", 380_000.0),
            ("Apartment", "New York", 910_000.0),
            ("Apartment", "San Jose", 730_000.0),
            ("Villa", "Dallas", 1_520_000.0),
            ("Villa", "San Diego", 2_950_000.0),
            ("House", "Houston", 520_000.0),
            ("House", "Phoenix", 610_000.0),
            ("House", "Phoenix", 540_000.0),
            ("Condo", "Philadelphia", 395_000.0),
            ("Townhouse", "San Antonio", 350_000.0),
            ("Townhouse", "Los Angeles", 1_170_000.0),
        ];
        let records: Vec<Record> = rows
            .iter()
            .enumerate()
            .map(|(i, (kind, location, price))| {
                Record::new(&format!("PROP_{:04}", i + 1), kind, location, *price, 1_500.0)
            })
            .collect();
        aggregate(
            &records,
            &[Field::Kind, Field::PriceBucket, Field::Location],
            Some(Field::Price),
        )
        .unwrap()
    }

    fn assert_tiles(items: &[LayoutItem], bounds: Rect) {
        let area: f64 = items.iter().map(|i| i.rect.area()).sum();
        assert!((area - bounds.area()).abs() < TOL * bounds.area().max(1.0));

        for (i, a) in items.iter().enumerate() {
            assert!(a.rect.x >= bounds.x - TOL && a.rect.y >= bounds.y - TOL);
            assert!(a.rect.right() <= bounds.right() + TOL);
            assert!(a.rect.bottom() <= bounds.bottom() + TOL);
            for b in &items[i + 1..] {
                let overlap = a.rect.intersection_area(&b.rect);
                assert!(overlap < TOL, "{:?} overlaps {:?}", a.path, b.path);
            }
        }
    }

    #[test]
    fn single_leaf_child_fills_bounds() {
        let root = GroupNode::branch(Vec::new(), vec![GroupNode::leaf(path(&["A"]), 5.0)]);
        let items = layout(&root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rect, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(items[0].path, ["A"]);
        assert_eq!(items[0].weight, 5.0);
    }

    #[test]
    fn leaf_root_is_a_single_item() {
        let root = GroupNode::leaf(Vec::new(), 3.0);
        let bounds = Rect::new(2.0, 3.0, 40.0, 10.0);
        let items = layout(&root, bounds).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rect, bounds);
        assert!(items[0].path.is_empty());
    }

    #[test]
    fn leaves_tile_the_bounds() {
        let root = sample_tree();
        let bounds = Rect::new(0.0, 0.0, 1600.0, 900.0);
        let items = layout(&root, bounds).unwrap();

        assert_eq!(items.len(), root.leaf_count());
        assert_tiles(&items, bounds);
        assert!(items.iter().all(|i| i.path.len() == 3));
    }

    #[test]
    fn leaf_area_is_proportional_to_weight() {
        let root = sample_tree();
        let bounds = Rect::new(10.0, 20.0, 333.0, 127.0);
        let items = layout(&root, bounds).unwrap();

        for item in &items {
            let area_share = item.rect.area() / bounds.area();
            let weight_share = item.weight / root.weight;
            assert!(
                (area_share - weight_share).abs() < TOL,
                "{:?}: {area_share} vs {weight_share}",
                item.path
            );
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let root = sample_tree();
        let bounds = Rect::new(0.0, 0.0, 1600.0, 900.0);
        let first = layout(&root, bounds).unwrap();
        let second = layout(&root, bounds).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.rect.x.to_bits(), b.rect.x.to_bits());
            assert_eq!(a.rect.w.to_bits(), b.rect.w.to_bits());
        }
    }

    #[test]
    fn output_follows_child_order_depth_first() {
        let root = GroupNode::branch(
            Vec::new(),
            vec![
                GroupNode::branch(
                    path(&["B"]),
                    vec![
                        GroupNode::leaf(path(&["B", "x"]), 4.0),
                        GroupNode::leaf(path(&["B", "y"]), 2.0),
                    ],
                ),
                GroupNode::leaf(path(&["A"]), 3.0),
            ],
        );
        let items = layout(&root, Rect::new(0.0, 0.0, 9.0, 6.0)).unwrap();
        let keys: Vec<_> = items.iter().map(|i| i.path.join("/")).collect();
        assert_eq!(keys, ["B/x", "B/y", "A"]);
        assert!((items[0].share - 4.0 / 6.0).abs() < TOL);
        assert!((items[2].share - 3.0 / 9.0).abs() < TOL);
    }

    #[test]
    fn equal_weights_give_equal_cells() {
        let children = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|k| GroupNode::leaf(path(&[k]), 1.0))
            .collect();
        let root = GroupNode::branch(Vec::new(), children);
        let bounds = Rect::new(0.0, 0.0, 300.0, 200.0);
        let items = layout(&root, bounds).unwrap();

        assert_tiles(&items, bounds);
        for item in &items {
            assert!((item.rect.area() - 10_000.0).abs() < TOL);
            assert!(item.rect.aspect_ratio() < 1.5);
        }
    }

    #[test]
    fn zero_weight_children_get_empty_rects() {
        let root = GroupNode::branch(
            Vec::new(),
            vec![
                GroupNode::leaf(path(&["full"]), 8.0),
                GroupNode::leaf(path(&["empty"]), 0.0),
                GroupNode::branch(
                    path(&["hollow"]),
                    vec![GroupNode::leaf(path(&["hollow", "x"]), 0.0)],
                ),
            ],
        );
        let bounds = Rect::new(0.0, 0.0, 4.0, 2.0);
        let items = layout(&root, bounds).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].rect, bounds);
        assert_eq!(items[1].path, ["empty"]);
        assert_eq!(items[1].rect.area(), 0.0);
        // a zero-weight group is emitted whole, not subdivided
        assert_eq!(items[2].path, ["hollow"]);
        assert_eq!(items[2].rect.area(), 0.0);
    }

    #[test]
    fn zero_weight_root_collapses() {
        let root = GroupNode::branch(Vec::new(), vec![GroupNode::leaf(path(&["a"]), 0.0)]);
        let items = layout(&root, Rect::new(1.0, 1.0, 5.0, 5.0)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rect, Rect::new(1.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn flat_bounds_give_zero_area_items() {
        let root = sample_tree();
        let items = layout(&root, Rect::new(0.0, 0.0, 500.0, 0.0)).unwrap();
        assert_eq!(items.len(), root.leaf_count());
        assert!(items.iter().all(|i| i.rect.area() == 0.0));
        assert!(items.iter().all(|i| i.rect.w.is_finite() && i.rect.h.is_finite()));
    }

    #[test]
    fn huge_weights_split_evenly() {
        let root = GroupNode::branch(
            Vec::new(),
            vec![
                GroupNode::leaf(path(&["a"]), 1e308),
                GroupNode::leaf(path(&["b"]), 1e308),
            ],
        );
        assert!(root.weight.is_infinite());

        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let items = layout(&root, bounds).unwrap();

        assert_eq!(items.len(), 2);
        assert_tiles(&items, bounds);
        for item in &items {
            assert!((item.rect.area() - 50.0).abs() < TOL, "{:?}", item.rect);
            assert!((item.share - 0.5).abs() < TOL);
        }
    }

    #[test]
    fn overflowing_listing_totals_still_tile() {
        let records = [
            Record::new("PROP_0001", "Villa", "Dallas", 1e308, 2_000.0),
            Record::new("PROP_0002", "Condo", "Dallas", 1e308, 900.0),
            Record::new("PROP_0003", "Condo", "Houston", 5e307, 900.0),
        ];
        let root =
            aggregate(&records, &[Field::Kind, Field::Location], Some(Field::Price)).unwrap();
        let bounds = Rect::new(0.0, 0.0, 40.0, 25.0);
        let items = layout(&root, bounds).unwrap();

        assert_eq!(items.len(), 3);
        assert_tiles(&items, bounds);
        let villa = items.iter().find(|i| i.top_key() == Some("Villa")).unwrap();
        assert!((villa.rect.area() / bounds.area() - 1.0 / 2.5).abs() < TOL);
    }

    #[test]
    fn negative_bounds_are_rejected() {
        let root = sample_tree();
        let err = layout(&root, Rect::new(0.0, 0.0, -1.0, 10.0)).unwrap_err();
        assert!(matches!(err, TreemapError::InvalidBounds { .. }));

        let err = layout(&root, Rect::new(0.0, 0.0, 10.0, f64::NAN)).unwrap_err();
        assert!(matches!(err, TreemapError::InvalidBounds { .. }));
    }

    #[test]
    fn groups_are_framed_before_their_members() {
        let root = sample_tree();
        let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);
        let config = LayoutConfig {
            include_groups: true,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&root, bounds, &config).unwrap();

        let root_frame = &layout.items[0];
        assert!(root_frame.is_group && root_frame.path.is_empty());
        assert_eq!(root_frame.rect, bounds);

        let villa = layout.find(&["Villa"]).unwrap();
        assert!(villa.is_group);
        for leaf in layout.leaves().filter(|l| l.top_key() == Some("Villa")) {
            assert!((leaf.rect.intersection_area(&villa.rect) - leaf.rect.area()).abs() < TOL);
        }
        assert!((layout.coverage() - 1.0).abs() < TOL);
    }

    #[test]
    fn max_depth_stops_subdivision() {
        let root = sample_tree();
        let config = LayoutConfig {
            max_depth: 1,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&root, Rect::new(0.0, 0.0, 100.0, 100.0), &config).unwrap();
        assert_eq!(layout.items.len(), root.children.len());
        assert!(layout.items.iter().all(|i| i.depth() == 1));
    }

    #[test]
    fn padding_nests_children_inside_groups() {
        let root = sample_tree();
        let bounds = Rect::new(0.0, 0.0, 1200.0, 800.0);
        let config = LayoutConfig {
            padding: 4.0,
            include_groups: true,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&root, bounds, &config).unwrap();

        let house = layout.find(&["House"]).unwrap();
        for item in layout.items.iter().filter(|i| i.depth() == 2 && i.top_key() == Some("House")) {
            assert!(item.rect.x >= house.rect.x + 4.0 - TOL);
            assert!(item.rect.right() <= house.rect.right() - 4.0 + TOL);
        }
        assert!(layout.coverage() < 1.0);
    }

    #[test]
    fn worst_aspect_ratio_stays_readable() {
        let root = sample_tree();
        let config = LayoutConfig {
            max_depth: 1,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&root, Rect::new(0.0, 0.0, 1600.0, 900.0), &config).unwrap();
        assert!(layout.worst_aspect_ratio() < 4.0);
    }
}
