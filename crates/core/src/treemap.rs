//! Squarified treemap layout.
//!
//! The hierarchy is tiled top-down: every internal node splits its rectangle
//! among its (sorted) children in rows, each row laid along the shorter side
//! of the remaining space and grown while its worst aspect ratio keeps
//! improving. Siblings are separated by `padding_inner`.

use crate::color::{OrdinalScale, CATEGORY10};
use crate::error::{Error, Result};
use crate::hierarchy::Hierarchy;
use crate::legend::{Legend, LegendLayout};
use crate::model::{HierarchyNode, Rect, Tile};

/// Golden ratio, the default target aspect ratio for squarified rows.
pub const PHI: f64 = 1.618_033_988_749_895;

pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_HEIGHT: f64 = 570.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreemapLayout {
    pub width: f64,
    pub height: f64,
    pub padding_inner: f64,
    pub ratio: f64,
}

impl Default for TreemapLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            padding_inner: 1.0,
            ratio: PHI,
        }
    }
}

impl TreemapLayout {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Canvas sides must be positive and padding non-negative.
    pub fn validate(&self) -> Result<()> {
        let sides = |v: f64| v.is_finite() && v > 0.0;
        if sides(self.width)
            && sides(self.height)
            && self.padding_inner.is_finite()
            && self.padding_inner >= 0.0
        {
            return Ok(());
        }
        Err(Error::InvalidLayout {
            width: self.width,
            height: self.height,
            padding: self.padding_inner,
        })
    }

    /// Assigns `rect` to every node of `hierarchy`.
    pub fn apply(&self, hierarchy: &mut Hierarchy) {
        let root = hierarchy.root;
        hierarchy.get_mut(root).rect = Rect::new(0.0, 0.0, self.width, self.height);
        let half = self.padding_inner / 2.0;

        for id in hierarchy.each_before() {
            let node = hierarchy.get_mut(id);
            let p = if node.depth == 0 { 0.0 } else { half };
            let rect = collapse(Rect::new(
                node.rect.x0 + p,
                node.rect.y0 + p,
                node.rect.x1 - p,
                node.rect.y1 - p,
            ));
            node.rect = rect;
            if node.children.is_empty() {
                continue;
            }

            // Children shrink by `half` on entry, so tiling the expanded
            // rectangle keeps the outer edges flush with the parent.
            let area = collapse(Rect::new(
                rect.x0 - half,
                rect.y0 - half,
                rect.x1 + half,
                rect.y1 + half,
            ));
            let children = node.children.clone();
            let values: Vec<f64> = children.iter().map(|c| hierarchy.get(*c).value).collect();
            for (child, r) in children.iter().zip(squarify(self.ratio, &values, area)) {
                hierarchy.get_mut(*child).rect = r;
            }
        }
    }
}

fn collapse(mut r: Rect) -> Rect {
    if r.x1 < r.x0 {
        let mid = (r.x0 + r.x1) / 2.0;
        r.x0 = mid;
        r.x1 = mid;
    }
    if r.y1 < r.y0 {
        let mid = (r.y0 + r.y1) / 2.0;
        r.y0 = mid;
        r.y1 = mid;
    }
    r
}

/// Tiles `area` with one rectangle per value, in order.
pub fn squarify(ratio: f64, values: &[f64], area: Rect) -> Vec<Rect> {
    let n = values.len();
    let mut out = vec![Rect::default(); n];
    let mut remaining: f64 = values.iter().sum();
    let Rect {
        mut x0,
        mut y0,
        x1,
        y1,
    } = area;
    let (mut i0, mut i1) = (0usize, 0usize);

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Skip over leading empty values.
        let mut sum = loop {
            let v = values[i1];
            i1 += 1;
            if v != 0.0 || i1 >= n {
                break v;
            }
        };
        let mut min_value = sum;
        let mut max_value = sum;
        let alpha = (dy / dx).max(dx / dy) / (remaining * ratio);
        let mut beta = sum * sum * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        while i1 < n {
            let v = values[i1];
            sum += v;
            min_value = min_value.min(v);
            max_value = max_value.max(v);
            beta = sum * sum * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum -= v;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        let row = &values[i0..i1];
        let slots = &mut out[i0..i1];
        if dx < dy {
            let top = y0;
            let bottom = if remaining != 0.0 {
                y0 += dy * sum / remaining;
                y0
            } else {
                y1
            };
            dice(row, Rect::new(x0, top, x1, bottom), slots);
        } else {
            let left = x0;
            let right = if remaining != 0.0 {
                x0 += dx * sum / remaining;
                x0
            } else {
                x1
            };
            slice(row, Rect::new(left, y0, right, y1), slots);
        }
        remaining -= sum;
        i0 = i1;
    }
    out
}

/// Lays `values` side by side from left to right, each spanning the full height.
pub fn dice(values: &[f64], area: Rect, out: &mut [Rect]) {
    let total: f64 = values.iter().sum();
    let k = if total != 0.0 { area.width() / total } else { 0.0 };
    let mut x = area.x0;
    for (v, slot) in values.iter().zip(out.iter_mut()) {
        let next = x + v * k;
        *slot = Rect::new(x, area.y0, next, area.y1);
        x = next;
    }
}

/// Stacks `values` from top to bottom, each spanning the full width.
pub fn slice(values: &[f64], area: Rect, out: &mut [Rect]) {
    let total: f64 = values.iter().sum();
    let k = if total != 0.0 { area.height() / total } else { 0.0 };
    let mut y = area.y0;
    for (v, slot) in values.iter().zip(out.iter_mut()) {
        let next = y + v * k;
        *slot = Rect::new(area.x0, y, area.x1, next);
        y = next;
    }
}

/// Builds a treemap of `root` on a `width` x `height` canvas with 1-unit
/// padding between siblings.
pub fn build(root: &HierarchyNode, width: f64, height: f64) -> Result<Treemap> {
    Treemap::build_with(root, &TreemapLayout::sized(width, height))
}

/// The renderable result of a layout: one tile per leaf plus the category
/// colors shared with the legend.
#[derive(Debug, Clone)]
pub struct Treemap {
    pub width: f64,
    pub height: f64,
    pub tiles: Vec<Tile>,
    pub colors: OrdinalScale,
}

impl Treemap {
    pub fn build_with(root: &HierarchyNode, layout: &TreemapLayout) -> Result<Self> {
        layout.validate()?;
        let mut hierarchy = Hierarchy::from_data(root)?;
        layout.apply(&mut hierarchy);
        let colors = OrdinalScale::category10(hierarchy.categories());

        let tiles: Vec<Tile> = hierarchy
            .leaves()
            .into_iter()
            .map(|id| {
                let node = hierarchy.get(id);
                let category = node.category.clone().unwrap_or_default();
                let color = colors.color_of(&category).unwrap_or(CATEGORY10[0]);
                Tile {
                    key: node.key.clone(),
                    name: node.name.clone(),
                    category,
                    value: node.value,
                    rect: node.rect,
                    color,
                }
            })
            .collect();

        tracing::debug!(
            tiles = tiles.len(),
            categories = colors.domain().len(),
            width = layout.width,
            height = layout.height,
            "treemap built"
        );

        Ok(Self {
            width: layout.width,
            height: layout.height,
            tiles,
            colors,
        })
    }

    pub fn categories(&self) -> &[String] {
        self.colors.domain()
    }

    pub fn legend(&self, layout: &LegendLayout) -> Legend {
        Legend::build(self.categories(), &self.colors, layout)
    }

    /// The tile under a canvas point, if any.
    pub fn tile_at(&self, x: f64, y: f64) -> Option<(usize, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .find(|(_, t)| t.rect.contains(x, y))
    }

    pub fn total_value(&self) -> f64 {
        self.tiles.iter().map(|t| t.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn degenerate_canvas_is_rejected() {
        assert!(TreemapLayout::default().validate().is_ok());
        for layout in [
            TreemapLayout::sized(0.0, 570.0),
            TreemapLayout::sized(960.0, f64::NAN),
            TreemapLayout {
                padding_inner: -1.0,
                ..TreemapLayout::default()
            },
        ] {
            assert!(matches!(
                Treemap::build_with(&two_groups(), &layout),
                Err(Error::InvalidLayout { .. })
            ));
        }
    }

    fn two_groups() -> HierarchyNode {
        HierarchyNode::branch(
            "root",
            vec![
                HierarchyNode::branch(
                    "A",
                    vec![
                        HierarchyNode::leaf("a10", "A", 10.0),
                        HierarchyNode::leaf("a30", "A", 30.0),
                    ],
                ),
                HierarchyNode::branch("B", vec![HierarchyNode::leaf("b60", "B", 60.0)]),
            ],
        )
    }

    fn unpadded(width: f64, height: f64) -> TreemapLayout {
        TreemapLayout {
            padding_inner: 0.0,
            ..TreemapLayout::sized(width, height)
        }
    }

    fn area_of(map: &Treemap, name: &str) -> f64 {
        map.tiles.iter().find(|t| t.name == name).unwrap().rect.area()
    }

    #[test]
    fn worked_example_splits_by_value() {
        let map = Treemap::build_with(&two_groups(), &unpadded(100.0, 100.0)).unwrap();
        assert!((area_of(&map, "b60") - 6000.0).abs() < EPS);
        assert!((area_of(&map, "a10") - 1000.0).abs() < EPS);
        assert!((area_of(&map, "a30") - 3000.0).abs() < EPS);
    }

    #[test]
    fn leaves_come_out_in_sorted_preorder() {
        let map = build(&two_groups(), 100.0, 100.0).unwrap();
        let names: Vec<&str> = map.tiles.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["b60", "a30", "a10"]);
        assert_eq!(map.categories(), ["B", "A"]);
        assert_eq!(map.tiles[0].key, "root.B.b60");
    }

    #[test]
    fn tiles_share_category_color() {
        let map = build(&two_groups(), 100.0, 100.0).unwrap();
        assert_eq!(map.tiles[1].color, map.tiles[2].color);
        assert_ne!(map.tiles[0].color, map.tiles[1].color);
        assert_eq!(map.colors.color_of("B"), Some(map.tiles[0].color));
    }

    #[test]
    fn padding_leaves_one_unit_gap_between_siblings() {
        let map = build(&two_groups(), 100.0, 100.0).unwrap();
        let b = map.tiles[0].rect;
        // Both groups fit one row: B on top, A below it.
        assert!((b.x0 - 0.0).abs() < EPS);
        assert!((b.y0 - 0.0).abs() < EPS);
        assert!((b.x1 - 100.0).abs() < EPS);
        let (a30, a10) = (map.tiles[1].rect, map.tiles[2].rect);
        assert!((a30.y0 - b.y1 - 1.0).abs() < EPS);
        assert!((a10.x0 - a30.x1 - 1.0).abs() < EPS);
        assert!((a10.y1 - 100.0).abs() < EPS);
        for t in &map.tiles {
            assert!(Rect::new(0.0, 0.0, 100.0, 100.0).encloses(&t.rect, EPS));
        }
    }

    #[test]
    fn squarify_prefers_square_rows() {
        let rects = squarify(PHI, &[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0], Rect::new(0.0, 0.0, 6.0, 4.0));
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - 24.0).abs() < EPS);
        // First row holds the two biggest values stacked on the left.
        assert!((rects[0].x0 - 0.0).abs() < EPS);
        assert!((rects[1].x0 - 0.0).abs() < EPS);
        assert!((rects[0].x1 - 3.0).abs() < EPS);
        assert!((rects[1].y1 - 4.0).abs() < EPS);
    }

    #[test]
    fn squarify_single_value_fills_area() {
        let area = Rect::new(2.0, 3.0, 12.0, 8.0);
        let rects = squarify(PHI, &[7.0], area);
        assert_eq!(rects, vec![area]);
    }

    #[test]
    fn dice_and_slice_split_proportionally() {
        let mut out = [Rect::default(); 2];
        dice(&[1.0, 3.0], Rect::new(0.0, 0.0, 8.0, 2.0), &mut out);
        assert_eq!(out[0], Rect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(out[1], Rect::new(2.0, 0.0, 8.0, 2.0));
        slice(&[1.0, 3.0], Rect::new(0.0, 0.0, 2.0, 8.0), &mut out);
        assert_eq!(out[0], Rect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(out[1], Rect::new(0.0, 2.0, 2.0, 8.0));
    }

    #[test]
    fn hit_test_finds_tile_under_pointer() {
        let map = build(&two_groups(), 100.0, 100.0).unwrap();
        let (x, y) = map.tiles[2].rect.center();
        let (idx, tile) = map.tile_at(x, y).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(tile.name, map.tiles[2].name);
        assert!(map.tile_at(-1.0, 50.0).is_none());
    }

    #[test]
    fn default_canvas_matches_page_size() {
        let layout = TreemapLayout::default();
        assert_eq!((layout.width, layout.height), (960.0, 570.0));
        assert_eq!(layout.padding_inner, 1.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn dataset() -> impl Strategy<Value = HierarchyNode> {
            prop::collection::vec(prop::collection::vec(1u32..1000, 1..8), 1..8).prop_map(|groups| {
                HierarchyNode::branch(
                    "root",
                    groups
                        .into_iter()
                        .enumerate()
                        .map(|(g, leaves)| {
                            let cat = format!("cat{g}");
                            HierarchyNode::branch(
                                cat.clone(),
                                leaves
                                    .into_iter()
                                    .enumerate()
                                    .map(|(i, v)| {
                                        HierarchyNode::leaf(format!("item{i}"), cat.clone(), f64::from(v))
                                    })
                                    .collect(),
                            )
                        })
                        .collect(),
                )
            })
        }

        proptest! {
            #[test]
            fn prop_unpadded_areas_fill_canvas(data in dataset(), w in 50.0f64..1200.0, h in 50.0f64..800.0) {
                let map = Treemap::build_with(&data, &unpadded(w, h)).unwrap();
                let total: f64 = map.tiles.iter().map(|t| t.rect.area()).sum();
                prop_assert!((total - w * h).abs() < 1e-6 * w * h);
            }

            #[test]
            fn prop_area_is_proportional_to_value(data in dataset()) {
                let map = Treemap::build_with(&data, &unpadded(960.0, 570.0)).unwrap();
                let total = map.total_value();
                for t in &map.tiles {
                    let expected = t.value / total * 960.0 * 570.0;
                    prop_assert!((t.rect.area() - expected).abs() < 1e-6 * 960.0 * 570.0);
                }
            }

            #[test]
            fn prop_tiles_never_overlap(data in dataset()) {
                let map = build(&data, 960.0, 570.0).unwrap();
                let canvas = Rect::new(0.0, 0.0, 960.0, 570.0);
                // Slivers thinner than the padding collapse to zero area.
                for (i, a) in map.tiles.iter().enumerate() {
                    if a.rect.area() > 0.0 {
                        prop_assert!(canvas.encloses(&a.rect, 1e-6));
                    }
                    for b in &map.tiles[i + 1..] {
                        prop_assert!(!a.rect.overlaps(&b.rect, 1e-6));
                    }
                }
            }

            #[test]
            fn prop_larger_sibling_gets_no_less_area(data in dataset()) {
                let map = Treemap::build_with(&data, &unpadded(960.0, 570.0)).unwrap();
                for a in &map.tiles {
                    for b in &map.tiles {
                        if a.category == b.category && a.value > b.value {
                            prop_assert!(a.rect.area() + 1e-6 >= b.rect.area());
                        }
                    }
                }
            }

            #[test]
            fn prop_leaves_stay_inside_their_group(data in dataset()) {
                let mut hierarchy = Hierarchy::from_data(&data).unwrap();
                TreemapLayout::default().apply(&mut hierarchy);
                for node in hierarchy.nodes.iter().filter(|n| n.rect.area() > 0.0) {
                    if let Some(parent) = node.parent {
                        prop_assert!(hierarchy.get(parent).rect.encloses(&node.rect, 1e-6));
                    }
                }
            }

            #[test]
            fn prop_colors_follow_first_seen_order(data in dataset()) {
                let map = build(&data, 960.0, 570.0).unwrap();
                let mut seen: Vec<&str> = Vec::new();
                for t in &map.tiles {
                    if !seen.contains(&t.category.as_str()) {
                        seen.push(&t.category);
                    }
                    prop_assert_eq!(map.colors.color_of(&t.category), Some(t.color));
                }
                prop_assert_eq!(map.categories().iter().map(String::as_str).collect::<Vec<_>>(), seen);
            }
        }
    }
}
