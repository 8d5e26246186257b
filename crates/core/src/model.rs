use serde::{Deserialize, Deserializer, Serialize};

use crate::color::Color;

/// One node of the input document. Groups carry `children`, leaves carry
/// `category` and `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn leaf(name: impl Into<String>, category: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            category: Some(category.into()),
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            name: name.into(),
            category: None,
            value: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// The published datasets encode values as strings ("20.61").
fn lenient_number<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(de)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("value `{s}` is not a number"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Half-open on the far edges so adjacent tiles never both claim a point.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// True when the interiors intersect; shared edges do not count.
    pub fn overlaps(&self, other: &Rect, eps: f64) -> bool {
        self.x0 < other.x1 - eps
            && other.x0 < self.x1 - eps
            && self.y0 < other.y1 - eps
            && other.y0 < self.y1 - eps
    }

    pub fn encloses(&self, other: &Rect, eps: f64) -> bool {
        other.x0 >= self.x0 - eps
            && other.y0 >= self.y0 - eps
            && other.x1 <= self.x1 + eps
            && other.y1 <= self.y1 + eps
    }
}

/// Arena entry of a laid-out hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Dot-joined path of ancestor names, e.g. `root.Wii.Wii Sports`.
    pub key: String,
    pub name: String,
    pub category: Option<String>,
    /// Own value for leaves, sum of descendant leaves otherwise.
    pub value: f64,
    pub depth: usize,
    pub height: usize,
    pub children: Vec<NodeId>,
    pub rect: Rect,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A renderable leaf rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub key: String,
    pub name: String,
    pub category: String,
    pub value: f64,
    pub rect: Rect,
    pub color: Color,
}
