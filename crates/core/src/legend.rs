use serde::Serialize;

use crate::color::{Color, OrdinalScale, CATEGORY10};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendLayout {
    pub width: f64,
    pub height: f64,
    pub columns: usize,
    /// Horizontal pitch between columns.
    pub column_width: f64,
    pub row_height: f64,
    pub swatch_width: f64,
    pub swatch_height: f64,
}

impl Default for LegendLayout {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 90.0,
            columns: 6,
            column_width: 171.9,
            row_height: 30.0,
            swatch_width: 100.0,
            swatch_height: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub category: String,
    pub color: Color,
    pub column: usize,
    pub row: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub layout: LegendLayout,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn build(categories: &[String], colors: &OrdinalScale, layout: &LegendLayout) -> Self {
        let columns = layout.columns.max(1);
        let entries = categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let (column, row) = (i % columns, i / columns);
                LegendEntry {
                    category: category.clone(),
                    color: colors.color_of(category).unwrap_or(CATEGORY10[0]),
                    column,
                    row,
                    x: column as f64 * layout.column_width,
                    y: row as f64 * layout.row_height,
                }
            })
            .collect();
        Self {
            layout: *layout,
            entries,
        }
    }

    /// Anchor of an entry's centred label.
    pub fn label_anchor(&self, entry: &LegendEntry) -> (f64, f64) {
        (entry.x + self.layout.swatch_width / 2.0, entry.y + 15.0)
    }

    pub fn rows(&self) -> usize {
        self.entries.iter().map(|e| e.row + 1).max().unwrap_or(0)
    }

    /// Configured height, grown to fit every row.
    pub fn canvas_height(&self) -> f64 {
        self.layout
            .height
            .max(self.rows() as f64 * self.layout.row_height)
    }
}
