use crate::model::Tile;

/// Offset from the pointer so the tooltip does not sit under the cursor.
pub const POINTER_OFFSET: (f64, f64) = (10.0, 10.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub name: String,
    pub category: String,
    pub value: f64,
}

impl Tooltip {
    pub fn for_tile(tile: &Tile) -> Self {
        Self {
            name: tile.name.clone(),
            category: tile.category.clone(),
            value: tile.value,
        }
    }

    pub fn lines(&self) -> [String; 3] {
        [
            format!("Name: {}", self.name),
            format!("Category: {}", self.category),
            format!("Value: {}", self.value),
        ]
    }

    pub fn position(pointer: (f64, f64)) -> (f64, f64) {
        (pointer.0 + POINTER_OFFSET.0, pointer.1 + POINTER_OFFSET.1)
    }
}
