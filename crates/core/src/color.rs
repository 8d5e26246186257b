use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in [0, 1] (sRGB coefficients, no gamma).
    pub fn luminance(&self) -> f64 {
        (0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b))
            / 255.0
    }

    /// Label color that stays readable on top of `self`.
    pub fn text_color(&self) -> Color {
        if self.luminance() > 0.6 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    pub fn as_unit_rgb(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

pub const CATEGORY10: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// Maps a fixed domain of categories onto a palette. The i-th category of the
/// domain gets `palette[i % palette.len()]`.
#[derive(Debug, Clone, Default)]
pub struct OrdinalScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    palette: Vec<Color>,
}

impl OrdinalScale {
    /// Duplicate entries in `domain` keep their first position.
    pub fn new<I, S>(domain: I, palette: &[Color]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scale = Self {
            domain: Vec::new(),
            index: HashMap::new(),
            palette: palette.to_vec(),
        };
        for category in domain {
            let category = category.into();
            if !scale.index.contains_key(&category) {
                scale.index.insert(category.clone(), scale.domain.len());
                scale.domain.push(category);
            }
        }
        scale
    }

    pub fn category10<I, S>(domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(domain, &CATEGORY10)
    }

    pub fn color_of(&self, category: &str) -> Option<Color> {
        if self.palette.is_empty() {
            return None;
        }
        self.index
            .get(category)
            .map(|&i| self.palette[i % self.palette.len()])
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}
