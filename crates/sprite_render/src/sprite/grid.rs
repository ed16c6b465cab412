use std::collections::BTreeSet;

use crate::SpriteError;

/// Rectangular grid of single-character glyphs, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GlyphGrid {
    pub width: u32,
    pub height: u32,
    cells: Vec<char>,
}

impl GlyphGrid {
    /// Build a grid from text rows. Every row must hold the same number of glyphs.
    pub fn new<I, S>(rows: I) -> Result<Self, SpriteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cells = Vec::new();
        let mut width = None;
        let mut height = 0u32;

        for (row, text) in rows.into_iter().enumerate() {
            let before = cells.len();
            cells.extend(text.as_ref().chars());
            let actual = cells.len() - before;

            match width {
                None => width = Some(actual),
                Some(expected) if expected != actual => {
                    return Err(SpriteError::RaggedGrid { row, expected, actual });
                },
                Some(_) => {},
            }
            height += 1;
        }

        let width = width.unwrap_or(0) as u32;
        Ok(Self { width, height, cells })
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y * self.width + x) as usize).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> + '_ {
        // `chunks` panics on zero; a 0-wide grid has no cells anyway.
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Distinct glyphs in sorted order.
    pub fn glyphs(&self) -> BTreeSet<char> {
        self.cells.iter().copied().collect()
    }

    pub fn same_shape(&self, other: &GlyphGrid) -> bool {
        self.width == other.width && self.height == other.height
    }
}
