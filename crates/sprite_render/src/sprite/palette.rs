use std::collections::BTreeMap;

use image::Rgba;

use super::grid::GlyphGrid;
use crate::SpriteError;

/// Glyph to color mapping used when rasterizing a [`GlyphGrid`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    name: String,
    entries: BTreeMap<char, Rgba<u8>>,
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: BTreeMap::new() }
    }

    pub fn with_color(mut self, glyph: char, color: Rgba<u8>) -> Self {
        self.entries.insert(glyph, color);
        self
    }

    pub fn from_entries(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (char, Rgba<u8>)>,
    ) -> Self {
        Self { name: name.into(), entries: entries.into_iter().collect() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color for `glyph`, or `None` when the cell should be left untouched.
    pub fn lookup(&self, glyph: char) -> Option<Rgba<u8>> {
        self.entries.get(&glyph).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, Rgba<u8>)> + '_ {
        self.entries.iter().map(|(glyph, color)| (*glyph, *color))
    }

    /// Glyphs used by `grid` that have no entry in this palette.
    pub fn missing_glyphs(&self, grid: &GlyphGrid) -> Vec<char> {
        grid.glyphs().into_iter().filter(|glyph| !self.entries.contains_key(glyph)).collect()
    }
}

/// Ordered collection of palettes that can be swapped at runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaletteSet {
    palettes: Vec<Palette>,
}

impl PaletteSet {
    pub fn new(palettes: Vec<Palette>) -> Self {
        Self { palettes }
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.iter()
    }

    /// Select a palette by its 1-based index.
    pub fn select(&self, index: usize) -> Result<&Palette, SpriteError> {
        index
            .checked_sub(1)
            .and_then(|zero_based| self.palettes.get(zero_based))
            .ok_or(SpriteError::UnknownPalette { index, available: self.palettes.len() })
    }

    pub fn by_name(&self, name: &str) -> Option<&Palette> {
        self.palettes.iter().find(|palette| palette.name.eq_ignore_ascii_case(name))
    }

    /// 1-based index of the palette called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.palettes
            .iter()
            .position(|palette| palette.name.eq_ignore_ascii_case(name))
            .map(|index| index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_color() -> Palette {
        Palette::new("test")
            .with_color('0', Rgba([255, 0, 0, 255]))
            .with_color('1', Rgba([0, 0, 255, 255]))
    }

    #[test]
    fn lookup_miss_is_none() {
        let palette = two_color();
        assert_eq!(palette.lookup('0'), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(palette.lookup('7'), None);
    }

    #[test]
    fn select_is_one_based() {
        let set = PaletteSet::new(vec![two_color(), Palette::new("other")]);
        assert_eq!(set.select(1).unwrap().name(), "test");
        assert_eq!(set.select(2).unwrap().name(), "other");
        assert!(matches!(
            set.select(0),
            Err(SpriteError::UnknownPalette { index: 0, available: 2 })
        ));
        assert!(set.select(3).is_err());
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        let set = PaletteSet::new(vec![Palette::new("GameBoy")]);
        assert!(set.by_name("gameboy").is_some());
        assert_eq!(set.position("GAMEBOY"), Some(1));
        assert_eq!(set.position("nes"), None);
    }

    #[test]
    fn reports_missing_glyphs() {
        let grid = GlyphGrid::new(["012", "210"]).unwrap();
        assert_eq!(two_color().missing_glyphs(&grid), vec!['2']);
    }
}
