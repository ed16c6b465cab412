use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use image::Rgba;
use serde::Deserialize;

use super::grid::GlyphGrid;
use super::palette::{Palette, PaletteSet};
use crate::SpriteError;

const BUILTIN_PACK: &str = include_str!("../../assets/demo.json");

#[derive(Deserialize)]
struct RawPack {
    sprites: BTreeMap<String, Vec<String>>,
    palettes: Vec<RawPalette>,
}

#[derive(Deserialize)]
struct RawPalette {
    name: String,
    colors: BTreeMap<char, RawColor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColor {
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

impl From<RawColor> for Rgba<u8> {
    fn from(color: RawColor) -> Self {
        match color {
            RawColor::Rgb([r, g, b]) => Rgba([r, g, b, 255]),
            RawColor::Rgba(rgba) => Rgba(rgba),
        }
    }
}

/// Named sprites and palettes loaded from one JSON resource.
#[derive(Clone, Debug, Default)]
pub struct ArtPack {
    sprites: BTreeMap<String, GlyphGrid>,
    palettes: PaletteSet,
}

impl ArtPack {
    /// The demo sprites and the nes, gameboy, grayscale, synthwave and goomba palettes.
    pub fn builtin() -> Result<Self, SpriteError> {
        Self::from_json(BUILTIN_PACK)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SpriteError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SpriteError> {
        let raw: RawPack = serde_json::from_str(text)?;

        let mut sprites = BTreeMap::new();
        for (name, rows) in raw.sprites {
            let grid = GlyphGrid::new(&rows)
                .map_err(|err| SpriteError::Sprite { name: name.clone(), source: Box::new(err) })?;
            sprites.insert(name, grid);
        }

        let palettes = raw
            .palettes
            .into_iter()
            .map(|palette| {
                Palette::from_entries(
                    palette.name,
                    palette.colors.into_iter().map(|(glyph, color)| (glyph, Rgba::from(color))),
                )
            })
            .collect();

        Ok(Self { sprites, palettes: PaletteSet::new(palettes) })
    }

    pub fn sprite(&self, name: &str) -> Result<&GlyphGrid, SpriteError> {
        self.sprites.get(name).ok_or_else(|| SpriteError::UnknownSprite(name.to_owned()))
    }

    pub fn sprite_names(&self) -> impl Iterator<Item = &str> {
        self.sprites.keys().map(String::as_str)
    }

    pub fn palettes(&self) -> &PaletteSet {
        &self.palettes
    }
}
