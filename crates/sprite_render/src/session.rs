use std::fs;
use std::path::Path;
use std::time::Duration;

use image::Rgba;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::pipeline::compose::Canvas;
use crate::pipeline::distortion::{Distortion, Placement, WaveConfig};
use crate::pipeline::export::{export_animation, export_spritesheet, export_still};
use crate::sprite::grid::GlyphGrid;
use crate::sprite::palette::Palette;
use crate::sprite::raster::Bitmap;
use crate::sprite::resource::ArtPack;
use crate::sprite::sequence::{Animator, FrameSequence, SpriteFrame};
use crate::{ExportError, SpriteError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Edge length in pixels of one grid cell.
    pub scale: u32,
    pub fps: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Glyph whose palette color fills the canvas behind the sprite.
    pub background_glyph: char,
    /// Sprite shown while the animation is paused.
    pub still_sprite: String,
    pub animation: Vec<String>,
    /// 1-based palette selected at start.
    pub palette: usize,
    pub wave: WaveConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scale: 8,
            fps: 4.0,
            canvas_width: 320,
            canvas_height: 240,
            background_glyph: '0',
            still_sprite: "mario_stand".into(),
            animation: vec!["mario_stand".into(), "mario_walk".into()],
            palette: 1,
            wave: WaveConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SpriteError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Display state for one running program: palette choice, animation and effects.
#[derive(Debug)]
pub struct Session {
    pack: ArtPack,
    config: SessionConfig,
    palette_index: usize,
    still: SpriteFrame,
    animator: Animator,
    distortion: Distortion,
}

impl Session {
    pub fn new(pack: ArtPack, config: SessionConfig) -> Result<Self, SpriteError> {
        let palette_index = config.palette;
        let palette = pack.palettes().select(palette_index)?.clone();

        let still_grid = pack.sprite(&config.still_sprite)?.clone();
        warn_missing_glyphs(&config.still_sprite, &still_grid, &palette);
        let still = SpriteFrame::new(still_grid, &palette, config.scale)?;

        let mut sequence = FrameSequence::with_fps(config.fps)?;
        for name in &config.animation {
            let grid = pack.sprite(name)?.clone();
            warn_missing_glyphs(name, &grid, &palette);
            sequence
                .push_frame(SpriteFrame::new(grid, &palette, config.scale)?)
                .map_err(|err| SpriteError::Sprite { name: name.clone(), source: Box::new(err) })?;
        }

        debug!(
            "session ready: palette {}, {} animation frames at {} fps",
            palette.name(),
            sequence.len(),
            config.fps
        );

        Ok(Self {
            distortion: Distortion::new(config.wave),
            animator: Animator::new(sequence),
            pack,
            config,
            palette_index,
            still,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pack(&self) -> &ArtPack {
        &self.pack
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    pub fn palette(&self) -> Result<&Palette, SpriteError> {
        self.pack.palettes().select(self.palette_index)
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn distortion(&self) -> &Distortion {
        &self.distortion
    }

    /// Switch to the 1-based palette `index` and re-render every sprite.
    pub fn on_select_palette(&mut self, index: usize) -> Result<(), SpriteError> {
        let palette = self.pack.palettes().select(index)?;

        self.still.recolor(palette)?;
        self.animator.set_palette(palette)?;
        self.palette_index = index;

        debug!("switched to palette {} ({})", index, palette.name());
        Ok(())
    }

    pub fn on_toggle_animation(&mut self) -> bool {
        let playing = self.animator.toggle();
        debug!("animation {}", if playing { "playing" } else { "paused" });
        playing
    }

    pub fn on_toggle_distortion(&mut self) -> bool {
        self.distortion.toggle_wave()
    }

    pub fn on_toggle_rotation(&mut self) -> bool {
        self.distortion.toggle_rotation()
    }

    /// Per-tick update: advances the animation and the distortion clocks.
    pub fn update(&mut self, dt: Duration) {
        self.animator.advance(dt);
        self.distortion.update(dt);
    }

    /// Bitmap the host should draw this tick.
    pub fn current_frame(&self) -> &Bitmap {
        if self.animator.is_playing() {
            if let Some(frame) = self.animator.current() {
                return frame;
            }
        }
        self.still.bitmap()
    }

    /// Canvas placement of the current frame: centred, then distorted.
    pub fn placement(&self) -> Placement {
        let (width, height) = self.current_frame().dimensions();
        let x = (f64::from(self.config.canvas_width) - f64::from(width)) / 2.0;
        let y = (f64::from(self.config.canvas_height) - f64::from(height)) / 2.0;
        self.distortion.place(x, y)
    }

    /// Draw the current frame onto a background-filled canvas.
    pub fn render_canvas(&self) -> Canvas {
        let background = self
            .palette()
            .ok()
            .and_then(|palette| palette.lookup(self.config.background_glyph))
            .unwrap_or(Rgba([0, 0, 0, 0]));

        let mut canvas = Canvas::new(self.config.canvas_width, self.config.canvas_height, background);
        canvas.draw(self.current_frame(), self.placement());
        canvas
    }

    pub fn on_export_still<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        export_still(self.current_frame(), path)
    }

    pub fn on_export_animation<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let sequence = self.animator.sequence();
        export_animation(&sequence.bitmaps(), &sequence.frame_delays_cs(), path)
    }

    pub fn on_export_spritesheet<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        export_spritesheet(&self.animator.sequence().bitmaps(), path)
    }

    pub fn on_export_canvas<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        export_still(self.render_canvas().image(), path)
    }
}

fn warn_missing_glyphs(name: &str, grid: &GlyphGrid, palette: &Palette) {
    let missing = palette.missing_glyphs(grid);
    if !missing.is_empty() {
        warn!("palette {} has no color for glyphs {:?} used by {}", palette.name(), missing, name);
    }
}
