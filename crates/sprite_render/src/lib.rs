mod pipeline;
mod session;
mod sprite;

pub use pipeline::{
    compose::Canvas,
    distortion::{Distortion, Placement, WaveConfig},
    export::{export_animation, export_spritesheet, export_still, MAX_GIF_COLORS},
};
pub use session::{Session, SessionConfig};
pub use sprite::{
    grid::GlyphGrid,
    palette::{Palette, PaletteSet},
    raster::{rasterize, spritesheet, Bitmap},
    resource::ArtPack,
    sequence::{Animator, FrameSequence, SpriteFrame},
};

/// Errors raised while building sprites, palettes and sessions.
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("row {row} has {actual} glyphs, expected {expected}")]
    RaggedGrid { row: usize, expected: usize, actual: usize },
    #[error("invalid sprite {name:?}: {source}")]
    Sprite {
        name: String,
        #[source]
        source: Box<SpriteError>,
    },
    #[error("unknown sprite {0:?}")]
    UnknownSprite(String),
    #[error("palette {index} does not exist ({available} available)")]
    UnknownPalette { index: usize, available: usize },
    #[error("pixel scale must be at least 1")]
    InvalidScale,
    #[error("{width}x{height} grid at scale {scale} does not fit in a bitmap")]
    TooLarge { width: u32, height: u32, scale: u32 },
    #[error("frames per second must be a positive number, got {0}")]
    InvalidFps(f64),
    #[error("frame {index} is {actual:?} pixels, expected {expected:?} like the first frame")]
    FrameShape { index: usize, expected: (u32, u32), actual: (u32, u32) },
    #[error("failed to parse art resource: {0}")]
    Resource(#[from] serde_json::Error),
    #[error("failed to read art resource: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while writing PNG or GIF files.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no frames to export")]
    EmptySequence,
    #[error("{frames} frames but {delays} delays")]
    DelayMismatch { frames: usize, delays: usize },
    #[error("frame {index} is {actual:?}, expected {expected:?}")]
    ShapeMismatch { index: usize, expected: (u32, u32), actual: (u32, u32) },
    #[error("{width}x{height} exceeds the GIF size limit")]
    TooLarge { width: u32, height: u32 },
    #[error("cannot export a {width}x{height} image, it has no pixels")]
    EmptyFrame { width: u32, height: u32 },
    #[error("frames use {0} or more colors, GIF allows {max}", max = MAX_GIF_COLORS)]
    TooManyColors(usize),
    #[error("frame {frame} has a translucent pixel at ({x}, {y})")]
    TranslucentPixel { frame: usize, x: u32, y: u32 },
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to encode GIF: {0}")]
    Gif(#[from] gif::EncodingError),
}
