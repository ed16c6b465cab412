use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba};
use log::debug;
use tempfile::NamedTempFile;

use crate::sprite::raster::{spritesheet, Bitmap};
use crate::ExportError;

/// GIF color tables hold at most this many entries.
pub const MAX_GIF_COLORS: usize = 256;

/// Write `bitmap` as a lossless PNG at `path`.
pub fn export_still(bitmap: &Bitmap, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    reject_empty(bitmap.dimensions())?;
    write_atomically(path, |writer| {
        PngEncoder::new(writer).write_image(
            bitmap.as_raw(),
            bitmap.width(),
            bitmap.height(),
            ColorType::Rgba8,
        )?;
        Ok(())
    })?;

    debug!("wrote {}x{} PNG to {}", bitmap.width(), bitmap.height(), path.display());
    Ok(())
}

/// Write `frames` side by side as one PNG strip.
pub fn export_spritesheet(frames: &[&Bitmap], path: impl AsRef<Path>) -> Result<(), ExportError> {
    if frames.is_empty() {
        return Err(ExportError::EmptySequence);
    }
    let sheet = spritesheet(frames)?;
    export_still(&sheet, path)
}

/// Write `frames` as a looping GIF with per-frame delays in centiseconds.
pub fn export_animation(
    frames: &[&Bitmap],
    delays_cs: &[u16],
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let Some(first) = frames.first() else {
        return Err(ExportError::EmptySequence);
    };

    if frames.len() != delays_cs.len() {
        return Err(ExportError::DelayMismatch { frames: frames.len(), delays: delays_cs.len() });
    }

    let expected = first.dimensions();
    for (index, frame) in frames.iter().enumerate() {
        if frame.dimensions() != expected {
            return Err(ExportError::ShapeMismatch { index, expected, actual: frame.dimensions() });
        }
    }

    reject_empty(expected)?;
    let (width, height) = expected;
    let (Ok(gif_width), Ok(gif_height)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(ExportError::TooLarge { width, height });
    };

    let table = ColorTable::observe(frames)?;
    debug!("animation uses {} distinct colors", table.len());

    write_atomically(path, |writer| {
        let mut encoder = gif::Encoder::new(writer, gif_width, gif_height, &table.rgb_bytes())?;
        encoder.set_repeat(gif::Repeat::Infinite)?;

        for (frame, &delay) in frames.iter().zip(delays_cs) {
            let mut gif_frame = gif::Frame::default();
            gif_frame.width = gif_width;
            gif_frame.height = gif_height;
            gif_frame.delay = delay;
            gif_frame.transparent = table.transparent;
            gif_frame.dispose = gif::DisposalMethod::Background;
            gif_frame.buffer = Cow::Owned(table.indices(frame));
            encoder.write_frame(&gif_frame)?;
        }

        encoder.into_inner()?.flush()?;
        Ok(())
    })?;

    debug!("wrote {} frame GIF to {}", frames.len(), path.display());
    Ok(())
}

fn reject_empty((width, height): (u32, u32)) -> Result<(), ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyFrame { width, height });
    }
    Ok(())
}

/// Colors observed across a frame set, in first-seen order.
#[derive(Debug, Default)]
struct ColorTable {
    colors: Vec<Rgba<u8>>,
    index: HashMap<Rgba<u8>, u8>,
    transparent: Option<u8>,
}

impl ColorTable {
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn observe(frames: &[&Bitmap]) -> Result<Self, ExportError> {
        let mut table = Self::default();

        for (frame_index, frame) in frames.iter().enumerate() {
            for (x, y, pixel) in frame.enumerate_pixels() {
                let key = match pixel[3] {
                    0 => Self::CLEAR,
                    255 => *pixel,
                    _ => return Err(ExportError::TranslucentPixel { frame: frame_index, x, y }),
                };

                if table.index.contains_key(&key) {
                    continue;
                }
                if table.colors.len() == MAX_GIF_COLORS {
                    return Err(ExportError::TooManyColors(table.colors.len() + 1));
                }

                let slot = table.colors.len() as u8;
                if key == Self::CLEAR {
                    table.transparent = Some(slot);
                }
                table.index.insert(key, slot);
                table.colors.push(key);
            }
        }

        Ok(table)
    }

    fn len(&self) -> usize {
        self.colors.len()
    }

    fn rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|color| [color[0], color[1], color[2]]).collect()
    }

    fn indices(&self, frame: &Bitmap) -> Vec<u8> {
        frame
            .pixels()
            .map(|pixel| {
                let key = if pixel[3] == 0 { Self::CLEAR } else { *pixel };
                self.index.get(&key).copied().unwrap_or_default()
            })
            .collect()
    }
}

/// Encode into a temporary sibling of `path` and move it into place only once
/// `encode` succeeded, so a failed export never leaves a file at `path`.
fn write_atomically<F>(path: &Path, encode: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), ExportError>,
{
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(directory)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        encode(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| ExportError::Io(err.error))?;
    Ok(())
}
