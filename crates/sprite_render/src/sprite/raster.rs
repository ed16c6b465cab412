use image::{GenericImage, ImageResult, RgbaImage};

use super::grid::GlyphGrid;
use super::palette::Palette;
use crate::SpriteError;

/// Rasterized sprite pixels. Every pixel starts fully transparent.
pub type Bitmap = RgbaImage;

/// Expand each grid cell into a `scale` x `scale` block of its palette color.
///
/// Cells whose glyph is missing from `palette` stay transparent.
pub fn rasterize(grid: &GlyphGrid, palette: &Palette, scale: u32) -> Result<Bitmap, SpriteError> {
    if scale == 0 {
        return Err(SpriteError::InvalidScale);
    }

    let Some((width, height)) = scaled_size(grid, scale) else {
        return Err(SpriteError::TooLarge { width: grid.width, height: grid.height, scale });
    };
    let mut bitmap = Bitmap::new(width, height);

    for (y, row) in grid.rows().enumerate() {
        for (x, &glyph) in row.iter().enumerate() {
            let Some(color) = palette.lookup(glyph) else {
                continue;
            };

            let left = x as u32 * scale;
            let top = y as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    bitmap.put_pixel(left + dx, top + dy, color);
                }
            }
        }
    }

    Ok(bitmap)
}

/// Bitmap dimensions for `grid` at `scale`, if its RGBA buffer is addressable.
fn scaled_size(grid: &GlyphGrid, scale: u32) -> Option<(u32, u32)> {
    let width = grid.width.checked_mul(scale)?;
    let height = grid.height.checked_mul(scale)?;
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
        .filter(|&bytes| bytes <= isize::MAX as usize)?;
    Some((width, height))
}

/// Lay frames out left to right on one transparent strip.
pub fn spritesheet(frames: &[&Bitmap]) -> ImageResult<Bitmap> {
    let width = frames.iter().map(|frame| frame.width()).sum();
    let height = frames.iter().map(|frame| frame.height()).max().unwrap_or(0);
    let mut sheet = Bitmap::new(width, height);

    let mut left = 0;
    for frame in frames {
        sheet.copy_from(*frame, left, 0)?;
        left += frame.width();
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn red_blue() -> Palette {
        Palette::new("rb").with_color('0', RED).with_color('1', BLUE)
    }

    #[test]
    fn checkerboard_blocks() {
        let grid = GlyphGrid::new(["01", "10"]).unwrap();
        let bitmap = rasterize(&grid, &red_blue(), 2).unwrap();
        assert_eq!(bitmap.dimensions(), (4, 4));

        for (x, y, pixel) in bitmap.enumerate_pixels() {
            let expected = if (x < 2) == (y < 2) { RED } else { BLUE };
            assert_eq!(*pixel, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn every_block_matches_palette_exactly() {
        let grid = GlyphGrid::new(["0110", "1001", "0000"]).unwrap();
        let palette = red_blue();
        let scale = 3;
        let bitmap = rasterize(&grid, &palette, scale).unwrap();
        assert_eq!(bitmap.dimensions(), (12, 9));

        for (x, y, pixel) in bitmap.enumerate_pixels() {
            let glyph = grid.get(x / scale, y / scale).unwrap();
            assert_eq!(Some(*pixel), palette.lookup(glyph));
        }
    }

    #[test]
    fn unknown_glyphs_stay_transparent() {
        let grid = GlyphGrid::new(["0x"]).unwrap();
        let bitmap = rasterize(&grid, &red_blue(), 1).unwrap();
        assert_eq!(*bitmap.get_pixel(0, 0), RED);
        assert_eq!(*bitmap.get_pixel(1, 0), CLEAR);
    }

    #[test]
    fn deterministic() {
        let grid = GlyphGrid::new(["0101", "1x10"]).unwrap();
        let first = rasterize(&grid, &red_blue(), 5).unwrap();
        let second = rasterize(&grid, &red_blue(), 5).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn empty_grid_and_zero_scale() {
        let empty = GlyphGrid::default();
        let bitmap = rasterize(&empty, &red_blue(), 4).unwrap();
        assert_eq!(bitmap.dimensions(), (0, 0));

        let grid = GlyphGrid::new(["0"]).unwrap();
        assert!(matches!(rasterize(&grid, &red_blue(), 0), Err(SpriteError::InvalidScale)));
    }

    #[test]
    fn oversized_scale_is_rejected() {
        let grid = GlyphGrid::new(["0000000000000000"]).unwrap();
        assert!(matches!(
            rasterize(&grid, &red_blue(), u32::MAX / 8),
            Err(SpriteError::TooLarge { width: 16, height: 1, .. })
        ));

        let tall = GlyphGrid::new(["0"; 3]).unwrap();
        assert!(matches!(
            rasterize(&tall, &red_blue(), u32::MAX / 2),
            Err(SpriteError::TooLarge { width: 1, height: 3, .. })
        ));
    }

    #[test]
    fn spritesheet_places_frames_side_by_side() {
        let palette = red_blue();
        let a = rasterize(&GlyphGrid::new(["0"]).unwrap(), &palette, 2).unwrap();
        let b = rasterize(&GlyphGrid::new(["1"]).unwrap(), &palette, 2).unwrap();
        let sheet = spritesheet(&[&a, &b]).unwrap();
        assert_eq!(sheet.dimensions(), (4, 2));
        assert_eq!(*sheet.get_pixel(1, 1), RED);
        assert_eq!(*sheet.get_pixel(2, 0), BLUE);
    }
}
