use image::{Pixel, Rgba, RgbaImage};

use super::distortion::Placement;
use crate::sprite::raster::Bitmap;

/// Software target surface used for headless screenshots.
#[derive(Clone, Debug)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, background) }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Top-left position that centres a `width` x `height` sprite.
    pub fn centered(&self, width: u32, height: u32) -> (f64, f64) {
        (
            (f64::from(self.width()) - f64::from(width)) / 2.0,
            (f64::from(self.height()) - f64::from(height)) / 2.0,
        )
    }

    /// Draw `sprite` rotated about its centre with nearest-neighbour sampling.
    pub fn draw(&mut self, sprite: &Bitmap, placement: Placement) {
        let (sprite_width, sprite_height) = sprite.dimensions();
        if sprite_width == 0 || sprite_height == 0 || self.width() == 0 || self.height() == 0 {
            return;
        }

        let half_width = f64::from(sprite_width) / 2.0;
        let half_height = f64::from(sprite_height) / 2.0;
        let center_x = placement.x + half_width;
        let center_y = placement.y + half_height;
        let (sin, cos) = placement.angle.sin_cos();

        // Bounding box of the rotated sprite.
        let extent_x = half_width * cos.abs() + half_height * sin.abs();
        let extent_y = half_width * sin.abs() + half_height * cos.abs();
        let min_x = (center_x - extent_x).floor().max(0.0) as u32;
        let min_y = (center_y - extent_y).floor().max(0.0) as u32;
        let max_x = ((center_x + extent_x).ceil().max(0.0) as u32).min(self.width());
        let max_y = ((center_y + extent_y).ceil().max(0.0) as u32).min(self.height());

        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = f64::from(x) + 0.5 - center_x;
                let dy = f64::from(y) + 0.5 - center_y;
                let source_x = dx * cos + dy * sin + half_width;
                let source_y = -dx * sin + dy * cos + half_height;

                if source_x < 0.0 || source_y < 0.0 {
                    continue;
                }
                let (source_x, source_y) = (source_x as u32, source_y as u32);
                if source_x >= sprite_width || source_y >= sprite_height {
                    continue;
                }

                let source = sprite.get_pixel(source_x, source_y);
                self.image.get_pixel_mut(x, y).blend(source);
            }
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKY: Rgba<u8> = Rgba([148, 148, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn sprite() -> Bitmap {
        let mut sprite = Bitmap::new(4, 2);
        for x in 0..2 {
            for y in 0..2 {
                sprite.put_pixel(x, y, RED);
            }
        }
        sprite
    }

    #[test]
    fn unrotated_draw_is_exact_copy() {
        let mut canvas = Canvas::new(10, 10, SKY);
        canvas.draw(&sprite(), Placement { x: 3.0, y: 4.0, angle: 0.0 });
        let image = canvas.image();

        assert_eq!(*image.get_pixel(3, 4), RED);
        assert_eq!(*image.get_pixel(4, 5), RED);
        // Transparent half of the sprite leaves the background alone.
        assert_eq!(*image.get_pixel(5, 4), SKY);
        assert_eq!(*image.get_pixel(2, 4), SKY);
        assert_eq!(*image.get_pixel(3, 6), SKY);
    }

    #[test]
    fn half_turn_mirrors_sprite() {
        let mut canvas = Canvas::new(10, 10, SKY);
        canvas.draw(&sprite(), Placement { x: 3.0, y: 4.0, angle: std::f64::consts::PI });
        let image = canvas.image();

        assert_eq!(*image.get_pixel(6, 5), RED);
        assert_eq!(*image.get_pixel(5, 4), RED);
        assert_eq!(*image.get_pixel(3, 4), SKY);
    }

    #[test]
    fn offscreen_placement_is_clipped() {
        let mut canvas = Canvas::new(4, 4, SKY);
        canvas.draw(&sprite(), Placement { x: -1.0, y: -1.0, angle: 0.0 });
        assert_eq!(*canvas.image().get_pixel(0, 0), RED);
        assert_eq!(*canvas.image().get_pixel(1, 0), SKY);

        canvas.draw(&sprite(), Placement { x: 50.0, y: 50.0, angle: 0.3 });
        assert_eq!(*canvas.image().get_pixel(3, 3), SKY);
    }

    #[test]
    fn centers_sprite() {
        let canvas = Canvas::new(320, 240, SKY);
        assert_eq!(canvas.centered(128, 128), (96.0, 56.0));
    }
}
