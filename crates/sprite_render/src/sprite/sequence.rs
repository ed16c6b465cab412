use std::time::Duration;

use super::grid::GlyphGrid;
use super::palette::Palette;
use super::raster::{rasterize, Bitmap};
use crate::SpriteError;

/// One animation frame: the source grid and the bitmap rendered from it.
#[derive(Clone, Debug)]
pub struct SpriteFrame {
    pub grid: GlyphGrid,
    pub scale: u32,
    bitmap: Bitmap,
}

impl SpriteFrame {
    pub fn new(grid: GlyphGrid, palette: &Palette, scale: u32) -> Result<Self, SpriteError> {
        let bitmap = rasterize(&grid, palette, scale)?;
        Ok(Self { grid, scale, bitmap })
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub(crate) fn recolor(&mut self, palette: &Palette) -> Result<(), SpriteError> {
        self.bitmap = rasterize(&self.grid, palette, self.scale)?;
        Ok(())
    }
}

/// Ordered frames sharing one display duration.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<SpriteFrame>,
    frame_duration: Duration,
}

impl FrameSequence {
    pub fn new(frame_duration: Duration) -> Self {
        Self { frames: Vec::new(), frame_duration }
    }

    /// Sequence whose frame duration is `1 / fps` seconds.
    pub fn with_fps(fps: f64) -> Result<Self, SpriteError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(SpriteError::InvalidFps(fps));
        }
        let duration =
            Duration::try_from_secs_f64(1.0 / fps).map_err(|_| SpriteError::InvalidFps(fps))?;
        Ok(Self::new(duration))
    }

    pub fn from_grids<I>(grids: I, palette: &Palette, scale: u32, fps: f64) -> Result<Self, SpriteError>
    where
        I: IntoIterator<Item = GlyphGrid>,
    {
        let mut sequence = Self::with_fps(fps)?;
        for grid in grids {
            sequence.push_frame(SpriteFrame::new(grid, palette, scale)?)?;
        }
        Ok(sequence)
    }

    /// Append a frame; it must have the same grid shape and scale as the first one.
    pub fn push_frame(&mut self, frame: SpriteFrame) -> Result<(), SpriteError> {
        if let Some(first) = self.frames.first() {
            let expected = first.bitmap.dimensions();
            let actual = frame.bitmap.dimensions();
            if expected != actual {
                return Err(SpriteError::FrameShape { index: self.frames.len(), expected, actual });
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    pub fn frame(&self, index: usize) -> Option<&SpriteFrame> {
        self.frames.get(index)
    }

    pub fn bitmaps(&self) -> Vec<&Bitmap> {
        self.frames.iter().map(SpriteFrame::bitmap).collect()
    }

    /// Per-frame delay rounded to centiseconds, as used by animated export.
    pub fn frame_delays_cs(&self) -> Vec<u16> {
        let centis = (self.frame_duration.as_millis() + 5) / 10;
        let centis = centis.min(u128::from(u16::MAX)) as u16;
        vec![centis; self.frames.len()]
    }

    pub fn total_duration(&self) -> Duration {
        self.frame_duration * self.frames.len() as u32
    }

    /// Re-rasterize every frame in place with `palette`.
    pub fn set_palette(&mut self, palette: &Palette) -> Result<(), SpriteError> {
        for frame in &mut self.frames {
            frame.recolor(palette)?;
        }
        Ok(())
    }
}

/// Playback state over a [`FrameSequence`].
#[derive(Clone, Debug)]
pub struct Animator {
    sequence: FrameSequence,
    playing: bool,
    index: usize,
    accumulator: Duration,
}

impl Animator {
    pub fn new(sequence: FrameSequence) -> Self {
        Self { sequence, playing: false, index: 0, accumulator: Duration::ZERO }
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Flip between playing and paused, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Advance playback by `dt`, stepping over as many frames as it covers.
    pub fn advance(&mut self, dt: Duration) {
        let count = self.sequence.len();
        if !self.playing || count == 0 {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);

        let duration = self.sequence.frame_duration;
        if duration.is_zero() {
            self.accumulator = Duration::ZERO;
            return;
        }

        let frame_nanos = duration.as_nanos();
        let accumulated = self.accumulator.as_nanos();
        let steps = accumulated / frame_nanos;
        if steps == 0 {
            return;
        }

        let remainder = accumulated % frame_nanos;
        let secs = (remainder / 1_000_000_000) as u64;
        let nanos = (remainder % 1_000_000_000) as u32;
        self.accumulator = Duration::new(secs, nanos);
        self.index = (self.index + (steps % count as u128) as usize) % count;
    }

    pub fn current(&self) -> Option<&Bitmap> {
        self.sequence.frame(self.index).map(SpriteFrame::bitmap)
    }

    /// Re-rasterize all frames; index and playing state are kept.
    pub fn set_palette(&mut self, palette: &Palette) -> Result<(), SpriteError> {
        self.sequence.set_palette(palette)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn palette() -> Palette {
        Palette::new("rb").with_color('0', RED).with_color('1', BLUE)
    }

    fn two_frames(fps: f64) -> Animator {
        let grids = vec![GlyphGrid::new(["0"]).unwrap(), GlyphGrid::new(["1"]).unwrap()];
        let mut animator = Animator::new(FrameSequence::from_grids(grids, &palette(), 1, fps).unwrap());
        animator.set_playing(true);
        animator
    }

    #[test]
    fn advance_keeps_leftover_time() {
        let mut animator = two_frames(4.0);
        assert_eq!(animator.sequence().frame_duration(), Duration::from_millis(250));

        animator.advance(Duration::from_millis(300));
        assert_eq!(animator.index(), 1);
        assert_eq!(animator.accumulator(), Duration::from_millis(50));

        animator.advance(Duration::from_millis(200));
        assert_eq!(animator.index(), 0);
        assert_eq!(animator.accumulator(), Duration::ZERO);
    }

    #[test]
    fn large_step_wraps_multiple_frames() {
        let mut animator = two_frames(4.0);
        animator.advance(Duration::from_millis(1_260));
        // Five frames covered: 0 -> 1 -> 0 -> 1 -> 0 -> 1.
        assert_eq!(animator.index(), 1);
        assert_eq!(animator.accumulator(), Duration::from_millis(10));
    }

    #[test]
    fn split_advance_matches_single_advance() {
        let splits = [(0, 0), (100, 150), (249, 1), (333, 917), (1, 2_000), (250, 250)];
        for (a, b) in splits {
            let mut split = two_frames(4.0);
            split.advance(Duration::from_millis(a));
            split.advance(Duration::from_millis(b));

            let mut whole = two_frames(4.0);
            whole.advance(Duration::from_millis(a + b));

            assert_eq!(split.index(), whole.index(), "split {a} + {b}");
            assert_eq!(split.accumulator(), whole.accumulator(), "split {a} + {b}");
        }
    }

    #[test]
    fn paused_or_empty_does_nothing() {
        let mut animator = two_frames(4.0);
        animator.set_playing(false);
        animator.advance(Duration::from_secs(3));
        assert_eq!(animator.index(), 0);
        assert_eq!(animator.accumulator(), Duration::ZERO);

        let mut empty = Animator::new(FrameSequence::with_fps(4.0).unwrap());
        empty.set_playing(true);
        empty.advance(Duration::from_secs(1));
        assert!(empty.current().is_none());
    }

    #[test]
    fn palette_swap_keeps_position() {
        let mut animator = two_frames(4.0);
        animator.advance(Duration::from_millis(260));
        assert_eq!(*animator.current().unwrap().get_pixel(0, 0), BLUE);

        let swapped = Palette::new("swapped").with_color('0', BLUE).with_color('1', RED);
        animator.set_palette(&swapped).unwrap();
        assert_eq!(animator.index(), 1);
        assert!(animator.is_playing());
        assert_eq!(*animator.current().unwrap().get_pixel(0, 0), RED);
    }

    #[test]
    fn rejects_mixed_shapes() {
        let grids = vec![GlyphGrid::new(["00"]).unwrap(), GlyphGrid::new(["0", "0"]).unwrap()];
        let err = FrameSequence::from_grids(grids, &palette(), 2, 4.0).unwrap_err();
        assert!(matches!(
            err,
            SpriteError::FrameShape { index: 1, expected: (4, 2), actual: (2, 4) }
        ));
    }

    #[test]
    fn rejects_bad_fps() {
        assert!(matches!(FrameSequence::with_fps(0.0), Err(SpriteError::InvalidFps(_))));
        assert!(FrameSequence::with_fps(f64::NAN).is_err());
    }

    #[test]
    fn delays_in_centiseconds() {
        let animator = two_frames(4.0);
        assert_eq!(animator.sequence().frame_delays_cs(), vec![25, 25]);
        assert_eq!(animator.sequence().total_duration(), Duration::from_millis(500));
    }
}
