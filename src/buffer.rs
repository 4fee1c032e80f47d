//! Pixel storage shared by every effect stage.
//!
//! A [`PixelBuffer`] is an `ndarray` image shaped `(height, width, channels)`
//! plus the rectangle it occupies in the caller's coordinate space. Pixel
//! access is always in local coordinates (`0..width`, `0..height`); the
//! bounds only matter when two buffers have to be lined up.
//!
//! | Format | Channels | Layout |
//! |--------|----------|--------|
//! | `Rgb` | 3 | R, G, B |
//! | `Argb` | 4 | R, G, B, A (alpha is channel 3) |
//! | `SingleChannel` | 1 | coverage / luminance |

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::{EffectsError, Result};

/// Index of the alpha channel in an ARGB buffer.
pub const ALPHA_CHANNEL: usize = 3;

/// Pixel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb,
    Argb,
    SingleChannel,
}

impl PixelFormat {
    /// Number of interleaved channels per pixel.
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Argb => 4,
            PixelFormat::SingleChannel => 1,
        }
    }

    /// Bytes per pixel (every channel is one byte).
    pub const fn bytes_per_pixel(self) -> usize {
        self.channels()
    }

    /// Channels that carry colour, i.e. everything except alpha.
    pub const fn colour_channels(self) -> usize {
        match self {
            PixelFormat::Argb => 3,
            other => other.channels(),
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Argb)
    }

    /// Format with the given channel count (1, 3 or 4).
    pub const fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::SingleChannel),
            3 => Some(PixelFormat::Rgb),
            4 => Some(PixelFormat::Argb),
            _ => None,
        }
    }
}

/// Integer rectangle in a shared coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size anchored at the origin.
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub const fn top_left(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlap of two rectangles. Disjoint rectangles yield an empty rect.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        Rect::new(
            x0,
            y0,
            x1.saturating_sub(x0).max(0),
            y1.saturating_sub(y0).max(0),
        )
    }

    /// Move the rectangle. Coordinates saturate at the `i32` range.
    pub const fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Grow the rectangle by `margin` on every side.
    pub const fn expanded(&self, margin: i32) -> Rect {
        let grow = margin.saturating_mul(2);
        Rect::new(
            self.x.saturating_sub(margin),
            self.y.saturating_sub(margin),
            self.width.saturating_add(grow),
            self.height.saturating_add(grow),
        )
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }
}

/// 8-bit colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const TRANSPARENT: Colour = Colour::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Colour channels in R, G, B order.
    pub const fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::BLACK
    }
}

/// Owned 2-D image with a position in the shared coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    format: PixelFormat,
    bounds: Rect,
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Zero-filled buffer covering `bounds`. ARGB buffers start transparent.
    pub fn new(format: PixelFormat, bounds: Rect) -> Self {
        let bounds = Rect::new(bounds.x, bounds.y, bounds.width.max(0), bounds.height.max(0));
        let data = Array3::<u8>::zeros((
            bounds.height as usize,
            bounds.width as usize,
            format.channels(),
        ));

        Self { format, bounds, data }
    }

    /// Zero-filled buffer anchored at the origin.
    pub fn with_size(format: PixelFormat, width: usize, height: usize) -> Self {
        Self::new(format, Rect::from_size(width as i32, height as i32))
    }

    /// Wrap row-major interleaved bytes.
    pub fn from_vec(format: PixelFormat, bounds: Rect, data: Vec<u8>) -> Result<Self> {
        let shape = (
            bounds.height.max(0) as usize,
            bounds.width.max(0) as usize,
            format.channels(),
        );
        let data = Array3::from_shape_vec(shape, data)?;

        Ok(Self { format, bounds, data })
    }

    /// Wrap an existing `(height, width, channels)` array.
    pub fn from_array(format: PixelFormat, bounds: Rect, data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        if channels != format.channels() {
            return Err(EffectsError::InvalidFormat {
                operation: "from_array",
                expected: "an array whose channel count matches the format",
                found: format,
            });
        }
        if width as i32 != bounds.width || height as i32 != bounds.height {
            return Err(EffectsError::InvalidConfiguration(format!(
                "array is {}x{} but bounds are {}x{}",
                width, height, bounds.width, bounds.height
            )));
        }

        Ok(Self {
            format,
            bounds,
            data: data.as_standard_layout().into_owned(),
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Move the buffer in the shared coordinate space without touching pixels.
    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    /// Bytes between the starts of two consecutive rows.
    pub fn stride(&self) -> usize {
        self.width() * self.format.bytes_per_pixel()
    }

    /// The buffer's own extent in local coordinates.
    pub fn local_rect(&self) -> Rect {
        Rect::from_size(self.width() as i32, self.height() as i32)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> u8 {
        self.data[[y, x, channel]]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, channel: usize, value: u8) {
        self.data[[y, x, channel]] = value;
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    pub fn as_array_mut(&mut self) -> &mut Array3<u8> {
        &mut self.data
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Overwrite a local rectangle with a solid colour.
    ///
    /// RGB takes the colour channels, ARGB takes all four, and a single
    /// channel buffer takes the colour's alpha as its coverage value.
    pub fn fill_rect(&mut self, rect: Rect, colour: Colour) {
        let area = rect.intersection(&self.local_rect());
        if area.is_empty() {
            return;
        }

        let pixel = match self.format {
            PixelFormat::Rgb | PixelFormat::Argb => [colour.r, colour.g, colour.b, colour.a],
            PixelFormat::SingleChannel => [colour.a, 0, 0, 0],
        };
        let channels = self.format.channels();

        for y in area.y as usize..area.bottom() as usize {
            for x in area.x as usize..area.right() as usize {
                for (c, &v) in pixel[..channels].iter().enumerate() {
                    self.data[[y, x, c]] = v;
                }
            }
        }
    }

    /// Fill the whole buffer with one colour.
    pub fn clear(&mut self, colour: Colour) {
        let rect = self.local_rect();
        self.fill_rect(rect, colour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_overlapping() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -3, 10, 6);

        assert_eq!(a.intersection(&b), Rect::new(5, 0, 5, 3));
    }

    #[test]
    fn test_intersection_disjoint_is_empty() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(10, 10, 4, 4);

        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn test_translate_and_expand() {
        let r = Rect::new(2, 3, 4, 5);

        assert_eq!(r.translated(-2, 1), Rect::new(0, 4, 4, 5));
        assert_eq!(r.expanded(2), Rect::new(0, 1, 8, 9));
        assert!(r.contains(2, 3));
        assert!(!r.contains(6, 3));
    }

    #[test]
    fn test_far_rectangles_saturate_instead_of_overflowing() {
        let far = Rect::new(i32::MAX - 1, i32::MIN, 10, 10);

        assert_eq!(far.right(), i32::MAX);
        assert_eq!(far.translated(10, -10), Rect::new(i32::MAX, i32::MIN, 10, 10));
        assert_eq!(far.expanded(i32::MAX).width, i32::MAX);
        assert!(far.intersection(&Rect::from_size(4, 4)).is_empty());
        assert!(Rect::from_size(4, 4)
            .translated(i32::MIN, 0)
            .intersection(&Rect::from_size(4, 4))
            .is_empty());
    }

    #[test]
    fn test_new_buffer_is_transparent() {
        let buf = PixelBuffer::new(PixelFormat::Argb, Rect::new(5, 5, 3, 2));

        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.stride(), 12);
        assert!(buf.as_array().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_format_from_channels() {
        for format in [PixelFormat::Rgb, PixelFormat::Argb, PixelFormat::SingleChannel] {
            assert_eq!(PixelFormat::from_channels(format.channels()), Some(format));
        }
        assert_eq!(PixelFormat::from_channels(2), None);
    }

    #[test]
    fn test_stride_covers_row() {
        for format in [PixelFormat::Rgb, PixelFormat::Argb, PixelFormat::SingleChannel] {
            let buf = PixelBuffer::with_size(format, 7, 2);
            assert!(buf.stride() >= buf.width() * format.bytes_per_pixel());
        }
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let result = PixelBuffer::from_vec(PixelFormat::Rgb, Rect::from_size(2, 2), vec![0; 11]);

        assert!(matches!(result, Err(EffectsError::Shape(_))));
    }

    #[test]
    fn test_fill_rect_clips_to_buffer() {
        let mut buf = PixelBuffer::with_size(PixelFormat::SingleChannel, 4, 4);
        buf.fill_rect(Rect::new(2, 2, 10, 10), Colour::rgba(0, 0, 0, 200));

        assert_eq!(buf.get(3, 3, 0), 200);
        assert_eq!(buf.get(1, 1, 0), 0);
    }
}
