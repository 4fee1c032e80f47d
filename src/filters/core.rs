//! Core utilities shared by the effect stages.
//!
//! This module provides:
//! - 8-bit <-> normalised float conversion
//! - Channel extraction (alpha mask from an ARGB layer)
//! - Mask inversion
//! - Clamped translation of a buffer

use crate::buffer::{PixelBuffer, PixelFormat};
use crate::error::{EffectsError, Result};

/// Convert an 8-bit channel to 0.0-1.0.
#[inline]
pub fn to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}

/// Convert a 0.0-1.0 channel back to 8 bits, rounding to nearest.
#[inline]
pub fn from_unit(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Copy one channel of `src` into a new single channel buffer.
///
/// The result keeps the source bounds, so it lines up with the buffer it
/// came from.
///
/// # Errors
/// `InvalidFormat` if `src` has no channel at `channel`.
pub fn extract_channel(src: &PixelBuffer, channel: usize) -> Result<PixelBuffer> {
    if channel >= src.channels() {
        return Err(EffectsError::InvalidFormat {
            operation: "extract_channel",
            expected: "a buffer with the requested channel",
            found: src.format(),
        });
    }

    let plane = src
        .as_array()
        .slice(ndarray::s![.., .., channel..channel + 1])
        .to_owned();

    PixelBuffer::from_array(PixelFormat::SingleChannel, src.bounds(), plane)
}

/// Replace every mask value `v` with `255 - v`.
///
/// # Errors
/// `InvalidFormat` unless `mask` is single channel.
pub fn invert_mask(mask: &mut PixelBuffer) -> Result<()> {
    if mask.format() != PixelFormat::SingleChannel {
        return Err(EffectsError::InvalidFormat {
            operation: "invert_mask",
            expected: "a single channel buffer",
            found: mask.format(),
        });
    }

    mask.as_array_mut().mapv_inplace(|v| 255 - v);
    Ok(())
}

/// Shift a buffer's content by `(dx, dy)` pixels inside its own extent.
///
/// Output pixel `(x, y)` takes the input at `(x - dx, y - dy)`; samples past
/// an edge repeat the nearest edge pixel.
pub fn translate_clamped(src: &PixelBuffer, dx: i32, dy: i32) -> PixelBuffer {
    if dx == 0 && dy == 0 {
        return src.clone();
    }

    let (width, height) = (src.width() as i32, src.height() as i32);
    let mut out = PixelBuffer::new(src.format(), src.bounds());
    if width == 0 || height == 0 {
        return out;
    }

    for y in 0..height {
        let sy = (y - dy).clamp(0, height - 1) as usize;
        for x in 0..width {
            let sx = (x - dx).clamp(0, width - 1) as usize;
            for c in 0..src.channels() {
                out.set(x as usize, y as usize, c, src.get(sx, sy, c));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Colour, Rect, ALPHA_CHANNEL};

    #[test]
    fn test_unit_conversion_round_trips_every_byte() {
        for v in 0..=255u8 {
            assert_eq!(from_unit(to_unit(v)), v);
        }
    }

    #[test]
    fn test_extract_alpha() {
        let mut layer = PixelBuffer::new(PixelFormat::Argb, Rect::new(3, 4, 4, 3));
        layer.fill_rect(Rect::new(1, 1, 2, 1), Colour::rgba(10, 20, 30, 200));

        let mask = extract_channel(&layer, ALPHA_CHANNEL).unwrap();

        assert_eq!(mask.format(), PixelFormat::SingleChannel);
        assert_eq!(mask.bounds(), layer.bounds());
        assert_eq!(mask.get(1, 1, 0), 200);
        assert_eq!(mask.get(2, 1, 0), 200);
        assert_eq!(mask.get(0, 0, 0), 0);
    }

    #[test]
    fn test_extract_missing_channel_fails() {
        let rgb = PixelBuffer::with_size(PixelFormat::Rgb, 2, 2);

        assert!(matches!(
            extract_channel(&rgb, ALPHA_CHANNEL),
            Err(EffectsError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_invert_mask() {
        let mut mask = PixelBuffer::with_size(PixelFormat::SingleChannel, 2, 1);
        mask.set(0, 0, 0, 255);
        mask.set(1, 0, 0, 55);

        invert_mask(&mut mask).unwrap();

        assert_eq!(mask.get(0, 0, 0), 0);
        assert_eq!(mask.get(1, 0, 0), 200);
    }

    #[test]
    fn test_invert_rejects_colour_buffers() {
        let mut rgb = PixelBuffer::with_size(PixelFormat::Rgb, 2, 2);
        let before = rgb.clone();

        assert!(matches!(
            invert_mask(&mut rgb),
            Err(EffectsError::InvalidFormat { found: PixelFormat::Rgb, .. })
        ));
        assert_eq!(rgb, before);
    }

    #[test]
    fn test_translate_clamped_repeats_edges() {
        let mut mask = PixelBuffer::with_size(PixelFormat::SingleChannel, 3, 1);
        mask.set(0, 0, 0, 10);
        mask.set(1, 0, 0, 20);
        mask.set(2, 0, 0, 30);

        let shifted = translate_clamped(&mask, 1, 0);

        assert_eq!(shifted.get(0, 0, 0), 10);
        assert_eq!(shifted.get(1, 0, 0), 10);
        assert_eq!(shifted.get(2, 0, 0), 20);
    }
}
