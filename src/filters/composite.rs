//! Compositing primitives: draw a buffer, or a solid colour through a mask,
//! onto another buffer with a blend mode and opacity.
//!
//! Both primitives address pixels in local coordinates. A source rectangle
//! is picked out of the source buffer and its top-left corner lands on
//! `dest_offset` in the destination. Whatever falls outside either buffer
//! is skipped, so a rectangle that misses entirely is a no-op.

use crate::buffer::{Colour, PixelBuffer, PixelFormat, Rect, ALPHA_CHANNEL};
use crate::error::{EffectsError, Result};

use super::blend::{blend_u8, BlendMode};
use super::core::{from_unit, to_unit};

/// Source rows/columns paired with destination rows/columns after clipping.
struct Placement {
    /// Clipped region in destination coordinates.
    dest: Rect,
    /// Add to a destination coordinate to get the source coordinate.
    to_src: (i32, i32),
}

fn place(dest: &PixelBuffer, dest_offset: (i32, i32), src: &PixelBuffer, src_rect: Rect) -> Option<Placement> {
    let area = src_rect.intersection(&src.local_rect());
    let shift = (
        dest_offset.0.saturating_sub(src_rect.x),
        dest_offset.1.saturating_sub(src_rect.y),
    );
    let dest_rect = area
        .translated(shift.0, shift.1)
        .intersection(&dest.local_rect());

    if dest_rect.is_empty() {
        return None;
    }

    Some(Placement {
        dest: dest_rect,
        to_src: (shift.0.saturating_neg(), shift.1.saturating_neg()),
    })
}

/// Accumulate coverage into an ARGB destination's alpha ("over").
#[inline]
fn accumulate_alpha(dest: &mut PixelBuffer, x: usize, y: usize, coverage: f32) {
    let da = to_unit(dest.get(x, y, ALPHA_CHANNEL));
    dest.set(x, y, ALPHA_CHANNEL, from_unit(coverage + da * (1.0 - coverage)));
}

/// Blend `src_rect` of `src` onto `dest` at `dest_offset`.
///
/// Colour channels map by index; a single channel source feeds every
/// destination channel. An ARGB source carries its own coverage, so each
/// pixel is drawn at `opacity * alpha`.
pub fn copy_image(
    dest: &mut PixelBuffer,
    dest_offset: (i32, i32),
    src: &PixelBuffer,
    src_rect: Rect,
    mode: BlendMode,
    opacity: f32,
) {
    let Some(placement) = place(dest, dest_offset, src, src_rect) else {
        return;
    };

    let opacity = opacity.clamp(0.0, 1.0);
    let src_format = src.format();
    let src_colours = src_format.colour_channels();
    let dest_colours = dest.format().colour_channels();
    let dest_has_alpha = dest.format().has_alpha();
    let Rect { x, y, width, height } = placement.dest;

    for dy in y..y + height {
        let sy = (dy + placement.to_src.1) as usize;
        for dx in x..x + width {
            let sx = (dx + placement.to_src.0) as usize;

            let coverage = if src_format.has_alpha() {
                opacity * to_unit(src.get(sx, sy, ALPHA_CHANNEL))
            } else {
                opacity
            };
            if coverage <= 0.0 {
                continue;
            }

            let (px, py) = (dx as usize, dy as usize);
            for c in 0..dest_colours {
                let sc = c.min(src_colours - 1);
                let blended = blend_u8(src.get(sx, sy, sc), dest.get(px, py, c), mode, coverage);
                dest.set(px, py, c, blended);
            }
            if dest_has_alpha {
                accumulate_alpha(dest, px, py, coverage);
            }
        }
    }
}

/// Blend a solid `colour` onto `dest` through a coverage mask.
///
/// Each mask value scales the opacity: `opacity * mask / 255`. A single
/// channel destination receives the colour's alpha as its value.
///
/// # Errors
/// `InvalidFormat` if `mask` is not single channel.
pub fn fill_image(
    dest: &mut PixelBuffer,
    dest_offset: (i32, i32),
    mask: &PixelBuffer,
    mask_rect: Rect,
    mode: BlendMode,
    opacity: f32,
    colour: Colour,
) -> Result<()> {
    if mask.format() != PixelFormat::SingleChannel {
        return Err(EffectsError::InvalidFormat {
            operation: "fill_image",
            expected: "a single channel mask",
            found: mask.format(),
        });
    }

    let Some(placement) = place(dest, dest_offset, mask, mask_rect) else {
        return Ok(());
    };

    let opacity = opacity.clamp(0.0, 1.0);
    let dest_format = dest.format();
    let values: [u8; 3] = match dest_format {
        PixelFormat::SingleChannel => [colour.a; 3],
        _ => colour.channels(),
    };
    let Rect { x, y, width, height } = placement.dest;

    for dy in y..y + height {
        let sy = (dy + placement.to_src.1) as usize;
        for dx in x..x + width {
            let sx = (dx + placement.to_src.0) as usize;

            let coverage = opacity * to_unit(mask.get(sx, sy, 0));
            if coverage <= 0.0 {
                continue;
            }

            let (px, py) = (dx as usize, dy as usize);
            for c in 0..dest_format.colour_channels() {
                let blended = blend_u8(values[c], dest.get(px, py, c), mode, coverage);
                dest.set(px, py, c, blended);
            }
            if dest_format.has_alpha() {
                accumulate_alpha(dest, px, py, coverage);
            }
        }
    }

    Ok(())
}
