//! Inner shadow layer effect.
//!
//! The shadow is cast inward from the layer's edges:
//! 1. Blur the alpha channel, keeping the layer size (edge samples repeat)
//! 2. Invert it, so the outside of the shape becomes the shadow source
//! 3. Shift it by the light offset
//! 4. Clip it to the layer's own alpha (darken, i.e. per-pixel minimum)
//! 5. Fill the shadow colour through the clipped mask

use crate::buffer::{PixelBuffer, ALPHA_CHANNEL};
use crate::error::Result;
use crate::executor::ParallelExecutor;
use crate::filters::{
    copy_image, extract_channel, fill_image, invert_mask, translate_clamped, BlendMode,
    ConvolutionKernel,
};

use super::drop_shadow::shadow_offset;
use super::options::InnerShadowOptions;

/// Limit `shadow` to where `mask` is, taking the smaller value per pixel.
pub fn clip_to_mask(shadow: &mut PixelBuffer, mask: &PixelBuffer) {
    copy_image(shadow, (0, 0), mask, mask.local_rect(), BlendMode::Darken, 1.0);
}

/// Build the inner shadow mask for `layer`, same size and bounds as the layer.
pub fn inner_shadow_mask<E: ParallelExecutor>(
    layer: &PixelBuffer,
    options: &InnerShadowOptions,
    executor: &E,
) -> Result<PixelBuffer> {
    let (dx, dy) = shadow_offset(options.distance, options.angle, options.size);
    let mask = extract_channel(layer, ALPHA_CHANNEL)?;

    let kernel = ConvolutionKernel::gaussian(options.size.saturating_add(1))?;
    let mut blurred = kernel.create_convolved_image_with(&mask, executor)?;
    invert_mask(&mut blurred)?;

    // The clamped blur is not padded, so the size bias in the offset is
    // added back to leave only the light displacement.
    let mut shadow = translate_clamped(
        &blurred,
        dx.saturating_add(options.size),
        dy.saturating_add(options.size),
    );
    clip_to_mask(&mut shadow, &mask);

    Ok(shadow)
}

/// Draw the inner shadow of `layer` onto `work`. No-op when inactive.
///
/// `work` and `layer` must share the same local origin.
pub fn apply_inner_shadow<E: ParallelExecutor>(
    work: &mut PixelBuffer,
    layer: &PixelBuffer,
    options: &InnerShadowOptions,
    executor: &E,
) -> Result<()> {
    if !options.active {
        return Ok(());
    }

    let shadow = inner_shadow_mask(layer, options, executor)?;
    log::trace!("inner shadow: {}x{} mask", shadow.width(), shadow.height());

    fill_image(
        work,
        (0, 0),
        &shadow,
        shadow.local_rect(),
        options.mode,
        options.opacity,
        options.colour,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Colour, PixelFormat, Rect};
    use crate::executor::Sequential;

    fn square_layer() -> PixelBuffer {
        let mut layer = PixelBuffer::with_size(PixelFormat::Argb, 12, 12);
        layer.fill_rect(Rect::new(2, 2, 8, 8), Colour::WHITE);
        layer
    }

    fn options(size: i32, distance: f32, angle: f32) -> InnerShadowOptions {
        InnerShadowOptions {
            active: true,
            distance,
            angle,
            size,
            mode: BlendMode::Normal,
            opacity: 1.0,
            colour: Colour::BLACK,
        }
    }

    #[test]
    fn test_clip_never_exceeds_mask() {
        let mut mask = PixelBuffer::with_size(PixelFormat::SingleChannel, 16, 4);
        let mut shadow = PixelBuffer::with_size(PixelFormat::SingleChannel, 16, 4);
        for y in 0..4 {
            for x in 0..16 {
                mask.set(x, y, 0, (x * 16) as u8);
                shadow.set(x, y, 0, 255 - (x * 13 + y * 7) as u8);
            }
        }

        clip_to_mask(&mut shadow, &mask);

        for y in 0..4 {
            for x in 0..16 {
                assert!(shadow.get(x, y, 0) <= mask.get(x, y, 0));
            }
        }
    }

    #[test]
    fn test_shadow_hugs_inner_edges() {
        let layer = square_layer();

        let shadow = inner_shadow_mask(&layer, &options(1, 0.0, 0.0), &Sequential).unwrap();

        assert_eq!(shadow.bounds(), layer.bounds());
        // Inside, on the edge
        assert!(shadow.get(2, 5, 0) > 0);
        // Deep inside
        assert_eq!(shadow.get(5, 5, 0), 0);
        // Outside the layer
        assert_eq!(shadow.get(0, 5, 0), 0);
        assert_eq!(shadow.get(11, 11, 0), 0);
    }

    #[test]
    fn test_shadow_follows_light_angle() {
        let layer = square_layer();

        // Angle 0: light from the right, shadow along the right inner edge.
        let shadow = inner_shadow_mask(&layer, &options(1, 3.0, 0.0), &Sequential).unwrap();

        assert!(shadow.get(9, 5, 0) > shadow.get(2, 5, 0));
        assert_eq!(shadow.get(9, 5, 0), 255);
    }

    #[test]
    fn test_apply_darkens_edges_only() {
        let layer = square_layer();
        let mut work = PixelBuffer::with_size(PixelFormat::Rgb, 12, 12);
        work.clear(Colour::WHITE);

        apply_inner_shadow(&mut work, &layer, &options(1, 0.0, 0.0), &Sequential).unwrap();

        assert!(work.get(2, 5, 0) < 255);
        assert_eq!(work.get(5, 5, 0), 255);
        assert_eq!(work.get(0, 5, 0), 255);
    }

    #[test]
    fn test_inactive_is_noop() {
        let layer = square_layer();
        let mut work = PixelBuffer::with_size(PixelFormat::Rgb, 12, 12);
        let mut opts = options(1, 0.0, 0.0);
        opts.active = false;

        apply_inner_shadow(&mut work, &layer, &opts, &Sequential).unwrap();

        assert!(work.as_array().iter().all(|&v| v == 0));
    }
}
