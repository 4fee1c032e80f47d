//! Drop shadow layer effect.
//!
//! Creates a shadow behind the layer by:
//! 1. Extracting the alpha channel
//! 2. Blurring it with a full (zero-padded) Gaussian convolution
//! 3. Optionally knocking out the part that sits under the layer
//! 4. Filling the shadow colour through the mask at the shadow offset
//!
//! The shadow buffer is larger than the layer by the kernel radius on
//! every side, so the blur can spill past the layer's edges.

use crate::buffer::{PixelBuffer, ALPHA_CHANNEL};
use crate::error::Result;
use crate::executor::ParallelExecutor;
use crate::filters::{copy_image, extract_channel, fill_image, BlendMode, ConvolutionKernel};

use super::options::DropShadowOptions;

/// Light offset of the shadow, biased by the blur size.
///
/// `dx = trunc(-distance * cos(angle) + 0.5) - size`,
/// `dy = trunc(distance * sin(angle) + 0.5) - size`.
///
/// The `+ 0.5` before truncation rounds toward +inf for positive values
/// and toward zero for negative ones. See [`shadow_placement`] for where
/// the padded shadow buffer actually lands.
pub fn shadow_offset(distance: f32, angle: f32, size: i32) -> (i32, i32) {
    let dx = ((-distance * angle.cos() + 0.5) as i32).saturating_sub(size);
    let dy = ((distance * angle.sin() + 0.5) as i32).saturating_sub(size);
    (dx, dy)
}

/// Top-left corner of the padded shadow buffer, relative to the layer.
///
/// The full convolution pads by the kernel radius `size + 1`, one pixel more
/// than the `size` already taken off by [`shadow_offset`]. At distance 0 the
/// unpadded part of the shadow sits exactly under the layer.
pub fn shadow_placement(distance: f32, angle: f32, size: i32) -> (i32, i32) {
    let (dx, dy) = shadow_offset(distance, angle, size);
    (dx.saturating_sub(1), dy.saturating_sub(1))
}

/// Build the drop shadow mask for `layer`.
///
/// Returns the mask and its placement relative to the layer's top-left
/// corner, in layer pixels. The mask's bounds are set to the same placement
/// in the shared coordinate space.
pub fn shadow_mask<E: ParallelExecutor>(
    layer: &PixelBuffer,
    options: &DropShadowOptions,
    executor: &E,
) -> Result<(PixelBuffer, (i32, i32))> {
    let (dx, dy) = shadow_placement(options.distance, options.angle, options.size);

    // Layer mask as an individual channel
    let mask = extract_channel(layer, ALPHA_CHANNEL)?;

    let kernel = ConvolutionKernel::gaussian(options.size.saturating_add(1))?;
    let mut shadow = kernel.create_convolved_image_full_with(&mask, executor)?;

    // Knockout: remove the shadow wherever the layer itself is, which in
    // shadow coordinates is the negated placement.
    if options.knockout {
        copy_image(
            &mut shadow,
            (dx.saturating_neg(), dy.saturating_neg()),
            &mask,
            mask.local_rect(),
            BlendMode::Subtract,
            1.0,
        );
    }

    let (x, y) = layer.bounds().top_left();
    shadow.set_origin(x.saturating_add(dx), y.saturating_add(dy));

    Ok((shadow, (dx, dy)))
}

/// Draw the drop shadow of `layer` onto `work`. No-op when inactive.
///
/// `work` and `layer` must share the same local origin.
pub fn apply_drop_shadow<E: ParallelExecutor>(
    work: &mut PixelBuffer,
    layer: &PixelBuffer,
    options: &DropShadowOptions,
    executor: &E,
) -> Result<()> {
    if !options.active {
        return Ok(());
    }

    let (shadow, offset) = shadow_mask(layer, options, executor)?;
    log::trace!(
        "drop shadow: {}x{} mask at offset {:?}",
        shadow.width(),
        shadow.height(),
        offset
    );

    fill_image(
        work,
        offset,
        &shadow,
        shadow.local_rect(),
        options.mode,
        options.opacity,
        options.colour,
    )
}
