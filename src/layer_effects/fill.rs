//! Layer fill: draws the layer's own pixels onto the work image.
//!
//! The fill takes no separate mask and applies the blend mode in full; the
//! only coverage is the layer's own alpha, so transparent pixels leave the
//! work image alone and the fill opacity scales everything else.

use crate::buffer::PixelBuffer;
use crate::filters::copy_image;

use super::options::FillOptions;

/// Composite `layer` onto `work` with the fill blend mode and opacity.
///
/// `work` and `layer` must share the same local origin.
pub fn apply_fill(work: &mut PixelBuffer, layer: &PixelBuffer, options: &FillOptions) {
    copy_image(
        work,
        (0, 0),
        layer,
        layer.local_rect(),
        options.mode,
        options.opacity,
    );
}
