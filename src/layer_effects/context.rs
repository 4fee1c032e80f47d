//! One compose pass of a layer with its effects onto a background.
//!
//! A [`LayerEffectsContext`] is bound to a background buffer and a draw
//! region. The host draws the layer's pixels into it, then calls
//! [`LayerEffectsContext::compose`], which consumes the context:
//!
//! ```text
//! new() ── draw_image_at() / layer_mut() ──> compose() ──> background updated
//! ```
//!
//! Effects stack bottom-to-top on an RGB work image in a fixed order:
//! drop shadow, fill, inner shadow. The work image is then composited onto
//! the background at the general opacity. Nothing is written to the
//! background before every other step has succeeded.

use crate::buffer::{PixelBuffer, PixelFormat, Rect};
use crate::error::Result;
use crate::executor::{ParallelExecutor, Sequential};
use crate::filters::{copy_image, BlendMode};

use super::drop_shadow::apply_drop_shadow;
use super::fill::apply_fill;
use super::inner_shadow::apply_inner_shadow;
use super::options::EffectOptions;

/// A layer awaiting composition onto a borrowed background.
pub struct LayerEffectsContext<'a, E: ParallelExecutor = Sequential> {
    background: &'a mut PixelBuffer,
    work_area: Rect,
    layer: PixelBuffer,
    options: EffectOptions,
    executor: E,
}

impl<'a> LayerEffectsContext<'a, Sequential> {
    /// Bind a context to `background`, limited to `draw_bounds`.
    ///
    /// Both rectangles are in the shared coordinate space. The work area is
    /// their intersection and may be empty.
    pub fn new(background: &'a mut PixelBuffer, draw_bounds: Rect, options: EffectOptions) -> Self {
        Self::with_executor(background, draw_bounds, options, Sequential)
    }
}

impl<'a, E: ParallelExecutor> LayerEffectsContext<'a, E> {
    /// Like [`LayerEffectsContext::new`], running the blur passes on `executor`.
    pub fn with_executor(
        background: &'a mut PixelBuffer,
        draw_bounds: Rect,
        options: EffectOptions,
        executor: E,
    ) -> Self {
        let work_area = background.bounds().intersection(&draw_bounds);
        log::debug!(
            "layer effects context: background {:?}, draw bounds {:?}, work area {:?}",
            background.bounds(),
            draw_bounds,
            work_area
        );

        Self {
            background,
            work_area,
            layer: PixelBuffer::new(PixelFormat::Argb, work_area),
            options,
            executor,
        }
    }

    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    /// The transparent ARGB layer the host draws into; its bounds are the
    /// work area.
    pub fn layer(&self) -> &PixelBuffer {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.layer
    }

    pub fn options(&self) -> &EffectOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut EffectOptions {
        &mut self.options
    }

    /// Draw `image` into the layer with its top-left at `(x, y)` in shared
    /// coordinates. Parts outside the work area are dropped.
    pub fn draw_image_at(&mut self, image: &PixelBuffer, x: i32, y: i32) {
        let offset = (
            x.saturating_sub(self.work_area.x),
            y.saturating_sub(self.work_area.y),
        );
        copy_image(
            &mut self.layer,
            offset,
            image,
            image.local_rect(),
            BlendMode::Normal,
            1.0,
        );
    }

    /// Apply the active effects and composite the result onto the background.
    ///
    /// # Errors
    /// `InvalidConfiguration` for option values no pass can honour. On any
    /// error the background is left untouched.
    pub fn compose(self) -> Result<()> {
        let Self {
            background,
            work_area,
            layer,
            options,
            executor,
        } = self;

        options.validate()?;

        if work_area.is_empty() {
            log::debug!("work area is empty, nothing to compose");
            return Ok(());
        }

        log::debug!(
            "composing {:?}: drop shadow {}, inner shadow {}, general opacity {}",
            work_area,
            options.drop_shadow.active,
            options.inner_shadow.active,
            options.general.opacity
        );

        let (bg_x, bg_y) = background.bounds().top_left();
        let local_area = work_area.translated(bg_x.saturating_neg(), bg_y.saturating_neg());

        // Backdrop
        let mut work = PixelBuffer::new(PixelFormat::Rgb, work_area);
        copy_image(
            &mut work,
            (0, 0),
            background,
            local_area,
            BlendMode::Normal,
            1.0,
        );

        apply_drop_shadow(&mut work, &layer, &options.drop_shadow, &executor)?;
        apply_fill(&mut work, &layer, &options.fill);
        apply_inner_shadow(&mut work, &layer, &options.inner_shadow, &executor)?;

        if options.bevel_emboss.active {
            log::debug!("bevel & emboss is active but has no compositing step");
        }
        if options.gradient_overlay.active {
            log::debug!("gradient overlay is active but has no compositing step");
        }

        copy_image(
            background,
            local_area.top_left(),
            &work,
            work.local_rect(),
            BlendMode::Normal,
            options.general.opacity,
        );

        log::debug!("composed {:?}", work_area);
        Ok(())
    }
}
