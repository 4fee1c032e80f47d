//! layerfx - layer effect compositing
//!
//! Composites a foreground layer with Photoshop-style effects (drop shadow,
//! fill, inner shadow) onto a background, with Python bindings via PyO3 and
//! WASM bindings for JavaScript.
//!
//! ## Image Format
//! Buffers are 8-bit, interleaved, stored as `(height, width, channels)`:
//! - **SingleChannel**: (height, width, 1) - masks
//! - **RGB**: (height, width, 3) - backgrounds and work images
//! - **ARGB**: (height, width, 4) - layers, alpha is the last channel
//!
//! Every buffer also carries a bounds rectangle placing it in a shared
//! coordinate space, so a layer, its shadow and the background can be lined
//! up without extra bookkeeping.
//!
//! ## Example
//! ```
//! use layerfx::buffer::{Colour, PixelBuffer, PixelFormat, Rect};
//! use layerfx::layer_effects::{EffectOptions, LayerEffectsContext};
//!
//! let mut background = PixelBuffer::with_size(PixelFormat::Rgb, 32, 32);
//! let mut square = PixelBuffer::with_size(PixelFormat::Argb, 8, 8);
//! square.clear(Colour::WHITE);
//!
//! let mut options = EffectOptions::default();
//! options.drop_shadow.active = true;
//!
//! let mut context = LayerEffectsContext::new(&mut background, Rect::from_size(32, 32), options);
//! context.draw_image_at(&square, 12, 12);
//! context.compose().unwrap();
//!
//! assert_eq!(background.get(14, 14, 0), 255);
//! ```

pub mod buffer;
pub mod error;
pub mod executor;
pub mod filters;
pub mod layer_effects;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use crate::buffer::{Colour, PixelBuffer, PixelFormat, Rect};
pub use crate::error::{EffectsError, Result};
pub use crate::executor::{ParallelExecutor, RayonExecutor, Sequential};
pub use crate::filters::BlendMode;
pub use crate::layer_effects::{EffectOptions, LayerEffectsContext, OptionsListener};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::buffer::{PixelBuffer, PixelFormat, Rect};
    use crate::error::EffectsError;
    use crate::filters::BlendMode;
    use crate::layer_effects::{EffectOptions, LayerEffectsContext};

    // ========================================================================
    // Error Conversion
    // ========================================================================

    impl From<EffectsError> for PyErr {
        fn from(err: EffectsError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    fn to_buffer(data: PyReadonlyArray3<'_, u8>, x: i32, y: i32) -> PyResult<PixelBuffer> {
        let array = data.as_array().to_owned();
        let (height, width, channels) = array.dim();
        let format = PixelFormat::from_channels(channels).ok_or_else(|| {
            PyValueError::new_err(format!("expected 1, 3 or 4 channels, got {}", channels))
        })?;

        Ok(PixelBuffer::from_array(
            format,
            Rect::new(x, y, width as i32, height as i32),
            array,
        )?)
    }

    // ========================================================================
    // Layer Effects
    // ========================================================================

    /// Compose a layer with its effects onto a copy of a background.
    ///
    /// # Arguments
    /// * `background` - RGB (H, W, 3) or RGBA (H, W, 4) u8 image
    /// * `layer` - RGBA (h, w, 4) u8 image
    /// * `x`, `y` - Layer position on the background
    /// * `options_json` - Effect settings as JSON (defaults when omitted)
    ///
    /// # Returns
    /// The composed background, same shape as the input.
    #[pyfunction]
    #[pyo3(signature = (background, layer, x=0, y=0, options_json=None))]
    pub fn compose_layer_effects<'py>(
        py: Python<'py>,
        background: PyReadonlyArray3<'py, u8>,
        layer: PyReadonlyArray3<'py, u8>,
        x: i32,
        y: i32,
        options_json: Option<&str>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let options = match options_json {
            Some(json) => EffectOptions::from_json_str(json)?,
            None => EffectOptions::default(),
        };

        let mut background = to_buffer(background, 0, 0)?;
        let layer = to_buffer(layer, x, y)?;
        if layer.format() != PixelFormat::Argb {
            return Err(EffectsError::InvalidFormat {
                operation: "compose_layer_effects",
                expected: "an RGBA layer",
                found: layer.format(),
            }
            .into());
        }

        let mut context = LayerEffectsContext::new(&mut background, layer.bounds(), options);
        context.draw_image_at(&layer, x, y);
        context.compose()?;

        Ok(background.into_array().into_pyarray(py))
    }

    /// Names of every supported blend mode, in menu order.
    #[pyfunction]
    pub fn blend_mode_names() -> Vec<&'static str> {
        BlendMode::ALL.iter().map(|mode| mode.name()).collect()
    }

    // ========================================================================
    // Module Registration
    // ========================================================================

    #[pymodule]
    pub fn layerfx(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(compose_layer_effects, m)?)?;
        m.add_function(wrap_pyfunction!(blend_mode_names, m)?)?;
        Ok(())
    }
}
