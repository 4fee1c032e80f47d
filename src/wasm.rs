//! WebAssembly exports for layer effects.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat RGBA bytes (canvas `ImageData` layout).

use wasm_bindgen::prelude::*;

use crate::buffer::{PixelBuffer, PixelFormat, Rect};
use crate::error::EffectsError;
use crate::filters::BlendMode;
use crate::layer_effects::{EffectOptions, LayerEffectsContext};

fn to_js(err: EffectsError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ============================================================================
// Layer Effects
// ============================================================================

/// Compose a layer with its effects onto a copy of a background.
///
/// # Arguments
/// * `background` - Flat RGBA bytes (length = width * height * 4)
/// * `width` - Background width in pixels
/// * `height` - Background height in pixels
/// * `layer` - Flat RGBA bytes (length = layer_width * layer_height * 4)
/// * `layer_width` - Layer width in pixels
/// * `layer_height` - Layer height in pixels
/// * `x`, `y` - Layer position on the background
/// * `options_json` - Effect settings as JSON; empty for defaults
///
/// # Returns
/// Flat RGBA bytes of the composed background
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn compose_layer_effects_wasm(
    background: &[u8],
    width: usize,
    height: usize,
    layer: &[u8],
    layer_width: usize,
    layer_height: usize,
    x: i32,
    y: i32,
    options_json: &str,
) -> Result<Vec<u8>, JsValue> {
    let options = if options_json.trim().is_empty() {
        EffectOptions::default()
    } else {
        EffectOptions::from_json_str(options_json).map_err(to_js)?
    };

    let mut background = PixelBuffer::from_vec(
        PixelFormat::Argb,
        Rect::from_size(width as i32, height as i32),
        background.to_vec(),
    )
    .map_err(to_js)?;
    let layer = PixelBuffer::from_vec(
        PixelFormat::Argb,
        Rect::new(x, y, layer_width as i32, layer_height as i32),
        layer.to_vec(),
    )
    .map_err(to_js)?;

    let mut context = LayerEffectsContext::new(&mut background, layer.bounds(), options);
    context.draw_image_at(&layer, x, y);
    context.compose().map_err(to_js)?;

    Ok(background.into_array().into_raw_vec_and_offset().0)
}

/// Names of every supported blend mode, in menu order.
#[wasm_bindgen]
pub fn blend_mode_names_wasm() -> Vec<String> {
    BlendMode::ALL.iter().map(|mode| mode.name().to_string()).collect()
}
