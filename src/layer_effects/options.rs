//! Effect settings snapshot.
//!
//! A host's settings panel edits one effect group at a time and reports the
//! change through [`OptionsListener`]. [`EffectOptions`] is itself a listener
//! that stores whatever group it is handed, so the host can keep one current
//! snapshot and give a copy to each compose pass.
//!
//! All groups deserialize with per-field defaults, so a JSON snapshot only
//! needs the values that differ:
//!
//! ```
//! use layerfx::layer_effects::EffectOptions;
//!
//! let options = EffectOptions::from_json_str(
//!     r#"{ "general": { "opacity": 0.5 }, "dropShadow": { "active": true, "size": 3 } }"#,
//! ).unwrap();
//! assert_eq!(options.drop_shadow.size, 3);
//! ```
//!
//! Angles are in radians.

use serde::{Deserialize, Serialize};

use crate::buffer::Colour;
use crate::error::{EffectsError, Result};
use crate::filters::BlendMode;

/// 120 degrees, the customary light direction for shadows.
const DEFAULT_ANGLE: f32 = 2.094_395_1;

/// Largest accepted blur size, in pixels.
pub const MAX_SIZE: i32 = 250;

/// Largest accepted shadow distance, in pixels.
pub const MAX_DISTANCE: f32 = 30_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralOptions {
    /// Opacity of the final composite onto the background.
    pub opacity: f32,
}

impl Default for GeneralOptions {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillOptions {
    pub mode: BlendMode,
    pub opacity: f32,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            mode: BlendMode::Normal,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DropShadowOptions {
    pub active: bool,
    /// Offset length in pixels.
    pub distance: f32,
    /// Light direction in radians; the shadow falls opposite.
    pub angle: f32,
    /// Blur size in pixels; the kernel radius is `size + 1`.
    pub size: i32,
    /// Hide the shadow wherever the layer itself is opaque.
    pub knockout: bool,
    pub mode: BlendMode,
    pub opacity: f32,
    pub colour: Colour,
}

impl Default for DropShadowOptions {
    fn default() -> Self {
        Self {
            active: false,
            distance: 5.0,
            angle: DEFAULT_ANGLE,
            size: 5,
            knockout: false,
            mode: BlendMode::Multiply,
            opacity: 0.75,
            colour: Colour::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InnerShadowOptions {
    pub active: bool,
    pub distance: f32,
    pub angle: f32,
    pub size: i32,
    pub mode: BlendMode,
    pub opacity: f32,
    pub colour: Colour,
}

impl Default for InnerShadowOptions {
    fn default() -> Self {
        Self {
            active: false,
            distance: 5.0,
            angle: DEFAULT_ANGLE,
            size: 5,
            mode: BlendMode::Multiply,
            opacity: 0.75,
            colour: Colour::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BevelStyle {
    OuterBevel,
    #[default]
    InnerBevel,
    Emboss,
    PillowEmboss,
}

/// Bevel & emboss settings. Carried in the snapshot; no compositing step
/// consumes them yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BevelEmbossOptions {
    pub active: bool,
    pub style: BevelStyle,
    pub depth: f32,
    pub size: i32,
    pub soften: i32,
    pub angle: f32,
    pub altitude: f32,
    pub highlight_mode: BlendMode,
    pub highlight_opacity: f32,
    pub highlight_colour: Colour,
    pub shadow_mode: BlendMode,
    pub shadow_opacity: f32,
    pub shadow_colour: Colour,
}

impl Default for BevelEmbossOptions {
    fn default() -> Self {
        Self {
            active: false,
            style: BevelStyle::InnerBevel,
            depth: 1.0,
            size: 5,
            soften: 0,
            angle: DEFAULT_ANGLE,
            altitude: 0.523_598_8,
            highlight_mode: BlendMode::Screen,
            highlight_opacity: 0.75,
            highlight_colour: Colour::WHITE,
            shadow_mode: BlendMode::Multiply,
            shadow_opacity: 0.75,
            shadow_colour: Colour::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradientStyle {
    #[default]
    Linear,
    Radial,
    Angle,
    Reflected,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0.0-1.0.
    pub position: f32,
    pub colour: Colour,
}

/// Gradient overlay settings. Carried in the snapshot; no compositing step
/// consumes them yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradientOverlayOptions {
    pub active: bool,
    pub mode: BlendMode,
    pub opacity: f32,
    pub style: GradientStyle,
    pub angle: f32,
    pub scale: f32,
    pub reverse: bool,
    pub stops: Vec<GradientStop>,
}

impl Default for GradientOverlayOptions {
    fn default() -> Self {
        Self {
            active: false,
            mode: BlendMode::Normal,
            opacity: 1.0,
            style: GradientStyle::Linear,
            angle: std::f32::consts::FRAC_PI_2,
            scale: 1.0,
            reverse: false,
            stops: vec![
                GradientStop { position: 0.0, colour: Colour::BLACK },
                GradientStop { position: 1.0, colour: Colour::WHITE },
            ],
        }
    }
}

/// Snapshot of every effect group for one compose pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectOptions {
    pub general: GeneralOptions,
    pub fill: FillOptions,
    pub drop_shadow: DropShadowOptions,
    pub inner_shadow: InnerShadowOptions,
    pub bevel_emboss: BevelEmbossOptions,
    pub gradient_overlay: GradientOverlayOptions,
}

fn check_opacity(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EffectsError::InvalidConfiguration(format!(
            "{} must be within 0.0-1.0, got {}",
            name, value
        )))
    }
}

fn check_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EffectsError::InvalidConfiguration(format!("{} must be finite", name)))
    }
}

fn check_distance(name: &str, value: f32) -> Result<()> {
    check_finite(name, value)?;
    if value.abs() <= MAX_DISTANCE {
        Ok(())
    } else {
        Err(EffectsError::InvalidConfiguration(format!(
            "{} must be within +/-{}, got {}",
            name, MAX_DISTANCE, value
        )))
    }
}

fn check_size(name: &str, value: i32) -> Result<()> {
    if (0..=MAX_SIZE).contains(&value) {
        Ok(())
    } else {
        Err(EffectsError::InvalidConfiguration(format!(
            "{} must be within 0-{}, got {}",
            name, MAX_SIZE, value
        )))
    }
}

impl EffectOptions {
    /// Parse and validate a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: EffectOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values no compose pass can honour.
    pub fn validate(&self) -> Result<()> {
        check_opacity("general.opacity", self.general.opacity)?;
        check_opacity("fill.opacity", self.fill.opacity)?;

        let drop = &self.drop_shadow;
        check_opacity("dropShadow.opacity", drop.opacity)?;
        check_distance("dropShadow.distance", drop.distance)?;
        check_finite("dropShadow.angle", drop.angle)?;
        check_size("dropShadow.size", drop.size)?;

        let inner = &self.inner_shadow;
        check_opacity("innerShadow.opacity", inner.opacity)?;
        check_distance("innerShadow.distance", inner.distance)?;
        check_finite("innerShadow.angle", inner.angle)?;
        check_size("innerShadow.size", inner.size)?;

        check_size("bevelEmboss.size", self.bevel_emboss.size)?;
        check_size("bevelEmboss.soften", self.bevel_emboss.soften)?;
        check_opacity("bevelEmboss.highlightOpacity", self.bevel_emboss.highlight_opacity)?;
        check_opacity("bevelEmboss.shadowOpacity", self.bevel_emboss.shadow_opacity)?;
        check_opacity("gradientOverlay.opacity", self.gradient_overlay.opacity)?;

        Ok(())
    }

    /// Push every group to `listener`, in panel order.
    pub fn notify(&self, listener: &mut dyn OptionsListener) {
        listener.on_options_general(self.general);
        listener.on_options_fill(self.fill);
        listener.on_options_drop_shadow(self.drop_shadow);
        listener.on_options_inner_shadow(self.inner_shadow);
        listener.on_options_bevel_emboss(self.bevel_emboss);
        listener.on_options_gradient_overlay(self.gradient_overlay.clone());
    }
}

/// Receives one callback per effect group whenever the host's settings change.
///
/// Every method has an empty default body; implement only the groups you
/// care about.
pub trait OptionsListener {
    fn on_options_general(&mut self, _general: GeneralOptions) {}
    fn on_options_fill(&mut self, _fill: FillOptions) {}
    fn on_options_drop_shadow(&mut self, _drop_shadow: DropShadowOptions) {}
    fn on_options_inner_shadow(&mut self, _inner_shadow: InnerShadowOptions) {}
    fn on_options_bevel_emboss(&mut self, _bevel_emboss: BevelEmbossOptions) {}
    fn on_options_gradient_overlay(&mut self, _gradient_overlay: GradientOverlayOptions) {}
}

impl OptionsListener for EffectOptions {
    fn on_options_general(&mut self, general: GeneralOptions) {
        self.general = general;
    }

    fn on_options_fill(&mut self, fill: FillOptions) {
        self.fill = fill;
    }

    fn on_options_drop_shadow(&mut self, drop_shadow: DropShadowOptions) {
        self.drop_shadow = drop_shadow;
    }

    fn on_options_inner_shadow(&mut self, inner_shadow: InnerShadowOptions) {
        self.inner_shadow = inner_shadow;
    }

    fn on_options_bevel_emboss(&mut self, bevel_emboss: BevelEmbossOptions) {
        self.bevel_emboss = bevel_emboss;
    }

    fn on_options_gradient_overlay(&mut self, gradient_overlay: GradientOverlayOptions) {
        self.gradient_overlay = gradient_overlay;
    }
}
