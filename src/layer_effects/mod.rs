//! Layer effects composited around a single layer (Photoshop-style layer styles).
//!
//! ## Effect Order
//!
//! Effects draw bottom-to-top onto one work image:
//! 1. **Drop Shadow** - blurred alpha cast behind the layer (`drop_shadow.rs`)
//! 2. **Fill** - the layer's own pixels (`fill.rs`)
//! 3. **Inner Shadow** - shadow inside the layer edges (`inner_shadow.rs`)
//!
//! The work image is then composited onto the background at the general
//! opacity (`context.rs`).
//!
//! ## Settings
//!
//! [`EffectOptions`] groups the settings of every effect (`options.rs`).
//! Bevel & emboss and gradient overlay settings are accepted and kept in the
//! snapshot, but no step draws them yet.

pub mod context;
pub mod drop_shadow;
pub mod fill;
pub mod inner_shadow;
pub mod options;

pub use self::context::LayerEffectsContext;
pub use self::options::{
    BevelEmbossOptions, BevelStyle, DropShadowOptions, EffectOptions, FillOptions,
    GeneralOptions, GradientOverlayOptions, GradientStop, GradientStyle, InnerShadowOptions,
    OptionsListener, MAX_DISTANCE, MAX_SIZE,
};
