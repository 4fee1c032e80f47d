//! Pixel-level building blocks for the layer effects.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | SingleChannel | (H, W, 1) | Mask / coverage, 0-255 |
//! | RGB | (H, W, 3) | Red, green, blue, 0-255 |
//! | ARGB | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! Arithmetic runs on channels normalised to 0.0-1.0 and is rounded back
//! to 8 bits on store.
//!
//! ## Modules
//!
//! - **blend** - the blend-mode table and opacity mix
//! - **core** - channel extraction, mask inversion, clamped translation
//! - **convolution** - radial Gaussian kernel, full and clamped convolution
//! - **composite** - `copy_image` and `fill_image`

pub mod blend;
pub mod composite;
pub mod convolution;
pub mod core;

pub use self::blend::{blend_channel, blend_u8, BlendMode};
pub use self::composite::{copy_image, fill_image};
pub use self::convolution::ConvolutionKernel;
pub use self::core::{extract_channel, invert_mask, translate_clamped};
