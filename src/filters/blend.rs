//! Per-channel blend modes.
//!
//! Every mode is a pure function of one source and one destination channel,
//! both normalised to 0.0-1.0. The result is clamped back into that range,
//! and divisions that would blow up (color dodge at src = 1, color burn at
//! src = 0, reflect at src = 1) saturate instead.
//!
//! ## Opacity
//!
//! `result = dst * (1 - opacity) + blend(src, dst) * opacity`
//!
//! so opacity 0 always leaves the destination untouched and opacity 1 is the
//! bare formula.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::core::{from_unit, to_unit};

/// Blend mode used when drawing one buffer onto another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlendMode {
    #[default]
    Normal,
    Lighten,
    Darken,
    Multiply,
    Average,
    Add,
    Subtract,
    Difference,
    Negation,
    Screen,
    Exclusion,
    Overlay,
    SoftLight,
    HardLight,
    ColorDodge,
    ColorBurn,
    LinearDodge,
    LinearBurn,
    LinearLight,
    VividLight,
    PinLight,
    HardMix,
    Reflect,
    Glow,
    Phoenix,
}

impl BlendMode {
    /// Every mode, in the order a mode picker lists them.
    pub const ALL: [BlendMode; 25] = [
        BlendMode::Normal,
        BlendMode::Lighten,
        BlendMode::Darken,
        BlendMode::Multiply,
        BlendMode::Average,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Difference,
        BlendMode::Negation,
        BlendMode::Screen,
        BlendMode::Exclusion,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::HardLight,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::LinearDodge,
        BlendMode::LinearBurn,
        BlendMode::LinearLight,
        BlendMode::VividLight,
        BlendMode::PinLight,
        BlendMode::HardMix,
        BlendMode::Reflect,
        BlendMode::Glow,
        BlendMode::Phoenix,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "Normal",
            BlendMode::Lighten => "Lighten",
            BlendMode::Darken => "Darken",
            BlendMode::Multiply => "Multiply",
            BlendMode::Average => "Average",
            BlendMode::Add => "Add",
            BlendMode::Subtract => "Subtract",
            BlendMode::Difference => "Difference",
            BlendMode::Negation => "Negation",
            BlendMode::Screen => "Screen",
            BlendMode::Exclusion => "Exclusion",
            BlendMode::Overlay => "Overlay",
            BlendMode::SoftLight => "Soft Light",
            BlendMode::HardLight => "Hard Light",
            BlendMode::ColorDodge => "Color Dodge",
            BlendMode::ColorBurn => "Color Burn",
            BlendMode::LinearDodge => "Linear Dodge",
            BlendMode::LinearBurn => "Linear Burn",
            BlendMode::LinearLight => "Linear Light",
            BlendMode::VividLight => "Vivid Light",
            BlendMode::PinLight => "Pin Light",
            BlendMode::HardMix => "Hard Mix",
            BlendMode::Reflect => "Reflect",
            BlendMode::Glow => "Glow",
            BlendMode::Phoenix => "Phoenix",
        }
    }

    /// Blend one normalised channel. Result is clamped to 0.0-1.0.
    #[inline]
    pub fn blend(self, src: f32, dst: f32) -> f32 {
        let value = match self {
            BlendMode::Normal => src,
            BlendMode::Lighten => src.max(dst),
            BlendMode::Darken => src.min(dst),
            BlendMode::Multiply => src * dst,
            BlendMode::Average => (src + dst) * 0.5,
            BlendMode::Add | BlendMode::LinearDodge => src + dst,
            BlendMode::Subtract => dst - src,
            BlendMode::Difference => (src - dst).abs(),
            BlendMode::Negation => 1.0 - (1.0 - src - dst).abs(),
            BlendMode::Screen => src + dst - src * dst,
            BlendMode::Exclusion => src + dst - 2.0 * src * dst,
            BlendMode::Overlay => overlay(src, dst),
            BlendMode::SoftLight => soft_light(src, dst),
            BlendMode::HardLight => overlay(dst, src),
            BlendMode::ColorDodge => color_dodge(src, dst),
            BlendMode::ColorBurn => color_burn(src, dst),
            BlendMode::LinearBurn => src + dst - 1.0,
            BlendMode::LinearLight => dst + (2.0 * src - 1.0),
            BlendMode::VividLight => vivid_light(src, dst),
            BlendMode::PinLight => {
                if src < 0.5 {
                    dst.min(2.0 * src)
                } else {
                    dst.max(2.0 * (src - 0.5))
                }
            }
            BlendMode::HardMix => {
                if vivid_light(src, dst) < 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
            BlendMode::Reflect => reflect(src, dst),
            BlendMode::Glow => reflect(dst, src),
            BlendMode::Phoenix => src.min(dst) - src.max(dst) + 1.0,
        };

        value.clamp(0.0, 1.0)
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn overlay(src: f32, dst: f32) -> f32 {
    if dst < 0.5 {
        2.0 * src * dst
    } else {
        1.0 - 2.0 * (1.0 - src) * (1.0 - dst)
    }
}

#[inline]
fn soft_light(src: f32, dst: f32) -> f32 {
    let s = src * 0.5 + 0.25;
    if dst < 0.5 {
        2.0 * s * dst
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - dst)
    }
}

#[inline]
fn color_dodge(src: f32, dst: f32) -> f32 {
    if src >= 1.0 {
        1.0
    } else {
        (dst / (1.0 - src)).min(1.0)
    }
}

#[inline]
fn color_burn(src: f32, dst: f32) -> f32 {
    if src <= 0.0 {
        0.0
    } else {
        (1.0 - (1.0 - dst) / src).max(0.0)
    }
}

#[inline]
fn vivid_light(src: f32, dst: f32) -> f32 {
    if src < 0.5 {
        color_burn(2.0 * src, dst)
    } else {
        color_dodge(2.0 * (src - 0.5), dst)
    }
}

#[inline]
fn reflect(src: f32, dst: f32) -> f32 {
    if src >= 1.0 {
        1.0
    } else {
        (dst * dst / (1.0 - src)).min(1.0)
    }
}

/// Blend one normalised channel at the given opacity.
#[inline]
pub fn blend_channel(src: f32, dst: f32, mode: BlendMode, opacity: f32) -> f32 {
    let opacity = opacity.clamp(0.0, 1.0);
    dst * (1.0 - opacity) + mode.blend(src, dst) * opacity
}

/// Blend one 8-bit channel at the given opacity.
#[inline]
pub fn blend_u8(src: u8, dst: u8, mode: BlendMode, opacity: f32) -> u8 {
    from_unit(blend_channel(to_unit(src), to_unit(dst), mode, opacity))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u8; 9] = [0, 1, 31, 64, 127, 128, 200, 254, 255];

    #[test]
    fn test_zero_opacity_keeps_destination() {
        for mode in BlendMode::ALL {
            for &src in &SAMPLES {
                for &dst in &SAMPLES {
                    assert_eq!(blend_u8(src, dst, mode, 0.0), dst, "{} src={} dst={}", mode, src, dst);
                }
            }
        }
    }

    #[test]
    fn test_full_opacity_is_bare_formula() {
        for mode in BlendMode::ALL {
            for &src in &SAMPLES {
                for &dst in &SAMPLES {
                    let expected = from_unit(mode.blend(to_unit(src), to_unit(dst)));
                    assert_eq!(blend_u8(src, dst, mode, 1.0), expected, "{}", mode);
                }
            }
        }
    }

    #[test]
    fn test_results_stay_in_range() {
        for mode in BlendMode::ALL {
            for i in 0..=20 {
                for j in 0..=20 {
                    let v = mode.blend(i as f32 / 20.0, j as f32 / 20.0);
                    assert!((0.0..=1.0).contains(&v), "{} produced {}", mode, v);
                }
            }
        }
    }

    #[test]
    fn test_multiply_identities() {
        for &dst in &SAMPLES {
            assert_eq!(blend_u8(0, dst, BlendMode::Multiply, 1.0), 0);
            assert_eq!(blend_u8(255, dst, BlendMode::Multiply, 1.0), dst);
        }
    }

    #[test]
    fn test_screen_is_inverted_multiply() {
        for &a in &SAMPLES {
            for &b in &SAMPLES {
                let (a, b) = (to_unit(a), to_unit(b));
                let screen = BlendMode::Screen.blend(a, b);
                let via_multiply = 1.0 - BlendMode::Multiply.blend(1.0 - a, 1.0 - b);
                assert!((screen - via_multiply).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_difference_with_self_is_zero() {
        for &a in &SAMPLES {
            assert_eq!(blend_u8(a, a, BlendMode::Difference, 1.0), 0);
        }
    }

    #[test]
    fn test_darken_lighten_are_min_max() {
        assert_eq!(blend_u8(10, 200, BlendMode::Darken, 1.0), 10);
        assert_eq!(blend_u8(10, 200, BlendMode::Lighten, 1.0), 200);
    }

    #[test]
    fn test_subtract_removes_source_from_destination() {
        assert_eq!(blend_u8(100, 180, BlendMode::Subtract, 1.0), 80);
        assert_eq!(blend_u8(255, 180, BlendMode::Subtract, 1.0), 0);
    }

    #[test]
    fn test_dodge_and_burn_saturate_instead_of_dividing_by_zero() {
        assert_eq!(BlendMode::ColorDodge.blend(1.0, 0.0), 1.0);
        assert_eq!(BlendMode::ColorDodge.blend(1.0, 0.7), 1.0);
        assert_eq!(BlendMode::ColorBurn.blend(0.0, 1.0), 0.0);
        assert_eq!(BlendMode::Reflect.blend(1.0, 0.0), 1.0);
        assert_eq!(BlendMode::Glow.blend(0.0, 1.0), 1.0);
    }

    #[test]
    fn test_overlay_branches_on_destination() {
        assert!((BlendMode::Overlay.blend(0.5, 0.25) - 0.25).abs() < 1e-6);
        assert!((BlendMode::Overlay.blend(0.5, 0.75) - 0.75).abs() < 1e-6);
        // Hard light swaps the operands.
        assert!((BlendMode::HardLight.blend(0.25, 0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_hard_mix_is_binary() {
        for &a in &SAMPLES {
            for &b in &SAMPLES {
                let v = BlendMode::HardMix.blend(to_unit(a), to_unit(b));
                assert!(v == 0.0 || v == 1.0);
            }
        }
    }

    #[test]
    fn test_phoenix_and_negation() {
        assert!((BlendMode::Phoenix.blend(0.2, 0.7) - 0.5).abs() < 1e-6);
        assert!((BlendMode::Negation.blend(0.8, 0.6) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_half_opacity_normal_is_midpoint() {
        assert_eq!(blend_u8(255, 0, BlendMode::Normal, 0.5), 128);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BlendMode::SoftLight).unwrap();
        assert_eq!(json, "\"softLight\"");
        let mode: BlendMode = serde_json::from_str("\"colorDodge\"").unwrap();
        assert_eq!(mode, BlendMode::ColorDodge);
    }
}
