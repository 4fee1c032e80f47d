//! Radial Gaussian convolution for shadow masks.
//!
//! The kernel is separable: one horizontal and one vertical pass with the
//! same 1-D weights, O(W·H·r) instead of O(W·H·r²).
//!
//! Two output shapes are supported:
//! - **Full** - output grows by the radius on every side and the source is
//!   zero-padded, so blur spills past the original extent (drop shadow).
//! - **Clamped** - output keeps the source size and edge samples repeat
//!   (inner shadow).

use ndarray::Array2;

use crate::buffer::PixelBuffer;
use crate::error::{EffectsError, Result};
use crate::executor::{ParallelExecutor, Sequential};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Border {
    Zero,
    Clamp,
}

/// Build normalised 1-D weights for offsets `-radius..=radius`.
///
/// Uses sigma = radius / 3 (the kernel spans ±3 sigma) and subtracts the
/// Gaussian's value at the radius, so the outermost taps are exactly zero.
/// Radius 1 is therefore the identity kernel.
pub fn gaussian_weights(radius: usize) -> Vec<f32> {
    let sigma = radius as f64 / 3.0;
    let denom = 2.0 * sigma * sigma;
    let floor = (-((radius * radius) as f64) / denom).exp();

    let raw: Vec<f64> = (-(radius as i64)..=radius as i64)
        .map(|k| ((-((k * k) as f64) / denom).exp() - floor).max(0.0))
        .collect();

    // Normalize
    let sum: f64 = raw.iter().sum();
    raw.iter().map(|v| (v / sum) as f32).collect()
}

/// Square convolution kernel with integer radius.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionKernel {
    radius: usize,
    weights: Vec<f32>,
}

impl ConvolutionKernel {
    /// Kernel of the given radius with all weights zero.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `radius <= 0`.
    pub fn new(radius: i32) -> Result<Self> {
        if radius <= 0 {
            return Err(EffectsError::InvalidConfiguration(format!(
                "kernel radius must be positive, got {}",
                radius
            )));
        }

        let radius = radius as usize;
        Ok(Self {
            radius,
            weights: vec![0.0; radius * 2 + 1],
        })
    }

    /// Kernel of the given radius with Gaussian weights already filled in.
    pub fn gaussian(radius: i32) -> Result<Self> {
        let mut kernel = Self::new(radius)?;
        kernel.create_gaussian_blur();
        Ok(kernel)
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// 1-D weights, `2 * radius + 1` taps, centre in the middle.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Equivalent 2-D weights (outer product of the 1-D taps).
    pub fn weights_2d(&self) -> Array2<f32> {
        let n = self.weights.len();
        Array2::from_shape_fn((n, n), |(y, x)| self.weights[y] * self.weights[x])
    }

    /// Fill the kernel with a Gaussian blur.
    pub fn create_gaussian_blur(&mut self) {
        self.weights = gaussian_weights(self.radius);
    }

    /// Convolve with zero padding. Output is `(W + 2r) x (H + 2r)` and its
    /// bounds extend the source bounds by `r` on every side.
    pub fn create_convolved_image_full(&self, src: &PixelBuffer) -> Result<PixelBuffer> {
        self.create_convolved_image_full_with(src, &Sequential)
    }

    pub fn create_convolved_image_full_with<E: ParallelExecutor>(
        &self,
        src: &PixelBuffer,
        executor: &E,
    ) -> Result<PixelBuffer> {
        self.convolve(src, self.radius, Border::Zero, executor)
    }

    /// Convolve into a buffer of the source size, repeating edge samples.
    pub fn create_convolved_image(&self, src: &PixelBuffer) -> Result<PixelBuffer> {
        self.create_convolved_image_with(src, &Sequential)
    }

    pub fn create_convolved_image_with<E: ParallelExecutor>(
        &self,
        src: &PixelBuffer,
        executor: &E,
    ) -> Result<PixelBuffer> {
        self.convolve(src, 0, Border::Clamp, executor)
    }

    fn convolve<E: ParallelExecutor>(
        &self,
        src: &PixelBuffer,
        pad: usize,
        border: Border,
        executor: &E,
    ) -> Result<PixelBuffer> {
        let (width, height, channels) = (src.width(), src.height(), src.channels());
        let out_w = width + pad * 2;
        let out_h = height + pad * 2;
        let bounds = src.bounds().expanded(pad as i32);

        if width == 0 || height == 0 {
            return Ok(PixelBuffer::new(src.format(), bounds));
        }

        let input = src.as_array();
        let kernel = &self.weights;
        let r = self.radius as isize;
        let pad = pad as isize;

        // Maps an output coordinate plus tap offset to a source coordinate.
        let sample = move |centre: isize, k: isize, len: usize| -> Option<usize> {
            let s = centre - pad + k;
            match border {
                Border::Zero if s < 0 || s >= len as isize => None,
                Border::Zero => Some(s as usize),
                Border::Clamp => Some(s.clamp(0, len as isize - 1) as usize),
            }
        };

        // Horizontal pass: height rows of out_w pixels
        let mut temp = vec![0.0f32; height * out_w * channels];
        executor.for_each_row(&mut temp, out_w * channels, |y, row| {
            for ox in 0..out_w {
                for c in 0..channels {
                    let mut sum = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        if let Some(sx) = sample(ox as isize, ki as isize - r, width) {
                            sum += input[[y, sx, c]] as f32 * kv;
                        }
                    }
                    row[ox * channels + c] = sum;
                }
            }
        });

        // Vertical pass: out_h rows of out_w pixels
        let temp = &temp;
        let mut output = vec![0u8; out_h * out_w * channels];
        executor.for_each_row(&mut output, out_w * channels, |oy, row| {
            for ox in 0..out_w {
                for c in 0..channels {
                    let mut sum = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        if let Some(sy) = sample(oy as isize, ki as isize - r, height) {
                            sum += temp[(sy * out_w + ox) * channels + c] * kv;
                        }
                    }
                    row[ox * channels + c] = (sum + 0.5).clamp(0.0, 255.0) as u8;
                }
            }
        });

        PixelBuffer::from_vec(src.format(), bounds, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Colour, PixelFormat, Rect};
    use crate::executor::RayonExecutor;

    fn square_mask(size: usize, inset: i32) -> PixelBuffer {
        let mut mask = PixelBuffer::with_size(PixelFormat::SingleChannel, size, size);
        let side = size as i32 - inset * 2;
        mask.fill_rect(Rect::new(inset, inset, side, side), Colour::rgba(0, 0, 0, 255));
        mask
    }

    #[test]
    fn test_zero_radius_rejected() {
        assert!(matches!(
            ConvolutionKernel::new(0),
            Err(EffectsError::InvalidConfiguration(_))
        ));
        assert!(ConvolutionKernel::new(-3).is_err());
    }

    #[test]
    fn test_weights_sum_to_one_and_are_symmetric() {
        for radius in [1, 2, 3, 5, 8, 16] {
            let kernel = ConvolutionKernel::gaussian(radius).unwrap();
            let w = kernel.weights();
            assert_eq!(w.len(), radius as usize * 2 + 1);

            let sum: f32 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "radius {} sums to {}", radius, sum);

            let w2 = kernel.weights_2d();
            let sum2: f64 = w2.iter().map(|&v| v as f64).sum();
            assert!((sum2 - 1.0).abs() < 1e-6);

            let n = w.len();
            for i in 0..n {
                assert_eq!(w[i], w[n - 1 - i]);
                for j in 0..n {
                    assert_eq!(w2[[i, j]], w2[[j, i]]);
                }
            }
        }
    }

    #[test]
    fn test_radius_one_is_identity() {
        let kernel = ConvolutionKernel::gaussian(1).unwrap();

        assert_eq!(kernel.weights(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_fresh_kernel_is_zero() {
        let kernel = ConvolutionKernel::new(2).unwrap();
        let mask = square_mask(6, 0);

        let out = kernel.create_convolved_image(&mask).unwrap();

        assert!(out.as_array().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_full_convolution_of_empty_mask() {
        let kernel = ConvolutionKernel::gaussian(3).unwrap();
        let mask = PixelBuffer::with_size(PixelFormat::SingleChannel, 7, 4);

        let out = kernel.create_convolved_image_full(&mask).unwrap();

        assert_eq!(out.width(), 7 + 6);
        assert_eq!(out.height(), 4 + 6);
        assert!(out.as_array().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_full_convolution_spills_past_source() {
        let kernel = ConvolutionKernel::gaussian(4).unwrap();
        let mut mask = square_mask(8, 0);
        mask.set_origin(10, 20);

        let out = kernel.create_convolved_image_full(&mask).unwrap();

        assert_eq!(out.bounds(), Rect::new(6, 16, 16, 16));
        // Just outside the original square: blurred, non-zero.
        assert!(out.get(3, 8, 0) > 0);
        // Outermost ring only sees zero-weight taps.
        assert_eq!(out.get(0, 8, 0), 0);
        // Centre stays solid.
        assert_eq!(out.get(8, 8, 0), 255);
    }

    #[test]
    fn test_full_convolution_radius_one_preserves_mask() {
        let kernel = ConvolutionKernel::gaussian(1).unwrap();
        let mask = square_mask(5, 1);

        let out = kernel.create_convolved_image_full(&mask).unwrap();

        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(out.get(x + 1, y + 1, 0), mask.get(x, y, 0));
            }
        }
    }

    #[test]
    fn test_clamped_convolution_keeps_size_and_solid_fill() {
        let kernel = ConvolutionKernel::gaussian(3).unwrap();
        let mask = square_mask(6, 0);

        let out = kernel.create_convolved_image(&mask).unwrap();

        assert_eq!(out.width(), 6);
        assert_eq!(out.height(), 6);
        assert_eq!(out.bounds(), mask.bounds());
        // Clamp-to-edge: a solid mask stays solid right up to the border.
        assert!(out.as_array().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_clamped_convolution_softens_edges() {
        let kernel = ConvolutionKernel::gaussian(3).unwrap();
        let mask = square_mask(12, 3);

        let out = kernel.create_convolved_image(&mask).unwrap();

        let edge = out.get(3, 6, 0);
        assert!(edge > 0 && edge < 255);
        assert!(out.get(2, 6, 0) > 0);
    }

    #[test]
    fn test_rayon_executor_matches_sequential() {
        let kernel = ConvolutionKernel::gaussian(5).unwrap();
        let mask = square_mask(20, 5);
        let pool = RayonExecutor::with_threads(4).unwrap();

        assert_eq!(
            kernel.create_convolved_image_full_with(&mask, &pool).unwrap(),
            kernel.create_convolved_image_full(&mask).unwrap()
        );
        assert_eq!(
            kernel.create_convolved_image_with(&mask, &pool).unwrap(),
            kernel.create_convolved_image(&mask).unwrap()
        );
    }
}
