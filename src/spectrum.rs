use std::sync::Arc;

use image::{GrayImage, RgbImage};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

use crate::error::{SpectroError, SpectroResult};

/// Convert an RGB frame to single-channel grayscale with BT.601 luma weights
/// (0.299 R + 0.587 G + 0.114 B), the standard conversion for video content.
pub fn to_luma_bt601(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    let mut out = GrayImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(rgb.pixels()) {
        let [r, g, b] = src.0;
        let y = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        dst.0[0] = y.round().min(255.0) as u8;
    }
    out
}

/// Replicate a single-channel grid into an opaque 3-channel frame, the format
/// the encoder expects.
pub fn replicate_to_rgb(gray: &GrayImage) -> RgbImage {
    let (width, height) = gray.dimensions();
    let mut out = RgbImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(gray.pixels()) {
        let y = src.0[0];
        dst.0 = [y, y, y];
    }
    out
}

/// Swap quadrants so the zero-frequency bin lands at the grid center.
///
/// Equivalent to rolling each axis by half its length (rounded down), which is
/// self-inverse when both dimensions are even. `data.len()` must equal
/// `width * height`.
pub fn fft_shift(data: &mut [f32], width: usize, height: usize) {
    debug_assert_eq!(data.len(), width * height);
    for row in data.chunks_exact_mut(width) {
        row.rotate_right(width / 2);
    }
    // Rows are contiguous blocks, so rotating the flat buffer rotates rows.
    data.rotate_right(width * (height / 2));
}

/// Linearly map a real-valued grid onto [0, 255].
///
/// A constant grid (max == min) maps to all zeros rather than dividing by
/// zero, matching min-max normalization as implemented by the usual image
/// toolkits.
pub fn normalize_to_u8(data: &[f32]) -> Vec<u8> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in data {
        min = min.min(v);
        max = max.max(v);
    }
    if !(max > min) {
        return vec![0u8; data.len()];
    }

    let scale = 255.0 / (max - min);
    data.iter()
        .map(|&v| ((v - min) * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Reusable 2D FFT plan for one frame geometry.
///
/// rustfft plans are built once per dimension and shared across every frame of
/// the run; the scratch and grid buffers are reused so the per-frame loop does
/// not allocate beyond the output image.
pub struct SpectrumPlan {
    width: usize,
    height: usize,
    row_fft: Arc<dyn Fft<f32>>,
    col_fft: Arc<dyn Fft<f32>>,
    grid: Vec<Complex<f32>>,
    transposed: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitude: Vec<f32>,
}

impl SpectrumPlan {
    pub fn new(width: u32, height: u32) -> SpectroResult<Self> {
        if width == 0 || height == 0 {
            return Err(SpectroError::validation(
                "spectrum dimensions must be non-zero",
            ));
        }
        let width = width as usize;
        let height = height as usize;

        let mut planner = FftPlanner::<f32>::new();
        let row_fft = planner.plan_fft_forward(width);
        let col_fft = planner.plan_fft_forward(height);
        let scratch_len = row_fft
            .get_inplace_scratch_len()
            .max(col_fft.get_inplace_scratch_len());

        Ok(Self {
            width,
            height,
            row_fft,
            col_fft,
            grid: vec![Complex::default(); width * height],
            transposed: vec![Complex::default(); width * height],
            scratch: vec![Complex::default(); scratch_len],
            magnitude: vec![0.0; width * height],
        })
    }

    /// Compute the centered, log-compressed, [0, 255]-normalized magnitude
    /// spectrum of a grayscale frame.
    pub fn magnitude_spectrum(&mut self, gray: &GrayImage) -> SpectroResult<GrayImage> {
        self.fft2_magnitude(gray)?;

        for v in &mut self.magnitude {
            *v = v.ln_1p();
        }
        fft_shift(&mut self.magnitude, self.width, self.height);

        let bytes = normalize_to_u8(&self.magnitude);
        GrayImage::from_raw(self.width as u32, self.height as u32, bytes)
            .ok_or_else(|| SpectroError::validation("spectrum buffer size mismatch (unexpected)"))
    }

    /// Full 2D forward FFT (rows, then columns via transpose), magnitudes left
    /// in `self.magnitude` in row-major frame order.
    fn fft2_magnitude(&mut self, gray: &GrayImage) -> SpectroResult<()> {
        let (w, h) = gray.dimensions();
        if w as usize != self.width || h as usize != self.height {
            return Err(SpectroError::validation(format!(
                "frame size mismatch: got {w}x{h}, planned {}x{}",
                self.width, self.height
            )));
        }

        for (dst, src) in self.grid.iter_mut().zip(gray.pixels()) {
            *dst = Complex::new(f32::from(src.0[0]), 0.0);
        }

        for row in self.grid.chunks_exact_mut(self.width) {
            self.row_fft.process_with_scratch(row, &mut self.scratch);
        }

        for y in 0..self.height {
            for x in 0..self.width {
                self.transposed[x * self.height + y] = self.grid[y * self.width + x];
            }
        }
        for col in self.transposed.chunks_exact_mut(self.height) {
            self.col_fft.process_with_scratch(col, &mut self.scratch);
        }

        for y in 0..self.height {
            for x in 0..self.width {
                self.magnitude[y * self.width + x] = self.transposed[x * self.height + y].norm();
            }
        }

        Ok(())
    }
}
