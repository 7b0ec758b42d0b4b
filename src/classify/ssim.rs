//! Mean structural similarity (SSIM) between two equally-sized
//! grayscale images.
//!
//! 7×7 uniform window, K1 = 0.01, K2 = 0.03, data range 255, sample
//! (N−1) covariance. The mean is taken over every window position that
//! lies fully inside the image. Window sums come from summed-area tables
//! so the cost is linear in the pixel count.
//!
//! Identical inputs score exactly `1.0`.

use image::GrayImage;

use crate::error::ClassifyError;

pub const WINDOW_SIZE: usize = 7;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Summed-area table with a zero border row/column.
struct SummedArea {
    stride: usize,
    sums: Vec<u64>,
}

impl SummedArea {
    fn build(width: usize, height: usize, value: impl Fn(usize) -> u64) -> Self {
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row = 0u64;
            for x in 0..width {
                row += value(y * width + x);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self { stride, sums }
    }

    /// Sum over the `n`×`n` window whose top-left corner is `(x, y)`.
    fn window(&self, x: usize, y: usize, n: usize) -> u64 {
        let s = self.stride;
        let a = self.sums[y * s + x];
        let b = self.sums[y * s + x + n];
        let c = self.sums[(y + n) * s + x];
        let d = self.sums[(y + n) * s + x + n];
        d + a - b - c
    }
}

/// Mean SSIM of `a` against `b`, in `[-1, 1]`; higher is more similar.
pub fn mean_ssim(a: &GrayImage, b: &GrayImage) -> Result<f64, ClassifyError> {
    if a.dimensions() != b.dimensions() {
        return Err(ClassifyError::DimensionMismatch {
            expected: b.dimensions(),
            actual: a.dimensions(),
        });
    }
    let (w, h) = (a.width() as usize, a.height() as usize);
    if w < WINDOW_SIZE || h < WINDOW_SIZE {
        return Err(ClassifyError::ImageTooSmall {
            width: a.width(),
            height: a.height(),
        });
    }

    let xa = a.as_raw();
    let xb = b.as_raw();
    let px = |buf: &[u8], i: usize| u64::from(buf[i]);

    let sum_a = SummedArea::build(w, h, |i| px(xa, i));
    let sum_b = SummedArea::build(w, h, |i| px(xb, i));
    let sum_aa = SummedArea::build(w, h, |i| px(xa, i) * px(xa, i));
    let sum_bb = SummedArea::build(w, h, |i| px(xb, i) * px(xb, i));
    let sum_ab = SummedArea::build(w, h, |i| px(xa, i) * px(xb, i));

    let n = WINDOW_SIZE;
    let np = (n * n) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let mut total = 0.0f64;
    let mut count = 0usize;
    for y in 0..=h - n {
        for x in 0..=w - n {
            let ux = sum_a.window(x, y, n) as f64 / np;
            let uy = sum_b.window(x, y, n) as f64 / np;
            let uxx = sum_aa.window(x, y, n) as f64 / np;
            let uyy = sum_bb.window(x, y, n) as f64 / np;
            let uxy = sum_ab.window(x, y, n) as f64 / np;

            let vx = cov_norm * (uxx - ux * ux);
            let vy = cov_norm * (uyy - uy * uy);
            let vxy = cov_norm * (uxy - ux * uy);

            let num = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let den = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += num / den;
            count += 1;
        }
    }

    Ok(total / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn checker(size: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 { Luma([30]) } else { Luma([220]) }
        })
    }

    #[test]
    fn identical_images_score_one() {
        let img = checker(135, 5);
        assert_eq!(mean_ssim(&img, &img).unwrap(), 1.0);
    }

    #[test]
    fn flat_images_match_closed_form() {
        // With zero variance SSIM reduces to (2ab + c1) / (a² + b² + c1).
        let a = GrayImage::from_pixel(20, 20, Luma([100]));
        let b = GrayImage::from_pixel(20, 20, Luma([50]));
        let c1 = (K1 * DATA_RANGE).powi(2);
        let expected = (2.0 * 100.0 * 50.0 + c1) / (100.0f64.powi(2) + 50.0f64.powi(2) + c1);
        let got = mean_ssim(&a, &b).unwrap();
        assert!((got - expected).abs() < 1e-12, "got {got}, expected {expected}");
    }

    #[test]
    fn score_is_symmetric() {
        let a = checker(40, 4);
        let b = GrayImage::from_fn(40, 40, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let ab = mean_ssim(&a, &b).unwrap();
        let ba = mean_ssim(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn inverted_pattern_scores_lower_than_itself() {
        let a = checker(64, 8);
        let inv = GrayImage::from_fn(64, 64, |x, y| Luma([255 - a.get_pixel(x, y).0[0]]));
        let s = mean_ssim(&a, &inv).unwrap();
        assert!(s < 0.0, "inverted checkerboard should anti-correlate, got {s}");
        assert!(s >= -1.0);
    }

    #[test]
    fn closer_image_scores_higher() {
        let a = checker(64, 8);
        let slightly = GrayImage::from_fn(64, 64, |x, y| {
            Luma([a.get_pixel(x, y).0[0].saturating_add(((x + y) % 3) as u8)])
        });
        let flat = GrayImage::from_pixel(64, 64, Luma([128]));
        assert!(mean_ssim(&a, &slightly).unwrap() > mean_ssim(&a, &flat).unwrap());
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = GrayImage::new(10, 10);
        let b = GrayImage::new(10, 11);
        assert!(matches!(
            mean_ssim(&a, &b),
            Err(ClassifyError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn images_smaller_than_window_are_rejected() {
        let a = GrayImage::new(6, 30);
        assert_eq!(
            mean_ssim(&a, &a),
            Err(ClassifyError::ImageTooSmall { width: 6, height: 30 })
        );
    }
}
