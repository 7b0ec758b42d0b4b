//! Pixel-level helpers: region-of-interest crop, canonical resize and
//! colour → intensity conversion.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};
use log::warn;

use crate::config::Roi;

/// ITU-R BT.601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Intersect `roi` with a `width`×`height` frame.
/// Returns `(x, y, w, h)`, or `None` when nothing overlaps.
pub fn clamp_roi(roi: &Roi, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = roi.x.min(width);
    let y0 = roi.y.min(height);
    let x1 = roi.x.saturating_add(roi.width).min(width);
    let y1 = roi.y.saturating_add(roi.height).min(height);
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1 - x0, y1 - y0))
}

/// Crop the frame to the region of interest. A frame that does not
/// overlap the region at all is used whole.
pub fn crop_roi(frame: &RgbImage, roi: &Roi) -> RgbImage {
    match clamp_roi(roi, frame.width(), frame.height()) {
        Some((x, y, w, h)) => imageops::crop_imm(frame, x, y, w, h).to_image(),
        None => {
            warn!(
                "ROI {}x{}+{}+{} outside {}x{} frame, using full frame",
                roi.width,
                roi.height,
                roi.x,
                roi.y,
                frame.width(),
                frame.height()
            );
            frame.clone()
        }
    }
}

/// Resize to `width`×`height`. Shrinking averages every covered source
/// pixel by its overlap area; enlarging falls back to bilinear.
pub fn resize_area(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    if src.width() < width || src.height() < height {
        return imageops::resize(src, width, height, FilterType::Triangle);
    }

    let xs = area_weights(src.width(), width);
    let ys = area_weights(src.height(), height);
    let mut out = RgbImage::new(width, height);

    for (dy, wy) in ys.iter().enumerate() {
        for (dx, wx) in xs.iter().enumerate() {
            let mut acc = [0.0f64; 3];
            let mut total = 0.0f64;
            for &(sy, fy) in wy {
                for &(sx, fx) in wx {
                    let w = fy * fx;
                    let Rgb(p) = *src.get_pixel(sx, sy);
                    for (a, v) in acc.iter_mut().zip(p) {
                        *a += f64::from(v) * w;
                    }
                    total += w;
                }
            }
            let px = acc.map(|a| (a / total).round().clamp(0.0, 255.0) as u8);
            out.put_pixel(dx as u32, dy as u32, Rgb(px));
        }
    }
    out
}

/// Source indices and overlap weights for each destination index.
fn area_weights(src: u32, dst: u32) -> Vec<Vec<(u32, f64)>> {
    let scale = f64::from(src) / f64::from(dst);
    (0..dst)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = start + scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src);
            (first..last)
                .filter_map(|s| {
                    let w = end.min(f64::from(s + 1)) - start.max(f64::from(s));
                    (w > 1e-9).then_some((s, w))
                })
                .collect()
        })
        .collect()
}

/// Crop then resize to a `size`×`size` square.
pub fn normalize(frame: &RgbImage, roi: &Roi, size: u32) -> RgbImage {
    resize_area(&crop_roi(frame, roi), size, size)
}

/// Single-channel intensity image.
pub fn to_intensity(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let Rgb([r, g, b]) = *img.get_pixel(x, y);
        let l = LUMA_R * f32::from(r) + LUMA_G * f32::from(g) + LUMA_B * f32::from(b);
        Luma([l.round().clamp(0.0, 255.0) as u8])
    })
}
