//! Fuzz target: frame normalization
//!
//! The first six bytes pick a frame size and a region of interest; the
//! rest fills pixels. Normalization must always produce the canonical
//! square without panicking, whatever the geometry.
//!
//! cargo fuzz run fuzz_normalize

#![no_main]

use colorimetry::capture::imaging::normalize;
use colorimetry::config::Roi;
use image::{Rgb, RgbImage};
use libfuzzer_sys::fuzz_target;

const SIZE: u32 = 32;

fuzz_target!(|data: &[u8]| {
    let [w, h, x, y, rw, rh, rest @ ..] = data else {
        return;
    };
    let (w, h) = (u32::from(*w).max(1), u32::from(*h).max(1));
    let roi = Roi {
        x: u32::from(*x),
        y: u32::from(*y),
        width: u32::from(*rw).max(1),
        height: u32::from(*rh).max(1),
    };
    let frame = RgbImage::from_fn(w, h, |px, py| {
        let i = (py * w + px) as usize;
        let v = rest.get(i % rest.len().max(1)).copied().unwrap_or(0);
        Rgb([v, v.wrapping_mul(3), v.wrapping_add(17)])
    });
    assert_eq!(normalize(&frame, &roi, SIZE).dimensions(), (SIZE, SIZE));
});
