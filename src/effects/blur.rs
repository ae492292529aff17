//! Separable box blur.
//!
//! Each pass slides a running sum along the rows, so the cost per pixel does
//! not depend on the radius. The vertical pass is the same row pass run on
//! the transposed image.

use crate::error::BmpError;
use crate::geometry::transpose;
use crate::image::Image;
use crate::pixel::{BYTES_PER_PIXEL, Pixel};

/// Box blur with a `(2 * radius + 1)` square window.
///
/// At the borders the window is cut to the pixels that exist and the
/// divisor shrinks with it. Radius 0 returns an unchanged copy.
pub fn blur(image: &Image, radius: usize) -> Result<Image, BmpError> {
    if radius == 0 {
        return Ok(image.clone());
    }

    let longest = image.width().max(image.height());
    let mut scratch = Vec::new();
    scratch
        .try_reserve_exact(longest)
        .map_err(|_| BmpError::Allocation {
            bytes: longest * BYTES_PER_PIXEL,
        })?;

    let mut horizontal = image.clone();
    blur_rows(&mut horizontal, radius, &mut scratch);

    let mut vertical = transpose(&horizontal)?;
    drop(horizontal);
    blur_rows(&mut vertical, radius, &mut scratch);

    transpose(&vertical)
}

fn blur_rows(image: &mut Image, radius: usize, scratch: &mut Vec<Pixel>) {
    for row in image.rows_mut() {
        scratch.clear();
        scratch.extend_from_slice(row);
        blur_row(scratch, row, radius);
    }
}

/// Running-sum blur of `src` into `dst` (same length).
fn blur_row(src: &[Pixel], dst: &mut [Pixel], radius: usize) {
    let width = src.len();
    let mut sum = [0u64; 3];

    // Window for x = 0 minus its rightmost pixel.
    for p in &src[..radius.min(width)] {
        accumulate(&mut sum, *p, true);
    }

    for (x, out) in dst.iter_mut().enumerate() {
        if let Some(entering) = src.get(x.saturating_add(radius)) {
            accumulate(&mut sum, *entering, true);
        }
        if let Some(leaving) = x.checked_sub(radius.saturating_add(1)) {
            accumulate(&mut sum, src[leaving], false);
        }
        let first = x.saturating_sub(radius);
        let last = x.saturating_add(radius).min(width - 1);
        let count = (last - first + 1) as u64;
        *out = Pixel {
            b: (sum[0] / count) as u8,
            g: (sum[1] / count) as u8,
            r: (sum[2] / count) as u8,
        };
    }
}

#[inline]
fn accumulate(sum: &mut [u64; 3], p: Pixel, entering: bool) {
    let channels = [u64::from(p.b), u64::from(p.g), u64::from(p.r)];
    for (s, v) in sum.iter_mut().zip(channels) {
        if entering {
            *s += v;
        } else {
            *s -= v;
        }
    }
}
