//! Per-pixel colour filters. Each is a single row-major pass with no
//! cross-pixel state and cannot fail.

use crate::image::Image;
use crate::pixel::{ChannelMask, Pixel};

// Luma weights scaled by 1024.
const LUMA_R: u32 = 306;
const LUMA_G: u32 = 601;
const LUMA_B: u32 = 117;
const LUMA_SHIFT: u32 = 10;

// x / 3 == (x * 683) >> 11 for every channel sum 0..=765.
const DIV3_MUL: u32 = 683;
const DIV3_SHIFT: u32 = 11;

#[inline]
fn for_each_pixel(image: &mut Image, mut f: impl FnMut(&mut Pixel)) {
    for row in image.rows_mut() {
        for px in row {
            f(px);
        }
    }
}

/// Luma of one pixel, `(306 R + 601 G + 117 B) >> 10`.
#[inline]
pub fn luma(p: Pixel) -> u8 {
    let y = LUMA_R * u32::from(p.r) + LUMA_G * u32::from(p.g) + LUMA_B * u32::from(p.b);
    (y >> LUMA_SHIFT) as u8
}

/// Mean of the three channels, rounded down.
#[inline]
pub fn channel_average(p: Pixel) -> u8 {
    let sum = u32::from(p.r) + u32::from(p.g) + u32::from(p.b);
    ((sum * DIV3_MUL) >> DIV3_SHIFT) as u8
}

pub fn invert(image: &mut Image) {
    for_each_pixel(image, |px| {
        px.b = !px.b;
        px.g = !px.g;
        px.r = !px.r;
    });
}

/// Zero every channel named in `mask`.
pub fn filter_channels(image: &mut Image, mask: ChannelMask) {
    if mask.is_empty() {
        return;
    }
    if mask == ChannelMask::ALL {
        image.as_bytes_mut().fill(0);
        return;
    }
    let red = mask.contains(ChannelMask::RED);
    let green = mask.contains(ChannelMask::GREEN);
    let blue = mask.contains(ChannelMask::BLUE);
    for_each_pixel(image, |px| {
        if red {
            px.r = 0;
        }
        if green {
            px.g = 0;
        }
        if blue {
            px.b = 0;
        }
    });
}

/// Perceptual grayscale using [`luma`].
pub fn grayscale_luma(image: &mut Image) {
    for_each_pixel(image, |px| {
        let y = luma(*px);
        *px = Pixel { b: y, g: y, r: y };
    });
}

/// Flat grayscale using [`channel_average`].
pub fn grayscale_average(image: &mut Image) {
    for_each_pixel(image, |px| {
        let y = channel_average(*px);
        *px = Pixel { b: y, g: y, r: y };
    });
}

/// Zero each channel whose value is above `cutoff`.
pub fn brightness_cut(image: &mut Image, cutoff: u8) {
    let cut = |v: u8| if v <= cutoff { v } else { 0 };
    for_each_pixel(image, |px| {
        px.b = cut(px.b);
        px.g = cut(px.g);
        px.r = cut(px.r);
    });
}

/// Push channel values at or above `high` up by `factor` and values at or
/// below `low` down by `factor`, saturating. Applied through a 256-entry table.
pub fn contrast(image: &mut Image, factor: u8, low: u8, high: u8) {
    let lut = contrast_table(factor, low, high);
    for_each_pixel(image, |px| {
        px.b = lut[usize::from(px.b)];
        px.g = lut[usize::from(px.g)];
        px.r = lut[usize::from(px.r)];
    });
}

fn contrast_table(factor: u8, low: u8, high: u8) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (v, out) in (0..=u8::MAX).zip(lut.iter_mut()) {
        *out = if v >= high {
            v.saturating_add(factor)
        } else if v <= low {
            v.saturating_sub(factor)
        } else {
            v
        };
    }
    lut
}

/// Exchange the red and blue channels.
pub fn swap_channels(image: &mut Image) {
    #[cfg(feature = "simd")]
    {
        if garb::bgr_to_rgb_inplace(image.as_bytes_mut()).is_ok() {
            return;
        }
    }
    for_each_pixel(image, |px| core::mem::swap(&mut px.b, &mut px.r));
}

/// Add a signed bias to each channel, clamped to `0..=255`.
pub fn hue_shift(image: &mut Image, red: i32, green: i32, blue: i32) {
    let add = |v: u8, bias: i32| i32::from(v).saturating_add(bias).clamp(0, 255) as u8;
    for_each_pixel(image, |px| {
        px.b = add(px.b, blue);
        px.g = add(px.g, green);
        px.r = add(px.r, red);
    });
}

/// Subtract a per-channel amount, stopping at zero.
pub fn dim(image: &mut Image, red: u8, green: u8, blue: u8) {
    for_each_pixel(image, |px| {
        px.b = px.b.saturating_sub(blue);
        px.g = px.g.saturating_sub(green);
        px.r = px.r.saturating_sub(red);
    });
}

/// Multiply each channel by a factor.
///
/// With `strict` the product is clamped to `0..=255`. Without it the
/// integer part wraps modulo 256, which gives the banded "overflow" look.
pub fn scale(image: &mut Image, red: f32, green: f32, blue: f32, strict: bool) {
    let mul = |v: u8, k: f32| {
        let x = f64::from(v) * f64::from(k);
        if strict {
            x.clamp(0.0, 255.0) as u8
        } else {
            (x as i64) as u8
        }
    };
    for_each_pixel(image, |px| {
        px.b = mul(px.b, blue);
        px.g = mul(px.g, green);
        px.r = mul(px.r, red);
    });
}
