//! Flips, transposition and quarter-turn rotations.
//!
//! `flip` and `reverse` work in place. The transposing functions return a
//! new [`Image`]; [`rotate`] swaps the result into its argument.

use crate::error::BmpError;
use crate::image::Image;
use crate::pixel::Pixel;

/// Side of the square tiles used by [`transpose`].
pub const TILE: usize = 16;

/// Mirror vertically: swap row `i` with row `height - 1 - i`.
pub fn flip(image: &mut Image) {
    let (width, height) = image.dimensions();
    let pixels = image.pixels_mut();
    for top in 0..height / 2 {
        let bottom = height - 1 - top;
        let (upper, lower) = pixels.split_at_mut(bottom * width);
        upper[top * width..(top + 1) * width].swap_with_slice(&mut lower[..width]);
    }
}

/// Mirror horizontally: reverse every row.
pub fn reverse(image: &mut Image) {
    for row in image.rows_mut() {
        row.reverse();
    }
}

/// Swap rows and columns: `out(y, x) = in(x, y)`.
///
/// Walks the source in 16x16 tiles. Each tile is gathered transposed into a
/// 256-pixel staging buffer, then written out as contiguous runs of the
/// destination rows, so both sides are touched a cache line at a time.
pub fn transpose(image: &Image) -> Result<Image, BmpError> {
    let (width, height) = image.dimensions();
    let mut out = Image::new(height, width)?;
    let src = image.pixels();
    let dst = out.pixels_mut();
    let mut tile = [Pixel::default(); TILE * TILE];

    for ty in (0..height).step_by(TILE) {
        let th = TILE.min(height - ty);
        for tx in (0..width).step_by(TILE) {
            let tw = TILE.min(width - tx);

            for dy in 0..th {
                let row = &src[(ty + dy) * width + tx..][..tw];
                for (dx, px) in row.iter().enumerate() {
                    tile[dx * TILE + dy] = *px;
                }
            }

            // Destination row `tx + dx` has width `height`.
            for dx in 0..tw {
                dst[(tx + dx) * height + ty..][..th].copy_from_slice(&tile[dx * TILE..][..th]);
            }
        }
    }

    Ok(out)
}

/// Quarter turn clockwise: `flip(transpose(image))`.
pub fn rotate_clockwise(image: &Image) -> Result<Image, BmpError> {
    let mut out = transpose(image)?;
    flip(&mut out);
    Ok(out)
}

/// Quarter turn anticlockwise: `reverse(transpose(image))`.
pub fn rotate_anticlockwise(image: &Image) -> Result<Image, BmpError> {
    let mut out = transpose(image)?;
    reverse(&mut out);
    Ok(out)
}

/// Rotate clockwise by `turns` quarter turns. Negative counts turn
/// anticlockwise; the count is reduced modulo 4 first.
///
/// A half turn is done in place. Odd counts replace `image` with a newly
/// allocated one of swapped dimensions; on allocation failure `image` is
/// left as it was.
pub fn rotate(image: &mut Image, turns: i64) -> Result<(), BmpError> {
    match turns.rem_euclid(4) {
        0 => {}
        1 => *image = rotate_clockwise(image)?,
        2 => {
            flip(image);
            reverse(image);
        }
        _ => *image = rotate_anticlockwise(image)?,
    }
    Ok(())
}

/// Whether rotating by `turns` quarter turns exchanges width and height.
pub fn rotation_swaps_axes(turns: i64) -> bool {
    turns.rem_euclid(4) % 2 == 1
}
