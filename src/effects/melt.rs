use crate::error::BmpError;
use crate::geometry::{rotate_anticlockwise, rotate_clockwise};
use crate::image::Image;
use crate::pixel::intensity;

/// Pixel-sort every column by summed channel intensity.
///
/// The image is turned a quarter so the columns become contiguous rows,
/// sorted, then turned back. A positive `start` turns anticlockwise first;
/// a negative one turns clockwise, which sorts towards the opposite edge.
/// The first `|start| - 1` pixels of each rotated row stay in place; if that
/// exceeds the image height only the first pixel is kept.
pub fn melt(image: &Image, start: i32) -> Result<Image, BmpError> {
    if start == 0 {
        return Err(BmpError::InvalidMeltOffset);
    }

    let mut skip = start.unsigned_abs() as usize - 1;
    if skip > image.height() {
        skip = 1;
    }

    let mut rotated = if start > 0 {
        rotate_anticlockwise(image)?
    } else {
        rotate_clockwise(image)?
    };

    for row in rotated.rows_mut() {
        if let Some(tail) = row.get_mut(skip..) {
            tail.sort_by_key(|p| intensity(*p));
        }
    }

    if start > 0 {
        rotate_clockwise(&rotated)
    } else {
        rotate_anticlockwise(&rotated)
    }
}
