use crate::error::BmpError;
use crate::image::Image;

/// Chromatic offset: red is pulled from `offset` pixels to the right, blue
/// from `offset` pixels to the left. Channels whose source falls outside
/// the row keep their value.
///
/// Requires `0 < offset < width`; otherwise returns
/// [`BmpError::OffsetOutOfBounds`] without touching the image.
pub fn glitch(image: &mut Image, offset: usize) -> Result<(), BmpError> {
    let width = image.width();
    if offset == 0 || offset >= width {
        return Err(BmpError::OffsetOutOfBounds { offset, width });
    }

    let mut scratch = Vec::new();
    scratch
        .try_reserve_exact(width)
        .map_err(|_| BmpError::Allocation {
            bytes: width * crate::pixel::BYTES_PER_PIXEL,
        })?;

    for row in image.rows_mut() {
        scratch.clear();
        scratch.extend_from_slice(row);
        for (x, px) in row.iter_mut().enumerate() {
            if let Some(src) = scratch.get(x + offset) {
                px.r = src.r;
            }
            if let Some(src) = x.checked_sub(offset).and_then(|i| scratch.get(i)) {
                px.b = src.b;
            }
        }
    }
    Ok(())
}
