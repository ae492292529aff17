//! Header-versus-file integrity checks, run before any pixel allocation.

use core::cmp::Ordering;

use super::header::{FILE_HEADER_SIZE, FileHeader, InfoHeader, STANDARD_PIXEL_OFFSET};
use crate::error::BmpError;
use crate::limits::Limits;
use crate::pixel::BYTES_PER_PIXEL;

/// Cross-check the parsed headers against the real file size and `limits`.
///
/// 1. The declared `file_size` must equal `actual_file_size` exactly.
/// 2. The pixel array, `(width * 3 + padding) * |height|` bytes starting at
///    `pixel_array_offset`, must fit inside the file.
/// 3. The offset must not point into the headers.
/// 4. Dimensions and the pixel buffer size must be within `limits`.
pub fn verify(
    file_header: &FileHeader,
    info_header: &InfoHeader,
    actual_file_size: u64,
    limits: &Limits,
) -> Result<(), BmpError> {
    let declared = u64::from(file_header.file_size);
    match declared.cmp(&actual_file_size) {
        Ordering::Greater => {
            return Err(BmpError::FileTooSmall {
                missing: declared - actual_file_size,
            });
        }
        Ordering::Less => {
            return Err(BmpError::PossibleCorruptionOrHiddenData {
                excess: actual_file_size - declared,
            });
        }
        Ordering::Equal => {}
    }

    let offset = file_header.pixel_array_offset;
    let offset_invalid = || BmpError::PixelOffsetInvalid {
        offset,
        file_size: actual_file_size,
    };

    let headers_end = u64::from(FILE_HEADER_SIZE) + u64::from(info_header.header_size);
    if offset < STANDARD_PIXEL_OFFSET || u64::from(offset) < headers_end {
        return Err(offset_invalid());
    }

    let pixel_bytes = min_required_bytes(info_header).ok_or_else(offset_invalid)?;
    let end = u64::from(offset)
        .checked_add(pixel_bytes)
        .ok_or_else(offset_invalid)?;
    if end > actual_file_size {
        return Err(offset_invalid());
    }

    let width = info_header.pixel_width();
    let height = info_header.pixel_height();
    limits.check(width, height)?;
    limits.check_memory(
        width
            .saturating_mul(height)
            .saturating_mul(BYTES_PER_PIXEL as u64),
    )?;

    Ok(())
}

/// Bytes of padded pixel rows the headers promise, or `None` on overflow.
pub fn min_required_bytes(info_header: &InfoHeader) -> Option<u64> {
    info_header
        .pixel_width()
        .checked_mul(BYTES_PER_PIXEL as u64)?
        .checked_add(info_header.row_padding())?
        .checked_mul(info_header.pixel_height())
}
