//! BMP writer: uncompressed 24-bit rows with recomputed DWORD padding.

use std::io::Write;

use enough::Stop;
use rgb::ComponentBytes as _;

use super::header::{
    BI_RGB, DEFAULT_PIXELS_PER_METER, FileHeader, INFO_HEADER_SIZE, InfoHeader,
    STANDARD_PIXEL_OFFSET, SUPPORTED_BITS_PER_PIXEL, row_padding, stride_24,
};
use crate::error::BmpError;
use crate::image::Image;

const ZEROS: [u8; 64] = [0; 64];

/// Serialize `image` under the given headers.
///
/// Writes the file header, the 40 BITMAPINFOHEADER bytes, zeros up to
/// `pixel_array_offset`, then every row followed by freshly computed zero
/// padding. Padding never comes from the source file, so the output is
/// self-consistent even if the input carried garbage there.
///
/// Extensions of larger DIB headers (V4/V5 masks, colour space) are not
/// kept: `header_size` is always written as 40 and the rest of the gap is
/// zeros.
///
/// The headers must describe `image`: width and `|height|` must match its
/// dimensions ([`BmpError::DimensionMismatch`]), and `file_size` must equal
/// `pixel_array_offset` plus the padded rows ([`BmpError::InvalidHeader`]).
/// Nothing is written when either check fails.
pub fn write_to<W: Write + ?Sized>(
    w: &mut W,
    file_header: &FileHeader,
    info_header: &InfoHeader,
    image: &Image,
    stop: &dyn Stop,
) -> Result<(), BmpError> {
    check_headers(file_header, info_header, image)?;

    file_header.write_to(w)?;
    InfoHeader {
        header_size: INFO_HEADER_SIZE,
        ..*info_header
    }
    .write_to(w)?;

    let gap = file_header
        .pixel_array_offset
        .saturating_sub(STANDARD_PIXEL_OFFSET) as usize;
    write_zeros(w, gap)?;

    let pad = row_padding(SUPPORTED_BITS_PER_PIXEL, image.width() as u64) as usize;
    for (y, row) in image.rows().enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        w.write_all(row.as_bytes())?;
        w.write_all(&ZEROS[..pad])?;
    }
    w.flush()?;
    Ok(())
}

fn check_headers(
    file_header: &FileHeader,
    info_header: &InfoHeader,
    image: &Image,
) -> Result<(), BmpError> {
    let (width, height) = image.dimensions();
    if info_header.pixel_width() != width as u64 || info_header.pixel_height() != height as u64 {
        return Err(BmpError::DimensionMismatch {
            expected_width: info_header.width.unsigned_abs() as usize,
            expected_height: info_header.height.unsigned_abs() as usize,
            actual_width: width,
            actual_height: height,
        });
    }

    let expected = stride_24(width)
        .and_then(|stride| stride.checked_mul(height))
        .and_then(|n| u64::try_from(n).ok())
        .and_then(|n| n.checked_add(u64::from(file_header.pixel_array_offset)));
    if file_header.pixel_array_offset < STANDARD_PIXEL_OFFSET
        || expected != Some(u64::from(file_header.file_size))
    {
        return Err(BmpError::InvalidHeader(format!(
            "file size {} does not match offset {} plus {width}x{height} rows",
            file_header.file_size, file_header.pixel_array_offset
        )));
    }
    Ok(())
}

/// Encode a bare [`Image`] with canonical headers: `BM`, offset 54,
/// 40-byte info header, positive height, 2835 px/m (72 DPI).
pub fn encode(image: &Image, stop: &dyn Stop) -> Result<Vec<u8>, BmpError> {
    let (file_header, info_header) = canonical_headers(image)?;
    stop.check()?;
    let mut out = Vec::new();
    out.try_reserve_exact(file_header.file_size as usize)
        .map_err(|_| BmpError::Allocation {
            bytes: file_header.file_size as usize,
        })?;
    write_to(&mut out, &file_header, &info_header, image, stop)?;
    Ok(out)
}

/// Headers describing `image` as a standard-layout bottom-up 24-bit BMP.
pub fn canonical_headers(image: &Image) -> Result<(FileHeader, InfoHeader), BmpError> {
    let (width, height) = image.dimensions();
    let too_large = || BmpError::DimensionsTooLarge { width, height };

    let pixel_data_size = stride_24(width)
        .and_then(|stride| stride.checked_mul(height))
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(too_large)?;
    let file_size = pixel_data_size
        .checked_add(STANDARD_PIXEL_OFFSET)
        .ok_or_else(too_large)?;

    let file_header = FileHeader {
        id: *b"BM",
        file_size,
        reserved1: 0,
        reserved2: 0,
        pixel_array_offset: STANDARD_PIXEL_OFFSET,
    };
    let info_header = InfoHeader {
        header_size: INFO_HEADER_SIZE,
        width: i32::try_from(width).map_err(|_| too_large())?,
        height: i32::try_from(height).map_err(|_| too_large())?,
        colour_planes: 1,
        bits_per_pixel: SUPPORTED_BITS_PER_PIXEL,
        compression: BI_RGB,
        image_size: pixel_data_size,
        horizontal_resolution: DEFAULT_PIXELS_PER_METER,
        vertical_resolution: DEFAULT_PIXELS_PER_METER,
        colours_in_palette: 0,
        important_colours: 0,
    };
    Ok((file_header, info_header))
}

fn write_zeros<W: Write + ?Sized>(w: &mut W, mut n: usize) -> std::io::Result<()> {
    while n > 0 {
        let chunk = n.min(ZEROS.len());
        w.write_all(&ZEROS[..chunk])?;
        n -= chunk;
    }
    Ok(())
}
