//! Pixel loader: streams padded 24-bit rows into an [`Image`].

use std::io::{self, Read, Seek, SeekFrom};

use enough::Stop;
use rgb::ComponentBytes as _;

use super::header::{FileHeader, InfoHeader};
use crate::error::BmpError;
use crate::image::Image;

// ── Permissiveness ──────────────────────────────────────────────────

/// Controls how strictly the loader treats a file whose pixel rows do not
/// end exactly at the declared file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permissiveness {
    /// Reject the file: bytes between the last row and the declared end
    /// usually mean a truncated or tampered payload.
    #[default]
    Strict,

    /// Log a warning and keep the decoded pixels.
    Standard,
}

/// Read `|height|` rows of `width` pixels starting at `pixel_array_offset`.
///
/// Rows are kept in file order. Row padding is read into a scratch buffer
/// and never inspected, so the only seek is the one to the pixel array and a
/// buffered `reader` keeps its buffer. `reader` is left positioned after the
/// last row.
pub fn load<R: Read + Seek + ?Sized>(
    reader: &mut R,
    file_header: &FileHeader,
    info_header: &InfoHeader,
    permissiveness: Permissiveness,
    stop: &dyn Stop,
) -> Result<Image, BmpError> {
    let width = usize::try_from(info_header.pixel_width()).map_err(|_| too_large(info_header))?;
    let height = usize::try_from(info_header.pixel_height()).map_err(|_| too_large(info_header))?;
    let padding = info_header.row_padding() as usize;

    let mut image = Image::new(width, height)?;
    stop.check()?;

    reader.seek(SeekFrom::Start(u64::from(file_header.pixel_array_offset)))?;

    let mut pad = [0u8; 3];
    for y in 0..height {
        if y % 16 == 0 {
            stop.check()?;
        }
        read_row(reader, image.row_mut(y).as_bytes_mut(), y)?;
        read_row(reader, &mut pad[..padding], y)?;
    }

    let end = reader.stream_position()?;
    if end != u64::from(file_header.file_size) {
        match permissiveness {
            Permissiveness::Strict => {
                return Err(BmpError::TrailingData {
                    end,
                    declared: file_header.file_size,
                });
            }
            Permissiveness::Standard => {
                log::warn!(
                    "pixel data ends at byte {end} but the header declares {} bytes; \
                     file may be truncated or carry extra data",
                    file_header.file_size
                );
            }
        }
    }

    log::debug!("loaded {width}x{height} pixels, row padding {padding}");
    Ok(image)
}

/// `read_exact`, with a short read reported against row `y`.
fn read_row<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8], y: usize) -> Result<(), BmpError> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(BmpError::PixelRead { row: y }),
        Err(e) => Err(BmpError::Io(e)),
    }
}

fn too_large(info_header: &InfoHeader) -> BmpError {
    BmpError::DimensionsTooLarge {
        width: info_header.width.unsigned_abs() as usize,
        height: info_header.height.unsigned_abs() as usize,
    }
}
