//! BMP file header and BITMAPINFOHEADER parsing and serialization.

use core::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::error::BmpError;
use crate::pixel::BYTES_PER_PIXEL;

/// Size of the `BITMAPFILEHEADER` on disk.
pub const FILE_HEADER_SIZE: u32 = 14;
/// Size of the `BITMAPINFOHEADER` on disk.
pub const INFO_HEADER_SIZE: u32 = 40;
/// Offset of the first pixel byte when no extra header space is present.
pub const STANDARD_PIXEL_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// Highest compression code defined by the BMP family (BI_RGB .. BI_CMYKRLE4).
pub const MAX_COMPRESSION_CODE: u32 = 13;
/// Uncompressed pixel data.
pub const BI_RGB: u32 = 0;

/// The only bit depth the loader and writer handle.
pub const SUPPORTED_BITS_PER_PIXEL: u16 = 24;

/// Default resolution written by [`crate::bmp::encode`] (72 DPI).
pub(crate) const DEFAULT_PIXELS_PER_METER: i32 = 2835;

/// Magic tags of the BMP family. Only `BM` (Windows) is supported.
const KNOWN_MAGIC: [[u8; 2]; 6] = [*b"BM", *b"BA", *b"CI", *b"CP", *b"IC", *b"PT"];
const WINDOWS_MAGIC: [u8; 2] = *b"BM";

// ── Field reader ────────────────────────────────────────────────────

/// Little-endian field reader. A short read becomes
/// [`BmpError::TruncatedHeader`] naming the field.
struct FieldReader<'r, R: ?Sized> {
    inner: &'r mut R,
}

impl<'r, R: Read + ?Sized> FieldReader<'r, R> {
    fn new(inner: &'r mut R) -> Self {
        Self { inner }
    }

    fn bytes<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], BmpError> {
        let mut buf = [0u8; N];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => Ok(buf),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(BmpError::TruncatedHeader { field })
            }
            Err(e) => Err(BmpError::Io(e)),
        }
    }

    fn u16(&mut self, field: &'static str) -> Result<u16, BmpError> {
        self.bytes::<2>(field).map(u16::from_le_bytes)
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, BmpError> {
        self.bytes::<4>(field).map(u32::from_le_bytes)
    }

    fn i32(&mut self, field: &'static str) -> Result<i32, BmpError> {
        self.bytes::<4>(field).map(i32::from_le_bytes)
    }
}

// ── File header ─────────────────────────────────────────────────────

/// The 14-byte `BITMAPFILEHEADER`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileHeader {
    /// Magic tag, `b"BM"` for every file this crate accepts.
    pub id: [u8; 2],
    /// Total file size in bytes, as declared.
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// Byte offset of the first pixel row.
    pub pixel_array_offset: u32,
}

impl FileHeader {
    /// Parse the file header from the current position of `reader`.
    ///
    /// Unknown magic is [`BmpError::UnrecognizedFormat`]; the OS/2 members of
    /// the family (`BA`, `CI`, `CP`, `IC`, `PT`) are
    /// [`BmpError::UnsupportedVariant`].
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self, BmpError> {
        let mut fields = FieldReader::new(reader);

        let id = fields.bytes::<2>("ID")?;
        if !KNOWN_MAGIC.contains(&id) {
            return Err(BmpError::UnrecognizedFormat(id));
        }
        if id != WINDOWS_MAGIC {
            return Err(BmpError::UnsupportedVariant(id));
        }

        let file_size = fields.u32("Bitmap Size")?;
        let reserved1 = fields.u16("Reserved1")?;
        let reserved2 = fields.u16("Reserved2")?;
        let pixel_array_offset = fields.u32("Offset")?;

        Ok(Self {
            id,
            file_size,
            reserved1,
            reserved2,
            pixel_array_offset,
        })
    }

    /// Serialize in on-disk order (14 bytes).
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.id)?;
        w.write_all(&self.file_size.to_le_bytes())?;
        w.write_all(&self.reserved1.to_le_bytes())?;
        w.write_all(&self.reserved2.to_le_bytes())?;
        w.write_all(&self.pixel_array_offset.to_le_bytes())
    }
}

// ── Info header ─────────────────────────────────────────────────────

/// The 40-byte `BITMAPINFOHEADER`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Positive for bottom-up rows, negative for top-down.
    pub height: i32,
    pub colour_planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    /// Size of the raw pixel data; may be 0 for BI_RGB.
    pub image_size: u32,
    pub horizontal_resolution: i32,
    pub vertical_resolution: i32,
    pub colours_in_palette: u32,
    /// 0 if all colours are important.
    pub important_colours: u32,
}

impl InfoHeader {
    /// Seek to offset 14 and parse the DIB header.
    pub fn read_from<R: Read + Seek + ?Sized>(reader: &mut R) -> Result<Self, BmpError> {
        reader.seek(SeekFrom::Start(u64::from(FILE_HEADER_SIZE)))?;
        let mut fields = FieldReader::new(reader);

        let header_size = fields.u32("Header size")?;
        if header_size < INFO_HEADER_SIZE {
            return Err(BmpError::InvalidHeader(format!(
                "info header size {header_size} is smaller than BITMAPINFOHEADER ({INFO_HEADER_SIZE})"
            )));
        }

        let width = fields.i32("Bitmap Width")?;
        if width < 0 {
            return Err(BmpError::InvalidWidth(width));
        }

        let height = fields.i32("Bitmap Height")?;

        let colour_planes = fields.u16("Colour planes")?;
        if colour_planes != 1 {
            return Err(BmpError::ColourPlanes(colour_planes));
        }

        let bits_per_pixel = fields.u16("Bits per pixel")?;

        let compression = fields.u32("Compression")?;
        if compression > MAX_COMPRESSION_CODE {
            return Err(BmpError::InvalidCompression(compression));
        }
        if compression != BI_RGB {
            return Err(BmpError::UnsupportedCompression(compression));
        }

        if bits_per_pixel != SUPPORTED_BITS_PER_PIXEL {
            return Err(BmpError::UnsupportedBitDepth(bits_per_pixel));
        }

        let image_size = fields.u32("Image size")?;
        let horizontal_resolution = fields.i32("Horizontal resolution")?;
        let vertical_resolution = fields.i32("Vertical resolution")?;
        let colours_in_palette = fields.u32("Colours in palette")?;
        let important_colours = fields.u32("Important colours")?;

        if width == 0 || height == 0 {
            return Err(BmpError::InvalidHeader(format!(
                "bitmap dimensions must be non-zero, got {width}x{height}"
            )));
        }

        Ok(Self {
            header_size,
            width,
            height,
            colour_planes,
            bits_per_pixel,
            compression,
            image_size,
            horizontal_resolution,
            vertical_resolution,
            colours_in_palette,
            important_colours,
        })
    }

    /// Serialize the 40 BITMAPINFOHEADER bytes in on-disk order.
    ///
    /// `header_size` is written as stored; any bytes of a larger header are
    /// the caller's gap to fill.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.header_size.to_le_bytes())?;
        w.write_all(&self.width.to_le_bytes())?;
        w.write_all(&self.height.to_le_bytes())?;
        w.write_all(&self.colour_planes.to_le_bytes())?;
        w.write_all(&self.bits_per_pixel.to_le_bytes())?;
        w.write_all(&self.compression.to_le_bytes())?;
        w.write_all(&self.image_size.to_le_bytes())?;
        w.write_all(&self.horizontal_resolution.to_le_bytes())?;
        w.write_all(&self.vertical_resolution.to_le_bytes())?;
        w.write_all(&self.colours_in_palette.to_le_bytes())?;
        w.write_all(&self.important_colours.to_le_bytes())
    }

    /// Width in pixels.
    pub fn pixel_width(&self) -> u64 {
        u64::from(self.width.unsigned_abs())
    }

    /// Number of stored rows, `|height|`.
    pub fn pixel_height(&self) -> u64 {
        u64::from(self.height.unsigned_abs())
    }

    /// Whether rows are stored top row first (negative height).
    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }

    /// DWORD padding bytes after each row.
    pub fn row_padding(&self) -> u64 {
        row_padding(self.bits_per_pixel, self.pixel_width())
    }

    /// Unpadded bytes per row.
    pub fn row_bytes(&self) -> u64 {
        u64::from(self.bits_per_pixel / 8) * self.pixel_width()
    }
}

/// Padding needed to round a row of `width` pixels up to a multiple of 4 bytes.
///
/// `(4 - (bits_per_pixel / 8 * width) mod 4) mod 4`
pub fn row_padding(bits_per_pixel: u16, width: u64) -> u64 {
    let row = u64::from(bits_per_pixel / 8).wrapping_mul(width);
    (4 - row % 4) % 4
}

/// Padded row stride of a 24-bit row of `width` pixels.
pub(crate) fn stride_24(width: usize) -> Option<usize> {
    width
        .checked_mul(BYTES_PER_PIXEL)
        .and_then(|r| r.checked_add(3))
        .map(|r| r & !3)
}

// ── Header dump ─────────────────────────────────────────────────────

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<25} {:<15} {}", "BMP Header", "Data", "Hex")?;
        writeln!(f, "{}", "-".repeat(50))?;
        let id = u16::from_le_bytes(self.id);
        writeln!(
            f,
            "{:<25} {:<15} {:X}",
            "ID",
            String::from_utf8_lossy(&self.id),
            id
        )?;
        writeln!(f, "{:<25} {:<15} {:X}", "Size", self.file_size, self.file_size)?;
        write!(
            f,
            "{:<25} {:<15} {:X}",
            "Offset", self.pixel_array_offset, self.pixel_array_offset
        )
    }
}

impl fmt::Display for InfoHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<25} {:<15} {}", "DIB Header", "Data", "Hex")?;
        writeln!(f, "{}", "-".repeat(50))?;
        let rows: [(&str, i64); 11] = [
            ("Header Size", self.header_size.into()),
            ("Bitmap Width", self.width.into()),
            ("Bitmap Height", self.height.into()),
            ("Num. Colour Planes", self.colour_planes.into()),
            ("Bits Per Pixel", self.bits_per_pixel.into()),
            ("Compression", self.compression.into()),
            ("Image Size", self.image_size.into()),
            ("Horizontal Resolution", self.horizontal_resolution.into()),
            ("Vertical Resolution", self.vertical_resolution.into()),
            ("Colours In Palette", self.colours_in_palette.into()),
            ("Important Colours", self.important_colours.into()),
        ];
        for (i, (name, value)) in rows.iter().enumerate() {
            // Hex column shows the raw 32-bit pattern, like a hexdump would.
            write!(f, "{name:<25} {value:<15} {:X}", *value as u32)?;
            if i + 1 < rows.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn standard_headers() -> Vec<u8> {
        let mut out = Vec::new();
        FileHeader {
            id: *b"BM",
            file_size: 102,
            reserved1: 0,
            reserved2: 0,
            pixel_array_offset: 54,
        }
        .write_to(&mut out)
        .unwrap();
        InfoHeader {
            header_size: 40,
            width: 4,
            height: 4,
            colour_planes: 1,
            bits_per_pixel: 24,
            compression: 0,
            image_size: 48,
            horizontal_resolution: 2835,
            vertical_resolution: 2835,
            colours_in_palette: 0,
            important_colours: 0,
        }
        .write_to(&mut out)
        .unwrap();
        out
    }

    fn patch(bytes: &mut [u8], at: usize, value: &[u8]) {
        bytes[at..at + value.len()].copy_from_slice(value);
    }

    #[test]
    fn headers_are_54_bytes() {
        assert_eq!(standard_headers().len(), 54);
    }

    #[test]
    fn parse_standard() {
        let bytes = standard_headers();
        let mut cur = Cursor::new(&bytes[..]);
        let fh = FileHeader::read_from(&mut cur).unwrap();
        assert_eq!(fh.id, *b"BM");
        assert_eq!(fh.file_size, 102);
        assert_eq!(fh.pixel_array_offset, 54);
        let ih = InfoHeader::read_from(&mut cur).unwrap();
        assert_eq!((ih.width, ih.height), (4, 4));
        assert_eq!(ih.row_padding(), 0);
        assert_eq!(ih.row_bytes(), 12);
    }

    #[test]
    fn unknown_magic() {
        let mut bytes = standard_headers();
        patch(&mut bytes, 0, b"PN");
        let err = FileHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, BmpError::UnrecognizedFormat(m) if m == *b"PN"));
    }

    #[test]
    fn os2_variants_unsupported() {
        for magic in [b"BA", b"CI", b"CP", b"IC", b"PT"] {
            let mut bytes = standard_headers();
            patch(&mut bytes, 0, magic);
            let err = FileHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap_err();
            assert!(matches!(err, BmpError::UnsupportedVariant(_)), "{magic:?}");
        }
    }

    #[test]
    fn short_file_header_names_field() {
        let bytes = &standard_headers()[..9];
        let err = FileHeader::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::TruncatedHeader {
                field: "Reserved2"
            }
        ));
    }

    #[test]
    fn short_info_header_names_field() {
        let bytes = &standard_headers()[..40];
        let err = InfoHeader::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            BmpError::TruncatedHeader {
                field: "Image size"
            }
        ));
    }

    #[test]
    fn negative_width_rejected() {
        let mut bytes = standard_headers();
        patch(&mut bytes, 18, &(-4i32).to_le_bytes());
        let err = InfoHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, BmpError::InvalidWidth(-4)));
    }

    #[test]
    fn negative_height_accepted() {
        let mut bytes = standard_headers();
        patch(&mut bytes, 22, &(-4i32).to_le_bytes());
        let ih = InfoHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap();
        assert!(ih.is_top_down());
        assert_eq!(ih.pixel_height(), 4);
    }

    #[test]
    fn colour_planes_must_be_one() {
        let mut bytes = standard_headers();
        patch(&mut bytes, 26, &2u16.to_le_bytes());
        let err = InfoHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, BmpError::ColourPlanes(2)));
    }

    #[test]
    fn compression_codes() {
        let mut bytes = standard_headers();
        patch(&mut bytes, 30, &14u32.to_le_bytes());
        let err = InfoHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, BmpError::InvalidCompression(14)));

        patch(&mut bytes, 30, &1u32.to_le_bytes());
        let err = InfoHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, BmpError::UnsupportedCompression(1)));
    }

    #[test]
    fn only_24_bit() {
        let mut bytes = standard_headers();
        patch(&mut bytes, 28, &32u16.to_le_bytes());
        let err = InfoHeader::read_from(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, BmpError::UnsupportedBitDepth(32)));
    }

    #[test]
    fn padding_formula() {
        assert_eq!(row_padding(24, 1), 1);
        assert_eq!(row_padding(24, 2), 2);
        assert_eq!(row_padding(24, 3), 3);
        assert_eq!(row_padding(24, 4), 0);
        assert_eq!(row_padding(24, 5), 1);
        assert_eq!(stride_24(5), Some(16));
        assert_eq!(stride_24(4), Some(12));
    }

    #[test]
    fn write_round_trips_bytes() {
        let bytes = standard_headers();
        let mut cur = Cursor::new(&bytes[..]);
        let fh = FileHeader::read_from(&mut cur).unwrap();
        let ih = InfoHeader::read_from(&mut cur).unwrap();
        let mut out = Vec::new();
        fh.write_to(&mut out).unwrap();
        ih.write_to(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn dump_lists_fields() {
        let bytes = standard_headers();
        let mut cur = Cursor::new(&bytes[..]);
        let fh = FileHeader::read_from(&mut cur).unwrap();
        let ih = InfoHeader::read_from(&mut cur).unwrap();
        let text = format!("{fh}\n{ih}");
        assert!(text.contains("Offset"));
        assert!(text.contains("Bits Per Pixel"));
        assert!(text.lines().any(|l| l.starts_with("Size") && l.contains("102")));
    }
}
