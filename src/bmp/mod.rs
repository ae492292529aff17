//! The BMP container: header parsing, integrity checks, row loading and
//! writing, and the [`Bmp`] aggregate that ties them to an [`Image`].

mod decode;
mod encode;
mod header;
mod validate;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use enough::{Stop, Unstoppable};

pub use decode::{Permissiveness, load};
pub use encode::{canonical_headers, encode, write_to};
pub use header::{
    BI_RGB, FILE_HEADER_SIZE, FileHeader, INFO_HEADER_SIZE, InfoHeader, MAX_COMPRESSION_CODE,
    STANDARD_PIXEL_OFFSET, SUPPORTED_BITS_PER_PIXEL, row_padding,
};
pub use validate::{min_required_bytes, verify};

use crate::error::BmpError;
use crate::image::Image;
use crate::limits::Limits;
use crate::operation::Operation;

// ── Probing ─────────────────────────────────────────────────────────

/// Header summary of a BMP, obtained without reading pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct BmpInfo {
    pub width: u32,
    /// Row count, always positive.
    pub height: u32,
    /// Rows stored top row first.
    pub top_down: bool,
    pub file_header: FileHeader,
    pub info_header: InfoHeader,
}

impl BmpInfo {
    fn new(file_header: FileHeader, info_header: InfoHeader) -> Self {
        Self {
            width: info_header.width.unsigned_abs(),
            height: info_header.height.unsigned_abs(),
            top_down: info_header.is_top_down(),
            file_header,
            info_header,
        }
    }
}

/// Parse and validate the headers of the file at `path`.
pub fn probe(path: impl AsRef<Path>) -> Result<BmpInfo, BmpError> {
    let mut reader = BufReader::new(File::open(path)?);
    probe_reader(&mut reader, &Limits::default())
}

/// Parse and validate headers from any seekable source. No pixel memory is
/// allocated.
pub fn probe_reader<R: Read + Seek + ?Sized>(
    reader: &mut R,
    limits: &Limits,
) -> Result<BmpInfo, BmpError> {
    let (file_header, info_header) = read_headers(reader, limits)?;
    Ok(BmpInfo::new(file_header, info_header))
}

fn read_headers<R: Read + Seek + ?Sized>(
    reader: &mut R,
    limits: &Limits,
) -> Result<(FileHeader, InfoHeader), BmpError> {
    let actual_file_size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    let file_header = FileHeader::read_from(reader)?;
    let info_header = InfoHeader::read_from(reader)?;
    verify(&file_header, &info_header, actual_file_size, limits)?;
    Ok((file_header, info_header))
}

// ── Open request ────────────────────────────────────────────────────

/// Builder for opening a BMP file with non-default settings.
///
/// ```no_run
/// use zenbmpfx::{Limits, OpenRequest, Permissiveness, Unstoppable};
///
/// let limits = Limits {
///     max_pixels: Some(64 * 1024 * 1024),
///     ..Default::default()
/// };
/// let bmp = OpenRequest::new("in.bmp")
///     .with_limits(&limits)
///     .with_permissiveness(Permissiveness::Standard)
///     .open(Unstoppable)?;
/// # Ok::<(), zenbmpfx::BmpError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct OpenRequest<'a> {
    path: &'a Path,
    limits: Option<&'a Limits>,
    permissiveness: Permissiveness,
}

impl<'a> OpenRequest<'a> {
    pub fn new<P: AsRef<Path> + ?Sized>(path: &'a P) -> Self {
        Self {
            path: path.as_ref(),
            limits: None,
            permissiveness: Permissiveness::default(),
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_permissiveness(mut self, permissiveness: Permissiveness) -> Self {
        self.permissiveness = permissiveness;
        self
    }

    /// Open, validate and load the file.
    pub fn open(self, stop: impl Stop) -> Result<Bmp, BmpError> {
        log::debug!("opening {}", self.path.display());
        let reader = BufReader::new(File::open(self.path)?);
        let limits = self.limits.cloned().unwrap_or_default();
        Bmp::read(reader, limits, self.permissiveness, &stop)
    }
}

// ── Bmp ─────────────────────────────────────────────────────────────

/// An open BMP: its source handle, both headers and the decoded pixels.
///
/// The `Bmp` is the sole owner of its [`Image`]. Operations that produce a
/// new buffer swap it in and drop the old one, and the headers are kept in
/// step so [`Bmp::write`] always emits a consistent file.
#[derive(Debug)]
pub struct Bmp<R = BufReader<File>> {
    source: R,
    file_header: FileHeader,
    info_header: InfoHeader,
    image: Image,
    limits: Limits,
    permissiveness: Permissiveness,
}

impl Bmp {
    /// Open `path` with default limits and [`Permissiveness::Strict`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BmpError> {
        OpenRequest::new(path.as_ref()).open(Unstoppable)
    }
}

impl<R: Read + Seek> Bmp<R> {
    /// Load from any seekable source with default settings.
    pub fn from_reader(reader: R) -> Result<Self, BmpError> {
        Self::read(
            reader,
            Limits::default(),
            Permissiveness::default(),
            &Unstoppable,
        )
    }

    /// Load from any seekable source.
    pub fn from_reader_with(
        reader: R,
        limits: &Limits,
        permissiveness: Permissiveness,
        stop: impl Stop,
    ) -> Result<Self, BmpError> {
        Self::read(reader, limits.clone(), permissiveness, &stop)
    }

    fn read(
        mut source: R,
        limits: Limits,
        permissiveness: Permissiveness,
        stop: &dyn Stop,
    ) -> Result<Self, BmpError> {
        let (file_header, info_header) = read_headers(&mut source, &limits)?;
        stop.check()?;
        let image = load(
            &mut source,
            &file_header,
            &info_header,
            permissiveness,
            stop,
        )?;
        Ok(Self {
            source,
            file_header,
            info_header,
            image,
            limits,
            permissiveness,
        })
    }
}

impl<R> Bmp<R> {
    /// The file header as read, or as resynchronized after the last
    /// dimension change. Writes recompute the size fields from the image.
    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    /// The decoded pixels, rows in file order.
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// The source this BMP was read from.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Swap in a new image, resynchronizing the headers, and return the old one.
    pub fn replace_image(&mut self, image: Image) -> Result<Image, BmpError> {
        let (file_header, info_header) = self.headers_for(&image)?;
        self.file_header = file_header;
        self.info_header = info_header;
        Ok(core::mem::replace(&mut self.image, image))
    }

    /// Take the image, releasing the source.
    pub fn into_image(self) -> Image {
        self.image
    }

    /// Apply one operation.
    ///
    /// Combine and merge open their second file with this BMP's limits and
    /// permissiveness. A failed precondition leaves the image unchanged.
    pub fn apply(&mut self, op: &Operation) -> Result<(), BmpError> {
        let limits = &self.limits;
        let permissiveness = self.permissiveness;
        op.apply(&mut self.image, |path| {
            OpenRequest::new(path)
                .with_limits(limits)
                .with_permissiveness(permissiveness)
                .open(Unstoppable)
                .map(Bmp::into_image)
        })?;

        if op.changes_dimensions() {
            let (file_header, info_header) = self.headers_for(&self.image)?;
            self.file_header = file_header;
            self.info_header = info_header;
        }

        let (width, height) = self.image.dimensions();
        log::debug!("applied {} ({width}x{height})", op.name());
        Ok(())
    }

    /// Apply `ops` in order, stopping at the first failure.
    pub fn apply_all(&mut self, ops: &[Operation]) -> Result<(), BmpError> {
        ops.iter().try_for_each(|op| self.apply(op))
    }

    /// Write to a new file at `path`, truncating any existing one.
    ///
    /// On failure the destination may be left partially written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), BmpError> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        let (width, height) = self.image.dimensions();
        log::debug!("wrote {} ({width}x{height})", path.display());
        Ok(())
    }

    /// Serialize into any writer.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), BmpError> {
        self.write_to_with(writer, Unstoppable)
    }

    /// Serialize into any writer, polling `stop` between rows.
    ///
    /// The size fields are recomputed from the image, so a source accepted
    /// under [`Permissiveness::Standard`] with extra bytes after its rows is
    /// written as a file that loads under [`Permissiveness::Strict`].
    pub fn write_to_with<W: Write>(&self, mut writer: W, stop: impl Stop) -> Result<(), BmpError> {
        let (file_header, info_header) = self.headers_for(&self.image)?;
        write_to(&mut writer, &file_header, &info_header, &self.image, &stop)
    }

    /// Release the source handle and the image.
    pub fn close(self) {
        log::debug!("closing bmp");
        drop(self);
    }

    /// Headers for `image` derived from the current ones: dimensions,
    /// `file_size` and a non-zero `image_size` are recomputed from the image
    /// and `header_size` becomes 40. The offset, the row order sign and
    /// everything else are kept.
    fn headers_for(&self, image: &Image) -> Result<(FileHeader, InfoHeader), BmpError> {
        let (width, height) = image.dimensions();
        let too_large = || BmpError::DimensionsTooLarge { width, height };

        let mut info_header = self.info_header;
        let mut file_header = self.file_header;

        let pixel_bytes = header::stride_24(width)
            .and_then(|stride| stride.checked_mul(height))
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(too_large)?;
        let signed_height = i32::try_from(height).map_err(|_| too_large())?;

        info_header.header_size = INFO_HEADER_SIZE;
        info_header.width = i32::try_from(width).map_err(|_| too_large())?;
        info_header.height = if info_header.is_top_down() {
            -signed_height
        } else {
            signed_height
        };
        if info_header.image_size != 0 {
            info_header.image_size = pixel_bytes;
        }
        file_header.file_size = file_header
            .pixel_array_offset
            .checked_add(pixel_bytes)
            .ok_or_else(too_large)?;
        Ok((file_header, info_header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Pixel;
    use std::io::Cursor;

    fn sample(width: usize, height: usize) -> Vec<u8> {
        let pixels = (0..width * height)
            .map(|i| Pixel {
                b: i as u8,
                g: 1,
                r: 2,
            })
            .collect();
        encode(
            &Image::from_pixels(width, height, pixels).unwrap(),
            &Unstoppable,
        )
        .unwrap()
    }

    #[test]
    fn probe_reports_dimensions() {
        let info = probe_reader(&mut Cursor::new(sample(5, 3)), &Limits::default()).unwrap();
        assert_eq!((info.width, info.height, info.top_down), (5, 3, false));
        assert_eq!(info.file_header.file_size, 54 + 16 * 3);
    }

    #[test]
    fn transpose_resyncs_headers() {
        let mut bmp = Bmp::from_reader(Cursor::new(sample(5, 3))).unwrap();
        bmp.apply(&Operation::Transpose).unwrap();
        assert_eq!(bmp.info_header().width, 3);
        assert_eq!(bmp.info_header().height, 5);
        assert_eq!(bmp.info_header().image_size, 12 * 5);
        assert_eq!(bmp.file_header().file_size, 54 + 12 * 5);

        let mut out = Vec::new();
        bmp.write_to(&mut out).unwrap();
        assert_eq!(out.len(), 54 + 60);
        let again = Bmp::from_reader(Cursor::new(out)).unwrap();
        assert_eq!(again.image(), bmp.image());
    }

    #[test]
    fn top_down_sign_survives_rotation() {
        let mut data = sample(4, 2);
        data[22..26].copy_from_slice(&(-2i32).to_le_bytes());
        let mut bmp = Bmp::from_reader(Cursor::new(data)).unwrap();
        bmp.apply(&Operation::Rotate(1)).unwrap();
        assert_eq!(bmp.info_header().width, 2);
        assert_eq!(bmp.info_header().height, -4);
    }

    #[test]
    fn unchanged_dimensions_keep_headers() {
        let data = sample(3, 3);
        let mut bmp = Bmp::from_reader(Cursor::new(data.clone())).unwrap();
        let before = (*bmp.file_header(), *bmp.info_header());
        bmp.apply_all(&[Operation::Rotate(2), Operation::Invert, Operation::Invert])
            .unwrap();
        assert_eq!((*bmp.file_header(), *bmp.info_header()), before);
    }

    #[test]
    fn replace_image_returns_previous() {
        let mut bmp = Bmp::from_reader(Cursor::new(sample(2, 2))).unwrap();
        let old = bmp.replace_image(Image::new(7, 1).unwrap()).unwrap();
        assert_eq!(old.dimensions(), (2, 2));
        assert_eq!(bmp.info_header().width, 7);
        assert_eq!(bmp.file_header().file_size, 54 + 24);
    }

    #[test]
    fn failing_op_stops_the_chain() {
        let mut bmp = Bmp::from_reader(Cursor::new(sample(4, 4))).unwrap();
        let original = bmp.image().clone();
        let err = bmp
            .apply_all(&[Operation::Invert, Operation::Glitch(9), Operation::Invert])
            .unwrap_err();
        assert!(matches!(err, BmpError::OffsetOutOfBounds { .. }));
        assert_ne!(bmp.image(), &original);
    }

    #[test]
    fn trailing_bytes_are_dropped_on_write() {
        let mut data = sample(4, 1);
        data.extend_from_slice(&[0xAB; 4]);
        let declared = data.len() as u32;
        data[2..6].copy_from_slice(&declared.to_le_bytes());
        data[34..38].copy_from_slice(&99u32.to_le_bytes());

        let bmp = Bmp::from_reader_with(
            Cursor::new(data),
            &Limits::default(),
            Permissiveness::Standard,
            Unstoppable,
        )
        .unwrap();
        assert_eq!(bmp.file_header().file_size, declared);

        let mut out = Vec::new();
        bmp.write_to(&mut out).unwrap();
        assert_eq!(out.len(), 54 + 12);
        assert_eq!(u32::from_le_bytes(out[2..6].try_into().unwrap()), 66);
        assert_eq!(u32::from_le_bytes(out[34..38].try_into().unwrap()), 12);

        let again = Bmp::from_reader(Cursor::new(out)).unwrap();
        assert_eq!(again.image(), bmp.image());
    }

    #[test]
    fn v5_sized_header_is_written_as_info_header() {
        // 124-byte DIB header: offset 138, first 40 bytes as usual
        let plain = sample(2, 2);
        let mut data = plain[..54].to_vec();
        data[14..18].copy_from_slice(&124u32.to_le_bytes());
        data[10..14].copy_from_slice(&138u32.to_le_bytes());
        data.resize(138, 0x5A);
        data.extend_from_slice(&plain[54..]);
        let size = data.len() as u32;
        data[2..6].copy_from_slice(&size.to_le_bytes());

        let bmp = Bmp::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(bmp.info_header().header_size, 124);
        let mut out = Vec::new();
        bmp.write_to(&mut out).unwrap();
        assert_eq!(u32::from_le_bytes(out[14..18].try_into().unwrap()), 40);
        assert!(out[54..138].iter().all(|&b| b == 0));

        let again = Bmp::from_reader(Cursor::new(out)).unwrap();
        assert_eq!(again.image(), bmp.image());
    }
}
