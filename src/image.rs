use rgb::ComponentBytes as _;

use crate::error::BmpError;
use crate::pixel::{BYTES_PER_PIXEL, Pixel};

/// Owned, flat, row-major 24-bit pixel buffer.
///
/// Rows are stored in the order they appear in the file (bottom-up for the
/// usual positive-height BMP). `pixels().len() == width * height` always holds
/// and both dimensions are non-zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Image {
    /// Allocate a zeroed `width` x `height` image.
    ///
    /// Fails with [`BmpError::ZeroDimensions`], [`BmpError::DimensionsTooLarge`]
    /// on overflow, or [`BmpError::Allocation`] if the allocator refuses.
    pub fn new(width: usize, height: usize) -> Result<Self, BmpError> {
        let len = checked_len(width, height)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| BmpError::Allocation {
                bytes: len.saturating_mul(BYTES_PER_PIXEL),
            })?;
        pixels.resize(len, Pixel::default());
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap an existing pixel vector.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self, BmpError> {
        let needed = checked_len(width, height)?;
        if pixels.len() != needed {
            return Err(BmpError::BufferMismatch {
                needed,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whether `other` has exactly the same width and height.
    pub fn same_dimensions(&self, other: &Image) -> bool {
        self.dimensions() == other.dimensions()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Take the pixel vector, consuming the image.
    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Zero-copy view of row `y`.
    ///
    /// # Panics
    /// If `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[Pixel] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Mutable zero-copy view of row `y`.
    ///
    /// # Panics
    /// If `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [Pixel] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    pub fn rows(&self) -> core::slice::ChunksExact<'_, Pixel> {
        self.pixels.chunks_exact(self.width)
    }

    pub fn rows_mut(&mut self) -> core::slice::ChunksExactMut<'_, Pixel> {
        self.pixels.chunks_exact_mut(self.width)
    }

    /// Pixel at column `x`, row `y`, or `None` when out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<&Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x)
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get_mut(y * self.width + x)
    }

    /// Packed BGR bytes, `width * height * 3` long, no row padding.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_bytes()
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.pixels.as_bytes_mut()
    }

    /// Read-only 2D view for rendering collaborators.
    ///
    /// No allocation or copy; the returned `ImgRef` borrows this buffer.
    pub fn as_img(&self) -> imgref::ImgRef<'_, Pixel> {
        imgref::ImgRef::new(&self.pixels, self.width, self.height)
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, BmpError> {
    if width == 0 || height == 0 {
        return Err(BmpError::ZeroDimensions { width, height });
    }
    width
        .checked_mul(height)
        .filter(|len| len.checked_mul(BYTES_PER_PIXEL).is_some())
        .ok_or(BmpError::DimensionsTooLarge { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(w: usize, h: usize) -> Image {
        let pixels = (0..w * h)
            .map(|i| Pixel {
                b: i as u8,
                g: (i >> 8) as u8,
                r: 7,
            })
            .collect();
        Image::from_pixels(w, h, pixels).unwrap()
    }

    #[test]
    fn new_is_zeroed() {
        let img = Image::new(3, 2).unwrap();
        assert_eq!(img.pixels().len(), 6);
        assert!(img.pixels().iter().all(|p| *p == Pixel::default()));
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(
            Image::new(0, 5),
            Err(BmpError::ZeroDimensions { .. })
        ));
        assert!(matches!(
            Image::new(5, 0),
            Err(BmpError::ZeroDimensions { .. })
        ));
    }

    #[test]
    fn overflow_rejected() {
        assert!(matches!(
            Image::new(usize::MAX, 2),
            Err(BmpError::DimensionsTooLarge { .. })
        ));
    }

    #[test]
    fn from_pixels_checks_len() {
        let err = Image::from_pixels(2, 2, vec![Pixel::default(); 3]).unwrap_err();
        assert!(matches!(
            err,
            BmpError::BufferMismatch {
                needed: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn row_and_pixel_indexing_agree() {
        let img = numbered(4, 3);
        assert_eq!(img.row(2)[1], *img.pixel(1, 2).unwrap());
        assert_eq!(img.pixel(1, 2).unwrap().b, 9);
        assert!(img.pixel(4, 0).is_none());
        assert!(img.pixel(0, 3).is_none());
        assert_eq!(img.rows().count(), 3);
    }

    #[test]
    fn byte_view_is_packed() {
        let img = numbered(2, 1);
        assert_eq!(img.as_bytes(), &[0, 0, 7, 1, 0, 7]);
    }

    #[test]
    fn imgref_view_borrows() {
        let img = numbered(5, 2);
        let view = img.as_img();
        assert_eq!(view.width(), 5);
        assert_eq!(view.height(), 2);
        assert_eq!(view.buf().as_ptr(), img.pixels().as_ptr());
    }
}
