use enough::StopReason;

/// Broad failure category of a [`BmpError`].
///
/// Callers that map failures to exit codes or user messages can match on
/// this instead of the (non-exhaustive) variant list.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad magic bytes or an unsupported member of the BMP family.
    Format,
    /// A header field holds a value this crate cannot process.
    HeaderField,
    /// Header claims disagree with the bytes actually present.
    Integrity,
    /// Open/read/write/seek failure.
    Io,
    /// An effect parameter or a second image is out of bounds.
    Bounds,
    /// Pixel buffer allocation failed.
    Allocation,
    /// A configured [`crate::Limits`] value was exceeded.
    Limit,
    /// The caller's stop token fired.
    Cancelled,
}

/// Errors from BMP reading, validation, transformation and writing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BmpError {
    #[error("unrecognized format magic bytes {0:?}")]
    UnrecognizedFormat([u8; 2]),

    #[error("unsupported BMP variant \"{}\"", String::from_utf8_lossy(.0))]
    UnsupportedVariant([u8; 2]),

    #[error("error reading header field \"{field}\"")]
    TruncatedHeader { field: &'static str },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("bitmap width cannot be negative, got {0}")]
    InvalidWidth(i32),

    #[error("the number of colour planes must be 1, got {0}")]
    ColourPlanes(u16),

    #[error("invalid compression method {0}, expected 0..=13")]
    InvalidCompression(u32),

    #[error("compression method not supported (code {0})")]
    UnsupportedCompression(u32),

    #[error("unsupported bit depth {0}, only 24 bits per pixel is supported")]
    UnsupportedBitDepth(u16),

    #[error("file is {missing} bytes smaller than its header declares")]
    FileTooSmall { missing: u64 },

    #[error("file may be corrupted or contain hidden data ({excess} extra bytes)")]
    PossibleCorruptionOrHiddenData { excess: u64 },

    #[error("pixel data offset {offset} invalid for a {file_size} byte file")]
    PixelOffsetInvalid { offset: u32, file_size: u64 },

    #[error("error reading pixels (row {row})")]
    PixelRead { row: usize },

    #[error("pixel data ends at {end}, header declares {declared} bytes")]
    TrailingData { end: u64, declared: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: usize, height: usize },

    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: usize, height: usize },

    #[error("buffer length mismatch: need {needed} pixels, got {actual}")]
    BufferMismatch { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("failed to allocate {bytes} bytes")]
    Allocation { bytes: usize },

    #[error("offset {offset} out of bounds for image width {width}")]
    OffsetOutOfBounds { offset: usize, width: usize },

    #[error(
        "file dimension mismatch: {expected_width}x{expected_height} is not {actual_width}x{actual_height}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("melt offset must be non-zero")]
    InvalidMeltOffset,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl BmpError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnrecognizedFormat(_) | Self::UnsupportedVariant(_) => ErrorKind::Format,
            Self::TruncatedHeader { .. }
            | Self::InvalidHeader(_)
            | Self::InvalidWidth(_)
            | Self::ColourPlanes(_)
            | Self::InvalidCompression(_)
            | Self::UnsupportedCompression(_)
            | Self::UnsupportedBitDepth(_) => ErrorKind::HeaderField,
            Self::FileTooSmall { .. }
            | Self::PossibleCorruptionOrHiddenData { .. }
            | Self::PixelOffsetInvalid { .. }
            | Self::PixelRead { .. }
            | Self::TrailingData { .. } => ErrorKind::Integrity,
            Self::Io(_) => ErrorKind::Io,
            Self::OffsetOutOfBounds { .. }
            | Self::DimensionMismatch { .. }
            | Self::InvalidMeltOffset
            | Self::DimensionsTooLarge { .. }
            | Self::ZeroDimensions { .. }
            | Self::BufferMismatch { .. } => ErrorKind::Bounds,
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::LimitExceeded(_) => ErrorKind::Limit,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

impl From<StopReason> for BmpError {
    fn from(r: StopReason) -> Self {
        BmpError::Cancelled(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_taxonomy() {
        assert_eq!(
            BmpError::UnsupportedVariant(*b"BA").kind(),
            ErrorKind::Format
        );
        assert_eq!(BmpError::ColourPlanes(2).kind(), ErrorKind::HeaderField);
        assert_eq!(
            BmpError::FileTooSmall { missing: 3 }.kind(),
            ErrorKind::Integrity
        );
        assert_eq!(BmpError::InvalidMeltOffset.kind(), ErrorKind::Bounds);
        assert_eq!(
            BmpError::Allocation { bytes: 1 }.kind(),
            ErrorKind::Allocation
        );
    }

    #[test]
    fn variant_message_shows_magic() {
        let msg = BmpError::UnsupportedVariant(*b"CI").to_string();
        assert!(msg.contains("\"CI\""), "{msg}");
    }
}
