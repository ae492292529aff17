use core::ops::BitOr;

/// One 24-bit BMP pixel: 3 tightly packed bytes in blue, green, red order.
///
/// This is [`rgb::Bgr<u8>`], so a `[Pixel]` slice has exactly the byte layout
/// of an unpadded BMP row.
pub type Pixel = rgb::Bgr<u8>;

/// Bytes per pixel on disk and in memory.
pub const BYTES_PER_PIXEL: usize = 3;

/// Summed channel intensity, the sort key used by the melt effect.
#[inline]
pub fn intensity(p: Pixel) -> u16 {
    u16::from(p.b) + u16::from(p.g) + u16::from(p.r)
}

/// Set of colour channels, used by the channel-zeroing filter.
///
/// Bit 0 is red, bit 1 green, bit 2 blue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const NONE: Self = Self(0);
    pub const RED: Self = Self(0b001);
    pub const GREEN: Self = Self(0b010);
    pub const BLUE: Self = Self(0b100);
    pub const ALL: Self = Self(0b111);

    /// Build from raw bits. Bits above bit 2 are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ChannelMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_is_packed_bgr() {
        assert_eq!(core::mem::size_of::<Pixel>(), BYTES_PER_PIXEL);
        let px = [Pixel { b: 1, g: 2, r: 3 }];
        use rgb::ComponentBytes as _;
        assert_eq!(px.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn mask_ops() {
        let rg = ChannelMask::RED | ChannelMask::GREEN;
        assert_eq!(rg.bits(), 0b011);
        assert!(rg.contains(ChannelMask::RED));
        assert!(!rg.contains(ChannelMask::BLUE));
        assert_eq!(ChannelMask::from_bits(0xff), ChannelMask::ALL);
        assert!(ChannelMask::NONE.is_empty());
    }

    #[test]
    fn intensity_sums_channels() {
        assert_eq!(intensity(Pixel { b: 255, g: 255, r: 255 }), 765);
        assert_eq!(intensity(Pixel { b: 0, g: 1, r: 2 }), 3);
    }
}
