/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Four character codes naming image formats and metadata kinds

use core::fmt::{Debug, Formatter};

/// A big endian four character code, e.g `PNG ` or `EXIF`
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FourCC(pub u32);

impl FourCC {
    pub const BMP: FourCC = FourCC::from_bytes(*b"BMP ");
    pub const GIF: FourCC = FourCC::from_bytes(*b"GIF ");
    pub const JPEG: FourCC = FourCC::from_bytes(*b"JPEG");
    pub const NIE: FourCC = FourCC::from_bytes(*b"NIE ");
    pub const PNG: FourCC = FourCC::from_bytes(*b"PNG ");
    pub const TGA: FourCC = FourCC::from_bytes(*b"TGA ");
    pub const WBMP: FourCC = FourCC::from_bytes(*b"WBMP");

    /// Background color
    pub const BGCL: FourCC = FourCC::from_bytes(*b"BGCL");
    /// Primary chromaticities and white point
    pub const CHRM: FourCC = FourCC::from_bytes(*b"CHRM");
    pub const EXIF: FourCC = FourCC::from_bytes(*b"EXIF");
    /// Gamma correction
    pub const GAMA: FourCC = FourCC::from_bytes(*b"GAMA");
    /// ICC color profile
    pub const ICCP: FourCC = FourCC::from_bytes(*b"ICCP");
    /// Key-value pair
    pub const KVP: FourCC = FourCC::from_bytes(*b"KVP ");
    /// Modification time
    pub const MTIM: FourCC = FourCC::from_bytes(*b"MTIM");
    /// Offset (2-dimensional)
    pub const OFS2: FourCC = FourCC::from_bytes(*b"OFS2");
    /// Physical dimensions
    pub const PHYD: FourCC = FourCC::from_bytes(*b"PHYD");
    /// Standard red green blue rendering intent
    pub const SRGB: FourCC = FourCC::from_bytes(*b"SRGB");
    pub const XMP: FourCC = FourCC::from_bytes(*b"XMP ");

    pub const fn from_bytes(bytes: [u8; 4]) -> FourCC {
        FourCC(u32::from_be_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Debug for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(|c| c.is_ascii_graphic() || *c == b' ') {
            write!(f, "{}", String::from_utf8_lossy(&bytes).trim_end())
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FourCC;

    #[test]
    fn fourcc_values_are_big_endian() {
        assert_eq!(FourCC::EXIF.0, 0x4558_4946);
        assert_eq!(FourCC::PNG.0, 0x504E_4720);
        assert_eq!(format!("{:?}", FourCC::KVP), "KVP");
        assert_eq!(format!("{:?}", FourCC(1)), "0x00000001");
    }
}
