/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pixel formats and pixel configurations
//!
//! A [`PixelConfig`] describes the pixel buffer an engine
//! decodes into, its dimensions, its memory layout and
//! its chroma subsampling.
#![allow(non_camel_case_types)]

/// Memory layout of a single pixel.
///
/// The discriminants are stable engine identifiers, the low bits
/// encode channel depths and the high bits the channel order
/// and transparency.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PixelFormat {
    /// Not a pixel format, used by null configurations
    #[default]
    INVALID = 0x0000_0000,
    A = 0x0200_0008,
    Y = 0x2000_0008,
    Y_16LE = 0x2000_000B,
    Y_16BE = 0x2010_000B,
    YA_NONPREMUL = 0x2100_0088,
    YA_PREMUL = 0x2200_0088,
    YCBCR = 0x4002_0888,
    YCBCRA_NONPREMUL = 0x4103_8888,
    YCBCRK = 0x5003_8888,
    YCOCG = 0x6002_0888,
    YCOCGA_NONPREMUL = 0x6103_8888,
    YCOCGK = 0x7003_8888,
    INDEXED__BGRA_NONPREMUL = 0x8104_0008,
    INDEXED__BGRA_PREMUL = 0x8204_0008,
    INDEXED__BGRA_BINARY = 0x8304_0008,
    BGR_565 = 0x8000_0565,
    BGR = 0x8000_0888,
    BGRA_NONPREMUL = 0x8100_8888,
    BGRA_NONPREMUL_4X16LE = 0x8100_BBBB,
    BGRA_PREMUL = 0x8200_8888,
    BGRA_PREMUL_4X16LE = 0x8200_BBBB,
    BGRA_BINARY = 0x8300_8888,
    BGRX = 0x9000_8888,
    RGB = 0xA000_0888,
    RGBA_NONPREMUL = 0xA100_8888,
    RGBA_NONPREMUL_4X16LE = 0xA100_BBBB,
    RGBA_PREMUL = 0xA200_8888,
    RGBA_PREMUL_4X16LE = 0xA200_BBBB,
    RGBA_BINARY = 0xA300_8888,
    RGBX = 0xB000_8888,
    CMY = 0xC002_0888,
    CMYK = 0xD003_8888
}

/// Size of the palette that trails indexed pixel data
pub const PALETTE_LEN: u64 = 1024;

impl PixelFormat {
    /// All valid pixel formats
    pub const ALL: [PixelFormat; 32] = [
        PixelFormat::A,
        PixelFormat::Y,
        PixelFormat::Y_16LE,
        PixelFormat::Y_16BE,
        PixelFormat::YA_NONPREMUL,
        PixelFormat::YA_PREMUL,
        PixelFormat::YCBCR,
        PixelFormat::YCBCRA_NONPREMUL,
        PixelFormat::YCBCRK,
        PixelFormat::YCOCG,
        PixelFormat::YCOCGA_NONPREMUL,
        PixelFormat::YCOCGK,
        PixelFormat::INDEXED__BGRA_NONPREMUL,
        PixelFormat::INDEXED__BGRA_PREMUL,
        PixelFormat::INDEXED__BGRA_BINARY,
        PixelFormat::BGR_565,
        PixelFormat::BGR,
        PixelFormat::BGRA_NONPREMUL,
        PixelFormat::BGRA_NONPREMUL_4X16LE,
        PixelFormat::BGRA_PREMUL,
        PixelFormat::BGRA_PREMUL_4X16LE,
        PixelFormat::BGRA_BINARY,
        PixelFormat::BGRX,
        PixelFormat::RGB,
        PixelFormat::RGBA_NONPREMUL,
        PixelFormat::RGBA_NONPREMUL_4X16LE,
        PixelFormat::RGBA_PREMUL,
        PixelFormat::RGBA_PREMUL_4X16LE,
        PixelFormat::RGBA_BINARY,
        PixelFormat::RGBX,
        PixelFormat::CMY,
        PixelFormat::CMYK
    ];

    pub const fn repr(self) -> u32 {
        self as u32
    }

    pub fn from_repr(repr: u32) -> Option<PixelFormat> {
        PixelFormat::ALL.iter().copied().find(|f| f.repr() == repr)
    }

    /// Whether channels live in separate planes
    pub const fn is_planar(self) -> bool {
        (self.repr() >> 16) & 0x3 != 0
    }

    /// Whether pixels are palette indices
    pub const fn is_indexed(self) -> bool {
        (self.repr() >> 18) & 0x1 != 0
    }

    /// Number of bytes a single interleaved pixel occupies.
    ///
    /// Returns zero for the invalid and planar formats, which
    /// have no interleaved representation.
    pub const fn bytes_per_pixel(self) -> u64 {
        match self {
            PixelFormat::INVALID => 0,
            PixelFormat::A | PixelFormat::Y => 1,
            PixelFormat::INDEXED__BGRA_NONPREMUL
            | PixelFormat::INDEXED__BGRA_PREMUL
            | PixelFormat::INDEXED__BGRA_BINARY => 1,
            PixelFormat::Y_16LE
            | PixelFormat::Y_16BE
            | PixelFormat::YA_NONPREMUL
            | PixelFormat::YA_PREMUL
            | PixelFormat::BGR_565 => 2,
            PixelFormat::BGR | PixelFormat::RGB => 3,
            PixelFormat::BGRA_NONPREMUL
            | PixelFormat::BGRA_PREMUL
            | PixelFormat::BGRA_BINARY
            | PixelFormat::BGRX
            | PixelFormat::RGBA_NONPREMUL
            | PixelFormat::RGBA_PREMUL
            | PixelFormat::RGBA_BINARY
            | PixelFormat::RGBX => 4,
            PixelFormat::BGRA_NONPREMUL_4X16LE
            | PixelFormat::BGRA_PREMUL_4X16LE
            | PixelFormat::RGBA_NONPREMUL_4X16LE
            | PixelFormat::RGBA_PREMUL_4X16LE => 8,
            PixelFormat::YCBCR
            | PixelFormat::YCBCRA_NONPREMUL
            | PixelFormat::YCBCRK
            | PixelFormat::YCOCG
            | PixelFormat::YCOCGA_NONPREMUL
            | PixelFormat::YCOCGK
            | PixelFormat::CMY
            | PixelFormat::CMYK => 0
        }
    }

    pub const fn bits_per_pixel(self) -> u64 {
        self.bytes_per_pixel() * 8
    }
}

/// Chroma subsampling of a pixel configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum PixelSubsampling {
    #[default]
    NONE,
    K444,
    K440,
    K422,
    K420,
    K411,
    K410
}

/// Dimensions and memory layout of a pixel buffer.
///
/// The null configuration (see [`PixelConfig::null`]) stands for
/// "no image" and is what results carry before a successful allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PixelConfig {
    pixel_format:      PixelFormat,
    pixel_subsampling: PixelSubsampling,
    width:             u32,
    height:            u32
}

impl PixelConfig {
    /// The null configuration, invalid with zero dimensions
    pub const fn null() -> PixelConfig {
        PixelConfig {
            pixel_format:      PixelFormat::INVALID,
            pixel_subsampling: PixelSubsampling::NONE,
            width:             0,
            height:            0
        }
    }

    /// Create a configuration.
    ///
    /// An invalid pixel format gives the null configuration
    pub const fn new(
        pixel_format: PixelFormat, pixel_subsampling: PixelSubsampling, width: u32, height: u32
    ) -> PixelConfig {
        if matches!(pixel_format, PixelFormat::INVALID) {
            return PixelConfig::null();
        }
        PixelConfig {
            pixel_format,
            pixel_subsampling,
            width,
            height
        }
    }

    pub const fn is_valid(&self) -> bool {
        !matches!(self.pixel_format, PixelFormat::INVALID)
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub const fn pixel_subsampling(&self) -> PixelSubsampling {
        self.pixel_subsampling
    }

    /// Same dimensions, different pixel format
    #[must_use]
    pub const fn with_pixel_format(self, pixel_format: PixelFormat) -> PixelConfig {
        PixelConfig::new(pixel_format, self.pixel_subsampling, self.width, self.height)
    }

    /// Number of bytes in a row of pixels
    pub fn stride(&self) -> u64 {
        u64::from(self.width) * self.pixel_format.bytes_per_pixel()
    }

    /// Number of bytes a buffer holding this configuration needs.
    ///
    /// Indexed formats need an extra 1024 bytes for the palette.
    /// Returns zero for invalid or planar configurations and when
    /// the length overflows.
    pub fn pixbuf_len(&self) -> u64 {
        let bpp = self.pixel_format.bytes_per_pixel();
        if !self.is_valid() || bpp == 0 {
            return 0;
        }
        let len = u64::from(self.width)
            .checked_mul(u64::from(self.height))
            .and_then(|area| area.checked_mul(bpp));

        match len {
            Some(len) if self.pixel_format.is_indexed() => len.checked_add(PALETTE_LEN).unwrap_or(0),
            Some(len) => len,
            None => 0
        }
    }
}
