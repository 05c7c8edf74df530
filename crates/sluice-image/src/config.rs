/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image decoder options
#![allow(non_camel_case_types)]

use std::collections::BTreeSet;

use bitflags::bitflags;
use sluice_core::quirks::Quirk;

use crate::fourcc::FourCC;
use crate::pixel::PixelFormat;

bitflags! {
    /// Metadata categories the engine should report to the adapter.
    ///
    /// Metadata of a category not set here is skipped by the engine.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ImageDecoderFlags: u64 {
        /// Background color
        const REPORT_METADATA_BGCL = 0x0001;
        /// Primary chromaticities and white point
        const REPORT_METADATA_CHRM = 0x0002;
        /// Exchangeable image file format
        const REPORT_METADATA_EXIF = 0x0004;
        /// Gamma correction
        const REPORT_METADATA_GAMA = 0x0008;
        /// International color consortium profile
        const REPORT_METADATA_ICCP = 0x0010;
        /// Key-value pair
        ///
        /// For PNG files, this includes iTXt, tEXt and zTXt chunks
        const REPORT_METADATA_KVP  = 0x0020;
        /// Modification time
        const REPORT_METADATA_MTIM = 0x0040;
        /// Offset (2-dimensional) in the pHYs sense
        const REPORT_METADATA_OFS2 = 0x0080;
        /// Physical dimensions
        const REPORT_METADATA_PHYD = 0x0100;
        /// Standard red green blue rendering intent
        const REPORT_METADATA_SRGB = 0x0200;
        /// Extensible metadata platform
        const REPORT_METADATA_XMP  = 0x0400;
    }
}

impl ImageDecoderFlags {
    /// The flag that opts into metadata of kind `fourcc`
    pub fn for_metadata(fourcc: FourCC) -> ImageDecoderFlags {
        match fourcc {
            FourCC::BGCL => ImageDecoderFlags::REPORT_METADATA_BGCL,
            FourCC::CHRM => ImageDecoderFlags::REPORT_METADATA_CHRM,
            FourCC::EXIF => ImageDecoderFlags::REPORT_METADATA_EXIF,
            FourCC::GAMA => ImageDecoderFlags::REPORT_METADATA_GAMA,
            FourCC::ICCP => ImageDecoderFlags::REPORT_METADATA_ICCP,
            FourCC::KVP => ImageDecoderFlags::REPORT_METADATA_KVP,
            FourCC::MTIM => ImageDecoderFlags::REPORT_METADATA_MTIM,
            FourCC::OFS2 => ImageDecoderFlags::REPORT_METADATA_OFS2,
            FourCC::PHYD => ImageDecoderFlags::REPORT_METADATA_PHYD,
            FourCC::SRGB => ImageDecoderFlags::REPORT_METADATA_SRGB,
            FourCC::XMP => ImageDecoderFlags::REPORT_METADATA_XMP,
            _ => ImageDecoderFlags::empty()
        }
    }

    /// Whether metadata of kind `fourcc` should be reported
    pub fn reports(self, fourcc: FourCC) -> bool {
        let flag = ImageDecoderFlags::for_metadata(fourcc);
        !flag.is_empty() && self.contains(flag)
    }
}

/// Quirks altering how codecs treat their input
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageDecoderQuirk {
    /// Do not verify checksums, e.g PNG CRCs and zlib adler
    IGNORE_CHECKSUM = 1,
    GIF_DELAY_NUM_DECODED_FRAMES = 1_041_635_328,
    GIF_FIRST_FRAME_LOCAL_PALETTE_MEANS_BLACK_BACKGROUND = 1_041_635_329,
    GIF_QUIRK_HONOR_BACKGROUND_COLOR = 1_041_635_330,
    GIF_IGNORE_TOO_MUCH_PIXEL_DATA = 1_041_635_331,
    GIF_IMAGE_BOUNDS_ARE_STRICT = 1_041_635_332,
    GIF_REJECT_EMPTY_FRAME = 1_041_635_333,
    GIF_REJECT_EMPTY_PALETTE = 1_041_635_334
}

impl ImageDecoderQuirk {
    pub const ALL: [ImageDecoderQuirk; 8] = [
        ImageDecoderQuirk::IGNORE_CHECKSUM,
        ImageDecoderQuirk::GIF_DELAY_NUM_DECODED_FRAMES,
        ImageDecoderQuirk::GIF_FIRST_FRAME_LOCAL_PALETTE_MEANS_BLACK_BACKGROUND,
        ImageDecoderQuirk::GIF_QUIRK_HONOR_BACKGROUND_COLOR,
        ImageDecoderQuirk::GIF_IGNORE_TOO_MUCH_PIXEL_DATA,
        ImageDecoderQuirk::GIF_IMAGE_BOUNDS_ARE_STRICT,
        ImageDecoderQuirk::GIF_REJECT_EMPTY_FRAME,
        ImageDecoderQuirk::GIF_REJECT_EMPTY_PALETTE
    ];
}

impl Quirk for ImageDecoderQuirk {
    fn id(self) -> u32 {
        self as u32
    }
}

/// Image formats an adapter can be allowed to decode
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageDecoderType {
    BMP,
    GIF,
    NIE,
    PNG,
    TGA,
    WBMP,
    JPEG
}

impl ImageDecoderType {
    pub const ALL: [ImageDecoderType; 7] = [
        ImageDecoderType::BMP,
        ImageDecoderType::GIF,
        ImageDecoderType::NIE,
        ImageDecoderType::PNG,
        ImageDecoderType::TGA,
        ImageDecoderType::WBMP,
        ImageDecoderType::JPEG
    ];

    pub const fn fourcc(self) -> FourCC {
        match self {
            ImageDecoderType::BMP => FourCC::BMP,
            ImageDecoderType::GIF => FourCC::GIF,
            ImageDecoderType::NIE => FourCC::NIE,
            ImageDecoderType::PNG => FourCC::PNG,
            ImageDecoderType::TGA => FourCC::TGA,
            ImageDecoderType::WBMP => FourCC::WBMP,
            ImageDecoderType::JPEG => FourCC::JPEG
        }
    }

    pub fn from_fourcc(fourcc: FourCC) -> Option<ImageDecoderType> {
        ImageDecoderType::ALL
            .iter()
            .copied()
            .find(|t| t.fourcc() == fourcc)
    }
}

/// How decoded pixels combine with what is already in the destination buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum PixelBlend {
    /// Overwrite the destination
    #[default]
    SRC,
    /// Composite the source over the destination
    SRC_OVER
}

/// Background color handed to engines by default.
///
/// Deliberately not a valid premultiplied color (blue exceeds alpha),
/// which tells engines there is no background to fill with.
pub const DEFAULT_BACKGROUND_COLOR: u32 = 0x0000_0001;

/// Whether a premultiplied ARGB color is valid, i.e no color
/// channel exceeds alpha
pub const fn is_valid_background_color(argb_premul: u32) -> bool {
    let a = (argb_premul >> 24) & 0xFF;
    let r = (argb_premul >> 16) & 0xFF;
    let g = (argb_premul >> 8) & 0xFF;
    let b = argb_premul & 0xFF;
    r <= a && g <= a && b <= a
}

/// Image decoder options
///
/// The options are a snapshot, an [`ImageDecoder`](crate::ImageDecoder)
/// copies what it needs when it is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageDecoderConfig {
    /// Metadata categories to report
    ///
    /// - Default value: empty
    flags:                    ImageDecoderFlags,
    /// How decoded pixels are blended into the buffer
    ///
    /// - Default value: [`PixelBlend::SRC`]
    pixel_blend:              PixelBlend,
    /// Quirks passed to the codecs
    ///
    /// - Default value: empty
    quirks:                   BTreeSet<ImageDecoderQuirk>,
    /// Premultiplied ARGB color the buffer is filled with before decoding
    ///
    /// - Default value: [`DEFAULT_BACKGROUND_COLOR`], an invalid color meaning no fill
    background_color:         u32,
    /// Images wider or taller than this are rejected
    ///
    /// - Default value: 1048575
    max_incl_dimension:       u32,
    /// Metadata chunks longer than this are rejected
    ///
    /// - Default value: 16777215
    max_incl_metadata_length: u64,
    /// Formats the adapter accepts
    ///
    /// - Default value: BMP, GIF, NIE, PNG, TGA, WBMP
    enabled_decoders:         BTreeSet<ImageDecoderType>,
    /// Layout of the decoded pixels
    ///
    /// - Default value: [`PixelFormat::BGRA_PREMUL`]
    pixel_format:             PixelFormat
}

impl Default for ImageDecoderConfig {
    fn default() -> Self {
        ImageDecoderConfig {
            flags:                    ImageDecoderFlags::empty(),
            pixel_blend:              PixelBlend::SRC,
            quirks:                   BTreeSet::new(),
            background_color:         DEFAULT_BACKGROUND_COLOR,
            max_incl_dimension:       0x000F_FFFF,
            max_incl_metadata_length: 0x00FF_FFFF,
            enabled_decoders:         BTreeSet::from([
                ImageDecoderType::BMP,
                ImageDecoderType::GIF,
                ImageDecoderType::NIE,
                ImageDecoderType::PNG,
                ImageDecoderType::TGA,
                ImageDecoderType::WBMP
            ]),
            pixel_format:             PixelFormat::BGRA_PREMUL
        }
    }
}

impl ImageDecoderConfig {
    pub const fn get_flags(&self) -> ImageDecoderFlags {
        self.flags
    }

    /// Set the metadata categories to report, replacing previous ones
    pub fn set_flags(mut self, flags: ImageDecoderFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn get_pixel_blend(&self) -> PixelBlend {
        self.pixel_blend
    }

    pub fn set_pixel_blend(mut self, blend: PixelBlend) -> Self {
        self.pixel_blend = blend;
        self
    }

    pub fn get_quirks(&self) -> &BTreeSet<ImageDecoderQuirk> {
        &self.quirks
    }

    /// Set the quirks passed to codecs, replacing previous ones.
    ///
    /// Duplicates collapse, the order quirks are given in does not matter.
    pub fn set_quirks<I>(mut self, quirks: I) -> Self
    where
        I: IntoIterator<Item = ImageDecoderQuirk>
    {
        self.quirks = quirks.into_iter().collect();
        self
    }

    pub const fn get_background_color(&self) -> u32 {
        self.background_color
    }

    /// Set the premultiplied ARGB background color.
    ///
    /// An invalid color (a color channel greater than alpha)
    /// disables background filling.
    pub fn set_background_color(mut self, argb_premul: u32) -> Self {
        self.background_color = argb_premul;
        self
    }

    pub const fn get_max_incl_dimension(&self) -> u32 {
        self.max_incl_dimension
    }

    /// Set the largest width or height accepted, inclusive
    pub fn set_max_incl_dimension(mut self, dimension: u32) -> Self {
        self.max_incl_dimension = dimension;
        self
    }

    pub const fn get_max_incl_metadata_length(&self) -> u64 {
        self.max_incl_metadata_length
    }

    /// Set the largest metadata chunk accepted, inclusive
    pub fn set_max_incl_metadata_length(mut self, length: u64) -> Self {
        self.max_incl_metadata_length = length;
        self
    }

    pub fn get_enabled_decoders(&self) -> &BTreeSet<ImageDecoderType> {
        &self.enabled_decoders
    }

    /// Set the formats accepted, replacing previous ones.
    ///
    /// An empty set rejects every input.
    pub fn set_enabled_decoders<I>(mut self, decoders: I) -> Self
    where
        I: IntoIterator<Item = ImageDecoderType>
    {
        self.enabled_decoders = decoders.into_iter().collect();
        self
    }

    pub const fn get_pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn set_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }
}
