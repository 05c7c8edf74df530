/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Metadata reported by engines while decoding
#![allow(non_camel_case_types)]

use crate::fourcc::FourCC;

/// What a [`MoreInformation`] describes
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MoreInformationFlavor {
    #[default]
    NONE = 0,
    /// Input continues in another format, `w` holds its fourcc
    IO_REDIRECT = 1,
    /// The engine wants input from position `x`
    IO_SEEK = 2,
    /// Raw bytes copied straight from the input
    METADATA_RAW_PASSTHROUGH = 3,
    /// Raw bytes after the engine transformed them, e.g decompressed
    METADATA_RAW_TRANSFORM = 4,
    /// Values the engine parsed itself, carried in `x`, `y` and `z`
    METADATA_PARSED = 5
}

/// Descriptor of an engine event that is not pixel data.
///
/// `w` usually holds a fourcc, the meaning of `x`, `y` and `z`
/// depends on the flavor and fourcc.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct MoreInformation {
    pub flavor: MoreInformationFlavor,
    pub w:      u32,
    pub x:      u64,
    pub y:      u64,
    pub z:      u64
}

impl MoreInformation {
    pub const fn new(flavor: MoreInformationFlavor, w: u32, x: u64, y: u64, z: u64) -> Self {
        MoreInformation { flavor, w, x, y, z }
    }

    /// Raw metadata copied from bytes `start..end` of the input
    pub const fn raw_passthrough(fourcc: FourCC, start: u64, end: u64) -> Self {
        MoreInformation::new(
            MoreInformationFlavor::METADATA_RAW_PASSTHROUGH,
            fourcc.0,
            0,
            start,
            end
        )
    }

    /// Raw metadata the engine transformed, e.g decompressed
    pub const fn raw_transform(fourcc: FourCC) -> Self {
        MoreInformation::new(MoreInformationFlavor::METADATA_RAW_TRANSFORM, fourcc.0, 0, 0, 0)
    }

    /// Parsed gamma, `gamma` is the file gamma scaled by 100000
    pub const fn parsed_gama(gamma: u32) -> Self {
        MoreInformation::new(MoreInformationFlavor::METADATA_PARSED, FourCC::GAMA.0, gamma as u64, 0, 0)
    }

    /// Parsed rendering intent
    pub const fn parsed_srgb(intent: u8) -> Self {
        MoreInformation::new(MoreInformationFlavor::METADATA_PARSED, FourCC::SRGB.0, (intent & 3) as u64, 0, 0)
    }

    /// Parsed chromaticities, in the order white x, white y, red x,
    /// red y, green x, green y, blue x, blue y.
    ///
    /// Each component keeps its low 24 bits.
    pub fn parsed_chrm(components: [u32; 8]) -> Self {
        let mut packed = [0_u8; 24];
        for (chunk, value) in packed.chunks_exact_mut(3).zip(components) {
            chunk.copy_from_slice(&value.to_le_bytes()[..3]);
        }
        let word = |i: usize| {
            let mut bytes = [0_u8; 8];
            bytes.copy_from_slice(&packed[i * 8..i * 8 + 8]);
            u64::from_le_bytes(bytes)
        };
        MoreInformation::new(
            MoreInformationFlavor::METADATA_PARSED,
            FourCC::CHRM.0,
            word(0),
            word(1),
            word(2)
        )
    }

    /// Fourcc of the format the input redirects to
    pub const fn io_redirect_fourcc(&self) -> u32 {
        self.w
    }

    /// Input position an engine wants to continue from
    pub const fn io_seek_position(&self) -> u64 {
        self.x
    }

    /// Kind of metadata, e.g [`FourCC::EXIF`]
    pub const fn metadata_fourcc(&self) -> u32 {
        self.w
    }

    /// Input byte range of passthrough metadata
    pub const fn metadata_raw_passthrough_range(&self) -> (u64, u64) {
        (self.y, self.z)
    }

    /// One of the eight 24 bit chromaticity components, zero past the eighth
    pub fn metadata_parsed_chrm(&self, component: u32) -> u32 {
        if component >= 8 {
            return 0;
        }
        let mut packed = [0_u8; 24];
        packed[0..8].copy_from_slice(&self.x.to_le_bytes());
        packed[8..16].copy_from_slice(&self.y.to_le_bytes());
        packed[16..24].copy_from_slice(&self.z.to_le_bytes());

        let start = component as usize * 3;
        u32::from_le_bytes([packed[start], packed[start + 1], packed[start + 2], 0])
    }

    /// File gamma scaled by 100000
    pub const fn metadata_parsed_gama(&self) -> u32 {
        self.x as u32
    }

    /// Rendering intent, 0 perceptual, 1 relative colorimetric,
    /// 2 saturation and 3 absolute colorimetric
    pub const fn metadata_parsed_srgb(&self) -> u32 {
        (self.x & 3) as u32
    }
}

/// One metadata chunk reported during a decode
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MetadataEntry {
    pub minfo: MoreInformation,
    pub data:  Vec<u8>
}

impl MetadataEntry {
    pub fn new(minfo: MoreInformation, data: Vec<u8>) -> MetadataEntry {
        MetadataEntry { minfo, data }
    }
}
