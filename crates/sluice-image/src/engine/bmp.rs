/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! BMP decoding via zune-bmp.
//!
//! BMP files carry no metadata chunks, so none is ever reported.

use zune_bmp::BmpDecoder;
use zune_core::options::DecoderOptions;

use crate::config::ImageDecoderFlags;
use crate::engine::{
    codec_error, expand_to_rgba, DecodedFrame, FrameDecoder, FrameError, ImageConfig
};
use crate::errors::ImageDecoderError;
use crate::fourcc::FourCC;
use crate::metadata::MetadataEntry;
use crate::pixel::{PixelConfig, PixelFormat, PixelSubsampling};

/// File header plus the start of the smallest (OS/2 core) info header
const MIN_HEADER_LEN: usize = 14 + 12;

#[derive(Default)]
pub(crate) struct BmpFrameDecoder;

fn options() -> DecoderOptions {
    DecoderOptions::default()
        .set_max_width(u32::MAX as usize)
        .set_max_height(u32::MAX as usize)
}

/// What the file and info headers say about the image
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct BmpHeader {
    width:      u32,
    height:     u32,
    /// Where the pixel data ends, for layouts with a fixed row size
    pixels_end: Option<u64>
}

fn le_u16(src: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([src[at], src[at + 1]])
}

fn le_u32(src: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([src[at], src[at + 1], src[at + 2], src[at + 3]])
}

fn read_header(src: &[u8]) -> Result<BmpHeader, String> {
    if src.len() < MIN_HEADER_LEN {
        return Err(ImageDecoderError::UnexpectedEndOfFile.into());
    }
    let offset = u64::from(le_u32(src, 10));
    let info_len = le_u32(src, 14) as usize;

    let (width, height, bpp, compression) = if info_len == 12 {
        (u32::from(le_u16(src, 18)), u32::from(le_u16(src, 20)), le_u16(src, 24), 0)
    } else {
        if info_len < 40 {
            return Err("bmp: bad header".to_string());
        }
        if src.len() < 14 + 20 {
            return Err(ImageDecoderError::UnexpectedEndOfFile.into());
        }
        let width = le_u32(src, 18) as i32;
        // negative heights are top-down images
        let height = le_u32(src, 22) as i32;
        if width < 0 || height == i32::MIN {
            return Err("bmp: bad header".to_string());
        }
        (width as u32, height.unsigned_abs(), le_u16(src, 28), le_u32(src, 30))
    };

    // uncompressed and bitfield layouts store whole rows padded to 4 bytes
    let pixels_end = matches!(compression, 0 | 3 | 6).then(|| {
        let stride = (u64::from(width) * u64::from(bpp)).div_ceil(32) * 4;
        offset + stride * u64::from(height)
    });
    Ok(BmpHeader {
        width,
        height,
        pixels_end
    })
}

impl FrameDecoder for BmpFrameDecoder {
    fn fourcc(&self) -> FourCC {
        FourCC::BMP
    }

    fn set_quirk(&mut self, _quirk: u32, _value: u64) -> bool {
        false
    }

    fn decode_image_config(&mut self, src: &[u8]) -> Result<ImageConfig, String> {
        let header = read_header(src)?;

        Ok(ImageConfig {
            pixcfg:                PixelConfig::new(
                PixelFormat::RGBA_NONPREMUL,
                PixelSubsampling::NONE,
                header.width,
                header.height
            ),
            first_frame_is_opaque: false
        })
    }

    fn decode_metadata(
        &mut self, _src: &[u8], _flags: ImageDecoderFlags, _max_len: u64
    ) -> Result<Vec<MetadataEntry>, String> {
        Ok(Vec::new())
    }

    fn decode_frame(&mut self, src: &[u8]) -> Result<DecodedFrame, FrameError> {
        let header = read_header(src)?;
        let truncated = header.pixels_end.is_some_and(|end| (src.len() as u64) < end);

        let mut decoder = BmpDecoder::new_with_options(src, options());
        let samples = match decoder.decode() {
            Ok(samples) => samples,
            Err(_) if truncated => return Err(FrameError::truncated("bmp", None)),
            Err(err) => return Err(codec_error("bmp", err).into())
        };
        let (width, height) = decoder
            .get_dimensions()
            .ok_or_else(|| "bmp: missing info header".to_string())?;
        let rgba = expand_to_rgba("bmp", &samples, width, height);

        if truncated {
            let partial = rgba.ok().map(|rgba| DecodedFrame {
                width: width as u32,
                height: height as u32,
                rgba
            });
            return Err(FrameError::truncated("bmp", partial));
        }
        Ok(DecodedFrame {
            width:  width as u32,
            height: height as u32,
            rgba:   rgba?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(info_len: u32, width: i32, height: i32, bpp: u16) -> Vec<u8> {
        let mut out = b"BM".to_vec();
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&54_u32.to_le_bytes());
        out.extend_from_slice(&info_len.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&bpp.to_le_bytes());
        out.extend_from_slice(&0_u32.to_le_bytes());
        out.resize(54, 0);
        out
    }

    #[test]
    fn headers_give_dimensions_and_pixel_extent() {
        let parsed = read_header(&header(40, 3, -2, 24)).unwrap();
        assert_eq!((parsed.width, parsed.height), (3, 2));
        // rows of 9 bytes padded to 12
        assert_eq!(parsed.pixels_end, Some(54 + 24));

        let mut core = b"BM".to_vec();
        core.extend_from_slice(&[0; 8]);
        core.extend_from_slice(&26_u32.to_le_bytes());
        core.extend_from_slice(&12_u32.to_le_bytes());
        core.extend_from_slice(&7_u16.to_le_bytes());
        core.extend_from_slice(&5_u16.to_le_bytes());
        core.extend_from_slice(&1_u16.to_le_bytes());
        core.extend_from_slice(&8_u16.to_le_bytes());
        let parsed = read_header(&core).unwrap();
        assert_eq!((parsed.width, parsed.height), (7, 5));
        assert_eq!(parsed.pixels_end, Some(26 + 8 * 5));
    }

    #[test]
    fn short_or_odd_headers_are_rejected() {
        assert_eq!(
            read_header(b"BM\0\0"),
            Err("decode_image: unexpected end of file".to_string())
        );
        assert_eq!(
            read_header(&header(40, -3, 2, 24)),
            Err("bmp: bad header".to_string())
        );
        assert_eq!(
            read_header(&header(20, 3, 2, 24)),
            Err("bmp: bad header".to_string())
        );
    }

    #[test]
    fn cut_pixel_data_is_truncated_input() {
        let mut src = header(40, 4, 4, 24);
        src.resize(54 + 4 * 12 - 5, 0x7F);
        let err = BmpFrameDecoder.decode_frame(&src).unwrap_err();
        assert_eq!(err.message, "bmp: truncated input");
    }
}
