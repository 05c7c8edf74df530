/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! JPEG decoding via zune-jpeg, metadata from the APPn segments

use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

use crate::config::ImageDecoderFlags;
use crate::engine::{
    codec_error, expand_to_rgba, DecodedFrame, FrameDecoder, FrameError, ImageConfig
};
use crate::fourcc::FourCC;
use crate::metadata::{MetadataEntry, MoreInformation};
use crate::pixel::{PixelConfig, PixelFormat, PixelSubsampling};

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const ICC_HEADER: &[u8] = b"ICC_PROFILE\0";

#[derive(Default)]
pub(crate) struct JpegFrameDecoder;

fn options() -> DecoderOptions {
    DecoderOptions::default()
        .set_max_width(u32::MAX as usize)
        .set_max_height(u32::MAX as usize)
        .jpeg_set_out_colorspace(ColorSpace::RGBA)
}

impl FrameDecoder for JpegFrameDecoder {
    fn fourcc(&self) -> FourCC {
        FourCC::JPEG
    }

    fn set_quirk(&mut self, _quirk: u32, _value: u64) -> bool {
        false
    }

    fn decode_image_config(&mut self, src: &[u8]) -> Result<ImageConfig, String> {
        let mut decoder = JpegDecoder::new_with_options(src, options());
        decoder
            .decode_headers()
            .map_err(|err| codec_error("jpeg", err))?;
        let (width, height) = decoder
            .dimensions()
            .ok_or_else(|| "jpeg: missing SOF segment".to_string())?;

        Ok(ImageConfig {
            pixcfg:                PixelConfig::new(
                PixelFormat::RGBA_NONPREMUL,
                PixelSubsampling::NONE,
                width as u32,
                height as u32
            ),
            first_frame_is_opaque: true
        })
    }

    fn decode_metadata(
        &mut self, src: &[u8], flags: ImageDecoderFlags, _max_len: u64
    ) -> Result<Vec<MetadataEntry>, String> {
        let mut entries = Vec::new();
        let mut icc_parts: Vec<(u8, &[u8])> = Vec::new();

        for segment in Segments::new(src) {
            let (marker, start, payload) = segment?;
            match marker {
                0xE1 if payload.starts_with(EXIF_HEADER) && flags.reports(FourCC::EXIF) => {
                    let start = start + EXIF_HEADER.len();
                    entries.push(MetadataEntry::new(
                        MoreInformation::raw_passthrough(
                            FourCC::EXIF,
                            start as u64,
                            (start + payload.len() - EXIF_HEADER.len()) as u64
                        ),
                        payload[EXIF_HEADER.len()..].to_vec()
                    ));
                }
                0xE1 if payload.starts_with(XMP_HEADER) && flags.reports(FourCC::XMP) => {
                    let start = start + XMP_HEADER.len();
                    entries.push(MetadataEntry::new(
                        MoreInformation::raw_passthrough(
                            FourCC::XMP,
                            start as u64,
                            (start + payload.len() - XMP_HEADER.len()) as u64
                        ),
                        payload[XMP_HEADER.len()..].to_vec()
                    ));
                }
                0xE2 if payload.starts_with(ICC_HEADER) && flags.reports(FourCC::ICCP) => {
                    // sequence number and count follow the header
                    let rest = &payload[ICC_HEADER.len()..];
                    let [sequence, _count, profile @ ..] = rest else {
                        return Err("jpeg: bad ICC_PROFILE segment".to_string());
                    };
                    icc_parts.push((*sequence, profile));
                }
                _ => {}
            }
        }
        if !icc_parts.is_empty() {
            icc_parts.sort_by_key(|(sequence, _)| *sequence);
            let profile = icc_parts.iter().flat_map(|(_, part)| part.iter().copied()).collect();
            entries.push(MetadataEntry::new(MoreInformation::raw_transform(FourCC::ICCP), profile));
        }
        Ok(entries)
    }

    fn decode_frame(&mut self, src: &[u8]) -> Result<DecodedFrame, FrameError> {
        let mut decoder = JpegDecoder::new_with_options(src, options());
        let samples = match decoder.decode() {
            Ok(samples) => samples,
            Err(_) if !has_end_of_image(src) => return Err(FrameError::truncated("jpeg", None)),
            Err(err) => return Err(codec_error("jpeg", err).into())
        };
        let (width, height) = decoder
            .dimensions()
            .ok_or_else(|| "jpeg: missing SOF segment".to_string())?;
        let (width, height) = (width as usize, height as usize);

        Ok(DecodedFrame {
            width:  width as u32,
            height: height as u32,
            rgba:   expand_to_rgba("jpeg", &samples, width, height)?
        })
    }
}

fn has_end_of_image(src: &[u8]) -> bool {
    src.windows(2).rev().any(|marker| marker == [0xFF, 0xD9])
}

/// Iterator over the marker segments before the first scan.
///
/// Yields the marker, the file offset of the payload and the payload.
struct Segments<'a> {
    src:      &'a [u8],
    position: usize,
    done:     bool
}

impl<'a> Segments<'a> {
    fn new(src: &'a [u8]) -> Segments<'a> {
        Segments {
            src,
            // skip SOI
            position: 2,
            done: !src.starts_with(&[0xFF, 0xD8])
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<(u8, usize, &'a [u8]), String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(header) = self.src.get(self.position..self.position + 4) else {
                self.done = true;
                return None;
            };
            let (prefix, marker) = (header[0], header[1]);
            if prefix != 0xFF {
                self.done = true;
                return Some(Err("jpeg: bad marker".to_string()));
            }
            // fill bytes
            if marker == 0xFF {
                self.position += 1;
                continue;
            }
            // start of scan, nothing but entropy coded data follows
            if marker == 0xDA || marker == 0xD9 {
                self.done = true;
                return None;
            }
            let length = usize::from(u16::from_be_bytes([header[2], header[3]]));
            if length < 2 {
                self.done = true;
                return Some(Err("jpeg: bad segment length".to_string()));
            }
            let start = self.position + 4;
            let Some(payload) = self.src.get(start..start + length - 2) else {
                self.done = true;
                return Some(Err("jpeg: truncated segment".to_string()));
            };
            self.position = start + length - 2;
            return Some(Ok((marker, start, payload)));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, marker];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn exif_and_split_icc_profiles_are_collected() {
        let mut src = vec![0xFF, 0xD8];
        src.extend(segment(0xE0, b"JFIF\0"));
        src.extend(segment(0xE2, &[ICC_HEADER, &[2, 2][..], &b"world"[..]].concat()));
        src.extend(segment(0xE1, &[EXIF_HEADER, &b"MM\0*"[..]].concat()));
        src.extend(segment(0xE2, &[ICC_HEADER, &[1, 2][..], &b"hello "[..]].concat()));
        src.extend_from_slice(&[0xFF, 0xDA, 0, 2]);
        src.extend(segment(0xE1, &[EXIF_HEADER, &b"ignored"[..]].concat()));

        let flags = ImageDecoderFlags::REPORT_METADATA_EXIF | ImageDecoderFlags::REPORT_METADATA_ICCP;
        let entries = JpegFrameDecoder.decode_metadata(&src, flags, u64::MAX).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].minfo.metadata_fourcc(), FourCC::EXIF.0);
        assert_eq!(entries[0].data, b"MM\0*");
        let (start, end) = entries[0].minfo.metadata_raw_passthrough_range();
        assert_eq!(&src[start as usize..end as usize], b"MM\0*");

        assert_eq!(entries[1].minfo.metadata_fourcc(), FourCC::ICCP.0);
        assert_eq!(entries[1].data, b"hello world");
    }

    #[test]
    fn unrequested_segments_are_skipped() {
        let mut src = vec![0xFF, 0xD8];
        src.extend(segment(0xE1, &[EXIF_HEADER, &b"MM\0*"[..]].concat()));
        let entries = JpegFrameDecoder
            .decode_metadata(&src, ImageDecoderFlags::REPORT_METADATA_XMP, u64::MAX)
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn failing_without_an_end_marker_is_truncated_input() {
        let mut src = vec![0xFF, 0xD8];
        src.extend(segment(0xE0, b"JFIF\0"));
        src.extend_from_slice(&[0xFF, 0xC0, 0, 17, 8]);
        let err = JpegFrameDecoder.decode_frame(&src).unwrap_err();
        assert_eq!(err.message, "jpeg: truncated input");
        assert!(err.partial.is_none());
    }
}
