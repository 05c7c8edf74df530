/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PNG decoding via zune-png, metadata via a walk over the chunk list

use zune_core::options::DecoderOptions;
use zune_inflate::errors::DecodeErrorStatus;
use zune_inflate::{DeflateDecoder, DeflateOptions};
use zune_png::PngDecoder;

use crate::config::{ImageDecoderFlags, ImageDecoderQuirk};
use crate::engine::{
    codec_error, expand_to_rgba, DecodedFrame, FrameDecoder, FrameError, ImageConfig
};
use crate::errors::ImageDecoderError;
use crate::fourcc::FourCC;
use crate::metadata::{MetadataEntry, MoreInformation};
use crate::pixel::{PixelConfig, PixelFormat, PixelSubsampling};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

#[derive(Default)]
pub(crate) struct PngFrameDecoder {
    ignore_checksum: bool
}

impl PngFrameDecoder {
    fn options(&self) -> DecoderOptions {
        DecoderOptions::default()
            .set_max_width(u32::MAX as usize)
            .set_max_height(u32::MAX as usize)
            .png_set_confirm_crc(!self.ignore_checksum)
            .inflate_set_confirm_adler(!self.ignore_checksum)
            .png_set_strip_to_8bit(true)
    }
}

impl FrameDecoder for PngFrameDecoder {
    fn fourcc(&self) -> FourCC {
        FourCC::PNG
    }

    fn set_quirk(&mut self, quirk: u32, value: u64) -> bool {
        if quirk == ImageDecoderQuirk::IGNORE_CHECKSUM as u32 {
            self.ignore_checksum = value != 0;
            return true;
        }
        false
    }

    fn decode_image_config(&mut self, src: &[u8]) -> Result<ImageConfig, String> {
        // IHDR must come first, nothing past it is needed
        let ihdr = match Chunks::new(src).next() {
            Some(Ok(chunk)) => chunk,
            None | Some(Err(_)) => return Err(ImageDecoderError::UnexpectedEndOfFile.into())
        };
        if &ihdr.name != b"IHDR" || ihdr.data.len() != 13 {
            return Err("png: bad IHDR chunk".to_string());
        }
        let (width, height) = (be_u32(&ihdr.data[0..4]), be_u32(&ihdr.data[4..8]));
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err("png: bad IHDR chunk".to_string());
        }

        // the native layout, callers pick the destination format later
        Ok(ImageConfig {
            pixcfg:                PixelConfig::new(
                PixelFormat::RGBA_NONPREMUL,
                PixelSubsampling::NONE,
                width,
                height
            ),
            first_frame_is_opaque: false
        })
    }

    fn decode_metadata(
        &mut self, src: &[u8], flags: ImageDecoderFlags, max_len: u64
    ) -> Result<Vec<MetadataEntry>, String> {
        let mut entries = Vec::new();
        for chunk in Chunks::new(src) {
            let chunk = chunk?;
            if let Some(entry) = chunk_metadata(&chunk, flags, max_len)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn decode_frame(&mut self, src: &[u8]) -> Result<DecodedFrame, FrameError> {
        let truncated = !reaches_iend(src);

        let mut decoder = PngDecoder::new_with_options(src, self.options());
        let samples = match decoder.decode_raw() {
            Ok(samples) => samples,
            Err(_) if truncated => return Err(FrameError::truncated("png", None)),
            Err(err) => return Err(codec_error("png", err).into())
        };
        let (width, height) = decoder
            .get_dimensions()
            .ok_or_else(|| "png: missing IHDR chunk".to_string())?;
        let rgba = expand_to_rgba("png", &samples, width, height);

        if truncated {
            // the codec pads what it could not read, keep the rows it did
            let partial = rgba.ok().map(|rgba| DecodedFrame {
                width: width as u32,
                height: height as u32,
                rgba
            });
            return Err(FrameError::truncated("png", partial));
        }
        Ok(DecodedFrame {
            width:  width as u32,
            height: height as u32,
            rgba:   rgba?
        })
    }
}

/// Whether the chunk walk gets to IEND without running out of input
fn reaches_iend(src: &[u8]) -> bool {
    Chunks::new(src).any(|chunk| matches!(chunk, Ok(chunk) if &chunk.name == b"IEND"))
}

/// A chunk and where its payload sits in the file
struct Chunk<'a> {
    name:  [u8; 4],
    data:  &'a [u8],
    start: usize
}

/// Iterator over the chunks of a PNG file, stops after IEND
struct Chunks<'a> {
    src:      &'a [u8],
    position: usize,
    done:     bool
}

impl<'a> Chunks<'a> {
    fn new(src: &'a [u8]) -> Chunks<'a> {
        let done = !src.starts_with(&PNG_SIGNATURE);
        Chunks {
            src,
            position: PNG_SIGNATURE.len(),
            done
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>, String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.position >= self.src.len() {
            return None;
        }
        let header = self.src.get(self.position..self.position + 8);
        let Some(header) = header else {
            self.done = true;
            return Some(Err("png: truncated chunk header".to_string()));
        };
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let name = [header[4], header[5], header[6], header[7]];
        let start = self.position + 8;

        let Some(data) = self.src.get(start..start + length) else {
            self.done = true;
            return Some(Err("png: truncated chunk".to_string()));
        };
        // skip the crc as well
        self.position = start + length + 4;
        self.done = &name == b"IEND";

        Some(Ok(Chunk { name, data, start }))
    }
}

/// Inflate a zlib stream, giving up once the output grows past `max_len`
fn inflate(data: &[u8], what: &str, max_len: u64) -> Result<Vec<u8>, String> {
    let limit = usize::try_from(max_len).unwrap_or(usize::MAX);
    let options = DeflateOptions::default().set_limit(limit);

    DeflateDecoder::new_with_options(data, options)
        .decode_zlib()
        .map_err(|err| match err.error {
            DecodeErrorStatus::OutputLimitExceeded(..) => {
                ImageDecoderError::MaxInclMetadataLengthExceeded.into()
            }
            _ => format!("png: bad {what} chunk (bad zlib data)")
        })
}

fn latin1_to_utf8(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| char::from(*b)).collect::<String>().into_bytes()
}

fn split_nul(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let nul = data.iter().position(|b| *b == 0)?;
    Some((&data[..nul], &data[nul + 1..]))
}

/// Key-value pairs are reported as `key \0 value`, UTF-8 encoded
fn text_metadata(chunk: &Chunk<'_>, max_len: u64) -> Result<Vec<u8>, String> {
    let bad = || format!("png: bad {} chunk", String::from_utf8_lossy(&chunk.name));
    let (key, rest) = split_nul(chunk.data).ok_or_else(bad)?;

    let value = match &chunk.name {
        b"tEXt" => latin1_to_utf8(rest),
        b"zTXt" => {
            let (_method, compressed) = rest.split_first().ok_or_else(bad)?;
            latin1_to_utf8(&inflate(compressed, "zTXt", max_len)?)
        }
        _ => {
            // iTXt: compression flag, method, language tag, translated key, text
            let [compressed, _method, rest @ ..] = rest else {
                return Err(bad());
            };
            let (_language, rest) = split_nul(rest).ok_or_else(bad)?;
            let (_translated, text) = split_nul(rest).ok_or_else(bad)?;
            if *compressed == 1 {
                inflate(text, "iTXt", max_len)?
            } else {
                text.to_vec()
            }
        }
    };
    let mut kvp = latin1_to_utf8(key);
    kvp.push(0);
    kvp.extend_from_slice(&value);
    Ok(kvp)
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn chunk_metadata(
    chunk: &Chunk<'_>, flags: ImageDecoderFlags, max_len: u64
) -> Result<Option<MetadataEntry>, String> {
    let range = |fourcc| {
        MoreInformation::raw_passthrough(fourcc, chunk.start as u64, (chunk.start + chunk.data.len()) as u64)
    };
    let passthrough = |fourcc| Some(MetadataEntry::new(range(fourcc), chunk.data.to_vec()));

    let entry = match &chunk.name {
        b"eXIf" if flags.reports(FourCC::EXIF) => passthrough(FourCC::EXIF),
        b"bKGD" if flags.reports(FourCC::BGCL) => passthrough(FourCC::BGCL),
        b"tIME" if flags.reports(FourCC::MTIM) => passthrough(FourCC::MTIM),
        b"oFFs" if flags.reports(FourCC::OFS2) => passthrough(FourCC::OFS2),
        b"pHYs" if flags.reports(FourCC::PHYD) => passthrough(FourCC::PHYD),
        b"iCCP" if flags.reports(FourCC::ICCP) => {
            let (_name, rest) = split_nul(chunk.data).ok_or("png: bad iCCP chunk")?;
            let (_method, compressed) = rest.split_first().ok_or("png: bad iCCP chunk")?;
            let profile = inflate(compressed, "iCCP", max_len)?;
            Some(MetadataEntry::new(MoreInformation::raw_transform(FourCC::ICCP), profile))
        }
        b"tEXt" | b"zTXt" | b"iTXt" if flags.reports(FourCC::KVP) => Some(MetadataEntry::new(
            MoreInformation::raw_transform(FourCC::KVP),
            text_metadata(chunk, max_len)?
        )),
        b"gAMA" if flags.reports(FourCC::GAMA) => {
            if chunk.data.len() != 4 {
                return Err("png: bad gAMA chunk".to_string());
            }
            Some(MetadataEntry::new(MoreInformation::parsed_gama(be_u32(chunk.data)), Vec::new()))
        }
        b"cHRM" if flags.reports(FourCC::CHRM) => {
            if chunk.data.len() != 32 {
                return Err("png: bad cHRM chunk".to_string());
            }
            let mut components = [0_u32; 8];
            for (value, bytes) in components.iter_mut().zip(chunk.data.chunks_exact(4)) {
                *value = be_u32(bytes);
            }
            Some(MetadataEntry::new(MoreInformation::parsed_chrm(components), Vec::new()))
        }
        b"sRGB" if flags.reports(FourCC::SRGB) => {
            let [intent] = chunk.data else {
                return Err("png: bad sRGB chunk".to_string());
            };
            Some(MetadataEntry::new(MoreInformation::parsed_srgb(*intent), Vec::new()))
        }
        _ => None
    };
    Ok(entry)
}
