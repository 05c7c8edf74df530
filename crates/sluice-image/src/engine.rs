/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The push-style decode engine an [`ImageDecoder`](crate::ImageDecoder) drives.
//!
//! An engine pulls bytes from a [`ByteSource`] and calls back into an
//! [`ImageCallbacks`] implementation at each decision point, which decoder
//! to use, what metadata was found, which pixel format to produce and
//! where to put the pixels.
//!
//! [`DefaultImageEngine`] is the engine adapters use unless told
//! otherwise, it recognizes formats by their magic bytes and
//! delegates pixel decoding to the zune codecs.

use sluice_core::input::ByteSource;
use sluice_core::log::{debug, trace};
use sluice_core::quirks::{convert_quirks, QuirkKeyValuePair};

use crate::config::{is_valid_background_color, ImageDecoderConfig, ImageDecoderFlags, PixelBlend};
use crate::errors::ImageDecoderError;
use crate::fourcc::FourCC;
use crate::metadata::{MetadataEntry, MoreInformation};
use crate::pixel::{PixelConfig, PixelFormat};

#[cfg(feature = "bmp")]
mod bmp;
#[cfg(feature = "jpeg")]
mod jpeg;
#[cfg(feature = "png")]
mod png;
mod sniff;
mod swizzle;

pub use sniff::guess_fourcc;
pub use swizzle::is_supported_destination;

/// Image level configuration, as read from the image header
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageConfig {
    /// Dimensions and the pixel format a decoder natively produces
    pub pixcfg:                PixelConfig,
    /// Whether the first frame covers the whole image with opaque pixels
    pub first_frame_is_opaque: bool
}

/// A pixel configuration paired with memory to decode into
pub struct PixelBuffer<'a> {
    pixcfg: PixelConfig,
    data:   &'a mut [u8]
}

impl<'a> PixelBuffer<'a> {
    /// Describe `data` as holding pixels laid out according to `pixcfg`
    ///
    /// # Errors
    /// - The configuration is invalid or planar
    /// - `data` is shorter than [`PixelConfig::pixbuf_len`]
    pub fn from_slice(pixcfg: &PixelConfig, data: &'a mut [u8]) -> Result<PixelBuffer<'a>, String> {
        PixelBuffer::validate(pixcfg, data.len())?;
        Ok(PixelBuffer {
            pixcfg: *pixcfg,
            data
        })
    }

    /// Check that `len` bytes can hold pixels laid out according to `pixcfg`,
    /// the same checks [`from_slice`](Self::from_slice) does
    pub fn validate(pixcfg: &PixelConfig, len: usize) -> Result<(), String> {
        if !pixcfg.is_valid() {
            return Err("pixel buffer: bad argument".to_string());
        }
        if pixcfg.pixel_format().is_planar() {
            return Err("pixel buffer: unsupported option".to_string());
        }
        let needed = pixcfg.pixbuf_len();
        if (len as u64) < needed {
            return Err(format!(
                "pixel buffer: bad argument length, {needed} bytes needed but {len} given"
            ));
        }
        Ok(())
    }

    pub const fn pixcfg(&self) -> &PixelConfig {
        &self.pixcfg
    }

    /// Number of bytes between the start of two rows
    pub fn stride(&self) -> usize {
        self.pixcfg.stride() as usize
    }

    pub fn data(&self) -> &[u8] {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }
}

/// Outcome of [`ImageCallbacks::alloc_pixbuf`]
pub enum AllocPixbufResult<'a> {
    /// The image has no pixels, there is nothing to decode into
    NotNeeded,
    /// Decode into this buffer
    Buffer(PixelBuffer<'a>),
    /// Allocation failed, decoding stops with this message
    Error(String)
}

/// A decoder for a single image format.
///
/// The engine owns one of these for the duration of a decode.
pub trait FrameDecoder {
    /// The format this decoder handles
    fn fourcc(&self) -> FourCC;

    /// Enable a quirk, returns whether the decoder recognized it.
    ///
    /// Unrecognized quirks are ignored
    fn set_quirk(&mut self, quirk: u32, value: u64) -> bool;

    /// Read the image header
    fn decode_image_config(&mut self, src: &[u8]) -> Result<ImageConfig, String>;

    /// Collect the metadata chunks of kinds enabled in `flags`, in file order.
    ///
    /// `max_len` is the inclusive limit on a single chunk's payload,
    /// compressed payloads must stop inflating once they grow past it.
    fn decode_metadata(
        &mut self, src: &[u8], flags: ImageDecoderFlags, max_len: u64
    ) -> Result<Vec<MetadataEntry>, String>;

    /// Decode the first frame into non-premultiplied RGBA samples
    fn decode_frame(&mut self, src: &[u8]) -> Result<DecodedFrame, FrameError>;
}

/// Pixels of a decoded frame, non-premultiplied RGBA with 8 bits per channel
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    pub width:  u32,
    pub height: u32,
    pub rgba:   Vec<u8>
}

/// Why a frame stopped decoding.
///
/// `partial` carries the pixels recovered before the failure, if any,
/// e.g the rows preceding the point where a file was cut short.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameError {
    pub message: String,
    pub partial: Option<DecodedFrame>
}

impl FrameError {
    /// The input ended before the frame did
    pub fn truncated(codec: &str, partial: Option<DecodedFrame>) -> FrameError {
        FrameError {
            message: format!("{codec}: truncated input"),
            partial
        }
    }
}

impl From<String> for FrameError {
    fn from(message: String) -> Self {
        FrameError {
            message,
            partial: None
        }
    }
}

/// Hooks an engine calls back into while decoding.
///
/// Calls are synchronous, in order, and all happen inside
/// [`ImageEngine::decode_image`].
pub trait ImageCallbacks {
    /// Pick a decoder for the detected format.
    ///
    /// `prefix` holds the leading input bytes the format was detected from,
    /// `prefix_closed` whether they are all the input there is.
    /// Returning `None` rejects the input as unsupported.
    fn select_decoder(
        &mut self, fourcc: FourCC, prefix: &[u8], prefix_closed: bool
    ) -> Option<Box<dyn FrameDecoder>> {
        select_default_decoder(fourcc, prefix, prefix_closed)
    }

    /// Receive one metadata chunk, an error stops decoding
    fn handle_metadata(&mut self, minfo: &MoreInformation, raw: &[u8]) -> Result<(), String> {
        let _ = (minfo, raw);
        Ok(())
    }

    /// Choose the pixel format to decode into
    fn select_pixfmt(&mut self, image_config: &ImageConfig) -> PixelFormat {
        let _ = image_config;
        PixelFormat::BGRA_PREMUL
    }

    /// Provide memory for the pixels.
    ///
    /// `allow_uninitialized` is true when the engine will overwrite
    /// every byte itself, e.g by filling a background color.
    fn alloc_pixbuf(
        &mut self, image_config: &ImageConfig, allow_uninitialized: bool
    ) -> AllocPixbufResult<'_>;
}

/// The decoders linked into this build, for formats that have one.
///
/// Returns `None` for formats without a codec.
pub fn select_default_decoder(
    fourcc: FourCC, _prefix: &[u8], _prefix_closed: bool
) -> Option<Box<dyn FrameDecoder>> {
    match fourcc {
        #[cfg(feature = "png")]
        FourCC::PNG => Some(Box::<png::PngFrameDecoder>::default()),
        #[cfg(feature = "jpeg")]
        FourCC::JPEG => Some(Box::<jpeg::JpegFrameDecoder>::default()),
        #[cfg(feature = "bmp")]
        FourCC::BMP => Some(Box::<bmp::BmpFrameDecoder>::default()),
        _ => None
    }
}

/// Arguments an engine decodes with, fixed for the lifetime of an adapter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeImageArgs {
    pub quirks:                   Vec<QuirkKeyValuePair>,
    pub flags:                    ImageDecoderFlags,
    pub pixel_blend:              PixelBlend,
    pub background_color:         u32,
    pub max_incl_dimension:       u32,
    pub max_incl_metadata_length: u64
}

impl DecodeImageArgs {
    pub fn from_config(config: &ImageDecoderConfig) -> DecodeImageArgs {
        DecodeImageArgs {
            quirks:                   convert_quirks(config.get_quirks().iter().map(|q| (*q, 1))),
            flags:                    config.get_flags(),
            pixel_blend:              config.get_pixel_blend(),
            background_color:         config.get_background_color(),
            max_incl_dimension:       config.get_max_incl_dimension(),
            max_incl_metadata_length: config.get_max_incl_metadata_length()
        }
    }
}

impl Default for DecodeImageArgs {
    fn default() -> Self {
        DecodeImageArgs::from_config(&ImageDecoderConfig::default())
    }
}

/// What an engine hands back once decoding stops.
///
/// `pixcfg` describes the buffer pixels were decoded into, it is null
/// when no buffer was ever handed out. A valid `pixcfg` together with
/// a non-empty `error_message` means the pixels are only partially decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeImageOutcome {
    pub pixcfg:        PixelConfig,
    pub error_message: String
}

impl DecodeImageOutcome {
    pub fn failed<S: Into<String>>(message: S) -> DecodeImageOutcome {
        DecodeImageOutcome {
            pixcfg:        PixelConfig::null(),
            error_message: message.into()
        }
    }
}

/// A push-style image decoder
pub trait ImageEngine {
    /// Decode the image in `input`, calling back into `callbacks`
    fn decode_image(
        &mut self, callbacks: &mut dyn ImageCallbacks, input: &mut dyn ByteSource,
        args: &DecodeImageArgs
    ) -> DecodeImageOutcome;
}

/// Decodes images with the zune codecs.
///
/// Formats are recognized from their leading bytes, see [`guess_fourcc`].
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultImageEngine;

impl ImageEngine for DefaultImageEngine {
    fn decode_image(
        &mut self, callbacks: &mut dyn ImageCallbacks, input: &mut dyn ByteSource,
        args: &DecodeImageArgs
    ) -> DecodeImageOutcome {
        let mut src = Vec::new();
        if let Err(err) = input.read_to_end(&mut src) {
            return DecodeImageOutcome::failed(format!("decode_image: {err}"));
        }
        trace!("Read {} bytes of image input", src.len());

        let Some(fourcc) = guess_fourcc(&src) else {
            return DecodeImageOutcome::failed(ImageDecoderError::UnsupportedImageFormat);
        };
        debug!("Input looks like {:?}", fourcc);

        let prefix = &src[..src.len().min(sniff::PREFIX_LEN)];
        let prefix_closed = prefix.len() == src.len();
        let Some(mut decoder) = callbacks.select_decoder(fourcc, prefix, prefix_closed) else {
            return DecodeImageOutcome::failed(ImageDecoderError::UnsupportedImageFormat);
        };
        for quirk in &args.quirks {
            if !decoder.set_quirk(quirk.key, quirk.value) {
                trace!("Decoder ignored quirk {}", quirk.key);
            }
        }

        let image_config = match decoder.decode_image_config(&src) {
            Ok(config) => config,
            Err(message) => return DecodeImageOutcome::failed(message)
        };

        if !args.flags.is_empty() {
            let max_len = args.max_incl_metadata_length;
            let entries = match decoder.decode_metadata(&src, args.flags, max_len) {
                Ok(entries) => entries,
                Err(message) => return DecodeImageOutcome::failed(message)
            };
            for entry in entries {
                if entry.data.len() as u64 > max_len {
                    return DecodeImageOutcome::failed(
                        ImageDecoderError::MaxInclMetadataLengthExceeded
                    );
                }
                if let Err(message) = callbacks.handle_metadata(&entry.minfo, &entry.data) {
                    return DecodeImageOutcome::failed(message);
                }
            }
        }

        let (width, height) = (image_config.pixcfg.width(), image_config.pixcfg.height());
        if width > args.max_incl_dimension || height > args.max_incl_dimension {
            return DecodeImageOutcome::failed(ImageDecoderError::MaxInclDimensionExceeded);
        }

        let pixel_format = callbacks.select_pixfmt(&image_config);
        if !is_supported_destination(pixel_format) {
            return DecodeImageOutcome::failed(ImageDecoderError::UnsupportedPixelFormat);
        }
        let image_config = ImageConfig {
            pixcfg: image_config.pixcfg.with_pixel_format(pixel_format),
            ..image_config
        };

        let fill_background = is_valid_background_color(args.background_color);
        let mut pixbuf = match callbacks.alloc_pixbuf(&image_config, fill_background) {
            AllocPixbufResult::NotNeeded => return DecodeImageOutcome::default(),
            AllocPixbufResult::Error(message) => return DecodeImageOutcome::failed(message),
            AllocPixbufResult::Buffer(pixbuf) => pixbuf
        };
        let pixcfg = *pixbuf.pixcfg();

        if fill_background {
            swizzle::fill(&mut pixbuf, args.background_color);
        }

        let error_message = match decoder.decode_frame(&src) {
            Ok(frame) => {
                swizzle::blit(&frame, &mut pixbuf, args.pixel_blend);
                String::new()
            }
            Err(FrameError { message, partial }) => {
                debug!("Frame decoding failed after allocation: {}", message);
                if let Some(frame) = partial {
                    swizzle::blit(&frame, &mut pixbuf, args.pixel_blend);
                }
                message
            }
        };

        DecodeImageOutcome {
            pixcfg,
            error_message
        }
    }
}

/// Format a codec error the way engine messages look, `png: ...`
///
/// The zune errors describe themselves through `Debug`, often as a
/// quoted string followed by a newline.
#[allow(dead_code)]
pub(crate) fn codec_error<E: core::fmt::Debug>(codec: &str, err: E) -> String {
    let described = format!("{err:?}");
    let text = described.trim_end().trim_matches('"');
    format!("{codec}: {text}")
}

/// Expand interleaved samples of `components` channels to RGBA
#[allow(dead_code)]
pub(crate) fn expand_to_rgba(
    codec: &str, samples: &[u8], width: usize, height: usize
) -> Result<Vec<u8>, String> {
    let pixels = width * height;
    if pixels == 0 {
        return Ok(Vec::new());
    }
    let components = samples.len() / pixels;
    if components * pixels != samples.len() {
        return Err(format!("{codec}: unexpected sample count"));
    }
    let mut rgba = Vec::with_capacity(pixels * 4);
    match components {
        1 => samples.iter().for_each(|l| rgba.extend_from_slice(&[*l, *l, *l, 255])),
        2 => samples
            .chunks_exact(2)
            .for_each(|la| rgba.extend_from_slice(&[la[0], la[0], la[0], la[1]])),
        3 => samples
            .chunks_exact(3)
            .for_each(|rgb| rgba.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255])),
        4 => rgba.extend_from_slice(samples),
        _ => return Err(format!("{codec}: unsupported component count {components}"))
    }
    Ok(rgba)
}
