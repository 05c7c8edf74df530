/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The image decoding adapter

use std::collections::BTreeSet;
use std::path::Path;

use sluice_core::input::{ByteSource, FileInput, MemoryInput};
use sluice_core::log::{debug, trace, warn};

use crate::config::{ImageDecoderConfig, ImageDecoderType};
use crate::engine::{
    select_default_decoder, AllocPixbufResult, DecodeImageArgs, DefaultImageEngine, FrameDecoder,
    ImageCallbacks, ImageConfig, ImageEngine, PixelBuffer
};
use crate::errors::ImageDecoderError;
use crate::fourcc::FourCC;
use crate::metadata::{MetadataEntry, MoreInformation};
use crate::pixel::{PixelConfig, PixelFormat};
use crate::result::ImageDecodingResult;

/// Decodes images into a single [`ImageDecodingResult`].
///
/// The decoder hands itself to an [`ImageEngine`] as the callback sink,
/// gating which formats may be decoded, collecting metadata and owning
/// the pixel buffer the engine writes into.
///
/// A decoder can be reused, every call to [`decode`](Self::decode) or
/// [`decode_file`](Self::decode_file) starts from a clean state and
/// is equivalent to a call on a freshly created decoder.
///
/// # Example
/// ```no_run
/// use sluice_image::{ImageDecoder, ImageDecoderConfig, PixelFormat};
///
/// let config = ImageDecoderConfig::default().set_pixel_format(PixelFormat::RGBA_NONPREMUL);
/// let mut decoder = ImageDecoder::new(&config);
/// let result = decoder.decode_file("image.png");
/// if result.is_ok() {
///     let [height, width, channels] = result.shape();
///     println!("{width}x{height}x{channels}");
/// }
/// ```
pub struct ImageDecoder<E: ImageEngine = DefaultImageEngine> {
    engine:           E,
    args:             DecodeImageArgs,
    enabled_decoders: BTreeSet<ImageDecoderType>,
    pixel_format:     PixelFormat
}

impl ImageDecoder<DefaultImageEngine> {
    /// Create a decoder using the default engine
    pub fn new(config: &ImageDecoderConfig) -> ImageDecoder<DefaultImageEngine> {
        ImageDecoder::with_engine(config, DefaultImageEngine)
    }
}

impl<E: ImageEngine> ImageDecoder<E> {
    /// Create a decoder driving `engine`
    pub fn with_engine(config: &ImageDecoderConfig, engine: E) -> ImageDecoder<E> {
        ImageDecoder {
            engine,
            args: DecodeImageArgs::from_config(config),
            enabled_decoders: config.get_enabled_decoders().clone(),
            pixel_format: config.get_pixel_format()
        }
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Decode an image held in memory
    pub fn decode(&mut self, data: &[u8]) -> ImageDecodingResult {
        let mut input = MemoryInput::new(data);
        self.decode_input(&mut input)
    }

    /// Decode the image stored at `path`.
    ///
    /// A file that cannot be opened gives a result carrying
    /// [`ImageDecoderError::FailedToOpenFile`], the engine is not run.
    pub fn decode_file<P: AsRef<Path>>(&mut self, path: P) -> ImageDecodingResult {
        let path = path.as_ref();
        match FileInput::open(path) {
            Ok(mut input) => self.decode_input(&mut input),
            Err(err) => {
                warn!("Could not open {:?}: {:?}", path, err);
                ImageDecodingResult::with_error(ImageDecoderError::FailedToOpenFile)
            }
        }
    }

    fn decode_input(&mut self, input: &mut dyn ByteSource) -> ImageDecodingResult {
        trace!("Starting image decode");
        let mut sink = ImageSink {
            enabled_decoders:  &self.enabled_decoders,
            pixel_format:      self.pixel_format,
            pixbuf:            Vec::new(),
            reported_metadata: Vec::new()
        };
        let outcome = self.engine.decode_image(&mut sink, input, &self.args);

        let mut result = ImageDecodingResult {
            reported_metadata: sink.reported_metadata,
            error_message: outcome.error_message,
            ..Default::default()
        };

        let pixcfg = outcome.pixcfg;
        let area = u64::from(pixcfg.width()) * u64::from(pixcfg.height());
        let len = pixcfg.pixbuf_len();

        if !pixcfg.is_valid() || area == 0 {
            return result;
        }
        if (sink.pixbuf.len() as u64) < len || len == 0 {
            warn!(
                "Engine reported {:?} but the buffer holds {} bytes, dropping the pixels",
                pixcfg,
                sink.pixbuf.len()
            );
            return result;
        }
        let mut pixbuf = sink.pixbuf;
        pixbuf.truncate(len as usize);

        result.shape = [
            pixcfg.height() as usize,
            pixcfg.width() as usize,
            (len / area) as usize
        ];
        result.pixcfg = pixcfg;
        result.pixbuf = pixbuf;
        result
    }
}

/// Callback sink for a single decode
struct ImageSink<'a> {
    enabled_decoders:  &'a BTreeSet<ImageDecoderType>,
    pixel_format:      PixelFormat,
    pixbuf:            Vec<u8>,
    reported_metadata: Vec<MetadataEntry>
}

impl ImageCallbacks for ImageSink<'_> {
    fn select_decoder(
        &mut self, fourcc: FourCC, prefix: &[u8], prefix_closed: bool
    ) -> Option<Box<dyn FrameDecoder>> {
        let enabled = ImageDecoderType::from_fourcc(fourcc)
            .is_some_and(|decoder| self.enabled_decoders.contains(&decoder));
        if !enabled {
            debug!("Decoder for {:?} is not enabled", fourcc);
            return None;
        }
        select_default_decoder(fourcc, prefix, prefix_closed)
    }

    fn handle_metadata(&mut self, minfo: &MoreInformation, raw: &[u8]) -> Result<(), String> {
        self.reported_metadata
            .push(MetadataEntry::new(*minfo, raw.to_vec()));
        Ok(())
    }

    fn select_pixfmt(&mut self, _image_config: &ImageConfig) -> PixelFormat {
        self.pixel_format
    }

    fn alloc_pixbuf(
        &mut self, image_config: &ImageConfig, allow_uninitialized: bool
    ) -> AllocPixbufResult<'_> {
        let pixcfg: PixelConfig = image_config.pixcfg;
        if pixcfg.width() == 0 || pixcfg.height() == 0 {
            return AllocPixbufResult::NotNeeded;
        }
        let len = match usize::try_from(pixcfg.pixbuf_len()) {
            Ok(len) if len > 0 => len,
            _ => {
                return AllocPixbufResult::Error(
                    ImageDecoderError::UnsupportedPixelConfiguration.into()
                )
            }
        };
        debug!(
            "Allocating {} bytes for {:?} (uninitialized allowed: {})",
            len, pixcfg, allow_uninitialized
        );
        self.pixbuf = Vec::new();
        if self.pixbuf.try_reserve_exact(len).is_err() {
            return AllocPixbufResult::Error(ImageDecoderError::OutOfMemory.into());
        }
        self.pixbuf.resize(len, 0);

        if let Err(message) = PixelBuffer::validate(&pixcfg, self.pixbuf.len()) {
            self.pixbuf = Vec::new();
            return AllocPixbufResult::Error(message);
        }
        match PixelBuffer::from_slice(&pixcfg, &mut self.pixbuf) {
            Ok(pixbuf) => AllocPixbufResult::Buffer(pixbuf),
            Err(message) => AllocPixbufResult::Error(message)
        }
    }
}
