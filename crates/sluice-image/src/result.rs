/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The value an image decode produces

use sluice_core::errors::ErrorVocabulary;

use crate::errors::ImageDecoderError;
use crate::metadata::MetadataEntry;
use crate::pixel::PixelConfig;

/// Everything a single decode call produced.
///
/// The pixel buffer is non-empty exactly when the pixel configuration is valid.
/// The error message is independent of both, an engine can fail half way
/// through the pixel data, leaving a valid configuration, a partially
/// filled buffer and a non-empty error.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImageDecodingResult {
    pub(crate) pixcfg:            PixelConfig,
    pub(crate) pixbuf:            Vec<u8>,
    pub(crate) shape:             [usize; 3],
    pub(crate) reported_metadata: Vec<MetadataEntry>,
    pub(crate) error_message:     String
}

impl ImageDecodingResult {
    pub(crate) fn with_error(error: ImageDecoderError) -> ImageDecodingResult {
        ImageDecodingResult {
            error_message: error.into(),
            ..Default::default()
        }
    }

    /// Pixel configuration of the decoded image, null when there is none
    pub const fn pixcfg(&self) -> &PixelConfig {
        &self.pixcfg
    }

    /// Decoded pixels, row major
    pub fn pixbuf(&self) -> &[u8] {
        &self.pixbuf
    }

    /// Take the pixel buffer out of the result
    pub fn into_pixbuf(self) -> Vec<u8> {
        self.pixbuf
    }

    /// Shape of the pixel buffer as `[height, width, bytes per pixel]`.
    ///
    /// All zeroes when there is no image
    pub const fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Metadata in the order the engine reported it
    pub fn reported_metadata(&self) -> &[MetadataEntry] {
        &self.reported_metadata
    }

    /// Error text, empty when nothing went wrong
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// The error as a typed variant.
    ///
    /// `None` both on success and for engine messages outside
    /// the [`ImageDecoderError`] vocabulary, check
    /// [`error_message`](Self::error_message) to tell those apart.
    pub fn error(&self) -> Option<ImageDecoderError> {
        ImageDecoderError::classify(&self.error_message)
    }

    /// Whether the decode finished without an error
    pub fn is_ok(&self) -> bool {
        self.error_message.is_empty()
    }
}
