/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors that can surface in an image decoding result
//!
//! Results carry error messages as strings, engine messages
//! outside this vocabulary (e.g `png: bad CRC`) pass through untouched.

use core::fmt::{Debug, Display, Formatter};

use sluice_core::errors::ErrorVocabulary;

/// Image decoding errors with a stable message
#[non_exhaustive]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageDecoderError {
    /// Width or height above the configured inclusive maximum
    MaxInclDimensionExceeded,
    /// A metadata chunk longer than the configured inclusive maximum
    MaxInclMetadataLengthExceeded,
    OutOfMemory,
    UnexpectedEndOfFile,
    /// No enabled decoder recognized the input
    UnsupportedImageFormat,
    UnsupportedMetadata,
    UnsupportedPixelBlend,
    /// The pixel buffer for the image cannot be described or allocated
    UnsupportedPixelConfiguration,
    /// The requested destination pixel format cannot be produced
    UnsupportedPixelFormat,
    /// The input file could not be opened, the engine never ran
    FailedToOpenFile
}

impl ImageDecoderError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaxInclDimensionExceeded => "decode_image: max_incl_dimension exceeded",
            Self::MaxInclMetadataLengthExceeded => {
                "decode_image: max_incl_metadata_length exceeded"
            }
            Self::OutOfMemory => "decode_image: out of memory",
            Self::UnexpectedEndOfFile => "decode_image: unexpected end of file",
            Self::UnsupportedImageFormat => "decode_image: unsupported image format",
            Self::UnsupportedMetadata => "decode_image: unsupported metadata",
            Self::UnsupportedPixelBlend => "decode_image: unsupported pixel blend",
            Self::UnsupportedPixelConfiguration => "decode_image: unsupported pixel configuration",
            Self::UnsupportedPixelFormat => "decode_image: unsupported pixel format",
            Self::FailedToOpenFile => "image decoder: failed to open file"
        }
    }
}

impl ErrorVocabulary for ImageDecoderError {
    const ALL: &'static [Self] = &[
        Self::MaxInclDimensionExceeded,
        Self::MaxInclMetadataLengthExceeded,
        Self::OutOfMemory,
        Self::UnexpectedEndOfFile,
        Self::UnsupportedImageFormat,
        Self::UnsupportedMetadata,
        Self::UnsupportedPixelBlend,
        Self::UnsupportedPixelConfiguration,
        Self::UnsupportedPixelFormat,
        Self::FailedToOpenFile
    ];

    fn message(self) -> &'static str {
        self.as_str()
    }
}

impl Debug for ImageDecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{}", self.as_str())
    }
}

impl Display for ImageDecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::error::Error for ImageDecoderError {}

impl From<ImageDecoderError> for String {
    fn from(value: ImageDecoderError) -> Self {
        value.as_str().to_string()
    }
}
