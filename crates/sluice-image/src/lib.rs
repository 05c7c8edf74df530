/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Image decoding adapter
//!
//! This crate turns a push-style, callback driven image decode into a
//! single [`ImageDecodingResult`] holding
//!
//! - The pixel configuration and a buffer with the decoded pixels
//! - The metadata chunks the engine reported, in order
//! - An error message, which may accompany partially decoded pixels
//!
//! The engine is pluggable via the [`ImageEngine`](engine::ImageEngine) trait,
//! the default one recognizes BMP, GIF, JPEG, NIE, PNG, TGA and WBMP
//! files by their leading bytes and decodes the formats that have a codec
//! linked in.
//!
//! # Example
//! ```no_run
//! use sluice_image::{ImageDecoder, ImageDecoderConfig, ImageDecoderFlags};
//!
//! let config = ImageDecoderConfig::default().set_flags(ImageDecoderFlags::REPORT_METADATA_EXIF);
//! let mut decoder = ImageDecoder::new(&config);
//! let result = decoder.decode(&std::fs::read("image.png").unwrap());
//!
//! println!("{:?} {:?}", result.shape(), result.error_message());
//! for entry in result.reported_metadata() {
//!     println!("{:?}: {} bytes", entry.minfo.flavor, entry.data.len());
//! }
//! ```
//!
//! # Features
//! - `png`, `jpeg`, `bmp`: link the respective zune codec into the default engine
//! - `all`: all of the above, enabled by default
//! - `log`: forward logging to the `log` crate
//! - `serde`: serialize configuration and metadata types
pub use config::{
    is_valid_background_color, ImageDecoderConfig, ImageDecoderFlags, ImageDecoderQuirk,
    ImageDecoderType, PixelBlend, DEFAULT_BACKGROUND_COLOR
};
pub use decoder::ImageDecoder;
pub use errors::ImageDecoderError;
pub use fourcc::FourCC;
pub use metadata::{MetadataEntry, MoreInformation, MoreInformationFlavor};
pub use pixel::{PixelConfig, PixelFormat, PixelSubsampling};
pub use result::ImageDecodingResult;

mod config;
mod decoder;
pub mod engine;
mod errors;
mod fourcc;
mod metadata;
mod pixel;
mod result;
#[cfg(feature = "serde")]
mod serde;
