/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! JSON decoding adapter
//!
//! This crate folds the token callbacks of a push-style JSON engine into a
//! single [`JsonDecodingResult`] holding the decoded [`JsonValue`], an error
//! message and the byte offset where decoding stopped.
//!
//! The engine is pluggable via the [`JsonEngine`](engine::JsonEngine) trait,
//! the default [`SerdeJsonEngine`](engine::SerdeJsonEngine) parses with
//! serde_json and supports JSON pointers and a subset of the quirks.
//!
//! # Example
//! ```
//! use sluice_json::{JsonDecoder, JsonDecoderConfig, JsonDecoderError, JsonDecoderQuirk};
//!
//! let config = JsonDecoderConfig::default().set_quirk(JsonDecoderQuirk::ALLOW_EXTRA_COMMA, 1);
//! let mut decoder = JsonDecoder::new(&config);
//!
//! let result = decoder.decode(b"[1, 2, 3,]");
//! assert_eq!(result.parsed().as_list().map(|l| l.len()), Some(3));
//!
//! let result = decoder.decode(br#"{"a": 1, "a": 2}"#);
//! assert_eq!(result.error(), Some(JsonDecoderError::DuplicateMapKey));
//! assert!(result.parsed().is_null());
//! ```
//!
//! # Features
//! - `log`: forward logging to the `log` crate
//! - `serde-support`: serialize configuration and result types
pub use config::{JsonDecoderConfig, JsonDecoderQuirk};
pub use decoder::JsonDecoder;
pub use errors::JsonDecoderError;
pub use result::JsonDecodingResult;
pub use value::{JsonMap, JsonValue};

mod config;
mod decoder;
pub mod engine;
mod errors;
mod result;
#[cfg(feature = "serde-support")]
mod serde;
mod value;
