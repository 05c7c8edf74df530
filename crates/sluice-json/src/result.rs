/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use sluice_core::errors::ErrorVocabulary;

use crate::errors::JsonDecoderError;
use crate::value::JsonValue;

/// Everything a single JSON decode call produced.
///
/// `parsed` is [`JsonValue::Null`] whenever the error message is non-empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonDecodingResult {
    pub(crate) parsed:          JsonValue,
    pub(crate) error_message:   String,
    pub(crate) cursor_position: u64
}

impl JsonDecodingResult {
    pub(crate) fn with_error(error: JsonDecoderError) -> JsonDecodingResult {
        JsonDecodingResult {
            error_message: error.into(),
            ..Default::default()
        }
    }

    /// The decoded document, or the part the JSON pointer selected
    pub const fn parsed(&self) -> &JsonValue {
        &self.parsed
    }

    pub fn into_parsed(self) -> JsonValue {
        self.parsed
    }

    /// Error text, empty when nothing went wrong
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Byte offset in the input where the engine stopped
    pub const fn cursor_position(&self) -> u64 {
        self.cursor_position
    }

    /// The error as a typed variant, `None` on success
    pub fn error(&self) -> Option<JsonDecoderError> {
        JsonDecoderError::classify(&self.error_message)
    }

    pub fn is_ok(&self) -> bool {
        self.error_message.is_empty()
    }
}
