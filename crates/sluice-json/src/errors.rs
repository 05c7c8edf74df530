/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors that can surface in a JSON decoding result
//!
//! The adapter owns the `json decoder:` messages, the default engine
//! produces the `decode_json:` and `json:` ones.

use core::fmt::{Debug, Display, Formatter};

use sluice_core::errors::ErrorVocabulary;

/// JSON decoding errors with a stable message
#[non_exhaustive]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum JsonDecoderError {
    /// The configured JSON pointer is malformed
    BadJsonPointer,
    /// The JSON pointer selects nothing in the document
    NoMatch,
    /// A key appeared twice in one map, the message ends with the key
    DuplicateMapKey,
    NonStringMapKey,
    /// A value arrived while the top of the stack was not a container
    NonContainerStackEntry,
    /// Decoding did not leave exactly one value behind
    BadDepth,
    /// The input file could not be opened, the engine never ran
    FailedToOpenFile,
    BadC0ControlCode,
    BadUtf8,
    BadBackslashEscape,
    BadInput,
    BadNewLineInAString,
    BadQuirkCombination,
    UnsupportedNumberLength,
    UnsupportedRecursionDepth
}

impl JsonDecoderError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadJsonPointer => "decode_json: bad JSON pointer",
            Self::NoMatch => "decode_json: no match",
            Self::DuplicateMapKey => "json decoder: duplicate map key: key=",
            Self::NonStringMapKey => "json decoder: non-string map key",
            Self::NonContainerStackEntry => "json decoder: non-container stack entry",
            Self::BadDepth => "json decoder: bad depth",
            Self::FailedToOpenFile => "json decoder: failed to open file",
            Self::BadC0ControlCode => "json: bad C0 control code",
            Self::BadUtf8 => "json: bad UTF-8",
            Self::BadBackslashEscape => "json: bad backslash-escape",
            Self::BadInput => "json: bad input",
            Self::BadNewLineInAString => "json: bad new-line in a string",
            Self::BadQuirkCombination => "json: bad quirk combination",
            Self::UnsupportedNumberLength => "json: unsupported number length",
            Self::UnsupportedRecursionDepth => "json: unsupported recursion depth"
        }
    }

    /// The duplicate key message for `key`
    pub fn duplicate_map_key(key: &str) -> String {
        format!("{}{key}", Self::DuplicateMapKey.as_str())
    }
}

impl ErrorVocabulary for JsonDecoderError {
    const ALL: &'static [Self] = &[
        Self::BadJsonPointer,
        Self::NoMatch,
        Self::DuplicateMapKey,
        Self::NonStringMapKey,
        Self::NonContainerStackEntry,
        Self::BadDepth,
        Self::FailedToOpenFile,
        Self::BadC0ControlCode,
        Self::BadUtf8,
        Self::BadBackslashEscape,
        Self::BadInput,
        Self::BadNewLineInAString,
        Self::BadQuirkCombination,
        Self::UnsupportedNumberLength,
        Self::UnsupportedRecursionDepth
    ];

    fn message(self) -> &'static str {
        self.as_str()
    }

    fn has_payload(self) -> bool {
        matches!(self, Self::DuplicateMapKey)
    }
}

impl Debug for JsonDecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{}", self.as_str())
    }
}

impl Display for JsonDecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::error::Error for JsonDecoderError {}

impl From<JsonDecoderError> for String {
    fn from(value: JsonDecoderError) -> Self {
        value.as_str().to_string()
    }
}
