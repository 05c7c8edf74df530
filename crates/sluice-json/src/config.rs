/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! JSON decoder options
#![allow(non_camel_case_types)]

use std::collections::BTreeMap;

use sluice_core::quirks::Quirk;

const QUIRK_BASE: u32 = 1_225_364_480;

/// Quirks relaxing or tightening what the engine accepts
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonDecoderQuirk {
    ALLOW_ASCII_CONTROL_CODES = QUIRK_BASE,
    ALLOW_BACKSLASH_A = QUIRK_BASE + 1,
    ALLOW_BACKSLASH_CAPITAL_U = QUIRK_BASE + 2,
    ALLOW_BACKSLASH_E = QUIRK_BASE + 3,
    ALLOW_BACKSLASH_NEW_LINE = QUIRK_BASE + 4,
    ALLOW_BACKSLASH_QUESTION_MARK = QUIRK_BASE + 5,
    ALLOW_BACKSLASH_SINGLE_QUOTE = QUIRK_BASE + 6,
    ALLOW_BACKSLASH_V = QUIRK_BASE + 7,
    ALLOW_BACKSLASH_X_AS_CODE_POINTS = QUIRK_BASE + 8,
    ALLOW_BACKSLASH_ZERO = QUIRK_BASE + 9,
    /// `/* ... */` comments
    ALLOW_COMMENT_BLOCK = QUIRK_BASE + 10,
    /// `// ...` comments running to the end of the line
    ALLOW_COMMENT_LINE = QUIRK_BASE + 11,
    /// A comma after the last element of a list or map
    ALLOW_EXTRA_COMMA = QUIRK_BASE + 12,
    ALLOW_INF_NAN_NUMBERS = QUIRK_BASE + 13,
    /// A 0x1E byte before the value, as in RFC 7464 JSON text sequences
    ALLOW_LEADING_ASCII_RECORD_SEPARATOR = QUIRK_BASE + 14,
    ALLOW_LEADING_UNICODE_BYTE_ORDER_MARK = QUIRK_BASE + 15,
    /// Consume whitespace and comments after the value
    ALLOW_TRAILING_FILLER = QUIRK_BASE + 16,
    /// The value must be followed by a new line or the end of the input
    EXPECT_TRAILING_NEW_LINE_OR_EOF = QUIRK_BASE + 17,
    /// Accept `~n`, `~r` and `~t` escapes in the JSON pointer
    JSON_POINTER_ALLOW_TILDE_N_TILDE_R_TILDE_T = QUIRK_BASE + 18,
    /// Replace invalid UTF-8 with U+FFFD instead of failing
    REPLACE_INVALID_UNICODE = QUIRK_BASE + 19
}

impl JsonDecoderQuirk {
    pub const ALL: [JsonDecoderQuirk; 20] = [
        JsonDecoderQuirk::ALLOW_ASCII_CONTROL_CODES,
        JsonDecoderQuirk::ALLOW_BACKSLASH_A,
        JsonDecoderQuirk::ALLOW_BACKSLASH_CAPITAL_U,
        JsonDecoderQuirk::ALLOW_BACKSLASH_E,
        JsonDecoderQuirk::ALLOW_BACKSLASH_NEW_LINE,
        JsonDecoderQuirk::ALLOW_BACKSLASH_QUESTION_MARK,
        JsonDecoderQuirk::ALLOW_BACKSLASH_SINGLE_QUOTE,
        JsonDecoderQuirk::ALLOW_BACKSLASH_V,
        JsonDecoderQuirk::ALLOW_BACKSLASH_X_AS_CODE_POINTS,
        JsonDecoderQuirk::ALLOW_BACKSLASH_ZERO,
        JsonDecoderQuirk::ALLOW_COMMENT_BLOCK,
        JsonDecoderQuirk::ALLOW_COMMENT_LINE,
        JsonDecoderQuirk::ALLOW_EXTRA_COMMA,
        JsonDecoderQuirk::ALLOW_INF_NAN_NUMBERS,
        JsonDecoderQuirk::ALLOW_LEADING_ASCII_RECORD_SEPARATOR,
        JsonDecoderQuirk::ALLOW_LEADING_UNICODE_BYTE_ORDER_MARK,
        JsonDecoderQuirk::ALLOW_TRAILING_FILLER,
        JsonDecoderQuirk::EXPECT_TRAILING_NEW_LINE_OR_EOF,
        JsonDecoderQuirk::JSON_POINTER_ALLOW_TILDE_N_TILDE_R_TILDE_T,
        JsonDecoderQuirk::REPLACE_INVALID_UNICODE
    ];

    pub fn from_id(id: u32) -> Option<JsonDecoderQuirk> {
        JsonDecoderQuirk::ALL.iter().copied().find(|q| q.id() == id)
    }
}

impl Quirk for JsonDecoderQuirk {
    fn id(self) -> u32 {
        self as u32
    }
}

/// JSON decoder options
///
/// The options are a snapshot, a [`JsonDecoder`](crate::JsonDecoder)
/// copies what it needs when it is created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsonDecoderConfig {
    /// Quirks and their values, quirks without a payload use 1
    ///
    /// - Default value: empty
    quirks:       BTreeMap<JsonDecoderQuirk, u64>,
    /// RFC 6901 pointer to the part of the document to decode
    ///
    /// - Default value: empty, the whole document
    json_pointer: String
}

impl JsonDecoderConfig {
    pub const fn get_quirks(&self) -> &BTreeMap<JsonDecoderQuirk, u64> {
        &self.quirks
    }

    /// Replace all quirks
    pub fn set_quirks(mut self, quirks: BTreeMap<JsonDecoderQuirk, u64>) -> Self {
        self.quirks = quirks;
        self
    }

    /// Set a single quirk, replacing its previous value
    pub fn set_quirk(mut self, quirk: JsonDecoderQuirk, value: u64) -> Self {
        self.quirks.insert(quirk, value);
        self
    }

    pub fn get_json_pointer(&self) -> &str {
        &self.json_pointer
    }

    pub fn set_json_pointer<S: Into<String>>(mut self, pointer: S) -> Self {
        self.json_pointer = pointer.into();
        self
    }
}
