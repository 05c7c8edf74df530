/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The push-style JSON engine a [`JsonDecoder`](crate::JsonDecoder) drives.
//!
//! An engine reads a document from a [`ByteSource`] and reports it as a
//! stream of calls on [`JsonCallbacks`], scalars are appended and containers
//! are bracketed by a push and a pop.
//!
//! [`SerdeJsonEngine`] is the default engine, it parses with serde_json.

use bitflags::bitflags;
use serde::de::DeserializeSeed;
use serde_json::error::Category;
use sluice_core::input::ByteSource;
use sluice_core::log::{debug, trace};
use sluice_core::quirks::{convert_quirks, QuirkKeyValuePair};

use crate::config::{JsonDecoderConfig, JsonDecoderQuirk};
use crate::errors::JsonDecoderError;

mod lexer;
mod pointer;
mod pump;

bitflags! {
    /// Describes a container transition on push and pop
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StructureFlags: u32 {
        const PUSH      = 0x0001;
        const POP       = 0x0002;
        /// Leaving, or pushing from, the top level
        const FROM_NONE = 0x0010;
        const FROM_LIST = 0x0020;
        const FROM_DICT = 0x0040;
        /// Returning to the top level
        const TO_NONE   = 0x1000;
        const TO_LIST   = 0x2000;
        const TO_DICT   = 0x4000;
    }
}

/// Hooks an engine calls back into while decoding.
///
/// Map keys are reported through [`append_text_string`](Self::append_text_string)
/// right before their value. Returning an error stops decoding, the
/// message ends up in the result verbatim.
pub trait JsonCallbacks {
    fn append_null(&mut self) -> Result<(), String>;

    fn append_bool(&mut self, value: bool) -> Result<(), String>;

    fn append_i64(&mut self, value: i64) -> Result<(), String>;

    fn append_f64(&mut self, value: f64) -> Result<(), String>;

    fn append_text_string(&mut self, value: String) -> Result<(), String>;

    /// A list (`TO_LIST`) or map (`TO_DICT`) starts
    fn push(&mut self, flags: StructureFlags) -> Result<(), String>;

    /// The innermost open container ends
    fn pop(&mut self, flags: StructureFlags) -> Result<(), String>;
}

/// Arguments an engine decodes with, fixed for the lifetime of an adapter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeJsonArgs {
    pub quirks:       Vec<QuirkKeyValuePair>,
    pub json_pointer: String
}

impl DecodeJsonArgs {
    pub fn from_config(config: &JsonDecoderConfig) -> DecodeJsonArgs {
        DecodeJsonArgs {
            quirks:       convert_quirks(config.get_quirks().iter().map(|(q, v)| (*q, *v))),
            json_pointer: config.get_json_pointer().to_string()
        }
    }
}

/// What an engine hands back once decoding stops
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeJsonOutcome {
    pub error_message:   String,
    /// Byte offset where decoding stopped
    pub cursor_position: u64
}

impl DecodeJsonOutcome {
    pub fn failed<S: Into<String>>(message: S, cursor_position: usize) -> DecodeJsonOutcome {
        DecodeJsonOutcome {
            error_message:   message.into(),
            cursor_position: cursor_position as u64
        }
    }
}

/// A push-style JSON decoder
pub trait JsonEngine {
    /// Decode the document in `input`, calling back into `callbacks`
    fn decode_json(
        &mut self, callbacks: &mut dyn JsonCallbacks, input: &mut dyn ByteSource,
        args: &DecodeJsonArgs
    ) -> DecodeJsonOutcome;
}

/// Quirks resolved into switches
#[derive(Copy, Clone, Debug, Default)]
struct EngineOptions {
    lex:                      lexer::LexOptions,
    trailing_filler:          bool,
    expect_trailing_new_line: bool,
    pointer_tilde_nrt:        bool
}

impl EngineOptions {
    /// Quirks with a zero value are off, unknown quirk keys are ignored.
    ///
    /// Quirks that change how strings, escapes or numbers are lexed
    /// cannot be honored and fail with a bad quirk combination.
    fn from_quirks(quirks: &[QuirkKeyValuePair]) -> Result<EngineOptions, JsonDecoderError> {
        let mut options = EngineOptions::default();

        for pair in quirks.iter().filter(|pair| pair.value != 0) {
            let Some(quirk) = JsonDecoderQuirk::from_id(pair.key) else {
                trace!("Ignoring unknown quirk {}", pair.key);
                continue;
            };
            match quirk {
                JsonDecoderQuirk::ALLOW_COMMENT_BLOCK => options.lex.comment_block = true,
                JsonDecoderQuirk::ALLOW_COMMENT_LINE => options.lex.comment_line = true,
                JsonDecoderQuirk::ALLOW_EXTRA_COMMA => options.lex.extra_comma = true,
                JsonDecoderQuirk::ALLOW_LEADING_ASCII_RECORD_SEPARATOR => {
                    options.lex.leading_separator = true
                }
                JsonDecoderQuirk::ALLOW_LEADING_UNICODE_BYTE_ORDER_MARK => {
                    options.lex.leading_byte_order_mark = true
                }
                JsonDecoderQuirk::REPLACE_INVALID_UNICODE => {
                    options.lex.replace_invalid_unicode = true
                }
                JsonDecoderQuirk::ALLOW_TRAILING_FILLER => options.trailing_filler = true,
                JsonDecoderQuirk::EXPECT_TRAILING_NEW_LINE_OR_EOF => {
                    options.expect_trailing_new_line = true
                }
                JsonDecoderQuirk::JSON_POINTER_ALLOW_TILDE_N_TILDE_R_TILDE_T => {
                    options.pointer_tilde_nrt = true
                }
                unsupported => {
                    debug!("Quirk {:?} is not supported", unsupported);
                    return Err(JsonDecoderError::BadQuirkCombination);
                }
            }
        }
        Ok(options)
    }
}

/// Decodes JSON with serde_json.
///
/// Values are streamed to the callbacks as serde_json visits them, the
/// document is never materialized by the engine. Numbers longer than
/// 99 bytes are rejected, integers beyond 64 bits are reported as floats.
/// Like a pull parser, decoding stops after the first top-level value,
/// trailing bytes are only looked at when a quirk asks for it.
#[derive(Copy, Clone, Debug, Default)]
pub struct SerdeJsonEngine;

impl JsonEngine for SerdeJsonEngine {
    fn decode_json(
        &mut self, callbacks: &mut dyn JsonCallbacks, input: &mut dyn ByteSource,
        args: &DecodeJsonArgs
    ) -> DecodeJsonOutcome {
        let mut src = Vec::new();
        if let Err(err) = input.read_to_end(&mut src) {
            return DecodeJsonOutcome::failed(format!("decode_json: {err}"), 0);
        }
        let options = match EngineOptions::from_quirks(&args.quirks) {
            Ok(options) => options,
            Err(err) => return DecodeJsonOutcome::failed(err, 0)
        };
        let tokens = match pointer::parse_pointer(&args.json_pointer, options.pointer_tilde_nrt) {
            Ok(tokens) => tokens,
            Err(err) => return DecodeJsonOutcome::failed(err, 0)
        };
        trace!("Decoding {} bytes of JSON, pointer {:?}", src.len(), args.json_pointer);

        let prepared = lexer::prepare(&src, &options.lex);
        let bytes = &prepared.bytes;

        let mut sink = pump::Sink::new(callbacks);
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        let walk = pump::PointerSeed {
            sink:   &mut sink,
            tokens: &tokens
        }
        .deserialize(&mut deserializer);

        if let Err(err) = walk {
            let position = error_offset(bytes, &err);
            if let Some(failure) = sink.failure.take() {
                return DecodeJsonOutcome::failed(failure, position);
            }
            if let (Some(stop), Category::Eof) = (prepared.stop, err.classify()) {
                return DecodeJsonOutcome::failed(stop.error, stop.position);
            }
            debug!("serde_json stopped with {}", err);
            return DecodeJsonOutcome::failed(classify_error(&err), position);
        }

        let mut cursor = lexer::value_end(bytes);
        if !tokens.is_empty() && !sink.matched {
            return DecodeJsonOutcome::failed(JsonDecoderError::NoMatch, cursor);
        }
        if options.trailing_filler {
            cursor = lexer::skip_whitespace(bytes, cursor);
        }
        if options.expect_trailing_new_line {
            let rest = bytes[cursor..]
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t' | b'\r'))
                .count();
            let after = cursor + rest;
            match (bytes.get(after), prepared.stop) {
                (Some(b'\n'), _) => cursor = after + 1,
                (None, None) => cursor = after,
                (None, Some(stop)) => return DecodeJsonOutcome::failed(stop.error, stop.position),
                (Some(_), _) => return DecodeJsonOutcome::failed(JsonDecoderError::BadInput, after)
            }
        }
        DecodeJsonOutcome {
            error_message:   String::new(),
            cursor_position: cursor as u64
        }
    }
}

/// Map a serde_json error onto the `json:` messages
fn classify_error(err: &serde_json::Error) -> JsonDecoderError {
    if err.classify() == Category::Eof {
        return JsonDecoderError::BadInput;
    }
    let text = err.to_string();
    if text.contains("recursion limit exceeded") {
        JsonDecoderError::UnsupportedRecursionDepth
    } else if text.contains("control character") {
        JsonDecoderError::BadC0ControlCode
    } else if text.contains("escape") || text.contains("unicode code point") || text.contains("surrogate")
    {
        JsonDecoderError::BadBackslashEscape
    } else if text.contains("number out of range") {
        JsonDecoderError::UnsupportedNumberLength
    } else {
        JsonDecoderError::BadInput
    }
}

/// Byte offset of the line and column serde_json reports
fn error_offset(bytes: &[u8], err: &serde_json::Error) -> usize {
    if err.line() == 0 {
        return 0;
    }
    let line_start: usize = bytes
        .split_inclusive(|b| *b == b'\n')
        .take(err.line() - 1)
        .map(<[u8]>::len)
        .sum();
    (line_start + err.column()).min(bytes.len())
}
