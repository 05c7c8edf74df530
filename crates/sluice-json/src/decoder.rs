/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The JSON decoding adapter

use std::path::Path;

use sluice_core::input::{ByteSource, FileInput, MemoryInput};
use sluice_core::log::{trace, warn};

use crate::config::JsonDecoderConfig;
use crate::engine::{DecodeJsonArgs, JsonCallbacks, JsonEngine, SerdeJsonEngine, StructureFlags};
use crate::errors::JsonDecoderError;
use crate::result::JsonDecodingResult;
use crate::value::{JsonMap, JsonValue};

/// Decodes JSON documents into a [`JsonValue`] tree.
///
/// The decoder hands a container stack to a [`JsonEngine`] as the callback
/// sink, folding the token stream into a single value.
/// Every call starts from an empty stack, reusing a decoder is the same
/// as creating a new one.
///
/// # Example
/// ```
/// use sluice_json::{JsonDecoder, JsonDecoderConfig, JsonValue};
///
/// let config = JsonDecoderConfig::default().set_json_pointer("/b/1");
/// let mut decoder = JsonDecoder::new(&config);
///
/// let result = decoder.decode(br#"{"a": 1, "b": [true, "second"]}"#);
/// assert!(result.is_ok());
/// assert_eq!(result.parsed(), &JsonValue::String("second".to_string()));
/// ```
pub struct JsonDecoder<E: JsonEngine = SerdeJsonEngine> {
    engine: E,
    args:   DecodeJsonArgs
}

impl JsonDecoder<SerdeJsonEngine> {
    /// Create a decoder using the default engine
    pub fn new(config: &JsonDecoderConfig) -> JsonDecoder<SerdeJsonEngine> {
        JsonDecoder::with_engine(config, SerdeJsonEngine)
    }
}

impl<E: JsonEngine> JsonDecoder<E> {
    /// Create a decoder driving `engine`
    pub fn with_engine(config: &JsonDecoderConfig, engine: E) -> JsonDecoder<E> {
        JsonDecoder {
            engine,
            args: DecodeJsonArgs::from_config(config)
        }
    }

    pub const fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Decode a document held in memory
    pub fn decode(&mut self, data: &[u8]) -> JsonDecodingResult {
        let mut input = MemoryInput::new(data);
        self.decode_input(&mut input)
    }

    /// Decode the document stored at `path`.
    ///
    /// A file that cannot be opened gives a result carrying
    /// [`JsonDecoderError::FailedToOpenFile`], the engine is not run.
    pub fn decode_file<P: AsRef<Path>>(&mut self, path: P) -> JsonDecodingResult {
        let path = path.as_ref();
        match FileInput::open(path) {
            Ok(mut input) => self.decode_input(&mut input),
            Err(err) => {
                warn!("Could not open {:?}: {:?}", path, err);
                JsonDecodingResult::with_error(JsonDecoderError::FailedToOpenFile)
            }
        }
    }

    fn decode_input(&mut self, input: &mut dyn ByteSource) -> JsonDecodingResult {
        trace!("Starting JSON decode");
        let mut stack = ContainerStack::default();
        let outcome = self.engine.decode_json(&mut stack, input, &self.args);

        let mut error_message = outcome.error_message;
        if stack.depth() != 1 {
            if !error_message.is_empty() {
                trace!("Replacing {:?}, {} entries left", error_message, stack.depth());
            }
            error_message = JsonDecoderError::BadDepth.into();
        }
        let parsed = match stack.into_root() {
            Some(root) if error_message.is_empty() => root,
            _ => JsonValue::Null
        };
        JsonDecodingResult {
            parsed,
            error_message,
            cursor_position: outcome.cursor_position
        }
    }
}

/// An in-progress value on the stack
enum Entry {
    List(Vec<JsonValue>),
    /// A map and the key waiting for its value
    Map(JsonMap, Option<String>),
    /// A finished value
    Value(JsonValue)
}

impl Entry {
    fn into_value(self) -> JsonValue {
        match self {
            Entry::List(values) => JsonValue::List(values),
            Entry::Map(map, _) => JsonValue::Map(map),
            Entry::Value(value) => value
        }
    }
}

/// Folds the callback stream into a value, one entry per open container
#[derive(Default)]
struct ContainerStack {
    entries: Vec<Entry>
}

impl ContainerStack {
    fn depth(&self) -> usize {
        self.entries.len()
    }

    /// The bottom entry, if it is the only one
    fn into_root(mut self) -> Option<JsonValue> {
        if self.entries.len() != 1 {
            return None;
        }
        self.entries.pop().map(Entry::into_value)
    }

    fn append(&mut self, value: JsonValue) -> Result<(), String> {
        let Some(top) = self.entries.last_mut() else {
            self.entries.push(Entry::Value(value));
            return Ok(());
        };
        match top {
            Entry::List(values) => {
                values.push(value);
                Ok(())
            }
            Entry::Map(map, pending) => match pending.take() {
                Some(key) => {
                    if map.contains_key(&key) {
                        return Err(JsonDecoderError::duplicate_map_key(&key));
                    }
                    map.try_insert(key, value);
                    Ok(())
                }
                None => match value {
                    JsonValue::String(key) => {
                        *pending = Some(key);
                        Ok(())
                    }
                    _ => Err(JsonDecoderError::NonStringMapKey.into())
                }
            },
            Entry::Value(_) => Err(JsonDecoderError::NonContainerStackEntry.into())
        }
    }
}

impl JsonCallbacks for ContainerStack {
    fn append_null(&mut self) -> Result<(), String> {
        self.append(JsonValue::Null)
    }

    fn append_bool(&mut self, value: bool) -> Result<(), String> {
        self.append(JsonValue::Bool(value))
    }

    fn append_i64(&mut self, value: i64) -> Result<(), String> {
        self.append(JsonValue::Int(value))
    }

    fn append_f64(&mut self, value: f64) -> Result<(), String> {
        self.append(JsonValue::Float(value))
    }

    fn append_text_string(&mut self, value: String) -> Result<(), String> {
        self.append(JsonValue::String(value))
    }

    fn push(&mut self, flags: StructureFlags) -> Result<(), String> {
        if flags.contains(StructureFlags::TO_LIST) {
            self.entries.push(Entry::List(Vec::new()));
        } else if flags.contains(StructureFlags::TO_DICT) {
            self.entries.push(Entry::Map(JsonMap::new(), None));
        } else {
            return Err("json decoder: bad push".to_string());
        }
        Ok(())
    }

    fn pop(&mut self, _flags: StructureFlags) -> Result<(), String> {
        match self.entries.pop() {
            Some(entry) => self.append(entry.into_value()),
            None => Err("json decoder: bad pop".to_string())
        }
    }
}
