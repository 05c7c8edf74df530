/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use sluice_core::input::ByteSource;
use sluice_json::engine::{
    DecodeJsonArgs, DecodeJsonOutcome, JsonCallbacks, JsonEngine, StructureFlags
};
use sluice_json::{JsonDecoder, JsonDecoderConfig, JsonDecoderError, JsonDecoderQuirk, JsonValue};

#[derive(Clone, Debug)]
enum Event {
    Int(i64),
    Text(&'static str),
    List,
    Dict,
    Pop,
    /// Stop with this engine error
    Fail(&'static str)
}

/// An engine replaying a fixed list of callbacks
#[derive(Default)]
struct ScriptedEngine {
    events: Vec<Event>,
    runs:   usize
}

impl JsonEngine for ScriptedEngine {
    fn decode_json(
        &mut self, callbacks: &mut dyn JsonCallbacks, _input: &mut dyn ByteSource,
        _args: &DecodeJsonArgs
    ) -> DecodeJsonOutcome {
        self.runs += 1;
        for (position, event) in self.events.iter().enumerate() {
            let status = match event {
                Event::Int(v) => callbacks.append_i64(*v),
                Event::Text(v) => callbacks.append_text_string(v.to_string()),
                Event::List => callbacks.push(StructureFlags::PUSH | StructureFlags::TO_LIST),
                Event::Dict => callbacks.push(StructureFlags::PUSH | StructureFlags::TO_DICT),
                Event::Pop => callbacks.pop(StructureFlags::POP),
                Event::Fail(message) => Err(message.to_string())
            };
            if let Err(message) = status {
                return DecodeJsonOutcome::failed(message, position);
            }
        }
        DecodeJsonOutcome {
            error_message:   String::new(),
            cursor_position: self.events.len() as u64
        }
    }
}

fn scripted(events: Vec<Event>) -> JsonDecoder<ScriptedEngine> {
    let engine = ScriptedEngine { events, runs: 0 };
    JsonDecoder::with_engine(&JsonDecoderConfig::default(), engine)
}

#[test]
fn a_clean_stream_builds_the_tree() {
    use Event::*;
    let mut decoder = scripted(vec![Dict, Text("x"), List, Int(1), Int(2), Pop, Pop]);

    let result = decoder.decode(&[]);
    assert!(result.is_ok(), "{}", result.error_message());
    assert_eq!(result.cursor_position(), 7);

    let map = result.parsed().as_map().unwrap();
    assert_eq!(
        map.get("x"),
        Some(&JsonValue::List(vec![JsonValue::Int(1), JsonValue::Int(2)]))
    );
}

#[test]
fn unbalanced_streams_fail_with_bad_depth() {
    use Event::*;
    // never popped
    let result = scripted(vec![List, List, Pop]).decode(&[]);
    assert_eq!(result.error(), Some(JsonDecoderError::BadDepth));
    assert!(result.parsed().is_null());

    // nothing at all
    let result = scripted(vec![]).decode(&[]);
    assert_eq!(result.error(), Some(JsonDecoderError::BadDepth));
}

#[test]
fn bad_depth_overrides_engine_errors() {
    use Event::*;
    let result = scripted(vec![Fail("json: bad input")]).decode(&[]);
    assert_eq!(result.error_message(), "json decoder: bad depth");

    // with exactly one entry left the engine error stands
    let result = scripted(vec![List, Int(1), Fail("json: bad input")]).decode(&[]);
    assert_eq!(result.error_message(), "json: bad input");
    assert!(result.parsed().is_null());
    assert_eq!(result.cursor_position(), 2);
}

#[test]
fn adapter_errors_stop_the_engine() {
    use Event::*;
    let result = scripted(vec![Dict, Int(1), Int(2), Pop]).decode(&[]);
    assert_eq!(result.error(), Some(JsonDecoderError::NonStringMapKey));

    let result = scripted(vec![Int(1), Int(2)]).decode(&[]);
    assert_eq!(result.error(), Some(JsonDecoderError::NonContainerStackEntry));
}

#[test]
fn reuse_starts_from_an_empty_stack() {
    use Event::*;
    let mut decoder = scripted(vec![List, Int(1), Fail("json: bad input")]);
    assert!(!decoder.decode(&[]).is_ok());

    decoder.engine_mut().events = vec![List, Int(7), Pop];
    let reused = decoder.decode(&[]);
    let fresh = scripted(vec![List, Int(7), Pop]).decode(&[]);
    assert_eq!(reused, fresh);
    assert_eq!(reused.parsed(), &JsonValue::List(vec![JsonValue::Int(7)]));
    assert_eq!(decoder.engine().runs, 2);
}

#[test]
fn missing_files_never_reach_the_engine() {
    let mut decoder = scripted(vec![Event::Int(1)]);
    let result = decoder.decode_file("random123");
    assert_eq!(result.error(), Some(JsonDecoderError::FailedToOpenFile));
    assert!(result.parsed().is_null());
    assert_eq!(decoder.engine().runs, 0);
}

fn decode(src: &[u8]) -> sluice_json::JsonDecodingResult {
    JsonDecoder::new(&JsonDecoderConfig::default()).decode(src)
}

#[test]
fn default_engine_documents() {
    let result = decode(b"[1,2,3]");
    assert_eq!(
        result.parsed(),
        &JsonValue::List(vec![JsonValue::Int(1), JsonValue::Int(2), JsonValue::Int(3)])
    );
    assert_ne!(result.cursor_position(), 0);

    let result = decode(br#"{"x":[]}"#);
    assert_eq!(
        result.parsed().as_map().unwrap().get("x"),
        Some(&JsonValue::List(Vec::new()))
    );

    let result = decode(b"\"just a string\"");
    assert_eq!(result.parsed().as_str(), Some("just a string"));
}

#[test]
fn default_engine_failures() {
    assert_eq!(decode(b"+(=)").error(), Some(JsonDecoderError::BadDepth));
    assert_eq!(decode(b"test").error(), Some(JsonDecoderError::BadDepth));

    let long = format!("{{\"val\":{}}}", "1".repeat(130));
    assert_eq!(
        decode(long.as_bytes()).error(),
        Some(JsonDecoderError::UnsupportedNumberLength)
    );

    let duplicate = decode(br#"{"val": 1, "val": 2}"#);
    assert_eq!(
        duplicate.error_message(),
        "json decoder: duplicate map key: key=val"
    );
    assert!(duplicate.parsed().is_null());

    assert_eq!(decode(b"{1: 2}").error(), Some(JsonDecoderError::BadInput));
    assert_eq!(decode(b"[1, 2").error(), Some(JsonDecoderError::BadInput));
}

#[test]
fn quirks_and_pointers_through_the_adapter() {
    let config = JsonDecoderConfig::default()
        .set_quirk(JsonDecoderQuirk::ALLOW_COMMENT_BLOCK, 1)
        .set_quirk(JsonDecoderQuirk::ALLOW_EXTRA_COMMA, 1);
    let result = JsonDecoder::new(&config).decode(br#"{"test": "value", "test1": 123,}"#);
    let expected: serde_json::Value = serde_json::from_str(r#"{"test": "value", "test1": 123}"#).unwrap();
    assert_eq!(result.parsed(), &JsonValue::from(expected));

    let extra_comma = JsonDecoderConfig::default().set_quirk(JsonDecoderQuirk::ALLOW_EXTRA_COMMA, 1);
    let result = JsonDecoder::new(&extra_comma).decode(b"[1, 2,]");
    assert_eq!(
        result.parsed(),
        &JsonValue::List(vec![JsonValue::Int(1), JsonValue::Int(2)])
    );
    for empty in [&b"[,]"[..], &b"{,}"[..], &b"[1,,]"[..]] {
        let result = JsonDecoder::new(&extra_comma).decode(empty);
        assert!(!result.is_ok(), "{}", String::from_utf8_lossy(empty));
        assert!(result.parsed().is_null());
    }

    let data = br#"{"key1": 1, "key2": [2, 3], "key3": "value"}"#;
    let config = JsonDecoderConfig::default().set_json_pointer("/key2");
    let result = JsonDecoder::new(&config).decode(data);
    assert_eq!(
        result.parsed(),
        &JsonValue::List(vec![JsonValue::Int(2), JsonValue::Int(3)])
    );

    // nothing was appended, so the stack depth check wins
    let config = JsonDecoderConfig::default().set_json_pointer("/random");
    let result = JsonDecoder::new(&config).decode(data);
    assert_eq!(result.error(), Some(JsonDecoderError::BadDepth));
    assert!(result.parsed().is_null());
}
