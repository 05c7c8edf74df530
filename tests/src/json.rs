/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::read;
use std::path::{Path, PathBuf};

use sluice_json::{JsonDecoder, JsonDecoderConfig, JsonDecoderQuirk, JsonValue};

use crate::{sample_path, JsonTestEntry};

pub fn json_path() -> PathBuf {
    sample_path().join("test-data/json")
}

fn manifest() -> Vec<JsonTestEntry> {
    let file = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/json.json");
    let json_file = read(file).unwrap();
    serde_json::from_slice(&json_file).unwrap()
}

fn config_for(entry: &JsonTestEntry) -> JsonDecoderConfig {
    let mut config = JsonDecoderConfig::default();
    for name in &entry.quirks {
        let quirk = JsonDecoderQuirk::ALL
            .iter()
            .copied()
            .find(|q| format!("{q:?}").eq_ignore_ascii_case(name))
            .unwrap_or_else(|| panic!("unknown quirk {name}"));
        config = config.set_quirk(quirk, 1);
    }
    if let Some(pointer) = &entry.pointer {
        config = config.set_json_pointer(pointer.as_str());
    }
    config
}

#[test]
#[allow(clippy::uninlined_format_args)]
fn test_json() {
    let default_path = json_path();
    let mut error = false;
    let mut files = Vec::new();

    for entry in manifest() {
        let file_name = default_path.join(&entry.name);
        let result = JsonDecoder::new(&config_for(&entry)).decode_file(&file_name);

        let expected_error = entry.error.as_deref().unwrap_or("");
        let mut mismatch = result.error_message() != expected_error;

        if let Some(expected) = &entry.expected {
            mismatch |= result.parsed() != &JsonValue::from(expected.clone());
        }
        if expected_error.is_empty() {
            // a successful decode always moves the cursor
            mismatch |= result.cursor_position() == 0;
        } else {
            mismatch |= !result.parsed().is_null();
        }

        if mismatch {
            error = true;
            let err = format!(
                "Mismatch for file {:?}\nExpected error {:?} but found {:?}\nParsed:{:?}\nConfig:{:#?}",
                file_name,
                expected_error,
                result.error_message(),
                result.parsed(),
                entry
            );
            eprintln!("{}\n", err);
            files.push(entry);
        }
    }
    if error {
        panic!("Errors found during test decoding\n {:#?}", files);
    }
}

#[test]
fn files_decode_like_bytes() {
    let mut decoder = JsonDecoder::new(&JsonDecoderConfig::default());

    for entry in manifest().iter().filter(|e| e.quirks.is_empty() && e.pointer.is_none()) {
        let file_name = json_path().join(&entry.name);
        let from_file = decoder.decode_file(&file_name);
        let from_bytes = decoder.decode(&read(&file_name).unwrap());
        assert_eq!(from_file, from_bytes, "{:?}", file_name);
    }
}

#[test]
fn decoders_are_idempotent() {
    let config = JsonDecoderConfig::default();
    let mut reused = JsonDecoder::new(&config);

    for entry in manifest() {
        let data = read(json_path().join(&entry.name)).unwrap();
        let first = reused.decode(&data);
        let second = reused.decode(&data);
        let fresh = JsonDecoder::new(&config).decode(&data);

        assert_eq!(first, second, "{}", entry.name);
        assert_eq!(first, fresh, "{}", entry.name);
    }
}
