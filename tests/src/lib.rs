/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(unused_imports, unused)]

use std::path::{Path, PathBuf};

use serde::Deserialize;
use xxhash_rust::xxh3::xxh3_128;

mod fixtures;
mod image;
mod json;

/// One document listed in `tests/json.json`
#[derive(Clone, Deserialize, Debug)]
pub struct JsonTestEntry {
    pub name:     String,
    /// Expected error message, absent when the document must decode
    pub error:    Option<String>,
    /// Quirk names, e.g `allow_extra_comma`
    #[serde(default)]
    pub quirks:   Vec<String>,
    pub pointer:  Option<String>,
    /// Expected value, compared when present
    pub expected: Option<serde_json::Value>,
    pub comment:  Option<String>
}

pub fn sample_path() -> PathBuf {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"));
    // get parent path
    path.parent().unwrap().to_owned()
}

fn hash(contents: &[u8]) -> u128 {
    xxh3_128(contents)
}
