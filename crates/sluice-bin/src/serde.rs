/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A decoding result tagged with the file it came from
pub struct Summary<'a, R: Serialize> {
    file:   OsString,
    result: &'a R
}

impl<'a, R: Serialize> Summary<'a, R> {
    pub fn new(file: OsString, result: &'a R) -> Summary<'a, R> {
        Summary { file, result }
    }
}

impl<'a, R: Serialize> Serialize for Summary<'a, R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("Summary", 2)?;

        state.serialize_field("file", &self.file.to_string_lossy())?;
        state.serialize_field("result", &self.result)?;

        state.end()
    }
}
