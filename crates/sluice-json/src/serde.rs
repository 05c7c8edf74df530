/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use serde::ser::*;

use crate::config::{JsonDecoderConfig, JsonDecoderQuirk};
use crate::result::JsonDecodingResult;

impl Serialize for JsonDecoderQuirk {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for JsonDecoderConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("JsonDecoderConfig", 2)?;
        state.serialize_field("quirks", self.get_quirks())?;
        state.serialize_field("json_pointer", self.get_json_pointer())?;
        state.end()
    }
}

impl Serialize for JsonDecodingResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("JsonDecodingResult", 3)?;
        state.serialize_field("parsed", self.parsed())?;
        state.serialize_field("error_message", self.error_message())?;
        state.serialize_field("cursor_position", &self.cursor_position())?;
        state.end()
    }
}
