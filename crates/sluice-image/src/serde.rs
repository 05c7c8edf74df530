/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use serde::ser::*;

use crate::config::{ImageDecoderConfig, ImageDecoderFlags, ImageDecoderQuirk, ImageDecoderType, PixelBlend};
use crate::fourcc::FourCC;
use crate::metadata::{MetadataEntry, MoreInformation, MoreInformationFlavor};
use crate::pixel::{PixelConfig, PixelFormat, PixelSubsampling};
use crate::result::ImageDecodingResult;

macro_rules! serialize_as_debug {
    ($($ty:ty),+) => {
        $(
            impl Serialize for $ty {
                #[allow(clippy::uninlined_format_args)]
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer
                {
                    serializer.serialize_str(&format!("{:?}", self))
                }
            }
        )+
    };
}

serialize_as_debug!(
    FourCC,
    PixelFormat,
    PixelSubsampling,
    PixelBlend,
    ImageDecoderType,
    ImageDecoderQuirk,
    MoreInformationFlavor
);

impl Serialize for ImageDecoderFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut seq = serializer.serialize_seq(Some(self.iter().count()))?;
        for (name, _) in self.iter_names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl Serialize for PixelConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("PixelConfig", 4)?;
        state.serialize_field("pixel_format", &self.pixel_format())?;
        state.serialize_field("pixel_subsampling", &self.pixel_subsampling())?;
        state.serialize_field("width", &self.width())?;
        state.serialize_field("height", &self.height())?;
        state.end()
    }
}

impl Serialize for MoreInformation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("MoreInformation", 5)?;
        state.serialize_field("flavor", &self.flavor)?;
        state.serialize_field("w", &FourCC(self.w))?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("y", &self.y)?;
        state.serialize_field("z", &self.z)?;
        state.end()
    }
}

impl Serialize for MetadataEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("MetadataEntry", 2)?;
        state.serialize_field("minfo", &self.minfo)?;
        state.serialize_field("length", &self.data.len())?;
        state.end()
    }
}

impl Serialize for ImageDecoderConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ImageDecoderConfig", 8)?;
        state.serialize_field("flags", &self.get_flags())?;
        state.serialize_field("pixel_blend", &self.get_pixel_blend())?;
        state.serialize_field("quirks", self.get_quirks())?;
        state.serialize_field("background_color", &self.get_background_color())?;
        state.serialize_field("max_incl_dimension", &self.get_max_incl_dimension())?;
        state.serialize_field("max_incl_metadata_length", &self.get_max_incl_metadata_length())?;
        state.serialize_field("enabled_decoders", self.get_enabled_decoders())?;
        state.serialize_field("pixel_format", &self.get_pixel_format())?;
        state.end()
    }
}

/// Pixels are summarized by their length, they are rarely useful as text
impl Serialize for ImageDecodingResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ImageDecodingResult", 5)?;
        state.serialize_field("pixcfg", self.pixcfg())?;
        state.serialize_field("pixbuf_length", &self.pixbuf().len())?;
        state.serialize_field("shape", &self.shape())?;
        state.serialize_field("reported_metadata", self.reported_metadata())?;
        state.serialize_field("error_message", self.error_message())?;
        state.end()
    }
}
