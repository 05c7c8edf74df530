/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::Debug;

use clap::parser::ValueSource::CommandLine;
use clap::ArgMatches;
use log::info;
use sluice_image::{
    is_valid_background_color, FourCC, ImageDecoderConfig, ImageDecoderFlags, ImageDecoderQuirk,
    ImageDecoderType, PixelFormat
};
use sluice_json::{JsonDecoderConfig, JsonDecoderQuirk};

pub mod global_options;

/// What to decode and how
#[derive(Debug, Clone)]
pub struct CmdOptions {
    pub json:   bool,
    pub pretty: bool,
    pub image:  ImageDecoderConfig,
    pub json_config: JsonDecoderConfig
}

pub fn parse_options(options: &ArgMatches) -> Result<CmdOptions, String> {
    let json = options.get_flag("json");
    let pretty = options.get_flag("pretty");

    let image = if json {
        ImageDecoderConfig::default()
    } else {
        get_image_options(options)?
    };
    let json_config = if json {
        get_json_options(options)?
    } else {
        JsonDecoderConfig::default()
    };
    Ok(CmdOptions {
        json,
        pretty,
        image,
        json_config
    })
}

/// Find the variant whose debug name matches `name`, ignoring case
fn find_by_name<T: Copy + Debug>(variants: &[T], name: &str) -> Option<T> {
    variants
        .iter()
        .copied()
        .find(|v| format!("{v:?}").eq_ignore_ascii_case(name))
}

fn passed(options: &ArgMatches, id: &str) -> bool {
    options.value_source(id) == Some(CommandLine)
}

pub fn get_image_options(options: &ArgMatches) -> Result<ImageDecoderConfig, String> {
    let mut config = ImageDecoderConfig::default();

    if passed(options, "decoder") {
        let mut decoders = Vec::new();
        for name in options.get_many::<String>("decoder").into_iter().flatten() {
            let decoder = find_by_name(&ImageDecoderType::ALL, name)
                .ok_or_else(|| format!("Unknown decoder {name}"))?;
            decoders.push(decoder);
        }
        info!("Accepting {:?}", decoders);
        config = config.set_enabled_decoders(decoders);
    }

    if let Some(name) = options.get_one::<String>("pixel-format") {
        let format = find_by_name(&PixelFormat::ALL, name)
            .ok_or_else(|| format!("Unknown pixel format {name}"))?;
        info!("Decoding to {:?}", format);
        config = config.set_pixel_format(format);
    }

    let mut flags = ImageDecoderFlags::empty();
    for name in options.get_many::<String>("report").into_iter().flatten() {
        let mut fourcc = [b' '; 4];
        for (dst, src) in fourcc.iter_mut().zip(name.to_ascii_uppercase().bytes()) {
            *dst = src;
        }
        flags |= ImageDecoderFlags::for_metadata(FourCC::from_bytes(fourcc));
    }
    if !flags.is_empty() {
        info!("Reporting {:?}", flags);
        config = config.set_flags(flags);
    }

    if let Some(dimension) = options.get_one::<u32>("max-dimension") {
        config = config.set_max_incl_dimension(*dimension);
    }

    if let Some(color) = options.get_one::<String>("background-color") {
        let color = u32::from_str_radix(color.trim_start_matches("0x"), 16)
            .map_err(|e| format!("Bad background color {color}: {e}"))?;
        if !is_valid_background_color(color) {
            info!("Background color {:#010x} is not premultiplied, no fill", color);
        }
        config = config.set_background_color(color);
    }

    let mut quirks = Vec::new();
    for name in options.get_many::<String>("quirk").into_iter().flatten() {
        let quirk = find_by_name(&ImageDecoderQuirk::ALL, name)
            .ok_or_else(|| format!("Unknown image quirk {name}"))?;
        quirks.push(quirk);
    }
    if !quirks.is_empty() {
        config = config.set_quirks(quirks);
    }
    Ok(config)
}

pub fn get_json_options(options: &ArgMatches) -> Result<JsonDecoderConfig, String> {
    let mut config = JsonDecoderConfig::default();

    for quirk in options.get_many::<String>("quirk").into_iter().flatten() {
        let (name, value) = match quirk.split_once('=') {
            Some((name, value)) => {
                let value = value
                    .parse::<u64>()
                    .map_err(|e| format!("Bad value for quirk {name}: {e}"))?;
                (name, value)
            }
            None => (quirk.as_str(), 1)
        };
        let quirk = find_by_name(&JsonDecoderQuirk::ALL, name)
            .ok_or_else(|| format!("Unknown JSON quirk {name}"))?;
        info!("Setting {:?} to {}", quirk, value);
        config = config.set_quirk(quirk, value);
    }

    if let Some(pointer) = options.get_one::<String>("pointer") {
        info!("Selecting {:?}", pointer);
        config = config.set_json_pointer(pointer.as_str());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_args::create_cmd_args;

    fn matches(args: &[&str]) -> ArgMatches {
        create_cmd_args().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn image_options_are_mapped() {
        let m = matches(&[
            "sluice", "-i", "a.png", "--decoder", "png", "--decoder", "jpeg", "--pixel-format",
            "rgba_nonpremul", "--report", "exif", "--report", "kvp", "--quirk", "ignore_checksum"
        ]);
        let config = parse_options(&m).unwrap().image;

        assert_eq!(config.get_pixel_format(), PixelFormat::RGBA_NONPREMUL);
        assert_eq!(
            config.get_flags(),
            ImageDecoderFlags::REPORT_METADATA_EXIF | ImageDecoderFlags::REPORT_METADATA_KVP
        );
        assert_eq!(config.get_enabled_decoders().len(), 2);
        assert!(config.get_quirks().contains(&ImageDecoderQuirk::IGNORE_CHECKSUM));
    }

    #[test]
    fn json_options_are_mapped() {
        let m = matches(&[
            "sluice", "--json", "-i", "a.json", "--quirk", "allow_extra_comma", "--quirk",
            "allow_comment_line=0", "--pointer", "/a/0"
        ]);
        let options = parse_options(&m).unwrap();
        assert!(options.json);

        let quirks = options.json_config.get_quirks();
        assert_eq!(quirks.get(&JsonDecoderQuirk::ALLOW_EXTRA_COMMA), Some(&1));
        assert_eq!(quirks.get(&JsonDecoderQuirk::ALLOW_COMMENT_LINE), Some(&0));
        assert_eq!(options.json_config.get_json_pointer(), "/a/0");
    }

    #[test]
    fn unknown_names_are_rejected() {
        let m = matches(&["sluice", "-i", "a.png", "--pixel-format", "purple"]);
        assert!(parse_options(&m).is_err());

        let m = matches(&["sluice", "--json", "-i", "a.json", "--quirk", "allow_everything"]);
        assert!(parse_options(&m).is_err());
    }
}
