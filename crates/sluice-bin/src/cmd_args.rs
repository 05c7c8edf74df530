/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::{value_parser, Arg, ArgAction, Command};

pub(crate) const DECODER_NAMES: [&str; 7] = ["bmp", "gif", "jpeg", "nie", "png", "tga", "wbmp"];

pub(crate) const REPORT_NAMES: [&str; 11] = [
    "bgcl", "chrm", "exif", "gama", "iccp", "kvp", "mtim", "ofs2", "phyd", "srgb", "xmp"
];

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("sluice")
        .about("Decode images or JSON documents and print what the decoder saw")
        .arg(Arg::new("in")
            .short('i')
            .help("Input file to read data from")
            .long("input")
            .action(ArgAction::Append)
            .required(true))
        .arg(Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Treat inputs as JSON documents instead of images"))
        .arg(Arg::new("pretty")
            .long("pretty")
            .action(ArgAction::SetTrue)
            .help("Pretty print the summary"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display warnings and errors"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display information about the decoding options"))
        .arg(Arg::new("decoder")
            .long("decoder")
            .action(ArgAction::Append)
            .help_heading("IMAGE")
            .help("Image format to accept, can be repeated")
            .long_help("Image format to accept, can be repeated.\nWithout this option every format except jpeg is accepted")
            .value_parser(DECODER_NAMES))
        .arg(Arg::new("pixel-format")
            .long("pixel-format")
            .help_heading("IMAGE")
            .help("Layout of the decoded pixels, e.g bgra_premul or rgb"))
        .arg(Arg::new("report")
            .long("report")
            .action(ArgAction::Append)
            .help_heading("IMAGE")
            .help("Metadata kind to report, can be repeated")
            .value_parser(REPORT_NAMES))
        .arg(Arg::new("max-dimension")
            .long("max-dimension")
            .help_heading("IMAGE")
            .help("Largest width or height accepted")
            .value_parser(value_parser!(u32)))
        .arg(Arg::new("background-color")
            .long("background-color")
            .help_heading("IMAGE")
            .help("Premultiplied ARGB color to fill the buffer with, in hex e.g ff000000"))
        .arg(Arg::new("quirk")
            .long("quirk")
            .action(ArgAction::Append)
            .help_heading("QUIRKS")
            .help("Quirk to enable, e.g allow_extra_comma or ignore_checksum")
            .long_help("Quirk to enable, can be repeated.\nJSON quirks take an optional value after an equals sign, e.g allow_comment_block=1"))
        .arg(Arg::new("pointer")
            .long("pointer")
            .help_heading("JSON")
            .help("JSON pointer to the part of the document to decode, e.g /key/0"))
}
