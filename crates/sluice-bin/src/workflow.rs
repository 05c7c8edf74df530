/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;

use clap::ArgMatches;
use log::{info, warn};
use serde::Serialize;
use sluice_image::ImageDecoder;
use sluice_json::JsonDecoder;

use crate::cmd_parsers::CmdOptions;
use crate::serde::Summary;

/// Decode every input and print one JSON summary per file.
///
/// Fails when any input fails to decode, after all of them
/// have been printed.
pub fn decode_inputs_from_cmd(args: &ArgMatches, options: &CmdOptions) -> Result<(), String> {
    let inputs: Vec<OsString> = args
        .get_raw("in")
        .into_iter()
        .flatten()
        .map(|s| s.to_os_string())
        .collect();

    let mut failed = 0;

    if options.json {
        let mut decoder = JsonDecoder::new(&options.json_config);
        for file in inputs {
            info!("Decoding {:?}", file);
            let result = decoder.decode_file(&file);
            if !result.is_ok() {
                warn!("{:?}: {}", file, result.error_message());
                failed += 1;
            }
            print_summary(&Summary::new(file, &result), options.pretty)?;
        }
    } else {
        let mut decoder = ImageDecoder::new(&options.image);
        for file in inputs {
            info!("Decoding {:?}", file);
            let result = decoder.decode_file(&file);
            if !result.is_ok() {
                warn!("{:?}: {}", file, result.error_message());
                failed += 1;
            }
            print_summary(&Summary::new(file, &result), options.pretty)?;
        }
    }

    if failed != 0 {
        return Err(format!("{failed} input(s) failed to decode"));
    }
    Ok(())
}

fn print_summary<T: Serialize>(summary: &T, pretty: bool) -> Result<(), String> {
    let text = if pretty {
        serde_json::to_string_pretty(summary)
    } else {
        serde_json::to_string(summary)
    };
    println!("{}", text.map_err(|e| e.to_string())?);
    Ok(())
}
