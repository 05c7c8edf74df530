/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! RFC 6901 JSON pointers

use crate::errors::JsonDecoderError;

/// Split a pointer into its unescaped reference tokens.
///
/// The empty pointer selects the whole document and has no tokens.
/// `~0` and `~1` stand for `~` and `/`, with `allow_tilde_nrt`
/// `~n`, `~r` and `~t` stand for a new line, carriage return and tab.
pub(crate) fn parse_pointer(
    pointer: &str, allow_tilde_nrt: bool
) -> Result<Vec<String>, JsonDecoderError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(JsonDecoderError::BadJsonPointer);
    };
    rest.split('/')
        .map(|token| unescape(token, allow_tilde_nrt))
        .collect()
}

fn unescape(token: &str, allow_tilde_nrt: bool) -> Result<String, JsonDecoderError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();

    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        let unescaped = match chars.next() {
            Some('0') => '~',
            Some('1') => '/',
            Some('n') if allow_tilde_nrt => '\n',
            Some('r') if allow_tilde_nrt => '\r',
            Some('t') if allow_tilde_nrt => '\t',
            _ => return Err(JsonDecoderError::BadJsonPointer)
        };
        out.push(unescaped);
    }
    Ok(out)
}

/// The list index a token names, `0` or a decimal without leading zeros
pub(crate) fn array_index(token: &str) -> Option<usize> {
    let valid = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if valid {
        token.parse().ok()
    } else {
        None
    }
}
