/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A byte level pass run before serde_json sees the input.
//!
//! It blanks out what the enabled quirks allow (comments, extra commas,
//! leading markers) with spaces, keeping every byte offset intact, and finds
//! the first token serde_json would accept but we must reject. The input is
//! cut at that token so parsing stops there, with everything before it
//! still reported to the callbacks.

use crate::errors::JsonDecoderError;

/// Longest number literal accepted, in bytes
const MAX_NUMBER_LENGTH: usize = 99;

const BYTE_ORDER_MARK: &[u8] = &[0xEF, 0xBB, 0xBF];
const RECORD_SEPARATOR: u8 = 0x1E;

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LexOptions {
    pub comment_block:           bool,
    pub comment_line:            bool,
    pub extra_comma:             bool,
    pub leading_byte_order_mark: bool,
    pub leading_separator:       bool,
    pub replace_invalid_unicode: bool
}

/// Where and why the input was cut
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Stop {
    pub position: usize,
    pub error:    JsonDecoderError
}

pub(crate) struct Prepared {
    pub bytes: Vec<u8>,
    pub stop:  Option<Stop>
}

pub(crate) fn prepare(src: &[u8], options: &LexOptions) -> Prepared {
    let mut bytes = if options.replace_invalid_unicode {
        String::from_utf8_lossy(src).into_owned().into_bytes()
    } else {
        src.to_vec()
    };

    let mut start = 0;
    if options.leading_byte_order_mark && bytes.starts_with(BYTE_ORDER_MARK) {
        start = blank(&mut bytes, 0, BYTE_ORDER_MARK.len());
    }
    if options.leading_separator && bytes.get(start) == Some(&RECORD_SEPARATOR) {
        start = blank(&mut bytes, start, start + 1);
    }

    let mut stop = None;
    let mut commas = Vec::new();
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => match string_end(&bytes, i) {
                Ok(end) => {
                    i = end;
                    continue;
                }
                Err(string_stop) => {
                    stop = Some(string_stop);
                    break;
                }
            },
            b'/' if options.comment_block && bytes.get(i + 1) == Some(&b'*') => {
                let Some(length) = bytes[i + 2..].windows(2).position(|w| w == b"*/") else {
                    stop = Some(Stop {
                        position: i,
                        error:    JsonDecoderError::BadInput
                    });
                    break;
                };
                i = blank(&mut bytes, i, i + 2 + length + 2);
                continue;
            }
            b'/' if options.comment_line && bytes.get(i + 1) == Some(&b'/') => {
                let end = bytes[i..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map_or(bytes.len(), |n| i + n);
                i = blank(&mut bytes, i, end);
                continue;
            }
            b',' => commas.push(i),
            b'-' | b'0'..=b'9' => {
                let length = number_length(&bytes[i..]);
                if length > MAX_NUMBER_LENGTH {
                    stop = Some(Stop {
                        position: i,
                        error:    JsonDecoderError::UnsupportedNumberLength
                    });
                    break;
                }
                i += length;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if !options.replace_invalid_unicode {
        if let Err(err) = core::str::from_utf8(&bytes) {
            let position = err.valid_up_to();
            if stop.map_or(true, |s| position < s.position) {
                stop = Some(Stop {
                    position,
                    error: JsonDecoderError::BadUtf8
                });
            }
        }
    }
    if let Some(stop) = stop {
        bytes.truncate(stop.position);
    }
    if options.extra_comma {
        for comma in commas {
            if comma >= bytes.len() {
                break;
            }
            let next = skip_whitespace(&bytes, comma + 1);
            // only a comma that follows a value may trail, `[,]` stays an error
            let previous = bytes[..comma].iter().rposition(|b| !b.is_ascii_whitespace());
            let follows_value = previous.is_some_and(|p| !matches!(bytes[p], b'[' | b'{' | b','));
            if follows_value && matches!(bytes.get(next), Some(b']' | b'}')) {
                bytes[comma] = b' ';
            }
        }
    }
    Prepared { bytes, stop }
}

/// Overwrite `bytes[start..end]` with spaces, returns `end`
fn blank(bytes: &mut [u8], start: usize, end: usize) -> usize {
    bytes[start..end].fill(b' ');
    end
}

fn number_length(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|b| matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
        .count()
}

/// Position just past the string starting at `start`.
///
/// Unterminated strings run to the end of the input, serde_json
/// reports those itself.
fn string_end(bytes: &[u8], start: usize) -> Result<usize, Stop> {
    let mut i = start + 1;
    while let Some(b) = bytes.get(i) {
        match b {
            b'"' => return Ok(i + 1),
            b'\\' => i += 2,
            b'\n' => {
                return Err(Stop {
                    position: i,
                    error:    JsonDecoderError::BadNewLineInAString
                })
            }
            0x00..=0x1F => {
                return Err(Stop {
                    position: i,
                    error:    JsonDecoderError::BadC0ControlCode
                })
            }
            _ => i += 1
        }
    }
    Ok(bytes.len())
}

pub(crate) fn skip_whitespace(bytes: &[u8], from: usize) -> usize {
    let skipped = bytes
        .get(from..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_whitespace()).count());
    from + skipped
}

/// Position just past the first value in `bytes`, which must be valid JSON
pub(crate) fn value_end(bytes: &[u8]) -> usize {
    let start = skip_whitespace(bytes, 0);
    match bytes.get(start) {
        None => start,
        Some(b'"') => string_end(bytes, start).unwrap_or(bytes.len()),
        Some(b'-' | b'0'..=b'9') => start + number_length(&bytes[start..]),
        Some(b'{' | b'[') => {
            let mut depth = 0_usize;
            let mut i = start;
            while i < bytes.len() {
                match bytes[i] {
                    b'"' => {
                        i = string_end(bytes, i).unwrap_or(bytes.len());
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return i + 1;
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            bytes.len()
        }
        Some(_) => start + bytes[start..].iter().take_while(|b| b.is_ascii_alphabetic()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare_str(src: &str, options: LexOptions) -> (String, Option<Stop>) {
        let prepared = prepare(src.as_bytes(), &options);
        (String::from_utf8(prepared.bytes).unwrap(), prepared.stop)
    }

    #[test]
    fn comments_and_extra_commas_become_spaces() {
        let options = LexOptions {
            comment_block: true,
            comment_line: true,
            extra_comma: true,
            ..Default::default()
        };
        let (text, stop) = prepare_str("[1, /* c */ \"/*x*/\", // end\n 2,]", options);
        assert_eq!(text, "[1,         \"/*x*/\",       \n 2 ]");
        assert_eq!(stop, None);
    }

    #[test]
    fn commas_without_a_value_before_them_are_kept() {
        let options = LexOptions {
            comment_block: true,
            extra_comma: true,
            ..Default::default()
        };
        for src in ["[,]", "{ , }", "[1,,]", "[ /* c */ ,]"] {
            let (text, _) = prepare_str(src, options);
            assert!(text.contains(','), "{src} became {text}");
        }
        let (text, _) = prepare_str("{\"a\": [1,] ,}", options);
        assert_eq!(text, "{\"a\": [1 ]  }");
    }

    #[test]
    fn disabled_quirks_leave_input_alone() {
        let (text, stop) = prepare_str("[1,] // c", LexOptions::default());
        assert_eq!(text, "[1,] // c");
        assert_eq!(stop, None);
    }

    #[test]
    fn long_numbers_cut_the_input() {
        let src = format!("{{\"val\":{}}}", "1".repeat(130));
        let (text, stop) = prepare_str(&src, LexOptions::default());
        assert_eq!(text, "{\"val\":");
        assert_eq!(
            stop,
            Some(Stop {
                position: 7,
                error:    JsonDecoderError::UnsupportedNumberLength
            })
        );
        let exact = format!("[{}]", "9".repeat(99));
        assert_eq!(prepare_str(&exact, LexOptions::default()).1, None);
    }

    #[test]
    fn raw_control_codes_in_strings_cut_the_input() {
        let (_, stop) = prepare_str("[\"a\nb\"]", LexOptions::default());
        assert_eq!(stop.map(|s| s.error), Some(JsonDecoderError::BadNewLineInAString));

        let (_, stop) = prepare_str("[\"a\tb\"]", LexOptions::default());
        assert_eq!(stop.map(|s| s.error), Some(JsonDecoderError::BadC0ControlCode));

        // escaped quotes do not end the string
        let (_, stop) = prepare_str("[\"a\\\"\nb\"]", LexOptions::default());
        assert_eq!(stop.map(|s| s.position), Some(5));
    }

    #[test]
    fn invalid_utf8_is_cut_or_replaced() {
        let src = b"[\"a\xFFb\"]";
        let prepared = prepare(src, &LexOptions::default());
        assert_eq!(prepared.bytes, b"[\"a");
        assert_eq!(prepared.stop.map(|s| s.error), Some(JsonDecoderError::BadUtf8));

        let options = LexOptions {
            replace_invalid_unicode: true,
            ..Default::default()
        };
        let prepared = prepare(src, &options);
        assert_eq!(prepared.stop, None);
        assert_eq!(String::from_utf8(prepared.bytes).unwrap(), "[\"a\u{FFFD}b\"]");
    }

    #[test]
    fn leading_markers() {
        let options = LexOptions {
            leading_byte_order_mark: true,
            leading_separator: true,
            ..Default::default()
        };
        let prepared = prepare(b"\xEF\xBB\xBF\x1E[]", &options);
        assert_eq!(prepared.bytes, b"    []");
    }

    #[test]
    fn value_end_stops_after_the_first_value() {
        assert_eq!(value_end(b" {\"a\": \"}\"} tail"), 11);
        assert_eq!(value_end(b"[[1], 2]\n"), 8);
        assert_eq!(value_end(b"-12.5e3 "), 7);
        assert_eq!(value_end(b"true"), 4);
        assert_eq!(value_end(b"\"x\\\"\""), 5);
    }
}
