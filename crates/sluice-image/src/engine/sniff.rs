/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Format detection from the leading bytes of an input

use crate::fourcc::FourCC;

/// Number of leading bytes handed to decoder selection
pub(crate) const PREFIX_LEN: usize = 64;

/// Formats with an unambiguous magic number
const MAGIC_BYTES: [(&[u8], FourCC); 7] = [
    // png
    (&[137, 80, 78, 71, 13, 10, 26, 10], FourCC::PNG),
    // jpeg
    (&[0xff, 0xd8, 0xff], FourCC::JPEG),
    // gif
    (b"GIF87a", FourCC::GIF),
    (b"GIF89a", FourCC::GIF),
    // nie, "nïE" followed by 0xff
    (&[0x6e, 0xc3, 0xaf, 0x45, 0xff], FourCC::NIE),
    // bmp, both the file and info header magics
    (b"BM", FourCC::BMP),
    (b"BA", FourCC::BMP)
];

/// Guess the format of `bytes`, returning `None` if nothing matched.
///
/// TGA and WBMP have no magic number, they are recognized by
/// checking their headers for plausible values after all
/// other formats failed to match.
pub fn guess_fourcc(bytes: &[u8]) -> Option<FourCC> {
    for (magic, fourcc) in MAGIC_BYTES {
        if bytes.starts_with(magic) {
            return Some(fourcc);
        }
    }
    if looks_like_tga(bytes) {
        return Some(FourCC::TGA);
    }
    if looks_like_wbmp(bytes) {
        return Some(FourCC::WBMP);
    }
    None
}

fn looks_like_tga(bytes: &[u8]) -> bool {
    if bytes.len() < 18 {
        return false;
    }
    let color_map_type = bytes[1];
    let image_type = bytes[2];
    let pixel_depth = bytes[16];

    if color_map_type > 1 || !matches!(image_type, 1 | 2 | 3 | 9 | 10 | 11) {
        return false;
    }
    if !matches!(pixel_depth, 1 | 8 | 15 | 16 | 24 | 32) {
        return false;
    }
    // color mapped images need a color map and vice versa
    let color_mapped = matches!(image_type, 1 | 9);
    color_mapped == (color_map_type == 1)
}

/// Read a WBMP multi-byte integer, returning the value and bytes consumed
fn wbmp_varint(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, byte) in bytes.iter().take(5).enumerate() {
        value = (value << 7) | u32::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

fn looks_like_wbmp(bytes: &[u8]) -> bool {
    // type 0 and a zero fixed header
    if !bytes.starts_with(&[0, 0]) {
        return false;
    }
    let Some((width, used)) = wbmp_varint(&bytes[2..]) else {
        return false;
    };
    let Some((height, _)) = wbmp_varint(&bytes[2 + used..]) else {
        return false;
    };
    width > 0 && height > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_numbers_are_recognized() {
        assert_eq!(guess_fourcc(&[137, 80, 78, 71, 13, 10, 26, 10, 0]), Some(FourCC::PNG));
        assert_eq!(guess_fourcc(&[0xff, 0xd8, 0xff, 0xe0]), Some(FourCC::JPEG));
        assert_eq!(guess_fourcc(b"GIF89a......"), Some(FourCC::GIF));
        assert_eq!(guess_fourcc(b"BM\x00\x00"), Some(FourCC::BMP));
        assert_eq!(guess_fourcc(b"\x6e\xc3\xaf\x45\xff\x62\x6e\x34"), Some(FourCC::NIE));
    }

    #[test]
    fn headerless_formats_use_plausibility_checks() {
        let mut tga = [0_u8; 18];
        tga[2] = 2;
        tga[16] = 24;
        assert_eq!(guess_fourcc(&tga), Some(FourCC::TGA));

        tga[1] = 1;
        assert_eq!(guess_fourcc(&tga), None);

        assert_eq!(guess_fourcc(&[0, 0, 0x81, 0x00, 0x10]), Some(FourCC::WBMP));
        assert_eq!(guess_fourcc(&[0, 0, 0x00, 0x10]), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(guess_fourcc(b""), None);
        assert_eq!(guess_fourcc(b"+(=)"), None);
    }
}
