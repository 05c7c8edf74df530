/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::write;

use sluice_image::{
    FourCC, ImageDecoder, ImageDecoderConfig, ImageDecoderError, ImageDecoderFlags, ImageDecoderType,
    PixelBlend, PixelFormat
};

use crate::fixtures::{bmp, png, zlib_stored};
use crate::hash;

/// 2x2 RGB, top row red and green, bottom row blue and white
const RGB_2X2: [u8; 12] = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];

/// The same pixels as opaque BGRA
const BGRA_2X2: [u8; 16] = [
    0, 0, 255, 255, 0, 255, 0, 255, 255, 0, 0, 255, 255, 255, 255, 255
];

#[test]
fn png_pixels_reach_the_buffer() {
    let file = png(2, 2, 3, &RGB_2X2, &[]);
    let result = ImageDecoder::new(&ImageDecoderConfig::default()).decode(&file);

    assert!(result.is_ok(), "{}", result.error_message());
    assert_eq!(result.shape(), [2, 2, 4]);
    assert_eq!(result.pixcfg().pixel_format(), PixelFormat::BGRA_PREMUL);
    assert_eq!(hash(result.pixbuf()), hash(&BGRA_2X2));
}

#[test]
fn bmp_pixels_reach_the_buffer() {
    let file = bmp(2, 2, &RGB_2X2);
    let config = ImageDecoderConfig::default().set_pixel_format(PixelFormat::BGR);
    let result = ImageDecoder::new(&config).decode(&file);

    assert!(result.is_ok(), "{}", result.error_message());
    assert_eq!(result.shape(), [2, 2, 3]);

    let expected: Vec<u8> = RGB_2X2
        .chunks_exact(3)
        .flat_map(|rgb| [rgb[2], rgb[1], rgb[0]])
        .collect();
    assert_eq!(hash(result.pixbuf()), hash(&expected));
}

#[test]
fn transparent_pixels_premultiply_to_zero() {
    let rgba = [10, 20, 30, 0, 40, 50, 60, 255];
    let file = png(2, 1, 4, &rgba, &[]);

    let premul = ImageDecoder::new(&ImageDecoderConfig::default()).decode(&file);
    assert_eq!(premul.pixbuf(), [0, 0, 0, 0, 60, 50, 40, 255]);

    let config = ImageDecoderConfig::default().set_pixel_format(PixelFormat::RGBA_NONPREMUL);
    let straight = ImageDecoder::new(&config).decode(&file);
    assert_eq!(straight.pixbuf(), rgba);
}

#[test]
fn metadata_follows_the_flags() {
    let gamma = 45455_u32.to_be_bytes();
    let file = png(
        2,
        2,
        3,
        &RGB_2X2,
        &[(b"tEXt", &b"Title\0sluice"[..]), (b"gAMA", &gamma[..])]
    );

    let silent = ImageDecoder::new(&ImageDecoderConfig::default()).decode(&file);
    assert!(silent.reported_metadata().is_empty());

    let config = ImageDecoderConfig::default()
        .set_flags(ImageDecoderFlags::REPORT_METADATA_KVP | ImageDecoderFlags::REPORT_METADATA_GAMA);
    let result = ImageDecoder::new(&config).decode(&file);
    assert!(result.is_ok(), "{}", result.error_message());

    let metadata = result.reported_metadata();
    assert_eq!(metadata.len(), 2);
    assert_eq!(metadata[0].minfo.metadata_fourcc(), FourCC::KVP.0);
    assert_eq!(metadata[0].data, b"Title\0sluice");
    assert_eq!(metadata[1].minfo.metadata_fourcc(), FourCC::GAMA.0);
    assert_eq!(metadata[1].minfo.metadata_parsed_gama(), 45455);
}

#[test]
fn disabled_formats_are_refused() {
    let file = bmp(2, 2, &RGB_2X2);
    let config = ImageDecoderConfig::default().set_enabled_decoders([ImageDecoderType::PNG]);
    let result = ImageDecoder::new(&config).decode(&file);

    assert_eq!(result.error(), Some(ImageDecoderError::UnsupportedImageFormat));
    assert!(result.pixbuf().is_empty());
    assert_eq!(result.shape(), [0, 0, 0]);
}

#[test]
fn files_decode_like_bytes() {
    let file = png(2, 2, 3, &RGB_2X2, &[(b"tEXt", &b"k\0v"[..])]);
    let path = std::env::temp_dir().join(format!("sluice-{}.png", std::process::id()));
    write(&path, &file).unwrap();

    let config = ImageDecoderConfig::default().set_flags(ImageDecoderFlags::REPORT_METADATA_KVP);
    let mut decoder = ImageDecoder::new(&config);
    let from_file = decoder.decode_file(&path);
    let from_bytes = decoder.decode(&file);
    std::fs::remove_file(&path).unwrap();

    assert!(from_file.is_ok(), "{}", from_file.error_message());
    assert_eq!(from_file, from_bytes);
}

#[test]
fn decoders_are_idempotent() {
    let files = [png(2, 2, 3, &RGB_2X2, &[]), bmp(2, 2, &RGB_2X2), b"not an image".to_vec()];
    let config = ImageDecoderConfig::default();

    let mut reused = ImageDecoder::new(&config);
    for file in &files {
        let first = reused.decode(file);
        let second = reused.decode(file);
        let fresh = ImageDecoder::new(&config).decode(file);

        assert_eq!(first, second);
        assert_eq!(hash(first.pixbuf()), hash(fresh.pixbuf()));
        assert_eq!(first.error_message(), fresh.error_message());
    }
}

/// 16x16 RGB gradient
fn gradient() -> Vec<u8> {
    (0..16 * 16)
        .flat_map(|i: usize| [(i % 16 * 16) as u8, (i / 16 * 16) as u8, 128])
        .collect()
}

#[test]
fn truncated_files_keep_their_buffer() {
    let pixels = gradient();
    let files = [("png", png(16, 16, 3, &pixels, &[])), ("bmp", bmp(16, 16, &pixels))];

    for (name, mut file) in files {
        file.truncate(file.len() - 64);
        let result = ImageDecoder::new(&ImageDecoderConfig::default()).decode(&file);

        assert!(
            result.error_message().ends_with("truncated input"),
            "{name}: {}",
            result.error_message()
        );
        assert!(result.pixcfg().is_valid(), "{name}");
        assert_eq!(result.shape(), [16, 16, 4]);
        assert_eq!(result.pixbuf().len() as u64, result.pixcfg().pixbuf_len());
        assert_ne!(result.pixbuf().len(), 0);
    }
}

#[test]
fn headers_cut_short_are_unexpected_eof() {
    let png_file = png(2, 2, 3, &RGB_2X2, &[]);
    let bmp_file = bmp(2, 2, &RGB_2X2);

    for file in [&png_file[..20], &bmp_file[..20]] {
        let result = ImageDecoder::new(&ImageDecoderConfig::default()).decode(file);
        assert_eq!(result.error(), Some(ImageDecoderError::UnexpectedEndOfFile));
        assert!(!result.pixcfg().is_valid());
        assert!(result.pixbuf().is_empty());
    }
}

#[test]
fn dimension_limit_is_inclusive() {
    let file = png(2, 2, 3, &RGB_2X2, &[]);

    let config = ImageDecoderConfig::default().set_max_incl_dimension(2);
    let result = ImageDecoder::new(&config).decode(&file);
    assert!(result.is_ok(), "{}", result.error_message());

    let config = ImageDecoderConfig::default().set_max_incl_dimension(1);
    let result = ImageDecoder::new(&config).decode(&file);
    assert_eq!(result.error(), Some(ImageDecoderError::MaxInclDimensionExceeded));
    assert!(result.pixbuf().is_empty());
}

#[test]
fn metadata_length_limit_is_inclusive() {
    let file = png(2, 2, 3, &RGB_2X2, &[(b"tEXt", &b"k\0v"[..])]);
    let config = ImageDecoderConfig::default().set_flags(ImageDecoderFlags::REPORT_METADATA_KVP);

    let result = ImageDecoder::new(&config.clone().set_max_incl_metadata_length(3)).decode(&file);
    assert!(result.is_ok(), "{}", result.error_message());
    assert_eq!(result.reported_metadata()[0].data, b"k\0v");

    let result = ImageDecoder::new(&config.set_max_incl_metadata_length(2)).decode(&file);
    assert_eq!(
        result.error(),
        Some(ImageDecoderError::MaxInclMetadataLengthExceeded)
    );
}

#[test]
fn compressed_metadata_is_bounded_while_inflating() {
    let mut ztxt = b"Comment\0\0".to_vec();
    ztxt.extend_from_slice(&zlib_stored(&[b'a'; 4096]));
    let file = png(2, 2, 3, &RGB_2X2, &[(b"zTXt", &ztxt[..])]);
    let config = ImageDecoderConfig::default().set_flags(ImageDecoderFlags::REPORT_METADATA_KVP);

    let small = config.clone().set_max_incl_metadata_length(512);
    let result = ImageDecoder::new(&small).decode(&file);
    assert_eq!(
        result.error(),
        Some(ImageDecoderError::MaxInclMetadataLengthExceeded)
    );
    assert!(result.reported_metadata().is_empty());

    let result = ImageDecoder::new(&config).decode(&file);
    assert!(result.is_ok(), "{}", result.error_message());
    assert_eq!(result.reported_metadata()[0].data.len(), "Comment".len() + 1 + 4096);
}

#[test]
fn background_color_shows_through_transparent_pixels() {
    let rgba = [10, 20, 30, 0, 40, 50, 60, 255];
    let file = png(2, 1, 4, &rgba, &[]);

    // opaque blue
    let config = ImageDecoderConfig::default()
        .set_background_color(0xFF00_00FF)
        .set_pixel_blend(PixelBlend::SRC_OVER);
    let result = ImageDecoder::new(&config).decode(&file);
    assert!(result.is_ok(), "{}", result.error_message());
    assert_eq!(result.pixbuf(), [255, 0, 0, 255, 60, 50, 40, 255]);
}
