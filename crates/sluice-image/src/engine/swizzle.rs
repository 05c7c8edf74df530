/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversion of decoded RGBA samples into destination pixel formats

use crate::config::PixelBlend;
use crate::engine::{DecodedFrame, PixelBuffer};
use crate::pixel::PixelFormat;

/// Whether the default engine can decode into `format`
pub fn is_supported_destination(format: PixelFormat) -> bool {
    matches!(
        format,
        PixelFormat::BGR_565
            | PixelFormat::BGR
            | PixelFormat::BGRA_NONPREMUL
            | PixelFormat::BGRA_NONPREMUL_4X16LE
            | PixelFormat::BGRA_PREMUL
            | PixelFormat::RGBA_NONPREMUL
            | PixelFormat::RGBA_PREMUL
    )
}

#[inline]
fn premultiply(c: u8, a: u8) -> u8 {
    ((u32::from(c) * u32::from(a) + 127) / 255) as u8
}

#[inline]
fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
}

/// Write one non-premultiplied RGBA pixel in `format`.
///
/// Formats without alpha get the color composited over black.
fn encode(format: PixelFormat, [r, g, b, a]: [u8; 4], out: &mut [u8]) {
    match format {
        PixelFormat::BGR_565 => {
            let (r, g, b) = (premultiply(r, a), premultiply(g, a), premultiply(b, a));
            let packed = (u16::from(b) >> 3) | ((u16::from(g) >> 2) << 5) | ((u16::from(r) >> 3) << 11);
            out[..2].copy_from_slice(&packed.to_le_bytes());
        }
        PixelFormat::BGR => {
            out[..3].copy_from_slice(&[premultiply(b, a), premultiply(g, a), premultiply(r, a)]);
        }
        PixelFormat::BGRA_NONPREMUL => out[..4].copy_from_slice(&[b, g, r, a]),
        PixelFormat::BGRA_PREMUL => out[..4].copy_from_slice(&[
            premultiply(b, a),
            premultiply(g, a),
            premultiply(r, a),
            a
        ]),
        PixelFormat::RGBA_NONPREMUL => out[..4].copy_from_slice(&[r, g, b, a]),
        PixelFormat::RGBA_PREMUL => out[..4].copy_from_slice(&[
            premultiply(r, a),
            premultiply(g, a),
            premultiply(b, a),
            a
        ]),
        PixelFormat::BGRA_NONPREMUL_4X16LE => {
            for (chunk, c) in out[..8].chunks_exact_mut(2).zip([b, g, r, a]) {
                chunk.copy_from_slice(&(u16::from(c) * 0x101).to_le_bytes());
            }
        }
        _ => {}
    }
}

/// Read one pixel in `format` back as non-premultiplied RGBA
fn decode(format: PixelFormat, src: &[u8]) -> [u8; 4] {
    match format {
        PixelFormat::BGR_565 => {
            let packed = u16::from_le_bytes([src[0], src[1]]);
            let b = (packed & 0x1F) as u8;
            let g = ((packed >> 5) & 0x3F) as u8;
            let r = (packed >> 11) as u8;
            [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255]
        }
        PixelFormat::BGR => [src[2], src[1], src[0], 255],
        PixelFormat::BGRA_NONPREMUL => [src[2], src[1], src[0], src[3]],
        PixelFormat::BGRA_PREMUL => {
            let a = src[3];
            [unpremultiply(src[2], a), unpremultiply(src[1], a), unpremultiply(src[0], a), a]
        }
        PixelFormat::RGBA_NONPREMUL => [src[0], src[1], src[2], src[3]],
        PixelFormat::RGBA_PREMUL => {
            let a = src[3];
            [unpremultiply(src[0], a), unpremultiply(src[1], a), unpremultiply(src[2], a), a]
        }
        PixelFormat::BGRA_NONPREMUL_4X16LE => {
            let c = |i: usize| (u16::from_le_bytes([src[i], src[i + 1]]) >> 8) as u8;
            [c(4), c(2), c(0), c(6)]
        }
        _ => [0, 0, 0, 0]
    }
}

/// Composite non-premultiplied `src` over `dst`
fn src_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    let da = u32::from(dst[3]);
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0_u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * da * (255 - sa);
        out[i] = ((c + out_a / 2) / out_a) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

/// Fill every pixel with a premultiplied ARGB color
pub(crate) fn fill(pixbuf: &mut PixelBuffer<'_>, argb_premul: u32) {
    let format = pixbuf.pixcfg().pixel_format();
    let bpp = format.bytes_per_pixel() as usize;
    if bpp == 0 {
        return;
    }
    let [a, r, g, b] = argb_premul.to_be_bytes();
    let color = [unpremultiply(r, a), unpremultiply(g, a), unpremultiply(b, a), a];

    let mut encoded = [0_u8; 8];
    encode(format, color, &mut encoded);

    let len = pixbuf.pixcfg().pixbuf_len() as usize;
    for pixel in pixbuf.data_mut()[..len].chunks_exact_mut(bpp) {
        pixel.copy_from_slice(&encoded[..bpp]);
    }
}

/// Write a decoded frame into the buffer, clipping to the smaller of both
pub(crate) fn blit(frame: &DecodedFrame, pixbuf: &mut PixelBuffer<'_>, blend: PixelBlend) {
    let format = pixbuf.pixcfg().pixel_format();
    let bpp = format.bytes_per_pixel() as usize;
    if bpp == 0 {
        return;
    }
    let width = frame.width.min(pixbuf.pixcfg().width()) as usize;
    let height = frame.height.min(pixbuf.pixcfg().height()) as usize;
    let src_stride = frame.width as usize * 4;
    let dst_stride = pixbuf.stride();

    let data = pixbuf.data_mut();
    for y in 0..height {
        let src_row = &frame.rgba[y * src_stride..y * src_stride + width * 4];
        let dst_row = &mut data[y * dst_stride..y * dst_stride + width * bpp];

        for (src, dst) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(bpp)) {
            let src = [src[0], src[1], src[2], src[3]];
            let pixel = match blend {
                PixelBlend::SRC => src,
                PixelBlend::SRC_OVER => match src[3] {
                    255 => src,
                    0 => continue,
                    _ => src_over(src, decode(format, dst))
                }
            };
            encode(format, pixel, dst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{PixelConfig, PixelSubsampling};

    fn buffer_of(format: PixelFormat, data: &mut [u8]) -> PixelBuffer<'_> {
        let pixcfg = PixelConfig::new(format, PixelSubsampling::NONE, 1, 1);
        PixelBuffer::from_slice(&pixcfg, data).unwrap()
    }

    #[test]
    fn only_interleaved_rgb_destinations_are_supported() {
        assert!(is_supported_destination(PixelFormat::BGRA_PREMUL));
        assert!(is_supported_destination(PixelFormat::BGR_565));
        assert!(!is_supported_destination(PixelFormat::RGB));
        assert!(!is_supported_destination(PixelFormat::YCBCR));
        assert!(!is_supported_destination(PixelFormat::INVALID));
    }

    #[test]
    fn src_writes_channel_order_and_premultiplies() {
        let frame = DecodedFrame {
            width:  1,
            height: 1,
            rgba:   vec![200, 100, 50, 128]
        };
        let mut data = [0_u8; 4];
        blit(&frame, &mut buffer_of(PixelFormat::BGRA_NONPREMUL, &mut data), PixelBlend::SRC);
        assert_eq!(data, [50, 100, 200, 128]);

        blit(&frame, &mut buffer_of(PixelFormat::RGBA_PREMUL, &mut data), PixelBlend::SRC);
        assert_eq!(data, [100, 50, 25, 128]);

        let mut wide = [0_u8; 8];
        blit(
            &frame,
            &mut buffer_of(PixelFormat::BGRA_NONPREMUL_4X16LE, &mut wide),
            PixelBlend::SRC
        );
        assert_eq!(wide, [50, 50, 100, 100, 200, 200, 128, 128]);
    }

    #[test]
    fn src_over_keeps_background_for_transparent_pixels() {
        let frame = DecodedFrame {
            width:  1,
            height: 1,
            rgba:   vec![255, 255, 255, 0]
        };
        let mut data = [0_u8; 4];
        let mut pixbuf = buffer_of(PixelFormat::RGBA_NONPREMUL, &mut data);
        fill(&mut pixbuf, 0xFF00_00FF);
        blit(&frame, &mut pixbuf, PixelBlend::SRC_OVER);
        assert_eq!(data, [0, 0, 255, 255]);
    }

    #[test]
    fn src_over_mixes_half_transparent_pixels() {
        assert_eq!(src_over([255, 0, 0, 255], [0, 0, 255, 255]), [255, 0, 0, 255]);
        let mixed = src_over([255, 0, 0, 128], [0, 0, 255, 255]);
        assert_eq!(mixed[3], 255);
        assert_eq!(mixed[0], 128);
        assert_eq!(mixed[2], 127);
    }

    #[test]
    fn bgr_565_packs_high_bits() {
        let mut data = [0_u8; 2];
        encode(PixelFormat::BGR_565, [255, 0, 255, 255], &mut data);
        assert_eq!(u16::from_le_bytes(data), 0xF81F);
        assert_eq!(decode(PixelFormat::BGR_565, &data), [255, 0, 255, 255]);
    }
}
