//! End-to-end decode tests against hand-built minimal JPEG streams.
use jpegrs::{ColorSpace, DecodeErrors, Decoder, DecoderOptions};

/// An 8x8, single-component, single-MCU baseline JPEG: trivial DQT (all
/// quantization values 1), trivial single-symbol DC and AC Huffman tables
/// (both assign code `0` to symbol `0x00`), one entropy byte whose first
/// two bits decode DC (category 0, diff 0) then AC (immediate EOB).
fn tiny_baseline_jpeg() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xFF, 0xD8]); // SOI

    // DQT: one 8-bit table, id 0, all entries 1.
    bytes.extend_from_slice(&[0xFF, 0xDB]);
    bytes.extend_from_slice(&(67u16).to_be_bytes());
    bytes.push(0x00); // precision 0, id 0
    bytes.extend(std::iter::repeat(1u8).take(64));

    // DHT: DC table id 0, one code of length 1 -> symbol 0x00.
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(20u16).to_be_bytes());
    bytes.push(0x00); // class 0 (DC), id 0
    bytes.push(1);
    bytes.extend(std::iter::repeat(0u8).take(15));
    bytes.push(0x00);

    // DHT: AC table id 0, same shape.
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(20u16).to_be_bytes());
    bytes.push(0x10); // class 1 (AC), id 0
    bytes.push(1);
    bytes.extend(std::iter::repeat(0u8).take(15));
    bytes.push(0x00);

    // SOF0: 8x8, 1 component, sampling 1x1, quant table 0.
    bytes.extend_from_slice(&[0xFF, 0xC0]);
    bytes.extend_from_slice(&(11u16).to_be_bytes());
    bytes.push(8); // precision
    bytes.extend_from_slice(&(8u16).to_be_bytes()); // height
    bytes.extend_from_slice(&(8u16).to_be_bytes()); // width
    bytes.push(1); // num components
    bytes.extend_from_slice(&[1, 0x11, 0]); // id, sampling, quant table

    // SOS: one component, dc/ac table 0, full spectral range, no SA.
    bytes.extend_from_slice(&[0xFF, 0xDA]);
    bytes.extend_from_slice(&(8u16).to_be_bytes());
    bytes.push(1);
    bytes.extend_from_slice(&[1, 0x00]);
    bytes.extend_from_slice(&[0, 63, 0x00]);

    bytes.push(0x00); // entropy data: DC category 0, AC immediate EOB
    bytes.extend_from_slice(&[0xFF, 0xD9]); // EOI
    bytes
}

#[test]
fn tiny_baseline_image_decodes_to_neutral_gray() {
    let data = tiny_baseline_jpeg();
    let (info, pixels) = Decoder::decode_buffer(&data[..]).expect("decode should succeed");

    assert_eq!(info.width, 8);
    assert_eq!(info.height, 8);
    assert!(!info.is_progressive);
    assert_eq!(info.num_components, 1);

    assert_eq!(pixels.len(), 64);
    for pixel in &pixels {
        assert_eq!((pixel.r, pixel.g, pixel.b), (128, 128, 128));
    }
}

#[test]
fn decoder_open_exposes_info_before_any_pixel_is_decoded() {
    let data = tiny_baseline_jpeg();
    let decoder = Decoder::open(&data[..]).expect("headers should parse");
    let info = decoder.info();
    assert_eq!((info.width, info.height), (8, 8));
    assert_eq!(ColorSpace::from_component_count(info.num_components), Some(ColorSpace::GRAYSCALE));
}

#[test]
fn rejects_non_jpeg_input() {
    let data = [0x00u8, 0x01, 0x02, 0x03];
    let result = Decoder::decode_buffer(&data[..]);
    assert!(matches!(result, Err(DecodeErrors::NotJpeg)));
}

#[test]
fn rejects_frames_over_the_configured_maximum() {
    let data = tiny_baseline_jpeg();
    let options = DecoderOptions {
        max_width: 4,
        max_height: 4,
        strict: false,
    };
    let result = Decoder::open_with_options(&data[..], options);
    assert!(matches!(result, Err(DecodeErrors::UnsupportedProfile(_))));
}

/// A 16x16, 4:2:0 three-component baseline JPEG (Y sampled 2x2, Cb/Cr
/// 1x1, one MCU covering the whole frame): the same trivial DQT/DC/AC
/// tables as `tiny_baseline_jpeg`, shared by all three components, six
/// data units (4 Y + 1 Cb + 1 Cr) each decoding DC category 0 then an
/// immediate AC EOB. Y's true block grid (2x2) is narrower than Cb/Cr's
/// would be if padded to the luma MCU shape, so this exercises MCU
/// addressing across components with different sampling factors.
fn subsampled_baseline_jpeg() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xFF, 0xD8]); // SOI

    // DQT: one 8-bit table, id 0, all entries 1.
    bytes.extend_from_slice(&[0xFF, 0xDB]);
    bytes.extend_from_slice(&(67u16).to_be_bytes());
    bytes.push(0x00);
    bytes.extend(std::iter::repeat(1u8).take(64));

    // DHT: DC table id 0, one code of length 1 -> symbol 0x00.
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(20u16).to_be_bytes());
    bytes.push(0x00);
    bytes.push(1);
    bytes.extend(std::iter::repeat(0u8).take(15));
    bytes.push(0x00);

    // DHT: AC table id 0, same shape.
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(20u16).to_be_bytes());
    bytes.push(0x10);
    bytes.push(1);
    bytes.extend(std::iter::repeat(0u8).take(15));
    bytes.push(0x00);

    // SOF0: 16x16, 3 components, Y sampled 2x2 (4:2:0), Cb/Cr 1x1.
    bytes.extend_from_slice(&[0xFF, 0xC0]);
    bytes.extend_from_slice(&(17u16).to_be_bytes());
    bytes.push(8);
    bytes.extend_from_slice(&(16u16).to_be_bytes());
    bytes.extend_from_slice(&(16u16).to_be_bytes());
    bytes.push(3);
    bytes.extend_from_slice(&[1, 0x22, 0]);
    bytes.extend_from_slice(&[2, 0x11, 0]);
    bytes.extend_from_slice(&[3, 0x11, 0]);

    // SOS: all three components, sharing dc/ac table 0.
    bytes.extend_from_slice(&[0xFF, 0xDA]);
    bytes.extend_from_slice(&(12u16).to_be_bytes());
    bytes.push(3);
    bytes.extend_from_slice(&[1, 0x00]);
    bytes.extend_from_slice(&[2, 0x00]);
    bytes.extend_from_slice(&[3, 0x00]);
    bytes.extend_from_slice(&[0, 63, 0x00]);

    // One MCU, 6 data units (4 Y + 1 Cb + 1 Cr), each DC category 0 then
    // immediate AC EOB: 12 bits of real data padded out to two bytes.
    bytes.extend_from_slice(&[0x00, 0x0F]);
    bytes.extend_from_slice(&[0xFF, 0xD9]); // EOI
    bytes
}

#[test]
fn subsampled_image_decodes_across_the_true_mcu_grid() {
    let data = subsampled_baseline_jpeg();
    let (info, pixels) = Decoder::decode_buffer(&data[..]).expect("decode should succeed");

    assert_eq!((info.width, info.height), (16, 16));
    assert!(!info.is_progressive);
    assert_eq!(info.num_components, 3);

    assert_eq!(pixels.len(), 256);
    for pixel in &pixels {
        assert_eq!((pixel.r, pixel.g, pixel.b), (128, 128, 128));
    }
}

/// An 8x8, single-component progressive JPEG carrying a DC-first scan
/// followed by AC-first and AC-refine scans against a shared 3-symbol AC
/// table (EOB, a new coefficient with a 0 zero-run, and ZRL). The refine
/// scan corrects one coefficient, places a second, then ZRLs across a
/// full run of 16 zero positions before declaring EOB for the rest of
/// the block.
fn progressive_ac_refine_jpeg() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0xFF, 0xD8]); // SOI

    // DQT: one 8-bit table, id 0, all entries 1.
    bytes.extend_from_slice(&[0xFF, 0xDB]);
    bytes.extend_from_slice(&(67u16).to_be_bytes());
    bytes.push(0x00);
    bytes.extend(std::iter::repeat(1u8).take(64));

    // DHT: DC table id 0, one code of length 1 -> symbol 0x00.
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(20u16).to_be_bytes());
    bytes.push(0x00);
    bytes.push(1);
    bytes.extend(std::iter::repeat(0u8).take(15));
    bytes.push(0x00);

    // DHT: AC table id 0, three length-2 codes -> EOB (0x00), a new
    // coefficient with a 0 zero-run (0x01), ZRL (0xF0).
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(22u16).to_be_bytes());
    bytes.push(0x10);
    bytes.push(0);
    bytes.push(3);
    bytes.extend(std::iter::repeat(0u8).take(14));
    bytes.extend_from_slice(&[0x00, 0x01, 0xF0]);

    // SOF2: 8x8, 1 component.
    bytes.extend_from_slice(&[0xFF, 0xC2]);
    bytes.extend_from_slice(&(11u16).to_be_bytes());
    bytes.push(8);
    bytes.extend_from_slice(&(8u16).to_be_bytes());
    bytes.extend_from_slice(&(8u16).to_be_bytes());
    bytes.push(1);
    bytes.extend_from_slice(&[1, 0x11, 0]);

    // Scan 1: DC first, full precision in a single pass (Ah=0, Al=0).
    bytes.extend_from_slice(&[0xFF, 0xDA]);
    bytes.extend_from_slice(&(8u16).to_be_bytes());
    bytes.push(1);
    bytes.extend_from_slice(&[1, 0x00]);
    bytes.extend_from_slice(&[0, 0, 0x00]);
    bytes.push(0x00); // DC category 0, diff 0

    // Scan 2: AC first, Al=1. One new coefficient (0 zero-run, category
    // 1, magnitude bit 1 -> value 1, placed at position 1) followed by
    // an immediate EOB.
    bytes.extend_from_slice(&[0xFF, 0xDA]);
    bytes.extend_from_slice(&(8u16).to_be_bytes());
    bytes.push(1);
    bytes.extend_from_slice(&[1, 0x00]);
    bytes.extend_from_slice(&[1, 63, 0x01]);
    bytes.push(0x67);

    // Scan 3: AC refine, Al=0. Corrects position 1 (2 -> 3), places a
    // new coefficient at position 2, ZRLs across positions 3..=18, then
    // declares EOB for the rest of the block.
    bytes.extend_from_slice(&[0xFF, 0xDA]);
    bytes.extend_from_slice(&(8u16).to_be_bytes());
    bytes.push(1);
    bytes.extend_from_slice(&[1, 0x00]);
    bytes.extend_from_slice(&[1, 63, 0x10]);
    bytes.push(0x78);

    bytes.extend_from_slice(&[0xFF, 0xD9]); // EOI
    bytes
}

#[test]
fn progressive_ac_refine_decodes_past_a_full_zrl_run() {
    let data = progressive_ac_refine_jpeg();
    let (info, pixels) = Decoder::decode_buffer(&data[..]).expect("decode should succeed");

    assert_eq!((info.width, info.height), (8, 8));
    assert!(info.is_progressive);
    assert_eq!(info.num_components, 1);
    assert_eq!(pixels.len(), 64);

    // Coefficients settle at zig-zag position 1 = 3 and position 2 = 1,
    // everything else zero (confirming the ZRL run didn't overrun into
    // or skip past either placed coefficient). The reconstructed block's
    // opposite corners land well clear of their rounding boundary.
    let top_left = pixels[0];
    let bottom_right = pixels[63];
    assert_eq!((top_left.r, top_left.g, top_left.b), (129, 129, 129));
    assert_eq!(
        (bottom_right.r, bottom_right.g, bottom_right.b),
        (127, 127, 127)
    );
}
