//! A trivial little-endian BMP encoder: 14-byte BITMAPFILEHEADER followed
//! by a 12-byte BITMAPCOREHEADER, 24-bit BGR pixel data, bottom-up row
//! order, each row padded to a multiple of 4 bytes. Good enough to view
//! decoded output; not a general-purpose BMP writer.
use std::io::{self, Write};

use crate::pixel::Rgb8;

/// Write `pixels` (row-major, top row first, `width * height` entries) as a
/// BMP to `writer`.
pub fn write_bmp<W: Write>(
    writer: &mut W,
    width: u16,
    height: u16,
    pixels: &[Rgb8],
) -> io::Result<()> {
    let width = usize::from(width);
    let height = usize::from(height);
    assert_eq!(pixels.len(), width * height);

    let row_bytes = width * 3;
    let padding = (4 - row_bytes % 4) % 4;
    let pixel_data_size = (row_bytes + padding) * height;
    let file_size = 14 + 12 + pixel_data_size;
    let pixel_data_offset: u32 = 14 + 12;

    // BITMAPFILEHEADER
    writer.write_all(b"BM")?;
    writer.write_all(&(file_size as u32).to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?; // reserved1
    writer.write_all(&0u16.to_le_bytes())?; // reserved2
    writer.write_all(&pixel_data_offset.to_le_bytes())?;

    // BITMAPCOREHEADER
    writer.write_all(&12u32.to_le_bytes())?; // header size
    writer.write_all(&(width as u16).to_le_bytes())?;
    writer.write_all(&(height as u16).to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // planes
    writer.write_all(&24u16.to_le_bytes())?; // bits per pixel

    let pad = [0u8; 3];
    for row in (0..height).rev() {
        for col in 0..width {
            let pixel = pixels[row * width + col];
            writer.write_all(&[pixel.b, pixel.g, pixel.r])?;
        }
        writer.write_all(&pad[..padding])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes_and_row_padding() {
        let pixels = vec![Rgb8::new(1, 2, 3); 3 * 2];
        let mut out = Vec::new();
        write_bmp(&mut out, 3, 2, &pixels).unwrap();

        // 14 (file header) + 12 (core header) + 2 rows * (9 bytes pixel + 3 padding)
        assert_eq!(out.len(), 14 + 12 + 2 * 12);
        assert_eq!(&out[0..2], b"BM");
    }

    #[test]
    fn rows_are_bottom_up_and_bgr_ordered() {
        let mut pixels = vec![Rgb8::new(0, 0, 0); 4];
        pixels[0] = Rgb8::new(10, 20, 30); // top-left
        pixels[2] = Rgb8::new(40, 50, 60); // bottom-left
        let mut out = Vec::new();
        write_bmp(&mut out, 2, 2, &pixels).unwrap();

        let pixel_data = &out[26..];
        // first row written is the image's bottom row (pixels[2])
        assert_eq!(&pixel_data[0..3], &[60, 50, 40]);
    }
}
