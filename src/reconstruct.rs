//! Dequantize, un-zig-zag, inverse-DCT, upsample and color-convert the
//! coefficient grid into the caller's pixel buffer.
use std::io::Read;

use crate::color_convert::ycbcr_to_rgb;
use crate::decoder::Decoder;
use crate::errors::DecodeErrors;
use crate::idct::idct_8x8;
use crate::misc::{dequantize, UN_ZIGZAG};
use crate::pixel::PixelGrid;

impl<R: Read> Decoder<R> {
    /// Reconstruct the entire MCU grid from current coefficient state.
    /// Safe to call repeatedly on partially-refined progressive data: this
    /// only reads `self.coeffs`, never mutates it.
    pub(crate) fn reconstruct_all(&mut self, grid: &mut PixelGrid) -> Result<(), DecodeErrors> {
        for mcu_row in 0..self.mcu_height {
            for mcu_col in 0..self.mcu_width {
                self.reconstruct_mcu(mcu_row, mcu_col, grid)?;
            }
        }
        Ok(())
    }

    /// Reconstruct the single MCU cell at `(mcu_row, mcu_col)` and write its
    /// pixels into `grid`.
    pub(crate) fn reconstruct_mcu(
        &self,
        mcu_row: usize,
        mcu_col: usize,
        grid: &mut PixelGrid,
    ) -> Result<(), DecodeErrors> {
        let mcu_w = 8 * self.max_h;
        let mcu_h = 8 * self.max_v;
        let mcu_pixel_x0 = mcu_col * mcu_w;
        let mcu_pixel_y0 = mcu_row * mcu_h;

        let mut planes: Vec<Vec<i16>> = Vec::with_capacity(self.components.len());

        for (comp_idx, comp) in self.components.iter().enumerate() {
            let quant = self.quant_tables[usize::from(comp.quantization_table_number)].ok_or_else(|| {
                DecodeErrors::InvalidTableId(format!(
                    "no quantization table installed for slot {}",
                    comp.quantization_table_number
                ))
            })?;

            let mut plane = vec![0i16; mcu_w * mcu_h];
            let h_factor = self.max_h / comp.horizontal_sample;
            let v_factor = self.max_v / comp.vertical_sample;

            for dv in 0..comp.vertical_sample {
                for dh in 0..comp.horizontal_sample {
                    let block_row = mcu_row * comp.vertical_sample + dv;
                    let block_col = mcu_col * comp.horizontal_sample + dh;
                    let index = (block_row * comp.blocks_per_line + block_col) * 64;

                    let mut zigzag = [0i16; 64];
                    zigzag.copy_from_slice(&self.coeffs[comp_idx][index..index + 64]);
                    let dequantized = dequantize(&zigzag, &quant);

                    let mut natural = [0i32; 64];
                    for i in 0..64 {
                        natural[UN_ZIGZAG[i]] = dequantized[i];
                    }

                    let spatial = idct_8x8(&natural);
                    let mut tile = [0i16; 64];
                    for (dst, src) in tile.iter_mut().zip(spatial.iter()) {
                        *dst = (*src + 128.0).round() as i16;
                    }

                    let upsampled = (comp.up_sampler)(&tile, h_factor, v_factor);
                    let tile_w = 8 * h_factor;
                    let tile_h = 8 * v_factor;
                    let origin_x = dh * tile_w;
                    let origin_y = dv * tile_h;

                    for row in 0..tile_h {
                        for col in 0..tile_w {
                            plane[(origin_y + row) * mcu_w + (origin_x + col)] =
                                upsampled[row * tile_w + col];
                        }
                    }
                }
            }
            planes.push(plane);
        }

        for y in 0..mcu_h {
            for x in 0..mcu_w {
                let y_val = f32::from(planes[0][y * mcu_w + x]);
                let (cb_val, cr_val) = if planes.len() >= 3 {
                    (
                        f32::from(planes[1][y * mcu_w + x]),
                        f32::from(planes[2][y * mcu_w + x]),
                    )
                } else {
                    (128.0, 128.0)
                };
                let pixel = ycbcr_to_rgb(y_val, cb_val, cr_val);
                grid.set(mcu_pixel_x0 + x, mcu_pixel_y0 + y, pixel);
            }
        }

        Ok(())
    }
}
