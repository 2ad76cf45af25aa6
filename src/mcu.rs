//! Baseline (SOF0) scan decoding: one interleaved MCU at a time, decoded
//! incrementally a row-band per `decode_next` call.
use std::io::{BufReader, Read};

use crate::bitstream::{decode_sign, BitStream};
use crate::decoder::{BaselineScan, Decoder};
use crate::errors::DecodeErrors;
use crate::headers::read_marker;
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::pixel::PixelGrid;

/// Decode one DC coefficient: Huffman category, magnitude bits, sign
/// extension, delta against the running predictor. Returns the new
/// (absolute) DC value and updates `dc_pred` in place.
pub(crate) fn decode_dc<R: Read>(
    stream: &mut BitStream,
    reader: &mut BufReader<R>,
    dc_table: &HuffmanTable,
    dc_pred: &mut i32,
) -> Result<i32, DecodeErrors> {
    let category = dc_table.decode_symbol(stream, reader)?;
    let diff = if category == 0 {
        0
    } else {
        let bits = stream.read_bits(reader, category)?;
        decode_sign(bits, category)
    };
    *dc_pred += diff;
    Ok(*dc_pred)
}

/// Decode the baseline AC run for one 8x8 block (spectral positions
/// 1..=63) into `block`, which must already hold the DC value at index 0.
pub(crate) fn decode_baseline_ac<R: Read>(
    stream: &mut BitStream,
    reader: &mut BufReader<R>,
    ac_table: &HuffmanTable,
    block: &mut [i16],
) -> Result<(), DecodeErrors> {
    let mut k = 1usize;
    while k <= 63 {
        let rs = ac_table.decode_symbol(stream, reader)?;
        let big = rs >> 4;
        let small = rs & 0x0F;

        if small == 0 && big == 0 {
            break; // end of block
        }
        if small == 0 && big == 15 {
            k += 16;
            continue;
        }

        k += usize::from(big);
        if k > 63 {
            return Err(DecodeErrors::InvalidRun(format!(
                "AC run advanced past index 63 (landed on {})",
                k
            )));
        }
        let bits = stream.read_bits(reader, small)?;
        block[k] = decode_sign(bits, small) as i16;
        k += 1;
    }
    Ok(())
}

impl<R: Read> Decoder<R> {
    /// Decode the next `step` MCU rows of the current baseline scan (or all
    /// remaining rows if `step == 0`), reconstructing each completed row
    /// into `grid` as it finishes.
    pub(crate) fn decode_baseline_step(
        &mut self,
        step: usize,
        grid: &mut PixelGrid,
    ) -> Result<(), DecodeErrors> {
        if self.baseline_scan.is_none() {
            for component in &mut self.components {
                component.dc_pred = 0;
            }
            let mut bitstream = BitStream::new();
            bitstream.begin_huff_stream();
            self.baseline_scan = Some(BaselineScan {
                bitstream,
                block_count: 0,
                next_mcu_row: 0,
            });
        }

        let start_row = self.baseline_scan.as_ref().unwrap().next_mcu_row;
        let rows_target = if step == 0 {
            self.mcu_height
        } else {
            (start_row + step).min(self.mcu_height)
        };
        let total_mcus = self.mcu_width * self.mcu_height;

        let mut row = start_row;
        'rows: while row < rows_target {
            for col in 0..self.mcu_width {
                self.decode_mcu(row, col)?;

                let block_count = {
                    let scan = self.baseline_scan.as_mut().unwrap();
                    scan.block_count += 1;
                    scan.block_count
                };
                let at_restart = self.restart_interval > 0 && block_count % self.restart_interval == 0;

                if at_restart && block_count != total_mcus {
                    if self.consume_restart()? {
                        self.eoi_reached = true;
                        self.baseline_scan = None;
                        break 'rows;
                    }
                }
            }
            row += 1;
            self.baseline_scan.as_mut().unwrap().next_mcu_row = row;
        }

        for r in start_row..row {
            for col in 0..self.mcu_width {
                self.reconstruct_mcu(r, col, grid)?;
            }
        }

        if !self.eoi_reached && row >= self.mcu_height {
            {
                let scan = self.baseline_scan.as_mut().unwrap();
                scan.bitstream.align_to_byte();
                scan.bitstream.end_huff_stream();
            }
            let marker = read_marker(&mut self.reader)?;
            if !matches!(marker, Marker::EOI) {
                return Err(DecodeErrors::UnexpectedMarker(format!(
                    "expected EOI after the final MCU, found {:?}",
                    marker
                )));
            }
            self.eoi_reached = true;
            self.baseline_scan = None;
        }

        Ok(())
    }

    /// Decode every used component's data units for one MCU cell.
    fn decode_mcu(&mut self, mcu_row: usize, mcu_col: usize) -> Result<(), DecodeErrors> {
        for comp_idx in 0..self.components.len() {
            if !self.components[comp_idx].used_in_scan {
                continue;
            }
            let (h, v) = (
                self.components[comp_idx].horizontal_sample,
                self.components[comp_idx].vertical_sample,
            );
            for dv in 0..v {
                for dh in 0..h {
                    let block_row = mcu_row * v + dv;
                    let block_col = mcu_col * h + dh;
                    self.decode_block(comp_idx, block_row, block_col)?;
                }
            }
        }
        Ok(())
    }

    fn decode_block(
        &mut self,
        comp_idx: usize,
        block_row: usize,
        block_col: usize,
    ) -> Result<(), DecodeErrors> {
        let dc_id = self.components[comp_idx].dc_huff_table;
        let ac_id = self.components[comp_idx].ac_huff_table;
        let blocks_per_line = self.components[comp_idx].blocks_per_line;
        let index = (block_row * blocks_per_line + block_col) * 64;

        let dc_table = self.dc_tables[dc_id].as_ref().ok_or_else(|| {
            DecodeErrors::InvalidTableId(format!("no DC huffman table installed for slot {}", dc_id))
        })?;
        let ac_table = self.ac_tables[ac_id].as_ref().ok_or_else(|| {
            DecodeErrors::InvalidTableId(format!("no AC huffman table installed for slot {}", ac_id))
        })?;
        let scan = self.baseline_scan.as_mut().unwrap();
        let stream = &mut scan.bitstream;
        let reader = &mut self.reader;
        let dc_pred = &mut self.components[comp_idx].dc_pred;

        let dc_value = decode_dc(stream, reader, dc_table, dc_pred)?;
        let block = &mut self.coeffs[comp_idx][index..index + 64];
        block[0] = dc_value as i16;
        decode_baseline_ac(stream, reader, ac_table, block)
    }

    /// Byte-align, leave the entropy stream, and consume the marker that
    /// must follow: a restart marker (reset DC predictors, resume) or EOI
    /// (true, end of image).
    fn consume_restart(&mut self) -> Result<bool, DecodeErrors> {
        {
            let scan = self.baseline_scan.as_mut().unwrap();
            scan.bitstream.align_to_byte();
            scan.bitstream.end_huff_stream();
        }
        let marker = read_marker(&mut self.reader)?;
        match marker {
            Marker::RST(_) => {
                for component in &mut self.components {
                    component.dc_pred = 0;
                }
                self.baseline_scan.as_mut().unwrap().bitstream.begin_huff_stream();
                Ok(false)
            }
            Marker::EOI => Ok(true),
            other => Err(DecodeErrors::UnexpectedMarker(format!(
                "expected a restart marker, found {:?}",
                other
            ))),
        }
    }
}
