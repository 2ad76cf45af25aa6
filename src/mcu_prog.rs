//! Progressive (SOF2) scan decoding: DC-first, DC-refine, AC-first and
//! AC-refine, per ITU T.81 successive approximation.
use std::io::{BufReader, Read};

use crate::bitstream::{decode_sign, BitStream};
use crate::decoder::Decoder;
use crate::errors::DecodeErrors;
use crate::headers::read_marker;
use crate::marker::Marker;

/// A new AC-refine coefficient's `rrrr` names how many already-zero
/// positions in `[start, end]` it sits beyond. Read one refinement bit per
/// nonzero coefficient passed over while counting down those `run` zeros;
/// stop and return the (unconsumed) index of the zero position the new
/// coefficient belongs at (or `end + 1` if the range is exhausted first).
fn refine_skip<R: Read>(
    block: &mut [i16],
    mut run: u8,
    start: usize,
    end: usize,
    stream: &mut BitStream,
    reader: &mut BufReader<R>,
    positive_bit: i16,
    negative_bit: i16,
) -> Result<usize, DecodeErrors> {
    let mut k = start;
    while k <= end {
        if block[k] != 0 {
            if stream.read_bit(reader)? == 1 {
                if block[k] > 0 {
                    block[k] += positive_bit;
                } else {
                    block[k] += negative_bit;
                }
            }
        } else {
            if run == 0 {
                return Ok(k);
            }
            run -= 1;
        }
        k += 1;
    }
    Ok(end + 1)
}

/// ZRL during AC-refine: consume exactly 16 already-zero positions in
/// `[start, end]`, refining every nonzero coefficient passed over along the
/// way, and return the index right after the 16th zero (or `end + 1` if the
/// range is exhausted first). Unlike `refine_skip`, a ZRL never lands on and
/// places a new coefficient, so all 16 zeros are consumed rather than the
/// walk stopping just short of the last one.
fn refine_zrl<R: Read>(
    block: &mut [i16],
    start: usize,
    end: usize,
    stream: &mut BitStream,
    reader: &mut BufReader<R>,
    positive_bit: i16,
    negative_bit: i16,
) -> Result<usize, DecodeErrors> {
    let mut remaining: i8 = 15;
    let mut k = start;
    while k <= end {
        if block[k] != 0 {
            if stream.read_bit(reader)? == 1 {
                if block[k] > 0 {
                    block[k] += positive_bit;
                } else {
                    block[k] += negative_bit;
                }
            }
        } else {
            remaining -= 1;
            if remaining < 0 {
                return Ok(k + 1);
            }
        }
        k += 1;
    }
    Ok(end + 1)
}

/// Refine every nonzero coefficient in `[start, end]` unconditionally; no
/// new coefficients are placed. Used once an EOB run has been declared.
fn refine_all_nonzero<R: Read>(
    block: &mut [i16],
    start: usize,
    end: usize,
    stream: &mut BitStream,
    reader: &mut BufReader<R>,
    positive_bit: i16,
    negative_bit: i16,
) -> Result<(), DecodeErrors> {
    for k in start..=end {
        if block[k] != 0 && stream.read_bit(reader)? == 1 {
            if block[k] > 0 {
                block[k] += positive_bit;
            } else {
                block[k] += negative_bit;
            }
        }
    }
    Ok(())
}

impl<R: Read> Decoder<R> {
    /// Decode the next `step` progressive scans (or all remaining scans if
    /// `step == 0`), reading the SOS that precedes each.
    pub(crate) fn decode_progressive_step(&mut self, step: usize) -> Result<(), DecodeErrors> {
        let mut remaining = step;
        loop {
            if self.eoi_reached {
                break;
            }
            if step != 0 && remaining == 0 {
                break;
            }

            if self.scans_done > 0 {
                if self.advance_to_next_scan()? {
                    self.eoi_reached = true;
                    break;
                }
            }

            self.decode_one_progressive_scan()?;
            self.scans_done += 1;
            if step != 0 {
                remaining -= 1;
            }
        }
        Ok(())
    }

    fn decode_one_progressive_scan(&mut self) -> Result<(), DecodeErrors> {
        let start = usize::from(self.scan_start_spectral);
        let end = usize::from(self.scan_end_spectral);
        let sa_high = self.scan_sa_high;
        let sa_low = self.scan_sa_low;

        debug!(
            "progressive scan: spectral {}..={} sa=({},{}) components={:?}",
            start, end, sa_high, sa_low, self.scan_components
        );

        if start == 0 && end == 0 {
            self.decode_dc_scan(sa_high != 0, sa_low)
        } else {
            self.decode_ac_scan(sa_high != 0, start, end, sa_low)
        }
    }

    /// DC-first / DC-refine. A scan naming more than one component is
    /// interleaved across the MCU grid exactly like a baseline scan; a scan
    /// naming exactly one component is non-interleaved (ITU T.81 A.2.2) and
    /// walks that component's own block grid instead.
    fn decode_dc_scan(&mut self, refine: bool, sa_low: u8) -> Result<(), DecodeErrors> {
        let scan_components = self.scan_components.clone();
        for &comp_idx in &scan_components {
            self.components[comp_idx].dc_pred = 0;
        }
        self.eob_run = 0;

        let mut stream = BitStream::new();
        stream.begin_huff_stream();

        if let [comp_idx] = scan_components[..] {
            self.decode_dc_scan_non_interleaved(comp_idx, refine, sa_low, &mut stream)?;
        } else {
            self.decode_dc_scan_interleaved(&scan_components, refine, sa_low, &mut stream)?;
        }

        stream.align_to_byte();
        stream.end_huff_stream();
        Ok(())
    }

    fn decode_dc_scan_interleaved(
        &mut self,
        scan_components: &[usize],
        refine: bool,
        sa_low: u8,
        stream: &mut BitStream,
    ) -> Result<(), DecodeErrors> {
        let total_mcus = self.mcu_width * self.mcu_height;
        let mut block_count = 0usize;

        'mcus: for mcu_row in 0..self.mcu_height {
            for mcu_col in 0..self.mcu_width {
                for &comp_idx in scan_components {
                    let (h, v) = (
                        self.components[comp_idx].horizontal_sample,
                        self.components[comp_idx].vertical_sample,
                    );
                    for dv in 0..v {
                        for dh in 0..h {
                            let block_row = mcu_row * v + dv;
                            let block_col = mcu_col * h + dh;
                            self.decode_dc_block(
                                comp_idx, block_row, block_col, refine, sa_low, stream,
                            )?;
                        }
                    }
                }

                block_count += 1;
                let at_restart =
                    self.restart_interval > 0 && block_count % self.restart_interval == 0;
                if at_restart && block_count != total_mcus {
                    if self.consume_progressive_restart(stream)? {
                        self.eoi_reached = true;
                        break 'mcus;
                    }
                    for &comp_idx in scan_components {
                        self.components[comp_idx].dc_pred = 0;
                    }
                }
            }
        }
        Ok(())
    }

    fn decode_dc_scan_non_interleaved(
        &mut self,
        comp_idx: usize,
        refine: bool,
        sa_low: u8,
        stream: &mut BitStream,
    ) -> Result<(), DecodeErrors> {
        let blocks_per_line = self.components[comp_idx].true_blocks_per_line;
        let blocks_per_column = self.components[comp_idx].true_blocks_per_column;
        let total_blocks = blocks_per_line * blocks_per_column;
        let mut block_count = 0usize;

        'blocks: for block_row in 0..blocks_per_column {
            for block_col in 0..blocks_per_line {
                self.decode_dc_block(comp_idx, block_row, block_col, refine, sa_low, stream)?;

                block_count += 1;
                let at_restart =
                    self.restart_interval > 0 && block_count % self.restart_interval == 0;
                if at_restart && block_count != total_blocks {
                    if self.consume_progressive_restart(stream)? {
                        self.eoi_reached = true;
                        break 'blocks;
                    }
                    self.components[comp_idx].dc_pred = 0;
                }
            }
        }
        Ok(())
    }

    fn decode_dc_block(
        &mut self,
        comp_idx: usize,
        block_row: usize,
        block_col: usize,
        refine: bool,
        sa_low: u8,
        stream: &mut BitStream,
    ) -> Result<(), DecodeErrors> {
        let blocks_per_line = self.components[comp_idx].blocks_per_line;
        let index = (block_row * blocks_per_line + block_col) * 64;

        if refine {
            let bit = stream.read_bit(&mut self.reader)?;
            if bit == 1 {
                self.coeffs[comp_idx][index] |= 1i16 << sa_low;
            }
            return Ok(());
        }

        let dc_id = self.components[comp_idx].dc_huff_table;
        let new_dc = {
            let dc_table = self.dc_tables[dc_id].as_ref().ok_or_else(|| {
                DecodeErrors::InvalidTableId(format!(
                    "no DC huffman table installed for slot {}",
                    dc_id
                ))
            })?;
            let reader = &mut self.reader;
            let dc_pred = &mut self.components[comp_idx].dc_pred;

            let category = dc_table.decode_symbol(stream, reader)?;
            let diff = if category == 0 {
                0
            } else {
                let bits = stream.read_bits(reader, category)?;
                decode_sign(bits, category)
            };
            *dc_pred += diff;
            *dc_pred
        };
        self.coeffs[comp_idx][index] = (new_dc << sa_low) as i16;
        Ok(())
    }

    /// AC-first / AC-refine: iterates only the single scan component's own
    /// data-unit grid.
    fn decode_ac_scan(
        &mut self,
        refine: bool,
        start: usize,
        end: usize,
        sa_low: u8,
    ) -> Result<(), DecodeErrors> {
        let comp_idx = *self.scan_components.first().ok_or_else(|| {
            DecodeErrors::InvalidScanParams("AC scan names no component".to_string())
        })?;
        self.eob_run = 0;

        let mut stream = BitStream::new();
        stream.begin_huff_stream();

        let blocks_per_line = self.components[comp_idx].true_blocks_per_line;
        let blocks_per_column = self.components[comp_idx].true_blocks_per_column;
        let total_blocks = blocks_per_line * blocks_per_column;
        // Storage stride stays the MCU-padded grid width; only the
        // iteration bound above is the component's true (unpadded) grid.
        let storage_stride = self.components[comp_idx].blocks_per_line;
        let mut block_count = 0usize;

        'blocks: for block_row in 0..blocks_per_column {
            for block_col in 0..blocks_per_line {
                let index = (block_row * storage_stride + block_col) * 64;
                if refine {
                    self.decode_ac_refine_block(comp_idx, index, start, end, sa_low, &mut stream)?;
                } else {
                    self.decode_ac_first_block(comp_idx, index, start, end, sa_low, &mut stream)?;
                }

                block_count += 1;
                let at_restart =
                    self.restart_interval > 0 && block_count % self.restart_interval == 0;
                if at_restart && block_count != total_blocks {
                    if self.consume_progressive_restart(&mut stream)? {
                        self.eoi_reached = true;
                        break 'blocks;
                    }
                    self.eob_run = 0;
                }
            }
        }

        stream.align_to_byte();
        stream.end_huff_stream();
        Ok(())
    }

    fn decode_ac_first_block(
        &mut self,
        comp_idx: usize,
        index: usize,
        start: usize,
        end: usize,
        sa_low: u8,
        stream: &mut BitStream,
    ) -> Result<(), DecodeErrors> {
        if self.eob_run > 0 {
            self.eob_run -= 1;
            return Ok(());
        }

        let ac_id = self.components[comp_idx].ac_huff_table;
        let mut new_eob_run: Option<u16> = None;
        {
            let ac_table = self.ac_tables[ac_id].as_ref().ok_or_else(|| {
                DecodeErrors::InvalidTableId(format!(
                    "no AC huffman table installed for slot {}",
                    ac_id
                ))
            })?;
            let reader = &mut self.reader;
            let block = &mut self.coeffs[comp_idx][index..index + 64];

            let mut k = start;
            while k <= end {
                let rs = ac_table.decode_symbol(stream, reader)?;
                let big = rs >> 4;
                let small = rs & 0x0F;

                if small == 0 && big != 15 {
                    let run = (1u16 << big) + stream.read_bits(reader, big)?;
                    new_eob_run = Some(run - 1);
                    break;
                }
                if small == 0 && big == 15 {
                    k += 16;
                    continue;
                }

                k += usize::from(big);
                if k > end {
                    return Err(DecodeErrors::InvalidRun(format!(
                        "AC-first run advanced past spectral end {} (landed on {})",
                        end, k
                    )));
                }
                let bits = stream.read_bits(reader, small)?;
                block[k] = decode_sign(bits, small) as i16 * (1i16 << sa_low);
                k += 1;
            }
        }
        if let Some(run) = new_eob_run {
            self.eob_run = run;
        }
        Ok(())
    }

    fn decode_ac_refine_block(
        &mut self,
        comp_idx: usize,
        index: usize,
        start: usize,
        end: usize,
        sa_low: u8,
        stream: &mut BitStream,
    ) -> Result<(), DecodeErrors> {
        let positive_bit: i16 = 1i16 << sa_low;
        let negative_bit: i16 = -(1i16 << sa_low);

        if self.eob_run > 0 {
            let reader = &mut self.reader;
            let block = &mut self.coeffs[comp_idx][index..index + 64];
            refine_all_nonzero(block, start, end, stream, reader, positive_bit, negative_bit)?;
            self.eob_run -= 1;
            return Ok(());
        }

        let ac_id = self.components[comp_idx].ac_huff_table;
        let mut new_eob_run: Option<u16> = None;
        let mut k = start;
        while k <= end {
            let rs = {
                let ac_table = self.ac_tables[ac_id].as_ref().ok_or_else(|| {
                    DecodeErrors::InvalidTableId(format!(
                        "no AC huffman table installed for slot {}",
                        ac_id
                    ))
                })?;
                let reader = &mut self.reader;
                ac_table.decode_symbol(stream, reader)?
            };
            let big = rs >> 4;
            let small = rs & 0x0F;

            if small == 0 {
                if big == 15 {
                    let reader = &mut self.reader;
                    let block = &mut self.coeffs[comp_idx][index..index + 64];
                    k = refine_zrl(block, k, end, stream, reader, positive_bit, negative_bit)?;
                } else {
                    let reader = &mut self.reader;
                    let run = (1u16 << big) + stream.read_bits(reader, big)?;
                    let block = &mut self.coeffs[comp_idx][index..index + 64];
                    refine_all_nonzero(block, k, end, stream, reader, positive_bit, negative_bit)?;
                    new_eob_run = Some(run - 1);
                    break;
                }
            } else {
                let reader = &mut self.reader;
                let bit = stream.read_bit(reader)?;
                let coeff = if bit == 1 { positive_bit } else { negative_bit };
                let block = &mut self.coeffs[comp_idx][index..index + 64];
                let target =
                    refine_skip(block, big, k, end, stream, reader, positive_bit, negative_bit)?;
                if target > end {
                    return Err(DecodeErrors::InvalidRun(format!(
                        "AC-refine new coefficient landed past spectral end {} (at {})",
                        end, target
                    )));
                }
                block[target] = coeff;
                k = target + 1;
            }
        }
        if let Some(run) = new_eob_run {
            self.eob_run = run;
        }
        Ok(())
    }

    /// Byte-align, leave the entropy stream, and consume the marker that
    /// must follow a progressive restart boundary.
    fn consume_progressive_restart(&mut self, stream: &mut BitStream) -> Result<bool, DecodeErrors> {
        stream.align_to_byte();
        stream.end_huff_stream();
        let marker = read_marker(&mut self.reader)?;
        match marker {
            Marker::RST(_) => {
                stream.begin_huff_stream();
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
