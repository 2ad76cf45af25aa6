//! Decode JPEG markers/segments
//!
//! This file deals with decoding header information in a JPEG file: walking
//! the marker-prefixed segments that precede each scan (SOI, APPn, DQT,
//! DHT, DRI, SOF0/SOF2, SOS) and populating the decoder's shared state.
use std::io::{BufReader, Read};

use crate::components::Component;
use crate::decoder::Decoder;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::misc::{read_exact_vec, read_u16_be, read_u8, skip, ColorSpace};
use crate::upsampler::{upsample_nearest, upsample_no_op};

/// Read a marker code off the byte reader: a 0xFF prefix (absorbing any
/// 0xFF fill bytes) followed by the marker's identifying byte.
pub(crate) fn read_marker<R: Read>(reader: &mut BufReader<R>) -> Result<Marker, DecodeErrors> {
    let first = read_u8(reader)?;
    if first != 0xFF {
        return Err(DecodeErrors::UnexpectedMarker(format!(
            "expected marker prefix 0xFF, found 0x{:02X}",
            first
        )));
    }
    let mut code = read_u8(reader)?;
    while code == 0xFF {
        code = read_u8(reader)?;
    }
    Marker::from_u8(code)
        .ok_or_else(|| DecodeErrors::UnexpectedMarker(format!("invalid marker code 0x{:02X}", code)))
}

fn read_nibble_pair<R: Read>(reader: &mut BufReader<R>) -> Result<(u8, u8), DecodeErrors> {
    let byte = read_u8(reader)?;
    Ok((byte >> 4, byte & 0x0F))
}

impl<R: Read> Decoder<R> {
    fn expect_soi(&mut self) -> Result<(), DecodeErrors> {
        let mut tmp = [0u8; 2];
        self.reader.read_exact(&mut tmp).map_err(|_| DecodeErrors::NotJpeg)?;
        if tmp != [0xFF, 0xD8] {
            return Err(DecodeErrors::NotJpeg);
        }
        Ok(())
    }

    /// Parse SOI, all table-or-misc segments, and the frame header, then
    /// the first SOS, leaving the reader positioned at the start of the
    /// entropy-coded data.
    pub(crate) fn decode_headers(&mut self) -> Result<(), DecodeErrors> {
        self.expect_soi()?;
        let mut sof_seen = false;

        loop {
            let marker = read_marker(&mut self.reader)?;
            match marker {
                Marker::APP(_) | Marker::COM => self.parse_app()?,
                Marker::DQT => self.parse_dqt()?,
                Marker::DHT => self.parse_dht()?,
                Marker::DRI => self.parse_dri()?,
                Marker::SOF(code) if code == 0xC0 || code == 0xC2 => {
                    self.parse_sof(code == 0xC2)?;
                    sof_seen = true;
                }
                Marker::SOF(code) => {
                    return Err(DecodeErrors::UnsupportedProfile(format!(
                        "frame marker 0x{:02X} is not SOF0 (baseline) or SOF2 (progressive)",
                        code
                    )));
                }
                Marker::SOS => {
                    if !sof_seen {
                        return Err(DecodeErrors::UnexpectedMarker(
                            "SOS encountered before a frame header".to_string(),
                        ));
                    }
                    self.parse_sos()?;
                    break;
                }
                Marker::EOI => {
                    return Err(DecodeErrors::UnexpectedMarker(
                        "EOI encountered before any scan".to_string(),
                    ));
                }
                other => {
                    return Err(DecodeErrors::UnexpectedMarker(format!(
                        "unexpected {:?} while scanning headers",
                        other
                    )));
                }
            }
        }

        self.headers_done = true;
        Ok(())
    }

    /// Walk table-or-misc segments after a scan's entropy data has been
    /// fully consumed, stopping at the next SOS (parsed in place, returns
    /// `false`) or EOI (returns `true`). Used by the progressive decoder to
    /// step between scans.
    pub(crate) fn advance_to_next_scan(&mut self) -> Result<bool, DecodeErrors> {
        loop {
            let marker = read_marker(&mut self.reader)?;
            match marker {
                Marker::APP(_) | Marker::COM => self.parse_app()?,
                Marker::DQT => self.parse_dqt()?,
                Marker::DHT => self.parse_dht()?,
                Marker::DRI => self.parse_dri()?,
                Marker::SOS => {
                    self.parse_sos()?;
                    return Ok(false);
                }
                Marker::EOI => return Ok(true),
                other => {
                    return Err(DecodeErrors::UnexpectedMarker(format!(
                        "unexpected {:?} between scans",
                        other
                    )));
                }
            }
        }
    }

    /// APPn / COM: skip the payload, it carries nothing the core needs.
    fn parse_app(&mut self) -> Result<(), DecodeErrors> {
        let length = read_u16_be(&mut self.reader)?;
        skip(&mut self.reader, usize::from(length.saturating_sub(2)))
    }

    /// DQT: one or more 8-bit quantization tables, zig-zag ordered.
    fn parse_dqt(&mut self) -> Result<(), DecodeErrors> {
        let length = read_u16_be(&mut self.reader)?;
        let mut remaining = length
            .checked_sub(2)
            .ok_or(DecodeErrors::TruncatedStream)?;

        while remaining > 0 {
            let info_byte = read_u8(&mut self.reader)?;
            let precision = info_byte >> 4;
            let id = info_byte & 0x0F;

            if id >= 4 {
                return Err(DecodeErrors::InvalidTableId(format!(
                    "DQT destination id {} outside 0..=3",
                    id
                )));
            }
            if precision != 0 {
                return Err(DecodeErrors::UnsupportedProfile(
                    "16-bit quantization table precision is not supported".to_string(),
                ));
            }

            let raw = read_exact_vec(&mut self.reader, 64)?;
            let mut table = [0u16; 64];
            for (slot, byte) in table.iter_mut().zip(raw.iter()) {
                *slot = u16::from(*byte);
            }
            self.quant_tables[usize::from(id)] = Some(table);
            remaining -= 1 + 64;
        }
        Ok(())
    }

    /// DHT: one or more Huffman tables (DC or AC, 4 slots each).
    fn parse_dht(&mut self) -> Result<(), DecodeErrors> {
        let length = read_u16_be(&mut self.reader)?;
        let mut remaining = length
            .checked_sub(2)
            .ok_or(DecodeErrors::TruncatedStream)?;

        while remaining > 0 {
            let info_byte = read_u8(&mut self.reader)?;
            let class = info_byte >> 4;
            let id = info_byte & 0x0F;

            if id >= 4 || class > 1 {
                return Err(DecodeErrors::InvalidTableId(format!(
                    "DHT class {} id {} outside the (0|1, 0..=3) range",
                    class, id
                )));
            }

            let counts_raw = read_exact_vec(&mut self.reader, 16)?;
            let mut counts = [0u8; 16];
            counts.copy_from_slice(&counts_raw);
            let total: u16 = counts.iter().map(|&c| u16::from(c)).sum();
            let symbols = read_exact_vec(&mut self.reader, usize::from(total))?;

            let table = HuffmanTable::new(&counts, symbols)?;
            if class == 0 {
                self.dc_tables[usize::from(id)] = Some(table);
            } else {
                self.ac_tables[usize::from(id)] = Some(table);
            }
            remaining -= 17 + total;
        }
        Ok(())
    }

    /// DRI: redefine the restart interval (MCUs between RSTn markers).
    fn parse_dri(&mut self) -> Result<(), DecodeErrors> {
        let _length = read_u16_be(&mut self.reader)?;
        let interval = read_u16_be(&mut self.reader)?;
        debug!("restart interval set to {} MCUs", interval);
        self.restart_interval = usize::from(interval);
        Ok(())
    }

    /// SOF0 / SOF2: frame dimensions, sample precision, and per-component
    /// sampling/quantization bindings. Allocates the coefficient grid.
    fn parse_sof(&mut self, progressive: bool) -> Result<(), DecodeErrors> {
        let length = read_u16_be(&mut self.reader)?;
        let precision = read_u8(&mut self.reader)?;
        if precision != 8 {
            return Err(DecodeErrors::UnsupportedProfile(format!(
                "sample precision {} bits, only 8-bit is supported",
                precision
            )));
        }

        let height = read_u16_be(&mut self.reader)?;
        let width = read_u16_be(&mut self.reader)?;
        if width == 0 || height == 0 {
            return Err(DecodeErrors::UnsupportedProfile(
                "frame has a zero dimension".to_string(),
            ));
        }
        if width > self.options.max_width || height > self.options.max_height {
            return Err(DecodeErrors::UnsupportedProfile(format!(
                "frame {}x{} exceeds configured maximum {}x{}",
                width, height, self.options.max_width, self.options.max_height
            )));
        }

        let num_components = read_u8(&mut self.reader)?;
        if num_components == 0 || num_components > 3 {
            return Err(DecodeErrors::UnsupportedProfile(format!(
                "{} components, only 1..=3 are supported",
                num_components
            )));
        }
        let expected_length = 8 + 3 * u16::from(num_components);
        if length != expected_length {
            return Err(DecodeErrors::UnexpectedMarker(format!(
                "SOF length {} does not match {} components",
                length, num_components
            )));
        }

        let mut components = Vec::with_capacity(usize::from(num_components));
        for _ in 0..num_components {
            let raw = read_exact_vec(&mut self.reader, 3)?;
            components.push(Component::from_sof_bytes([raw[0], raw[1], raw[2]])?);
        }

        let max_h = components.iter().map(|c| c.horizontal_sample).max().unwrap();
        let max_v = components.iter().map(|c| c.vertical_sample).max().unwrap();
        let mcu_width = (usize::from(width) + 8 * max_h - 1) / (8 * max_h);
        let mcu_height = (usize::from(height) + 8 * max_v - 1) / (8 * max_v);

        let mut coeffs = Vec::with_capacity(components.len());
        for comp in components.iter_mut() {
            comp.blocks_per_line = mcu_width * comp.horizontal_sample;
            comp.blocks_per_column = mcu_height * comp.vertical_sample;

            // ITU T.81 A.1.1: a component's true sample dimensions are the
            // frame's, scaled by its sampling ratio and rounded up, not the
            // MCU-padded dimensions every component shares.
            let comp_width = (usize::from(width) * comp.horizontal_sample + max_h - 1) / max_h;
            let comp_height = (usize::from(height) * comp.vertical_sample + max_v - 1) / max_v;
            comp.true_blocks_per_line = (comp_width + 7) / 8;
            comp.true_blocks_per_column = (comp_height + 7) / 8;

            comp.up_sampler = if comp.horizontal_sample == max_h && comp.vertical_sample == max_v {
                upsample_no_op
            } else {
                upsample_nearest
            };
            coeffs.push(vec![0i16; comp.blocks_per_line * comp.blocks_per_column * 64]);
        }

        self.color_space = ColorSpace::from_component_count(components.len()).ok_or_else(|| {
            DecodeErrors::UnsupportedProfile(format!(
                "{} components has no supported color space",
                components.len()
            ))
        })?;

        info!(
            "frame: {}x{} components={} progressive={} max_sampling=({},{})",
            width,
            height,
            components.len(),
            progressive,
            max_h,
            max_v
        );

        self.components = components;
        self.max_h = max_h;
        self.max_v = max_v;
        self.mcu_width = mcu_width;
        self.mcu_height = mcu_height;
        self.coeffs = coeffs;
        self.info.width = width;
        self.info.height = height;
        self.info.is_progressive = progressive;
        self.info.num_components = self.components.len();
        Ok(())
    }

    /// SOS: which components this scan addresses and in what spectral /
    /// successive-approximation range.
    pub(crate) fn parse_sos(&mut self) -> Result<(), DecodeErrors> {
        let _length = read_u16_be(&mut self.reader)?;
        let ns = read_u8(&mut self.reader)?;
        if ns == 0 || usize::from(ns) > self.components.len() {
            return Err(DecodeErrors::InvalidScanParams(format!(
                "SOS declares {} components, frame has {}",
                ns,
                self.components.len()
            )));
        }

        for component in &mut self.components {
            component.used_in_scan = false;
        }

        let mut order = Vec::with_capacity(usize::from(ns));
        for _ in 0..ns {
            let selector = read_u8(&mut self.reader)?;
            let (dc_id, ac_id) = read_nibble_pair(&mut self.reader)?;
            if dc_id >= 4 || ac_id >= 4 {
                return Err(DecodeErrors::InvalidTableId(format!(
                    "SOS huffman ids (dc={}, ac={}) outside 0..=3",
                    dc_id, ac_id
                )));
            }
            let index = self
                .components
                .iter()
                .position(|c| c.id == selector)
                .ok_or_else(|| {
                    DecodeErrors::UnexpectedMarker(format!(
                        "SOS component selector {} matches no SOF component",
                        selector
                    ))
                })?;
            self.components[index].dc_huff_table = usize::from(dc_id);
            self.components[index].ac_huff_table = usize::from(ac_id);
            self.components[index].used_in_scan = true;
            order.push(index);
        }

        let start_spectral = read_u8(&mut self.reader)?;
        let end_spectral = read_u8(&mut self.reader)?;
        let (sa_high, sa_low) = read_nibble_pair(&mut self.reader)?;

        if start_spectral > end_spectral || end_spectral > 63 {
            return Err(DecodeErrors::InvalidScanParams(format!(
                "spectral range {}..{} invalid (must be start <= end <= 63)",
                start_spectral, end_spectral
            )));
        }

        debug!(
            "scan: components={:?} spectral={}..={} sa=({},{})",
            order, start_spectral, end_spectral, sa_high, sa_low
        );

        self.scan_start_spectral = start_spectral;
        self.scan_end_spectral = end_spectral;
        self.scan_sa_high = sa_high;
        self.scan_sa_low = sa_low;
        self.scan_components = order;
        Ok(())
    }
}
