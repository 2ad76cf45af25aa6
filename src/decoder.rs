//! The decoder facade: lifecycle (`open` -> iterate scans -> reconstruct),
//! owning all shared decoder state.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::bitstream::BitStream;
use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::ColorSpace;
use crate::pixel::{PixelGrid, Rgb8};

/// Caller-tunable limits. Mirrors the single piece of "configuration" the
/// original decoder exposes: a sanity cap on frame dimensions, guarding
/// against a crafted SOF header claiming an absurd image size.
#[derive(Copy, Clone, Debug)]
pub struct DecoderOptions {
    pub max_width: u16,
    pub max_height: u16,
    /// Promote normally-tolerated oddities (an SOS component selector that
    /// doesn't match any SOF component, for instance) to hard errors.
    pub strict: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_width: u16::MAX,
            max_height: u16::MAX,
            strict: false,
        }
    }
}

/// Frame-level metadata, available after `open` returns.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageInfo {
    pub width: u16,
    pub height: u16,
    pub is_progressive: bool,
    pub num_components: usize,
}

/// Tracks the in-flight baseline scan so `decode_next` can resume mid-scan
/// across multiple calls.
pub(crate) struct BaselineScan {
    pub bitstream: BitStream,
    pub block_count: usize,
    pub next_mcu_row: usize,
}

/// The JPEG decoder. Owns the byte reader exclusively; the pixel grid is
/// borrowed only for the duration of a `decode_next` call.
pub struct Decoder<R: Read> {
    pub(crate) reader: BufReader<R>,
    pub(crate) options: DecoderOptions,
    pub(crate) info: ImageInfo,
    pub(crate) color_space: ColorSpace,
    pub(crate) components: Vec<Component>,
    pub(crate) quant_tables: [Option<[u16; 64]>; 4],
    pub(crate) dc_tables: [Option<HuffmanTable>; 4],
    pub(crate) ac_tables: [Option<HuffmanTable>; 4],
    pub(crate) restart_interval: usize,
    pub(crate) max_h: usize,
    pub(crate) max_v: usize,
    pub(crate) mcu_width: usize,
    pub(crate) mcu_height: usize,
    /// Per-component coefficient grid, zig-zag order, one `i16` block of 64
    /// per data unit. Indexed `(block_row * blocks_per_line + block_col) *
    /// 64 + zigzag_index`.
    pub(crate) coeffs: Vec<Vec<i16>>,
    pub(crate) headers_done: bool,
    pub(crate) eoi_reached: bool,
    pub(crate) baseline_scan: Option<BaselineScan>,
    pub(crate) scans_done: usize,
    /// Current scan's spectral/approximation parameters and which
    /// components it touches, set by the most recent SOS.
    pub(crate) scan_start_spectral: u8,
    pub(crate) scan_end_spectral: u8,
    pub(crate) scan_sa_high: u8,
    pub(crate) scan_sa_low: u8,
    pub(crate) scan_components: Vec<usize>,
    /// Progressive AC end-of-band run counter, carried across coefficient
    /// blocks within a scan; reset at every RSTn and scan boundary.
    pub(crate) eob_run: u16,
}

impl<R: Read> Decoder<R> {
    fn blank(reader: BufReader<R>, options: DecoderOptions) -> Decoder<R> {
        Decoder {
            reader,
            options,
            info: ImageInfo::default(),
            color_space: ColorSpace::YCbCr,
            components: Vec::new(),
            quant_tables: [None, None, None, None],
            dc_tables: [None, None, None, None],
            ac_tables: [None, None, None, None],
            restart_interval: 0,
            max_h: 1,
            max_v: 1,
            mcu_width: 0,
            mcu_height: 0,
            coeffs: Vec::new(),
            headers_done: false,
            eoi_reached: false,
            baseline_scan: None,
            scans_done: 0,
            scan_start_spectral: 0,
            scan_end_spectral: 63,
            scan_sa_high: 0,
            scan_sa_low: 0,
            scan_components: Vec::new(),
            eob_run: 0,
        }
    }

    /// Parse SOI, every table-or-misc segment, and the frame header.
    /// Returns a handle exposing `info()` once the frame dimensions are
    /// known; no entropy data is touched yet.
    pub fn open(source: R) -> Result<Decoder<R>, DecodeErrors> {
        Decoder::open_with_options(source, DecoderOptions::default())
    }

    pub fn open_with_options(
        source: R,
        options: DecoderOptions,
    ) -> Result<Decoder<R>, DecodeErrors> {
        let mut decoder = Decoder::blank(BufReader::new(source), options);
        decoder.decode_headers()?;
        Ok(decoder)
    }

    /// Frame metadata gathered during `open`.
    pub fn info(&self) -> ImageInfo {
        self.info
    }

    /// Decode the next unit of work and write current pixel state into
    /// `grid`. Convenience wrapper that always runs to completion; see
    /// `decode_next_n` to step through `n` units at a time.
    pub fn decode_next(&mut self, grid: &mut PixelGrid) -> Result<bool, DecodeErrors> {
        self.decode_next_n(grid, 0)
    }

    /// For a baseline frame a "unit" is one row of MCUs; for a progressive
    /// frame it is one scan. `step == 0` means "run to completion".
    /// Returns `true` once the image is fully decoded (EOI consumed).
    pub fn decode_next_n(&mut self, grid: &mut PixelGrid, step: usize) -> Result<bool, DecodeErrors> {
        if grid.width != usize::from(self.info.width) || grid.height != usize::from(self.info.height)
        {
            return Err(DecodeErrors::BufferSize(format!(
                "decoder opened a {}x{} image, grid is {}x{}",
                self.info.width, self.info.height, grid.width, grid.height
            )));
        }

        if self.info.is_progressive {
            self.decode_progressive_step(step)?;
            self.reconstruct_all(grid)?;
        } else {
            self.decode_baseline_step(step, grid)?;
        }

        Ok(self.eoi_reached)
    }

    /// Drive the whole lifecycle to completion and return the final pixels
    /// packed row-major.
    pub fn decode_buffer(source: R) -> Result<(ImageInfo, Vec<Rgb8>), DecodeErrors> {
        let mut decoder = Decoder::open(source)?;
        let info = decoder.info();
        let mut pixels = vec![Rgb8::default(); usize::from(info.width) * usize::from(info.height)];
        {
            let mut grid = PixelGrid::new(&mut pixels, info.width as usize, info.height as usize)?;
            loop {
                let done = decoder.decode_next(&mut grid)?;
                if done {
                    break;
                }
            }
        }
        Ok((info, pixels))
    }
}

impl Decoder<File> {
    /// Open and fully decode a JPEG file, writing pixels into an owned buffer.
    pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<(ImageInfo, Vec<Rgb8>), DecodeErrors> {
        let file = File::open(path).map_err(|_| DecodeErrors::TruncatedStream)?;
        Decoder::decode_buffer(file)
    }
}
