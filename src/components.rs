//! This module exports a single struct to store information about
//! JPEG image components.
//!
//! The data is extracted from a SOF header and refreshed, per scan, from
//! an SOS header.

use crate::errors::DecodeErrors;
use crate::upsampler::upsample_no_op;

/// An up-sampler function: stretch one reconstructed 8x8 tile (`h_factor`,
/// `v_factor` are `maxH/h`, `maxV/v`) into a `(8*h_factor) x (8*v_factor)`
/// tile, nearest-neighbor.
pub type UpSampler = fn(&[i16], usize, usize) -> Vec<i16>;

/// Component data extracted from a start-of-frame header, refreshed by
/// each start-of-scan header that references it.
#[derive(Clone)]
pub(crate) struct Component {
    /// The channel this component represents
    pub component_id: ComponentID,
    /// The raw component id byte from the SOF header (1, 2 or 3)
    pub id: u8,
    /// Horizontal sampling factor, 1..=4
    pub horizontal_sample: usize,
    /// Vertical sampling factor, 1..=4
    pub vertical_sample: usize,
    /// Which of the 4 quantization table slots this component dequantizes with
    pub quantization_table_number: u8,
    /// DC Huffman table slot, set by the most recent SOS that used this component
    pub dc_huff_table: usize,
    /// AC Huffman table slot, set by the most recent SOS that used this component
    pub ac_huff_table: usize,
    /// Previous DC value, used for delta coding; reset at RSTn/scan boundaries
    pub dc_pred: i32,
    /// Whether the current scan touches this component
    pub used_in_scan: bool,
    /// Data-unit grid width, rounded up to a whole MCU (the storage stride
    /// used to index `coeffs`, and the iteration bound for interleaved scans)
    pub blocks_per_line: usize,
    /// Data-unit grid height, rounded up to a whole MCU (see `blocks_per_line`)
    pub blocks_per_column: usize,
    /// True (non-interleaved) data-unit grid width: `ceil(component_width / 8)`,
    /// with no MCU rounding. Used to bound iteration of non-interleaved scans
    /// (every AC scan, and any DC scan naming exactly one component).
    pub true_blocks_per_line: usize,
    /// True (non-interleaved) data-unit grid height, see `true_blocks_per_line`.
    pub true_blocks_per_column: usize,
    pub up_sampler: UpSampler,
}

impl Component {
    /// Build a component descriptor from the three SOF bytes:
    /// `[component_id, sampling_factors, quant_table_id]`.
    pub fn from_sof_bytes(a: [u8; 3]) -> Result<Component, DecodeErrors> {
        let id = match a[0] {
            1 => ComponentID::Y,
            2 => ComponentID::Cb,
            3 => ComponentID::Cr,
            other => {
                return Err(DecodeErrors::UnsupportedProfile(format!(
                    "unknown component id {}, expected 1..=3",
                    other
                )));
            }
        };

        let horizontal_sample = (a[1] >> 4) as usize;
        let vertical_sample = (a[1] & 0x0F) as usize;
        let quantization_table_number = a[2];

        if usize::from(quantization_table_number) >= 4 {
            return Err(DecodeErrors::InvalidTableId(format!(
                "quantization table id {} outside 0..=3",
                quantization_table_number
            )));
        }
        if !(1..=4).contains(&horizontal_sample) || !(1..=4).contains(&vertical_sample) {
            return Err(DecodeErrors::UnsupportedProfile(format!(
                "sampling factors ({},{}) outside 1..=4",
                horizontal_sample, vertical_sample
            )));
        }

        debug!(
            "component id:{:?} h:{} v:{} qt:{}",
            id, horizontal_sample, vertical_sample, quantization_table_number
        );

        Ok(Component {
            component_id: id,
            id: a[0],
            horizontal_sample,
            vertical_sample,
            quantization_table_number,
            dc_huff_table: 0,
            ac_huff_table: 0,
            dc_pred: 0,
            used_in_scan: false,
            blocks_per_line: 0,
            blocks_per_column: 0,
            true_blocks_per_line: 0,
            true_blocks_per_column: 0,
            up_sampler: upsample_no_op,
        })
    }
}

/// Which channel a component represents.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum ComponentID {
    /// Luminance
    Y,
    /// Blue chrominance
    Cb,
    /// Red chrominance
    Cr,
}

/// Chroma subsampling shape, derived from comparing a component's sampling
/// factors against `(maxH, maxV)`.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum SubSampRatios {
    /// Subsampled in both directions (4:2:0)
    HV,
    /// Subsampled vertically only (4:4:0, uncommon)
    V,
    /// Subsampled horizontally only (4:2:2)
    H,
    /// No subsampling (4:4:4)
    None,
}
