#![allow(dead_code)]
//! Small shared constants, alignment wrappers and byte-level read helpers.

use crate::errors::DecodeErrors;
use std::io::{BufReader, Read};

/// Undo zig-zag encoding of coefficients by placing them in natural
/// (row-major) order: `natural[UN_ZIGZAG[i]] = zigzag[i]`.
#[rustfmt::skip]
pub const UN_ZIGZAG: [usize; 64] = [
    0,  1,  8,  16, 9,  2,  3, 10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Align data to a 32 byte boundary, matching typical SIMD register width.
///
/// Nothing here dispatches to SIMD, this only keeps coefficient/quant
/// buffers on a cache-friendly boundary.
#[repr(align(32))]
#[derive(Clone)]
pub struct Aligned32<T: ?Sized>(pub T);

impl<T> Default for Aligned32<T>
where
    T: Default,
{
    fn default() -> Self {
        Aligned32(T::default())
    }
}

/// Color space of the *input* frame, derived from the component count in
/// the SOF header. The core only ever emits RGB8 pixels, but keeping this
/// distinction around lets the reconstructor special-case grayscale input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorSpace {
    /// Single luminance channel
    GRAYSCALE,
    /// Y/Cb/Cr, the only multi-component input this decoder accepts
    YCbCr,
}

impl ColorSpace {
    pub const fn num_components(self) -> usize {
        match self {
            Self::GRAYSCALE => 1,
            Self::YCbCr => 3,
        }
    }

    pub fn from_component_count(n: usize) -> Option<ColorSpace> {
        match n {
            1 => Some(ColorSpace::GRAYSCALE),
            3 => Some(ColorSpace::YCbCr),
            _ => None,
        }
    }
}

/// Read a single byte from the underlying reader.
#[inline]
pub fn read_u8<R>(reader: &mut BufReader<R>) -> Result<u8, DecodeErrors>
where
    R: Read,
{
    let mut tmp = [0u8; 1];
    reader
        .read_exact(&mut tmp)
        .map_err(|_| DecodeErrors::TruncatedStream)?;
    Ok(tmp[0])
}

/// Read two bytes and combine them big-endian into a `u16`.
#[inline]
pub fn read_u16_be<R>(reader: &mut BufReader<R>) -> Result<u16, DecodeErrors>
where
    R: Read,
{
    let mut tmp: [u8; 2] = [0, 0];
    reader
        .read_exact(&mut tmp)
        .map_err(|_| DecodeErrors::TruncatedStream)?;
    Ok(u16::from_be_bytes(tmp))
}

/// Read `n` bytes into a freshly allocated vector.
#[inline]
pub fn read_exact_vec<R>(reader: &mut BufReader<R>, n: usize) -> Result<Vec<u8>, DecodeErrors>
where
    R: Read,
{
    let mut buf = vec![0u8; n];
    reader
        .read_exact(&mut buf)
        .map_err(|_| DecodeErrors::TruncatedStream)?;
    Ok(buf)
}

/// Discard `n` bytes from the reader without allocating storage for them.
#[inline]
pub fn skip<R>(reader: &mut BufReader<R>, n: usize) -> Result<(), DecodeErrors>
where
    R: Read,
{
    let mut remaining = n;
    let mut scratch = [0u8; 256];
    while remaining > 0 {
        let take = remaining.min(scratch.len());
        reader
            .read_exact(&mut scratch[..take])
            .map_err(|_| DecodeErrors::TruncatedStream)?;
        remaining -= take;
    }
    Ok(())
}

/// Multiply two 64-entry coefficient arrays element-wise (dequantization).
#[inline]
pub fn dequantize(coeffs: &[i16; 64], quant: &[u16; 64]) -> [i32; 64] {
    let mut out = [0i32; 64];
    for i in 0..64 {
        out[i] = i32::from(coeffs[i]) * i32::from(quant[i]);
    }
    out
}
