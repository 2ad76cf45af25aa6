//! Canonical Huffman table construction and decoding.
//!
//! Built from the 16 length counts and symbol list a DHT segment carries;
//! see ITU T.81 Annex C for the `mincode`/`maxcode`/`valptr` construction
//! used here.
use crate::bitstream::BitStream;
use crate::errors::DecodeErrors;
use std::io::{BufReader, Read};

/// A canonical Huffman codebook for one DC or AC table slot.
pub(crate) struct HuffmanTable {
    /// Symbols, ordered by increasing code length (as they appeared in the DHT)
    values: Vec<u8>,
    /// Smallest code of each length, indexed 1..=16; -1 if no code has that length
    mincode: [i32; 17],
    /// Largest code of each length, indexed 1..=16; -1 if no code has that length
    maxcode: [i32; 17],
    /// Index into `values` where codes of a given length begin, indexed 1..=16
    valptr: [i32; 17],
}

impl HuffmanTable {
    /// Build a table from the 16 per-length symbol counts (`counts[i]` is the
    /// number of codes of length `i + 1`) and the concatenated symbol list.
    pub fn new(counts: &[u8; 16], values: Vec<u8>) -> Result<HuffmanTable, DecodeErrors> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total != values.len() {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "length counts sum to {} but {} symbols were supplied",
                total,
                values.len()
            )));
        }
        if total > 256 {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "table has {} codes, more than the 256 a byte alphabet allows",
                total
            )));
        }

        let mut mincode = [-1i32; 17];
        let mut maxcode = [-1i32; 17];
        let mut valptr = [0i32; 17];

        let mut code: i32 = 0;
        let mut p: i32 = 0;
        for len in 1..=16usize {
            let count = i32::from(counts[len - 1]);
            if count == 0 {
                maxcode[len] = -1;
            } else {
                valptr[len] = p;
                mincode[len] = code;
                code += count;
                maxcode[len] = code - 1;
                p += count;
            }
            code <<= 1;
        }

        Ok(HuffmanTable {
            values,
            mincode,
            maxcode,
            valptr,
        })
    }

    /// Decode one symbol from the bit stream, MSB-first, one bit at a time
    /// until a code of some length matches a code assigned to that length.
    pub fn decode_symbol<R>(
        &self,
        stream: &mut BitStream,
        reader: &mut BufReader<R>,
    ) -> Result<u8, DecodeErrors>
    where
        R: Read,
    {
        let mut code: i32 = i32::from(stream.read_bit(reader)?);
        let mut len = 1usize;

        while len <= 16 && (self.maxcode[len] == -1 || code > self.maxcode[len]) {
            code = (code << 1) | i32::from(stream.read_bit(reader)?);
            len += 1;
        }

        if len > 16 {
            return Err(DecodeErrors::HuffmanOverlong);
        }

        let index = self.valptr[len] + (code - self.mincode[len]);
        self.values
            .get(index as usize)
            .copied()
            .ok_or(DecodeErrors::HuffmanOverlong)
    }
}
