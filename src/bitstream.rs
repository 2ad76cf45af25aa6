//! MSB-first bit reader over a byte-oriented reader, with JPEG byte-stuffing
//! (`0xFF 0x00` -> `0xFF`) and marker detection for entropy-coded segments.
use crate::errors::DecodeErrors;
use crate::marker::Marker;
use std::io::{BufReader, Read};

/// Bit-level cursor over the entropy-coded portion of a scan.
///
/// Holds one byte of look-ahead (`current_byte`) and a count of unconsumed
/// bits in it (`bits_left`); when that count reaches zero the next byte is
/// pulled from the reader, transparently undoing byte-stuffing. Reading a
/// real marker mid-stream (anything other than a stuffed `0xFF 0x00`) is
/// always an error here — callers must `align_to_byte`/leave the stream and
/// read expected markers (RSTn, EOI) directly off the byte reader instead.
pub(crate) struct BitStream {
    current_byte: u8,
    bits_left: u8,
    in_huff_stream: bool,
}

impl BitStream {
    pub fn new() -> BitStream {
        BitStream {
            current_byte: 0,
            bits_left: 0,
            in_huff_stream: false,
        }
    }

    /// Enter entropy-coded-segment mode: byte-stuffing is now honored and
    /// any bit look-ahead from a previous scan is discarded.
    pub fn begin_huff_stream(&mut self) {
        self.in_huff_stream = true;
        self.bits_left = 0;
        self.current_byte = 0;
    }

    /// Leave entropy-coded-segment mode. Any unread bits in the current
    /// byte are discarded (the caller is expected to have called
    /// `align_to_byte` first if that mattered).
    pub fn end_huff_stream(&mut self) {
        self.in_huff_stream = false;
        self.bits_left = 0;
    }

    /// Discard whatever bits remain in the current byte, so the next
    /// `read_bit` starts a fresh byte.
    pub fn align_to_byte(&mut self) {
        self.bits_left = 0;
    }

    fn refill<R>(&mut self, reader: &mut BufReader<R>) -> Result<(), DecodeErrors>
    where
        R: Read,
    {
        let mut byte = crate::misc::read_u8(reader)?;
        if byte == 0xFF && self.in_huff_stream {
            let mut follow = crate::misc::read_u8(reader)?;
            while follow == 0xFF {
                follow = crate::misc::read_u8(reader)?;
            }
            if follow == 0x00 {
                byte = 0xFF;
            } else {
                let marker = Marker::from_u8(follow);
                return Err(DecodeErrors::UnexpectedMarker(format!(
                    "encountered {:?} inside entropy-coded data",
                    marker
                )));
            }
        }
        self.current_byte = byte;
        self.bits_left = 8;
        Ok(())
    }

    /// Read the next bit, MSB-first.
    pub fn read_bit<R>(&mut self, reader: &mut BufReader<R>) -> Result<u8, DecodeErrors>
    where
        R: Read,
    {
        if self.bits_left == 0 {
            self.refill(reader)?;
        }
        self.bits_left -= 1;
        Ok((self.current_byte >> self.bits_left) & 1)
    }

    /// Read `n` bits (0..=16), earliest bit becoming the most significant
    /// bit of the result.
    pub fn read_bits<R>(&mut self, reader: &mut BufReader<R>, n: u8) -> Result<u16, DecodeErrors>
    where
        R: Read,
    {
        let mut value: u16 = 0;
        for _ in 0..n {
            value = (value << 1) | u16::from(self.read_bit(reader)?);
        }
        Ok(value)
    }

    /// `(1 << r) + readBits(r)`, the progressive EOBn run-length shorthand.
    pub fn read_end_of_band_length<R>(
        &mut self,
        reader: &mut BufReader<R>,
        r: u8,
    ) -> Result<u16, DecodeErrors>
    where
        R: Read,
    {
        Ok((1u16 << r) + self.read_bits(reader, r)?)
    }
}

/// Sign-extend a Huffman-decoded magnitude `v` of category `n` (`0 <= v <
/// 2^n`) into a signed coefficient value.
///
/// Category 0 always means the value is exactly zero and no bits were
/// consumed for it; callers should not invoke this for `n == 0` but it
/// returns 0 defensively if they do.
#[inline]
pub(crate) fn decode_sign(v: u16, n: u8) -> i32 {
    if n == 0 {
        return 0;
    }
    let v = i32::from(v);
    if v >= (1 << (n - 1)) {
        v
    } else {
        v - ((1 << n) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_stuffing_round_trip() {
        // 0xFF 0x00 must yield a single 0xFF data byte.
        let data = [0xFFu8, 0x00, 0xAA];
        let mut reader = BufReader::new(&data[..]);
        let mut stream = BitStream::new();
        stream.begin_huff_stream();

        let first_byte = stream.read_bits(&mut reader, 8).unwrap();
        assert_eq!(first_byte, 0xFF);
        let second_byte = stream.read_bits(&mut reader, 8).unwrap();
        assert_eq!(second_byte, 0xAA);
    }

    #[test]
    fn align_to_byte_resyncs_reader() {
        let data = [0b1111_0000u8, 0b1010_1010u8];
        let mut reader = BufReader::new(&data[..]);
        let mut stream = BitStream::new();
        stream.begin_huff_stream();

        assert_eq!(stream.read_bit(&mut reader).unwrap(), 1);
        assert_eq!(stream.read_bit(&mut reader).unwrap(), 1);
        stream.align_to_byte();
        // Next read_bit should now come from the second byte's top bit.
        assert_eq!(stream.read_bit(&mut reader).unwrap(), 1);
        assert_eq!(stream.read_bit(&mut reader).unwrap(), 0);
    }

    #[test]
    fn marker_inside_entropy_data_is_fatal() {
        let data = [0xFFu8, 0xD9];
        let mut reader = BufReader::new(&data[..]);
        let mut stream = BitStream::new();
        stream.begin_huff_stream();

        assert!(stream.read_bit(&mut reader).is_err());
    }

    #[test]
    fn sign_decode_matches_spec_ranges() {
        // category 1: v in {0,1} -> {-1, 1}
        assert_eq!(decode_sign(0, 1), -1);
        assert_eq!(decode_sign(1, 1), 1);
        // category 3: v in 0..8 -> [-7,-4] u [4,7]
        assert_eq!(decode_sign(0, 3), -7);
        assert_eq!(decode_sign(3, 3), -4);
        assert_eq!(decode_sign(4, 3), 4);
        assert_eq!(decode_sign(7, 3), 7);
    }
}
