//! JPEG marker codes (ITU T.81 Table B.1)

/// A marker read from the byte stream.
///
/// Markers with a fixed numeric family (`SOF`, `APP`, `RST`) carry the
/// low nibble/byte that distinguishes the family member, so callers can
/// match `Marker::RST(_)` without enumerating all eight restart markers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Marker {
    /// Start of image, 0xFFD8
    SOI,
    /// End of image, 0xFFD9
    EOI,
    /// Start of frame, carries the low byte of the marker (0xC0 = baseline,
    /// 0xC2 = progressive, other values are frame kinds this decoder does
    /// not support)
    SOF(u8),
    /// Define Huffman table(s), 0xFFC4
    DHT,
    /// Define arithmetic coding conditioning(s), 0xFFCC (unsupported)
    DAC,
    /// Restart marker RST0..RST7, carries `n` in 0..=7
    RST(u8),
    /// Start of scan, 0xFFDA
    SOS,
    /// Define quantization table(s), 0xFFDB
    DQT,
    /// Define number of lines, 0xFFDC (unsupported)
    DNL,
    /// Define restart interval, 0xFFDD
    DRI,
    /// Application segment APP0..APP15, carries `n` in 0..=15
    APP(u8),
    /// Comment segment, 0xFFFE
    COM,
    /// Any other marker code, kept verbatim for diagnostics
    Other(u8),
}

impl Marker {
    /// Parse the second byte of a two-byte marker code (the first byte is
    /// always 0xFF). Returns `None` for the 0x00 stuffing byte and the 0xFF
    /// fill byte, neither of which introduces a marker.
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0x00 | 0xFF => None,
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            0xC0..=0xCF if byte != 0xC4 && byte != 0xC8 && byte != 0xCC => {
                Some(Marker::SOF(byte))
            }
            0xC4 => Some(Marker::DHT),
            0xCC => Some(Marker::DAC),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xDA => Some(Marker::SOS),
            0xDB => Some(Marker::DQT),
            0xDC => Some(Marker::DNL),
            0xDD => Some(Marker::DRI),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            other => Some(Marker::Other(other)),
        }
    }

    /// Whether this marker is followed by a two-byte big-endian length field.
    /// Markers with no payload (SOI, EOI, RSTn, TEM) are the exception.
    pub fn has_length(self) -> bool {
        !matches!(self, Marker::SOI | Marker::EOI | Marker::RST(_))
    }

    pub fn is_sof(self) -> bool {
        matches!(self, Marker::SOF(_))
    }

    /// True for SOF0 (baseline sequential).
    pub fn is_baseline_sof(self) -> bool {
        matches!(self, Marker::SOF(0xC0))
    }

    /// True for SOF2 (progressive).
    pub fn is_progressive_sof(self) -> bool {
        matches!(self, Marker::SOF(0xC2))
    }
}
