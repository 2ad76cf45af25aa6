//! Contains most common errors that may be encountered in decoding a JPEG image
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Common Decode errors
#[allow(clippy::module_name_repetitions)]
pub enum DecodeErrors {
    /// The first two bytes of the stream were not 0xFFD8 (SOI)
    NotJpeg,
    /// The frame marker was not SOF0/SOF2, precision wasn't 8 bits, or the
    /// frame declared an encoding scheme this decoder does not implement
    UnsupportedProfile(String),
    /// A quantization or Huffman table id, or a Huffman class, fell outside
    /// the range the format allows
    InvalidTableId(String),
    /// `startSpectral > endSpectral`, or `endSpectral > 63`, in an SOS header
    InvalidScanParams(String),
    /// A marker was read where a specific one was required and it didn't match
    UnexpectedMarker(String),
    /// problems with the Huffman Tables in a JPEG file
    HuffmanDecode(String),
    /// An AC run length pushed the coefficient index past the block, or past
    /// the scan's spectral range
    InvalidRun(String),
    /// A Huffman code failed to resolve to a symbol within 16 bits
    HuffmanOverlong,
    /// The byte source was exhausted mid-segment or mid-scan
    TruncatedStream,
    /// The caller-supplied pixel buffer does not match `imageWidth * imageHeight`
    BufferSize(String),
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJpeg => write!(f, "The first two bytes are not 0xFFD8 (SOI), not a JPEG"),
            Self::UnsupportedProfile(reason) => write!(f, "Unsupported profile. Reason: {}", reason),
            Self::InvalidTableId(reason) => write!(f, "Invalid table id. Reason: {}", reason),
            Self::InvalidScanParams(reason) => {
                write!(f, "Invalid scan parameters. Reason: {}", reason)
            }
            Self::UnexpectedMarker(reason) => write!(f, "Unexpected marker. Reason: {}", reason),
            Self::HuffmanDecode(reason) => {
                write!(f, "Error decoding huffman tables. Reason: {}", reason)
            }
            Self::InvalidRun(reason) => write!(f, "Invalid AC run. Reason: {}", reason),
            Self::HuffmanOverlong => write!(f, "Huffman code did not resolve within 16 bits"),
            Self::TruncatedStream => write!(f, "Reached end of stream before decoding finished"),
            Self::BufferSize(reason) => write!(f, "Pixel buffer size mismatch. Reason: {}", reason),
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for DecodeErrors {}
