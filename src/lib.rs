#![allow(clippy::needless_return, clippy::similar_names, clippy::inline_always)]
#![warn(clippy::correctness, clippy::perf, clippy::pedantic, clippy::inline_always)]
#[macro_use]
extern crate log;

pub use crate::decoder::{Decoder, DecoderOptions, ImageInfo};
pub use crate::errors::DecodeErrors;
pub use crate::misc::ColorSpace;
pub use crate::pixel::{PixelGrid, Rgb8};

mod bitstream;
mod bmp;
mod color_convert;
mod components;
mod decoder;
pub mod errors;
mod headers;
mod huffman;
mod idct;
mod marker;
mod mcu;
mod mcu_prog;
mod misc;
mod pixel;
mod reconstruct;
mod upsampler;

pub use crate::bmp::write_bmp;
