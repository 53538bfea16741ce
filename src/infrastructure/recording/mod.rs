//! Recording infrastructure module
//!
//! Captures the default microphone with cpal and writes AAC through ffmpeg
//! or lossless FLAC.

mod aac_encoder;
mod cpal_encoder;
mod dsp;
mod flac_encoder;

pub use cpal_encoder::{CpalEncoder, CpalEncoderFactory};
