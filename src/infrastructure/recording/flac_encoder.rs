//! FLAC output for captured PCM
//!
//! Lossless, mono, 16-bit, at whatever rate the recording was configured for.

use std::io::Write;

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

const BITS_PER_SAMPLE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("No samples to encode")]
    Empty,

    #[error("FLAC encoder rejected its configuration: {0}")]
    Config(String),

    #[error("FLAC encoding failed: {0}")]
    Encode(String),

    #[error("Failed to write FLAC stream")]
    Io(#[from] std::io::Error),
}

/// Encode mono samples and write the complete stream to `out`.
/// Returns the number of bytes written.
pub fn write_flac<W: Write>(samples: &[i16], sample_rate: u32, out: &mut W) -> Result<usize, EncodingError> {
    if samples.is_empty() {
        return Err(EncodingError::Empty);
    }

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::Config(format!("{:?}", e)))?;

    let widened: Vec<i32> = samples.iter().copied().map(i32::from).collect();
    let source = MemSource::from_samples(&widened, 1, BITS_PER_SAMPLE, sample_rate as usize);
    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| EncodingError::Encode(e.to_string()))?;
    let bytes = sink.into_inner();

    out.write_all(&bytes)?;
    out.flush()?;
    Ok(bytes.len())
}
