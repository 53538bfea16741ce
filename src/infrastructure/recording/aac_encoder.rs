//! AAC output for captured PCM
//!
//! Pipes raw 16-bit mono PCM into an `ffmpeg` child and lets it write an
//! ADTS stream to the output path.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::recording::EncoderQuality;

const FFMPEG: &str = "ffmpeg";

#[derive(Debug, thiserror::Error)]
pub enum AacError {
    #[error("No samples to encode")]
    Empty,

    #[error("FFmpeg not found. Please install ffmpeg to record AAC.")]
    FfmpegNotFound,

    #[error("Failed to run ffmpeg: {0}")]
    Spawn(String),

    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Failed to feed ffmpeg")]
    Io(#[from] std::io::Error),
}

/// Target bitrate for a quality hint
pub const fn bitrate(quality: EncoderQuality) -> &'static str {
    match quality {
        EncoderQuality::Low => "48k",
        EncoderQuality::Medium => "64k",
        EncoderQuality::High => "96k",
    }
}

/// Build ffmpeg args reading s16le PCM from stdin
fn build_ffmpeg_args(output_path: &Path, sample_rate: u32, quality: EncoderQuality) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "s16le".to_string(),
        "-ar".to_string(),
        sample_rate.to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-i".to_string(),
        "pipe:0".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        bitrate(quality).to_string(),
        "-f".to_string(),
        "adts".to_string(),
        "-y".to_string(), // the file was created empty at open
        output_path.to_string_lossy().to_string(),
    ]
}

/// Encode mono samples to `path`, replacing its contents
pub async fn write_aac(
    samples: &[i16],
    sample_rate: u32,
    quality: EncoderQuality,
    path: &Path,
) -> Result<(), AacError> {
    write_aac_with(FFMPEG, samples, sample_rate, quality, path).await
}

async fn write_aac_with(
    program: &str,
    samples: &[i16],
    sample_rate: u32,
    quality: EncoderQuality,
    path: &Path,
) -> Result<(), AacError> {
    if samples.is_empty() {
        return Err(AacError::Empty);
    }

    let mut child = Command::new(program)
        .args(build_ffmpeg_args(path, sample_rate, quality))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AacError::FfmpegNotFound
            } else {
                AacError::Spawn(e.to_string())
            }
        })?;

    let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    let feeder = child.stdin.take().map(|mut stdin| {
        tokio::spawn(async move {
            stdin.write_all(&pcm).await?;
            stdin.shutdown().await
        })
    });

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(AacError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if let Some(feeder) = feeder {
        feeder
            .await
            .map_err(|e| AacError::Spawn(e.to_string()))??;
    }

    debug!(path = %path.display(), samples = samples.len(), "AAC written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn args_read_pcm_from_stdin() {
        let args = build_ffmpeg_args(Path::new("/tmp/a.aac"), 44_100, EncoderQuality::High);
        let joined = args.join(" ");
        assert!(joined.contains("-f s16le -ar 44100 -ac 1 -i pipe:0"));
        assert!(joined.contains("-c:a aac -b:a 96k -f adts"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/a.aac"));
    }

    #[test]
    fn quality_scales_bitrate() {
        assert_eq!(bitrate(EncoderQuality::Low), "48k");
        assert_eq!(bitrate(EncoderQuality::High), "96k");
    }

    #[tokio::test]
    async fn empty_input_never_spawns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.aac");
        let err = write_aac_with("voice-recorder-no-such-ffmpeg", &[], 16_000, EncoderQuality::Low, &path)
            .await
            .unwrap_err();
        assert!(matches!(err, AacError::Empty));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_ffmpeg_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.aac");
        let err = write_aac_with("voice-recorder-no-such-ffmpeg", &[0; 160], 16_000, EncoderQuality::Low, &path)
            .await
            .unwrap_err();
        assert!(matches!(err, AacError::FfmpegNotFound));
    }
}
