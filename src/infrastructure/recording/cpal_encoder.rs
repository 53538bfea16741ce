//! Microphone capture encoder using cpal
//!
//! A dedicated thread owns each `cpal::Stream` (it is not `Send`). Samples are
//! downmixed to mono and buffered in segments tagged with the device rate, so
//! a capture re-armed on a different device keeps its own rate. Everything is
//! resampled to the configured rate and encoded on `stop`, as AAC through
//! ffmpeg or as FLAC in process. Stream setup, teardown and encoding run on
//! the blocking pool.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tracing::{debug, info, warn};

use super::aac_encoder::{write_aac, AacError};
use super::dsp::{downmix, f32_to_i16, resample};
use super::flac_encoder::{write_flac, EncodingError};
use crate::application::ports::{
    AudioSessionEvent, Encoder, EncoderError, EncoderFactory, EventHub, RouteChangeReason,
};
use crate::domain::recording::{AudioFormat, EncoderSettings};

/// Samples captured from one device at one rate
#[derive(Debug, Default)]
struct Segment {
    sample_rate: u32,
    samples: Vec<i16>,
}

/// State shared between the encoder and the stream callbacks
#[derive(Default)]
struct CaptureBuffer {
    capturing: AtomicBool,
    segments: StdMutex<Vec<Segment>>,
}

impl CaptureBuffer {
    fn segments(&self) -> MutexGuard<'_, Vec<Segment>> {
        self.segments.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_segment(&self, sample_rate: u32) {
        self.segments().push(Segment {
            sample_rate,
            samples: Vec::new(),
        });
    }

    fn push(&self, mono: &[i16]) {
        if !self.capturing.load(Ordering::SeqCst) {
            return;
        }
        if let Some(segment) = self.segments().last_mut() {
            segment.samples.extend_from_slice(mono);
        }
    }

    fn take(&self) -> Vec<Segment> {
        std::mem::take(&mut *self.segments())
    }
}

/// A capture thread and the handle to end it
struct CaptureWorker {
    shutdown: mpsc::Sender<()>,
    thread: JoinHandle<()>,
    /// Set by the stream's error callback
    failed: Arc<AtomicBool>,
}

impl CaptureWorker {
    /// Open the default input device on a new thread and start its stream.
    /// Returns once the stream is playing or failed to start.
    fn spawn(
        buffer: Arc<CaptureBuffer>,
        target_rate: u32,
        route_events: Option<EventHub<AudioSessionEvent>>,
    ) -> Result<Self, EncoderError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown, shutdown_rx) = mpsc::channel::<()>();
        let failed = Arc::new(AtomicBool::new(false));
        let stream_failed = Arc::clone(&failed);

        let thread = std::thread::Builder::new()
            .name("voice-recorder-capture".into())
            .spawn(move || {
                let stream = match open_stream(&buffer, target_rate, stream_failed, route_events) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                // blocks until shutdown is sent or the sender is dropped
                let _ = shutdown_rx.recv();
                drop(stream);
            })
            .map_err(|e| EncoderError::StartFailed(format!("Cannot spawn capture thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                shutdown,
                thread,
                failed,
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => Err(EncoderError::StartFailed("Capture thread exited".into())),
        }
    }

    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn stop(self) {
        let _ = self.shutdown.send(());
        if self.thread.join().is_err() {
            warn!("Capture thread panicked");
        }
    }
}

fn default_input_device() -> Result<cpal::Device, EncoderError> {
    cpal::default_host()
        .default_input_device()
        .ok_or(EncoderError::NoInputDevice)
}

/// Pick an i16/f32 input configuration, preferring fewer channels and a
/// range that includes `target_rate`
fn input_config(
    device: &cpal::Device,
    target_rate: u32,
) -> Result<(StreamConfig, SampleFormat), EncoderError> {
    let supported = device
        .supported_input_configs()
        .map_err(|e| EncoderError::StartFailed(format!("Failed to get configs: {}", e)))?;

    let includes_target = |range: &cpal::SupportedStreamConfigRange| {
        range.min_sample_rate().0 <= target_rate && range.max_sample_rate().0 >= target_rate
    };

    let mut best: Option<cpal::SupportedStreamConfigRange> = None;
    for range in supported {
        if !matches!(range.sample_format(), SampleFormat::I16 | SampleFormat::F32) {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) => {
                (includes_target(&range) && !includes_target(current))
                    || (includes_target(&range) == includes_target(current)
                        && range.channels() < current.channels())
            }
        };
        if better {
            best = Some(range);
        }
    }

    let range = best.ok_or_else(|| EncoderError::StartFailed("No suitable input config".into()))?;
    let sample_rate = if includes_target(&range) {
        SampleRate(target_rate)
    } else {
        range.max_sample_rate()
    };

    let config = StreamConfig {
        channels: range.channels(),
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };
    Ok((config, range.sample_format()))
}

fn open_stream(
    buffer: &Arc<CaptureBuffer>,
    target_rate: u32,
    failed: Arc<AtomicBool>,
    route_events: Option<EventHub<AudioSessionEvent>>,
) -> Result<cpal::Stream, EncoderError> {
    let device = default_input_device()?;
    let (config, sample_format) = input_config(&device, target_rate)?;
    let channels = config.channels;

    info!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        sample_rate = config.sample_rate.0,
        channels,
        "Opening input stream"
    );
    buffer.begin_segment(config.sample_rate.0);

    let on_error = move |err: cpal::StreamError| {
        // only the first error of a stream is reported
        if failed.swap(true, Ordering::SeqCst) {
            return;
        }
        warn!(error = %err, "Input stream failed");
        if let Some(events) = &route_events {
            events.publish(AudioSessionEvent::RouteChanged(
                RouteChangeReason::OldDeviceUnavailable,
            ));
        }
    };

    let stream = match sample_format {
        SampleFormat::I16 => {
            let buffer = Arc::clone(buffer);
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    buffer.push(&downmix(data, channels));
                },
                on_error,
                None,
            )
        }
        SampleFormat::F32 => {
            let buffer = Arc::clone(buffer);
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    buffer.push(&downmix(&f32_to_i16(data), channels));
                },
                on_error,
                None,
            )
        }
        other => {
            return Err(EncoderError::StartFailed(format!(
                "Unsupported sample format: {:?}",
                other
            )))
        }
    }
    .map_err(|e| EncoderError::StartFailed(e.to_string()))?;

    stream
        .play()
        .map_err(|e| EncoderError::StartFailed(e.to_string()))?;
    Ok(stream)
}

/// Resample every segment to the output rate and join them
fn collect_samples(buffer: &CaptureBuffer, sample_rate: u32) -> Result<Vec<i16>, EncoderError> {
    let mut samples = Vec::new();
    for segment in buffer.take() {
        samples.extend(resample(&segment.samples, segment.sample_rate, sample_rate)?);
    }
    Ok(samples)
}

/// Run blocking device or codec work off the runtime
async fn blocking<T, F>(work: F) -> Result<T, EncoderError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EncoderError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EncoderError::Finalize(format!("Encoder task failed: {}", e)))?
}

/// Encoder writing the default microphone to an AAC or FLAC file
pub struct CpalEncoder {
    path: PathBuf,
    file: Option<File>,
    settings: EncoderSettings,
    buffer: Arc<CaptureBuffer>,
    worker: Option<CaptureWorker>,
    route_events: Option<EventHub<AudioSessionEvent>>,
}

impl CpalEncoder {
    fn new(
        path: PathBuf,
        file: File,
        settings: EncoderSettings,
        route_events: Option<EventHub<AudioSessionEvent>>,
    ) -> Self {
        Self {
            path,
            file: Some(file),
            settings,
            buffer: Arc::new(CaptureBuffer::default()),
            worker: None,
            route_events,
        }
    }

    async fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let joined = tokio::task::spawn_blocking(move || worker.stop()).await;
            if joined.is_err() {
                warn!("Capture teardown task failed");
            }
        }
    }

    fn finalize_error(&self, e: impl std::fmt::Display) -> EncoderError {
        EncoderError::Finalize(format!("{}: {}", self.path.display(), e))
    }

    async fn encode_flac(&self, mut file: File) -> Result<(), EncoderError> {
        let buffer = Arc::clone(&self.buffer);
        let sample_rate = self.settings.sample_rate;
        let path = self.path.clone();

        blocking(move || {
            let samples = collect_samples(&buffer, sample_rate)?;
            let finalize = |e: &dyn std::fmt::Display| {
                EncoderError::Finalize(format!("{}: {}", path.display(), e))
            };
            match write_flac(&samples, sample_rate, &mut file) {
                Ok(bytes) => debug!(path = %path.display(), bytes, "FLAC written"),
                Err(EncodingError::Empty) => {
                    warn!(path = %path.display(), "No audio captured, leaving file empty");
                    return Ok(());
                }
                Err(e) => return Err(finalize(&e)),
            }
            file.sync_all().map_err(|e| finalize(&e))
        })
        .await
    }

    async fn encode_aac(&self, file: File) -> Result<(), EncoderError> {
        // ffmpeg reopens the path itself
        drop(file);

        let buffer = Arc::clone(&self.buffer);
        let sample_rate = self.settings.sample_rate;
        let samples = blocking(move || collect_samples(&buffer, sample_rate)).await?;

        match write_aac(&samples, sample_rate, self.settings.quality, &self.path).await {
            Ok(()) => Ok(()),
            Err(AacError::Empty) => {
                warn!(path = %self.path.display(), "No audio captured, leaving file empty");
                Ok(())
            }
            Err(e) => Err(self.finalize_error(e)),
        }
    }
}

#[async_trait]
impl Encoder for CpalEncoder {
    async fn record(&mut self) -> Result<(), EncoderError> {
        if self.file.is_none() {
            return Err(EncoderError::StartFailed("Encoder already finalized".into()));
        }

        let healthy = self.worker.as_ref().is_some_and(|w| !w.is_failed());
        if !healthy {
            if self.worker.is_some() {
                debug!("Re-arming capture on the current default input device");
            }
            self.stop_worker().await;

            let buffer = Arc::clone(&self.buffer);
            let sample_rate = self.settings.sample_rate;
            let route_events = self.route_events.clone();
            let worker = tokio::task::spawn_blocking(move || {
                CaptureWorker::spawn(buffer, sample_rate, route_events)
            })
            .await
            .map_err(|e| EncoderError::StartFailed(format!("Capture task failed: {}", e)))??;
            self.worker = Some(worker);
        }

        self.buffer.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EncoderError> {
        self.buffer.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EncoderError> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        self.buffer.capturing.store(false, Ordering::SeqCst);
        self.stop_worker().await;

        match self.settings.format {
            AudioFormat::Aac => self.encode_aac(file).await,
            AudioFormat::Flac => self.encode_flac(file).await,
        }
    }
}

impl Drop for CpalEncoder {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
    }
}

/// Allocates [`CpalEncoder`]s
#[derive(Default)]
pub struct CpalEncoderFactory {
    route_events: Option<EventHub<AudioSessionEvent>>,
}

impl CpalEncoderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report stream failures as lost-device route changes on `events`
    pub fn with_route_events(events: EventHub<AudioSessionEvent>) -> Self {
        Self {
            route_events: Some(events),
        }
    }
}

/// Create the output file, refusing to replace an existing one
fn create_output(path: &Path) -> Result<File, EncoderError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => {
                EncoderError::FileCreate(format!("{} already exists", path.display()))
            }
            _ => EncoderError::FileCreate(format!("{}: {}", path.display(), e)),
        })
}

impl EncoderFactory for CpalEncoderFactory {
    fn open(&self, path: &Path, settings: &EncoderSettings) -> Result<Box<dyn Encoder>, EncoderError> {
        // created up front so file system errors surface at start
        let file = create_output(path)?;

        Ok(Box::new(CpalEncoder::new(
            path.to_path_buf(),
            file,
            *settings,
            self.route_events.clone(),
        )))
    }

    fn can_record(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::EncoderQuality;
    use tempfile::TempDir;

    fn flac_settings() -> EncoderSettings {
        EncoderSettings::voice().with_format(AudioFormat::Flac)
    }

    #[test]
    fn existing_file_is_never_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.aac");
        std::fs::write(&path, b"keep").unwrap();

        let err = CpalEncoderFactory::new()
            .open(&path, &EncoderSettings::voice())
            .err()
            .unwrap();
        assert!(err.is_file_system());
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }

    #[test]
    fn unwritable_path_is_file_system_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("a.flac");
        let err = CpalEncoderFactory::new()
            .open(&path, &flac_settings())
            .err()
            .unwrap();
        assert!(err.is_file_system());
    }

    #[tokio::test]
    async fn stop_without_audio_leaves_empty_file() {
        let dir = TempDir::new().unwrap();
        for (name, settings) in [("a.aac", EncoderSettings::voice()), ("a.flac", flac_settings())] {
            let path = dir.path().join(name);
            let mut encoder = CpalEncoderFactory::new().open(&path, &settings).unwrap();

            encoder.stop().await.unwrap();
            encoder.stop().await.unwrap();
            assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
            assert!(encoder.record().await.is_err());
        }
    }

    #[tokio::test]
    async fn buffered_segments_are_resampled_and_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.flac");
        let file = File::create(&path).unwrap();
        let settings = EncoderSettings {
            sample_rate: 16_000,
            quality: EncoderQuality::Low,
            ..flac_settings()
        };
        let mut encoder = CpalEncoder::new(path.clone(), file, settings, None);

        encoder.buffer.capturing.store(true, Ordering::SeqCst);
        encoder.buffer.begin_segment(16_000);
        encoder.buffer.push(&vec![0i16; 1600]);
        encoder.buffer.begin_segment(48_000);
        encoder.buffer.push(&vec![0i16; 4800]);

        encoder.stop().await.unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(&written[0..4], b"fLaC");
    }

    #[test]
    fn paused_buffer_drops_samples() {
        let buffer = CaptureBuffer::default();
        buffer.begin_segment(16_000);
        buffer.push(&[1, 2, 3]);
        buffer.capturing.store(true, Ordering::SeqCst);
        buffer.push(&[4, 5]);

        let segments = buffer.take();
        assert_eq!(segments[0].samples, vec![4, 5]);
    }
}
