//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use voice_recorder::application::ports::{Encoder, EncoderError, EncoderFactory};
use voice_recorder::domain::recording::EncoderSettings;

/// Encoder calls seen by every encoder a factory opened
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

/// Encoder that logs its calls and writes fixed bytes when stopped
pub struct ScriptedEncoder {
    path: PathBuf,
    bytes: &'static [u8],
    log: CallLog,
}

#[async_trait]
impl Encoder for ScriptedEncoder {
    async fn record(&mut self) -> Result<(), EncoderError> {
        self.log.lock().unwrap().push("record");
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EncoderError> {
        self.log.lock().unwrap().push("pause");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EncoderError> {
        self.log.lock().unwrap().push("stop");
        std::fs::write(&self.path, self.bytes).map_err(|e| EncoderError::Finalize(e.to_string()))
    }
}

pub struct ScriptedEncoders {
    pub bytes: &'static [u8],
    pub log: CallLog,
    /// Refuse to allocate encoders
    pub fail: bool,
}

impl ScriptedEncoders {
    pub fn writing(bytes: &'static [u8]) -> Self {
        Self {
            bytes,
            log: CallLog::default(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::writing(b"")
        }
    }
}

impl EncoderFactory for ScriptedEncoders {
    fn open(
        &self,
        path: &Path,
        _settings: &EncoderSettings,
    ) -> Result<Box<dyn Encoder>, EncoderError> {
        if self.fail {
            return Err(EncoderError::StartFailed("no codec".to_string()));
        }
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| EncoderError::FileCreate(e.to_string()))?;
        self.log.lock().unwrap().push("open");
        Ok(Box::new(ScriptedEncoder {
            path: path.to_path_buf(),
            bytes: self.bytes,
            log: Arc::clone(&self.log),
        }))
    }
}

/// Let spawned event handlers run
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
}
