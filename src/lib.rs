//! VoiceRecorder - interruption-aware microphone recording
//!
//! This crate records microphone audio into timestamped files while staying
//! consistent with the shared audio session: interruptions pause capture,
//! device loss re-arms it, and backgrounding holds an execution grant.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the session state machine, and errors
//! - **Application**: Port interfaces (traits) and the recording controller
//! - **Infrastructure**: Adapter implementations (cpal/FLAC capture, host
//!   session and lifecycle, notifications, config store)
//! - **Bridge**: JSON request/response surface for a host plugin
//! - **CLI**: Command-line interface, daemon, and signal handling

pub mod application;
pub mod bridge;
pub mod cli;
pub mod domain;
pub mod infrastructure;
