//! Audio session infrastructure module
//!
//! Desktop hosts have no OS-level audio session; the host process drives
//! this one and forwards interruption and route notifications into it.

mod host_session;

pub use host_session::HostAudioSession;
