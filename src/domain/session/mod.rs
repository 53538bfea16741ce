//! Recording session domain module

mod machine;

pub use machine::{InvalidStateTransition, RecordingSession};
