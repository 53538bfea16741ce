//! Recording domain module

mod duration;
mod options;
mod output;
mod settings;
mod status;

pub use duration::Duration;
pub use options::{normalize_sub_directory, Directory, RecordOptions};
pub use output::{epoch_millis, file_name, parse_timestamp, OutputFile, FILE_PREFIX};
pub use settings::{AudioFormat, EncoderQuality, EncoderSettings};
pub use status::RecordingStatus;
