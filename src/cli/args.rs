//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::bridge::Request;
use crate::domain::config::AppConfig;
use crate::domain::recording::{AudioFormat, Directory, Duration, RecordOptions};

/// Voice recorder - interruption-aware microphone recording
#[derive(Parser, Debug)]
#[command(name = "voice-recorder")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    voice-recorder                          # Record 10s into Documents
    voice-recorder -d 1m -s memos           # Record 1 minute into Documents/memos
    voice-recorder -D cache -n              # Record into the cache dir, with notification
    voice-recorder --daemon                 # Host the recorder bridge
    voice-recorder daemon start -s memos    # Start a recording in the daemon
    voice-recorder daemon stop              # Stop it and print the result
    voice-recorder config set directory LIBRARY")]
pub struct Cli {
    /// Recording duration (e.g., 30s, 1m, 2m30s)
    #[arg(short = 'd', long, value_name = "TIME", conflicts_with = "daemon")]
    pub duration: Option<String>,

    /// Base directory for recordings
    #[arg(short = 'D', long, value_enum, value_name = "DIR")]
    pub directory: Option<DirectoryArg>,

    /// Sub-directory below the base directory
    #[arg(short = 's', long, value_name = "PATH")]
    pub sub_directory: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Show a desktop notification while recording
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Run as a daemon serving recorder requests on a local socket
    #[arg(long)]
    pub daemon: bool,

    /// How long a recording may keep running after the host is backgrounded
    #[arg(long, value_name = "TIME", requires = "daemon")]
    pub background_budget: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Directory categories accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectoryArg {
    Cache,
    Library,
    Documents,
}

impl From<DirectoryArg> for Directory {
    fn from(arg: DirectoryArg) -> Self {
        match arg {
            DirectoryArg::Cache => Directory::Cache,
            DirectoryArg::Library => Directory::Library,
            DirectoryArg::Documents => Directory::Documents,
        }
    }
}

/// Output formats accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Flac,
    Aac,
}

impl From<FormatArg> for AudioFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Flac => AudioFormat::Flac,
            FormatArg::Aac => AudioFormat::Aac,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Control a running daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create default config file
    Init,
    /// Set a config value
    Set {
        /// Config key (directory, sub_directory, format, notify, background_budget, duration)
        key: String,
        /// Value to set
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DaemonAction {
    /// Start a recording
    Start {
        /// Base directory for the recording
        #[arg(short = 'D', long, value_enum, value_name = "DIR")]
        directory: Option<DirectoryArg>,
        /// Sub-directory below the base directory
        #[arg(short = 's', long, value_name = "PATH")]
        sub_directory: Option<String>,
        /// Title of the in-progress notification
        #[arg(long)]
        title: Option<String>,
        /// Body of the in-progress notification
        #[arg(long)]
        message: Option<String>,
    },
    /// Stop the recording and print where it was saved
    Stop,
    /// Pause the recording
    Pause,
    /// Resume a paused recording
    Resume,
    /// Print NONE, RECORDING or PAUSED
    Status,
    /// Print the path of the current or last recording
    Output,
    /// Print whether an input device is available
    CanRecord,
    /// Print whether microphone capture is permitted
    Permission {
        /// Ask for the permission if it was never decided
        #[arg(long)]
        request: bool,
    },
    /// Forward a host notification to the daemon
    Event {
        #[command(subcommand)]
        event: HostEvent,
    },
}

/// Notifications a host forwards to the recorder
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Another app took the audio hardware
    InterruptionBegan,
    /// The interruption is over
    InterruptionEnded {
        /// The host allows recording to resume
        #[arg(long)]
        resume: bool,
    },
    /// The audio route changed
    RouteChanged {
        /// Reason, e.g. oldDeviceUnavailable or newDeviceAvailable
        reason: String,
    },
    /// The host moved to the background
    Background,
    /// The host returned to the foreground
    Foreground,
}

impl DaemonAction {
    /// The bridge request this action sends
    pub fn to_request(&self) -> Request {
        match self {
            Self::Start {
                directory,
                sub_directory,
                title,
                message,
            } => Request::StartRecording {
                directory: directory.map(|d| Directory::from(d).as_str().to_string()),
                sub_directory: sub_directory.clone(),
                title: title.clone(),
                message: message.clone(),
            },
            Self::Stop => Request::StopRecording,
            Self::Pause => Request::PauseRecording,
            Self::Resume => Request::ResumeRecording,
            Self::Status => Request::GetCurrentStatus,
            Self::Output => Request::GetOutputFile,
            Self::CanRecord => Request::CanDeviceVoiceRecord,
            Self::Permission { request: false } => Request::HasAudioRecordingPermission,
            Self::Permission { request: true } => Request::RequestAudioRecordingPermission,
            Self::Event { event } => match event {
                HostEvent::InterruptionBegan => Request::InterruptionBegan,
                HostEvent::InterruptionEnded { resume } => Request::InterruptionEnded {
                    should_resume: *resume,
                },
                HostEvent::RouteChanged { reason } => Request::RouteChanged {
                    reason: reason.clone(),
                },
                HostEvent::Background => Request::EnteredBackground,
                HostEvent::Foreground => Request::EnteredForeground,
            },
        }
    }

    /// Answered with a yes/no flag rather than an outcome
    pub fn is_query(&self) -> bool {
        matches!(self, Self::CanRecord | Self::Permission { .. })
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "directory",
    "sub_directory",
    "format",
    "notify",
    "background_budget",
    "duration",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

/// Resolved options for one-shot recording
#[derive(Debug, Clone)]
pub struct RecordingOptions {
    pub duration: Duration,
    pub record: RecordOptions,
    pub format: AudioFormat,
    pub notify: bool,
}

/// Resolved options for daemon mode
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    pub record: RecordOptions,
    pub format: AudioFormat,
    pub notify: bool,
    pub background_budget: Duration,
}

impl Cli {
    /// CLI flags as a partial config, to merge over the file config
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            directory: self
                .directory
                .map(|d| Directory::from(d).as_str().to_string()),
            sub_directory: self.sub_directory.clone(),
            format: self
                .format
                .map(|f| AudioFormat::from(f).extension().to_string()),
            notify: if self.notify { Some(true) } else { None },
            background_budget: self.background_budget.clone(),
            duration: self.duration.clone(),
        }
    }

    /// Parse and validate the duration flag, if given
    pub fn parse_duration(&self) -> Result<Option<Duration>, String> {
        parse_time_flag(self.duration.as_deref(), "duration")
    }

    /// Parse and validate the background budget flag, if given
    pub fn parse_background_budget(&self) -> Result<Option<Duration>, String> {
        parse_time_flag(self.background_budget.as_deref(), "background-budget")
    }
}

fn parse_time_flag(value: Option<&str>, flag: &str) -> Result<Option<Duration>, String> {
    value
        .map(|v| {
            v.parse::<Duration>()
                .map_err(|e| format!("--{}: {}", flag, e))
        })
        .transpose()
}

impl RecordingOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            duration: config.duration_or_default(),
            record: config.record_options(),
            format: config.format_or_default(),
            notify: config.notify_or_default(),
        }
    }
}

impl DaemonOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            record: config.record_options(),
            format: config.format_or_default(),
            notify: config.notify_or_default(),
            background_budget: config.background_budget_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_default_args() {
        let cli = Cli::parse_from(["voice-recorder"]);
        assert!(cli.duration.is_none());
        assert!(cli.directory.is_none());
        assert!(!cli.notify);
        assert!(!cli.daemon);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_recording_flags() {
        let cli = Cli::parse_from([
            "voice-recorder",
            "-d",
            "1m",
            "-D",
            "cache",
            "-s",
            "/memos/",
            "-f",
            "flac",
            "-n",
        ]);
        let config = cli.to_config();
        assert_eq!(config.directory.as_deref(), Some("CACHE"));
        assert_eq!(config.format.as_deref(), Some("flac"));
        assert_eq!(config.notify, Some(true));

        let options = RecordingOptions::from_config(&AppConfig::defaults().merge(config));
        assert_eq!(options.duration.as_secs(), 60);
        assert_eq!(options.record.directory(), Directory::Cache);
        assert_eq!(options.record.sub_directory(), Some("memos"));
    }

    #[test]
    fn unset_notify_flag_does_not_override_config() {
        let cli = Cli::parse_from(["voice-recorder"]);
        assert!(cli.to_config().notify.is_none());
    }

    #[test]
    fn invalid_duration_is_reported() {
        let cli = Cli::parse_from(["voice-recorder", "-d", "soon"]);
        let err = cli.parse_duration().unwrap_err();
        assert!(err.starts_with("--duration"));
    }

    #[test]
    fn background_budget_requires_daemon() {
        assert!(Cli::try_parse_from(["voice-recorder", "--background-budget", "1m"]).is_err());
        let cli =
            Cli::try_parse_from(["voice-recorder", "--daemon", "--background-budget", "1m"])
                .unwrap();
        assert_eq!(cli.parse_background_budget().unwrap().unwrap().as_secs(), 60);
    }

    #[test]
    fn duration_conflicts_with_daemon() {
        assert!(Cli::try_parse_from(["voice-recorder", "--daemon", "-d", "10s"]).is_err());
    }

    #[test]
    fn parse_daemon_start() {
        let cli = Cli::parse_from(["voice-recorder", "daemon", "start", "-D", "library", "-s", "x"]);
        let Some(Commands::Daemon { action }) = cli.command else {
            panic!("expected daemon command");
        };
        assert_eq!(
            action.to_request(),
            Request::StartRecording {
                directory: Some("LIBRARY".to_string()),
                sub_directory: Some("x".to_string()),
                title: None,
                message: None,
            }
        );
    }

    #[test]
    fn parse_daemon_permission() {
        let cli = Cli::parse_from(["voice-recorder", "daemon", "permission", "--request"]);
        let Some(Commands::Daemon { action }) = cli.command else {
            panic!("expected daemon command");
        };
        assert!(action.is_query());
        assert_eq!(action.to_request(), Request::RequestAudioRecordingPermission);
    }

    #[test]
    fn parse_daemon_events() {
        let cli = Cli::parse_from([
            "voice-recorder",
            "daemon",
            "event",
            "interruption-ended",
            "--resume",
        ]);
        let Some(Commands::Daemon { action }) = cli.command else {
            panic!("expected daemon command");
        };
        assert_eq!(
            action.to_request(),
            Request::InterruptionEnded {
                should_resume: true
            }
        );

        let cli = Cli::parse_from([
            "voice-recorder",
            "daemon",
            "event",
            "route-changed",
            "oldDeviceUnavailable",
        ]);
        let Some(Commands::Daemon { action }) = cli.command else {
            panic!("expected daemon command");
        };
        assert_eq!(action.to_request().method(), "routeChanged");
    }

    #[test]
    fn parse_config_set() {
        let cli = Cli::parse_from(["voice-recorder", "config", "set", "directory", "CACHE"]);
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::Set { key, value },
            }) => {
                assert_eq!(key, "directory");
                assert_eq!(value, "CACHE");
            }
            _ => panic!("expected config set"),
        }
    }

    #[test]
    fn config_keys() {
        assert!(is_valid_config_key("sub_directory"));
        assert!(is_valid_config_key("background_budget"));
        assert!(!is_valid_config_key("api_key"));
    }
}
