use core::fmt;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::{Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use crate::error::{AsLogError, LogError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

lazy_static! {
    static ref LEVELS: HashMap<&'static str, LogLevel> = LogLevel::ALL
        .iter()
        .map(|level| (level.name(), *level))
        .collect();
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Looks up a level by name. Unknown names fall back to `info`. A
    /// `fatal` threshold filters at `ERROR` (see [`LogLevel::as_level`]), so
    /// it also writes `error` events.
    pub fn from_name(name: &str) -> Self {
        LEVELS.get(name).copied().unwrap_or(LogLevel::Info)
    }

    /// `tracing` has no fatal severity, so `fatal` is reported as `ERROR` and
    /// `error` events pass a `fatal` threshold.
    pub fn as_level(self) -> Level {
        match self {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error | LogLevel::Fatal => Level::ERROR,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn parse_level(name: &str) -> Result<LogLevel, Infallible> {
    Ok(LogLevel::from_name(name))
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum RunMode {
    Debug,
    Release,
    Test,
}

impl RunMode {
    pub fn writes_to_stdout(self) -> bool {
        matches!(self, RunMode::Debug)
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(clap::Parser, Clone, Debug)]
pub struct LogConfig {
    #[clap(
        long,
        env,
        default_value = "logs/app.log",
        help = "File the logger appends to"
    )]
    pub log_path: PathBuf,

    #[clap(
        long,
        env,
        value_parser = parse_level,
        default_value_t = LogLevel::Info,
        help = "Minimum level written (debug, info, warn, error, fatal)"
    )]
    pub log_level: LogLevel,

    #[clap(long, env, value_enum, default_value_t = RunMode::Release, help = "In debug mode logs are mirrored to stdout")]
    pub run_mode: RunMode,

    #[clap(long, env, value_enum, default_value_t = LogFormat::Text, help = "Logging format")]
    pub log_format: LogFormat,
}

impl LogConfig {
    /// Opens the log file in append mode, creating missing parent
    /// directories.
    pub fn open_log_file(&self) -> Result<File, LogError> {
        if let Some(parent) = self
            .log_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|source| {
                LogError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .into_log_error(self.log_path.clone())
    }

    /// Builds the subscriber without installing it.
    pub fn subscriber(
        &self,
    ) -> Result<impl Subscriber + Send + Sync + 'static, LogError> {
        let level = LevelFilter::from_level(self.log_level.as_level());
        let file = Arc::new(self.open_log_file()?);

        let mut layers = vec![self.format_layer(file, level)];
        if self.run_mode.writes_to_stdout() {
            layers.push(self.format_layer(std::io::stdout, level));
        }

        Ok(tracing_subscriber::registry().with(layers))
    }

    pub fn init(&self) -> Result<(), LogError> {
        self.subscriber()?
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)?;

        tracing::debug!(
            path = %self.log_path.display(),
            level = %self.log_level,
            run_mode = %self.run_mode,
            "Logger initialized"
        );

        Ok(())
    }

    fn format_layer<W>(&self, writer: W, level: LevelFilter) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        match self.log_format {
            LogFormat::Text => layer.with_filter(level).boxed(),
            LogFormat::Json => {
                layer.json().flatten_event(true).with_filter(level).boxed()
            }
        }
    }
}
