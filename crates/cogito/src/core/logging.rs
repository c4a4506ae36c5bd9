//! Structured logging setup
//!
//! The library emits `tracing` events and never installs a subscriber on
//! its own. Binaries call [`init_logging`] once at startup.
//!
//! Resolution order for the level: explicit argument, `COGITO_LOG_LEVEL`,
//! `RUST_LOG`, then `warn`. For the format: explicit argument,
//! `COGITO_LOG_FORMAT`, then `compact`.
//!
//! ```bash
//! # Trace the store only
//! RUST_LOG="warn,cogito::store=trace" cogito show 3f0c...
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Environment variable overriding the log level
pub const LEVEL_ENV: &str = "COGITO_LOG_LEVEL";
/// Environment variable overriding the log format
pub const FORMAT_ENV: &str = "COGITO_LOG_FORMAT";

const DEFAULT_LEVEL: &str = "warn";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line output
    #[default]
    Compact,
    /// Multi-line output with source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// All valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Level filter and format after applying argument and environment fallbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Resolve settings from optional explicit values and the environment
    pub fn resolve(level: Option<&str>, format: Option<&str>) -> Result<Self, String> {
        let filter = level
            .map(str::to_string)
            .or_else(|| std::env::var(LEVEL_ENV).ok())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let format = match format
            .map(str::to_string)
            .or_else(|| std::env::var(FORMAT_ENV).ok())
        {
            Some(name) => LogFormat::from_str(&name)?,
            None => LogFormat::default(),
        };
        Ok(Self { filter, format })
    }
}

/// Install the global tracing subscriber
///
/// Fails if the format is unknown or a subscriber is already installed.
/// An unparsable level falls back to `warn`.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings =
        LogSettings::resolve(level, format).map_err(|e| format!("Invalid log format: {}", e))?;

    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_level(true);

    match settings.format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    layer
                        .with_target(false)
                        .with_span_events(FmtSpan::NONE)
                        .compact(),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    layer
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .pretty(),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(
                    layer
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .json(),
                )
                .try_init()?;
        }
    }

    Ok(())
}
