//! Structured logging setup
//!
//! The router only emits `tracing` events; installing a subscriber is up to the
//! application. [`init_logging_with_config`] installs the usual one: an `EnvFilter`
//! followed by a JSON (production) or pretty (development) formatter on stdout.
//!
//! `RUST_LOG` takes precedence over the configured level when it is set.

use anyhow::{Context, Result};
use std::env;
use tracing::{Level, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Output encoding of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Multi-line human readable output
    Pretty,
}

impl LogFormat {
    /// Anything other than `pretty` (any case) selects JSON.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Base level when `RUST_LOG` is unset
    pub level: Level,
    pub format: LogFormat,
    /// Extra comma-separated directives, ex: `cerarouter::router=trace`
    pub directives: Option<String>,
    /// Add source file and line to every event
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// JSON at `INFO`, no source locations
    pub const fn production() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Json,
            directives: None,
            include_location: false,
        }
    }

    /// Pretty output at `DEBUG` with source locations
    pub const fn development() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Pretty,
            directives: None,
            include_location: true,
        }
    }

    /// Read `CERA_LOG_LEVEL`, `CERA_LOG_FORMAT`, `CERA_LOG_TARGET_FILTER` and
    /// `CERA_LOG_INCLUDE_LOCATION`, falling back to [`LogConfig::production`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`LogConfig::from_env`] over an arbitrary variable source.
    ///
    /// Unparseable values keep the production default for that field.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::production();
        Self {
            level: lookup("CERA_LOG_LEVEL")
                .and_then(|level| level.trim().parse().ok())
                .unwrap_or(base.level),
            format: lookup("CERA_LOG_FORMAT")
                .map(|name| LogFormat::from_name(&name))
                .unwrap_or(base.format),
            directives: lookup("CERA_LOG_TARGET_FILTER").filter(|d| !d.trim().is_empty()),
            include_location: lookup("CERA_LOG_INCLUDE_LOCATION")
                .and_then(|flag| flag.trim().parse().ok())
                .unwrap_or(base.include_location),
        }
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let base = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));

        self.directives
            .iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .try_fold(base, |filter, raw| {
                let directive: Directive = raw
                    .parse()
                    .with_context(|| format!("Invalid log filter directive: {raw}"))?;
                Ok(filter.add_directive(directive))
            })
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let layer = fmt::layer()
            .with_target(true)
            .with_file(self.include_location)
            .with_line_number(self.include_location);

        match self.format {
            LogFormat::Json => layer
                .json()
                .with_thread_ids(true)
                .with_span_list(true)
                .boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
        }
    }
}

/// Install the global subscriber described by `config`
///
/// Fails if a directive does not parse or a global subscriber is already set.
///
/// # Example
///
/// ```no_run
/// use cerarouter::logging::{init_logging_with_config, LogConfig};
///
/// let config = LogConfig::from_env();
/// init_logging_with_config(&config).expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let filter = config.env_filter()?;
    tracing_subscriber::registry()
        .with(filter)
        .with(config.fmt_layer())
        .try_init()
        .context("Failed to initialize logging")
}
