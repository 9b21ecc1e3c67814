//! Configuration

use std::path::PathBuf;

use carta::fixtures::{FixtureError, menu::currency_from_code};
use clap::Args;
use jiff::{Timestamp, tz::TimeZone};
use rusty_money::iso::Currency;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Where promotions are read from and how drafts are interpreted.
#[derive(Debug, Args)]
pub struct EngineConfig {
    /// Directory holding `menu/` and `promotions/` fixture files
    #[arg(long, env = "CARTA_FIXTURES_PATH", default_value = "./fixtures", global = true)]
    pub fixtures: PathBuf,

    /// Fixture set name
    #[arg(long, env = "CARTA_FIXTURE_SET", default_value = "diner", global = true)]
    pub fixture: String,

    /// IANA time zone draft dates and times are read in
    #[arg(long, env = "CARTA_TIME_ZONE", default_value = "UTC", global = true)]
    pub time_zone: String,

    /// ISO code of the currency fixed-amount discounts are authored in
    #[arg(long, env = "CARTA_CURRENCY", default_value = "USD", global = true)]
    pub currency: String,

    /// Instant to derive states and offers at (RFC 3339); defaults to now
    #[arg(long, global = true)]
    pub at: Option<Timestamp>,
}

impl EngineConfig {
    /// Resolve the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not in the time zone database.
    pub fn time_zone(&self) -> Result<TimeZone, jiff::Error> {
        TimeZone::get(&self.time_zone)
    }

    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported currency codes.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        currency_from_code(&self.currency)
    }

    /// The configured instant, or the current time.
    pub fn now(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}
