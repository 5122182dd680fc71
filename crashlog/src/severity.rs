use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Log importance, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Assert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Assert => "assert",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" | "trace" => Ok(Severity::Verbose),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "assert" | "fatal" => Ok(Severity::Assert),
            _ => Err(ConfigError::UnknownSeverity(s.to_string())),
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Severity::Verbose,
            log::Level::Debug => Severity::Debug,
            log::Level::Info => Severity::Info,
            log::Level::Warn => Severity::Warn,
            log::Level::Error => Severity::Error,
        }
    }
}

impl From<Severity> for sentry::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Verbose | Severity::Debug => sentry::Level::Debug,
            Severity::Info => sentry::Level::Info,
            Severity::Warn => sentry::Level::Warning,
            Severity::Error => sentry::Level::Error,
            Severity::Assert => sentry::Level::Fatal,
        }
    }
}

/// Most permissive `log` filter that still lets `severity` through.
pub fn level_filter_for(severity: Severity) -> log::LevelFilter {
    match severity {
        Severity::Verbose => log::LevelFilter::Trace,
        Severity::Debug => log::LevelFilter::Debug,
        Severity::Info => log::LevelFilter::Info,
        Severity::Warn => log::LevelFilter::Warn,
        // `log` has nothing above Error, so Assert still needs Error records.
        Severity::Error | Severity::Assert => log::LevelFilter::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_declaration() {
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!(" Warn ".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("fatal".parse::<Severity>().unwrap(), Severity::Assert);
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for severity in Severity::ALL {
            assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
        }
    }

    #[test]
    fn maps_log_levels() {
        assert_eq!(Severity::from(log::Level::Trace), Severity::Verbose);
        assert_eq!(Severity::from(log::Level::Error), Severity::Error);
    }

    #[test]
    fn maps_to_sentry_levels() {
        assert_eq!(sentry::Level::from(Severity::Warn), sentry::Level::Warning);
        assert_eq!(sentry::Level::from(Severity::Assert), sentry::Level::Fatal);
    }
}
