use crate::error::ConfigError;
use crate::severity::Severity;

/// Decides whether an event is loggable and whether it is crash-worthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityGate {
    min_severity: Severity,
    min_crash_severity: Severity,
}

impl SeverityGate {
    /// Fails when `min_severity` is above `min_crash_severity`.
    pub fn new(min_severity: Severity, min_crash_severity: Severity) -> Result<Self, ConfigError> {
        if min_severity > min_crash_severity {
            return Err(ConfigError::SeverityOrder {
                min: min_severity,
                crash: min_crash_severity,
            });
        }

        Ok(Self {
            min_severity,
            min_crash_severity,
        })
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn min_crash_severity(&self) -> Severity {
        self.min_crash_severity
    }

    #[inline]
    pub fn is_loggable(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    /// Events without an attached error are never forwarded.
    #[inline]
    pub fn should_forward(&self, severity: Severity, has_error: bool) -> bool {
        has_error && severity >= self.min_crash_severity
    }
}
