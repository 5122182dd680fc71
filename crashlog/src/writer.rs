//! Forwarding of crash-worthy log events.
//!
//! [`CrashLogWriter`] is the one [`LogWriter`] in this crate: it drops events
//! below the crash threshold or without an error, and turns the rest into a
//! single [`ExceptionPayload`] for its [`CrashBackend`]. Nothing here logs,
//! since the writer usually sits behind the logger itself.

use std::fmt;
use uuid::Uuid;

use crate::backend::payload::message_properties;
use crate::backend::{CrashBackend, ExceptionPayload};
use crate::config::WriterConfig;
use crate::error::ConfigError;
use crate::gate::SeverityGate;
use crate::report::Reportable;
use crate::severity::Severity;
use crate::translator::FrameTranslator;

/// One log call as handed over by the logging façade.
#[derive(Clone, Copy)]
pub struct LogEvent<'a> {
    pub severity: Severity,
    pub message: &'a str,
    pub tag: &'a str,
    pub error: Option<&'a dyn Reportable>,
}

impl<'a> LogEvent<'a> {
    pub fn new(severity: Severity, message: &'a str, tag: &'a str) -> Self {
        Self {
            severity,
            message,
            tag,
            error: None,
        }
    }

    pub fn with_error(mut self, error: &'a dyn Reportable) -> Self {
        self.error = Some(error);
        self
    }
}

impl fmt::Debug for LogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("tag", &self.tag)
            .field("error", &self.error.map(|e| e.type_name()))
            .finish()
    }
}

/// Sink for log events, one implementation per reporting target.
pub trait LogWriter: Send + Sync {
    fn is_loggable(&self, severity: Severity) -> bool;

    fn log(&self, event: &LogEvent<'_>);
}

pub struct CrashLogWriter<B: CrashBackend> {
    gate: SeverityGate,
    print_tag: bool,
    translator: FrameTranslator,
    backend: B,
}

impl<B: CrashBackend> CrashLogWriter<B> {
    /// Fails when `min_severity` is above `min_crash_severity`.
    pub fn new(
        min_severity: Severity,
        min_crash_severity: Severity,
        print_tag: bool,
        backend: B,
    ) -> Result<Self, ConfigError> {
        Self::from_config(
            &WriterConfig::new(min_severity, min_crash_severity, print_tag),
            backend,
        )
    }

    pub fn from_config(config: &WriterConfig, backend: B) -> Result<Self, ConfigError> {
        let gate = SeverityGate::new(config.min_severity, config.min_crash_severity)?;
        Ok(Self {
            gate,
            print_tag: config.print_tag,
            translator: FrameTranslator::with_rules(
                config.boilerplate.clone(),
                config.rust_boilerplate.clone(),
            ),
            backend,
        })
    }

    pub fn gate(&self) -> &SeverityGate {
        &self.gate
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit the event if it is crash-worthy and return the report id.
    pub fn forward(&self, event: &LogEvent<'_>) -> Option<Uuid> {
        if !self.gate.should_forward(event.severity, event.error.is_some()) {
            return None;
        }
        let error = event.error?;

        let properties = message_properties(event.tag, event.message, self.print_tag);
        let payload = ExceptionPayload::new(
            event.severity,
            self.translator.translate(error),
            error.stack_trace_text(),
            properties,
        );

        Some(self.backend.track_exception(payload))
    }
}

impl<B: CrashBackend> LogWriter for CrashLogWriter<B> {
    fn is_loggable(&self, severity: Severity) -> bool {
        self.gate.is_loggable(severity)
    }

    fn log(&self, event: &LogEvent<'_>) {
        let _ = self.forward(event);
    }
}

impl<B: CrashBackend> fmt::Debug for CrashLogWriter<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrashLogWriter")
            .field("gate", &self.gate)
            .field("print_tag", &self.print_tag)
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}
