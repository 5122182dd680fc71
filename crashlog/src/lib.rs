pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod gate;
pub mod logging;
pub mod report;
pub mod rust_trace;
pub mod severity;
pub mod translator;
pub mod writer;

use log::info;

// Re-export core types for hosts wiring up a writer.
pub use backend::{CrashBackend, ExceptionPayload, MemoryBackend, SentryBackend};
pub use config::WriterConfig;
pub use error::ConfigError;
pub use frame::{parse_frame, RawFrame, StackFrame};
pub use gate::SeverityGate;
pub use report::{CapturedError, Reportable};
pub use severity::Severity;
pub use translator::{BoilerplateRule, FrameTranslator, TranslatedException, UNKNOWN_TYPE};
pub use writer::{CrashLogWriter, LogEvent, LogWriter};

/// Load configuration, start Sentry from the environment and install the
/// crash-reporting logger.
pub fn initialize() -> Result<(), Box<dyn std::error::Error>> {
    let config = WriterConfig::load().map_err(|e| format!("Configuration error: {}", e))?;
    let sentry_enabled = logging::init_sentry_from_env();

    let writer = CrashLogWriter::from_config(&config, SentryBackend::new())?;
    logging::init_logger(writer)?;

    info!(
        "[CRASHLOG] Ready - min {}, crash {}, sentry {}",
        config.min_severity,
        config.min_crash_severity,
        if sentry_enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
