use log::{info, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, MutexGuard};

use crate::report::{CapturedError, Reportable};
use crate::severity::{level_filter_for, Severity};
use crate::writer::{LogEvent, LogWriter};

pub const ENV_SENTRY_DSN: &str = "CRASHLOG_SENTRY_DSN";
pub const ENV_SENTRY_ENVIRONMENT: &str = "SENTRY_ENVIRONMENT";

/// Key-value key under which a record carries its error (`error:err = e`).
pub const ERROR_KEY: &str = "error";

static SENTRY_GUARD: Mutex<Option<sentry::ClientInitGuard>> = Mutex::new(None);

fn sentry_guard() -> MutexGuard<'static, Option<sentry::ClientInitGuard>> {
    SENTRY_GUARD
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start the Sentry client that [`SentryBackend`](crate::SentryBackend)
/// submits handled exceptions to. Returns whether it is running.
///
/// A missing or empty DSN leaves reporting off; submitted payloads are then
/// dropped by the SDK.
pub fn init_sentry(dsn: Option<&str>, environment: Option<&str>) -> bool {
    let dsn_value = match dsn {
        Some(d) if !d.is_empty() => d,
        _ => {
            info!("[SENTRY] No DSN provided - Sentry disabled");
            return false;
        }
    };

    let env_cow = environment.map(|e| std::borrow::Cow::Owned(e.to_string()));

    let guard = sentry::init((
        dsn_value,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: env_cow,
            attach_stacktrace: false,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        *sentry_guard() = Some(guard);
        info!("[SENTRY] Initialized successfully - Environment: {:?}", environment);
        true
    } else {
        info!("[SENTRY] Failed to initialize");
        false
    }
}

/// Initialize Sentry from `CRASHLOG_SENTRY_DSN` / `SENTRY_ENVIRONMENT`,
/// reading a `.env` file first when present.
pub fn init_sentry_from_env() -> bool {
    let _ = dotenvy::dotenv();

    match std::env::var(ENV_SENTRY_DSN) {
        Ok(dsn) => {
            let environment = std::env::var(ENV_SENTRY_ENVIRONMENT).ok();
            init_sentry(Some(&dsn), environment.as_deref())
        }
        Err(_) => {
            info!("[SENTRY] Monitoring disabled (no {} configured)", ENV_SENTRY_DSN);
            false
        }
    }
}

/// Whether crash reports currently reach Sentry.
pub fn is_sentry_enabled() -> bool {
    sentry_guard().as_ref().map_or(false, |g| g.is_enabled())
}

/// Shutdown Sentry, flushing queued reports.
pub fn shutdown_sentry() {
    if let Some(guard) = sentry_guard().take() {
        info!("[SENTRY] Shutting down - flushing events");
        drop(guard);
        info!("[SENTRY] Shutdown complete");
    }
}

/// `log` façade adapter: every record goes to the console destination and
/// to a [`LogWriter`], with the record's `error` value as the attached error.
pub struct CrashLogger<W> {
    writer: W,
    dest: Option<env_logger::Logger>,
}

impl<W: LogWriter> CrashLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, dest: None }
    }

    pub fn with_dest(mut self, dest: env_logger::Logger) -> Self {
        self.dest = Some(dest);
        self
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Most verbose level either the writer or the destination accepts.
    pub fn max_level(&self) -> LevelFilter {
        let writer_level = Severity::ALL
            .iter()
            .find(|severity| self.writer.is_loggable(**severity))
            .map_or(LevelFilter::Off, |severity| level_filter_for(*severity));
        let dest_level = self.dest.as_ref().map_or(LevelFilter::Off, |d| d.filter());
        writer_level.max(dest_level)
    }
}

impl<W: LogWriter> Log for CrashLogger<W> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.writer.is_loggable(metadata.level().into())
            || self.dest.as_ref().map_or(false, |d| d.enabled(metadata))
    }

    fn log(&self, record: &Record<'_>) {
        if let Some(ref dest) = self.dest {
            dest.log(record);
        }

        let severity = Severity::from(record.level());
        if !self.writer.is_loggable(severity) {
            return;
        }

        let message = record.args().to_string();
        let error = record_error(record);
        let event = LogEvent {
            severity,
            message: &message,
            tag: record.target(),
            error: error.as_ref().map(|e| e as &dyn Reportable),
        };
        self.writer.log(&event);
    }

    fn flush(&self) {
        if let Some(ref dest) = self.dest {
            dest.flush();
        }
    }
}

fn record_error(record: &Record<'_>) -> Option<CapturedError> {
    let value = record.key_values().get(log::kv::Key::from(ERROR_KEY))?;
    value.to_borrowed_error().map(CapturedError::from_dyn)
}

/// Make `writer` the crash sink of the global logger.
///
/// Records still reach the console through env_logger (`RUST_LOG`, default
/// `warn`); error-carrying records at or above the crash threshold are also
/// handed to `writer`.
pub fn init_logger<W>(writer: W) -> Result<(), log::SetLoggerError>
where
    W: LogWriter + 'static,
{
    let mut builder = env_logger::Builder::from_default_env();

    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(LevelFilter::Warn);
    }

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{:<5} [{}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    });

    let logger = CrashLogger::new(writer).with_dest(builder.build());
    let max_level = logger.max_level();

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}
