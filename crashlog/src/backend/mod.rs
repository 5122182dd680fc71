pub mod memory;
pub mod payload;
pub mod sentry_client;

pub use memory::MemoryBackend;
pub use payload::{ExceptionPayload, MESSAGE_PROPERTY};
pub use sentry_client::SentryBackend;

use std::sync::Arc;
use uuid::Uuid;

/// Client of a crash-reporting service.
///
/// Delivery, retries and persistence belong to the implementation; callers
/// submit a payload once and move on.
pub trait CrashBackend: Send + Sync {
    /// Submit a handled exception and return its report id.
    fn track_exception(&self, payload: ExceptionPayload) -> Uuid;
}

impl<B: CrashBackend + ?Sized> CrashBackend for Arc<B> {
    fn track_exception(&self, payload: ExceptionPayload) -> Uuid {
        (**self).track_exception(payload)
    }
}

impl<B: CrashBackend + ?Sized> CrashBackend for Box<B> {
    fn track_exception(&self, payload: ExceptionPayload) -> Uuid {
        (**self).track_exception(payload)
    }
}
