use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{CrashBackend, ExceptionPayload};

/// Backend that keeps every report in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    reports: Mutex<Vec<(Uuid, ExceptionPayload)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies of the stored payloads, oldest first.
    pub fn payloads(&self) -> Vec<ExceptionPayload> {
        self.lock().iter().map(|(_, payload)| payload.clone()).collect()
    }

    pub fn get(&self, id: &Uuid) -> Option<ExceptionPayload> {
        self.lock()
            .iter()
            .find(|(report_id, _)| report_id == id)
            .map(|(_, payload)| payload.clone())
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<ExceptionPayload> {
        self.lock().drain(..).map(|(_, payload)| payload).collect()
    }

    // A panic while holding the lock must not disable crash reporting.
    fn lock(&self) -> MutexGuard<'_, Vec<(Uuid, ExceptionPayload)>> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CrashBackend for MemoryBackend {
    fn track_exception(&self, payload: ExceptionPayload) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().push((id, payload));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::payload::message_properties;
    use crate::severity::Severity;
    use crate::translator::TranslatedException;

    fn payload(description: &str) -> ExceptionPayload {
        ExceptionPayload::new(
            Severity::Error,
            TranslatedException {
                type_name: "Error".into(),
                description: description.into(),
                frames: Vec::new(),
            },
            String::new(),
            message_properties("", description, false),
        )
    }

    #[test]
    fn records_in_order_and_drains() {
        let backend = MemoryBackend::new();
        let first = backend.track_exception(payload("one"));
        backend.track_exception(payload("two"));

        assert_eq!(backend.len(), 2);
        assert_eq!(backend.get(&first).unwrap().description, "one");

        let drained = backend.drain();
        assert_eq!(drained[0].description, "one");
        assert_eq!(drained[1].description, "two");
        assert!(backend.is_empty());
    }
}
