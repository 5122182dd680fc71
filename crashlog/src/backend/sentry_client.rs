use sentry::protocol::{Addr, Event, Exception, Frame, Map, Mechanism, Stacktrace, Value};
use uuid::Uuid;

use super::{CrashBackend, ExceptionPayload};
use crate::frame::StackFrame;

const LOGGER_NAME: &str = "crashlog-writer";

/// Reports through the process-wide Sentry client (see [`crate::logging::init_sentry`]).
///
/// Without an initialized client the event is discarded and a nil id returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentryBackend;

impl SentryBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CrashBackend for SentryBackend {
    fn track_exception(&self, payload: ExceptionPayload) -> Uuid {
        sentry::capture_event(event_from_payload(payload))
    }
}

/// Convert a payload into a Sentry event carrying one handled exception.
pub fn event_from_payload(payload: ExceptionPayload) -> Event<'static> {
    // Sentry lists the crashing frame last; platform traces start with it.
    let frames: Vec<Frame> = payload.frames.iter().rev().map(sentry_frame).collect();

    let exception = Exception {
        ty: payload.type_name,
        value: Some(payload.description),
        stacktrace: if frames.is_empty() {
            None
        } else {
            Some(Stacktrace {
                frames,
                ..Default::default()
            })
        },
        mechanism: Some(Mechanism {
            ty: "log".into(),
            handled: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };

    let mut extra: Map<String, Value> = payload
        .properties
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    extra.insert("stack_trace".into(), Value::String(payload.stack_trace));

    Event {
        exception: vec![exception].into(),
        level: payload.severity.into(),
        logger: Some(LOGGER_NAME.into()),
        message: payload.properties.get(super::MESSAGE_PROPERTY).cloned(),
        extra,
        timestamp: payload.occurred_at.into(),
        ..Default::default()
    }
}

fn sentry_frame(frame: &StackFrame) -> Frame {
    Frame {
        filename: frame.file_name.clone(),
        module: frame.class_name.clone(),
        function: frame.method_name.clone(),
        instruction_addr: frame.address.as_deref().and_then(parse_address),
        ..Default::default()
    }
}

fn parse_address(text: &str) -> Option<Addr> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok().map(Addr)
}
