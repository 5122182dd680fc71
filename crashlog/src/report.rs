use std::backtrace::Backtrace;
use std::error::Error;

use crate::frame::RawFrame;
use crate::rust_trace;

/// An error as seen by the crash reporter: a type name, a message and the
/// platform stack trace. Read-only.
pub trait Reportable {
    fn type_name(&self) -> Option<&str>;

    fn message(&self) -> Option<&str>;

    /// Raw frames in platform order.
    fn stack_trace(&self) -> &[RawFrame];

    /// Full textual dump of the error and its trace.
    fn stack_trace_text(&self) -> String {
        let mut text = match (self.type_name(), self.message()) {
            (Some(ty), Some(msg)) => format!("{}: {}", ty, msg),
            (Some(ty), None) => ty.to_string(),
            (None, Some(msg)) => msg.to_string(),
            (None, None) => String::new(),
        };

        for frame in self.stack_trace() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("    at ");
            text.push_str(&frame.render());
        }

        text
    }
}

/// Owned [`Reportable`] built from explicit parts or captured from a Rust error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedError {
    type_name: Option<String>,
    message: Option<String>,
    frames: Vec<RawFrame>,
}

impl CapturedError {
    pub fn new(type_name: Option<&str>, message: Option<&str>) -> Self {
        Self {
            type_name: type_name.map(str::to_string),
            message: message.map(str::to_string),
            frames: Vec::new(),
        }
    }

    pub fn with_frames<I>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = RawFrame>,
    {
        self.frames.extend(frames);
        self
    }

    /// Attach unstructured backtrace lines, e.g. a Kotlin/Native trace dump.
    pub fn with_frame_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_frames(lines.into_iter().map(|line| RawFrame::Text(line.into())))
    }

    /// Capture a typed Rust error together with the current backtrace.
    ///
    /// Frames are only present when backtraces are enabled (`RUST_BACKTRACE`).
    pub fn capture<E>(error: &E) -> Self
    where
        E: Error + 'static,
    {
        Self {
            type_name: Some(simple_type_name(std::any::type_name::<E>()).to_string()),
            message: Some(error.to_string()),
            frames: rust_trace::frames_from_backtrace(&Backtrace::capture()),
        }
    }

    /// Capture a type-erased error. The concrete type is unknown here.
    pub fn from_dyn(error: &(dyn Error + 'static)) -> Self {
        Self::from_dyn_with_backtrace(error, &Backtrace::capture())
    }

    /// Type-erased error with a backtrace the caller already holds.
    pub fn from_dyn_with_backtrace(error: &(dyn Error + 'static), backtrace: &Backtrace) -> Self {
        Self {
            type_name: None,
            message: Some(error.to_string()),
            frames: rust_trace::frames_from_backtrace(backtrace),
        }
    }
}

impl Reportable for CapturedError {
    fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn stack_trace(&self) -> &[RawFrame] {
        &self.frames
    }
}

/// Last path segment of a type path, ignoring generic arguments.
fn simple_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
