//! Stack frame translation.
//!
//! Turns a [`Reportable`] into the name, description and structured frames a
//! crash backend expects. Leading frames that belong to the exception
//! machinery itself are trimmed, and unstructured lines are parsed with
//! [`parse_frame`]. Translation never fails: lines that cannot be parsed are
//! dropped.

use serde::{Deserialize, Serialize};

use crate::frame::{parse_frame, RawFrame, StackFrame};
use crate::report::Reportable;

/// Reported when the error carries no type name.
pub const UNKNOWN_TYPE: &str = "(Unknown Type)";

/// Substrings identifying frames of generic exception/throwable machinery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoilerplateRule {
    /// Namespace of the built-in types, including its trailing separator.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_type_names")]
    pub type_names: Vec<String>,
    /// Additional literal markers, e.g. `"std::backtrace"` for Rust traces.
    #[serde(default)]
    pub extra_markers: Vec<String>,
}

const RUST_CAPTURE_MARKERS: [&str; 4] = [
    "std::backtrace",
    "crashlog_writer::report",
    "crashlog_writer::logging",
    "log::__private_api",
];

fn default_namespace() -> String {
    "kotlin.".to_string()
}

fn default_type_names() -> Vec<String> {
    vec!["Exception".to_string(), "Throwable".to_string()]
}

impl Default for BoilerplateRule {
    fn default() -> Self {
        Self::kotlin()
    }
}

impl BoilerplateRule {
    pub fn new<S: Into<String>>(namespace: S, type_names: &[&str]) -> Self {
        Self {
            namespace: namespace.into(),
            type_names: type_names.iter().map(|name| name.to_string()).collect(),
            extra_markers: Vec::new(),
        }
    }

    /// `kotlin.Exception` / `kotlin.Throwable` and their constructors.
    pub fn kotlin() -> Self {
        Self {
            namespace: default_namespace(),
            type_names: default_type_names(),
            extra_markers: Vec::new(),
        }
    }

    /// Frames of Rust's backtrace capture and of this crate's capture path.
    pub fn rust() -> Self {
        Self {
            namespace: String::new(),
            type_names: Vec::new(),
            extra_markers: RUST_CAPTURE_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    pub fn with_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.extra_markers.push(marker.into());
        self
    }

    pub fn is_boilerplate(&self, frame: &str) -> bool {
        self.type_names.iter().any(|name| {
            frame.contains(&format!("{}{}", self.namespace, name))
                || frame.contains(&format!("{}.<init>", name))
        }) || self
            .extra_markers
            .iter()
            .any(|marker| frame.contains(marker.as_str()))
    }
}

/// Result of translating one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedException {
    pub type_name: String,
    pub description: String,
    pub frames: Vec<StackFrame>,
}

/// Text frames are matched against `text_rule`, structured frames (Rust
/// backtraces) against `structured_rule`.
#[derive(Debug, Clone)]
pub struct FrameTranslator {
    text_rule: BoilerplateRule,
    structured_rule: BoilerplateRule,
}

impl Default for FrameTranslator {
    fn default() -> Self {
        Self::new(BoilerplateRule::kotlin())
    }
}

impl FrameTranslator {
    pub fn new(text_rule: BoilerplateRule) -> Self {
        Self::with_rules(text_rule, BoilerplateRule::rust())
    }

    pub fn with_rules(text_rule: BoilerplateRule, structured_rule: BoilerplateRule) -> Self {
        Self {
            text_rule,
            structured_rule,
        }
    }

    pub fn text_rule(&self) -> &BoilerplateRule {
        &self.text_rule
    }

    pub fn structured_rule(&self) -> &BoilerplateRule {
        &self.structured_rule
    }

    fn is_boilerplate(&self, frame: &RawFrame) -> bool {
        let rule = match frame {
            RawFrame::Text(_) => &self.text_rule,
            RawFrame::Structured(_) => &self.structured_rule,
        };
        rule.is_boilerplate(&frame.render())
    }

    pub fn translate(&self, error: &dyn Reportable) -> TranslatedException {
        let trace = error.stack_trace();
        let start = self.first_informative_frame(trace);

        let frames = trace[start..]
            .iter()
            .filter_map(|raw| match raw {
                RawFrame::Text(line) => parse_frame(line),
                RawFrame::Structured(frame) => Some(frame.clone()),
            })
            .collect();

        TranslatedException {
            type_name: error.type_name().unwrap_or(UNKNOWN_TYPE).to_string(),
            description: error.message().unwrap_or_default().to_string(),
            frames,
        }
    }

    /// Index of the first frame outside the exception machinery.
    ///
    /// Falls back to 0 when every frame matches, so such traces are reported
    /// whole.
    pub fn first_informative_frame(&self, trace: &[RawFrame]) -> usize {
        trace
            .iter()
            .position(|frame| !self.is_boilerplate(frame))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CapturedError;
    use pretty_assertions::assert_eq;

    const KOTLIN_TRACE: [&str; 6] = [
        "0   MyApp   0x000000010a1b2c3d kfun:kotlin.Throwable#<init>(kotlin.String?){} + 120",
        "1   MyApp   0x000000010a1b2d00 kfun:kotlin.Exception#<init>(kotlin.String?){} + 88",
        "2   MyApp   0x000000010a1b2e11 kfun:kotlin.IllegalStateException#<init>(kotlin.String?){} + 88",
        "3   MyApp   0x000000010a1b3f22 kfun:com.example.Repository#load(){} + 412",
        "4   MyApp",
        "5   libdyld.dylib   0x00007fff2036f621 start + 1",
    ];

    #[test]
    fn trims_boilerplate_and_parses_the_rest() {
        let error = CapturedError::new(Some("IllegalStateException"), Some("bad state"))
            .with_frame_lines(KOTLIN_TRACE);

        let translated = FrameTranslator::default().translate(&error);

        assert_eq!(translated.type_name, "IllegalStateException");
        assert_eq!(translated.description, "bad state");
        assert_eq!(
            translated.frames,
            vec![
                StackFrame {
                    file_name: Some("MyApp".into()),
                    address: Some("0x000000010a1b2e11".into()),
                    class_name: Some("kfun:kotlin.IllegalStateException".into()),
                    method_name: Some("<init>(kotlin.String?){}".into()),
                },
                StackFrame {
                    file_name: Some("MyApp".into()),
                    address: Some("0x000000010a1b3f22".into()),
                    class_name: Some("kfun:com.example.Repository".into()),
                    method_name: Some("load(){}".into()),
                },
                StackFrame {
                    file_name: Some("libdyld".into()),
                    address: Some("dylib".into()),
                    class_name: Some("0x00007fff2036f621".into()),
                    method_name: Some("start".into()),
                },
            ]
        );
    }

    #[test]
    fn drops_exactly_the_leading_boilerplate() {
        let lines = [
            "0 App 0x1 kotlin.Exception frame one",
            "1 App 0x2 kotlin.Exception frame two",
            "2 App 0x3 Repo load frame",
            "3 App 0x4 kotlin.Exception later frame",
        ];
        let error = CapturedError::new(None, None).with_frame_lines(lines);
        let translator = FrameTranslator::default();

        assert_eq!(translator.first_informative_frame(error.stack_trace()), 2);
        let frames = translator.translate(&error).frames;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].address.as_deref(), Some("0x3"));
        assert_eq!(frames[1].address.as_deref(), Some("0x4"));
    }

    #[test]
    fn constructor_markers_count_as_boilerplate() {
        let rule = BoilerplateRule::kotlin();
        assert!(rule.is_boilerplate("0 App 0x1 Throwable.<init> x y"));
        assert!(rule.is_boilerplate("0 App 0x1 Exception.<init> x y"));
        assert!(!rule.is_boilerplate("0 App 0x1 Repo.load x y"));
    }

    #[test]
    fn all_boilerplate_keeps_everything() {
        let lines = [
            "0 App 0x1 kotlin.Throwable a b",
            "1 App 0x2 kotlin.Exception a b",
        ];
        let error = CapturedError::new(None, None).with_frame_lines(lines);
        let translator = FrameTranslator::default();

        assert_eq!(translator.first_informative_frame(error.stack_trace()), 0);
        assert_eq!(translator.translate(&error).frames.len(), 2);
    }

    #[test]
    fn missing_type_and_message_fall_back() {
        let translated = FrameTranslator::default().translate(&CapturedError::new(None, None));
        assert_eq!(translated.type_name, UNKNOWN_TYPE);
        assert_eq!(translated.description, "");
        assert!(translated.frames.is_empty());
    }

    #[test]
    fn structured_frames_pass_through() {
        let frame = StackFrame {
            class_name: Some("app::Repo".into()),
            method_name: Some("load".into()),
            ..Default::default()
        };
        let error = CapturedError::new(Some("Error"), Some("io"))
            .with_frames([RawFrame::Structured(frame.clone())]);

        assert_eq!(FrameTranslator::default().translate(&error).frames, vec![frame]);
    }

    fn rust_frame(class_name: &str, method_name: &str) -> RawFrame {
        RawFrame::Structured(StackFrame {
            class_name: Some(class_name.into()),
            method_name: Some(method_name.into()),
            ..Default::default()
        })
    }

    #[test]
    fn reporter_frames_are_trimmed_from_rust_traces() {
        let error = CapturedError::new(None, Some("disk full")).with_frames([
            rust_frame("std::backtrace_rs::backtrace::libunwind", "trace"),
            rust_frame("std::backtrace::Backtrace", "capture"),
            rust_frame("crashlog_writer::report::CapturedError", "from_dyn"),
            rust_frame("crashlog_writer::logging", "record_error"),
            rust_frame(
                "<crashlog_writer::logging::CrashLogger<W> as log::Log>",
                "log",
            ),
            rust_frame("log::__private_api", "log_impl"),
            rust_frame("app::storage::Store", "flush"),
            rust_frame("app", "main"),
        ]);

        let frames = FrameTranslator::default().translate(&error).frames;

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].class_name.as_deref(), Some("app::storage::Store"));
        assert_eq!(frames[0].method_name.as_deref(), Some("flush"));
    }

    #[test]
    fn kotlin_markers_do_not_apply_to_structured_frames() {
        let error = CapturedError::new(None, None).with_frames([
            rust_frame("kotlin.Exception", "init"),
            rust_frame("app", "main"),
        ]);
        let translator = FrameTranslator::default();
        assert_eq!(translator.first_informative_frame(error.stack_trace()), 0);
    }

    #[test]
    fn rust_rule_ignores_text_frames() {
        let error = CapturedError::new(None, None)
            .with_frame_lines(["0 App 0x1 std::backtrace capture x y", "1 App 0x2 Repo load x y"]);
        assert_eq!(
            FrameTranslator::default().first_informative_frame(error.stack_trace()),
            0
        );
    }

    #[test]
    fn extra_markers_extend_the_rule() {
        let rule = BoilerplateRule::kotlin().with_marker("std::backtrace");
        let translator = FrameTranslator::new(rule);
        let lines = [
            "0 app 0x1 std::backtrace::Backtrace capture x",
            "1 app 0x2 Repo load x y",
        ];
        let error = CapturedError::new(None, None).with_frame_lines(lines);
        assert_eq!(translator.first_informative_frame(error.stack_trace()), 1);
    }
}
