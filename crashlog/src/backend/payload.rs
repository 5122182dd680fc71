use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::frame::StackFrame;
use crate::severity::Severity;
use crate::translator::TranslatedException;

/// Property key carrying the (optionally tagged) log message.
pub const MESSAGE_PROPERTY: &str = "message";

/// Everything a backend needs for one handled exception, gathered up front.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionPayload {
    pub severity: Severity,
    pub type_name: String,
    pub description: String,
    pub frames: Vec<StackFrame>,
    /// Verbatim trace dump, kept next to the structured frames.
    pub stack_trace: String,
    pub properties: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl ExceptionPayload {
    pub fn new(
        severity: Severity,
        exception: TranslatedException,
        stack_trace: String,
        properties: BTreeMap<String, String>,
    ) -> Self {
        Self {
            severity,
            type_name: exception.type_name,
            description: exception.description,
            frames: exception.frames,
            stack_trace,
            properties,
            occurred_at: Utc::now(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.properties.get(MESSAGE_PROPERTY).map(String::as_str)
    }
}

/// Build the property map for a log message.
pub fn message_properties(tag: &str, message: &str, print_tag: bool) -> BTreeMap<String, String> {
    let value = if print_tag {
        format!("{} : {}", tag, message)
    } else {
        message.to_string()
    };
    BTreeMap::from([(MESSAGE_PROPERTY.to_string(), value)])
}
