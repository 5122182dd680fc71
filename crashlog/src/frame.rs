use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

// Characters separating the columns of a Darwin backtrace line.
const FRAME_DELIMITERS: &[char] = &[' ', '-', '[', ']', '+', '?', '.', ','];

// Lines with fewer columns than this carry no usable symbol.
const MIN_FRAME_PARTS: usize = 6;

/// Prefix the Kotlin/Native compiler puts on mangled function symbols.
pub const MANGLED_SYMBOL_PREFIX: &str = "kfun:";

/// One structured frame in the shape crash backends expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub file_name: Option<String>,
    pub address: Option<String>,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.class_name, &self.method_name) {
            (Some(class), Some(method)) => write!(f, "{}.{}", class, method)?,
            (Some(class), None) => f.write_str(class)?,
            (None, Some(method)) => f.write_str(method)?,
            (None, None) => f.write_str("<unknown>")?,
        }
        if let Some(ref file) = self.file_name {
            write!(f, " ({})", file)?;
        }
        if let Some(ref address) = self.address {
            write!(f, " {}", address)?;
        }
        Ok(())
    }
}

/// A stack frame as the platform hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFrame {
    /// Unstructured backtrace line, e.g. `"3   MyApp   0x0001 kfun:a.B#c() + 4"`.
    Text(String),
    /// Frame the platform already resolved into fields.
    Structured(StackFrame),
}

impl RawFrame {
    /// Text used for boilerplate matching and the raw stack trace dump.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            RawFrame::Text(line) => Cow::Borrowed(line),
            RawFrame::Structured(frame) => Cow::Owned(frame.to_string()),
        }
    }
}

impl From<&str> for RawFrame {
    fn from(line: &str) -> Self {
        RawFrame::Text(line.to_string())
    }
}

impl From<String> for RawFrame {
    fn from(line: String) -> Self {
        RawFrame::Text(line)
    }
}

impl From<StackFrame> for RawFrame {
    fn from(frame: StackFrame) -> Self {
        RawFrame::Structured(frame)
    }
}

/// Parse one backtrace line into a [`StackFrame`].
///
/// Returns `None` when the line has too few columns; such lines are dropped
/// by the translator rather than reported.
pub fn parse_frame(line: &str) -> Option<StackFrame> {
    let parts: Vec<&str> = line
        .split(FRAME_DELIMITERS)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() < MIN_FRAME_PARTS {
        return None;
    }

    let mut frame = StackFrame {
        file_name: Some(parts[1].to_string()),
        address: Some(parts[2].to_string()),
        class_name: Some(parts[3].to_string()),
        method_name: Some(parts[4].to_string()),
    };

    // Mangled symbols contain delimiter characters, so re-read them from the line.
    if parts[3].starts_with(MANGLED_SYMBOL_PREFIX) {
        let (class_name, method_name) = split_mangled_symbol(line, parts[3]);
        frame.class_name = Some(class_name.to_string());
        frame.method_name = method_name.map(str::to_string);
    }

    Some(frame)
}

/// Split a `kfun:` symbol into class and method at the first `#` before the
/// next space.
fn split_mangled_symbol<'a>(line: &'a str, token: &str) -> (&'a str, Option<&'a str>) {
    let start = line.find(token).unwrap_or(0);
    let end = line[start..]
        .find(' ')
        .map(|offset| start + offset)
        .unwrap_or(line.len());
    let symbol = &line[start..end];

    match symbol.find('#') {
        Some(hash) => (&symbol[..hash], Some(&symbol[hash + 1..])),
        None => (symbol, None),
    }
}
