// Structured frames from Rust's own `std::backtrace::Backtrace`.
use std::backtrace::{Backtrace, BacktraceStatus};

use crate::frame::{RawFrame, StackFrame};

/// Frames of a captured backtrace. Disabled or unsupported backtraces give none.
pub fn frames_from_backtrace(backtrace: &Backtrace) -> Vec<RawFrame> {
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    parse_backtrace_text(&backtrace.to_string())
}

/// Parse the `Display` form of a backtrace:
///
/// ```text
///    0: app::repo::Repo::load
///              at ./src/repo.rs:42:9
/// ```
pub fn parse_backtrace_text(text: &str) -> Vec<RawFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();

    for line in text.lines() {
        let line = line.trim();

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                if last.file_name.is_none() {
                    last.file_name = Some(location.to_string());
                }
            }
            continue;
        }

        let Some((index, symbol)) = line.split_once(": ") else {
            continue;
        };
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let symbol = strip_symbol_hash(symbol.trim());
        let (class_name, method_name) = match split_symbol_path(symbol) {
            Some((path, method)) => (Some(path.to_string()), Some(method.to_string())),
            None => (None, Some(symbol.to_string())),
        };

        frames.push(StackFrame {
            file_name: None,
            address: None,
            class_name,
            method_name,
        });
    }

    frames.into_iter().map(RawFrame::Structured).collect()
}

/// Split `path::method` at the last `::` outside generic arguments.
///
/// A trailing turbofish (`::<T>`) stays with the function it belongs to.
fn split_symbol_path(symbol: &str) -> Option<(&str, &str)> {
    let bytes = symbol.as_bytes();
    let mut depth = 0usize;
    let mut separators = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            // `->` in fn pointer types is not a closing bracket.
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                separators.push(i);
                i += 2;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    let mut split = separators.pop()?;
    if symbol[split + 2..].starts_with('<') {
        split = separators.pop()?;
    }
    Some((&symbol[..split], &symbol[split + 2..]))
}

// Legacy mangling appends `::h<16 hex digits>`.
fn strip_symbol_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((path, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            path
        }
        _ => symbol,
    }
}
