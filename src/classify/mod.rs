//! Engine-level guard and three-way classification of script results.
//!
//! InDesign hands back a single string per `do script`, so the guard folds
//! exceptions into that string behind [`SENTINEL`]. This module is the only
//! place that knows the format.

use std::fmt;

use crate::{error::TransportError, script::ScriptPayload};

/// Prefix the guard puts in front of any exception caught inside the engine.
pub const SENTINEL: &str = "ERROR: ";

const LINE_MARKER: &str = " (Line: ";

/// Result of one script execution, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The script's final value, trimmed of surrounding whitespace.
    Success(String),
    /// ExtendScript raised while running the payload.
    EngineError { message: String, line: Option<u32> },
    /// The host call failed to spawn, exited non-zero, or timed out.
    TransportError(String),
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Success(text) => f.write_str(text),
            ExecutionOutcome::EngineError {
                message,
                line: Some(line),
            } => write!(f, "InDesign script error: {} (line {})", message, line),
            ExecutionOutcome::EngineError { message, line: None } => {
                write!(f, "InDesign script error: {}", message)
            }
            ExecutionOutcome::TransportError(diagnostic) => {
                write!(f, "automation call failed: {}", diagnostic)
            }
        }
    }
}

/// Enclose `payload` so any exception becomes a sentinel-prefixed string.
///
/// The payload is inserted unindented and starts on the `try` line, so engine
/// line numbers match the payload's own. Raw scripts may contain multi-line
/// string continuations whose content would change under re-indentation.
pub fn guard(payload: &ScriptPayload) -> String {
    let body = payload.as_str();
    let newline = if body.ends_with('\n') { "" } else { "\n" };
    format!(
        "try {{ {}{}}} catch (e) {{\n    \"{}\" + e.message + \"{}\" + (e.line ? e.line : \"unknown\") + \")\";\n}}\n",
        body, newline, SENTINEL, LINE_MARKER
    )
}

/// Split a raw host result into exactly one outcome.
pub fn classify(raw: Result<String, TransportError>) -> ExecutionOutcome {
    match raw {
        Ok(text) => classify_text(&text),
        Err(err) => ExecutionOutcome::TransportError(err.to_string()),
    }
}

pub fn classify_text(text: &str) -> ExecutionOutcome {
    let text = text.trim();
    match text.strip_prefix(SENTINEL) {
        Some(rest) => parse_engine_error(rest),
        None => ExecutionOutcome::Success(text.to_string()),
    }
}

fn parse_engine_error(rest: &str) -> ExecutionOutcome {
    let parsed = rest
        .strip_suffix(')')
        .and_then(|inner| inner.rfind(LINE_MARKER).map(|at| (inner, at)))
        .map(|(inner, at)| {
            let message = &inner[..at];
            let line = inner[at + LINE_MARKER.len()..].trim().parse::<u32>().ok();
            (message, line)
        });
    match parsed {
        Some((message, line)) => ExecutionOutcome::EngineError {
            message: message.to_string(),
            line,
        },
        None => ExecutionOutcome::EngineError {
            message: rest.to_string(),
            line: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn plain_text_is_success_verbatim() {
        assert_eq!(
            classify_text("  Page added. Document now has 3 pages\n"),
            ExecutionOutcome::Success("Page added. Document now has 3 pages".into())
        );
        assert_eq!(classify_text(""), ExecutionOutcome::Success(String::new()));
    }

    #[test]
    fn sentinel_with_line_is_engine_error() {
        assert_eq!(
            classify_text("ERROR: Object is invalid (Line: 12)\n"),
            ExecutionOutcome::EngineError {
                message: "Object is invalid".into(),
                line: Some(12),
            }
        );
    }

    #[test]
    fn unknown_line_is_none() {
        assert_eq!(
            classify_text("ERROR: boom (Line: unknown)"),
            ExecutionOutcome::EngineError {
                message: "boom".into(),
                line: None,
            }
        );
    }

    #[test]
    fn message_may_contain_the_marker() {
        assert_eq!(
            classify_text("ERROR: bad (Line: x) text (Line: 7)"),
            ExecutionOutcome::EngineError {
                message: "bad (Line: x) text".into(),
                line: Some(7),
            }
        );
    }

    #[test]
    fn sentinel_without_suffix_keeps_whole_message() {
        assert_eq!(
            classify_text("ERROR: something odd"),
            ExecutionOutcome::EngineError {
                message: "something odd".into(),
                line: None,
            }
        );
    }

    #[test]
    fn lowercase_error_is_not_the_sentinel() {
        assert!(classify_text("error: nothing wrong").is_success());
    }

    #[test]
    fn transport_failures_stay_transport_failures() {
        let outcome = classify(Err(TransportError::Timeout(Duration::from_secs(30))));
        assert_eq!(
            outcome,
            ExecutionOutcome::TransportError("script execution timed out after 30s".into())
        );
    }

    #[test]
    fn guard_keeps_payload_line_numbers() {
        let guarded = guard(&ScriptPayload::from_source("var a = 1;\nundefinedCall();\n"));
        let lines: Vec<&str> = guarded.lines().collect();
        assert!(lines[0].ends_with("var a = 1;"));
        assert_eq!(lines[1], "undefinedCall();");
    }

    #[test]
    fn guard_wraps_payload_in_try_catch() {
        let guarded = guard(&ScriptPayload::from_source("\"ok\";"));
        assert_eq!(
            guarded,
            "try { \"ok\";\n} catch (e) {\n    \"ERROR: \" + e.message + \" (Line: \" + (e.line ? e.line : \"unknown\") + \")\";\n}\n"
        );
    }
}
