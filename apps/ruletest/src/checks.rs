//! Built-in rule logic compiled from manifest `create` tables.

use crate::models::manifest::CreateSpec;
use crate::models::{Diagnostic, RuleContext, RuleLogic};
use regex::Regex;

#[derive(Debug, Clone)]
pub enum Check {
    Pattern { regex: Regex, message: String },
    Required { regex: Regex, message: String },
    MaxLines { max: usize, message: String },
}

/// Compile a `create` table. Regexes are compiled once here, not per case.
pub fn compile(spec: &CreateSpec) -> Result<Check, regex::Error> {
    Ok(match spec {
        CreateSpec::Pattern { regex, message } => Check::Pattern {
            regex: Regex::new(regex)?,
            message: message
                .clone()
                .unwrap_or_else(|| "Unexpected `{{match}}`.".to_string()),
        },
        CreateSpec::Required { regex, message } => Check::Required {
            regex: Regex::new(regex)?,
            message: message
                .clone()
                .unwrap_or_else(|| format!("Expected source to match /{}/.", regex)),
        },
        CreateSpec::MaxLines { max, message } => Check::MaxLines {
            max: *max,
            message: message
                .clone()
                .unwrap_or_else(|| format!("File has too many lines (maximum is {}).", max)),
        },
    })
}

impl RuleLogic for Check {
    fn check(&self, cx: &RuleContext<'_>) -> Vec<Diagnostic> {
        match self {
            Check::Pattern { regex, message } => regex
                .find_iter(cx.code)
                .map(|m| {
                    let (line, column) = position(cx.code, m.start());
                    let (end_line, end_column) = position(cx.code, m.end());
                    Diagnostic::at(message.replace("{{match}}", m.as_str()), line, column)
                        .ending_at(end_line, end_column)
                })
                .collect(),
            Check::Required { regex, message } => {
                if cx.code.trim().is_empty() || regex.is_match(cx.code) {
                    Vec::new()
                } else {
                    vec![Diagnostic::at(message.clone(), 1, 1)]
                }
            }
            Check::MaxLines { max, message } => {
                match cx.code.split('\n').enumerate().nth(*max) {
                    Some((index, line)) => vec![Diagnostic::at(message.clone(), index + 1, 1)
                        .ending_at(index + 1, line.chars().count() + 1)],
                    None => Vec::new(),
                }
            }
        }
    }
}

/// 1-based line and column (in chars) of a byte offset.
fn position(code: &str, offset: usize) -> (usize, usize) {
    let before = &code[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
