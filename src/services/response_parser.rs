//! Task extraction grammar for analyzer responses.
//!
//! ```text
//! response  := "No" | line ("\n" line)*
//! line      := date " | " description | description
//! date      := "Unknown" | YYYY-MM-DD HH:mm:ss
//! ```
//!
//! The analyzer is a language model, so the grammar is applied leniently:
//! blank lines are skipped, a line without the delimiter becomes an undated
//! candidate, and an unreadable date degrades to `Unknown`. Parsing never fails.

use std::str::Lines;

use chrono::NaiveDateTime;

use crate::models::{DueDate, TaskCandidate, DUE_DATE_FORMAT, UNKNOWN_TOKEN};

/// Whole-response answer meaning "this message holds no task".
pub const NO_TASKS_TOKEN: &str = "No";

pub const DELIMITER: &str = " | ";

/// Lazily yields the candidates of one response, in response order.
pub struct Candidates<'a> {
    lines: Option<Lines<'a>>,
}

impl<'a> Iterator for Candidates<'a> {
    type Item = TaskCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        for line in lines.by_ref() {
            let line = line.trim();
            if !line.is_empty() {
                return Some(parse_line(line));
            }
        }
        self.lines = None;
        None
    }
}

pub fn parse_response(text: &str) -> Candidates<'_> {
    let text = text.trim();
    let lines = if text == NO_TASKS_TOKEN {
        None
    } else {
        Some(text.lines())
    };
    Candidates { lines }
}

/// Parse one non-blank, trimmed line.
pub fn parse_line(line: &str) -> TaskCandidate {
    match line.split_once(DELIMITER).or_else(|| dated_without_description(line)) {
        Some((date, description)) => TaskCandidate {
            due_date: parse_due_date(date),
            description: description.trim().to_string(),
        },
        None => {
            log::debug!("analyzer line without delimiter: {:?}", line);
            TaskCandidate {
                due_date: DueDate::Unknown,
                description: line.to_string(),
            }
        }
    }
}

/// A trimmed `"<date> | "` loses the delimiter's trailing space. Only a
/// well-formed date token is split off, so free text ending in `" |"` stays
/// a whole description.
fn dated_without_description(line: &str) -> Option<(&str, &str)> {
    let token = line.strip_suffix(DELIMITER.trim_end())?;
    due_date_token(token).map(|_| (token, ""))
}

/// `Unknown`, or a timestamp in exactly the `YYYY-MM-DD HH:mm:ss` shape.
/// Anything else is treated as `Unknown`.
pub fn parse_due_date(token: &str) -> DueDate {
    due_date_token(token).unwrap_or_else(|| {
        log::debug!("unreadable due date {:?}, using Unknown", token.trim());
        DueDate::Unknown
    })
}

fn due_date_token(token: &str) -> Option<DueDate> {
    let token = token.trim();
    if token == UNKNOWN_TOKEN {
        return Some(DueDate::Unknown);
    }
    match NaiveDateTime::parse_from_str(token, DUE_DATE_FORMAT) {
        // chrono accepts unpadded fields; require the canonical rendering
        Ok(at) if at.format(DUE_DATE_FORMAT).to_string() == token => Some(DueDate::Dated(at)),
        _ => None,
    }
}
