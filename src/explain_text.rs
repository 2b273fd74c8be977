//! Reformatting of plain-text `explain` output into light markup.
//!
//! The input is headed by one of the `FIELD:`, `DESCRIPTION:` or `RESOURCE:`
//! sections, with field blocks indented by a fixed amount. Output keeps every
//! content line in order, strips the indentation, bolds section keywords and
//! field names, and separates field headers from their bodies with a blank line.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const SECTION_PREFIXES: &[&str] = &["FIELD:", "FIELDS:", "DESCRIPTION:", "RESOURCE:"];
const PASSTHROUGH_LANGUAGE: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Result of [`format_explain`].
pub enum FormattedExplain {
    /// Input was empty.
    Empty,
    /// Reformatted markup text.
    Markdown { value: String },
    /// Unrecognized content, returned unmodified and tagged with a language.
    Code { language: String, value: String },
}

impl FormattedExplain {
    /// Text content, regardless of variant.
    pub fn as_str(&self) -> &str {
        match self {
            FormattedExplain::Empty => "",
            FormattedExplain::Markdown { value } | FormattedExplain::Code { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Description,
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Line-parser states for description and resource layouts.
enum ParserState {
    /// Before the `FIELDS:` header.
    Init,
    /// Inside the resource-level `DESCRIPTION:` block.
    DescriptionBody,
    /// Expecting a field header line.
    FieldsNone,
    /// After a field header, waiting for its first body line.
    FieldFirst,
    /// Inside a field body.
    FieldRest,
}

impl ParserState {
    fn step(self, line: &str, layout: Layout) -> (ParserState, Vec<String>) {
        match self {
            ParserState::Init => {
                let formatted = embolden_prefix(line);
                if formatted.starts_with("**FIELD") {
                    (ParserState::FieldsNone, vec![formatted, String::new()])
                } else if layout == Layout::Resource && formatted.starts_with("**DESCRIPTION") {
                    (ParserState::DescriptionBody, vec![formatted])
                } else {
                    (ParserState::Init, vec![formatted])
                }
            }
            ParserState::DescriptionBody => {
                let formatted = remove_leading(&embolden_prefix(line)).to_string();
                if formatted.starts_with("**FIELD") {
                    (ParserState::FieldsNone, vec![formatted, String::new()])
                } else {
                    (ParserState::DescriptionBody, vec![formatted])
                }
            }
            ParserState::FieldsNone => {
                let formatted = embolden_field_name(remove_leading(line));
                let next = if formatted.starts_with("**") {
                    ParserState::FieldFirst
                } else {
                    ParserState::FieldsNone
                };
                (next, vec![formatted])
            }
            ParserState::FieldFirst => {
                if line.is_empty() {
                    (ParserState::FieldFirst, Vec::new())
                } else {
                    (
                        ParserState::FieldRest,
                        vec![String::new(), remove_leading(line).to_string()],
                    )
                }
            }
            ParserState::FieldRest => {
                if line.is_empty() {
                    (ParserState::FieldsNone, vec![String::new()])
                } else {
                    (ParserState::FieldRest, vec![remove_leading(line).to_string()])
                }
            }
        }
    }
}

/// Reformats raw `explain` output.
///
/// Dispatches on the leading section keyword; anything else is passed
/// through unchanged as [`FormattedExplain::Code`].
pub fn format_explain(raw_text: &str) -> FormattedExplain {
    if raw_text.is_empty() {
        return FormattedExplain::Empty;
    }

    let normalized = raw_text.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let value = if raw_text.starts_with("FIELD") {
        format_field(&lines)
    } else if raw_text.starts_with("DESCRIPTION") {
        format_sections(&lines, Layout::Description)
    } else if raw_text.starts_with("RESOURCE") {
        format_sections(&lines, Layout::Resource)
    } else {
        return FormattedExplain::Code {
            language: PASSTHROUGH_LANGUAGE.to_string(),
            value: raw_text.to_string(),
        };
    };

    FormattedExplain::Markdown { value }
}

fn format_field(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| remove_leading(&embolden_prefix(line)).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_sections(lines: &[&str], layout: Layout) -> String {
    let (_, out) = lines.iter().fold(
        (ParserState::Init, Vec::with_capacity(lines.len())),
        |(state, mut out), line| {
            let (next, emitted) = state.step(line, layout);
            out.extend(emitted);
            (next, out)
        },
    );
    out.join("\n")
}

/// Bolds a leading `FIELD:`, `FIELDS:`, `DESCRIPTION:` or `RESOURCE:` keyword.
pub fn embolden_prefix(line: &str) -> String {
    match SECTION_PREFIXES.iter().find(|p| line.starts_with(*p)) {
        Some(prefix) => format!("**{prefix}**{}", &line[prefix.len()..]),
        None => line.to_string(),
    }
}

fn field_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9A-Za-z_]+)\s+<(\[\])?[0-9A-Za-z_]+>(\s+-required-)?$")
            .expect("valid regex")
    })
}

/// Bolds the name in a `name <type>` / `name <[]type>` header line.
///
/// A trailing `-required-` marker becomes `**[required]**`. Other lines are
/// returned unchanged.
pub fn embolden_field_name(line: &str) -> String {
    let Some(cap) = field_header_re().captures(line) else {
        return line.to_string();
    };

    let name = &cap[1];
    let formatted = format!("**{name}**{}", &line[name.len()..]);
    if cap.get(3).is_some() {
        formatted.replacen("-required-", "**[required]**", 1)
    } else {
        formatted
    }
}

/// Strips leading whitespace.
pub fn remove_leading(line: &str) -> &str {
    line.trim_start()
}
