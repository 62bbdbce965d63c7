//! BibTeX formatting module
//!
//! Converts entries back to BibTeX text.

use super::entry::Entry;
use super::Bibliography;

/// Format a whole bibliography: preambles first, then entries in order
pub(crate) fn format_bibliography(bibliography: &Bibliography) -> String {
    let mut result = String::new();

    for preamble in bibliography.preambles() {
        result.push_str(&format_preamble(preamble));
        result.push_str("\n\n");
    }

    for entry in bibliography.entries() {
        result.push_str(&format_entry(entry));
        result.push_str("\n\n");
    }

    let trimmed = result.trim_end().len();
    result.truncate(trimmed);
    result.push('\n');
    result
}

/// Format a single entry
pub fn format_entry(entry: &Entry) -> String {
    let mut result = String::new();

    result.push('@');
    result.push_str(&entry.entry_type);
    result.push('{');
    result.push_str(&entry.key);
    result.push(',');
    result.push('\n');

    for field in entry.fields() {
        result.push_str("    ");
        result.push_str(&field.name);
        result.push_str(" = ");
        result.push_str(&format_field_value(&field.value));
        result.push(',');
        result.push('\n');
    }

    result.push('}');
    result
}

/// Numbers go out bare, everything else brace-delimited so LaTeX markup survives
fn format_field_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }

    let mut result = String::with_capacity(value.len() + 2);
    result.push('{');
    result.push_str(value);
    result.push('}');
    result
}

fn format_preamble(text: &str) -> String {
    format!("@preamble{{{{{}}}}}", text)
}
