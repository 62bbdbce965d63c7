//! BibTeX reader built on nom
//!
//! Handles:
//! - All entry types, delimited by braces or parentheses
//! - @string definitions (expanded into field values)
//! - @preamble declarations (kept for output)
//! - @comment blocks and free text between entries (skipped)
//! - Braced, quoted, numeric and macro field values, concatenated with #
//! - Nested braces in field values

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use super::entry::Entry;
use super::{Bibliography, BibtexError};

/// Month macros every BibTeX style predefines
const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Result of parsing one @ command
enum Command {
    Entry(Entry),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Parse a complete BibTeX document
pub(crate) fn parse_bibliography(input: &str) -> Result<Bibliography, BibtexError> {
    let mut bibliography = Bibliography::default();
    let mut macros: HashMap<String, String> = MONTH_MACROS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let mut remaining = input;

    while let Some(at) = remaining.find('@') {
        remaining = &remaining[at..];

        // Anything that is not `@name{` or `@name(` is free text, e.g. an email address
        let Some((body, command, close)) = command_header(remaining) else {
            remaining = &remaining[1..];
            continue;
        };

        let line = line_number(input, remaining);
        let (rest, parsed) =
            parse_command(body, command, close, &macros).map_err(|e| BibtexError::Syntax {
                line,
                message: describe(&e, command),
            })?;

        match parsed {
            Command::Entry(entry) => {
                if bibliography.get(&entry.key).is_some() {
                    return Err(BibtexError::DuplicateKey {
                        key: entry.key,
                        line,
                    });
                }
                bibliography.entries.push(entry);
            }
            Command::String(name, value) => {
                macros.insert(name.to_lowercase(), value);
            }
            Command::Preamble(text) => bibliography.preambles.push(text),
            Command::Comment => {}
        }

        remaining = rest;
    }

    Ok(bibliography)
}

fn line_number(input: &str, remaining: &str) -> usize {
    let offset = input.len() - remaining.len();
    input[..offset].matches('\n').count() + 1
}

fn describe(error: &nom::Err<nom::error::Error<&str>>, command: &str) -> String {
    match error {
        nom::Err::Incomplete(_) => format!("unexpected end of input in @{}", command),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let near: String = e.input.chars().take(20).collect();
            format!("malformed @{} near '{}'", command, near.trim_end())
        }
    }
}

/// Split `@name{` into the text after the opening delimiter, the command name
/// and the matching closing delimiter
fn command_header(input: &str) -> Option<(&str, &str, char)> {
    let (rest, name) = command_name(input).ok()?;
    let close = match rest.chars().next()? {
        '{' => '}',
        '(' => ')',
        _ => return None,
    };
    Some((&rest[1..], name, close))
}

fn command_name(input: &str) -> IResult<&str, &str> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, name) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;
    let (rest, _) = multispace0(rest)?;
    Ok((rest, name))
}

fn parse_command<'a>(
    input: &'a str,
    command: &str,
    close: char,
    macros: &HashMap<String, String>,
) -> IResult<&'a str, Command> {
    match command.to_lowercase().as_str() {
        "comment" => {
            let (rest, _) = skip_to_close(input, close)?;
            Ok((rest, Command::Comment))
        }
        "preamble" => {
            let (rest, _) = multispace0(input)?;
            let (rest, text) = parse_field_value(rest, macros)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char(close)(rest)?;
            Ok((rest, Command::Preamble(text)))
        }
        "string" => {
            let (rest, (name, value)) = parse_single_field(input, macros)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char(close)(rest)?;
            Ok((rest, Command::String(name, value)))
        }
        _ => {
            let (rest, entry) = parse_entry_body(input, command, close, macros)?;
            Ok((rest, Command::Entry(entry)))
        }
    }
}

/// Skip a comment body up to and including its closing delimiter
fn skip_to_close(input: &str, close: char) -> IResult<&str, ()> {
    if close == '}' {
        // The opening brace was consumed by the header
        let mut depth = 1usize;
        for (pos, c) in input.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((&input[pos + 1..], ()));
                    }
                }
                _ => {}
            }
        }
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    match input.find(close) {
        Some(pos) => Ok((&input[pos + 1..], ())),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

fn is_key_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '(' | ')' | '"' | '#' | '=')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-:.+/".contains(c)
}

/// Parse an entry body: `key, name = value, ... }`
fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    close: char,
    macros: &HashMap<String, String>,
) -> IResult<&'a str, Entry> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) = take_while1(is_key_char)(rest)?;
    let (rest, _) = multispace0(rest)?;

    let mut entry = Entry::new(entry_type, key);

    // An entry may close right after its key
    if let Some(rest) = rest.strip_prefix(close) {
        return Ok((rest, entry));
    }
    let (mut remaining, _) = char(',')(rest)?;

    loop {
        let (rest, _) = multispace0(remaining)?;

        if let Some(rest) = rest.strip_prefix(close) {
            return Ok((rest, entry));
        }

        let (rest, (name, value)) = parse_single_field(rest, macros)?;
        entry.set(&name, value);

        let (rest, _) = multispace0(rest)?;
        remaining = rest.strip_prefix(',').unwrap_or(rest);
        if remaining.len() == rest.len() && !rest.starts_with(close) {
            // Neither a separator nor the end of the entry
            return Err(nom::Err::Error(nom::error::Error::new(
                rest,
                nom::error::ErrorKind::Char,
            )));
        }
    }
}

/// Parse a single field (name = value)
fn parse_single_field<'a>(
    input: &'a str,
    macros: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, name) = take_while1(is_name_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, macros)?;

    Ok((rest, (name.to_string(), value)))
}

/// Parse a field value (braced, quoted, number, or macro reference), with # concatenation
fn parse_field_value<'a>(
    input: &'a str,
    macros: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            map(parse_braced_content, |s: &str| s[1..s.len() - 1].to_string()),
            map(parse_quoted_content, str::to_string),
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(take_while1(is_name_char), |s: &str| {
                match macros.get(&s.to_lowercase()) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::warn!("Warning - undefined BibTeX macro '{}' kept verbatim", s);
                        s.to_string()
                    }
                }
            }),
        ))(rest)?;

        result.push_str(&part);
        remaining = rest;

        let (rest, _) = multispace0(remaining)?;
        if let Some(stripped) = rest.strip_prefix('#') {
            remaining = stripped;
        } else {
            return Ok((rest, result));
        }
    }
}

/// Parse braced content including nested braces; returns the text with its outer braces
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0;
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => {
                // Skip escaped character
                pos += 1;
            }
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse a quoted value "content"; returns the text between the quotes
fn parse_quoted_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let bytes = input.as_bytes();
    let mut pos = 1;
    let mut brace_depth = 0i32;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if brace_depth == 0 => {
                return Ok((&input[pos + 1..], &input[1..pos]));
            }
            b'{' => brace_depth += 1,
            b'}' => brace_depth -= 1,
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
