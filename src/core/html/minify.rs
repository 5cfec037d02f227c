//! Script minification profiles.
//!
//! Production scripts have assertion and logging statements stripped before
//! minification; debug scripts keep them. Stripping is a lexical pass over
//! guarded statements (`assert && assert( ... );`), the same way the code
//! base writes them. Only guards that open a statement are removed; a guard
//! inside an expression (`return assert && ok;`) is left alone.

use anyhow::{Result, anyhow};
use minify_js::{Session, TopLevelMode, minify};

const ASSERTION_GUARDS: &[&str] = &["assert", "assertSlow"];
const LOGGING_GUARDS: &[&str] = &["sceneryLog", "phet.log"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Run the minifier at all.
    pub minify: bool,
    pub strip_assertions: bool,
    pub strip_logging: bool,
}

impl MinifyOptions {
    pub fn production(minify: bool) -> Self {
        Self {
            minify,
            strip_assertions: true,
            strip_logging: true,
        }
    }

    pub fn debug(minify: bool) -> Self {
        Self {
            minify,
            strip_assertions: false,
            strip_logging: false,
        }
    }
}

pub fn minify_script(source: &str, options: &MinifyOptions) -> Result<String> {
    let mut guards: Vec<&str> = Vec::new();
    if options.strip_assertions {
        guards.extend(ASSERTION_GUARDS);
    }
    if options.strip_logging {
        guards.extend(LOGGING_GUARDS);
    }

    let stripped = if guards.is_empty() {
        source.to_string()
    } else {
        strip_guarded_statements(source, &guards)
    };

    if !options.minify {
        return Ok(stripped);
    }

    let session = Session::new();
    let mut output = Vec::new();
    minify(&session, TopLevelMode::Global, stripped.as_bytes(), &mut output)
        .map_err(|err| anyhow!("Failed to minify script: {:?}", err))?;
    Ok(String::from_utf8(output)?)
}

/// Remove every statement of the form `<guard> && ...;`.
///
/// A guard opens a statement when it is the first token of the input or
/// follows `;`, `{` or `}` (whitespace and comments aside). The statement ends
/// at the first `;` outside brackets, at a line break outside brackets that
/// does not leave an operator dangling, or just before a `}` that closes the
/// enclosing block. String, comment and regex literals are skipped whole.
pub fn strip_guarded_statements(source: &str, guards: &[&str]) -> String {
    let bytes = source.as_bytes();
    let mut output = String::with_capacity(source.len());
    let mut copied_to = 0;
    let mut previous: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if let Some(end) = comment_end(bytes, i) {
            i = end;
            continue;
        }

        if opens_statement(previous)
            && let Some(guard_len) = guard_at(&bytes[i..], guards)
        {
            let end = statement_end(bytes, i + guard_len);
            output.push_str(&source[copied_to..i]);
            copied_to = end;
            previous = Some(b';');
            i = end;
            continue;
        }

        if let Some(end) = literal_end(bytes, i, previous) {
            previous = Some(bytes[end - 1]);
            i = end;
            continue;
        }

        previous = Some(byte);
        i += 1;
    }

    output.push_str(&source[copied_to..]);
    output
}

fn opens_statement(previous: Option<u8>) -> bool {
    matches!(previous, None | Some(b';' | b'{' | b'}'))
}

/// Whether the token after `previous` must be an operand, so a `/` there
/// starts a regex and a line break there does not end the expression.
fn expects_operand(previous: Option<u8>) -> bool {
    match previous {
        None => true,
        Some(byte) => b"(,=:[!&|?{};+-*%<>~^".contains(&byte),
    }
}

/// Length of `<guard> &&` at the start of `text`, if present.
fn guard_at(text: &[u8], guards: &[&str]) -> Option<usize> {
    guards.iter().find_map(|guard| {
        let rest = text.strip_prefix(guard.as_bytes())?;
        let spaces = rest.iter().take_while(|b| matches!(b, b' ' | b'\t')).count();
        rest[spaces..]
            .starts_with(b"&&")
            .then_some(guard.len() + spaces + 2)
    })
}

fn statement_end(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 0usize;
    let mut previous = Some(b'&');
    while i < bytes.len() {
        if let Some(end) = comment_end(bytes, i) {
            i = end;
            continue;
        }
        if let Some(end) = literal_end(bytes, i, previous) {
            previous = Some(bytes[end - 1]);
            i = end;
            continue;
        }

        let byte = bytes[i];
        match byte {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'}' => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            b';' if depth == 0 => return i + 1,
            b'\n' if depth == 0 && !expects_operand(previous) => return i,
            _ => {}
        }
        if !byte.is_ascii_whitespace() {
            previous = Some(byte);
        }
        i += 1;
    }
    i
}

/// Index just past a `//` or `/* */` comment starting at `start`.
///
/// A line comment stops before its line break.
fn comment_end(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes[start] != b'/' {
        return None;
    }
    match bytes.get(start + 1)? {
        b'/' => Some(
            bytes[start..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |offset| start + offset),
        ),
        b'*' => Some(
            bytes[start + 2..]
                .windows(2)
                .position(|pair| pair == b"*/")
                .map_or(bytes.len(), |offset| start + 2 + offset + 2),
        ),
        _ => None,
    }
}

/// Index just past a string or regex literal starting at `start`.
fn literal_end(bytes: &[u8], start: usize, previous: Option<u8>) -> Option<usize> {
    match bytes[start] {
        quote @ (b'\'' | b'"' | b'`') => Some(skip_string(bytes, start, quote)),
        b'/' if expects_operand(previous) => skip_regex(bytes, start),
        _ => None,
    }
}

/// Index just past the string literal opened at `start`.
fn skip_string(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index just past the regex literal and flags opened at `start`; `None`
/// when no closing `/` appears on the same line.
fn skip_regex(bytes: &[u8], start: usize) -> Option<usize> {
    let mut in_class = false;
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' => return None,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                let flags = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphabetic())
                    .count();
                return Some(i + 1 + flags);
            }
            _ => {}
        }
        i += 1;
    }
    None
}
