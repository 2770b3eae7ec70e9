//! Balanced-delimiter scanner for the résumé markup dialect.
//!
//! Arguments are read by tracking brace depth explicitly, so an argument such as
//! `{Built \textbf{fast} parsers}` comes back whole instead of being cut at the first `}`.
//! Escaped braces (`\{`, `\}`) never change the depth.
//!
//! All positions are byte offsets. Every delimiter the scanner looks at is ASCII, so
//! slicing at those offsets is always on a char boundary.

use thiserror::Error;

/// A recognized macro whose arguments could not be read.
/// Always recovered by the caller (the text degrades to a plain line).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    #[error("malformed \\{command}: {reason}")]
    Malformed { command: String, reason: String },
}

/// A `\command` occurrence in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    /// Command name without the backslash. Control symbols (`\\`, `\&`) are one char long.
    pub name: &'a str,
    /// Offset of the backslash.
    pub start: usize,
    /// Offset just past the name (and a trailing `*`, if starred).
    pub end: usize,
    pub starred: bool,
}

/// Finds the next command at or after `from`.
pub fn next_command(src: &str, from: usize) -> Option<Command<'_>> {
    let bytes = src.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            return Some(command_at(src, i));
        }
        i += 1;
    }
    None
}

/// Reads the command starting at `start`, which must point at a backslash.
pub fn command_at(src: &str, start: usize) -> Command<'_> {
    let bytes = src.as_bytes();
    let name_start = start + 1;
    let mut end = name_start;
    while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }

    if end == name_start {
        // Control symbol: a single non-letter character (possibly multibyte) or bare `\` at EOF.
        let symbol_len = src[name_start..].chars().next().map_or(0, char::len_utf8);
        return Command {
            name: &src[name_start..name_start + symbol_len],
            start,
            end: name_start + symbol_len,
            starred: false,
        };
    }

    let name = &src[name_start..end];
    let starred = bytes.get(end) == Some(&b'*');
    Command {
        name,
        start,
        end: if starred { end + 1 } else { end },
        starred,
    }
}

/// Skips spaces, tabs and newlines.
pub fn skip_whitespace(src: &str, pos: usize) -> usize {
    let bytes = src.as_bytes();
    let mut i = pos;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Reads one `{...}` group starting at `pos` (leading whitespace allowed).
///
/// Returns the inner text and the offset just past the closing brace.
pub fn read_group<'a>(src: &'a str, pos: usize, command: &str) -> Result<(&'a str, usize), MarkupError> {
    let bytes = src.as_bytes();
    let open = skip_whitespace(src, pos);
    if bytes.get(open) != Some(&b'{') {
        return Err(MarkupError::Malformed {
            command: command.to_string(),
            reason: "expected '{'".to_string(),
        });
    }

    let mut depth = 1usize;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                // Skip the escaped byte; a multibyte char after `\` is harmless here
                // because none of its continuation bytes are ASCII delimiters.
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&src[open + 1..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }

    Err(MarkupError::Malformed {
        command: command.to_string(),
        reason: "unbalanced braces".to_string(),
    })
}

/// Skips a `[...]` optional argument if one follows `pos`. Returns the new offset.
pub fn skip_optional(src: &str, pos: usize) -> usize {
    let bytes = src.as_bytes();
    let open = skip_whitespace(src, pos);
    if bytes.get(open) != Some(&b'[') {
        return pos;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    pos
}

/// Reads exactly `count` brace groups after `pos`.
pub fn read_args<'a>(
    src: &'a str,
    pos: usize,
    count: usize,
    command: &str,
) -> Result<(Vec<&'a str>, usize), MarkupError> {
    let mut args = Vec::with_capacity(count);
    let mut cursor = pos;
    for n in 0..count {
        let (arg, next) = read_group(src, cursor, command).map_err(|e| match e {
            MarkupError::Malformed { command, reason } => MarkupError::Malformed {
                command,
                reason: format!("argument {} of {count}: {reason}", n + 1),
            },
        })?;
        args.push(arg);
        cursor = next;
    }
    Ok((args, cursor))
}

/// Reads brace groups greedily until the next non-group token. Used for unknown commands.
pub fn read_trailing_groups(src: &str, pos: usize) -> (Vec<&str>, usize) {
    let mut groups = Vec::new();
    let mut cursor = skip_optional(src, pos);
    while let Ok((arg, next)) = read_group(src, cursor, "") {
        groups.push(arg);
        cursor = next;
    }
    (groups, cursor)
}

/// Removes `%` comments up to the end of the line. `\%` is kept.
pub fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for line in src.split_inclusive('\n') {
        let bytes = line.as_bytes();
        let mut cut = None;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b'%' => {
                    cut = Some(i);
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        match cut {
            Some(at) => {
                out.push_str(&line[..at]);
                if line.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str(line),
        }
    }
    out
}
