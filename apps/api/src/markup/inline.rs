//! Inline cleanup: turns a fragment of markup into display text.
//!
//! Emphasis wrappers keep their inner text, links become `text (url)`, escaped
//! specials are unescaped and layout-only commands disappear together with their
//! arguments. Unknown commands lose their name but keep the text of their brace
//! arguments, so nothing the author wrote is silently dropped.

use crate::markup::scanner::{command_at, read_group, read_trailing_groups, skip_optional};

/// Wrappers whose single argument is kept as-is (after cleanup).
const EMPHASIS: &[&str] = &[
    "textbf", "textit", "emph", "underline", "textsc", "texttt", "textrm", "textsf", "textmd",
    "textup", "textnormal", "mbox", "text", "uline",
];

/// Switches with no arguments that only change font state.
const SWITCHES: &[&str] = &[
    "Huge", "huge", "LARGE", "Large", "large", "normalsize", "small", "footnotesize",
    "scriptsize", "tiny", "bfseries", "itshape", "scshape", "mdseries", "upshape", "rmfamily",
    "sffamily", "ttfamily", "centering", "raggedright", "raggedleft", "noindent", "hfill",
    "vfill", "quad", "qquad", "maketitle", "titlerule", "clearpage", "newpage", "pagebreak",
    "fancyhf", "urlstyle",
];

/// Layout commands dropped together with their brace arguments.
const LAYOUT: &[&str] = &[
    "vspace", "hspace", "setlength", "addtolength", "begin", "end", "label", "usepackage",
    "documentclass", "pagestyle", "thispagestyle", "includegraphics", "color", "newcommand",
    "renewcommand", "titleformat", "titlespacing", "geometry", "hypersetup", "input",
    "phantom", "rule",
];

/// Cleans a markup fragment, keeping line breaks produced by `\\`, `\item`, `\newline`.
pub fn strip_inline(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut out = String::with_capacity(src.len());
    let mut i = 0;
    let mut plain_start = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                out.push_str(&src[plain_start..i]);
                i = expand_command(src, i, &mut out);
                plain_start = i;
            }
            b'{' | b'}' | b'$' => {
                out.push_str(&src[plain_start..i]);
                i += 1;
                plain_start = i;
            }
            b'~' => {
                out.push_str(&src[plain_start..i]);
                out.push(' ');
                i += 1;
                plain_start = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&src[plain_start..]);

    out.replace("---", "\u{2014}").replace("--", "\u{2013}")
}

/// Cleans a single field and collapses it onto one line.
pub fn clean_field(src: &str) -> String {
    collapse_spaces(&strip_inline(src))
}

/// Cleans a fragment and splits it into trimmed, non-empty display lines.
pub fn clean_lines(src: &str) -> Vec<String> {
    strip_inline(src)
        .lines()
        .map(collapse_spaces)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Expands the command at `start` into `out` and returns the offset after it.
fn expand_command(src: &str, start: usize, out: &mut String) -> usize {
    let cmd = command_at(src, start);
    let name = cmd.name;

    match name {
        "" | "-" | "/" => cmd.end,
        "\\" => {
            out.push('\n');
            skip_optional(src, cmd.end)
        }
        "&" | "%" | "$" | "#" | "_" | "{" | "}" => {
            out.push_str(name);
            cmd.end
        }
        "," | ";" | ":" | " " | "\n" => {
            out.push(' ');
            cmd.end
        }
        "item" | "newline" | "linebreak" | "par" => {
            out.push('\n');
            skip_optional(src, cmd.end)
        }
        "begin" => skip_environment_header(src, cmd.end),
        "href" => expand_href(src, cmd.end, out),
        "url" => match read_group(src, cmd.end, name) {
            Ok((url, next)) => {
                out.push_str(url.trim());
                next
            }
            Err(_) => cmd.end,
        },
        "textcolor" => {
            // \textcolor{color}{text}: keep only the text.
            let (groups, next) = read_trailing_groups(src, cmd.end);
            if let Some(text) = groups.last() {
                out.push_str(&strip_inline(text));
            }
            next
        }
        _ if EMPHASIS.contains(&name) => match read_group(src, cmd.end, name) {
            Ok((inner, next)) => {
                out.push_str(&strip_inline(inner));
                next
            }
            Err(_) => cmd.end,
        },
        _ if SWITCHES.contains(&name) => {
            out.push(' ');
            cmd.end
        }
        _ if LAYOUT.contains(&name) => read_trailing_groups(src, cmd.end).1,
        _ => {
            if let Some(symbol) = symbol_for(name) {
                out.push_str(symbol);
                // Symbol commands are often written with an empty group: `\textbackslash{}`.
                return match read_group(src, cmd.end, name) {
                    Ok(("", next)) => next,
                    _ => cmd.end,
                };
            }
            let (groups, next) = read_trailing_groups(src, cmd.end);
            let kept: Vec<String> = groups
                .iter()
                .map(|g| strip_inline(g))
                .filter(|g| !g.trim().is_empty())
                .collect();
            if !kept.is_empty() {
                out.push(' ');
                out.push_str(&kept.join(" "));
            }
            next
        }
    }
}

/// Skips `{env}` plus the width/column-spec arguments of tabular-like environments.
fn skip_environment_header(src: &str, pos: usize) -> usize {
    let Ok((env, mut next)) = read_group(src, pos, "begin") else {
        return pos;
    };
    let extra_groups = match env.trim() {
        "tabular*" | "tabularx" => 2,
        "tabular" | "array" | "minipage" | "multicols" => 1,
        _ => 0,
    };
    for _ in 0..extra_groups {
        next = skip_optional(src, next);
        if let Ok((_, after)) = read_group(src, next, "begin") {
            next = after;
        }
    }
    skip_optional(src, next)
}

fn expand_href(src: &str, pos: usize, out: &mut String) -> usize {
    let Ok((url, after_url)) = read_group(src, pos, "href") else {
        return pos;
    };
    let url = url.trim();
    match read_group(src, after_url, "href") {
        Ok((text, next)) => {
            let text = collapse_spaces(&strip_inline(text));
            if text.is_empty() || text == url || url.ends_with(&text) {
                out.push_str(&text_or(url, &text));
            } else {
                out.push_str(&format!("{text} ({url})"));
            }
            next
        }
        Err(_) => {
            out.push_str(url);
            after_url
        }
    }
}

fn text_or(url: &str, text: &str) -> String {
    if text.is_empty() {
        url.to_string()
    } else {
        text.to_string()
    }
}

fn symbol_for(name: &str) -> Option<&'static str> {
    Some(match name {
        "textasciitilde" => "~",
        "textbackslash" => "\\",
        "textasciicircum" => "^",
        "textbar" | "vert" | "mid" => "|",
        "cdot" | "textperiodcentered" => "\u{b7}",
        "textbullet" | "bullet" => "\u{2022}",
        "ldots" | "dots" | "textellipsis" => "...",
        "textendash" => "\u{2013}",
        "textemdash" => "\u{2014}",
        "LaTeX" => "LaTeX",
        "TeX" => "TeX",
        "times" => "x",
        "sim" => "~",
        "pm" => "\u{b1}",
        "textgreater" => ">",
        "textless" => "<",
        _ => return None,
    })
}
