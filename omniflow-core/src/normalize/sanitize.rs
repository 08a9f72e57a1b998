//! String repair steps applied to model output before JSON parsing.
//!
//! Each step is a pure function so it can be tested on its own; [`sanitize`]
//! runs them in order and is idempotent.

use std::sync::OnceLock;

use regex::Regex;

fn fenced_json_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)```json\s*(.*?)\s*```").expect("fenced json pattern is valid")
    })
}

fn fence_marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"`{3,}(?i:json)?").expect("fence pattern is valid"))
}

/// Interior of the first ```` ```json ```` block, or the whole input when
/// there is none.
pub fn extract_fenced_json(raw: &str) -> &str {
    fenced_json_pattern()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
}

/// Drops control characters other than newline, tab and carriage return.
pub fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

/// Removes every run of three or more backticks along with a trailing
/// `json` language tag.
pub fn strip_code_fences(input: &str) -> String {
    fence_marker_pattern().replace_all(input, "").into_owned()
}

/// Doubles each backslash that does not start a valid JSON escape sequence.
///
/// Input is scanned pairwise, so an already valid `\\` is kept as is and a
/// second pass leaves the output unchanged.
pub fn escape_stray_backslashes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        match chars.get(i + 1) {
            Some('u') if is_unicode_escape(&chars[i + 2..]) => {
                out.push('\\');
                out.push('u');
                i += 2;
            }
            Some(&next) if matches!(next, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {
                out.push('\\');
                out.push(next);
                i += 2;
            }
            _ => {
                out.push_str("\\\\");
                i += 1;
            }
        }
    }
    out
}

fn is_unicode_escape(rest: &[char]) -> bool {
    rest.len() >= 4 && rest[..4].iter().all(char::is_ascii_hexdigit)
}

/// Full sanitization: control characters, fence markers, stray backslashes,
/// then surrounding whitespace.
pub fn sanitize(input: &str) -> String {
    let cleaned = strip_control_chars(input);
    let cleaned = strip_code_fences(&cleaned);
    let cleaned = escape_stray_backslashes(&cleaned);
    cleaned.trim().to_string()
}
