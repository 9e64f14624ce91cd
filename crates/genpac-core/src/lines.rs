//! Line splitting for rule sources
//!
//! Rule files come from many editors and platforms, so lines are split on the
//! full Unicode line-boundary set (UTS #18 RL1.6): CRLF, LF, CR, NEL, LS, PS.

const NEL: char = '\u{0085}';
const LINE_SEPARATOR: char = '\u{2028}';
const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// Characters trimmed from both ends of every rule line.
const TRIM_CHARS: &[char] = &['\'', '"'];

/// Split text into logical lines.
///
/// Empty lines are kept; `"a\n\nb"` yields three lines. A trailing line
/// terminator does not produce a trailing empty line, and empty input yields
/// no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        let terminator_len = match ch {
            '\r' => match chars.peek() {
                Some(&(_, '\n')) => {
                    chars.next();
                    2
                }
                _ => 1,
            },
            '\n' => 1,
            NEL | LINE_SEPARATOR | PARAGRAPH_SEPARATOR => ch.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..i]);
        start = i + terminator_len;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

/// Trim whitespace and stray quote characters around a rule line.
pub fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || TRIM_CHARS.contains(&c))
}

/// True for lines every compiler ignores: blank lines and `!` comments.
pub fn is_ignored(line: &str) -> bool {
    line.is_empty() || line.starts_with('!')
}
