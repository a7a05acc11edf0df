use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Display width of a string in terminal columns (CJK and emoji count as 2).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Remove terminal control characters and ANSI escape sequences.
///
/// Headlines and article bodies come from third parties; printing them raw
/// would let them move the cursor, retitle the terminal, and so on.
/// Tab, newline and carriage return are kept.
///
/// Returns `Cow::Borrowed` when there is nothing to strip.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_stripped(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            // CSI: parameters until a final byte in 0x40..=0x7E
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: until BEL or ST (ESC \)
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    c == '\x7f' || (c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r'))
}

/// Collapse a possibly multi-line string into one line and cut it to
/// `max_width` columns, ending in `...` when something was cut.
///
/// Used for numbered list entries, which must stay one row each.
pub fn single_line(s: &str, max_width: usize) -> String {
    let clean = strip_control_chars(s);
    let flat = clean.split_whitespace().collect::<Vec<_>>().join(" ");

    if display_width(&flat) <= max_width {
        return flat;
    }
    if max_width <= ELLIPSIS.len() {
        return take_width(&flat, max_width).to_string();
    }

    let kept = take_width(&flat, max_width - ELLIPSIS.len());
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Longest prefix of `s` that fits in `width` columns.
fn take_width(s: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            return &s[..idx];
        }
        used += w;
    }
    s
}
