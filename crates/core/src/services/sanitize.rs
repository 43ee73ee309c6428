/// Strip the wrapper lines a model puts around a code reply.
///
/// Purely positional: with two or more lines the first and last are dropped
/// and the rest joined with `\n`; shorter input comes back unchanged. There is
/// no fence detection, so a reply without fences still loses its first and
/// last line.
pub fn remove_markers(text: &str) -> String {
    let lines = split_lines(text);
    if lines.len() >= 2 {
        return lines[1..lines.len() - 1].join("\n");
    }
    text.to_string()
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split on every Unicode line boundary, `\r\n` counting as one. A trailing
/// break does not produce an empty final line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..idx]);
        let mut end = idx + c.len_utf8();
        if c == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                end = next + 1;
            }
        }
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
