use unicode_width::UnicodeWidthChar;

pub fn char_display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_display_width).sum()
}

pub fn clamp_to_char_boundary_left(input: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(input.len());
    while cursor > 0 && !input.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Soft-wraps `input` at `width` columns, honouring explicit newlines.
///
/// Returns the wrapped rows and the (row, column) of `cursor_byte`.
fn wrap_with_cursor(input: &str, width: usize, cursor_byte: usize) -> (Vec<String>, (usize, usize)) {
    let width = width.max(1);
    let cursor_byte = clamp_to_char_boundary_left(input, cursor_byte);
    let mut rows = vec![String::new()];
    let mut col = 0usize;
    let mut cursor = None;

    for (idx, ch) in input.char_indices() {
        if idx == cursor_byte {
            cursor = Some((rows.len() - 1, col));
        }
        match ch {
            '\r' => {}
            '\n' => {
                rows.push(String::new());
                col = 0;
            }
            _ => {
                let ch_width = char_display_width(ch);
                if col > 0 && col + ch_width > width {
                    rows.push(String::new());
                    col = 0;
                    if idx == cursor_byte {
                        cursor = Some((rows.len() - 1, 0));
                    }
                }
                if let Some(row) = rows.last_mut() {
                    row.push(ch);
                }
                col += ch_width;
            }
        }
    }

    let cursor = cursor.unwrap_or_else(|| {
        if col >= width {
            (rows.len(), 0)
        } else {
            (rows.len() - 1, col)
        }
    });
    (rows, cursor)
}

pub fn wrap_input_lines(input: &str, width: usize) -> Vec<String> {
    wrap_with_cursor(input, width, input.len()).0
}

pub fn cursor_row_col(input: &str, cursor_byte: usize, width: usize) -> (usize, usize) {
    wrap_with_cursor(input, width, cursor_byte).1
}

pub fn truncate_to_display_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = char_display_width(ch);
        if used > 0 && used + ch_width > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}
