//! Placeholder translation for engines that do not accept `$N`.

use std::borrow::Cow;

mod scanner;

use scanner::{
    State, is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    scan_digits, try_start_dollar_quote,
};

/// Rewrite ordinal `$N` placeholders as `SQLite`-style `?N`.
///
/// Quoted strings, comments and dollar-quoted blocks are skipped by a small state
/// machine; it is not a SQL parser. Returns a borrowed `Cow` when nothing changed.
#[must_use]
pub fn to_sqlite_placeholders(sql: &str) -> Cow<'_, str> {
    let mut out: Option<Vec<u8>> = None;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        let mut replaced = false;
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    if let Some(buf) = out.as_mut() {
                        buf.push(b);
                    }
                    idx += 1;
                    state = State::BlockComment;
                }
                b'$' => {
                    if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                        let buf = out.get_or_insert_with(|| bytes[..idx].to_vec());
                        buf.push(b'?');
                        buf.extend_from_slice(digits);
                        idx = digits_end - 1;
                        replaced = true;
                    } else if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        if let Some(buf) = out.as_mut() {
                            buf.extend_from_slice(&bytes[idx..advance]);
                        }
                        state = State::DollarQuoted(tag);
                        idx = advance;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        if let Some(buf) = out.as_mut() {
                            buf.push(b);
                        }
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        if let Some(buf) = out.as_mut() {
                            buf.push(b);
                        }
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            // SQLite block comments do not nest: the first `*/` closes.
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    if let Some(buf) = out.as_mut() {
                        buf.push(b);
                    }
                    idx += 1;
                    state = State::Normal;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    let tag_len = tag.len();
                    if let Some(buf) = out.as_mut() {
                        buf.extend_from_slice(&bytes[idx..idx + tag_len + 1]);
                    }
                    state = State::Normal;
                    idx += tag_len + 1;
                }
            }
        }

        if let Some(buf) = out.as_mut()
            && !replaced
            && idx < bytes.len()
        {
            buf.push(bytes[idx]);
        }

        idx += 1;
    }

    match out {
        // Only ASCII bytes were substituted, so the buffer is still valid UTF-8.
        Some(buf) => String::from_utf8(buf).map_or(Cow::Borrowed(sql), Cow::Owned),
        None => Cow::Borrowed(sql),
    }
}
