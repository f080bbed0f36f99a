#[derive(Clone)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
    DollarQuoted(String),
}

pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &[u8])> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        Some((idx, &bytes[start..idx]))
    }
}

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes[idx..].starts_with(b"--")
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes[idx..].starts_with(b"/*")
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes[idx..].starts_with(b"*/")
}

/// `$tag$` opening a dollar-quoted block at `start`: the tag and the index of its closing `$`.
pub(super) fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let rest = bytes.get(start + 1..)?;
    let len = rest
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))?;
    if rest[len] != b'$' {
        return None;
    }
    let tag = String::from_utf8(rest[..len].to_vec()).ok()?;
    Some((tag, start + 1 + len))
}

pub(super) fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    bytes[idx + 1..].starts_with(tag.as_bytes()) && bytes.get(idx + 1 + tag.len()) == Some(&b'$')
}
