// Truncate a &str to a byte budget at a char boundary (prefix)
#[inline]
pub fn take_bytes_at_char_boundary(s: &str, maxb: usize) -> &str {
    if s.len() <= maxb {
        return s;
    }
    let mut last_ok = 0;
    for (i, ch) in s.char_indices() {
        let nb = i + ch.len_utf8();
        if nb > maxb {
            break;
        }
        last_ok = nb;
    }
    &s[..last_ok]
}

/// Byte length of the longest common prefix of `a` and `b`, compared char by char.
///
/// The returned length is always a char boundary in both strings.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(ch, _)| ch.len_utf8())
        .sum()
}

/// Byte length of the longest common suffix of `a` and `b`, compared char by char
/// from the end and never exceeding `max_bytes`.
///
/// The cap keeps a suffix from overlapping a prefix the caller already consumed.
pub fn common_suffix_len(a: &str, b: &str, max_bytes: usize) -> usize {
    let mut len = 0usize;
    for (x, y) in a.chars().rev().zip(b.chars().rev()) {
        if x != y || len + x.len_utf8() > max_bytes {
            break;
        }
        len += x.len_utf8();
    }
    len
}

/// Shorten `s` for diagnostics, appending a marker with the number of bytes dropped.
pub fn preview(s: &str, maxb: usize) -> String {
    let head = take_bytes_at_char_boundary(s, maxb);
    if head.len() == s.len() {
        return s.to_string();
    }
    let omitted = s.len() - head.len();
    format!("{head}… [{omitted} more bytes]")
}
