/// Parses `s` as an index if it is written in canonical decimal form. Leading zeros, signs and
/// whitespace make the string a name instead.
pub fn canonical_index(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }

    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }

    s.parse().ok()
}
