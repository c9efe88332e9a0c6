//! Percent-encoding filters for path, query and fragment components.
//!
//! Every byte outside the allowed set is encoded as `%XX`. A `%` that already
//! starts a valid triplet is left alone, so filtering an encoded component
//! again is a no-op.

const SUB_DELIMS: &[u8] = b"!$&'()*+,;=";

#[inline]
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

#[inline]
fn is_path_char(b: u8) -> bool {
    is_unreserved(b) || SUB_DELIMS.contains(&b) || matches!(b, b':' | b'@' | b'/')
}

#[inline]
fn is_query_char(b: u8) -> bool {
    is_path_char(b) || b == b'?'
}

fn filter(input: &str, allowed: fn(u8) -> bool) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len());

    for (i, &b) in bytes.iter().enumerate() {
        if allowed(b) {
            out.push(b as char);
            continue;
        }

        let is_triplet = b == b'%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if is_triplet {
            out.push('%');
        } else {
            out.push('%');
            out.push(HEX[usize::from(b >> 4)] as char);
            out.push(HEX[usize::from(b & 0x0f)] as char);
        }
    }

    out
}

/// Encodes everything outside unreserved, sub-delims, `:`, `@` and `/`.
pub fn filter_path(path: &str) -> String {
    filter(path, is_path_char)
}

/// Like [`filter_path`], additionally allowing `?`.
pub fn filter_query_or_fragment(value: &str) -> String {
    filter(value, is_query_char)
}
