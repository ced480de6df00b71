//! Syntactic triviality check for sub-expression caching.
//!
//! [`CodegenContext::cache`](crate::CodegenContext::cache) passes trivial
//! expressions through unchanged instead of binding a temporary. "Trivial"
//! is a documented heuristic, not a parser: the accepted shapes are a bare
//! identifier, an identifier with one trailing array index, and an
//! integer/decimal literal. Anything else (calls, arithmetic, swizzles) is
//! treated as non-trivial and gets materialized.

/// Whether `text` is cheap and side-effect free to repeat verbatim.
pub fn is_trivial(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    is_identifier_shape(bytes) || is_number_shape(bytes)
}

/// `ident` or `ident[ident]` or `ident[123]`.
fn is_identifier_shape(bytes: &[u8]) -> bool {
    let ident_end = match scan_identifier(bytes, 0) {
        Some(end) => end,
        None => return false,
    };
    if ident_end == bytes.len() {
        return true;
    }
    if bytes[ident_end] != b'[' || bytes[bytes.len() - 1] != b']' {
        return false;
    }
    let inner = &bytes[ident_end + 1..bytes.len() - 1];
    !inner.is_empty()
        && (scan_identifier(inner, 0) == Some(inner.len())
            || inner.iter().all(u8::is_ascii_digit))
}

/// Integer or decimal literal, optional leading minus.
fn is_number_shape(bytes: &[u8]) -> bool {
    let mut i = 0;
    if bytes[0] == b'-' {
        i = 1;
    }
    let mut digits = 0;
    let mut dots = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
        i += 1;
    }
    digits > 0 && dots <= 1
}

/// Scan an identifier starting at `from`; returns the exclusive end index.
fn scan_identifier(bytes: &[u8], from: usize) -> Option<usize> {
    let first = *bytes.get(from)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut i = from + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    Some(i)
}
