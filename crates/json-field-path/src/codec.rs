//! Double-dot path encoding.
//!
//! Keys are joined with `..`. Inside a key, `.` is written `/.` and the
//! escape character itself is written `//`, so an unescaped `.` can only ever
//! be half of a separator. An empty key is written `/0`; without it the
//! sequence `[""]` would collide with the empty sequence.
//!
//! Examples:
//! - `[] -> ""`
//! - `[""] -> "/0"`
//! - `["a", "b.c"] -> "a..b/.c"`
//! - `["x/y", ""] -> "x//y../0"`

use crate::PathError;

/// Two-character separator between encoded keys.
pub const SEPARATOR: &str = "..";

const ESCAPE: char = '/';
const DOT: char = '.';
const EMPTY_MARK: char = '0';

/// Encodes one key so it can be placed between separators.
pub fn encode_key(key: &str) -> String {
    if key.is_empty() {
        return format!("{ESCAPE}{EMPTY_MARK}");
    }
    if !key.contains(DOT) && !key.contains(ESCAPE) {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch == DOT || ch == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// Encodes a key sequence into its display string.
pub fn encode_path<S: AsRef<str>>(keys: &[S]) -> String {
    let mut out = String::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(&encode_key(key.as_ref()));
    }
    out
}

/// Decodes a display string back into its key sequence.
///
/// The empty string decodes to the empty sequence. A raw empty segment
/// (`"a.."`) is accepted as an empty key even though [`encode_path`] never
/// produces one.
pub fn decode_path(encoded: &str) -> Result<Vec<String>, PathError> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut chars = encoded.char_indices().peekable();
    while let Some((position, ch)) = chars.next() {
        match ch {
            ESCAPE => match chars.next() {
                Some((_, DOT)) => current.push(DOT),
                Some((_, ESCAPE)) => current.push(ESCAPE),
                Some((_, EMPTY_MARK)) => {}
                _ => return Err(PathError::UnbalancedEscape { position }),
            },
            DOT => match chars.next() {
                Some((_, DOT)) => keys.push(std::mem::take(&mut current)),
                _ => return Err(PathError::StraySeparator { position }),
            },
            other => current.push(other),
        }
    }
    keys.push(current);
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn encode_matrix() {
        assert_eq!(encode_path::<String>(&[]), "");
        assert_eq!(encode_path(&[""]), "/0");
        assert_eq!(encode_path(&["a"]), "a");
        assert_eq!(encode_path(&["a", "b"]), "a..b");
        assert_eq!(encode_path(&["a.b", "c"]), "a/.b..c");
        assert_eq!(encode_path(&["x/y", ""]), "x//y../0");
        assert_eq!(encode_path(&["."]), "/.");
    }

    #[test]
    fn decode_matrix() {
        assert_eq!(decode_path("").unwrap(), Vec::<String>::new());
        assert_eq!(decode_path("/0").unwrap(), path([""]));
        assert_eq!(decode_path("a..b").unwrap(), path(["a", "b"]));
        assert_eq!(decode_path("a/.b..c").unwrap(), path(["a.b", "c"]));
        assert_eq!(decode_path("x//y../0").unwrap(), path(["x/y", ""]));
        assert_eq!(decode_path("a..").unwrap(), path(["a", ""]));
    }

    #[test]
    fn key_ending_with_dot_stays_unambiguous() {
        let keys = path(["a.", "b"]);
        let encoded = encode_path(&keys);
        assert_eq!(encoded, "a/...b");
        assert_eq!(decode_path(&encoded).unwrap(), keys);
    }

    #[test]
    fn dangling_escape_is_rejected() {
        assert_eq!(
            decode_path("abc/"),
            Err(PathError::UnbalancedEscape { position: 3 })
        );
        assert_eq!(
            decode_path("a/x"),
            Err(PathError::UnbalancedEscape { position: 1 })
        );
    }

    #[test]
    fn lone_dot_is_rejected() {
        assert_eq!(
            decode_path("a.b"),
            Err(PathError::StraySeparator { position: 1 })
        );
        assert_eq!(
            decode_path("a...b"),
            Err(PathError::StraySeparator { position: 3 })
        );
    }
}
