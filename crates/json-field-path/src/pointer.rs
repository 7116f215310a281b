//! JSON Pointer forms that validators report.
//!
//! Two kinds reach the editor. An instance pointer (`/a/b`) addresses a node
//! of the value directly. A structural pointer (`/properties/a/properties/b`)
//! addresses the schema node that governs it; every other token must be the
//! `properties` wrapper. Both parse into a value [`Path`].

use crate::{Path, PathError};

/// Wrapper token between a schema node and its children.
pub const PROPERTIES: &str = "properties";

/// Parses an instance pointer into a value path.
///
/// `~0` and `~1` are the only escapes; any other `~` sequence is rejected.
pub fn parse_value_pointer(pointer: &str) -> Result<Path, PathError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(body) = pointer.strip_prefix('/') else {
        return Err(PathError::NotAbsolute);
    };
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            '/' => keys.push(std::mem::take(&mut current)),
            '~' => match chars.next() {
                Some((_, '0')) => current.push('~'),
                Some((_, '1')) => current.push('/'),
                _ => {
                    return Err(PathError::BadPointerEscape {
                        position: offset + 1,
                    })
                }
            },
            other => current.push(other),
        }
    }
    keys.push(current);
    Ok(keys)
}

/// Parses a structural pointer into the value path it governs.
///
/// A missing leading `/` is tolerated, since some validators report
/// locations relative to the root.
pub fn parse_structural_pointer(pointer: &str) -> Result<Path, PathError> {
    let tokens = if pointer.is_empty() || pointer.starts_with('/') {
        parse_value_pointer(pointer)?
    } else {
        parse_value_pointer(&format!("/{pointer}"))?
    };
    if tokens.len() % 2 != 0 || tokens.iter().step_by(2).any(|t| t != PROPERTIES) {
        return Err(PathError::NotStructural {
            pointer: pointer.to_string(),
        });
    }
    Ok(tokens.into_iter().skip(1).step_by(2).collect())
}

/// Formats a value path as a structural pointer.
pub fn format_structural_pointer<S: AsRef<str>>(value_path: &[S]) -> String {
    let mut out = String::new();
    for key in value_path {
        out.push('/');
        out.push_str(PROPERTIES);
        out.push('/');
        for ch in key.as_ref().chars() {
            match ch {
                '~' => out.push_str("~0"),
                '/' => out.push_str("~1"),
                other => out.push(other),
            }
        }
    }
    out
}
