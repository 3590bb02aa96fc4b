//! Filename derivation.
//!
//! Pure functions that turn an original file token plus (optional) session
//! metadata into the final, human-readable, storage-safe filename. The clock
//! reading is injected so derivation stays deterministic under test; use
//! [`derive_now`] at the call site that wants the wall clock.

use chrono::{DateTime, Local};

use crate::models::{ImageKind, SessionRecord};

/// Extension assigned when the original token has no recognizable one.
pub const DEFAULT_EXTENSION: &str = ".png";

/// Literal fallback used when a payload yields no file token at all, or when
/// derivation would otherwise hand the uploader an empty name.
pub const FALLBACK_FILENAME: &str = "untitled.png";

/// Placeholder user name when the session row carries no usable display name.
const UNKNOWN_USER: &str = "UnknownUser";

/// Placeholder style when the session row carries no usable style tag.
const DEFAULT_STYLE: &str = "General";

/// Characters forbidden by common filesystems; replaced, never rejected.
const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// The structural parts of a derived filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFilename {
    pub base: String,
    /// Always non-empty, always carries its leading dot.
    pub extension: String,
    pub kind: ImageKind,
}

impl DerivedFilename {
    /// Split a token at its last period. Tokens with no period, a leading
    /// period, or a trailing period keep the whole token as base and take
    /// [`DEFAULT_EXTENSION`].
    pub fn from_token(token: &str) -> Self {
        let (base, extension) = match token.rfind('.') {
            Some(idx) if idx > 0 && idx < token.len() - 1 => {
                (token[..idx].to_string(), token[idx..].to_string())
            }
            _ => (token.to_string(), DEFAULT_EXTENSION.to_string()),
        };
        let kind = ImageKind::classify(&base);
        Self {
            base,
            extension,
            kind,
        }
    }
}

/// Extract the original file token from an event payload: the last non-empty
/// forward-slash segment. Returns `None` for payloads that are all slashes or
/// empty.
pub fn original_token(payload: &str) -> Option<&str> {
    payload.split('/').rev().find(|segment| !segment.is_empty())
}

/// Sanitize a session display name into something safe to embed in a filename.
///
/// Trims, maps any character outside alphanumerics, `_`, `.`, `-` and spaces
/// to `_`, collapses whitespace runs to a single space, and capitalizes the
/// first letter of each word. An empty result falls back to a placeholder.
pub fn sanitize_display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.trim().chars() {
        if c.is_whitespace() {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            at_word_start = true;
            continue;
        }
        let c = if at_word_start {
            c.to_uppercase().next().unwrap_or(c)
        } else {
            c
        };
        if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' {
            out.push(c);
        } else {
            out.push('_');
        }
        at_word_start = false;
    }
    let out = out.trim().to_string();
    if out.is_empty() {
        UNKNOWN_USER.to_string()
    } else {
        out
    }
}

/// Sanitize a style tag: underscores become spaces, each word is capitalized,
/// and anything still unsafe becomes `_`. Blank input falls back to "General".
pub fn sanitize_style_tag(tag: &str) -> String {
    let spaced = tag.trim().replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if c.is_whitespace() {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            at_word_start = true;
            continue;
        }
        let c = if at_word_start {
            c.to_uppercase().next().unwrap_or(c)
        } else {
            c
        };
        if c.is_alphanumeric() || c == '.' || c == '-' {
            out.push(c);
        } else {
            out.push('_');
        }
        at_word_start = false;
    }
    let out = out.trim().to_string();
    if out.is_empty() {
        DEFAULT_STYLE.to_string()
    } else {
        out
    }
}

/// Timestamp token for derived names: local clock, zero-padded, 24-hour.
pub fn timestamp_token(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d_%H%M").to_string()
}

/// Final safety pass over an assembled name: forbidden characters become `_`,
/// and runs of `_`, `-` or spaces collapse to a single occurrence.
fn finalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if FORBIDDEN.contains(&c) { '_' } else { c };
        match c {
            '_' if out.ends_with('_') => {}
            '-' if out.ends_with('-') => {}
            ' ' if out.ends_with(' ') => {}
            _ => out.push(c),
        }
    }
    out
}

/// Derive the final filename for one event.
///
/// With a usable session this assembles
/// `{user} - {style} - {kind} - {timestamp}{extension}`; without one (no
/// session row, or no usable display name) the original token is returned
/// unchanged, extension and all. Exactly one of the two shapes is produced.
pub fn derive(original_token: &str, session: Option<&SessionRecord>, at: DateTime<Local>) -> String {
    let record = match session {
        Some(record) => record,
        None => return original_token.to_string(),
    };
    let display_name = match record.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => return original_token.to_string(),
    };

    let parts = DerivedFilename::from_token(original_token);
    let user = sanitize_display_name(display_name);
    let style = record
        .style_tag
        .as_deref()
        .map(sanitize_style_tag)
        .unwrap_or_else(|| DEFAULT_STYLE.to_string());

    let assembled = format!(
        "{} - {} - {} - {}{}",
        user,
        style,
        parts.kind,
        timestamp_token(at),
        parts.extension
    );
    finalize(&assembled)
}

/// [`derive`] against the wall clock.
pub fn derive_now(original_token: &str, session: Option<&SessionRecord>) -> String {
    derive(original_token, session, Local::now())
}
