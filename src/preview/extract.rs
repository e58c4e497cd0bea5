//! Fragment extraction from the accumulated response text.
//!
//! The response is re-extracted after every increment, so the rules must
//! accept partial input: a closed fence wins, an open fence yields everything
//! after it, and fence-less markup or plain text is taken whole.

use crate::types::ContentKind;
use regex::Regex;
use std::sync::OnceLock;

/// Language tags accepted right after an opening fence.
pub const FENCE_TAGS: [&str; 6] = ["html", "css", "jsx", "tsx", "javascript", "typescript"];

fn complete_fence() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?s)```(?:{})?(.*?)```", FENCE_TAGS.join("|")))
            .expect("complete fence pattern is valid")
    })
}

fn open_fence() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?s)```(?:{})?(.*)", FENCE_TAGS.join("|")))
            .expect("open fence pattern is valid")
    })
}

/// Returns the renderable fragment of `text`, or `None` when there is no
/// content at all.
pub fn extract_fragment(text: &str, kind: ContentKind) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    if let Some(interior) = complete_fence().captures(text).and_then(|c| c.get(1)) {
        return Some(interior.as_str().trim().to_string());
    }

    if let Some(rest) = open_fence().captures(text).and_then(|c| c.get(1)) {
        return Some(rest.as_str().trim().to_string());
    }

    let trimmed = text.trim();
    if kind.is_markup_like() && trimmed.starts_with('<') {
        return Some(trimmed.to_string());
    }

    Some(trimmed.to_string())
}
