//! Inline emphasis resolution
//!
//! Asterisk markers are prefix-ambiguous: `***x***` also contains a `**x**`
//! and a `*x*`. Resolution is a fixed pipeline over [`INLINE_PATTERNS`],
//! evaluated in precedence order (bold-italic, bold, italic, code):
//!
//! 1. Build the clean text by stripping each family's markers in turn.
//! 2. Re-scan the raw text per family. An asterisk match is accepted
//!    only when the contiguous asterisk runs framing it hold exactly the
//!    family's delimiter count (6, 4 or 2).
//! 3. Locate the matched content in the clean text (first occurrence) and
//!    record a span there, unless it would overlap an earlier span.
//!
//! Unbalanced markers never match and stay in the text as literal
//! characters. Repeated content binds to its first occurrence in the clean
//! text, so identical words formatted differently can land on the wrong
//! span.

use super::blocks::{FormatKind, FormatSpan};
use regex::Regex;
use std::sync::LazyLock;

/// Inline marker families in precedence order
static INLINE_PATTERNS: LazyLock<[(FormatKind, Regex); 4]> = LazyLock::new(|| {
    [
        (FormatKind::BoldItalic, Regex::new(r"\*{3}([^*]+?)\*{3}").unwrap()),
        (FormatKind::Bold, Regex::new(r"\*{2}([^*]+?)\*{2}").unwrap()),
        (FormatKind::Italic, Regex::new(r"\*([^*]+?)\*").unwrap()),
        (FormatKind::Code, Regex::new(r"`([^`]+?)`").unwrap()),
    ]
});

/// Clean display text plus the format spans that apply to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedText {
    pub text: String,
    /// Non-overlapping spans, ordered by start offset
    pub spans: Vec<FormatSpan>,
}

/// Total asterisks that must frame a match of the given family
fn delimiter_count(kind: FormatKind) -> Option<usize> {
    match kind {
        FormatKind::BoldItalic => Some(6),
        FormatKind::Bold => Some(4),
        FormatKind::Italic => Some(2),
        FormatKind::Code => None,
    }
}

/// Resolve inline markers in one block's text
pub fn resolve_spans(raw: &str) -> ResolvedText {
    let text = clean_text(raw);
    let mut spans: Vec<FormatSpan> = Vec::new();

    for (kind, regex) in INLINE_PATTERNS.iter() {
        let mut pos = 0;
        while let Some(caps) = regex.captures_at(raw, pos) {
            let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
                break;
            };

            if let Some(expected) = delimiter_count(*kind) {
                let framing = framing_asterisks(raw, whole.start(), whole.end());
                if framing != expected {
                    log::debug!(
                        "Rejected {} candidate {:?}: {} framing asterisks",
                        kind,
                        whole.as_str(),
                        framing
                    );
                    // The closing marker may open the real match
                    pos = whole.start() + 1;
                    continue;
                }
            }
            pos = whole.end();

            let content = content.as_str();
            let Some(start) = text.find(content) else {
                log::debug!("No {} target for {:?} in clean text", kind, content);
                continue;
            };

            let span = FormatSpan {
                start,
                end: start + content.len(),
                kind: *kind,
            };
            if spans.iter().any(|existing| existing.overlaps(&span)) {
                log::debug!("Dropped overlapping {} span over {:?}", kind, content);
                continue;
            }

            log::debug!("Recorded {} span over {:?}", kind, content);
            spans.push(span);
        }
    }

    spans.sort_by_key(|span| span.start);
    ResolvedText { text, spans }
}

/// Strip every family's markers, higher precedence first
fn clean_text(raw: &str) -> String {
    let stripped = INLINE_PATTERNS
        .iter()
        .fold(raw.to_string(), |text, (_, regex)| {
            regex.replace_all(&text, "${1}").into_owned()
        });
    stripped.trim().to_string()
}

/// Count the asterisks in the contiguous runs around `[start, end)`
fn framing_asterisks(text: &str, start: usize, end: usize) -> usize {
    let bytes = text.as_bytes();

    let mut from = start;
    while from > 0 && bytes[from - 1] == b'*' {
        from -= 1;
    }
    let mut to = end;
    while to < bytes.len() && bytes[to] == b'*' {
        to += 1;
    }

    bytes[from..to].iter().filter(|&&b| b == b'*').count()
}
