//! Line-oriented markdown model
//!
//! This module turns a markdown text stream into the ephemeral blocks the
//! assembly driver consumes:
//! - [`CodeFence`] aggregates fenced code lines into a single code block
//! - [`classify_line`] maps every other line to a block kind
//! - [`resolve_spans`] strips inline emphasis markers and records format spans
//!
//! Only headings, bullet/numbered items, blockquotes, fenced code and plain
//! paragraphs are recognised. Everything else is emitted as body text.

mod blocks;
mod classifier;
mod fence;
mod spans;

pub use blocks::{Block, BlockKind, FormatKind, FormatSpan, HeadingLevel, MAX_HEADING_LEVEL};
pub use classifier::classify_line;
pub use fence::{CodeFence, FenceEvent};
pub use spans::{resolve_spans, ResolvedText};

/// Split markdown into blocks, in input order
///
/// Runs the fence aggregator and the line classifier over every line,
/// threading `level` through as the running heading level. Blank lines
/// outside fences produce nothing. An unterminated fence is flushed as a
/// final code block.
///
/// # Parameters
/// * `content` - The raw markdown text
/// * `level` - Running heading level, updated by every heading line
///
/// # Returns
/// * `Vec<Block>` - One block per heading, list item, quote, paragraph line or fence
pub fn blocks(content: &str, level: &mut HeadingLevel) -> Vec<Block> {
    let mut fence = CodeFence::new();
    let mut out = Vec::new();

    for line in content.lines() {
        match fence.feed(line) {
            FenceEvent::Consumed => {}
            FenceEvent::Closed(code) => out.extend(code.map(|text| Block::code(text, *level))),
            FenceEvent::PassThrough(line) => {
                if let Some(block) = classify_line(line, level) {
                    out.push(block);
                }
            }
        }
    }

    if let Some(text) = fence.finish() {
        log::warn!("Unterminated code fence at end of input, emitting buffered lines");
        out.push(Block::code(text, *level));
    }

    out
}
