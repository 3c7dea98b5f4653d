//! Line classification
//!
//! Each non-fence line is trimmed and matched against an ordered list of
//! block patterns. The first match wins; a line matching none of them is
//! body text.

use super::blocks::{Block, BlockKind, HeadingLevel};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Ordered block patterns. Group 1 (or 2 for headings) is the block text.
static BLOCK_PATTERNS: LazyLock<[(BlockKind, Regex); 4]> = LazyLock::new(|| {
    [
        // Heading, with an optional `>> metadata` suffix that is discarded
        (
            BlockKind::Heading,
            Regex::new(r"^(#+)\s+(.+?)(?:\s*>>.*)?$").unwrap(),
        ),
        (BlockKind::Bullet, Regex::new(r"^[-*+]\s+(.+)$").unwrap()),
        (BlockKind::Numbered, Regex::new(r"^\d+\.\s+(.+)$").unwrap()),
        (BlockKind::Blockquote, Regex::new(r"^>\s*(.+)$").unwrap()),
    ]
});

/// Classify one line that is outside any code fence
///
/// Heading lines update `level`; every other block carries the current
/// value of `level`.
///
/// # Returns
/// * `Some(Block)` - The classified block
/// * `None` - The line is blank
pub fn classify_line(line: &str, level: &mut HeadingLevel) -> Option<Block> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let matched = BLOCK_PATTERNS
        .iter()
        .find_map(|(kind, regex)| regex.captures(line).map(|caps| (*kind, caps)));

    let block = match matched {
        Some((kind, caps)) => build_block(kind, &caps, level),
        None => Block::new(BlockKind::Body, *level, line),
    };

    log::debug!("Classified line as {} (level {})", block.kind, block.level);
    Some(block)
}

fn build_block(kind: BlockKind, caps: &Captures<'_>, level: &mut HeadingLevel) -> Block {
    match kind {
        BlockKind::Heading => {
            *level = HeadingLevel::new(caps[1].len());
            Block::new(kind, *level, &caps[2])
        }
        BlockKind::Blockquote => Block::new(kind, *level, caps[1].trim()),
        _ => Block::new(kind, *level, &caps[1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Block {
        let mut level = HeadingLevel::default();
        classify_line(line, &mut level).unwrap()
    }

    #[test]
    fn test_heading_levels_one_through_nine() {
        for n in 1..=9 {
            let mut level = HeadingLevel::default();
            let line = format!("{} Section", "#".repeat(n));

            let block = classify_line(&line, &mut level).unwrap();

            assert_eq!(block.kind, BlockKind::Heading);
            assert_eq!(block.level.get() as usize, n);
            assert_eq!(level.get() as usize, n);
            assert_eq!(block.text, "Section");
        }
    }

    #[test]
    fn test_deep_heading_clamps_to_nine() {
        let mut level = HeadingLevel::default();

        let block = classify_line("############ Deep", &mut level).unwrap();

        assert_eq!(block.kind, BlockKind::Heading);
        assert_eq!(block.level.get(), 9);
        assert_eq!(level.get(), 9);
    }

    #[test]
    fn test_heading_metadata_suffix_is_dropped() {
        let block = classify("## Interfaces >> id=IF-01");
        assert_eq!(block.text, "Interfaces");
    }

    #[test]
    fn test_heading_requires_whitespace() {
        let block = classify("#hashtag");
        assert_eq!(block.kind, BlockKind::Body);
        assert_eq!(block.text, "#hashtag");
    }

    #[test]
    fn test_bullet_markers() {
        for line in ["- one", "* one", "+ one", "   -   one"] {
            let block = classify(line);
            assert_eq!(block.kind, BlockKind::Bullet, "line: {line:?}");
            assert_eq!(block.text, "one");
        }
    }

    #[test]
    fn test_emphasis_at_line_start_is_not_a_bullet() {
        let block = classify("**bold** start");
        assert_eq!(block.kind, BlockKind::Body);
    }

    #[test]
    fn test_numbered_item() {
        let block = classify("12. twelfth");
        assert_eq!(block.kind, BlockKind::Numbered);
        assert_eq!(block.text, "twelfth");
    }

    #[test]
    fn test_blockquote_with_and_without_space() {
        assert_eq!(classify("> quoted ").text, "quoted");
        assert_eq!(classify(">tight").text, "tight");
        assert_eq!(classify(">tight").kind, BlockKind::Blockquote);
    }

    #[test]
    fn test_body_fallback() {
        let block = classify("  Just text.  ");
        assert_eq!(block.kind, BlockKind::Body);
        assert_eq!(block.text, "Just text.");
    }

    #[test]
    fn test_non_heading_carries_current_level() {
        let mut level = HeadingLevel::new(4);

        let block = classify_line("- item", &mut level).unwrap();

        assert_eq!(block.level.get(), 4);
        assert_eq!(level.get(), 4);
    }

    #[test]
    fn test_blank_line_is_skipped() {
        let mut level = HeadingLevel::new(2);
        assert!(classify_line("   ", &mut level).is_none());
        assert_eq!(level.get(), 2);
    }
}
