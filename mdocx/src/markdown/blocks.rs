//! Block and span types produced by the markdown front end
//!
//! Blocks are ephemeral: each one is created for a single logical unit of
//! input (one line, or one aggregated fence) and consumed immediately by the
//! assembly driver.

use std::fmt;

/// Deepest heading level a document can carry
pub const MAX_HEADING_LEVEL: u8 = 9;

/// Block-level element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `#`-prefixed heading
    Heading,
    /// `-`, `*` or `+` list item
    Bullet,
    /// `1.` style list item
    Numbered,
    /// `>` quote line
    Blockquote,
    /// Aggregated fenced code
    Code,
    /// Anything else
    Body,
}

impl BlockKind {
    /// All kinds, in the order the style table lists them
    pub const ALL: [BlockKind; 6] = [
        BlockKind::Heading,
        BlockKind::Body,
        BlockKind::Bullet,
        BlockKind::Numbered,
        BlockKind::Blockquote,
        BlockKind::Code,
    ];

    /// Element kind key used for style lookup
    pub fn style_key(self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Bullet => "bullet",
            BlockKind::Numbered => "numbered",
            BlockKind::Blockquote => "blockquote",
            BlockKind::Code => "code",
            BlockKind::Body => "body",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style_key())
    }
}

/// Running heading level of a document, always within `0..=9`
///
/// Starts at 0 for a fresh document and only changes when a heading line is
/// classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Create a level, clamping anything deeper than 9
    pub fn new(level: usize) -> Self {
        Self(level.min(MAX_HEADING_LEVEL as usize) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One logical unit of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Own level for headings, the document's current level otherwise
    pub level: HeadingLevel,
    /// Content text, markers of the block syntax already removed
    pub text: String,
}

impl Block {
    pub fn new(kind: BlockKind, level: HeadingLevel, text: impl Into<String>) -> Self {
        Self {
            kind,
            level,
            text: text.into(),
        }
    }

    /// Create a code block from aggregated fence content
    pub fn code(text: String, level: HeadingLevel) -> Self {
        Self::new(BlockKind::Code, level, text)
    }
}

/// Inline formatting family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Bold,
    Italic,
    BoldItalic,
    /// Inline code, rendered with the configured code-span presentation
    Code,
}

impl FormatKind {
    pub fn is_bold(self) -> bool {
        matches!(self, FormatKind::Bold | FormatKind::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FormatKind::Italic | FormatKind::BoldItalic)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::Bold => "bold",
            FormatKind::Italic => "italic",
            FormatKind::BoldItalic => "bold-italic",
            FormatKind::Code => "code",
        };
        f.write_str(name)
    }
}

/// A formatted byte range `[start, end)` over a block's clean text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpan {
    pub start: usize,
    pub end: usize,
    pub kind: FormatKind,
}

impl FormatSpan {
    pub fn overlaps(&self, other: &FormatSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamps() {
        assert_eq!(HeadingLevel::new(0).get(), 0);
        assert_eq!(HeadingLevel::new(9).get(), 9);
        assert_eq!(HeadingLevel::new(12).get(), 9);
    }

    #[test]
    fn test_span_overlap() {
        let a = FormatSpan { start: 0, end: 4, kind: FormatKind::Bold };
        let b = FormatSpan { start: 4, end: 6, kind: FormatKind::Italic };
        let c = FormatSpan { start: 3, end: 5, kind: FormatKind::Code };

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_style_keys() {
        let keys: Vec<&str> = BlockKind::ALL.iter().map(|k| k.style_key()).collect();
        assert_eq!(
            keys,
            vec!["heading", "body", "bullet", "numbered", "blockquote", "code"]
        );
    }
}
