//! Document host abstraction
//!
//! A document host is the destination of a conversion: something that can be
//! cleared, accept paragraph appends, format character ranges, answer whether
//! a named style exists, and persist itself. [`crate::docx_host::DocxHost`]
//! is the template-backed implementation; [`MemoryHost`] records mutations in
//! memory for previews and tests.
//!
//! Hosts are owned by exactly one conversion at a time and must be released
//! on every exit path, see [`HostGuard`].

use crate::markdown::FormatKind;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Handle to a paragraph appended to a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParagraphHandle(pub(crate) usize);

impl ParagraphHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors raised by document hosts
#[derive(Error, Debug)]
pub enum HostError {
    /// I/O error while reading the template or writing the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document package could not be read or written
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The document package is structurally unusable
    #[error("Format error: {0}")]
    Format(String),

    /// Handle does not refer to a paragraph of this host
    #[error("Unknown paragraph {0:?}")]
    UnknownParagraph(ParagraphHandle),

    /// Character range outside the paragraph text or not on a char boundary
    #[error("Invalid range {start}..{end} for paragraph of {len} bytes")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    /// No paragraph style with this name is defined
    #[error("Style not defined: {0}")]
    UnknownStyle(String),

    /// The host was already released
    #[error("Document host has been released")]
    Released,
}

/// Operations the assembly driver needs from a destination document
pub trait DocumentHost {
    /// Remove all existing content
    fn clear_content(&mut self) -> Result<(), HostError>;

    /// Append an empty paragraph at the end of the document
    fn append_paragraph(&mut self) -> Result<ParagraphHandle, HostError>;

    /// Replace a paragraph's text
    fn set_paragraph_text(&mut self, paragraph: ParagraphHandle, text: &str)
        -> Result<(), HostError>;

    /// Format the byte range `[start, end)` of a paragraph's text
    fn apply_character_format(
        &mut self,
        paragraph: ParagraphHandle,
        start: usize,
        end: usize,
        kind: FormatKind,
    ) -> Result<(), HostError>;

    /// Whether a paragraph style with this name is available
    fn style_exists(&self, name: &str) -> bool;

    /// Apply a named paragraph style
    fn apply_style(&mut self, paragraph: ParagraphHandle, name: &str) -> Result<(), HostError>;

    /// Persist the document
    fn save_as(&mut self, path: &Path) -> Result<(), HostError>;

    /// Release all resources held by the host. Must be idempotent.
    fn release(&mut self);
}

impl<H: DocumentHost + ?Sized> DocumentHost for &mut H {
    fn clear_content(&mut self) -> Result<(), HostError> {
        (**self).clear_content()
    }

    fn append_paragraph(&mut self) -> Result<ParagraphHandle, HostError> {
        (**self).append_paragraph()
    }

    fn set_paragraph_text(
        &mut self,
        paragraph: ParagraphHandle,
        text: &str,
    ) -> Result<(), HostError> {
        (**self).set_paragraph_text(paragraph, text)
    }

    fn apply_character_format(
        &mut self,
        paragraph: ParagraphHandle,
        start: usize,
        end: usize,
        kind: FormatKind,
    ) -> Result<(), HostError> {
        (**self).apply_character_format(paragraph, start, end, kind)
    }

    fn style_exists(&self, name: &str) -> bool {
        (**self).style_exists(name)
    }

    fn apply_style(&mut self, paragraph: ParagraphHandle, name: &str) -> Result<(), HostError> {
        (**self).apply_style(paragraph, name)
    }

    fn save_as(&mut self, path: &Path) -> Result<(), HostError> {
        (**self).save_as(path)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Check a format range against a paragraph's text
pub(crate) fn check_range(text: &str, start: usize, end: usize) -> Result<(), HostError> {
    let valid = start < end
        && end <= text.len()
        && text.is_char_boundary(start)
        && text.is_char_boundary(end);
    if valid {
        Ok(())
    } else {
        Err(HostError::InvalidRange {
            start,
            end,
            len: text.len(),
        })
    }
}

/// Scope guard that releases a host when dropped
///
/// Covers success, early returns through `?`, and unwinding panics alike.
pub struct HostGuard<H: DocumentHost> {
    host: H,
}

impl<H: DocumentHost> HostGuard<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }
}

impl<H: DocumentHost> Deref for HostGuard<H> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.host
    }
}

impl<H: DocumentHost> DerefMut for HostGuard<H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: DocumentHost> Drop for HostGuard<H> {
    fn drop(&mut self) {
        log::debug!("Releasing document host");
        self.host.release();
    }
}

/// A paragraph recorded by [`MemoryHost`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedParagraph {
    pub text: String,
    pub style: Option<String>,
    pub formats: Vec<(usize, usize, FormatKind)>,
}

/// In-memory host that records every mutation
#[derive(Debug, Default)]
pub struct MemoryHost {
    styles: HashSet<String>,
    paragraphs: Vec<RecordedParagraph>,
    saved_to: Vec<PathBuf>,
    clear_count: usize,
    released: bool,
}

impl MemoryHost {
    /// Create a host that knows the given style names
    pub fn with_styles<I, S>(styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            styles: styles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn paragraphs(&self) -> &[RecordedParagraph] {
        &self.paragraphs
    }

    /// Paths passed to `save_as`, in call order
    pub fn saved_to(&self) -> &[PathBuf] {
        &self.saved_to
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn ensure_live(&self) -> Result<(), HostError> {
        if self.released {
            Err(HostError::Released)
        } else {
            Ok(())
        }
    }

    fn paragraph_mut(
        &mut self,
        paragraph: ParagraphHandle,
    ) -> Result<&mut RecordedParagraph, HostError> {
        self.ensure_live()?;
        self.paragraphs
            .get_mut(paragraph.0)
            .ok_or(HostError::UnknownParagraph(paragraph))
    }
}

impl DocumentHost for MemoryHost {
    fn clear_content(&mut self) -> Result<(), HostError> {
        self.ensure_live()?;
        self.paragraphs.clear();
        self.clear_count += 1;
        Ok(())
    }

    fn append_paragraph(&mut self) -> Result<ParagraphHandle, HostError> {
        self.ensure_live()?;
        self.paragraphs.push(RecordedParagraph::default());
        Ok(ParagraphHandle(self.paragraphs.len() - 1))
    }

    fn set_paragraph_text(
        &mut self,
        paragraph: ParagraphHandle,
        text: &str,
    ) -> Result<(), HostError> {
        let recorded = self.paragraph_mut(paragraph)?;
        recorded.text = text.to_string();
        recorded.formats.clear();
        Ok(())
    }

    fn apply_character_format(
        &mut self,
        paragraph: ParagraphHandle,
        start: usize,
        end: usize,
        kind: FormatKind,
    ) -> Result<(), HostError> {
        let recorded = self.paragraph_mut(paragraph)?;
        check_range(&recorded.text, start, end)?;
        recorded.formats.push((start, end, kind));
        Ok(())
    }

    fn style_exists(&self, name: &str) -> bool {
        self.styles.contains(name)
    }

    fn apply_style(&mut self, paragraph: ParagraphHandle, name: &str) -> Result<(), HostError> {
        let recorded = self.paragraph_mut(paragraph)?;
        recorded.style = Some(name.to_string());
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> Result<(), HostError> {
        self.ensure_live()?;
        self.saved_to.push(path.to_path_buf());
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert!(check_range("hello", 0, 5).is_ok());
        assert!(check_range("hello", 2, 2).is_err());
        assert!(check_range("hello", 3, 6).is_err());
        // 'é' is two bytes
        assert!(check_range("é", 0, 1).is_err());
    }

    #[test]
    fn test_memory_host_records_paragraphs() {
        let mut host = MemoryHost::with_styles(["Body 0"]);

        let p = host.append_paragraph().unwrap();
        host.set_paragraph_text(p, "plain bold").unwrap();
        host.apply_character_format(p, 6, 10, FormatKind::Bold).unwrap();
        host.apply_style(p, "Body 0").unwrap();

        assert_eq!(
            host.paragraphs(),
            &[RecordedParagraph {
                text: "plain bold".to_string(),
                style: Some("Body 0".to_string()),
                formats: vec![(6, 10, FormatKind::Bold)],
            }]
        );
        assert!(host.style_exists("Body 0"));
        assert!(!host.style_exists("Body 1"));
    }

    #[test]
    fn test_memory_host_rejects_bad_handle() {
        let mut host = MemoryHost::default();
        let err = host.apply_style(ParagraphHandle(3), "Normal").unwrap_err();
        assert!(matches!(err, HostError::UnknownParagraph(_)));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let mut host = MemoryHost::default();
        {
            let guard = HostGuard::new(&mut host);
            assert!(!guard.is_released());
        }
        assert!(host.is_released());
    }

    #[test]
    fn test_released_host_rejects_mutation() {
        let mut host = MemoryHost::default();
        host.release();
        host.release();
        assert!(matches!(host.append_paragraph(), Err(HostError::Released)));
    }
}
