//! Style resolution against a document's available named styles
//!
//! Templates are not guaranteed to define every `{Base} {level}` style, so
//! resolution falls back in tiers:
//! 1. `"{base} {level}"`
//! 2. `"{base} 0"`
//! 3. `"Body 0"` (the body base), for kinds other than body
//! 4. `"Normal"`, which every Word document has
//!
//! Resolution never fails; degraded outcomes are only logged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Universal fallback paragraph style
pub const FALLBACK_STYLE: &str = "Normal";

/// Base name used for element kinds missing from the table
pub const DEFAULT_BASE: &str = "Body";

/// Element kind to base style name mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTypeTable {
    pub heading: String,
    pub body: String,
    pub bullet: String,
    pub numbered: String,
    pub blockquote: String,
    pub code: String,
}

impl Default for StyleTypeTable {
    fn default() -> Self {
        Self {
            heading: "Heading".to_string(),
            body: "Body".to_string(),
            bullet: "Bullet".to_string(),
            numbered: "Numbered".to_string(),
            blockquote: "Blockquote".to_string(),
            code: "Code".to_string(),
        }
    }
}

impl StyleTypeTable {
    /// Look up the base style name for an element kind (case-insensitive)
    pub fn base_for(&self, element_kind: &str) -> Option<&str> {
        let base = match element_kind.to_ascii_lowercase().as_str() {
            "heading" => &self.heading,
            "body" => &self.body,
            "bullet" => &self.bullet,
            "numbered" => &self.numbered,
            "blockquote" => &self.blockquote,
            "code" => &self.code,
            _ => return None,
        };
        Some(base.as_str())
    }
}

/// Which fallback tier produced a style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTier {
    /// `"{base} {level}"` exists
    Exact,
    /// Fell back to `"{base} 0"`
    BaseLevel,
    /// Fell back to the body base style at level 0
    Body,
    /// Fell back to `"Normal"`
    Fallback,
}

/// Outcome of a style resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub name: String,
    pub tier: StyleTier,
}

impl ResolvedStyle {
    /// Whether the requested style was unavailable
    pub fn is_degraded(&self) -> bool {
        self.tier != StyleTier::Exact
    }
}

impl fmt::Display for ResolvedStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolves (element kind, level) requests to concrete style names
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    table: StyleTypeTable,
}

impl StyleResolver {
    pub fn new(table: StyleTypeTable) -> Self {
        Self { table }
    }

    /// Resolve the best available style
    ///
    /// # Parameters
    /// * `element_kind` - Element kind key (`heading`, `body`, ...)
    /// * `level` - Heading level to request
    /// * `exists` - Existence check against the target document
    pub fn resolve<F>(&self, element_kind: &str, level: u8, exists: F) -> ResolvedStyle
    where
        F: Fn(&str) -> bool,
    {
        let base = self.table.base_for(element_kind).unwrap_or_else(|| {
            log::warn!(
                "Unknown element type {}, falling back to {}",
                element_kind,
                DEFAULT_BASE
            );
            DEFAULT_BASE
        });

        let candidate = format!("{} {}", base, level);
        if exists(&candidate) {
            log::debug!("Resolved {} level {} to {}", element_kind, level, candidate);
            return ResolvedStyle {
                name: candidate,
                tier: StyleTier::Exact,
            };
        }

        let base_level = format!("{} 0", base);
        if exists(&base_level) {
            log::info!("Style {} not found, using base style {}", candidate, base_level);
            return ResolvedStyle {
                name: base_level,
                tier: StyleTier::BaseLevel,
            };
        }

        let body_level = format!("{} 0", self.table.body);
        if body_level != base_level && exists(&body_level) {
            log::warn!(
                "Neither {} nor {} found, falling back to {}",
                candidate,
                base_level,
                body_level
            );
            return ResolvedStyle {
                name: body_level,
                tier: StyleTier::Body,
            };
        }

        log::warn!(
            "Neither {} nor {} found, falling back to {}",
            candidate,
            base_level,
            FALLBACK_STYLE
        );
        ResolvedStyle {
            name: FALLBACK_STYLE.to_string(),
            tier: StyleTier::Fallback,
        }
    }
}
