//! Output path bookkeeping

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Stem used when converting text that did not come from a file
pub const RAW_TEXT_STEM: &str = "document";

/// Whether chrono understands every specifier in a strftime format
pub fn is_valid_timestamp_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Render `now` with a strftime format, `None` if the format is unusable
pub fn render_timestamp(now: &DateTime<Local>, format: &str) -> Option<String> {
    if !is_valid_timestamp_format(format) {
        return None;
    }
    let mut rendered = String::new();
    write!(rendered, "{}", now.format(format)).ok()?;
    Some(rendered)
}

/// Compute an output path that does not exist yet
///
/// The name is `{timestamp}_{stem}.docx` inside `output_dir`. If that file is
/// already present, `_1`, `_2`, ... is appended until a free name is found.
/// Returns `None` when `timestamp_format` cannot be rendered.
pub fn unique_output_path(
    output_dir: &Path,
    stem: &str,
    timestamp_format: &str,
    now: DateTime<Local>,
) -> Option<PathBuf> {
    let base = format!("{}_{}", render_timestamp(&now, timestamp_format)?, stem);

    let mut candidate = output_dir.join(format!("{}.docx", base));
    let mut suffix = 1;
    while candidate.exists() {
        candidate = output_dir.join(format!("{}_{}.docx", base, suffix));
        suffix += 1;
    }

    Some(candidate)
}

/// File stem of a markdown source, or [`RAW_TEXT_STEM`]
pub fn source_stem(source: Option<&Path>) -> String {
    source
        .and_then(|path| path.file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(RAW_TEXT_STEM)
        .to_string()
}
