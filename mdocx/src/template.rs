//! Template verification
//!
//! Runs before any document host is opened so that obviously unusable
//! templates fail fast with a precise reason.

use crate::error::{ConvertError, TemplateProblem};
use std::path::Path;

/// Extensions of OOXML word-processing packages usable as templates
pub const TEMPLATE_EXTENSIONS: [&str; 3] = ["dotx", "dotm", "docx"];

/// Check that a template exists, is a non-empty file and is an OOXML package
///
/// # Parameters
/// * `path` - Template path chosen by the caller
///
/// # Returns
/// * `Ok(())` - Template can be handed to a document host
/// * `Err(ConvertError::TemplateInvalid)` - Template was rejected, with the reason
pub fn verify_template(path: &Path) -> Result<(), ConvertError> {
    let invalid = |reason: TemplateProblem| {
        log::error!("Template {} rejected: {}", path.display(), reason);
        ConvertError::TemplateInvalid {
            path: path.to_path_buf(),
            reason,
        }
    };

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some(ext) if TEMPLATE_EXTENSIONS.contains(&ext) => {}
        Some("dot") => return Err(invalid(TemplateProblem::LegacyBinary)),
        _ => return Err(invalid(TemplateProblem::WrongExtension)),
    }

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return Err(invalid(TemplateProblem::Missing)),
    };

    if !metadata.is_file() {
        return Err(invalid(TemplateProblem::NotAFile));
    }

    if metadata.len() == 0 {
        return Err(invalid(TemplateProblem::Empty));
    }

    log::debug!(
        "Template {} verified ({} bytes)",
        path.display(),
        metadata.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reason(result: Result<(), ConvertError>) -> Option<TemplateProblem> {
        match result {
            Err(ConvertError::TemplateInvalid { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn test_accepts_non_empty_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Report.DOTX");
        std::fs::write(&path, b"PK").unwrap();

        assert!(verify_template(&path).is_ok());
    }

    #[test]
    fn test_rejects_missing_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.dotm");

        assert_eq!(reason(verify_template(&path)), Some(TemplateProblem::Missing));
    }

    #[test]
    fn test_rejects_empty_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.dotx");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(reason(verify_template(&path)), Some(TemplateProblem::Empty));
    }

    #[test]
    fn test_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folder.docx");
        std::fs::create_dir(&path).unwrap();

        assert_eq!(reason(verify_template(&path)), Some(TemplateProblem::NotAFile));
    }

    #[test]
    fn test_rejects_extensions() {
        assert_eq!(
            reason(verify_template(Path::new("legacy.dot"))),
            Some(TemplateProblem::LegacyBinary)
        );
        assert_eq!(
            reason(verify_template(Path::new("notes.txt"))),
            Some(TemplateProblem::WrongExtension)
        );
        assert_eq!(
            reason(verify_template(Path::new("no_extension"))),
            Some(TemplateProblem::WrongExtension)
        );
    }
}
