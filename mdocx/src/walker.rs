//! Discovery of markdown inputs

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors that can occur while collecting inputs
#[derive(Debug)]
pub enum WalkerError {
    /// IO error
    Io(std::io::Error),
    /// Input path does not exist
    Missing(PathBuf),
}

impl From<std::io::Error> for WalkerError {
    fn from(err: std::io::Error) -> Self {
        WalkerError::Io(err)
    }
}

impl std::fmt::Display for WalkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkerError::Io(e) => write!(f, "IO error: {}", e),
            WalkerError::Missing(path) => write!(f, "Input not found: {}", path.display()),
        }
    }
}

impl std::error::Error for WalkerError {}

/// Expand inputs into markdown files
///
/// Files are taken as given. Directories are walked for `*.md` files,
/// sorted by file name.
///
/// # Parameters
/// * `inputs` - Files and directories from the command line
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Markdown files in conversion order
/// * `Err(WalkerError)` - An input is missing or a directory could not be read
pub fn collect_markdown_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, WalkerError> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let before = files.len();
            for entry in WalkDir::new(input).follow_links(false).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::other)?;
                let path = entry.path();

                if path.is_file() && is_markdown(path) {
                    files.push(path.to_path_buf());
                }
            }
            log::info!(
                "Found {} markdown files in {}",
                files.len() - before,
                input.display()
            );
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(WalkerError::Missing(input.clone()));
        }
    }

    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collects_sorted_markdown() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.md"), "# B").unwrap();
        std::fs::write(dir.path().join("a.MD"), "# A").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.md"), "# C").unwrap();

        let files = collect_markdown_files(&[dir.path().to_path_buf()]).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.MD"),
                PathBuf::from("b.md"),
                PathBuf::from("sub").join("c.md"),
            ]
        );
    }

    #[test]
    fn test_explicit_files_kept_in_order() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("z.markdown");
        let first = dir.path().join("y.md");
        std::fs::write(&second, "x").unwrap();
        std::fs::write(&first, "x").unwrap();

        let files = collect_markdown_files(&[second.clone(), first.clone()]).unwrap();

        assert_eq!(files, vec![second, first]);
    }

    #[test]
    fn test_missing_input() {
        let err = collect_markdown_files(&[PathBuf::from("/nonexistent/input.md")]).unwrap_err();
        assert!(matches!(err, WalkerError::Missing(_)));
    }
}
