//! Conversion errors

use crate::host::HostError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a template was rejected before any host was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateProblem {
    Missing,
    NotAFile,
    Empty,
    /// Legacy binary `.dot`, not an OOXML package
    LegacyBinary,
    WrongExtension,
}

impl fmt::Display for TemplateProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            TemplateProblem::Missing => "file does not exist",
            TemplateProblem::NotAFile => "not a regular file",
            TemplateProblem::Empty => "file is empty",
            TemplateProblem::LegacyBinary => {
                "legacy binary .dot templates are not supported, save it as .dotx"
            }
            TemplateProblem::WrongExtension => "expected a .dotx, .dotm or .docx file",
        };
        f.write_str(reason)
    }
}

/// Fatal conversion failures
///
/// Every variant aborts the conversion. The host, if one was opened, has
/// already been released by the time the caller sees the error.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Markdown text is blank after trimming
    #[error("Markdown input is empty")]
    EmptyInput,

    /// Markdown source could not be read
    #[error("Cannot read markdown input {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template {}: {reason}", path.display())]
    TemplateInvalid {
        path: PathBuf,
        reason: TemplateProblem,
    },

    /// The document host could not be created from the template
    #[error("Document host unavailable: {0}")]
    HostUnavailable(#[source] HostError),

    /// Unrecoverable host failure while streaming or saving
    #[error("Document host failed: {0}")]
    Host(#[from] HostError),

    /// The configured timestamp format has specifiers chrono cannot render
    #[error("Invalid output timestamp format {0:?}")]
    TimestampFormat(String),

    /// The output location could not be prepared
    #[error("Cannot prepare output path {}: {source}", path.display())]
    OutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
