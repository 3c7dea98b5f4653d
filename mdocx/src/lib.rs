//! mdocx - markdown to Word document assembly
//!
//! Classifies markdown lines into blocks, resolves inline emphasis into
//! character format spans, and resolves `{Base} {level}` paragraph styles
//! against the styles a Word template actually defines.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod converter;
pub mod docx_host;
pub mod error;
pub mod host;
pub mod markdown;
pub mod output;
pub mod starter_template;
pub mod styles;
pub mod template;
pub mod walker;

pub use config::{ConfigError, ConverterConfig};
pub use converter::{AssemblyDriver, AssemblyReport, Conversion, Converter, DriverState};
pub use docx_host::DocxHost;
pub use error::{ConvertError, TemplateProblem};
pub use host::{DocumentHost, HostError, HostGuard, MemoryHost, ParagraphHandle};
pub use styles::{ResolvedStyle, StyleResolver, StyleTier, StyleTypeTable};
