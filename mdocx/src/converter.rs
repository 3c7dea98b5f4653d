//! Document assembly
//!
//! The [`AssemblyDriver`] owns a document host for one conversion and walks
//! it through `Init -> Clearing -> Streaming -> Saved`, or into `Failed` on
//! any unrecoverable host error. [`Converter`] wraps the driver with template
//! verification, output naming and the release guard.

use crate::config::ConverterConfig;
use crate::docx_host::DocxHost;
use crate::error::ConvertError;
use crate::host::{DocumentHost, HostError, HostGuard};
use crate::markdown::{self, Block, BlockKind, FormatSpan, HeadingLevel};
use crate::output::{source_stem, unique_output_path};
use crate::styles::{ResolvedStyle, StyleResolver};
use crate::template::verify_template;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Lifecycle of one assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    Clearing,
    Streaming,
    Saved,
    Failed,
}

/// A paragraph the driver emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedParagraph {
    pub kind: BlockKind,
    pub level: HeadingLevel,
    pub style: ResolvedStyle,
    /// Clean text, markers stripped
    pub text: String,
    /// Spans the host accepted
    pub spans: Vec<FormatSpan>,
}

/// What happened during an assembly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub paragraphs: Vec<EmittedParagraph>,
    pub spans_applied: usize,
    /// Spans the host rejected; their text stays plain
    pub spans_dropped: usize,
}

impl AssemblyReport {
    /// Paragraph counts per block kind
    pub fn counts(&self) -> HashMap<BlockKind, usize> {
        let mut counts = HashMap::new();
        for paragraph in &self.paragraphs {
            *counts.entry(paragraph.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.paragraphs.iter().filter(|p| p.kind == kind).count()
    }

    /// Paragraphs whose requested style was not available
    pub fn degraded_styles(&self) -> usize {
        self.paragraphs
            .iter()
            .filter(|p| p.style.is_degraded())
            .count()
    }
}

/// Drives paragraph mutations against a document host
pub struct AssemblyDriver<'r, H: DocumentHost> {
    host: H,
    resolver: &'r StyleResolver,
    level: HeadingLevel,
    state: DriverState,
    report: AssemblyReport,
}

impl<'r, H: DocumentHost> AssemblyDriver<'r, H> {
    pub fn new(host: H, resolver: &'r StyleResolver) -> Self {
        Self {
            host,
            resolver,
            level: HeadingLevel::default(),
            state: DriverState::Init,
            report: AssemblyReport::default(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn into_report(self) -> AssemblyReport {
        self.report
    }

    /// Clear the host, stream every block and save to `output_path`
    pub fn run(&mut self, markdown: &str, output_path: &Path) -> Result<(), HostError> {
        self.clear()?;
        self.stream(markdown)?;
        self.save(output_path)
    }

    /// Wipe existing host content
    pub fn clear(&mut self) -> Result<(), HostError> {
        self.state = DriverState::Clearing;
        log::debug!("Clearing document content");
        let result = self.host.clear_content();
        self.track(result)
    }

    /// Emit one paragraph per block, in input order
    pub fn stream(&mut self, markdown: &str) -> Result<(), HostError> {
        self.state = DriverState::Streaming;
        let blocks = markdown::blocks(markdown, &mut self.level);
        log::info!("Streaming {} blocks", blocks.len());

        for block in &blocks {
            let result = self.emit(block);
            self.track(result)?;
        }
        Ok(())
    }

    /// Persist the host
    pub fn save(&mut self, output_path: &Path) -> Result<(), HostError> {
        let result = self.host.save_as(output_path);
        self.track(result)?;
        self.state = DriverState::Saved;
        log::info!("Saved document to {}", output_path.display());
        Ok(())
    }

    fn track<T>(&mut self, result: Result<T, HostError>) -> Result<T, HostError> {
        if let Err(e) = &result {
            log::error!("Document host failure: {}", e);
            self.state = DriverState::Failed;
        }
        result
    }

    fn emit(&mut self, block: &Block) -> Result<(), HostError> {
        let host = &self.host;
        let style = self
            .resolver
            .resolve(block.kind.style_key(), block.level.get(), |name| {
                host.style_exists(name)
            });

        // Code blocks are verbatim
        let resolved = if block.kind == BlockKind::Code {
            markdown::ResolvedText {
                text: block.text.clone(),
                spans: Vec::new(),
            }
        } else {
            markdown::resolve_spans(&block.text)
        };

        let paragraph = self.host.append_paragraph()?;
        self.host.set_paragraph_text(paragraph, &resolved.text)?;

        let mut applied = Vec::with_capacity(resolved.spans.len());
        for span in resolved.spans {
            match self
                .host
                .apply_character_format(paragraph, span.start, span.end, span.kind)
            {
                Ok(()) => {
                    self.report.spans_applied += 1;
                    applied.push(span);
                }
                Err(e) => {
                    log::warn!(
                        "Could not apply {} to {}..{}, leaving plain text: {}",
                        span.kind,
                        span.start,
                        span.end,
                        e
                    );
                    self.report.spans_dropped += 1;
                }
            }
        }

        self.host.apply_style(paragraph, &style.name)?;

        log::debug!(
            "{} paragraph (level {}) styled {}: {} spans",
            block.kind,
            block.level,
            style,
            applied.len()
        );

        self.report.paragraphs.push(EmittedParagraph {
            kind: block.kind,
            level: block.level,
            style,
            text: resolved.text,
            spans: applied,
        });
        Ok(())
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    pub output_path: PathBuf,
    pub report: AssemblyReport,
}

/// Converts markdown into documents based on a template
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
    resolver: StyleResolver,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        let resolver = StyleResolver::new(config.styles.clone());
        Self { config, resolver }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn resolver(&self) -> &StyleResolver {
        &self.resolver
    }

    /// Convert markdown text into a new document in `output_dir`
    ///
    /// # Parameters
    /// * `template` - Template the document is created from
    /// * `markdown` - Markdown text
    /// * `output_dir` - Directory receiving the document
    ///
    /// # Returns
    /// * `Ok(Conversion)` - Path of the saved document plus the assembly report
    /// * `Err(ConvertError)` - Fatal failure; the host has been released
    pub fn convert(
        &self,
        template: &Path,
        markdown: &str,
        output_dir: &Path,
    ) -> Result<Conversion, ConvertError> {
        self.convert_named(template, markdown, output_dir, &source_stem(None))
    }

    /// Convert a markdown file, naming the output after it
    pub fn convert_file(
        &self,
        template: &Path,
        source: &Path,
        output_dir: &Path,
    ) -> Result<Conversion, ConvertError> {
        log::info!("Converting {}", source.display());
        let markdown = std::fs::read_to_string(source).map_err(|e| ConvertError::Input {
            path: source.to_path_buf(),
            source: e,
        })?;
        self.convert_named(template, &markdown, output_dir, &source_stem(Some(source)))
    }

    /// Convert markdown text with an explicit output stem
    pub fn convert_named(
        &self,
        template: &Path,
        markdown: &str,
        output_dir: &Path,
        stem: &str,
    ) -> Result<Conversion, ConvertError> {
        verify_template(template)?;
        self.convert_with_host(
            || DocxHost::open(template, self.config.code_span.clone()),
            markdown,
            output_dir,
            stem,
        )
    }

    /// Convert into a host produced by `open`
    ///
    /// The output location is prepared first, so `open` only runs once every
    /// step that can fail without a host has succeeded.
    pub fn convert_with_host<H, F>(
        &self,
        open: F,
        markdown: &str,
        output_dir: &Path,
        stem: &str,
    ) -> Result<Conversion, ConvertError>
    where
        H: DocumentHost,
        F: FnOnce() -> Result<H, HostError>,
    {
        check_input(markdown)?;

        let timestamp_format = &self.config.output.timestamp_format;
        let output_path =
            unique_output_path(output_dir, stem, timestamp_format, chrono::Local::now())
                .ok_or_else(|| ConvertError::TimestampFormat(timestamp_format.clone()))?;
        std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::OutputPath {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        let host = open().map_err(ConvertError::HostUnavailable)?;
        let report = self.assemble(host, markdown, &output_path)?;

        log::info!(
            "Converted {} paragraphs ({} degraded styles, {} spans dropped)",
            report.paragraphs.len(),
            report.degraded_styles(),
            report.spans_dropped
        );

        Ok(Conversion {
            output_path,
            report,
        })
    }

    /// Run the assembly against any host, releasing it on every exit path
    pub fn assemble<H: DocumentHost>(
        &self,
        host: H,
        markdown: &str,
        output_path: &Path,
    ) -> Result<AssemblyReport, ConvertError> {
        check_input(markdown)?;

        let mut host = HostGuard::new(host);
        let mut driver = AssemblyDriver::new(&mut *host, &self.resolver);
        driver.run(markdown, output_path)?;
        Ok(driver.into_report())
    }
}

fn check_input(markdown: &str) -> Result<(), ConvertError> {
    if markdown.trim().is_empty() {
        log::error!("Markdown input is empty");
        return Err(ConvertError::EmptyInput);
    }
    Ok(())
}
