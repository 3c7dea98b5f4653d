//! mdocx - markdown to Word converter
//!
//! A CLI tool that turns markdown files into documents built from a Word
//! template, mapping every block to the template's `{Base} {level}` styles.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, LoggingArgs};
use mdocx::config::CONFIG_FILE_NAME;
use mdocx::markdown::BlockKind;
use mdocx::starter_template::write_starter_template;
use mdocx::template::verify_template;
use mdocx::walker::collect_markdown_files;
use mdocx::{
    AssemblyDriver, AssemblyReport, Converter, ConverterConfig, DocumentHost, DocxHost, HostGuard,
    MemoryHost,
};
use std::path::{Path, PathBuf};

/// Main entry point for the mdocx CLI application
fn main() {
    if let Err(e) = run() {
        log::error!("{:#}", e);
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.logging)?;

    match cli.command {
        Commands::Convert {
            template,
            inputs,
            output_dir,
            config,
        } => {
            handle_convert_command(&template, &inputs, &output_dir, config.as_deref())?;
        }

        Commands::Preview {
            input,
            template,
            config,
        } => {
            handle_preview_command(&input, template.as_deref(), config.as_deref())?;
        }

        Commands::Styles { template } => {
            handle_styles_command(&template)?;
        }

        Commands::InitTemplate {
            output,
            config,
            force,
        } => {
            handle_init_template_command(&output, config.as_deref(), force)?;
        }
    }

    Ok(())
}

/// Initialize env_logger from RUST_LOG and the logging flags
fn init_logging(args: &LoggingArgs) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn).parse_default_env();

    if args.debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else if args.verbose {
        builder.filter_level(log::LevelFilter::Info);
    }

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Load an explicit config file, or ./mdocx.toml when present
fn load_config(config: Option<&Path>) -> Result<ConverterConfig> {
    match config {
        Some(path) => ConverterConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => ConverterConfig::load_or_default(CONFIG_FILE_NAME)
            .with_context(|| format!("Failed to load configuration {}", CONFIG_FILE_NAME)),
    }
}

/// Handle the convert command
fn handle_convert_command(
    template: &Path,
    inputs: &[PathBuf],
    output_dir: &Path,
    config: Option<&Path>,
) -> Result<()> {
    let converter = Converter::new(load_config(config)?);

    let files = collect_markdown_files(inputs).context("Failed to collect markdown inputs")?;
    if files.is_empty() {
        anyhow::bail!("No markdown files found in the given inputs");
    }

    println!("Template: {}", template.display());
    println!("Output directory: {}", output_dir.display());

    for file in &files {
        let conversion = converter
            .convert_file(template, file, output_dir)
            .with_context(|| format!("Failed to convert {}", file.display()))?;

        println!(
            "✓ {} -> {} ({} paragraphs)",
            file.display(),
            conversion.output_path.display(),
            conversion.report.paragraphs.len()
        );
        let counts = conversion.report.counts();
        let breakdown: Vec<String> = BlockKind::ALL
            .iter()
            .filter_map(|kind| counts.get(kind).map(|n| format!("{} {}", n, kind)))
            .collect();
        println!("  {}", breakdown.join(", "));
        if conversion.report.degraded_styles() > 0 {
            println!(
                "  {} paragraphs used a fallback style",
                conversion.report.degraded_styles()
            );
        }
        if conversion.report.spans_dropped > 0 {
            println!(
                "  {} inline formats could not be applied",
                conversion.report.spans_dropped
            );
        }
    }

    println!("\n✓ Converted {} files", files.len());
    Ok(())
}

/// Handle the preview command
fn handle_preview_command(
    input: &Path,
    template: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let converter = Converter::new(load_config(config)?);
    let markdown = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let report = match template {
        Some(template) => {
            verify_template(template)?;
            let host = DocxHost::open(template, converter.config().code_span.clone())
                .with_context(|| format!("Failed to open template {}", template.display()))?;
            let mut host = HostGuard::new(host);
            stream_only(&mut *host, &converter, &markdown)?
        }
        None => stream_only(MemoryHost::default(), &converter, &markdown)?,
    };

    for emitted in &report.paragraphs {
        let marker = if emitted.style.is_degraded() { "*" } else { " " };
        println!(
            "{:<10} {:<16}{} {}",
            emitted.kind.to_string(),
            emitted.style.name,
            marker,
            emitted.text.replace('\n', "\n                             ")
        );
        for span in &emitted.spans {
            println!(
                "{:>28} {}: {:?}",
                "",
                span.kind,
                &emitted.text[span.start..span.end]
            );
        }
    }

    println!(
        "\n{} paragraphs, {} with fallback styles (*)",
        report.paragraphs.len(),
        report.degraded_styles()
    );
    Ok(())
}

/// Clear and stream into a host without saving it
fn stream_only<H: DocumentHost>(
    host: H,
    converter: &Converter,
    markdown: &str,
) -> Result<AssemblyReport> {
    let mut driver = AssemblyDriver::new(host, converter.resolver());
    driver.clear()?;
    driver.stream(markdown)?;
    Ok(driver.into_report())
}

/// Handle the styles command
fn handle_styles_command(template: &Path) -> Result<()> {
    let converter = Converter::default();
    let names = template_style_names(template, &converter)?;

    println!("Paragraph styles in {}:", template.display());
    for name in &names {
        println!("  {}", name);
    }
    println!("\n{} styles", names.len());
    Ok(())
}

/// Handle the init-template command
fn handle_init_template_command(output: &Path, config: Option<&Path>, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it",
            output.display()
        );
    }

    let config = load_config(config)?;
    write_starter_template(output, &config.styles)
        .with_context(|| format!("Failed to write starter template {}", output.display()))?;

    println!("✓ Wrote starter template {}", output.display());
    Ok(())
}

/// Paragraph style names a template defines
fn template_style_names(template: &Path, converter: &Converter) -> Result<Vec<String>> {
    verify_template(template)?;
    let host = DocxHost::open(template, converter.config().code_span.clone())
        .with_context(|| format!("Failed to open template {}", template.display()))?;
    let host = HostGuard::new(host);

    let names = host
        .styles()
        .paragraph_style_names()
        .map(str::to_string)
        .collect();
    Ok(names)
}
