//! Command-line interface definitions for mdocx

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the mdocx application
#[derive(Parser)]
#[command(name = "mdocx")]
#[command(version)]
#[command(about = "Convert markdown into styled Word documents", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub logging: LoggingArgs,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Logging flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct LoggingArgs {
    /// Verbose output (info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug output, per paragraph and span
    #[arg(long, global = true)]
    pub debug: bool,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Available subcommands for mdocx
#[derive(Subcommand)]
pub enum Commands {
    /// Convert markdown files into documents based on a template
    Convert {
        /// Word template (.dotx, .dotm or .docx)
        #[arg(short, long)]
        template: PathBuf,

        /// Markdown files, or directories searched for *.md files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory receiving the generated documents
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Configuration file (defaults to ./mdocx.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the paragraphs a markdown file would produce, without writing anything
    Preview {
        /// Markdown file
        input: PathBuf,

        /// Template whose styles are used for resolution
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Configuration file (defaults to ./mdocx.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the paragraph styles a template defines
    Styles {
        /// Word template (.dotx, .dotm or .docx)
        template: PathBuf,
    },

    /// Write a starter template defining every `{Base} {level}` style
    InitTemplate {
        /// Output .docx path
        #[arg(default_value = "template.docx")]
        output: PathBuf,

        /// Configuration file providing the base style names
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from([
            "mdocx", "convert", "-t", "t.dotx", "a.md", "docs", "--debug",
        ]);

        assert!(cli.logging.debug);
        match cli.command {
            Commands::Convert {
                template,
                inputs,
                output_dir,
                config,
            } => {
                assert_eq!(template, PathBuf::from("t.dotx"));
                assert_eq!(inputs, vec![PathBuf::from("a.md"), PathBuf::from("docs")]);
                assert_eq!(output_dir, PathBuf::from("output"));
                assert!(config.is_none());
            }
            _ => panic!("expected convert"),
        }
    }
}
