//! Starter template generation
//!
//! Writes a plain .docx whose paragraph styles follow the `{Base} {level}`
//! naming the style resolver looks for, so a fresh project converts without
//! any style falling back to `Normal`.

use crate::host::HostError;
use crate::markdown::MAX_HEADING_LEVEL;
use crate::styles::StyleTypeTable;
use docx_rs::{Docx, Paragraph, Run, RunFonts, Style, StyleType};
use std::path::Path;

/// Heading sizes in points, by level 0..=9
const HEADING_SIZES: [usize; 10] = [20, 16, 14, 13, 12, 11, 10, 10, 10, 10];

const BODY_SIZE: usize = 11;
const CODE_SIZE: usize = 9;
const CODE_FONT: &str = "Consolas";

/// Build the starter document with one style per base and level
pub fn build_starter_template(table: &StyleTypeTable) -> Docx {
    let mut docx = Docx::new();

    for level in 0..=MAX_HEADING_LEVEL {
        let idx = usize::from(level);

        docx = docx
            .add_style(
                paragraph_style(&table.heading, level)
                    .bold()
                    .size(HEADING_SIZES[idx] * 2), // docx-rs uses half-points
            )
            .add_style(paragraph_style(&table.body, level).size(BODY_SIZE * 2))
            .add_style(paragraph_style(&table.bullet, level).size(BODY_SIZE * 2))
            .add_style(paragraph_style(&table.numbered, level).size(BODY_SIZE * 2))
            .add_style(
                paragraph_style(&table.blockquote, level)
                    .italic()
                    .size(BODY_SIZE * 2),
            )
            .add_style(
                paragraph_style(&table.code, level)
                    .size(CODE_SIZE * 2)
                    .fonts(RunFonts::new().ascii(CODE_FONT).hi_ansi(CODE_FONT)),
            );
    }

    let intro = format!("{} 0", table.body);
    docx.add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text("Starter template. Content is replaced on conversion."))
            .style(&style_id(&intro)),
    )
}

/// Write the starter template to `output_path`
///
/// # Parameters
/// * `output_path` - Destination .docx (parent directories are created)
/// * `table` - Base style names to define
pub fn write_starter_template(output_path: &Path, table: &StyleTypeTable) -> Result<(), HostError> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log::info!("Writing starter template to {}", output_path.display());
    let file = std::fs::File::create(output_path)?;
    build_starter_template(table)
        .build()
        .pack(file)
        .map_err(|e| HostError::Format(format!("Failed to write DOCX: {}", e)))?;

    Ok(())
}

fn paragraph_style(base: &str, level: u8) -> Style {
    let name = format!("{} {}", base, level);
    Style::new(&style_id(&name), StyleType::Paragraph).name(&name)
}

/// Word style ids carry no whitespace
fn style_id(name: &str) -> String {
    name.split_whitespace().collect()
}
