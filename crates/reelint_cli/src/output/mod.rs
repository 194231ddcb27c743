//! Output formatting module

mod json;
mod text;

use miette::Result;
use reelint_core::{LintResult, VideoSource};

use crate::cli::OutputFormat;

pub fn output_result(
    source: &VideoSource,
    result: &LintResult,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => json::output_json(source, result)?,
        OutputFormat::Text => text::output_text(source, result),
    }
    Ok(())
}
