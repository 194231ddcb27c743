//! JSON output formatter

use miette::{IntoDiagnostic, Result};
use reelint_core::{LintResult, VideoSource};

pub fn output_json(source: &VideoSource, result: &LintResult) -> Result<()> {
    let mut output = serde_json::to_value(result).into_diagnostic()?;
    if let Some(map) = output.as_object_mut() {
        map.insert(
            "source".to_string(),
            serde_json::Value::String(source.to_string()),
        );
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
