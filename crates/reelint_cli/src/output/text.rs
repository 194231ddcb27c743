//! Text output formatter

use reelint_core::{Category, LintResult, Severity, VideoSource};

fn category_label(category: Category) -> &'static str {
    match category {
        Category::HookStrength => "Hook",
        Category::StructurePacing => "Structure & pacing",
        Category::DeliveryPerformance => "Delivery",
        Category::ValueClarity => "Value & clarity",
    }
}

pub fn output_text(source: &VideoSource, result: &LintResult) {
    print!("{}", render_text(source, result));
}

pub(crate) fn render_text(source: &VideoSource, result: &LintResult) -> String {
    let mut out = format!("\n{} ({}):\n", source, result.format);

    if result.violations.is_empty() {
        out.push_str("  no issues found\n");
    }

    for v in &result.violations {
        let evidence = if v.evidence.is_empty() {
            String::new()
        } else {
            format!(" @ {}", v.evidence)
        };
        out.push_str(&format!(
            "  {:<8} [{}]{}: {}",
            v.severity.as_str(),
            v.issue_key,
            evidence,
            v.message
        ));
        if v.is_overridden() {
            out.push_str(&format!(" (was {})", v.original_severity));
        }
        out.push('\n');
    }

    out.push_str("\nScores:\n");
    for category in Category::ALL {
        out.push_str(&format!(
            "  {:<20} {:>3}\n",
            category_label(category),
            result.scores.category(category)
        ));
    }
    out.push_str(&format!("  {:<20} {:>3}\n", "Overall", result.scores.overall));

    out.push_str(&format!(
        "\nFound {} issues ({} critical, {} moderate, {} minor, {} ignored)\n",
        result.violations.len(),
        result.count(Severity::Critical),
        result.count(Severity::Moderate),
        result.count(Severity::Minor),
        result.count(Severity::Ignored),
    ));
    if result.dropped_findings > 0 {
        out.push_str(&format!(
            "Skipped {} malformed finding(s) from the analyzer\n",
            result.dropped_findings
        ));
    }

    out
}
