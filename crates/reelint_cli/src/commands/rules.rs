//! Rules command implementation

use miette::{IntoDiagnostic, Result};
use serde_json::json;

use reelint_core::{RuleSet, VideoFormat, rules_for};

use crate::cli::{Cli, OutputFormat};

pub fn run_rules(cli: &Cli, format: Option<&str>, output: OutputFormat) -> Result<()> {
    let formats = match format {
        Some(name) => vec![name.parse::<VideoFormat>().into_diagnostic()?],
        None => VideoFormat::ALL.to_vec(),
    };

    let config = super::load_config(cli)?;
    let sets = formats
        .into_iter()
        .map(|f| RuleSet::for_format(f, &config.rules))
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()?;

    match output {
        OutputFormat::Text => print_text(&sets),
        OutputFormat::Json => print_json(&sets)?,
    }
    Ok(())
}

fn print_text(sets: &[RuleSet]) {
    for set in sets {
        let catalog = rules_for(set.format());
        println!("\n{} ({} of {} rules active):", set.format(), set.len(), catalog.len());

        for rule in catalog {
            let severity = match set.get(rule.id) {
                Some(active) => active.severity.as_str(),
                None => "off",
            };
            println!(
                "  {:<24} {:<8} {:<20} {}",
                rule.id,
                severity,
                rule.category.as_str(),
                rule.title
            );
        }
    }
}

fn print_json(sets: &[RuleSet]) -> Result<()> {
    let output: Vec<_> = sets
        .iter()
        .flat_map(|set| {
            rules_for(set.format()).iter().map(move |rule| {
                let active = set.get(rule.id);
                json!({
                    "format": set.format(),
                    "id": rule.id,
                    "title": rule.title,
                    "description": rule.description,
                    "category": rule.category,
                    "severity": active.map_or(rule.severity, |r| r.severity),
                    "enabled": active.is_some(),
                })
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
