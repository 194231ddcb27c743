//! Prefs command implementation

use miette::{IntoDiagnostic, Result, miette};
use tracing::info;

use reelint_core::preferences::{reset, vote_less_severe, vote_more_severe};
use reelint_core::{
    IssueKey, JsonFilePreferenceStore, LinterConfig, PreferenceStore, PreferenceUpdate, RuleSet,
    Severity, VideoFormat,
};

use crate::cli::{Cli, PrefsArgs, PrefsCommands};
use crate::utils::create_tokio_runtime;

pub fn run_prefs(cli: &Cli, command: &PrefsCommands) -> Result<()> {
    let runtime = create_tokio_runtime()?;

    match command {
        PrefsCommands::List { store } => {
            let prefs = runtime
                .block_on(open(store).get_preferences(&store.user))
                .into_diagnostic()?;

            if prefs.is_empty() {
                println!("No preferences for {}", store.user);
                return Ok(());
            }

            let mut entries: Vec<_> = prefs.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, pref) in entries {
                println!(
                    "{:<24} {:<8} (was {})",
                    key.as_str(),
                    pref.severity.as_str(),
                    pref.original_severity
                );
            }
        }
        PrefsCommands::Set {
            issue_key,
            severity,
            original,
            store,
        } => {
            let original = match original {
                Some(original) => original.clone(),
                None => baseline(cli, issue_key, None, "--original")?.to_string(),
            };
            let update =
                PreferenceUpdate::from_raw(issue_key, severity, &original).into_diagnostic()?;
            let stored = runtime
                .block_on(open(store).upsert_preference(&store.user, update))
                .into_diagnostic()?;
            report(issue_key, stored.severity, stored.original_severity);
        }
        PrefsCommands::Up {
            issue_key,
            from,
            store,
        } => {
            let baseline = baseline(cli, issue_key, from.as_deref(), "--from")?;
            let stored = runtime
                .block_on(vote_more_severe(
                    &open(store),
                    &store.user,
                    &IssueKey::from(issue_key.as_str()),
                    baseline,
                ))
                .into_diagnostic()?;
            report(issue_key, stored.severity, stored.original_severity);
        }
        PrefsCommands::Down {
            issue_key,
            from,
            store,
        } => {
            let baseline = baseline(cli, issue_key, from.as_deref(), "--from")?;
            let stored = runtime
                .block_on(vote_less_severe(
                    &open(store),
                    &store.user,
                    &IssueKey::from(issue_key.as_str()),
                    baseline,
                ))
                .into_diagnostic()?;
            report(issue_key, stored.severity, stored.original_severity);
        }
        PrefsCommands::Reset { issue_key, store } => {
            let removed = runtime
                .block_on(reset(
                    &open(store),
                    &store.user,
                    &IssueKey::from(issue_key.as_str()),
                ))
                .into_diagnostic()?;
            if removed {
                println!("{}: reset", issue_key);
            } else {
                println!("{}: no preference stored", issue_key);
            }
        }
    }

    Ok(())
}

fn open(args: &PrefsArgs) -> JsonFilePreferenceStore {
    info!("Using preferences: {}", args.prefs.display());
    JsonFilePreferenceStore::new(&args.prefs)
}

fn report(issue_key: &str, severity: Severity, original: Severity) {
    println!("{}: {} (was {})", issue_key, severity, original);
}

/// Severity of the issue without any override.
///
/// An explicit severity wins; otherwise the issue key must name a configured
/// rule. `flag` names the option that supplies the explicit value.
fn baseline(cli: &Cli, issue_key: &str, given: Option<&str>, flag: &str) -> Result<Severity> {
    if let Some(given) = given {
        return given.parse::<Severity>().into_diagnostic();
    }

    let config = super::load_config(cli)?;
    rule_baseline(&config, issue_key)?.ok_or_else(|| {
        miette!(
            "'{}' is not a known rule; pass {} <severity> with its current severity",
            issue_key,
            flag
        )
    })
}

fn rule_baseline(config: &LinterConfig, issue_key: &str) -> Result<Option<Severity>> {
    for format in VideoFormat::ALL {
        let set = RuleSet::for_format(format, &config.rules).into_diagnostic()?;
        if let Some(rule) = set.get(issue_key) {
            return Ok(Some(rule.severity));
        }
    }
    Ok(None)
}
