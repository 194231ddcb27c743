//! Lint command implementation

use std::path::Path;
use std::sync::Arc;

use miette::{IntoDiagnostic, Result};
use tracing::{info, warn};

use reelint_analyzer::GeminiAnalyzer;
use reelint_core::{
    AnalysisCache, Analyzer, CachedAnalyzer, FormatClassifier, JsonFilePreferenceStore, Linter,
    PreferenceMap, PreferenceStore, VideoFormat, VideoSource,
};

use crate::cli::{Cli, OutputFormat};
use crate::output::output_result;
use crate::utils::create_tokio_runtime;

pub struct LintArgs<'a> {
    pub source: &'a str,
    pub format: &'a str,
    pub user: Option<&'a str>,
    pub prefs: &'a Path,
    pub output: OutputFormat,
    pub no_cache: bool,
}

pub fn run_lint(cli: &Cli, args: &LintArgs<'_>) -> Result<bool> {
    // Reject a bad format before anything touches the network.
    let requested = match args.format {
        "auto" => None,
        name => Some(name.parse::<VideoFormat>().into_diagnostic()?),
    };

    let config = super::load_config(cli)?;
    let source = VideoSource::parse(args.source);
    let gemini = GeminiAnalyzer::from_config(&config.analyzer).into_diagnostic()?;
    let runtime = create_tokio_runtime()?;

    let format = match requested {
        Some(format) => format,
        None => runtime.block_on(classify_or_fallback(&gemini, &source)),
    };

    let preferences = match args.user {
        Some(user) => {
            let store = JsonFilePreferenceStore::new(args.prefs);
            runtime
                .block_on(store.get_preferences(user))
                .into_diagnostic()?
        }
        None => PreferenceMap::new(),
    };

    let analyzer: Arc<dyn Analyzer> = if config.cache.enabled && !args.no_cache {
        Arc::new(CachedAnalyzer::new(
            gemini,
            AnalysisCache::from_config(&config.cache),
        ))
    } else {
        Arc::new(gemini)
    };

    let linter = Linter::new(config, analyzer).into_diagnostic()?;
    let result = runtime
        .block_on(linter.lint_format(&source, format, &preferences))
        .into_diagnostic()?;

    output_result(&source, &result, args.output)?;

    Ok(result.has_critical())
}

/// Classifies the video, falling back to `other` when classification fails.
async fn classify_or_fallback<C: FormatClassifier>(
    classifier: &C,
    source: &VideoSource,
) -> VideoFormat {
    match classifier.classify(source).await {
        Ok(format) => {
            info!("Detected format: {}", format);
            format
        }
        Err(e) => {
            warn!("Format detection failed ({}); using {}", e, VideoFormat::Other);
            VideoFormat::Other
        }
    }
}
