//! Prompt construction.

use reelint_core::{AnalysisRequest, Category, VideoFormat};

fn format_label(format: VideoFormat) -> &'static str {
    match format {
        VideoFormat::TalkingHead => "talking-head (a person speaking to camera)",
        VideoFormat::Gameplay => "gameplay (captured game footage)",
        VideoFormat::Demo => "product or screen demo",
        VideoFormat::Other => "general",
    }
}

/// Builds the instruction sent alongside the video for a lint run.
pub fn analysis_prompt(request: &AnalysisRequest) -> String {
    let mut prompt = format!(
        "You are an experienced short-form video editor reviewing a {} video.\n\
         Watch the whole video and check it against each rule below.\n\n\
         Rules:\n",
        format_label(request.format)
    );

    for rule in &request.rules {
        prompt.push_str(&format!(
            "- {} [{}, {}]: {} {}\n",
            rule.id, rule.severity, rule.category, rule.title, rule.description
        ));
    }

    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    prompt.push_str(&format!(
        "\nReport only rules that the video actually violates. You may also report other \
         clear problems that no rule covers; leave rule_id null for those and pick a \
         category from: {}.\n\
         Severity must be one of: critical, moderate, minor.\n\
         Evidence should point at the moment in the video, e.g. \"0:03-0:07\".\n\n\
         Respond with JSON only, in this shape:\n\
         {{\"findings\": [{{\"rule_id\": \"weak_hook\", \"message\": \"...\", \
         \"evidence\": \"0:00-0:03\", \"severity\": \"critical\", \"category\": \"hook_strength\"}}]}}\n\
         Return {{\"findings\": []}} if nothing is wrong.\n",
        categories.join(", ")
    ));

    prompt
}

/// Builds the instruction for format classification.
pub fn classification_prompt() -> String {
    let formats: Vec<String> = VideoFormat::ALL
        .iter()
        .map(|f| format!("- {}: {}", f.as_str(), format_label(*f)))
        .collect();

    format!(
        "Classify this short-form video into exactly one format:\n{}\n\n\
         Respond with JSON only: {{\"format\": \"<one of the names above>\"}}\n",
        formats.join("\n")
    )
}
