//! Gemini API client.
//!
//! Remote URLs are handed to the model directly. Local files go through the
//! Files API first: upload, then poll until the file is `ACTIVE`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reelint_core::{
    AnalysisRequest, Analyzer, AnalyzerConfig, AnalyzerError, FormatClassifier, RawFinding,
    VideoFormat, VideoSource,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::GeminiError;
use crate::prompt::{analysis_prompt, classification_prompt};
use crate::response::{GenerateContentResponse, parse_findings, parse_format};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default timeout for a single HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default number of upload state polls.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;

/// Default delay between upload state polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Video analyzer backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    poll_attempts: u32,
    poll_interval: Duration,
}

/// Builder for GeminiAnalyzer.
#[derive(Debug)]
pub struct GeminiAnalyzerBuilder {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl GeminiAnalyzer {
    /// Create a new builder for GeminiAnalyzer.
    pub fn builder() -> GeminiAnalyzerBuilder {
        GeminiAnalyzerBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Builds an analyzer from config, reading the key from `api_key_env`.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, GeminiError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeminiError::MissingApiKey(config.api_key_env.clone()))?;

        Self::builder()
            .base_url(&config.base_url)
            .api_key(api_key)
            .model(&config.model)
            .timeout(config.timeout())
            .poll_attempts(config.poll_attempts)
            .poll_interval(config.poll_interval())
            .build()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Resolves a source into a `file_data` part the model can read.
    async fn file_part(&self, source: &VideoSource) -> Result<FileData, GeminiError> {
        match source {
            VideoSource::Url(url) => Ok(FileData {
                mime_type: None,
                file_uri: url.clone(),
            }),
            VideoSource::File(path) => {
                let uploaded = self.upload(path).await?;
                let active = self.wait_until_active(uploaded).await?;
                Ok(FileData {
                    mime_type: active.mime_type.or_else(|| Some(mime_type_for(path).to_string())),
                    file_uri: active.uri,
                })
            }
        }
    }

    async fn upload(&self, path: &Path) -> Result<RemoteFile, GeminiError> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_type_for(path);
        info!(
            "Uploading {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime_type
        );

        let response = self
            .client
            .post(self.url("upload/v1beta/files"))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "raw")
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await?;

        let uploaded: UploadResponse = Self::parse_response(response).await?;
        debug!("Uploaded as {} ({:?})", uploaded.file.name, uploaded.file.state);
        Ok(uploaded.file)
    }

    async fn wait_until_active(&self, mut file: RemoteFile) -> Result<RemoteFile, GeminiError> {
        for attempt in 0..self.poll_attempts {
            match file.state {
                FileState::Active => return Ok(file),
                FileState::Failed => return Err(GeminiError::ProcessingFailed(file.name)),
                _ => {}
            }

            if attempt > 0 {
                tokio::time::sleep(self.poll_interval).await;
            }
            debug!("Polling {} (attempt {})", file.name, attempt + 1);

            let response = self
                .client
                .get(self.url(&format!("v1beta/{}", file.name)))
                .header("x-goog-api-key", &self.api_key)
                .send()
                .await?;
            file = Self::parse_response(response).await?;
        }

        match file.state {
            FileState::Active => Ok(file),
            FileState::Failed => Err(GeminiError::ProcessingFailed(file.name)),
            _ => Err(GeminiError::PollExhausted {
                name: file.name,
                attempts: self.poll_attempts,
            }),
        }
    }

    async fn generate(&self, file: FileData, prompt: String) -> Result<String, GeminiError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::FileData { file_data: file },
                    RequestPart::Text { text: prompt },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.2,
            },
        };

        let response = self
            .client
            .post(self.url(&format!("v1beta/models/{}:generateContent", self.model)))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateContentResponse = Self::parse_response(response).await?;
        parsed.into_text()
    }

    /// Runs a full analysis and returns the raw findings.
    pub async fn analyze_video(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Vec<RawFinding>, GeminiError> {
        let file = self.file_part(&request.source).await?;
        let text = self.generate(file, analysis_prompt(request)).await?;
        let findings = parse_findings(&text)?;
        debug!("Model returned {} finding(s)", findings.len());
        Ok(findings)
    }

    /// Asks the model which format a video is.
    pub async fn classify_video(&self, source: &VideoSource) -> Result<VideoFormat, GeminiError> {
        let file = self.file_part(source).await?;
        let text = self.generate(file, classification_prompt()).await?;
        parse_format(&text)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GeminiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeminiError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Vec<RawFinding>, AnalyzerError> {
        Ok(self.analyze_video(request).await?)
    }
}

#[async_trait]
impl FormatClassifier for GeminiAnalyzer {
    async fn classify(&self, source: &VideoSource) -> Result<VideoFormat, AnalyzerError> {
        Ok(self.classify_video(source).await?)
    }
}

impl GeminiAnalyzerBuilder {
    /// Set the API endpoint (scheme and host, optionally a path prefix).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set timeout for HTTP requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how often upload state is polled before giving up.
    pub fn poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = attempts;
        self
    }

    /// Set the delay between upload state polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build the GeminiAnalyzer.
    pub fn build(self) -> Result<GeminiAnalyzer, GeminiError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeminiError::MissingApiKey("GEMINI_API_KEY".to_string()))?;

        let parsed = Url::parse(&self.base_url)
            .map_err(|e| GeminiError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GeminiError::InvalidBaseUrl(self.base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GeminiError::ClientBuildError(e.to_string()))?;

        Ok(GeminiAnalyzer {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: self.model,
            poll_attempts: self.poll_attempts.max(1),
            poll_interval: self.poll_interval,
        })
    }
}

/// MIME type guessed from the file extension.
fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("mpeg" | "mpg") => "video/mpeg",
        Some("3gp") => "video/3gpp",
        _ => "video/mp4",
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: FileState,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    FileData { file_data: FileData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}
