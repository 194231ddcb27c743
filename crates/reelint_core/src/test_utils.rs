use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::AnalyzerError;
use crate::analyzer::{AnalysisRequest, Analyzer, RawFinding};

/// Analyzer returning a canned response and recording every request.
pub struct MockAnalyzer {
    response: Result<Vec<RawFinding>, AnalyzerError>,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl MockAnalyzer {
    pub fn with_findings(findings: Vec<RawFinding>) -> Self {
        Self {
            response: Ok(findings),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AnalyzerError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Vec<RawFinding>, AnalyzerError> {
        self.requests.lock().push(request.clone());
        self.response.clone()
    }
}

/// Analyzer that never answers before `delay` has passed.
pub struct SlowAnalyzer {
    delay: Duration,
}

impl SlowAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Analyzer for SlowAnalyzer {
    async fn analyze(&self, _: &AnalysisRequest) -> Result<Vec<RawFinding>, AnalyzerError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}
