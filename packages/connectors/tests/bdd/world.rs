//! World struct for Cucumber BDD tests
//!
//! Holds the submission under construction and the outcome of submitting it.

use cucumber::World;
use usv_connectors::{
    ConnectorRegistry, JurisdictionMode, QueryService, RenderedRequest, Submission,
    SubmissionError,
};

/// Test world that holds state across steps in a scenario.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct QueryWorld {
    pub registry: &'static ConnectorRegistry,
    pub submission: Submission,
    pub result: Option<Result<RenderedRequest, SubmissionError>>,
}

impl Default for QueryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryWorld {
    pub fn new() -> Self {
        Self {
            registry: ConnectorRegistry::builtin(),
            submission: Submission::new("", ""),
            result: None,
        }
    }

    pub fn set_mode(&mut self, mode: JurisdictionMode) {
        self.submission.mode = mode;
    }

    /// Submit the current submission and store the outcome
    pub fn submit(&mut self) {
        let service = QueryService::new(self.registry);
        self.result = Some(service.submit(&self.submission));
    }

    pub fn request(&self) -> &RenderedRequest {
        match &self.result {
            Some(Ok(request)) => request,
            Some(Err(e)) => panic!("Expected a rendered request, got error: {e}"),
            None => panic!("No submission was made"),
        }
    }

    pub fn error(&self) -> &SubmissionError {
        match &self.result {
            Some(Err(e)) => e,
            Some(Ok(request)) => panic!("Expected a failure, got request:\n{}", request.xml),
            None => panic!("No submission was made"),
        }
    }
}
