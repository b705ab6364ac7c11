//! Scripted collaborators for workflow unit tests.

use crate::Result;
use crate::http::{CurlCommand, NormalizedResponse, Transport};
use crate::workflow::captcha::CaptchaSolver;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order, `NoData` once they run out.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<NormalizedResponse>>,
    sent: Mutex<Vec<CurlCommand>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<NormalizedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<CurlCommand> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, command: &CurlCommand) -> NormalizedResponse {
        self.sent.lock().unwrap().push(command.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(NormalizedResponse::NoData)
    }
}

/// Always answers with the same code and remembers the images it was shown.
pub struct FixedSolver {
    code: String,
    seen: Mutex<Vec<String>>,
}

impl FixedSolver {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl CaptchaSolver for FixedSolver {
    async fn solve(&self, image_url: &str) -> Result<String> {
        self.seen.lock().unwrap().push(image_url.to_string());
        Ok(self.code.clone())
    }
}
