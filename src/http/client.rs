use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use crate::http::command::{CurlCommand, DEFAULT_PROGRAM};
use crate::http::normalize::normalize;
use crate::http::response::NormalizedResponse;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Default bound for ordinary requests. Downloads have none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Something that can run a [`CurlCommand`] and hand back a normalized result.
pub trait Transport {
    fn execute(&self, command: &CurlCommand) -> impl Future<Output = NormalizedResponse> + Send;
}

/// Runs curl as a child process.
#[derive(Debug, Clone)]
pub struct CurlClient {
    program: String,
    timeout: Duration,
    retries: u32,
    download_dir: Option<PathBuf>,
}

impl Default for CurlClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CurlClient {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
            download_dir: None,
        }
    }

    /// Binary to run. Overrides the program recorded in the command.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra attempts after a timeout or a failed spawn. Zero by default.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Working directory for downloads, the current one when unset.
    pub fn with_download_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.download_dir = dir;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run_once(&self, command: &CurlCommand) -> NormalizedResponse {
        let mut cmd = Command::new(&self.program);
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if command.is_download()
            && let Some(dir) = &self.download_dir
        {
            cmd.current_dir(dir);
        }

        info!("Sending command");
        let output = if command.is_download() {
            cmd.output().await
        } else {
            match tokio::time::timeout(self.timeout, cmd.output()).await {
                Ok(output) => output,
                Err(_) => {
                    error!("Command timed out after {:?}", self.timeout);
                    return NormalizedResponse::TimedOut;
                }
            }
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to run {}: {}", self.program, e);
                return NormalizedResponse::NoData;
            }
        };

        if !output.status.success() {
            warn!("{} exited with {}", self.program, output.status);
        }

        let raw = select_output(output.stdout, output.stderr);
        let response = normalize(raw);
        debug!("Server response: {:?}", response);
        response
    }
}

/// stdout wins when both streams have data; stderr is only diagnostics then.
pub fn select_output(stdout: Vec<u8>, stderr: Vec<u8>) -> Vec<u8> {
    match (stdout.is_empty(), stderr.is_empty()) {
        (false, _) => stdout,
        (true, false) => stderr,
        (true, true) => Vec::new(),
    }
}

impl Transport for CurlClient {
    async fn execute(&self, command: &CurlCommand) -> NormalizedResponse {
        let mut response = self.run_once(command).await;
        let mut attempt = 0;
        while attempt < self.retries && (response.is_timeout() || response.is_no_data()) {
            attempt += 1;
            warn!("Retrying command (attempt {} of {})", attempt, self.retries);
            response = self.run_once(command).await;
        }
        response
    }
}
