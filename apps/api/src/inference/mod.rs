//! Inference job client: submits a flattened chat prompt to an asynchronous job
//! queue and polls until the job reaches a terminal status.
//!
//! Protocol:
//!   POST {base}/run          {input: {prompt, sampling_params}} → {id}
//!   GET  {base}/status/{id}  → {status, output?}
//!
//! No retries. The poll budget (attempts × interval) and an optional overall
//! deadline bound how long a single chat turn can wait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::GenerationSettings;
use crate::inference::output::JobOutput;
use crate::inference::prompts::build_prompt;
use crate::models::chat::ChatMessage;

pub mod cleanup;
pub mod output;
pub mod prompts;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("job submission failed{}: {message}", fmt_status(.status))]
    Submission { status: Option<u16>, message: String },

    #[error("job queue did not return a job id: {0}")]
    MissingJobId(String),

    #[error("status check failed{}: {message}", fmt_status(.status))]
    Poll { status: Option<u16>, message: String },

    #[error("job {job_id} ended with status {status:?}: {details}")]
    JobFailed {
        job_id: String,
        status: JobStatus,
        details: String,
    },

    #[error("job completed but no usable text in output: {0}")]
    EmptyOutput(String),

    #[error("job did not finish after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("job did not finish within {}s", .deadline.as_secs_f32())]
    DeadlineExceeded { deadline: Duration },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Wire status of a queued job. Unrecognised values are treated as still pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    InQueue,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
    #[default]
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Terminal statuses that carry no result.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            JobStatus::Failed | JobStatus::Cancelled | JobStatus::TimedOut
        )
    }
}

/// Sampling parameters sent with every job. `top_p` and the penalties are fixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl SamplingParams {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    input: RunInput<'a>,
}

#[derive(Debug, Serialize)]
struct RunInput<'a> {
    prompt: &'a str,
    sampling_params: &'a SamplingParams,
}

/// One status snapshot of a job.
#[derive(Debug, Deserialize)]
pub struct InferenceJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub output: Option<JobOutput>,
}

/// How long to wait for a submitted job.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub deadline: Option<Duration>,
}

impl From<&GenerationSettings> for PollPolicy {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            interval: settings.poll_interval,
            max_attempts: settings.poll_max_attempts,
            deadline: settings.deadline,
        }
    }
}

/// Seam between the chat pipeline and the text generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a reply to the conversation; returns trimmed, non-empty text.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    base_url: String,
    api_key: String,
    poll: PollPolicy,
}

impl InferenceClient {
    pub fn new(client: Client, base_url: String, api_key: String, poll: PollPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            poll,
        }
    }

    /// Submits the prompt and returns the job id assigned by the queue.
    pub async fn submit(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        let body = RunRequest {
            input: RunInput {
                prompt,
                sampling_params: params,
            },
        };

        let response = self
            .client
            .post(format!("{}/run", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Submission {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Submission {
                status: Some(status.as_u16()),
                message: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(GenerationError::Submission {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        serde_json::from_str::<InferenceJob>(&text)
            .ok()
            .and_then(|job| job.id)
            .filter(|id| !id.is_empty())
            .ok_or(GenerationError::MissingJobId(text))
    }

    /// Fetches the current status of a job. Returns the parsed snapshot and the raw body.
    pub async fn check_status(
        &self,
        job_id: &str,
    ) -> Result<(InferenceJob, String), GenerationError> {
        let poll_error = |status: Option<u16>, message: String| GenerationError::Poll {
            status,
            message,
        };

        let response = self
            .client
            .get(format!("{}/status/{job_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| poll_error(None, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| poll_error(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(poll_error(Some(status.as_u16()), text));
        }

        let job = serde_json::from_str::<InferenceJob>(&text)
            .map_err(|e| poll_error(Some(status.as_u16()), format!("{e}: {text}")))?;

        Ok((job, text))
    }

    /// Polls until the job completes, fails, or the attempt budget runs out.
    /// Never polls more than `max_attempts` times.
    async fn wait_for_completion(&self, job_id: &str) -> Result<String, GenerationError> {
        let max_attempts = self.poll.max_attempts;

        for attempt in 1..=max_attempts {
            let (job, raw) = self.check_status(job_id).await?;

            match job.status {
                JobStatus::Completed => {
                    let text = job.output.as_ref().map(JobOutput::text).unwrap_or_default();
                    let text = text.trim();
                    if text.is_empty() {
                        return Err(GenerationError::EmptyOutput(raw));
                    }
                    info!("Job {job_id} completed after {attempt} status checks");
                    return Ok(text.to_string());
                }
                status if status.is_failure() => {
                    warn!("Job {job_id} ended with status {status:?}");
                    return Err(GenerationError::JobFailed {
                        job_id: job_id.to_string(),
                        status,
                        details: raw,
                    });
                }
                status => {
                    debug!("Job {job_id} status {status:?} ({attempt}/{max_attempts})");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.poll.interval).await;
                    }
                }
            }
        }

        Err(GenerationError::Timeout {
            attempts: max_attempts,
        })
    }
}

#[async_trait]
impl TextGenerator for InferenceClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(messages);
        debug!(
            "Submitting prompt ({} chars, {} turns)",
            prompt.chars().count(),
            messages.len()
        );

        let job_id = self.submit(&prompt, params).await?;
        info!("Job submitted. ID: {job_id}");

        match self.poll.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.wait_for_completion(&job_id))
                .await
                .map_err(|_| GenerationError::DeadlineExceeded { deadline })?,
            None => self.wait_for_completion(&job_id).await,
        }
    }
}
