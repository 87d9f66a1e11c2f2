//! Chat turn orchestration.
//!
//! Flow: validate → translate_inbound → { match_example | generate → cleanup → translate_outbound }.
//!
//! Every downstream step assumes working-language input, so inbound translation always
//! runs first. Each failure is terminal for the turn and keeps its stage in the error.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::chat::replies::{EXAMPLE_FOUND_REPLY, EXAMPLE_NOT_FOUND_REPLY};
use crate::config::Config;
use crate::errors::{AppError, TranslationStage};
use crate::inference::cleanup::clean_generation_output;
use crate::inference::{GenerationError, SamplingParams, TextGenerator};
use crate::models::chat::{ChatMessage, Role};
use crate::models::resume::ResumeExample;
use crate::resume_examples::matcher::ResumeMatcher;
use crate::translation::Translator;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// When set, look up a resume example instead of generating a reply.
    #[serde(default)]
    pub include_example: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_url: Option<String>,
}

impl ChatResponse {
    fn text(response: String) -> Self {
        Self {
            response,
            example_filename: None,
            example_title: None,
            example_url: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub working_lang: String,
    pub display_lang: String,
    pub sampling: SamplingParams,
    pub output_cleanup: bool,
    /// Object storage prefix that example filenames are appended to.
    pub example_url_base: String,
}

impl From<&Config> for ChatSettings {
    fn from(config: &Config) -> Self {
        Self {
            working_lang: config.working_lang.clone(),
            display_lang: config.display_lang.clone(),
            sampling: SamplingParams::new(
                config.generation.max_tokens,
                config.generation.temperature,
            ),
            output_cleanup: config.generation.output_cleanup,
            example_url_base: config.example_url_base.clone(),
        }
    }
}

impl ChatSettings {
    fn example_url(&self, filename: &str) -> String {
        format!("{}/{}", self.example_url_base.trim_end_matches('/'), filename)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

/// Runs chat turns. Built once at startup and shared by all handlers.
pub struct ChatService {
    translator: Arc<dyn Translator>,
    generator: Arc<dyn TextGenerator>,
    matcher: Arc<ResumeMatcher>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(
        translator: Arc<dyn Translator>,
        generator: Arc<dyn TextGenerator>,
        matcher: Arc<ResumeMatcher>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            translator,
            generator,
            matcher,
            settings,
        }
    }

    /// Handles one chat turn end to end.
    pub async fn run(&self, request: ChatRequest) -> Result<ChatResponse, AppError> {
        if request.messages.is_empty() {
            return Err(AppError::Validation("Empty message history".to_string()));
        }

        let span = info_span!(
            "chat_turn",
            request_id = %Uuid::new_v4(),
            turns = request.messages.len(),
            include_example = request.include_example,
        );

        self.run_turn(request).instrument(span).await
    }

    async fn run_turn(&self, request: ChatRequest) -> Result<ChatResponse, AppError> {
        // Step 1: everything downstream works in the working language
        let messages = self
            .translator
            .translate_messages(&request.messages, &self.settings.working_lang)
            .await
            .map_err(|e| AppError::translation(TranslationStage::Inbound, e))?;

        // Step 2a: example lookup replaces generation entirely
        if request.include_example {
            return self.match_example(&messages).await;
        }

        // Step 2b: generation
        let reply = self
            .generator
            .generate(&messages, &self.settings.sampling)
            .await?;

        let reply = if self.settings.output_cleanup {
            clean_generation_output(&reply)
        } else {
            reply
        };

        if reply.is_empty() {
            return Err(GenerationError::EmptyOutput("nothing left after cleanup".to_string()).into());
        }

        // Step 3: back to the display language
        let reply = self
            .translator
            .translate(&reply, &self.settings.display_lang)
            .await
            .map_err(|e| AppError::translation(TranslationStage::Outbound, e))?;

        info!("Generated reply ({} chars)", reply.chars().count());
        Ok(ChatResponse::text(reply))
    }

    async fn match_example(&self, messages: &[ChatMessage]) -> Result<ChatResponse, AppError> {
        let query = latest_user_text(messages).to_string();
        let matcher = Arc::clone(&self.matcher);

        // Scoring is CPU-bound and grows with query length; keep it off the async workers.
        let (example, score) = tokio::task::spawn_blocking(move || {
            let result = matcher.find_best_match(&query);
            (result.example.cloned(), result.score)
        })
        .await
        .context("resume matcher task failed")?;

        let response = match example {
            Some(example) => {
                info!(
                    "Matched resume example {} (score {:.1})",
                    example.filename, score
                );
                self.example_response(&example)
            }
            None => {
                info!("No resume example above threshold (best {score:.1})");
                ChatResponse::text(EXAMPLE_NOT_FOUND_REPLY.to_string())
            }
        };
        Ok(response)
    }

    fn example_response(&self, example: &ResumeExample) -> ChatResponse {
        ChatResponse {
            response: EXAMPLE_FOUND_REPLY.to_string(),
            example_filename: Some(example.filename.clone()),
            example_title: Some(example.title.clone()),
            example_url: Some(self.settings.example_url(&example.filename)),
        }
    }
}

/// Most recent user turn, falling back to the most recent message of any role.
fn latest_user_text(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .or_else(|| messages.last())
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
