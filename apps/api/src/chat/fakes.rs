//! In-memory stand-ins for the external translation and generation services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::chat::orchestrator::ChatSettings;
use crate::config::MatchSettings;
use crate::inference::{GenerationError, SamplingParams, TextGenerator};
use crate::models::chat::ChatMessage;
use crate::models::resume::ResumeExample;
use crate::resume_examples::matcher::ResumeMatcher;
use crate::translation::{TranslationError, Translator};

/// Leaves working-language text as is and prefixes anything else with its target code.
#[derive(Default)]
pub struct FakeTranslator {
    fail_for: Option<&'static str>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeTranslator {
    pub fn failing_for(target_lang: &'static str) -> Self {
        Self {
            fail_for: Some(target_lang),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target_lang.to_string()));

        if self.fail_for == Some(target_lang) {
            return Err(TranslationError::Api {
                status: 456,
                message: "Quota exceeded".to_string(),
            });
        }

        Ok(match target_lang {
            "EN" => text.to_string(),
            other => format!("{other}: {text}"),
        })
    }
}

/// Returns a canned reply, or a poll timeout when built with `timing_out`.
pub struct FakeGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        _params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();

        self.reply
            .clone()
            .ok_or(GenerationError::Timeout { attempts: 60 })
    }
}

pub fn test_matcher() -> ResumeMatcher {
    let example = |filename: &str, title: &str, role: &str, tech: &[&str], level: &str| {
        ResumeExample {
            filename: filename.to_string(),
            title: title.to_string(),
            role: role.to_string(),
            tech: tech.iter().map(|t| t.to_string()).collect(),
            level: level.to_string(),
            domain: vec![],
        }
    };

    ResumeMatcher::new(
        vec![
            example(
                "frontend_junior.pdf",
                "Junior Frontend Developer",
                "Frontend Developer",
                &["React"],
                "Junior",
            ),
            example(
                "qa_middle.pdf",
                "Middle QA Engineer",
                "QA Engineer",
                &["Selenium"],
                "Middle",
            ),
        ],
        MatchSettings::default(),
    )
}

pub fn test_settings() -> ChatSettings {
    ChatSettings {
        working_lang: "EN".to_string(),
        display_lang: "UK".to_string(),
        sampling: SamplingParams::new(500, 0.3),
        output_cleanup: true,
        example_url_base: "https://storage.example.com/cv".to_string(),
    }
}
