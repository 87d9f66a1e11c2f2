//! Translation client: converts chat text between the display and working languages.
//!
//! The source language is auto-detected by the remote service; callers only name the
//! target. No retries: a failed call fails the whole chat turn.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::chat::ChatMessage;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no translation")]
    MissingTranslation,
}

/// Seam between the chat pipeline and the translation provider.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError>;

    /// Translates each message's content, keeping roles, order and count.
    async fn translate_messages(
        &self,
        messages: &[ChatMessage],
        target_lang: &str,
    ) -> Result<Vec<ChatMessage>, TranslationError> {
        let mut translated = Vec::with_capacity(messages.len());
        for message in messages {
            let content = self.translate(&message.content, target_lang).await?;
            translated.push(message.with_content(content));
        }
        Ok(translated)
    }
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// DeepL-style `/translate` endpoint authenticated with a pre-shared key form field.
#[derive(Clone)]
pub struct DeepLClient {
    client: Client,
    api_url: String,
    auth_key: String,
}

impl DeepLClient {
    pub fn new(client: Client, api_url: String, auth_key: String) -> Self {
        Self {
            client,
            api_url,
            auth_key,
        }
    }
}

#[async_trait]
impl Translator for DeepLClient {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        // Nothing to translate; skip the round trip.
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        debug!("Translating {} chars to {target_lang}", text.chars().count());

        let response = self
            .client
            .post(&self.api_url)
            .form(&[
                ("auth_key", self.auth_key.as_str()),
                ("text", text),
                ("target_lang", target_lang),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TranslationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: DeepLResponse = serde_json::from_str(&body)?;
        parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or(TranslationError::MissingTranslation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;
    use mockito::Matcher;

    async fn setup() -> (DeepLClient, mockito::ServerGuard) {
        let server = mockito::Server::new_async().await;
        let client = DeepLClient::new(
            Client::new(),
            format!("{}/v2/translate", server.url()),
            "test-key".to_string(),
        );
        (client, server)
    }

    fn translation_body(text: &str) -> String {
        serde_json::json!({ "translations": [{ "detected_source_language": "UK", "text": text }] })
            .to_string()
    }

    #[tokio::test]
    async fn test_translate_sends_form_fields() {
        let (client, mut server) = setup().await;
        let mock = server
            .mock("POST", "/v2/translate")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("auth_key".into(), "test-key".into()),
                Matcher::UrlEncoded("text".into(), "Привіт".into()),
                Matcher::UrlEncoded("target_lang".into(), "EN".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(translation_body("Hello"))
            .create_async()
            .await;

        let result = client.translate("Привіт", "EN").await.unwrap();
        assert_eq!(result, "Hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_retried() {
        let (client, mut server) = setup().await;
        let mock = server
            .mock("POST", "/v2/translate")
            .with_status(456)
            .with_body("Quota exceeded")
            .expect(1)
            .create_async()
            .await;

        let err = client.translate("Привіт", "EN").await.unwrap_err();
        match err {
            TranslationError::Api { status, message } => {
                assert_eq!(status, 456);
                assert_eq!(message, "Quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_translation_field_is_an_error() {
        let (client, mut server) = setup().await;
        let _mock = server
            .mock("POST", "/v2/translate")
            .with_status(200)
            .with_body(r#"{"translations": []}"#)
            .create_async()
            .await;

        let err = client.translate("Привіт", "EN").await.unwrap_err();
        assert!(matches!(err, TranslationError::MissingTranslation));
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_call() {
        let (client, mut server) = setup().await;
        let mock = server
            .mock("POST", "/v2/translate")
            .expect(0)
            .create_async()
            .await;

        assert_eq!(client.translate("  ", "EN").await.unwrap(), "  ");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_translate_messages_preserves_roles_and_order() {
        let (client, mut server) = setup().await;
        let mut mocks = Vec::new();
        for (source, target) in [("Привіт", "Hello"), ("Чим допомогти?", "How can I help?")] {
            let mock = server
                .mock("POST", "/v2/translate")
                .match_body(Matcher::UrlEncoded("text".into(), source.into()))
                .with_status(200)
                .with_body(translation_body(target))
                .create_async()
                .await;
            mocks.push(mock);
        }

        let history = vec![
            ChatMessage::new(Role::User, "Привіт"),
            ChatMessage::new(Role::Assistant, "Чим допомогти?"),
            ChatMessage::new(Role::User, "Привіт"),
        ];

        let translated = client.translate_messages(&history, "EN").await.unwrap();
        assert_eq!(translated.len(), history.len());
        let roles: Vec<Role> = translated.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(translated[0].content, "Hello");
        assert_eq!(translated[1].content, "How can I help?");
        assert_eq!(translated[2].content, "Hello");
    }

    #[tokio::test]
    async fn test_translate_messages_stops_at_first_failure() {
        let (client, mut server) = setup().await;
        let mock = server
            .mock("POST", "/v2/translate")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let history = vec![
            ChatMessage::new(Role::User, "Перше"),
            ChatMessage::new(Role::User, "Друге"),
        ];
        let err = client.translate_messages(&history, "EN").await.unwrap_err();
        assert!(matches!(err, TranslationError::Api { status: 500, .. }));
        mock.assert_async().await;
    }
}
