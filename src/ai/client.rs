//! HTTP clients for the AI providers.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{AiCompletion, AiProvider, TextGenerator};
use crate::{
    config::Config,
    error::{AppError, Result},
};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEEPSEEK_URL: &str = "https://api.deepseek.com/chat/completions";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const OPENAI_MODEL: &str = "gpt-4o-mini";
const DEEPSEEK_MODEL: &str = "deepseek-chat";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

const SYSTEM_PROMPT: &str = "You are a cautious crypto market analyst. Answer concisely and \
                             never present analysis as financial advice.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Calls whichever providers have an API key configured.
pub struct AiEngine {
    client: Client,
    keys: HashMap<AiProvider, SecretString>,
}

impl AiEngine {
    /// Create an engine for the providers configured in `config`.
    ///
    /// Returns `None` when no provider has a key.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let mut keys = HashMap::new();
        let configured = [
            (AiProvider::OpenAi, &config.openai_api_key),
            (AiProvider::Gemini, &config.google_api_key),
            (AiProvider::DeepSeek, &config.deepseek_api_key),
        ];
        for (provider, key) in configured {
            if let Some(key) = key {
                keys.insert(provider, SecretString::from(key.expose_secret().to_string()));
                tracing::info!(provider = %provider, "AI provider initialized");
            }
        }

        if keys.is_empty() {
            return Ok(None);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self { client, keys }))
    }

    async fn chat_completion(
        &self,
        url: &str,
        model: &str,
        key: &SecretString,
        prompt: &str,
    ) -> Result<(String, String)> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
        };

        let response =
            self.client.post(url).bearer_auth(key.expose_secret()).json(&request).send().await?;
        let body = read_body(response).await?;

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let text = parsed
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| AppError::Parse("provider returned no completion".into()))?;

        Ok((parsed.model.unwrap_or_else(|| model.to_string()), text))
    }

    async fn gemini(&self, key: &SecretString, prompt: &str) -> Result<(String, String)> {
        let url = format!("{}/{}:generateContent", GEMINI_URL, GEMINI_MODEL);
        let text = format!("{}\n\n{}", SYSTEM_PROMPT, prompt);
        let parts = vec![GeminiPart { text: &text }];
        let request = GeminiRequest { contents: vec![GeminiContent { parts }] };

        let response = self
            .client
            .post(&url)
            .query(&[("key", key.expose_secret())])
            .json(&request)
            .send()
            .await?;
        let body = read_body(response).await?;

        let parsed: GeminiResponse = serde_json::from_str(&body)?;
        let text = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AppError::Parse("provider returned no completion".into()));
        }
        Ok((GEMINI_MODEL.to_string(), text))
    }
}

#[async_trait]
impl TextGenerator for AiEngine {
    async fn generate(&self, provider: AiProvider, prompt: &str) -> Result<AiCompletion> {
        let key = self
            .keys
            .get(&provider)
            .ok_or_else(|| AppError::Config(format!("Provider {} not configured", provider)))?;

        tracing::info!(provider = %provider, prompt_length = prompt.len(), "Sending AI request");

        let (model, response) = match provider {
            AiProvider::OpenAi => {
                self.chat_completion(OPENAI_URL, OPENAI_MODEL, key, prompt).await?
            }
            AiProvider::DeepSeek => {
                self.chat_completion(DEEPSEEK_URL, DEEPSEEK_MODEL, key, prompt).await?
            }
            AiProvider::Gemini => self.gemini(key, prompt).await?,
        };

        tracing::info!(provider = %provider, model = %model, "AI query completed");

        Ok(AiCompletion { provider, model, response })
    }
}

async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .unwrap_or(body);
        return Err(AppError::Transport(format!("AI provider returned {}: {}", status, message)));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: Map<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_engine_absent_without_keys() {
        assert!(AiEngine::from_config(&config(&[])).unwrap().is_none());
    }

    #[test]
    fn test_engine_tracks_configured_providers() {
        let config = config(&[("GOOGLE_API_KEY", "g-key")]);
        let engine = AiEngine::from_config(&config).unwrap().unwrap();
        assert!(engine.keys.contains_key(&AiProvider::Gemini));
        assert!(!engine.keys.contains_key(&AiProvider::OpenAi));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_without_network() {
        let config = config(&[("GOOGLE_API_KEY", "g-key")]);
        let engine = AiEngine::from_config(&config).unwrap().unwrap();
        let err = engine.generate(AiProvider::OpenAi, "hello").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Range-bound."}}]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.model.as_deref(), Some("gpt-4o-mini-2024-07-18"));
        assert_eq!(response.choices[0].message.content.as_deref(), Some("Range-bound."));
    }

    #[test]
    fn test_gemini_response_deserialization() {
        let json = r#"{"candidates": [
            {"content": {"parts": [{"text": "Up"}, {"text": "trend"}]}}
        ]}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates[0].content.parts.len(), 2);
    }
}
