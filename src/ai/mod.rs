//! AI text-generation module.
//!
//! Thin clients for the supported providers behind the [`TextGenerator`] trait.

pub mod client;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub use client::AiEngine;

/// Supported AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAi,
    Gemini,
    DeepSeek,
}

impl AiProvider {
    /// Every supported provider.
    pub const ALL: [AiProvider; 3] = [AiProvider::OpenAi, AiProvider::Gemini, AiProvider::DeepSeek];

    /// Lowercase provider name.
    pub fn as_str(self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
            AiProvider::DeepSeek => "deepseek",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" | "google" => Ok(AiProvider::Gemini),
            "deepseek" => Ok(AiProvider::DeepSeek),
            other => Err(AppError::InvalidParams(format!(
                "unknown AI provider '{}', expected openai, gemini or deepseek",
                other
            ))),
        }
    }
}

/// Text produced by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiCompletion {
    pub provider: AiProvider,
    pub model: String,
    pub response: String,
}

/// Text generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a prompt to the given provider.
    async fn generate(&self, provider: AiProvider, prompt: &str) -> Result<AiCompletion>;
}
