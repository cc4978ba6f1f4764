//! External text-generation summarizer
//!
//! Calls an OpenAI-compatible chat-completions endpoint. Any failure falls
//! back to the rule table so callers always receive a usable summary.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{RuleSummarizer, Summarizer, EMPTY_INPUT_SUMMARY};

const SYSTEM_PROMPT: &str = "Rewrite the following legal amendment in plain language \
for a general audience. Answer in the language of the amendment, in at most two sentences.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatAnswer,
}

#[derive(Debug, Deserialize)]
struct ChatAnswer {
    content: String,
}

/// Summarizer backed by a remote text-generation service.
///
/// Uses a blocking HTTP client; call it from a blocking context
/// (e.g. `tokio::task::spawn_blocking`) when inside an async runtime.
pub struct TextGenerationSummarizer {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    fallback: RuleSummarizer,
}

impl TextGenerationSummarizer {
    pub fn new(endpoint: String, api_key: String, model: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
            fallback: RuleSummarizer::new(),
        })
    }

    fn request_summary(&self, text: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: 200,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| anyhow!("Text generation request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Text generation service returned {}", status));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| anyhow!("Failed to parse text generation response: {}", e))?;

        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(anyhow!("Text generation service returned an empty answer"));
        }

        Ok(answer)
    }
}

impl Summarizer for TextGenerationSummarizer {
    fn summarize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return EMPTY_INPUT_SUMMARY.to_string();
        }

        match self.request_summary(text) {
            Ok(summary) => {
                debug!("Received remote summary ({} chars)", summary.chars().count());
                summary
            }
            Err(e) => {
                warn!("Falling back to rule-based summary: {}", e);
                self.fallback.simplify(text)
            }
        }
    }
}
