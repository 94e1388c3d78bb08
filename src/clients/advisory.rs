//! Generador de texto de asesoramiento (chat completions)
//!
//! Opcional. Cualquier fallo se registra y se devuelve como `None`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AdvisoryConfig;

const SYSTEM_PROMPT: &str = "당신은 화물 운송 견적 검증을 돕는 조언가입니다.";

#[async_trait]
pub trait AdvisoryGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Option<String>;
}

/// Generador que nunca devuelve texto
pub struct DisabledAdvisory;

#[async_trait]
impl AdvisoryGenerator for DisabledAdvisory {
    async fn generate(&self, _prompt: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

pub struct ChatAdvisoryClient {
    client: reqwest::Client,
    config: AdvisoryConfig,
}

impl ChatAdvisoryClient {
    pub fn new(client: reqwest::Client, config: AdvisoryConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self) -> Option<&str> {
        if !self.config.enabled {
            return None;
        }
        self.config.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    async fn request(&self, api_key: &str, prompt: &str) -> anyhow::Result<Option<String>> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                Message {
                    role: "user".to_string(),
                    content: Some(prompt.to_string()),
                },
            ],
            temperature: 0.2,
            max_tokens: 200,
        };

        let response: ChatCompletionResponse = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty()))
    }
}

#[async_trait]
impl AdvisoryGenerator for ChatAdvisoryClient {
    async fn generate(&self, prompt: &str) -> Option<String> {
        let api_key = self.api_key()?;
        match self.request(api_key, prompt).await {
            Ok(advice) => advice,
            Err(e) => {
                log::warn!("⚠️ Falló la llamada de asesoramiento: {}", e);
                None
            }
        }
    }
}
