// 外部テキスト生成APIのクライアント (Gemini / Azure OpenAI)

use anyhow::{Result, anyhow};
use log::debug;
use serde_json::json;

use super::schemas::gemini::{GenerateContentRequest, GenerateContentResponse};
use super::schemas::openai_response::{ChatMessage, Endpoint, OpenAIResponse};

pub const GEMINI_DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";

// Gemini クライアント
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    api_version: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String, api_version: &str) -> Self {
        GeminiClient {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_version: api_version.to_string(),
        }
    }

    pub fn name(&self) -> String {
        format!("gemini/{}/{}", self.api_version, self.model)
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, self.api_version, self.model
        );
        debug!("➡️ Gemini呼び出し: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Gemini API エラー: ステータス {}, レスポンス: {}",
                status,
                error_text
            ));
        }

        let body: GenerateContentResponse = response.json().await?;
        body.text()
            .ok_or_else(|| anyhow!("Gemini API 応答にテキストがありません"))
    }
}

// Azure OpenAI クライアント
#[derive(Clone, Debug)]
pub struct AzureOpenAIClient {
    client: reqwest::Client,
    endpoint: Endpoint,
    api_version: String,
}

impl AzureOpenAIClient {
    pub fn new(endpoint: Endpoint) -> Self {
        let client = reqwest::Client::new();

        AzureOpenAIClient {
            client,
            endpoint,
            api_version: "2023-05-15".to_string(),
        }
    }

    pub fn name(&self) -> String {
        format!("azure/{}", self.endpoint.name)
    }

    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String> {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.endpoint.trim_end_matches('/'),
            self.endpoint.deployment,
            self.api_version
        );

        let request_body = json!({
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.endpoint.key)
            .json(&request_body)
            .send()
            .await?;

        if response.status().is_success() {
            let openai_response: OpenAIResponse = response.json().await?;
            if let Some(usage) = &openai_response.usage {
                debug!("🔢 使用トークン: {}", usage.total_tokens);
            }
            openai_response
                .text()
                .ok_or_else(|| anyhow!("OpenAI API 応答にテキストがありません"))
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(anyhow!(
                "OpenAI API エラー: ステータス {}, レスポンス: {}",
                status,
                error_text
            ))
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "Você é um orientador vocacional jurídico.".to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            },
        ];
        self.chat_completion(&messages, 1200, 0.7).await
    }
}
