// LLMモジュール - キャリア説明文の外部生成と固定説明文へのフォールバック

pub mod client;
pub mod prompts;
pub mod schemas;

use anyhow::Result;
use log::{info, warn};

use crate::careers::Category;
use crate::config::EnrichmentConfig;
use client::{AzureOpenAIClient, GeminiClient};
use schemas::openai_response::Endpoint;

/// キャリア説明文の提供者
///
/// どんな失敗があっても呼び出し元にはエラーを返さず、必ず文章を返す。
#[allow(async_fn_in_trait)]
pub trait EnrichmentProvider {
    async fn describe(&self, category: &Category) -> String;
}

/// 固定説明文だけを返す
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticDescriptions;

impl EnrichmentProvider for StaticDescriptions {
    async fn describe(&self, category: &Category) -> String {
        category.description.clone()
    }
}

/// 生成バックエンド
#[derive(Clone, Debug)]
pub enum Backend {
    Gemini(GeminiClient),
    AzureOpenAI(AzureOpenAIClient),
}

impl Backend {
    pub fn name(&self) -> String {
        match self {
            Backend::Gemini(c) => c.name(),
            Backend::AzureOpenAI(c) => c.name(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            Backend::Gemini(c) => c.generate(prompt).await,
            Backend::AzureOpenAI(c) => c.generate(prompt).await,
        }
    }
}

/// 設定済みのバックエンドを順に1回ずつ試し、全滅なら固定説明文を返す
#[derive(Clone, Debug)]
pub struct LlmEnricher {
    backends: Vec<Backend>,
    template: String,
}

impl LlmEnricher {
    pub fn new(backends: Vec<Backend>, template: String) -> Self {
        LlmEnricher { backends, template }
    }

    /// 設定からバックエンドを組み立てる
    ///
    /// 認証情報がないバックエンドは登録しない。テンプレートファイルの指定が
    /// 読めない場合だけは設定ミスとしてエラーにする。
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self> {
        let template = match &config.prompt_template {
            Some(path) => prompts::load_template(path)?,
            None => prompts::CAREER_DESCRIPTION_TEMPLATE.to_string(),
        };

        let mut backends = Vec::new();

        if let Some(key) = non_blank(&config.gemini_api_key) {
            // v1beta が本命、v1 は予備
            for version in ["v1beta", "v1"] {
                backends.push(Backend::Gemini(GeminiClient::new(
                    key.to_string(),
                    config.gemini_endpoint.clone(),
                    config.gemini_model.clone(),
                    version,
                )));
            }
        }

        if let (Some(key), Some(endpoint)) = (
            non_blank(&config.azure_openai_key),
            non_blank(&config.azure_openai_endpoint),
        ) {
            backends.push(Backend::AzureOpenAI(AzureOpenAIClient::new(Endpoint {
                name: "default".to_string(),
                key: key.to_string(),
                endpoint: endpoint.to_string(),
                deployment: config.azure_openai_deployment.clone(),
            })));
        }

        if backends.is_empty() {
            info!("🔑 APIキー未設定のため固定の説明文を使用します");
        }

        Ok(Self::new(backends, template))
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }
}

impl EnrichmentProvider for LlmEnricher {
    async fn describe(&self, category: &Category) -> String {
        let prompt = prompts::career_prompt(&self.template, category);

        for backend in &self.backends {
            match backend.generate(&prompt).await {
                Ok(text) => {
                    info!("✨ 説明文を生成: {} ({})", category.code, backend.name());
                    return text;
                }
                Err(e) => {
                    warn!("⚠️ 説明文の生成に失敗: {} - {}", backend.name(), e);
                }
            }
        }

        category.description.clone()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::careers::CategoryRegistry;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // 1回だけ応答するHTTPサーバを立ててURLを返す
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    fn gemini(base_url: String) -> Backend {
        Backend::Gemini(GeminiClient::new(
            "test-key".to_string(),
            base_url,
            "gemini-test".to_string(),
            "v1beta",
        ))
    }

    fn config() -> EnrichmentConfig {
        EnrichmentConfig {
            gemini_api_key: None,
            gemini_model: client::GEMINI_DEFAULT_MODEL.to_string(),
            gemini_endpoint: client::GEMINI_DEFAULT_ENDPOINT.to_string(),
            azure_openai_key: None,
            azure_openai_endpoint: None,
            azure_openai_deployment: "gpt-4o-mini".to_string(),
            prompt_template: None,
        }
    }

    #[tokio::test]
    async fn static_provider_returns_registry_description() {
        let registry = CategoryRegistry::legal_careers();
        let category = registry.get("advocacia").unwrap();
        assert_eq!(StaticDescriptions.describe(category).await, category.description);
    }

    #[tokio::test]
    async fn unconfigured_enricher_falls_back_unchanged() {
        let registry = CategoryRegistry::legal_careers();
        let enricher = LlmEnricher::from_config(&config()).unwrap();
        assert!(enricher.backends().is_empty());
        for category in registry.iter() {
            assert_eq!(enricher.describe(category).await, category.description);
        }
    }

    #[test]
    fn blank_keys_do_not_register_backends() {
        let mut cfg = config();
        cfg.gemini_api_key = Some("   ".to_string());
        cfg.azure_openai_key = Some("k".to_string());
        let enricher = LlmEnricher::from_config(&cfg).unwrap();
        assert!(enricher.backends().is_empty());

        cfg.gemini_api_key = Some("g".to_string());
        cfg.azure_openai_endpoint = Some("https://example.openai.azure.com".to_string());
        let names: Vec<String> = LlmEnricher::from_config(&cfg)
            .unwrap()
            .backends()
            .iter()
            .map(Backend::name)
            .collect();
        assert_eq!(
            names,
            vec![
                "gemini/v1beta/gemini-2.5-flash",
                "gemini/v1/gemini-2.5-flash",
                "azure/default"
            ]
        );
    }

    #[tokio::test]
    async fn unreachable_service_falls_back_unchanged() {
        let registry = CategoryRegistry::legal_careers();
        let category = registry.get("ministerio_publico").unwrap();
        let enricher = LlmEnricher::new(
            vec![gemini("http://127.0.0.1:1".to_string())],
            prompts::CAREER_DESCRIPTION_TEMPLATE.to_string(),
        );
        assert_eq!(enricher.describe(category).await, category.description);
    }

    #[tokio::test]
    async fn malformed_response_falls_back_unchanged() {
        let registry = CategoryRegistry::legal_careers();
        let category = registry.get("consultoria").unwrap();
        let url = serve_once("200 OK", "{\"candidates\": [").await;
        let enricher = LlmEnricher::new(
            vec![gemini(url)],
            prompts::CAREER_DESCRIPTION_TEMPLATE.to_string(),
        );
        assert_eq!(enricher.describe(category).await, category.description);
    }

    #[tokio::test]
    async fn auth_failure_falls_back_unchanged() {
        let registry = CategoryRegistry::legal_careers();
        let category = registry.get("magistratura").unwrap();
        let url = serve_once("403 Forbidden", "{\"error\": {\"code\": 403}}").await;
        let enricher = LlmEnricher::new(
            vec![gemini(url)],
            prompts::CAREER_DESCRIPTION_TEMPLATE.to_string(),
        );
        assert_eq!(enricher.describe(category).await, category.description);
    }

    #[tokio::test]
    async fn second_backend_is_tried_after_first_fails() {
        let registry = CategoryRegistry::legal_careers();
        let category = registry.get("advocacia").unwrap();
        let url = serve_once(
            "200 OK",
            r#"{"candidates": [{"content": {"parts": [{"text": "Texto enriquecido."}]}}]}"#,
        )
        .await;
        let enricher = LlmEnricher::new(
            vec![gemini("http://127.0.0.1:1".to_string()), gemini(url)],
            prompts::CAREER_DESCRIPTION_TEMPLATE.to_string(),
        );
        assert_eq!(enricher.describe(category).await, "Texto enriquecido.");
    }
}
