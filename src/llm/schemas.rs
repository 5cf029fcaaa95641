// LLM関連のスキーマ定義

// Gemini (generateContent) のリクエスト/レスポンス
pub mod gemini {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Deserialize, Serialize)]
    pub struct Part {
        #[serde(default)]
        pub text: Option<String>,
    }

    #[derive(Clone, Debug, Deserialize, Serialize)]
    pub struct Content {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub role: Option<String>,
        #[serde(default)]
        pub parts: Vec<Part>,
    }

    // リクエスト本体
    #[derive(Clone, Debug, Serialize)]
    pub struct GenerateContentRequest {
        pub contents: Vec<Content>,
    }

    impl GenerateContentRequest {
        pub fn from_prompt(prompt: &str) -> Self {
            GenerateContentRequest {
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part {
                        text: Some(prompt.to_string()),
                    }],
                }],
            }
        }
    }

    #[derive(Clone, Debug, Deserialize)]
    pub struct Candidate {
        pub content: Option<Content>,
    }

    // レスポンス
    #[derive(Clone, Debug, Deserialize)]
    pub struct GenerateContentResponse {
        #[serde(default)]
        pub candidates: Vec<Candidate>,
    }

    impl GenerateContentResponse {
        /// 最初の候補のテキスト部分を連結する
        pub fn text(&self) -> Option<String> {
            let content = self.candidates.first()?.content.as_ref()?;
            let text: String = content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect();
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        }
    }
}

// OpenAI API 応答に関するスキーマ
pub mod openai_response {
    use serde::{Deserialize, Serialize};

    // Azureエンドポイント設定
    #[derive(Clone, Debug, Deserialize, Serialize)]
    pub struct Endpoint {
        pub name: String,
        pub key: String,
        pub endpoint: String,
        pub deployment: String,
    }

    // チャットメッセージ
    #[derive(Clone, Debug, Deserialize, Serialize)]
    pub struct ChatMessage {
        pub role: String,
        pub content: String,
    }

    // OpenAI API選択肢
    #[derive(Clone, Debug, Deserialize)]
    pub struct OpenAIChoice {
        pub message: ChatMessage,
    }

    // OpenAIのトークン使用量
    #[derive(Clone, Debug, Deserialize)]
    pub struct OpenAIUsage {
        pub total_tokens: usize,
    }

    // OpenAI APIレスポンス
    #[derive(Clone, Debug, Deserialize)]
    pub struct OpenAIResponse {
        #[serde(default)]
        pub choices: Vec<OpenAIChoice>,
        pub usage: Option<OpenAIUsage>,
    }

    impl OpenAIResponse {
        pub fn text(&self) -> Option<String> {
            let text = self.choices.first()?.message.content.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::gemini::GenerateContentResponse;
    use super::openai_response::OpenAIResponse;

    #[test]
    fn gemini_text_joins_parts_of_first_candidate() {
        let body = r#"{"candidates": [
            {"content": {"role": "model", "parts": [{"text": " Visão geral"}, {"text": " e mais. "}]}},
            {"content": {"parts": [{"text": "ignorado"}]}}
        ]}"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("Visão geral e mais."));
    }

    #[test]
    fn gemini_without_candidates_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn openai_blank_content_has_no_text() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "  "}}]}"#;
        let response: OpenAIResponse = serde_json::from_str(body).unwrap();
        assert!(response.text().is_none());
    }
}
