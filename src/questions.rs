// 設問バンク - JSONファイルから一度だけ読み込み、以降は不変

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::careers::CategoryRegistry;
use crate::error::{QuizError, QuizResult};

/// 設問ID (数値でも文字列でも可)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{}", n),
            QuestionId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl QuestionId {
    /// "1" と 1 を同じ設問として扱うための照合
    pub fn matches(&self, raw: &str) -> bool {
        self.to_string() == raw.trim()
    }
}

/// 選択肢
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QuestionOption {
    #[serde(alias = "texto")]
    pub text: String,
    /// この選択肢が加点するカテゴリ
    #[serde(alias = "carreira", alias = "category")]
    pub category_code: String,
}

/// 設問
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(alias = "texto", alias = "text")]
    pub prompt: String,
    /// 選択肢キー("A", "B"...) -> 選択肢。ファイル記載順を保持
    #[serde(alias = "opcoes")]
    pub options: IndexMap<String, QuestionOption>,
}

impl Question {
    /// 大文字小文字を区別せずに選択肢を引く
    pub fn option(&self, key: &str) -> Option<(&str, &QuestionOption)> {
        let key = key.trim();
        self.options
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Deserialize)]
struct QuestionFile {
    #[serde(alias = "perguntas")]
    questions: Vec<Question>,
}

/// 読み込み済み設問一式
#[derive(Clone, Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// ファイルから読み込んでカテゴリ登録と照合する
    pub fn load(path: &Path, registry: &CategoryRegistry) -> QuizResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            QuizError::configuration(format!(
                "não foi possível ler {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content, registry)
    }

    pub fn from_json(content: &str, registry: &CategoryRegistry) -> QuizResult<Self> {
        let file: QuestionFile = serde_json::from_str(content).map_err(|e| {
            QuizError::configuration(format!("arquivo de perguntas inválido: {}", e))
        })?;
        Self::new(file.questions, registry)
    }

    pub fn new(questions: Vec<Question>, registry: &CategoryRegistry) -> QuizResult<Self> {
        if questions.is_empty() {
            return Err(QuizError::configuration("nenhuma pergunta cadastrada"));
        }

        for (i, question) in questions.iter().enumerate() {
            // 照合は表示文字列で行うので 1 と "1" も重複扱い
            if questions[..i].iter().any(|q| q.id.to_string() == question.id.to_string()) {
                return Err(QuizError::configuration(format!(
                    "id de pergunta duplicado: {}",
                    question.id
                )));
            }
            if question.options.is_empty() {
                return Err(QuizError::configuration(format!(
                    "pergunta {} sem opções",
                    question.id
                )));
            }
            for (key, option) in &question.options {
                if !registry.contains(&option.category_code) {
                    return Err(QuizError::configuration(format!(
                        "pergunta {} opção {}: carreira desconhecida \"{}\"",
                        question.id, key, option.category_code
                    )));
                }
            }
        }

        Ok(QuestionBank { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn find(&self, raw_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id.matches(raw_id))
    }
}
