// エラー分類 - 利用者に見せるもの(検証・設定)と内部で吸収するものを分ける

use thiserror::Error;

/// クイズ処理全体で使うエラー型
#[derive(Debug, Error)]
pub enum QuizError {
    /// 未回答の設問が残っている(送信は処理しない)
    #[error("Por favor, responda todas as perguntas antes de enviar. (pendentes: {})", .unanswered.join(", "))]
    Validation { unanswered: Vec<String> },

    /// 設問に存在しない選択肢キー
    #[error("opção inválida \"{key}\" para a pergunta {question}")]
    UnknownOption { question: String, key: String },

    /// 設問バンクにない設問ID
    #[error("pergunta desconhecida: {0}")]
    UnknownQuestion(String),

    /// カテゴリ登録や設問ファイルの不備(起動時に致命的)
    #[error("erro de configuração: {0}")]
    Configuration(String),

    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("erro de CSV: {0}")]
    Csv(#[from] csv::Error),

    /// 結果ファイルの行が読めない
    #[error("arquivo de resultados corrompido: {0}")]
    CorruptStore(String),
}

impl QuizError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        QuizError::Configuration(msg.into())
    }

    /// 利用者に表示して入力をやり直させるべきエラーか
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            QuizError::Validation { .. }
                | QuizError::UnknownOption { .. }
                | QuizError::UnknownQuestion(_)
        )
    }
}

pub type QuizResult<T> = Result<T, QuizError>;
