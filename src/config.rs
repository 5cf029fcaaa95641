// コマンドライン引数と環境変数による設定

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::llm::client::{GEMINI_DEFAULT_ENDPOINT, GEMINI_DEFAULT_MODEL};

#[derive(Parser, Debug)]
#[clap(
    name = "quiz-vocacional",
    about = "Quiz Vocacional Jurídico - descubra a carreira jurídica mais compatível com seu perfil",
    version = "0.1.0"
)]
pub struct Args {
    /// 設問ファイル (JSON)
    #[clap(long, env = "QUESTIONS_FILE", default_value = "perguntas.json")]
    pub questions: PathBuf,

    /// 結果ファイル (CSV)
    #[clap(long, env = "RESULTS_FILE", default_value = "resultados.csv")]
    pub results: PathBuf,

    /// ログレベル
    #[clap(long, env = "LOG_LEVEL", default_value = "info", value_parser = parse_level)]
    pub log_level: log::LevelFilter,

    /// 外部生成を使わず固定の説明文だけを使う
    #[clap(long)]
    pub no_enrich: bool,

    #[clap(flatten)]
    pub enrichment: EnrichmentConfig,

    #[clap(subcommand)]
    pub command: Command,
}

/// 説明文生成の設定 (キーがなければ固定説明文)
#[derive(clap::Args, Clone, Debug)]
pub struct EnrichmentConfig {
    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[clap(long, env = "GEMINI_MODEL", default_value = GEMINI_DEFAULT_MODEL)]
    pub gemini_model: String,

    #[clap(long, env = "GEMINI_ENDPOINT", default_value = GEMINI_DEFAULT_ENDPOINT)]
    pub gemini_endpoint: String,

    #[clap(long, env = "AZURE_OPENAI_KEY", hide_env_values = true)]
    pub azure_openai_key: Option<String>,

    #[clap(long, env = "AZURE_OPENAI_ENDPOINT")]
    pub azure_openai_endpoint: Option<String>,

    #[clap(long, env = "AZURE_OPENAI_DEPLOYMENT", default_value = "gpt-4o-mini")]
    pub azure_openai_deployment: String,

    /// プロンプトテンプレートのファイル ({{career_name}} などを置換)
    #[clap(long, env = "PROMPT_TEMPLATE")]
    pub prompt_template: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Responder ao quiz no terminal
    Quiz {
        /// Seu nome (opcional)
        #[clap(long, default_value = "")]
        name: String,

        /// Salvar o relatório neste arquivo
        #[clap(long)]
        report: Option<PathBuf>,
    },

    /// Enviar respostas sem interação (ex.: --answer 1=A --answer 2=C)
    Submit {
        #[clap(long = "answer", short = 'a', value_parser = parse_answer)]
        answers: Vec<(String, String)>,

        #[clap(long, default_value = "")]
        name: String,

        #[clap(long)]
        report: Option<PathBuf>,
    },

    /// Estatísticas gerais de todas as respostas
    Dashboard {
        /// Mostrar também os dados brutos
        #[clap(long)]
        raw: bool,
    },

    /// Listar as perguntas carregadas
    Questions,
}

fn parse_level(raw: &str) -> Result<log::LevelFilter, String> {
    raw.parse()
        .map_err(|_| format!("nível de log inválido: {}", raw))
}

/// "ID=キー" を分解する
pub fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (id, key) = raw
        .split_once('=')
        .ok_or_else(|| format!("formato esperado ID=OPÇÃO, recebido \"{}\"", raw))?;
    let (id, key) = (id.trim(), key.trim());
    if id.is_empty() || key.is_empty() {
        return Err(format!("formato esperado ID=OPÇÃO, recebido \"{}\"", raw));
    }
    Ok((id.to_string(), key.to_string()))
}
