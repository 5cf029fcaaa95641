// 受験フロー - 検証 -> 採点 -> 保存 -> 説明文 -> レポート
//
// 端末での対話入力もここで扱う。

use log::{error, info};
use std::fmt::Write as _;
use std::io::{BufRead, Write};

use crate::careers::{Category, CategoryRegistry};
use crate::error::{QuizError, QuizResult};
use crate::llm::EnrichmentProvider;
use crate::questions::{Question, QuestionBank};
use crate::report;
use crate::scorer::{self, AnswerSet, ScoreResult};
use crate::store::{ResultRecord, ResultStore};

pub const SAVED_MESSAGE: &str =
    "Seu resultado foi salvo anonimamente para compor as estatísticas gerais do dashboard.";

/// 1回分の受験結果
#[derive(Clone, Debug)]
pub struct Outcome {
    pub score: ScoreResult,
    pub winner: Category,
    pub description: String,
    pub record: ResultRecord,
    /// ダウンロード用レポート
    pub report: Vec<u8>,
    /// 保存に失敗した場合の警告 (結果表示は続行する)
    pub persistence_warning: Option<String>,
}

/// 受験に必要な部品一式
pub struct QuizApp<P> {
    registry: CategoryRegistry,
    bank: QuestionBank,
    store: ResultStore,
    enricher: P,
}

impl<P: EnrichmentProvider> QuizApp<P> {
    pub fn new(registry: CategoryRegistry, bank: QuestionBank, store: ResultStore, enricher: P) -> Self {
        QuizApp {
            registry,
            bank,
            store,
            enricher,
        }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// 回答を送信する
    ///
    /// 設問バンクの設問に未回答があれば `QuizError::Validation`、
    /// バンクにない設問IDがあれば `QuizError::UnknownQuestion` を返し、何も保存しない。
    /// 保存の失敗は `Outcome::persistence_warning` に載せるだけで処理は止めない。
    pub async fn submit(&self, name: &str, answers: &AnswerSet) -> QuizResult<Outcome> {
        answers.ensure_complete_for(&self.bank)?;

        let score = scorer::score(answers, self.registry.as_slice())?;
        let winner = self
            .registry
            .get(&score.winner)
            .cloned()
            .ok_or_else(|| QuizError::configuration(format!("carreira {} não cadastrada", score.winner)))?;
        info!("🏁 採点完了: {} ({}問)", winner.code, score.total());

        let record = ResultRecord::from_score(name, &score);
        let persistence_warning = match self.store.append(&record) {
            Ok(()) => None,
            Err(e) => {
                error!("❌ 結果の保存に失敗: {} - {}", self.store.path().display(), e);
                Some(format!("Atenção: seu resultado não foi salvo ({}).", e))
            }
        };

        let description = self.enricher.describe(&winner).await;
        let report = report::render(name, &score, &self.registry, &winner.code, &description);

        Ok(Outcome {
            score,
            winner,
            description,
            record,
            report,
            persistence_warning,
        })
    }

    /// 端末で全設問に回答させる
    ///
    /// 空行は未回答として残し、一巡した後に未回答の設問だけを聞き直す。
    /// 入力が途中で終わった場合は検証エラーになる。
    pub fn collect_answers<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> QuizResult<AnswerSet> {
        let mut answers = AnswerSet::empty_for(&self.bank);
        let mut pending: Vec<&Question> = self.bank.questions().iter().collect();

        loop {
            for question in &pending {
                match ask(question, input, output)? {
                    Prompted::Answered(key) => {
                        answers.select(&self.bank, &question.id.to_string(), &key)?
                    }
                    Prompted::Skipped => {}
                    Prompted::Closed => {
                        answers.ensure_complete_for(&self.bank)?;
                        return Ok(answers);
                    }
                }
            }

            match answers.ensure_complete_for(&self.bank) {
                Ok(()) => return Ok(answers),
                Err(e) => writeln!(output, "\n{}", e)?,
            }
            pending.retain(|q| answers.get(&q.id).is_none());
        }
    }
}

enum Prompted {
    Answered(String),
    Skipped,
    Closed,
}

fn ask<R: BufRead, W: Write>(question: &Question, input: &mut R, output: &mut W) -> QuizResult<Prompted> {
    writeln!(output, "\n{}. {}", question.id, question.prompt)?;
    for (key, option) in &question.options {
        writeln!(output, "   {}) {}", key, option.text)?;
    }

    loop {
        write!(output, "Resposta: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Prompted::Closed);
        }
        let choice = line.trim();
        if choice.is_empty() {
            return Ok(Prompted::Skipped);
        }
        if let Some((key, _)) = question.option(choice) {
            return Ok(Prompted::Answered(key.to_string()));
        }

        let keys: Vec<&str> = question.options.keys().map(String::as_str).collect();
        writeln!(output, "Opção inválida. Escolha uma de: {}", keys.join(", "))?;
    }
}

/// 受験結果の端末表示
pub fn render_outcome(outcome: &Outcome, registry: &CategoryRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nSua carreira mais compatível é: {} 🎉\n",
        outcome.winner.display_name
    );

    let _ = writeln!(out, "Detalhamento numérico:");
    let percentages = outcome.score.percentages();
    for (code, points) in &outcome.score.per_category {
        let percent = percentages.get(code).copied().unwrap_or(0.0);
        let _ = writeln!(
            out,
            "  {}: {} pontos ({:.1}%)",
            registry.display_name(code),
            points,
            percent
        );
    }

    let _ = writeln!(out, "\nAnálise da carreira sugerida:");
    let _ = writeln!(out, "{}\n", outcome.description.trim());

    match &outcome.persistence_warning {
        Some(warning) => {
            let _ = writeln!(out, "{}", warning);
        }
        None => {
            let _ = writeln!(out, "{}", SAVED_MESSAGE);
        }
    }
    out
}
