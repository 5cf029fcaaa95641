// 採点 - 回答からカテゴリ別の点数と最適カテゴリを求める純粋関数

use indexmap::IndexMap;

use crate::careers::Category;
use crate::error::{QuizError, QuizResult};
use crate::questions::{QuestionBank, QuestionId};

/// 1回分の回答 (設問ID -> 選んだカテゴリコード、未回答はNone)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnswerSet {
    answers: IndexMap<QuestionId, Option<String>>,
}

impl AnswerSet {
    /// 設問バンクの全設問を未回答で用意する
    pub fn empty_for(bank: &QuestionBank) -> Self {
        AnswerSet {
            answers: bank
                .questions()
                .iter()
                .map(|q| (q.id.clone(), None))
                .collect(),
        }
    }

    /// 選択肢キーの組 (設問ID, キー) から回答を組み立てる
    pub fn from_selections<'a, I>(bank: &QuestionBank, selections: I) -> QuizResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut answer_set = Self::empty_for(bank);
        for (raw_id, key) in selections {
            answer_set.select(bank, raw_id, key)?;
        }
        Ok(answer_set)
    }

    /// 1問分の選択を記録する
    pub fn select(&mut self, bank: &QuestionBank, raw_id: &str, key: &str) -> QuizResult<()> {
        let question = bank
            .find(raw_id)
            .ok_or_else(|| QuizError::UnknownQuestion(raw_id.trim().to_string()))?;
        let (_, option) = question.option(key).ok_or_else(|| QuizError::UnknownOption {
            question: question.id.to_string(),
            key: key.to_string(),
        })?;
        self.answers
            .insert(question.id.clone(), Some(option.category_code.clone()));
        Ok(())
    }

    /// カテゴリコードを直接記録する (未知コードもそのまま保持し、採点時に無視される)
    pub fn insert(&mut self, id: QuestionId, category_code: Option<String>) {
        self.answers.insert(id, category_code);
    }

    pub fn get(&self, id: &QuestionId) -> Option<&str> {
        self.answers.get(id).and_then(|a| a.as_deref())
    }

    /// 送信前の検証: 設問バンクの全設問に選択があるか
    ///
    /// バンクにない設問IDが混じっていれば `UnknownQuestion`、
    /// 未回答の設問があればバンク順に並べて `Validation` を返す。
    pub fn ensure_complete_for(&self, bank: &QuestionBank) -> QuizResult<()> {
        if let Some(foreign) = self.answers.keys().find(|id| bank.find(&id.to_string()).is_none()) {
            return Err(QuizError::UnknownQuestion(foreign.to_string()));
        }

        // IDは表示文字列で照合する (1 と "1" は同じ設問)
        let unanswered: Vec<String> = bank
            .questions()
            .iter()
            .filter(|q| {
                !self
                    .answers
                    .iter()
                    .any(|(id, a)| a.is_some() && q.id.matches(&id.to_string()))
            })
            .map(|q| q.id.to_string())
            .collect();

        if unanswered.is_empty() {
            Ok(())
        } else {
            Err(QuizError::Validation { unanswered })
        }
    }

    fn selected(&self) -> impl Iterator<Item = &str> {
        self.answers.values().filter_map(|a| a.as_deref())
    }
}

/// 採点結果
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreResult {
    /// カテゴリコード -> 点数 (登録順)
    pub per_category: IndexMap<String, u32>,
    /// 最高点のカテゴリ
    pub winner: String,
}

impl ScoreResult {
    pub fn total(&self) -> u32 {
        self.per_category.values().sum()
    }

    pub fn count(&self, code: &str) -> u32 {
        self.per_category.get(code).copied().unwrap_or(0)
    }

    /// カテゴリ別の割合 (0-100、丸めなし)。合計0の時は分母を1とみなす
    pub fn percentages(&self) -> IndexMap<String, f64> {
        let total = self.total().max(1) as f64;
        self.per_category
            .iter()
            .map(|(code, count)| (code.clone(), *count as f64 / total * 100.0))
            .collect()
    }
}

/// 回答を採点する
///
/// 登録されていないカテゴリコードは数えずに読み飛ばす。同点の場合は
/// `categories` の並びで先に現れるカテゴリを勝者とする。
pub fn score(answers: &AnswerSet, categories: &[Category]) -> QuizResult<ScoreResult> {
    if categories.is_empty() {
        return Err(QuizError::configuration(
            "nenhuma carreira cadastrada para pontuar",
        ));
    }

    let mut per_category: IndexMap<String, u32> =
        categories.iter().map(|c| (c.code.clone(), 0)).collect();

    for code in answers.selected() {
        if let Some(count) = per_category.get_mut(code) {
            *count += 1;
        }
    }

    // 最大値と等しい最初のカテゴリ (max_by_key は最後を返すので使わない)
    let best = per_category.values().copied().max().unwrap_or(0);
    let winner = per_category
        .iter()
        .find(|(_, count)| **count == best)
        .map(|(code, _)| code.clone())
        .ok_or_else(|| QuizError::configuration("nenhuma carreira cadastrada"))?;

    Ok(ScoreResult {
        per_category,
        winner,
    })
}
