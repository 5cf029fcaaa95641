// quiz-vocacional - 法律系キャリア診断クイズ
//
// 設問に答えるとカテゴリ別に集計し、最も合うキャリアを提示する。
// 結果はCSVに匿名で蓄積し、全体の傾向をダッシュボードとして表示する。

pub mod careers;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod llm;
pub mod questions;
pub mod quiz;
pub mod report;
pub mod scorer;
pub mod store;

pub use careers::{Category, CategoryRegistry};
pub use error::{QuizError, QuizResult};
pub use questions::{Question, QuestionBank, QuestionId};
pub use scorer::{AnswerSet, ScoreResult, score};
pub use store::{ResultRecord, ResultStore};
