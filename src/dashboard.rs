// ダッシュボード集計 - 全履歴から最適カテゴリ別の件数と割合を出す

use indexmap::IndexMap;
use std::fmt::Write as _;

use crate::careers::CategoryRegistry;
use crate::store::ResultRecord;

/// 集計結果
#[derive(Clone, Debug, PartialEq)]
pub enum Dashboard {
    /// まだ1件も記録がない
    NoData,
    Summary(Summary),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub total: usize,
    /// カテゴリコード -> 件数 (登録順、未登録コードは末尾に出現順)
    pub counts: IndexMap<String, usize>,
    /// カテゴリコード -> 割合 (0-100、丸めなし)
    pub percentages: IndexMap<String, f64>,
}

impl Summary {
    /// 件数の多い順 (同数は元の並び順)
    pub fn ranked(&self) -> Vec<(&str, usize, f64)> {
        let mut rows: Vec<(&str, usize, f64)> = self
            .counts
            .iter()
            .map(|(code, count)| {
                let percent = self.percentages.get(code).copied().unwrap_or(0.0);
                (code.as_str(), *count, percent)
            })
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

/// 記録を集計する。空なら `Dashboard::NoData`
pub fn aggregate(records: &[ResultRecord], registry: &CategoryRegistry) -> Dashboard {
    if records.is_empty() {
        return Dashboard::NoData;
    }

    let mut counts: IndexMap<String, usize> =
        registry.codes().map(|code| (code.to_string(), 0)).collect();
    for record in records {
        *counts.entry(record.winner_category.clone()).or_insert(0) += 1;
    }

    let total = records.len();
    let percentages = counts
        .iter()
        .map(|(code, count)| (code.clone(), *count as f64 / total as f64 * 100.0))
        .collect();

    Dashboard::Summary(Summary {
        total,
        counts,
        percentages,
    })
}

pub const NO_DATA_MESSAGE: &str = "Ainda não há dados suficientes para o dashboard. \
     Peça para mais pessoas responderem o quiz.";

/// 端末表示用テキスト (割合は小数1桁)
pub fn render(dashboard: &Dashboard, registry: &CategoryRegistry) -> String {
    let summary = match dashboard {
        Dashboard::NoData => return format!("{}\n", NO_DATA_MESSAGE),
        Dashboard::Summary(summary) => summary,
    };

    let mut out = String::new();
    let _ = writeln!(out, "Total de respostas registradas: {}", summary.total);
    let _ = writeln!(out);
    let _ = writeln!(out, "Preferência global por carreira:");
    for (code, count, percent) in summary.ranked() {
        let _ = writeln!(
            out,
            "  {}: {} ({:.1}% dos participantes)",
            registry.display_name(code),
            count,
            percent
        );
    }
    out
}

/// 生データの一覧表示
pub fn render_raw(records: &[ResultRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let counts = record
            .counts
            .iter()
            .map(|(code, count)| format!("{}={}", code, count))
            .collect::<Vec<_>>()
            .join(" ");
        let name = record.name.trim();
        let name = if name.is_empty() { "-" } else { name };
        let _ = writeln!(
            out,
            "{}  {}  {}  [{}]",
            record.timestamp, name, record.winner_category, counts
        );
    }
    out
}
