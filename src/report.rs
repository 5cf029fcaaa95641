// 結果レポート - ダウンロード用の文書を生成する (UTF-8テキスト)

use chrono::{Local, NaiveDateTime};
use std::fmt::Write as _;

use crate::careers::CategoryRegistry;
use crate::scorer::ScoreResult;

pub const REPORT_TITLE: &str = "Relatório - Quiz Vocacional Jurídico";

/// 現在時刻でレポートを生成する
pub fn render(
    name: &str,
    score: &ScoreResult,
    registry: &CategoryRegistry,
    winner: &str,
    description: &str,
) -> Vec<u8> {
    render_at(
        name,
        score,
        registry,
        winner,
        description,
        Local::now().naive_local(),
    )
}

/// 指定時刻でレポートを生成する (副作用なし)
pub fn render_at(
    name: &str,
    score: &ScoreResult,
    registry: &CategoryRegistry,
    winner: &str,
    description: &str,
    at: NaiveDateTime,
) -> Vec<u8> {
    let mut doc = String::new();

    let _ = writeln!(doc, "{}", REPORT_TITLE);
    let _ = writeln!(doc, "{}", "=".repeat(REPORT_TITLE.chars().count()));
    let _ = writeln!(doc);

    let name = name.trim();
    if !name.is_empty() {
        let _ = writeln!(doc, "Participante: {}", name);
    }
    let _ = writeln!(doc, "Data: {}", at.format("%d/%m/%Y %H:%M"));
    let _ = writeln!(doc);

    let _ = writeln!(
        doc,
        "Carreira mais compatível: {}",
        registry.display_name(winner)
    );
    let _ = writeln!(doc);

    let _ = writeln!(doc, "Pontuações gerais:");
    let percentages = score.percentages();
    for (code, points) in &score.per_category {
        let percent = percentages.get(code).copied().unwrap_or(0.0);
        let _ = writeln!(
            doc,
            "- {}: {} pontos ({:.1}%)",
            registry.display_name(code),
            points,
            percent
        );
    }
    let _ = writeln!(doc);

    let _ = writeln!(doc, "Descrição da carreira:");
    let _ = writeln!(doc, "{}", description.trim());

    doc.into_bytes()
}
