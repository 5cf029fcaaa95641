// 結果の保存 - 1回の受験につき1行をCSVへ追記する
//
// 追記は「全行読み込み -> 1行追加 -> 全体を書き直し」で行う。
// アトミックではなく、複数プロセスが同時に書くと片方の行が失われる。

use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use log::debug;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{QuizError, QuizResult};
use crate::scorer::ScoreResult;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const NAME_COLUMN: &str = "name";
pub const WINNER_COLUMN: &str = "winner_category";

const COUNT_PREFIX: &str = "count_";
const PERCENT_PREFIX: &str = "percent_";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn count_column(code: &str) -> String {
    format!("{}{}", COUNT_PREFIX, code)
}

pub fn percent_column(code: &str) -> String {
    format!("{}{}", PERCENT_PREFIX, code)
}

/// 保存される1行分の結果
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRecord {
    /// ISO-8601 (タイムゾーンなしのローカル時刻)
    pub timestamp: String,
    /// 名前 (任意、空文字可)
    pub name: String,
    pub winner_category: String,
    pub counts: IndexMap<String, u32>,
    pub percents: IndexMap<String, f64>,
}

impl ResultRecord {
    /// 現在時刻で採点結果から行を作る
    pub fn from_score(name: &str, score: &ScoreResult) -> Self {
        Self::from_score_at(name, score, Local::now().naive_local())
    }

    pub fn from_score_at(name: &str, score: &ScoreResult, at: NaiveDateTime) -> Self {
        ResultRecord {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            name: name.to_string(),
            winner_category: score.winner.clone(),
            counts: score.per_category.clone(),
            percents: score.percentages(),
        }
    }

    /// この行が持つ列名 (固定列 + カテゴリ毎の点数列 + 割合列)
    fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            TIMESTAMP_COLUMN.to_string(),
            NAME_COLUMN.to_string(),
            WINNER_COLUMN.to_string(),
        ];
        columns.extend(self.counts.keys().map(|code| count_column(code)));
        columns.extend(self.percents.keys().map(|code| percent_column(code)));
        columns
    }

    fn cell(&self, column: &str) -> String {
        match column {
            TIMESTAMP_COLUMN => self.timestamp.clone(),
            NAME_COLUMN => self.name.clone(),
            WINNER_COLUMN => self.winner_category.clone(),
            _ => {
                if let Some(code) = column.strip_prefix(COUNT_PREFIX) {
                    if let Some(count) = self.counts.get(code) {
                        return count.to_string();
                    }
                }
                if let Some(code) = column.strip_prefix(PERCENT_PREFIX) {
                    if let Some(percent) = self.percents.get(code) {
                        return percent.to_string();
                    }
                }
                String::new()
            }
        }
    }

    fn from_row(headers: &csv::StringRecord, row: &csv::StringRecord, line: u64) -> QuizResult<Self> {
        let mut record = ResultRecord {
            timestamp: String::new(),
            name: String::new(),
            winner_category: String::new(),
            counts: IndexMap::new(),
            percents: IndexMap::new(),
        };
        let mut has_winner = false;

        for (column, value) in headers.iter().zip(row.iter()) {
            match column {
                TIMESTAMP_COLUMN => record.timestamp = value.to_string(),
                NAME_COLUMN => record.name = value.to_string(),
                WINNER_COLUMN => {
                    record.winner_category = value.to_string();
                    has_winner = true;
                }
                _ => {
                    // 空欄はその行が書かれた時に存在しなかった列
                    if value.is_empty() {
                        continue;
                    }
                    if let Some(code) = column.strip_prefix(COUNT_PREFIX) {
                        record
                            .counts
                            .insert(code.to_string(), parse_count(value, column, line)?);
                    } else if let Some(code) = column.strip_prefix(PERCENT_PREFIX) {
                        let percent = value.parse::<f64>().map_err(|_| {
                            QuizError::CorruptStore(format!(
                                "linha {}: coluna {} não numérica ({})",
                                line, column, value
                            ))
                        })?;
                        record.percents.insert(code.to_string(), percent);
                    }
                }
            }
        }

        if !has_winner {
            return Err(QuizError::CorruptStore(format!(
                "linha {}: coluna {} ausente",
                line, WINNER_COLUMN
            )));
        }
        Ok(record)
    }
}

// 欠損値を含んだ列は "3.0" のように浮動小数で書かれていることがある
fn parse_count(value: &str, column: &str, line: u64) -> QuizResult<u32> {
    if let Ok(count) = value.parse::<u32>() {
        return Ok(count);
    }
    match value.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(QuizError::CorruptStore(format!(
            "linha {}: coluna {} não inteira ({})",
            line, column, value
        ))),
    }
}

/// CSVファイルに保存する結果ストア
#[derive(Clone, Debug)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ResultStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全行を追記順に読み込む。ファイルがなければ空
    pub fn load_all(&self) -> QuizResult<Vec<ResultRecord>> {
        let Some((headers, rows)) = self.read_raw()? else {
            return Ok(Vec::new());
        };

        rows.iter()
            .enumerate()
            .map(|(i, row)| ResultRecord::from_row(&headers, row, i as u64 + 2))
            .collect()
    }

    /// 1行追記する
    ///
    /// 既存ファイルと列構成が違う場合は列の和集合で書き直す (既存列が先、新しい列は末尾)。
    /// 古い行に存在しなかった列は空欄のまま残し、移行は行わない。
    pub fn append(&self, record: &ResultRecord) -> QuizResult<()> {
        let (mut header, rows): (Vec<String>, Vec<csv::StringRecord>) = match self.read_raw()? {
            Some((headers, rows)) => (headers.iter().map(str::to_string).collect(), rows),
            None => (Vec::new(), Vec::new()),
        };
        let existing_header = header.clone();

        for column in record.columns() {
            if !header.contains(&column) {
                header.push(column);
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(&header)?;
        for row in &rows {
            let cells = header.iter().map(|column| {
                existing_header
                    .iter()
                    .position(|c| c == column)
                    .and_then(|i| row.get(i))
                    .unwrap_or("")
            });
            writer.write_record(cells)?;
        }
        writer.write_record(header.iter().map(|column| record.cell(column)))?;
        writer.flush()?;

        debug!(
            "💾 結果を保存: {} ({}行)",
            self.path.display(),
            rows.len() + 1
        );
        Ok(())
    }

    fn read_raw(&self) -> QuizResult<Option<(csv::StringRecord, Vec<csv::StringRecord>)>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(None);
        }
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Some((headers, rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::careers::CategoryRegistry;
    use crate::scorer::{AnswerSet, score};
    use crate::questions::QuestionId;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_score(codes: &[&str]) -> ScoreResult {
        let mut answers = AnswerSet::default();
        for (i, code) in codes.iter().enumerate() {
            answers.insert(QuestionId::Number(i as u64), Some(code.to_string()));
        }
        score(&answers, CategoryRegistry::legal_careers().as_slice()).unwrap()
    }

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(10, minute, 0, 123_456)
            .unwrap()
    }

    #[test]
    fn load_all_without_file_is_empty() {
        let dir = tempdir().expect("tempdir");
        let store = ResultStore::new(dir.path().join("resultados.csv"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn first_append_creates_file_with_header() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("resultados.csv");
        let store = ResultStore::new(&path);
        let record = ResultRecord::from_score_at("Ana", &sample_score(&["advocacia"]), at(0));
        store.append(&record).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,name,winner_category,\
             count_advocacia,count_magistratura,count_ministerio_publico,count_consultoria,\
             percent_advocacia,percent_magistratura,percent_ministerio_publico,percent_consultoria"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024-03-01T10:00:00.123456,Ana,advocacia,1,0,0,0,100,0,0,0"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn appended_records_round_trip_in_order() {
        let dir = tempdir().expect("tempdir");
        let store = ResultStore::new(dir.path().join("resultados.csv"));
        let records = vec![
            ResultRecord::from_score_at("", &sample_score(&["magistratura", "consultoria", "consultoria"]), at(1)),
            ResultRecord::from_score_at("Bia, a \"juíza\"", &sample_score(&["magistratura"]), at(2)),
            ResultRecord::from_score_at("Caio", &sample_score(&["advocacia", "ministerio_publico"]), at(3)),
        ];
        for record in &records {
            store.append(record).unwrap();
        }

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, records);
        assert_eq!(loaded[0].winner_category, "consultoria");
        assert_eq!(loaded[1].name, "Bia, a \"juíza\"");
    }

    #[test]
    fn name_is_stored_as_given() {
        let dir = tempdir().expect("tempdir");
        let store = ResultStore::new(dir.path().join("resultados.csv"));
        let record = ResultRecord::from_score_at("  Ana  ", &sample_score(&["advocacia"]), at(0));
        assert_eq!(record.name, "  Ana  ");
        store.append(&record).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded[0].name, "  Ana  ");
    }

    #[test]
    fn changed_category_set_keeps_old_rows_untouched() {
        let dir = tempdir().expect("tempdir");
        let store = ResultStore::new(dir.path().join("resultados.csv"));
        let old = ResultRecord::from_score_at("", &sample_score(&["advocacia"]), at(1));
        store.append(&old).unwrap();

        let mut newer = ResultRecord::from_score_at("", &sample_score(&["advocacia"]), at(2));
        newer.winner_category = "notariado".to_string();
        newer.counts.insert("notariado".to_string(), 2);
        newer.percents.insert("notariado".to_string(), 66.5);
        store.append(&newer).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], old);
        assert!(!loaded[0].counts.contains_key("notariado"));
        assert_eq!(loaded[1].counts.get("notariado"), Some(&2));
        assert_eq!(loaded[1].percents.get("notariado"), Some(&66.5));
    }

    #[test]
    fn float_counts_written_by_other_tools_are_accepted() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("resultados.csv");
        std::fs::write(
            &path,
            "timestamp,name,winner_category,count_advocacia,percent_advocacia\n\
             2024-01-01T00:00:00,,advocacia,3.0,100.0\n",
        )
        .unwrap();
        let loaded = ResultStore::new(&path).load_all().unwrap();
        assert_eq!(loaded[0].counts.get("advocacia"), Some(&3));
    }

    #[test]
    fn missing_winner_column_is_corrupt() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("resultados.csv");
        std::fs::write(&path, "timestamp,name\n2024-01-01T00:00:00,x\n").unwrap();
        let err = ResultStore::new(&path).load_all().unwrap_err();
        assert!(matches!(err, QuizError::CorruptStore(_)));
    }
}
