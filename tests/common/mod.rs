#![allow(dead_code)]

use std::path::Path;

use ec_dashboard::data::export::tables_to_xlsx;
use ec_dashboard::data::model::{CellValue, Table};
use unicode_normalization::UnicodeNormalization;

/// Decomposed (NFD) form of `s`, the way macOS stores Hangul filenames.
pub fn nfd(s: &str) -> String {
    s.nfd().collect()
}

/// Write an environment CSV with `rows` readings for `site`.
pub fn write_env_csv(dir: &Path, file_stem: &str, rows: usize, ec: f64) {
    let mut text = String::from(" Time ,Temperature,Humidity,pH,EC\n");
    for i in 0..rows {
        text.push_str(&format!(
            "2025-05-01 {:02}:00,{},{},6.1,{ec}\n",
            i % 24,
            20.0 + i as f64,
            60 + i
        ));
    }
    std::fs::write(dir.join(format!("{file_stem}.csv")), text).unwrap();
}

/// A growth sheet with `n` specimens; fresh weight equals `weight`.
pub fn growth_sheet(n: usize, weight: f64) -> Table {
    Table::new(
        vec![
            "개체번호".into(),
            "잎 수(장)".into(),
            "지상부 길이(mm)".into(),
            "생중량(g)".into(),
        ],
        (1..=n)
            .map(|i| {
                vec![
                    CellValue::Integer(i as i64),
                    CellValue::Float(5.0 + i as f64),
                    CellValue::Float(100.0),
                    CellValue::Float(weight + i as f64 * 0.1),
                ]
            })
            .collect(),
    )
}

/// Write a workbook with the given sheets.
pub fn write_workbook(dir: &Path, file_stem: &str, sheets: &[(&str, &Table)]) {
    let bytes = tables_to_xlsx(sheets).unwrap();
    std::fs::write(dir.join(format!("{file_stem}.xlsx")), bytes).unwrap();
}

/// A complete data directory: four environment CSVs with 3, 4, 5, 6 rows
/// and a workbook with sheets `송도고_데이터`, `하늘고`, `아라고_2024`, `동산고`
/// holding 2, 3, 4, 5 specimens.
pub fn full_fixture(dir: &Path) {
    for (i, site) in ["송도고", "하늘고", "아라고", "동산고"].iter().enumerate() {
        write_env_csv(dir, &format!("{site}_환경데이터"), 3 + i, 1.0 + i as f64);
    }
    let sheets: Vec<Table> = (0..4).map(|i| growth_sheet(2 + i, 1.0 + i as f64)).collect();
    write_workbook(
        dir,
        "4개교_생육결과데이터",
        &[
            ("송도고_데이터", &sheets[0]),
            ("하늘고", &sheets[1]),
            ("아라고_2024", &sheets[2]),
            ("동산고", &sheets[3]),
        ],
    );
}
