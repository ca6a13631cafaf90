use std::path::Path;

use super::{coerce_timestamp, tag_site, Loaded};
use crate::config::{Site, ENVIRONMENT_EXTENSION, ENVIRONMENT_MARKER, TIME_COLUMN};
use crate::data::diagnostics::Diagnostic;
use crate::data::error::{DataError, Result};
use crate::data::locate::find_file;
use crate::data::model::{CellValue, Table};

/// Load and merge every site's environment CSV from `dir`.
///
/// Sites are visited in configured order. A site whose file is missing is
/// skipped with a warning; a site whose file fails to parse is skipped with
/// an error. Neither stops the remaining sites from loading.
pub fn load_environment(dir: &Path, sites: &[Site]) -> Loaded {
    let mut loaded = Loaded::default();

    for site in sites {
        let fragment = format!("{}{ENVIRONMENT_MARKER}", site.name);
        let Some(path) = find_file(dir, &fragment, ENVIRONMENT_EXTENSION) else {
            loaded.diagnostics.push(Diagnostic::warning(format!(
                "'{}' 환경 데이터 파일을 찾을 수 없습니다.",
                site.name
            )));
            continue;
        };

        match read_environment_csv(&path) {
            Ok(mut table) => {
                tag_site(&mut table, site);
                log::info!(
                    "{}: {} environment rows from {}",
                    site.name,
                    table.len(),
                    path.display()
                );
                loaded.table.append(table);
            }
            Err(e) => {
                loaded
                    .diagnostics
                    .push(Diagnostic::error(format!("{} 환경 데이터 로드 실패: {e}", site.name)));
            }
        }
    }

    loaded
}

/// Parse one environment CSV. Headers are trimmed and lower-cased, and a
/// `time` column, if present, is coerced to timestamps.
///
/// Rows shorter than the header are padded with nulls; a row wider than
/// the header fails the whole file.
pub fn read_environment_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    if columns.iter().all(String::is_empty) {
        return Err(DataError::EmptyFile(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(DataError::TooManyFields {
                line: record.position().map_or(0, |p| p.line()),
                expected: columns.len(),
                found: record.len(),
            });
        }
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    let mut table = Table::new(columns, rows);
    table.map_column(TIME_COLUMN, coerce_timestamp);
    Ok(table)
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SITES, SITE_COLUMN};

    #[test]
    fn headers_are_trimmed_and_lowercased() {
        assert_eq!(normalize_header(" Temperature "), "temperature");
        assert_eq!(normalize_header("\u{feff}Time"), "time");
        assert_eq!(normalize_header("pH"), "ph");
    }

    #[test]
    fn reads_and_coerces_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.csv");
        std::fs::write(
            &path,
            "\u{feff}Time, Temperature ,humidity,pH,EC\n\
             2024-05-01 09:00,21.5,60,6.1,1.02\n\
             bad-time,22.0,61,6.2,0.98\n",
        )
        .unwrap();

        let t = read_environment_csv(&path).unwrap();
        assert_eq!(t.columns(), &["time", "temperature", "humidity", "ph", "ec"]);
        assert_eq!(t.len(), 2);
        assert!(t.cell(0, "time").unwrap().as_datetime().is_some());
        assert_eq!(t.cell(1, "time"), Some(&CellValue::Null));
        assert_eq!(t.cell(0, "humidity"), Some(&CellValue::Integer(60)));
    }

    #[test]
    fn short_rows_are_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.csv");
        std::fs::write(
            &path,
            "time,temperature,humidity,ph,ec\n\
             2025-05-01 10:00,21.5,60,6.1,1.02\n\
             2025-05-01 11:00,22\n",
        )
        .unwrap();

        let t = read_environment_csv(&path).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(1, "temperature"), Some(&CellValue::Integer(22)));
        assert_eq!(t.cell(1, "humidity"), Some(&CellValue::Null));
        assert_eq!(t.cell(1, "ec"), Some(&CellValue::Null));
        assert!(t.cell(1, "time").unwrap().as_datetime().is_some());
    }

    #[test]
    fn short_row_does_not_drop_the_site() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("송도고_환경데이터.csv"),
            "time,temperature,humidity,ph,ec\n\
             2025-05-01 10:00,21.5,60,6.1,1.02\n\
             2025-05-01 11:00,22\n",
        )
        .unwrap();

        let loaded = load_environment(dir.path(), &SITES[..1]);
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.table.len(), 2);
        assert_eq!(loaded.table.cell(1, SITE_COLUMN), Some(&CellValue::from("송도고")));
    }

    #[test]
    fn wide_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.csv");
        std::fs::write(&path, "time,temperature\n2024-05-01,1\n2024-05-02,1,2,3\n").unwrap();
        let err = read_environment_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            DataError::TooManyFields {
                line: 3,
                expected: 2,
                found: 4
            }
        ));
        assert_eq!(err.to_string(), "expected 2 fields in line 3, saw 4");
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.csv");
        std::fs::write(&path, "time,EC,ec\n2024-05-01,1.0,2.0\n").unwrap();

        let t = read_environment_csv(&path).unwrap();
        assert_eq!(t.columns(), &["time", "ec", "ec.1"]);
        assert_eq!(t.cell(0, "ec.1"), Some(&CellValue::Float(2.0)));
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(read_environment_csv(&path), Err(DataError::EmptyFile(_))));
    }
}
