use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};

use super::{parse_timestamp, tag_site, Loaded};
use crate::config::{Site, GROWTH_EXTENSION, GROWTH_WORKBOOK_FRAGMENT};
use crate::data::diagnostics::Diagnostic;
use crate::data::error::Result;
use crate::data::locate::find_file;
use crate::data::model::{CellValue, Table};
use crate::data::normalize::normalize;

/// Load the growth-result workbook from `dir` and merge its per-site sheets.
///
/// Each sheet is assigned to the first configured site whose name occurs in
/// the (NFC-normalized) sheet name; unmatched sheets are ignored. A missing
/// workbook or any read error yields an empty table and a single error.
pub fn load_growth(dir: &Path, sites: &[Site]) -> Loaded {
    let Some(path) = find_file(dir, GROWTH_WORKBOOK_FRAGMENT, GROWTH_EXTENSION) else {
        return Loaded::failed(Diagnostic::error(format!(
            "'{GROWTH_WORKBOOK_FRAGMENT}.{GROWTH_EXTENSION}' 파일을 찾을 수 없습니다."
        )));
    };

    match read_growth_workbook(&path, sites) {
        Ok(table) => {
            log::info!("{} growth rows from {}", table.len(), path.display());
            Loaded {
                table,
                diagnostics: Vec::new(),
            }
        }
        Err(e) => Loaded::failed(Diagnostic::error(format!(
            "생육 데이터 로드 중 오류 발생: {e}"
        ))),
    }
}

/// Read every site-matching sheet of the workbook at `path`.
pub fn read_growth_workbook(path: &Path, sites: &[Site]) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let mut combined = Table::default();

    for sheet_name in workbook.sheet_names() {
        let Some(site) = match_site(&sheet_name, sites) else {
            log::debug!("sheet {sheet_name:?} matches no site, skipping");
            continue;
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        let mut table = range_to_table(&range);
        tag_site(&mut table, site);
        log::debug!("sheet {sheet_name:?} -> {} ({} rows)", site.name, table.len());
        combined.append(table);
    }

    Ok(combined)
}

/// First configured site whose name is a substring of the sheet name.
///
/// A sheet naming two sites goes to whichever comes first in `sites`.
pub fn match_site<'a>(sheet_name: &str, sites: &'a [Site]) -> Option<&'a Site> {
    let normalized = normalize(sheet_name);
    sites
        .iter()
        .find(|site| normalized.contains(normalize(site.name).as_str()))
}

// ---------------------------------------------------------------------------
// Sheet → Table conversion
// ---------------------------------------------------------------------------

/// The first row of the used range is the header; remaining rows are data.
/// Rows with no values at all are dropped.
fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Unnamed: {i}"),
            other => {
                let name = other.to_string();
                let name = name.trim();
                if name.is_empty() {
                    format!("Unnamed: {i}")
                } else {
                    name.to_string()
                }
            }
        })
        .collect();

    let data = rows
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_null()))
        .collect();

    Table::new(columns, data)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => parse_timestamp(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SITES;
    use unicode_normalization::UnicodeNormalization;

    #[test]
    fn sheet_names_match_by_substring() {
        let cases = [
            ("송도고_데이터", "송도고"),
            ("하늘고", "하늘고"),
            ("아라고_2024", "아라고"),
            ("동산고", "동산고"),
        ];
        for (sheet, expected) in cases {
            assert_eq!(match_site(sheet, SITES).map(|s| s.name), Some(expected));
        }
        assert!(match_site("Summary", SITES).is_none());
    }

    #[test]
    fn decomposed_sheet_name_matches() {
        let sheet: String = "하늘고_결과".nfd().collect();
        assert_eq!(match_site(&sheet, SITES).map(|s| s.name), Some("하늘고"));
    }

    #[test]
    fn first_configured_site_wins_ties() {
        assert_eq!(match_site("동산고_vs_송도고", SITES).map(|s| s.name), Some("송도고"));
    }

    #[test]
    fn cells_convert() {
        assert_eq!(cell_from_data(&Data::Float(1.5)), CellValue::Float(1.5));
        assert_eq!(cell_from_data(&Data::Int(3)), CellValue::Integer(3));
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Null);
        assert_eq!(cell_from_data(&Data::String("  ".into())), CellValue::Null);
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2024-05-01T00:00:00".into())),
            CellValue::DateTime(parse_timestamp("2024-05-01").unwrap())
        );
    }

    #[test]
    fn range_header_and_blank_rows() {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("개체번호".into()));
        range.set_value((0, 2), Data::String(" 생중량(g) ".into()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 2), Data::Float(2.5));
        range.set_value((3, 0), Data::Float(2.0));

        let t = range_to_table(&range);
        assert_eq!(t.columns(), &["개체번호", "Unnamed: 1", "생중량(g)"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(0, "생중량(g)"), Some(&CellValue::Float(2.5)));
    }

    #[test]
    fn repeated_sheet_headers_are_suffixed() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("생중량(g)".into()));
        range.set_value((0, 1), Data::String("생중량(g)".into()));
        range.set_value((1, 0), Data::Float(1.5));
        range.set_value((1, 1), Data::Float(2.5));

        let t = range_to_table(&range);
        assert_eq!(t.columns(), &["생중량(g)", "생중량(g).1"]);
        assert_eq!(t.cell(0, "생중량(g).1"), Some(&CellValue::Float(2.5)));
    }
}
