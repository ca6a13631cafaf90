//! Source loaders for the two data categories.
//!
//! Both loaders share the same contract: they never return an error.
//! Whatever could be read comes back in [`Loaded::table`], and every
//! problem becomes a [`Diagnostic`] for the user.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::diagnostics::Diagnostic;
use super::model::{CellValue, Table};
use crate::config::{Site, SITE_COLUMN, TARGET_EC_COLUMN};

pub mod environment;
pub mod growth;

pub use environment::load_environment;
pub use growth::load_growth;

// ---------------------------------------------------------------------------
// Load result
// ---------------------------------------------------------------------------

/// A merged table plus the diagnostics produced while building it.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub table: Table,
    pub diagnostics: Vec<Diagnostic>,
}

impl Loaded {
    /// An empty result carrying a single diagnostic.
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            table: Table::default(),
            diagnostics: vec![diagnostic],
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Stamp every row with the site name and its configured target EC.
pub(crate) fn tag_site(table: &mut Table, site: &Site) {
    table.set_constant_column(SITE_COLUMN, CellValue::from(site.name));
    table.set_constant_column(TARGET_EC_COLUMN, CellValue::Float(site.target_ec));
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Parse a timestamp in any of the layouts seen in sensor exports.
/// Offsets (RFC 3339) are dropped, keeping the local wall-clock time.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerce a cell to a timestamp; anything unparsable becomes `Null`.
pub(crate) fn coerce_timestamp(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::DateTime(d) => CellValue::DateTime(*d),
        CellValue::String(s) => parse_timestamp(s)
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Null),
        _ => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        let expected = dt("2024-05-01 13:30:00");
        for raw in [
            "2024-05-01 13:30:00",
            "2024-05-01T13:30:00",
            "2024-05-01 13:30",
            "2024/05/01 13:30",
            "2024-05-01T13:30:00+09:00",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(
            parse_timestamp("2024-05-01 13:30:00.250").map(|d| d.and_utc().timestamp_subsec_millis()),
            Some(250)
        );
        assert_eq!(parse_timestamp("2024-05-01"), Some(dt("2024-05-01 00:00:00")));
    }

    #[test]
    fn garbage_becomes_null() {
        assert_eq!(coerce_timestamp(&CellValue::from("not a time")), CellValue::Null);
        assert_eq!(coerce_timestamp(&CellValue::Integer(5)), CellValue::Null);
        assert_eq!(coerce_timestamp(&CellValue::Null), CellValue::Null);
    }

    #[test]
    fn tag_site_adds_both_columns() {
        let mut t = Table::new(vec!["x".into()], vec![vec![CellValue::Integer(1)]]);
        tag_site(&mut t, &crate::config::SITES[1]);
        assert_eq!(t.cell(0, SITE_COLUMN), Some(&CellValue::from("하늘고")));
        assert_eq!(t.cell(0, TARGET_EC_COLUMN), Some(&CellValue::Float(2.0)));
    }
}
