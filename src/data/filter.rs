use std::fmt;
use std::str::FromStr;

use super::error::DataError;
use super::model::Table;
use crate::config::{site_by_name, Site, SITES, SITE_COLUMN};

// ---------------------------------------------------------------------------
// Site selection
// ---------------------------------------------------------------------------

/// Label of the "every site" choice in the site selector.
pub const ALL_LABEL: &str = "전체";

/// Which site the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SiteSelection {
    #[default]
    All,
    Site(&'static Site),
}

impl SiteSelection {
    /// Parse a selection against a site table. `전체` or `all` (any case)
    /// selects every site.
    pub fn parse(text: &str, sites: &'static [Site]) -> Result<Self, DataError> {
        let text = text.trim();
        if text == ALL_LABEL || text.eq_ignore_ascii_case("all") {
            return Ok(SiteSelection::All);
        }
        site_by_name(sites, text)
            .map(SiteSelection::Site)
            .ok_or_else(|| DataError::UnknownSite(text.to_string()))
    }

    /// The selector's choices: `전체` followed by each site in order.
    pub fn options(sites: &'static [Site]) -> Vec<SiteSelection> {
        std::iter::once(SiteSelection::All)
            .chain(sites.iter().map(SiteSelection::Site))
            .collect()
    }

    pub fn site(&self) -> Option<&'static Site> {
        match self {
            SiteSelection::All => None,
            SiteSelection::Site(s) => Some(s),
        }
    }
}

impl FromStr for SiteSelection {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SiteSelection::parse(s, SITES)
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteSelection::All => write!(f, "{ALL_LABEL}"),
            SiteSelection::Site(s) => write!(f, "{}", s.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Row filtering
// ---------------------------------------------------------------------------

/// Return indices of rows belonging to the selection, in table order.
///
/// * `All` → every row
/// * `Site(s)` → rows whose `site` cell equals `s.name`; none if the
///   table has no `site` column
pub fn filtered_indices(table: &Table, selection: SiteSelection) -> Vec<usize> {
    match selection {
        SiteSelection::All => (0..table.len()).collect(),
        SiteSelection::Site(site) => table
            .column(SITE_COLUMN)
            .enumerate()
            .filter(|(_, cell)| cell.as_str() == Some(site.name))
            .map(|(i, _)| i)
            .collect(),
    }
}

/// Order-preserving subset of `table` for the selection. `All` returns
/// the table unchanged.
pub fn filter(table: &Table, selection: SiteSelection) -> Table {
    match selection {
        SiteSelection::All => table.clone(),
        SiteSelection::Site(_) => table.select_rows(&filtered_indices(table, selection)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn merged() -> Table {
        let rows = ["송도고", "하늘고", "송도고", "동산고"]
            .iter()
            .enumerate()
            .map(|(i, s)| vec![CellValue::Integer(i as i64), CellValue::from(*s)])
            .collect();
        Table::new(vec!["n".into(), SITE_COLUMN.into()], rows)
    }

    #[test]
    fn all_returns_everything() {
        let t = merged();
        assert_eq!(filter(&t, SiteSelection::All), t);
    }

    #[test]
    fn site_subset_preserves_order() {
        let t = merged();
        let sel = SiteSelection::parse("송도고", SITES).unwrap();
        let f = filter(&t, sel);
        assert_eq!(f.len(), 2);
        assert_eq!(f.numeric_column("n"), vec![0.0, 2.0]);
        assert!(f.column(SITE_COLUMN).all(|c| c.as_str() == Some("송도고")));
    }

    #[test]
    fn absent_site_gives_empty() {
        let t = merged();
        let sel = SiteSelection::parse("아라고", SITES).unwrap();
        assert!(filter(&t, sel).is_empty());
        assert!(filter(&Table::default(), sel).is_empty());
    }

    #[test]
    fn parse_selection() {
        assert_eq!("전체".parse::<SiteSelection>().unwrap(), SiteSelection::All);
        assert_eq!("ALL".parse::<SiteSelection>().unwrap(), SiteSelection::All);
        assert!(matches!(
            "nowhere".parse::<SiteSelection>(),
            Err(DataError::UnknownSite(_))
        ));
        let opts = SiteSelection::options(SITES);
        assert_eq!(opts.len(), 5);
        assert_eq!(opts[1].to_string(), "송도고");
    }
}
