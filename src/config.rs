use std::path::PathBuf;

use crate::data::normalize::normalize;

// ---------------------------------------------------------------------------
// Static site table
// ---------------------------------------------------------------------------

/// One experimental site and the nutrient-solution EC it was run at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Site (school) name as it appears in file and sheet names.
    pub name: &'static str,
    /// Target electrical conductivity the site was configured to maintain.
    pub target_ec: f64,
    /// Display colour as `#rrggbb`.
    pub color: &'static str,
    /// Display rank, 1-based.
    pub order: u8,
    /// Optional remark shown in the condition overview.
    pub note: Option<&'static str>,
}

/// The four study sites, in display order.
pub static SITES: &[Site] = &[
    Site {
        name: "송도고",
        target_ec: 1.0,
        color: "#1f77b4",
        order: 1,
        note: None,
    },
    Site {
        name: "하늘고",
        target_ec: 2.0,
        color: "#2ca02c",
        order: 2,
        note: Some("최적 (Target)"),
    },
    Site {
        name: "아라고",
        target_ec: 4.0,
        color: "#ff7f0e",
        order: 3,
        note: None,
    },
    Site {
        name: "동산고",
        target_ec: 8.0,
        color: "#d62728",
        order: 4,
        note: None,
    },
];

/// Look up a configured site by name (NFC-normalized before comparison).
pub fn site_by_name(sites: &'static [Site], name: &str) -> Option<&'static Site> {
    let wanted = normalize(name.trim());
    sites.iter().find(|s| normalize(s.name) == wanted)
}

// ---------------------------------------------------------------------------
// File markers and column names
// ---------------------------------------------------------------------------

/// Suffix appended to a site name to find its environment CSV.
pub const ENVIRONMENT_MARKER: &str = "_환경데이터";

/// Fragment identifying the growth-result workbook.
pub const GROWTH_WORKBOOK_FRAGMENT: &str = "4개교_생육결과데이터";

pub const ENVIRONMENT_EXTENSION: &str = "csv";
pub const GROWTH_EXTENSION: &str = "xlsx";

/// Column added to every loaded row holding the site name.
pub const SITE_COLUMN: &str = "site";
/// Column added to every loaded row holding the site's target EC.
pub const TARGET_EC_COLUMN: &str = "target_ec";

pub const TIME_COLUMN: &str = "time";
pub const TEMPERATURE_COLUMN: &str = "temperature";
pub const HUMIDITY_COLUMN: &str = "humidity";
pub const PH_COLUMN: &str = "ph";
pub const EC_COLUMN: &str = "ec";

/// Keyword fragments used to discover growth measurement columns.
pub const FRESH_WEIGHT_KEYWORD: &str = "생중량";
pub const LEAF_KEYWORD: &str = "잎";
pub const SHOOT_LENGTH_KEYWORD: &str = "지상부";
pub const ROOT_LENGTH_KEYWORD: &str = "지하부";

/// Sheet name used for the growth export workbook.
pub const GROWTH_EXPORT_SHEET: &str = "Growth_Data";

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Where to read data from and which sites to expect.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub sites: &'static [Site],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sites: SITES,
        }
    }
}

impl DashboardConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }
}
