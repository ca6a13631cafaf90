//! Aggregates feeding the dashboard views: per-site means and counts,
//! the best-performing site, box-plot summaries, the leaf-count/weight
//! correlation and per-site time series.
//!
//! Every function is pure and takes an already filtered [`Table`].

use chrono::NaiveDateTime;
use serde::Serialize;

use super::model::{CellValue, Table};
use crate::config::{
    Site, EC_COLUMN, FRESH_WEIGHT_KEYWORD, HUMIDITY_COLUMN, LEAF_KEYWORD, PH_COLUMN,
    ROOT_LENGTH_KEYWORD, SHOOT_LENGTH_KEYWORD, SITE_COLUMN, TARGET_EC_COLUMN,
    TEMPERATURE_COLUMN, TIME_COLUMN,
};

// ---------------------------------------------------------------------------
// Column discovery
// ---------------------------------------------------------------------------

/// First column (in table order) whose name contains `fragment`.
pub fn find_column<'a>(table: &'a Table, fragment: &str) -> Option<&'a str> {
    table
        .columns()
        .iter()
        .find(|c| c.contains(fragment))
        .map(String::as_str)
}

/// Growth measurement columns, located by keyword since upstream sheets
/// do not name them consistently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GrowthColumns {
    pub fresh_weight: Option<String>,
    pub leaf_count: Option<String>,
    pub shoot_length: Option<String>,
    pub root_length: Option<String>,
}

impl GrowthColumns {
    pub fn discover(table: &Table) -> Self {
        let find = |kw: &str| find_column(table, kw).map(str::to_string);
        Self {
            fresh_weight: find(FRESH_WEIGHT_KEYWORD),
            leaf_count: find(LEAF_KEYWORD),
            shoot_length: find(SHOOT_LENGTH_KEYWORD),
            root_length: find(ROOT_LENGTH_KEYWORD),
        }
    }

    /// The discovered columns, in display order.
    pub fn present(&self) -> Vec<&str> {
        [
            &self.fresh_weight,
            &self.leaf_count,
            &self.shoot_length,
            &self.root_length,
        ]
        .into_iter()
        .filter_map(|c| c.as_deref())
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Means and counts
// ---------------------------------------------------------------------------

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean of the numeric cells of `column`; `None` if there are none.
pub fn mean(table: &Table, column: &str) -> Option<f64> {
    mean_of(&table.numeric_column(column))
}

fn site_rows<'a>(table: &'a Table, site: &'a str) -> impl Iterator<Item = &'a Vec<CellValue>> + 'a {
    let idx = table.column_index(SITE_COLUMN);
    table
        .rows()
        .iter()
        .filter(move |row| idx.is_some_and(|i| row[i].as_str() == Some(site)))
}

fn site_values(table: &Table, site: &str, column: &str) -> Vec<f64> {
    let Some(col) = table.column_index(column) else {
        return Vec::new();
    };
    site_rows(table, site)
        .filter_map(|row| row[col].as_f64())
        .collect()
}

/// Row count per configured site, zero for sites with no rows.
pub fn site_counts(table: &Table, sites: &[Site]) -> Vec<(&'static str, usize)> {
    sites
        .iter()
        .map(|s| (s.name, site_rows(table, s.name).count()))
        .collect()
}

/// One site's row of a [`GroupMeans`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteMeans {
    pub site: &'static str,
    pub count: usize,
    /// Aligned with [`GroupMeans::columns`].
    pub means: Vec<Option<f64>>,
}

/// Per-site means of a set of columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMeans {
    pub columns: Vec<String>,
    pub rows: Vec<SiteMeans>,
}

impl GroupMeans {
    pub fn get(&self, site: &str, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.site == site)
            .and_then(|r| r.means[col])
    }

    /// Render as a table (`site`, `n`, then one column per mean).
    pub fn to_table(&self) -> Table {
        let mut columns = vec![SITE_COLUMN.to_string(), "n".to_string()];
        columns.extend(self.columns.iter().cloned());
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut row = vec![CellValue::from(r.site), CellValue::Integer(r.count as i64)];
                row.extend(
                    r.means
                        .iter()
                        .map(|m| m.map(CellValue::Float).unwrap_or(CellValue::Null)),
                );
                row
            })
            .collect();
        Table::new(columns, rows)
    }
}

/// Group rows by site and average each of `columns`. Rows come out in
/// configured site order; sites with no rows are left out.
pub fn group_means(table: &Table, columns: &[&str], sites: &[Site]) -> GroupMeans {
    let rows = sites
        .iter()
        .filter_map(|site| {
            let count = site_rows(table, site.name).count();
            if count == 0 {
                return None;
            }
            let means = columns
                .iter()
                .map(|c| mean_of(&site_values(table, site.name, c)))
                .collect();
            Some(SiteMeans {
                site: site.name,
                count,
                means,
            })
        })
        .collect();

    GroupMeans {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// Environment columns averaged per site for the comparison view.
pub const ENVIRONMENT_MEAN_COLUMNS: &[&str] = &[
    TEMPERATURE_COLUMN,
    HUMIDITY_COLUMN,
    PH_COLUMN,
    EC_COLUMN,
    TARGET_EC_COLUMN,
];

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// One line of the experiment-condition overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionRow {
    pub site: &'static str,
    pub target_ec: f64,
    pub count: usize,
    pub note: &'static str,
}

/// Site, target EC, growth specimen count and note for every configured site.
pub fn condition_overview(growth: &Table, sites: &[Site]) -> Vec<ConditionRow> {
    sites
        .iter()
        .zip(site_counts(growth, sites))
        .map(|(site, (_, count))| ConditionRow {
            site: site.name,
            target_ec: site.target_ec,
            count,
            note: site.note.unwrap_or("-"),
        })
        .collect()
}

/// Headline numbers for the current selection. Means default to 0 when
/// there is nothing to average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_specimens: usize,
    pub mean_temperature: f64,
    pub mean_humidity: f64,
}

pub fn summary_metrics(environment: &Table, growth: &Table) -> SummaryMetrics {
    SummaryMetrics {
        total_specimens: growth.len(),
        mean_temperature: mean(environment, TEMPERATURE_COLUMN).unwrap_or(0.0),
        mean_humidity: mean(environment, HUMIDITY_COLUMN).unwrap_or(0.0),
    }
}

/// The site with the highest mean of some measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSite {
    pub site: &'static str,
    pub target_ec: f64,
    pub mean: f64,
}

/// Site with the highest mean of `column`. On ties the site configured
/// first wins.
pub fn best_site_by(table: &Table, column: &str, sites: &[Site]) -> Option<BestSite> {
    let mut best: Option<BestSite> = None;
    for site in sites {
        let Some(m) = mean_of(&site_values(table, site.name, column)) else {
            continue;
        };
        if best.as_ref().map_or(true, |b| m > b.mean) {
            best = Some(BestSite {
                site: site.name,
                target_ec: site.target_ec,
                mean: m,
            });
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Distributions and correlation
// ---------------------------------------------------------------------------

/// Five-number summary for one site's box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub site: &'static str,
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Quantile of sorted data with linear interpolation between ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Per-site five-number summaries of `column`; sites without values are
/// left out.
pub fn box_stats(table: &Table, column: &str, sites: &[Site]) -> Vec<BoxStats> {
    sites
        .iter()
        .filter_map(|site| {
            let mut values = site_values(table, site.name, column);
            if values.is_empty() {
                return None;
            }
            values.sort_by(f64::total_cmp);
            Some(BoxStats {
                site: site.name,
                n: values.len(),
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            })
        })
        .collect()
}

/// Pearson correlation and least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub n: usize,
    pub r: f64,
    pub slope: f64,
    pub intercept: f64,
}

fn numeric_pairs<'a>(
    rows: impl Iterator<Item = &'a Vec<CellValue>>,
    xi: usize,
    yi: usize,
) -> Vec<(f64, f64)> {
    rows.filter_map(|row| Some((row[xi].as_f64()?, row[yi].as_f64()?)))
        .collect()
}

fn least_squares(pairs: &[(f64, f64)]) -> Option<Correlation> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (px, py) in pairs {
        let dx = px - mx;
        let dy = py - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(Correlation {
        n,
        r: sxy / (sxx * syy).sqrt(),
        slope,
        intercept: my - slope * mx,
    })
}

/// Correlate two columns over rows where both are numeric, pooling every
/// row. `None` with fewer than two points or when either column is
/// constant.
pub fn correlation(table: &Table, x: &str, y: &str) -> Option<Correlation> {
    let xi = table.column_index(x)?;
    let yi = table.column_index(y)?;
    least_squares(&numeric_pairs(table.rows().iter(), xi, yi))
}

/// One site's trendline in the leaf-count/weight scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteCorrelation {
    pub site: &'static str,
    #[serde(flatten)]
    pub fit: Correlation,
}

/// Separate fit per configured site, in site order. Sites with too few
/// points or no variance are left out.
pub fn correlation_by_site(table: &Table, x: &str, y: &str, sites: &[Site]) -> Vec<SiteCorrelation> {
    let (Some(xi), Some(yi)) = (table.column_index(x), table.column_index(y)) else {
        return Vec::new();
    };
    sites
        .iter()
        .filter_map(|site| {
            let fit = least_squares(&numeric_pairs(site_rows(table, site.name), xi, yi))?;
            Some(SiteCorrelation {
                site: site.name,
                fit,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub site: &'static str,
    pub time: NaiveDateTime,
    pub value: f64,
}

/// Points of `column` with a known time and numeric value, ordered by
/// configured site then time. Rows with an unknown time are left out.
pub fn time_series(table: &Table, column: &str, sites: &[Site]) -> Vec<TimePoint> {
    let (Some(ti), Some(vi)) = (table.column_index(TIME_COLUMN), table.column_index(column)) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    for site in sites {
        let start = points.len();
        points.extend(site_rows(table, site.name).filter_map(|row| {
            Some(TimePoint {
                site: site.name,
                time: row[ti].as_datetime()?,
                value: row[vi].as_f64()?,
            })
        }));
        points[start..].sort_by_key(|p| p.time);
    }
    points
}

// ---------------------------------------------------------------------------
// Dashboard bundle
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for one selection.
///
/// Cross-site comparisons (condition overview, per-site means, best site)
/// use the full tables; metrics, box plots and the trendlines follow the
/// selection. Trendlines are fitted per site, with the pooled fit kept
/// alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub conditions: Vec<ConditionRow>,
    pub metrics: SummaryMetrics,
    pub environment_means: GroupMeans,
    pub growth_columns: GrowthColumns,
    pub growth_means: GroupMeans,
    pub best_site: Option<BestSite>,
    pub fresh_weight_box: Vec<BoxStats>,
    pub leaf_vs_weight: Vec<SiteCorrelation>,
    pub leaf_vs_weight_pooled: Option<Correlation>,
}

impl Aggregates {
    pub fn compute(
        environment: &Table,
        growth: &Table,
        filtered_environment: &Table,
        filtered_growth: &Table,
        sites: &[Site],
    ) -> Self {
        let growth_columns = GrowthColumns::discover(growth);
        let growth_means = group_means(growth, &growth_columns.present(), sites);

        let (best_site, fresh_weight_box) = match &growth_columns.fresh_weight {
            Some(fw) => (
                best_site_by(growth, fw, sites),
                box_stats(filtered_growth, fw, sites),
            ),
            None => (None, Vec::new()),
        };
        let (leaf_vs_weight, leaf_vs_weight_pooled) =
            match (&growth_columns.leaf_count, &growth_columns.fresh_weight) {
                (Some(leaf), Some(fw)) => (
                    correlation_by_site(filtered_growth, leaf, fw, sites),
                    correlation(filtered_growth, leaf, fw),
                ),
                _ => (Vec::new(), None),
            };

        Aggregates {
            conditions: condition_overview(growth, sites),
            metrics: summary_metrics(filtered_environment, filtered_growth),
            environment_means: group_means(environment, ENVIRONMENT_MEAN_COLUMNS, sites),
            growth_columns,
            growth_means,
            best_site,
            fresh_weight_box,
            leaf_vs_weight,
            leaf_vs_weight_pooled,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::SITES;

    fn growth() -> Table {
        let columns = vec![
            "개체번호".to_string(),
            "잎 수(장)".to_string(),
            "지상부 길이(mm)".to_string(),
            "생중량(g)".to_string(),
            SITE_COLUMN.to_string(),
        ];
        let data = [
            ("송도고", 4.0, 1.0),
            ("송도고", 6.0, 3.0),
            ("하늘고", 8.0, 6.0),
            ("하늘고", 10.0, 8.0),
            ("하늘고", 12.0, 10.0),
        ];
        let rows = data
            .iter()
            .enumerate()
            .map(|(i, (site, leaf, fw))| {
                vec![
                    CellValue::Integer(i as i64),
                    CellValue::Float(*leaf),
                    CellValue::Null,
                    CellValue::Float(*fw),
                    CellValue::from(*site),
                ]
            })
            .collect();
        Table::new(columns, rows)
    }

    #[test]
    fn discovers_growth_columns() {
        let cols = GrowthColumns::discover(&growth());
        assert_eq!(cols.fresh_weight.as_deref(), Some("생중량(g)"));
        assert_eq!(cols.leaf_count.as_deref(), Some("잎 수(장)"));
        assert_eq!(cols.shoot_length.as_deref(), Some("지상부 길이(mm)"));
        assert_eq!(cols.root_length, None);
        assert_eq!(cols.present().len(), 3);
    }

    #[test]
    fn first_matching_column_wins() {
        let t = Table::new(vec!["잎 길이".into(), "잎 수".into()], Vec::new());
        assert_eq!(find_column(&t, "잎"), Some("잎 길이"));
    }

    #[test]
    fn group_means_follow_site_order() {
        let g = group_means(&growth(), &["생중량(g)", "지상부 길이(mm)"], SITES);
        assert_eq!(g.rows.len(), 2);
        assert_eq!(g.rows[0].site, "송도고");
        assert_eq!(g.get("송도고", "생중량(g)"), Some(2.0));
        assert_eq!(g.get("하늘고", "생중량(g)"), Some(8.0));
        assert_eq!(g.get("하늘고", "지상부 길이(mm)"), None);

        let t = g.to_table();
        assert_eq!(t.columns()[..2], [SITE_COLUMN.to_string(), "n".to_string()]);
        assert_eq!(t.cell(1, "n"), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn counts_and_overview_cover_every_site() {
        let overview = condition_overview(&growth(), SITES);
        assert_eq!(overview.len(), 4);
        assert_eq!(overview[1].count, 3);
        assert_eq!(overview[1].note, "최적 (Target)");
        assert_eq!(overview[3].count, 0);
        assert_eq!(overview[3].note, "-");
    }

    #[test]
    fn best_site_and_ties() {
        let best = best_site_by(&growth(), "생중량(g)", SITES).unwrap();
        assert_eq!(best.site, "하늘고");
        assert_eq!(best.target_ec, 2.0);

        let tied = Table::new(
            vec!["w".into(), SITE_COLUMN.into()],
            vec![
                vec![CellValue::Float(1.0), CellValue::from("동산고")],
                vec![CellValue::Float(1.0), CellValue::from("아라고")],
            ],
        );
        assert_eq!(best_site_by(&tied, "w", SITES).unwrap().site, "아라고");
        assert!(best_site_by(&Table::default(), "w", SITES).is_none());
    }

    #[test]
    fn box_stats_interpolate() {
        let stats = box_stats(&growth(), "생중량(g)", SITES);
        assert_eq!(stats.len(), 2);
        let h = &stats[1];
        assert_eq!((h.n, h.min, h.median, h.max), (3, 6.0, 8.0, 10.0));
        assert_relative_eq!(h.q1, 7.0);
        assert_relative_eq!(h.q3, 9.0);
    }

    #[test]
    fn correlation_of_linear_data() {
        let c = correlation(&growth(), "잎 수(장)", "생중량(g)").unwrap();
        assert_eq!(c.n, 5);
        assert!(c.r > 0.99);

        let line = Table::new(
            vec!["x".into(), "y".into()],
            (0..4)
                .map(|i| vec![CellValue::Float(i as f64), CellValue::Float(2.0 * i as f64 + 1.0)])
                .collect(),
        );
        let c = correlation(&line, "x", "y").unwrap();
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.slope, 2.0);
        assert_relative_eq!(c.intercept, 1.0);
    }

    #[test]
    fn correlation_needs_variance() {
        let flat = Table::new(
            vec!["x".into(), "y".into()],
            vec![
                vec![CellValue::Float(1.0), CellValue::Float(1.0)],
                vec![CellValue::Float(1.0), CellValue::Float(2.0)],
            ],
        );
        assert!(correlation(&flat, "x", "y").is_none());
        assert!(correlation(&flat, "x", "missing").is_none());
    }

    #[test]
    fn trendlines_are_fitted_per_site() {
        // within each site weight falls with leaf count, but the site with
        // more leaves is much heavier, so the pooled fit rises
        let rows = [
            ("송도고", 1.0, 3.0),
            ("송도고", 2.0, 2.0),
            ("송도고", 3.0, 1.0),
            ("하늘고", 10.0, 22.0),
            ("하늘고", 11.0, 21.0),
            ("하늘고", 12.0, 20.0),
            ("아라고", 5.0, 4.0),
        ]
        .iter()
        .map(|(site, x, y)| {
            vec![CellValue::Float(*x), CellValue::Float(*y), CellValue::from(*site)]
        })
        .collect();
        let t = Table::new(vec!["x".into(), "y".into(), SITE_COLUMN.into()], rows);

        let fits = correlation_by_site(&t, "x", "y", SITES);
        let sites: Vec<&str> = fits.iter().map(|f| f.site).collect();
        assert_eq!(sites, vec!["송도고", "하늘고"]);
        for f in &fits {
            assert_relative_eq!(f.fit.slope, -1.0);
            assert_relative_eq!(f.fit.r, -1.0);
        }
        assert_relative_eq!(fits[1].fit.intercept, 32.0);

        let pooled = correlation(&t, "x", "y").unwrap();
        assert!(pooled.slope > 0.0);
        assert!(correlation_by_site(&t, "x", "missing", SITES).is_empty());
    }

    #[test]
    fn metrics_default_to_zero() {
        let m = summary_metrics(&Table::default(), &Table::default());
        assert_eq!(m.total_specimens, 0);
        assert_eq!(m.mean_temperature, 0.0);
    }

    #[test]
    fn time_series_sorted_within_site() {
        let t = |s: &str| {
            CellValue::DateTime(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap())
        };
        let table = Table::new(
            vec![TIME_COLUMN.into(), "temperature".into(), SITE_COLUMN.into()],
            vec![
                vec![t("2024-05-02 00:00"), CellValue::Float(2.0), CellValue::from("하늘고")],
                vec![t("2024-05-01 00:00"), CellValue::Float(1.0), CellValue::from("하늘고")],
                vec![CellValue::Null, CellValue::Float(9.0), CellValue::from("하늘고")],
                vec![t("2024-05-03 00:00"), CellValue::Float(3.0), CellValue::from("송도고")],
            ],
        );
        let pts = time_series(&table, "temperature", SITES);
        let values: Vec<f64> = pts.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn aggregates_without_weight_column() {
        let env = Table::default();
        let g = Table::new(vec![SITE_COLUMN.into()], vec![vec![CellValue::from("송도고")]]);
        let a = Aggregates::compute(&env, &g, &env, &g, SITES);
        assert!(a.best_site.is_none());
        assert!(a.fresh_weight_box.is_empty());
        assert!(a.leaf_vs_weight.is_empty());
        assert!(a.leaf_vs_weight_pooled.is_none());
        assert_eq!(a.metrics.total_specimens, 1);
        assert!(a.environment_means.rows.is_empty());
    }
}
