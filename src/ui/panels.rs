use crate::data::aggregate::{Aggregates, BoxStats, Correlation};
use crate::data::diagnostics::Diagnostic;
use crate::data::error::Result;
use crate::data::model::{CellValue, Table};
use crate::state::DashboardState;
use crate::ui::table::pretty;

const MAX_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// One line per load diagnostic, empty if there were none.
pub fn diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{d}\n"))
        .collect()
}

// ---------------------------------------------------------------------------
// Overview section
// ---------------------------------------------------------------------------

/// Join section lines, each terminated by a newline.
fn section(lines: Vec<String>) -> String {
    lines.into_iter().map(|l| l + "\n").collect()
}

/// Experiment conditions and the headline metrics for the selection.
pub fn overview(state: &DashboardState, agg: &Aggregates) -> Result<String> {
    let conditions = Table::new(
        vec![
            "학교명".into(),
            "목표 EC".into(),
            "개체수(n)".into(),
            "비고".into(),
        ],
        agg.conditions
            .iter()
            .map(|c| {
                vec![
                    CellValue::from(c.site),
                    CellValue::Float(c.target_ec),
                    CellValue::Integer(c.count as i64),
                    CellValue::from(c.note),
                ]
            })
            .collect(),
    );

    let m = &agg.metrics;
    let mut lines = vec![
        format!("== 실험 개요 ({}) ==", state.selection),
        pretty(&conditions, MAX_ROWS)?,
        format!("총 분석 개체수: {}개", m.total_specimens),
        format!("평균 온도: {:.1}°C", m.mean_temperature),
        format!("평균 습도: {:.1}%", m.mean_humidity),
    ];
    if let Some(best) = &agg.best_site {
        lines.push(format!(
            "최적 EC 농도: EC {:.1} ({})",
            best.target_ec,
            state.color_map.paint(best.site, best.site)
        ));
    }
    Ok(section(lines))
}

// ---------------------------------------------------------------------------
// Environment section
// ---------------------------------------------------------------------------

/// Per-site environment means, plus the selected site's target EC and rows.
pub fn environment(state: &DashboardState, agg: &Aggregates) -> Result<String> {
    let mut lines = vec!["== 환경 데이터 ==".to_string()];

    if state.dataset.environment.is_empty() {
        lines.push("환경 데이터가 로드되지 않았습니다.".into());
        return Ok(section(lines));
    }

    lines.push(pretty(&agg.environment_means.to_table(), MAX_ROWS)?);
    if let Some(target) = state.target_ec() {
        lines.push(format!("목표 EC: {target}"));
    }
    let filtered = state.filtered_environment();
    lines.push(format!("{} rows ({})", filtered.len(), state.selection));
    lines.push(pretty(&filtered, MAX_ROWS)?);
    Ok(section(lines))
}

// ---------------------------------------------------------------------------
// Growth section
// ---------------------------------------------------------------------------

fn box_table(stats: &[BoxStats]) -> Table {
    Table::new(
        ["site", "n", "min", "q1", "median", "q3", "max"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        stats
            .iter()
            .map(|b| {
                vec![
                    CellValue::from(b.site),
                    CellValue::Integer(b.n as i64),
                    CellValue::Float(b.min),
                    CellValue::Float(b.q1),
                    CellValue::Float(b.median),
                    CellValue::Float(b.q3),
                    CellValue::Float(b.max),
                ]
            })
            .collect(),
    )
}

fn trendline(label: &str, c: &Correlation) -> String {
    format!(
        "  {label}: r = {:.3}, y = {:.3}x + {:.3} (n = {})",
        c.r, c.slope, c.intercept, c.n
    )
}

/// Growth comparison: best site, per-site means, weight distribution and
/// the per-site leaf-count/fresh-weight trendlines.
pub fn growth(state: &DashboardState, agg: &Aggregates) -> Result<String> {
    let mut lines = vec!["== 생육 결과 ==".to_string()];

    if state.dataset.growth.is_empty() {
        lines.push("생육 데이터가 로드되지 않았습니다.".into());
        return Ok(section(lines));
    }

    if let Some(best) = &agg.best_site {
        lines.push(format!(
            "평균 생중량이 가장 높은 조건은 {} (EC {}) 입니다. (평균 {:.2} g)",
            state.color_map.paint(best.site, best.site),
            best.target_ec,
            best.mean
        ));
    }

    lines.push(pretty(&agg.growth_means.to_table(), MAX_ROWS)?);

    if !agg.fresh_weight_box.is_empty() {
        lines.push("생중량 분포".into());
        lines.push(pretty(&box_table(&agg.fresh_weight_box), MAX_ROWS)?);
    }

    if !agg.leaf_vs_weight.is_empty() {
        lines.push("잎 수 vs 생중량".into());
        for site_fit in &agg.leaf_vs_weight {
            let label = state.color_map.paint(site_fit.site, site_fit.site);
            lines.push(trendline(&label, &site_fit.fit));
        }
        if agg.leaf_vs_weight.len() > 1 {
            if let Some(pooled) = &agg.leaf_vs_weight_pooled {
                lines.push(trendline("전체", pooled));
            }
        }
    }
    Ok(section(lines))
}
