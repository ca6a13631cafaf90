use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;

use ec_dashboard::config::{
    Site, ENVIRONMENT_MARKER, GROWTH_WORKBOOK_FRAGMENT, SITES,
};
use ec_dashboard::data::export::{table_to_csv, tables_to_xlsx};
use ec_dashboard::data::model::{CellValue, Table};

/// Write a synthetic data directory (four environment CSVs and the growth
/// workbook) for trying out the dashboard.
#[derive(Debug, Parser)]
struct Args {
    /// Output directory, created if missing
    #[arg(default_value = "data")]
    out_dir: PathBuf,

    /// Hourly readings per site
    #[arg(long, default_value_t = 72)]
    hours: usize,

    /// Specimens per site
    #[arg(long, default_value_t = 12)]
    specimens: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// SplitMix64 stream with a Box-Muller normal on top. The spare deviate
/// from each pair is kept for the next call.
struct SampleRng {
    state: u64,
    spare: Option<f64>,
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng {
            state: seed,
            spare: None,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z = match self.spare.take() {
            Some(z) => z,
            None => {
                let radius = (-2.0 * (1.0 - self.uniform()).ln()).sqrt();
                let angle = std::f64::consts::TAU * self.uniform();
                self.spare = Some(radius * angle.sin());
                radius * angle.cos()
            }
        };
        mean + std_dev * z
    }
}

fn round(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

fn environment_table(site: &Site, hours: usize, rng: &mut SampleRng) -> Table {
    let start = NaiveDate::from_ymd_opt(2025, 5, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let columns = ["time", "temperature", "humidity", "ph", "ec"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let rows = (0..hours)
        .map(|h| {
            let time = start + Duration::hours(h as i64);
            // daily temperature cycle
            let phase = (h % 24) as f64 / 24.0 * std::f64::consts::TAU;
            vec![
                CellValue::DateTime(time),
                CellValue::Float(round(rng.normal(21.0 + 2.0 * phase.sin(), 0.5), 1)),
                CellValue::Float(round(rng.normal(62.0, 4.0), 1)),
                CellValue::Float(round(rng.normal(6.2, 0.15), 2)),
                CellValue::Float(round(rng.normal(site.target_ec, site.target_ec * 0.05), 2)),
            ]
        })
        .collect();
    Table::new(columns, rows)
}

fn growth_table(site: &Site, specimens: usize, rng: &mut SampleRng) -> Table {
    // growth peaks around EC 2.0 and falls off on a log scale either side
    let stress = (site.target_ec / 2.0).log2().abs();
    let vigor = 1.0 / (1.0 + 0.6 * stress);

    let columns = [
        "개체번호",
        "잎 수(장)",
        "지상부 길이(mm)",
        "지하부길이(mm)",
        "생중량(g)",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    let rows = (1..=specimens)
        .map(|n| {
            let leaves = rng.normal(6.0 + 4.0 * vigor, 1.2).round().max(1.0);
            let shoot = rng.normal(60.0 + 60.0 * vigor, 8.0).max(5.0);
            let root = rng.normal(80.0 + 40.0 * vigor, 10.0).max(5.0);
            let weight = (0.25 * leaves * vigor + rng.normal(0.0, 0.2)).max(0.05);
            vec![
                CellValue::Integer(n as i64),
                CellValue::Float(leaves),
                CellValue::Float(round(shoot, 1)),
                CellValue::Float(round(root, 1)),
                CellValue::Float(round(weight, 3)),
            ]
        })
        .collect();
    Table::new(columns, rows)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SampleRng::new(args.seed);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    for site in SITES {
        let table = environment_table(site, args.hours, &mut rng);
        let path = args
            .out_dir
            .join(format!("{}{ENVIRONMENT_MARKER}.csv", site.name));
        std::fs::write(&path, table_to_csv(&table)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} readings to {}", table.len(), path.display());
    }

    let growth: Vec<Table> = SITES
        .iter()
        .map(|site| growth_table(site, args.specimens, &mut rng))
        .collect();
    let sheets: Vec<(&str, &Table)> = SITES.iter().map(|s| s.name).zip(&growth).collect();
    let path = args
        .out_dir
        .join(format!("{GROWTH_WORKBOOK_FRAGMENT}.xlsx"));
    std::fs::write(&path, tables_to_xlsx(&sheets)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!(
        "Wrote {} sheets x {} specimens to {}",
        sheets.len(),
        args.specimens,
        path.display()
    );

    Ok(())
}
