use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ec_dashboard::app::DashboardApp;
use ec_dashboard::config::{DashboardConfig, SITES};
use ec_dashboard::data::aggregate::time_series;
use ec_dashboard::data::export::{environment_csv, growth_xlsx};
use ec_dashboard::data::filter::SiteSelection;
use ec_dashboard::pipeline::Pipeline;

/// Polar plant EC study: environment and growth data summary.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory holding the per-site CSVs and the growth workbook
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Site to show, or 전체 / all
    #[arg(long, default_value = "전체")]
    site: String,

    /// Write the filtered environment table as CSV
    #[arg(long)]
    export_env: Option<PathBuf>,

    /// Write the filtered growth table as XLSX
    #[arg(long)]
    export_growth: Option<PathBuf>,

    /// Print the time series of one environment column (e.g. temperature)
    #[arg(long)]
    series: Option<String>,

    /// Print aggregates as JSON instead of text tables
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let selection = SiteSelection::parse(&cli.site, SITES)
        .with_context(|| format!("invalid --site {:?}", cli.site))?;

    let pipeline = Pipeline::new(DashboardConfig::with_data_dir(&cli.data_dir));
    let mut app = DashboardApp::new(&pipeline);
    app.select(selection);

    if !app.state.dataset.is_renderable() {
        eprint!("{}", ec_dashboard::ui::panels::diagnostics(&app.state.dataset.diagnostics));
        bail!(
            "no data: neither environment nor growth data could be loaded from {}",
            cli.data_dir.display()
        );
    }

    if cli.json {
        let agg = app.aggregates();
        let out = serde_json::json!({
            "selection": selection.to_string(),
            "diagnostics": app.state.dataset.diagnostics,
            "aggregates": agg,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", app.render().context("rendering dashboard")?);
    }

    let view = app.view();
    if let Some(column) = &cli.series {
        for p in time_series(&view.environment, column, SITES) {
            println!("{},{},{}", p.site, p.time, p.value);
        }
    }

    if let Some(path) = &cli.export_env {
        let bytes = environment_csv(&view.environment)
            .context("serializing environment CSV")?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    if let Some(path) = &cli.export_growth {
        let bytes =
            growth_xlsx(&view.growth).context("serializing growth workbook")?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
