use std::sync::{Arc, OnceLock};

use crate::config::DashboardConfig;
use crate::data::aggregate::Aggregates;
use crate::data::diagnostics::Diagnostic;
use crate::data::filter::{filter, SiteSelection};
use crate::data::loader::{load_environment, load_growth};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Dataset – the result of one load pass
// ---------------------------------------------------------------------------

/// Both merged tables plus every diagnostic raised while loading them.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub environment: Table,
    pub growth: Table,
    pub diagnostics: Vec<Diagnostic>,
}

impl Dataset {
    /// There is something to show unless both tables are empty.
    pub fn is_renderable(&self) -> bool {
        !(self.environment.is_empty() && self.growth.is_empty())
    }
}

/// The two tables restricted to one site selection.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub selection: SiteSelection,
    pub environment: Table,
    pub growth: Table,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Load → filter → aggregate, with the load step computed at most once.
///
/// The cache is keyed on nothing: files added or changed after the first
/// [`Pipeline::load`] are not picked up by the same pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: DashboardConfig,
    dataset: OnceLock<Arc<Dataset>>,
}

impl Pipeline {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: OnceLock::new(),
        }
    }

    /// Process-wide pipeline over the default configuration.
    pub fn global() -> &'static Pipeline {
        static GLOBAL: OnceLock<Pipeline> = OnceLock::new();
        GLOBAL.get_or_init(|| Pipeline::new(DashboardConfig::default()))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Load both sources, or return the cached result of an earlier call.
    pub fn load(&self) -> Arc<Dataset> {
        self.dataset
            .get_or_init(|| Arc::new(self.load_uncached()))
            .clone()
    }

    fn load_uncached(&self) -> Dataset {
        let dir = &self.config.data_dir;
        log::info!("loading data from {}", dir.display());
        if !dir.is_dir() {
            log::warn!("data directory {} does not exist", dir.display());
        }

        let env = load_environment(dir, self.config.sites);
        let growth = load_growth(dir, self.config.sites);

        let mut diagnostics = env.diagnostics;
        diagnostics.extend(growth.diagnostics);

        Dataset {
            environment: env.table,
            growth: growth.table,
            diagnostics,
        }
    }

    /// Restrict the loaded tables to `selection`.
    pub fn filter(&self, selection: SiteSelection) -> FilteredView {
        let dataset = self.load();
        FilteredView {
            environment: filter(&dataset.environment, selection),
            growth: filter(&dataset.growth, selection),
            selection,
        }
    }

    /// Compute the dashboard aggregates for a filtered view.
    pub fn aggregate(&self, view: &FilteredView) -> Aggregates {
        let dataset = self.load();
        Aggregates::compute(
            &dataset.environment,
            &dataset.growth,
            &view.environment,
            &view.growth,
            self.config.sites,
        )
    }
}
