use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::Site;
use crate::data::filter::{filtered_indices, SiteSelection};
use crate::data::model::Table;
use crate::pipeline::Dataset;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Selection state over a loaded dataset, independent of any front-end.
pub struct DashboardState {
    /// Loaded dataset, shared with the pipeline cache.
    pub dataset: Arc<Dataset>,

    /// Current site selection.
    pub selection: SiteSelection,

    /// Environment rows passing the current selection (cached).
    pub visible_environment: Vec<usize>,

    /// Growth rows passing the current selection (cached).
    pub visible_growth: Vec<usize>,

    /// Site colours.
    pub color_map: ColorMap,

    /// Status / error message for the front-end.
    pub status_message: Option<String>,
}

impl DashboardState {
    /// Start with every site selected.
    pub fn new(dataset: Arc<Dataset>, sites: &'static [Site]) -> Self {
        let status_message = (!dataset.is_renderable())
            .then(|| "데이터가 없습니다. `data/` 폴더에 파일이 있는지 확인해주세요.".to_string());

        let mut state = Self {
            dataset,
            selection: SiteSelection::All,
            visible_environment: Vec::new(),
            visible_growth: Vec::new(),
            color_map: ColorMap::new(sites),
            status_message,
        };
        state.refilter();
        state
    }

    /// Change the selection and recompute the visible rows.
    pub fn set_selection(&mut self, selection: SiteSelection) {
        self.selection = selection;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible_environment = filtered_indices(&self.dataset.environment, self.selection);
        self.visible_growth = filtered_indices(&self.dataset.growth, self.selection);
    }

    /// Materialise the environment rows for the current selection.
    pub fn filtered_environment(&self) -> Table {
        self.dataset
            .environment
            .select_rows(&self.visible_environment)
    }

    /// Materialise the growth rows for the current selection.
    pub fn filtered_growth(&self) -> Table {
        self.dataset.growth.select_rows(&self.visible_growth)
    }

    /// Target EC of the selected site, for the reference line on EC charts.
    pub fn target_ec(&self) -> Option<f64> {
        self.selection.site().map(|s| s.target_ec)
    }
}
