use crate::data::aggregate::Aggregates;
use crate::data::error::Result;
use crate::data::filter::SiteSelection;
use crate::pipeline::{FilteredView, Pipeline};
use crate::state::DashboardState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// Dashboard app: pipeline + selection state + rendering
// ---------------------------------------------------------------------------

pub struct DashboardApp<'p> {
    pub pipeline: &'p Pipeline,
    pub state: DashboardState,
}

impl<'p> DashboardApp<'p> {
    /// Load (or reuse) the pipeline's dataset and select every site.
    pub fn new(pipeline: &'p Pipeline) -> Self {
        let state = DashboardState::new(pipeline.load(), pipeline.config().sites);
        Self { pipeline, state }
    }

    pub fn select(&mut self, selection: SiteSelection) {
        self.state.set_selection(selection);
    }

    /// Both tables restricted to the current selection.
    pub fn view(&self) -> FilteredView {
        self.pipeline.filter(self.state.selection)
    }

    pub fn aggregates(&self) -> Aggregates {
        self.pipeline.aggregate(&self.view())
    }

    /// Render every section for the current selection.
    pub fn render(&self) -> Result<String> {
        let mut out = panels::diagnostics(&self.state.dataset.diagnostics);
        if let Some(msg) = &self.state.status_message {
            out.push_str(msg);
            out.push('\n');
            return Ok(out);
        }

        let agg = self.aggregates();
        for section in [
            panels::overview(&self.state, &agg)?,
            panels::environment(&self.state, &agg)?,
            panels::growth(&self.state, &agg)?,
        ] {
            out.push('\n');
            out.push_str(&section);
        }
        Ok(out)
    }
}
