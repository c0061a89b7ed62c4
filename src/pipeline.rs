use anyhow::{Context, Result};

use crate::category;
use crate::format;
use crate::points::Datapoints;
use crate::series::Series;

/// Stage checkpoint: raw series data received, format not yet consumed.
pub const RAW_DATA: &str = "raw-data";
/// Stage checkpoint: points validated and defaulted, ready for rewriting.
pub const POINTS_FINALIZED: &str = "points-finalized";

/// A data-processing stage. Stages mutate the shared series/buffer state in
/// place; a failing stage aborts the whole plot update.
pub type StageFn = fn(&mut Series, &mut Datapoints) -> Result<()>;

pub struct Stage {
    pub name: &'static str,
    pub run: StageFn,
}

/// An ordered list of named stages the host invokes in a fixed sequence,
/// once per data-processing pass.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, run: StageFn) {
        self.stages.push(Stage { name, run });
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name)
    }

    /// Run every stage in registration order against one series and its
    /// point buffer. Stops at the first failure, naming the stage.
    pub fn process(&self, series: &mut Series, datapoints: &mut Datapoints) -> Result<()> {
        for stage in &self.stages {
            (stage.run)(series, datapoints)
                .with_context(|| format!("Stage '{}' failed", stage.name))?;
        }
        Ok(())
    }
}

/// Register this crate's two stages: format negotiation at the raw-data
/// checkpoint, category mapping after points are finalized. Host stages for
/// numeric validation belong between the two.
pub fn install(pipeline: &mut Pipeline) {
    pipeline.register(RAW_DATA, format::negotiate_formats);
    pipeline.register(POINTS_FINALIZED, category::map_categories);
}
