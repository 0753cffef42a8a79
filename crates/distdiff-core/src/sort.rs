//! Final presentation order of the artifact list.
//!
//! Status priority descending, then level ascending, then relative path
//! ascending. The sort is stable, so records equal on all three keys keep
//! their relative order.

use std::cmp::Ordering;

use crate::errors::Result;
use crate::model::{Artifact, Producer};
use crate::pipeline::context::DiffContext;
use crate::pipeline::phase::Phase;

pub fn compare(a: &Artifact, b: &Artifact) -> Ordering {
    b.status
        .priority()
        .cmp(&a.status.priority())
        .then_with(|| a.level.cmp(&b.level))
        .then_with(|| a.relative_path.cmp(&b.relative_path))
}

pub fn sort_artifacts(artifacts: &mut [Artifact]) {
    artifacts.sort_by(compare);
}

/// The sorter as a pipeline step
#[derive(Debug, Default)]
pub struct SortingPhase;

impl SortingPhase {
    pub const NAME: &'static str = "sort";
}

impl Phase for SortingPhase {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn producer(&self) -> Producer {
        Producer::Filter
    }

    fn process(&mut self, ctx: &mut DiffContext) -> Result<()> {
        sort_artifacts(&mut ctx.artifacts);
        Ok(())
    }
}
