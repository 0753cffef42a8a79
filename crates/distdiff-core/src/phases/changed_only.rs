use crate::errors::Result;
use crate::model::{Producer, Status};
use crate::pipeline::context::DiffContext;
use crate::pipeline::phase::Phase;

/// Drops every artifact that is still `SAME`.
#[derive(Debug, Default)]
pub struct ChangedOnlyPhase;

impl ChangedOnlyPhase {
    pub const NAME: &'static str = "changed-only";
}

impl Phase for ChangedOnlyPhase {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn producer(&self) -> Producer {
        Producer::Filter
    }

    fn process(&mut self, ctx: &mut DiffContext) -> Result<()> {
        let before = ctx.artifacts.len();
        ctx.artifacts.retain(|a| a.status != Status::Same);
        tracing::debug!(dropped = before - ctx.artifacts.len(), "unchanged artifacts dropped");
        Ok(())
    }
}
