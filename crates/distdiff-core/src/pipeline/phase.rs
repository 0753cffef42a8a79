use crate::errors::Result;
use crate::model::Producer;
use crate::pipeline::context::DiffContext;

/// One step of a comparison run.
///
/// Implementations are created fresh for every run by a
/// [`PhaseRegistry`](crate::pipeline::PhaseRegistry) factory, so any state
/// they hold (caches, counters) lives for exactly one run.
pub trait Phase {
    /// Stable name used in configuration and logs
    fn name(&self) -> &str;

    /// Producer class, used to audit the statuses this phase assigns
    fn producer(&self) -> Producer {
        Producer::External
    }

    /// Apply the phase to the shared context.
    ///
    /// # Errors
    ///
    /// Errors whose kind is a configuration kind abort the run; any other
    /// error is logged and recorded, and the next phase runs.
    fn process(&mut self, ctx: &mut DiffContext) -> Result<()>;
}
