//! Built-in phases besides reconciliation and sorting.

mod changed_only;
mod jar_version;
mod module_summary;

pub use changed_only::ChangedOnlyPhase;
pub use jar_version::JarVersionPhase;
pub use module_summary::{module_name, ModuleSummaryPhase};
