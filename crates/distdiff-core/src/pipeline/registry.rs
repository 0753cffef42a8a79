//! Named phase factories.
//!
//! Phases are never reused between runs: the registry builds fresh
//! instances from the run configuration every time it is asked.

use std::collections::BTreeMap;

use crate::config::DiffConfig;
use crate::errors::{DistDiffError, Result};
use crate::phases::{ChangedOnlyPhase, JarVersionPhase, ModuleSummaryPhase};
use crate::patching::PatchOverlayPhase;
use crate::pipeline::phase::Phase;
use crate::sort::SortingPhase;

/// Builds one phase instance for one run
pub type PhaseFactory = Box<dyn Fn(&DiffConfig) -> Box<dyn Phase>>;

#[derive(Default)]
pub struct PhaseRegistry {
    factories: BTreeMap<String, PhaseFactory>,
}

impl PhaseRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every phase shipped with the core
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(PatchOverlayPhase::NAME, |config| {
            Box::new(PatchOverlayPhase::new(config.hash_mode))
        });
        registry.register(JarVersionPhase::NAME, |_| Box::new(JarVersionPhase));
        registry.register(ModuleSummaryPhase::NAME, |_| Box::new(ModuleSummaryPhase));
        registry.register(ChangedOnlyPhase::NAME, |_| Box::new(ChangedOnlyPhase));
        registry.register(SortingPhase::NAME, |_| Box::new(SortingPhase));
        registry
    }

    /// Register (or replace) the factory for `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&DiffConfig) -> Box<dyn Phase> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build fresh phase instances for `names`, in order.
    ///
    /// # Errors
    ///
    /// `NoPhases` for an empty list, `UnknownPhase` for the first name with
    /// no registered factory.
    pub fn instantiate<S: AsRef<str>>(
        &self,
        names: &[S],
        config: &DiffConfig,
    ) -> Result<Vec<Box<dyn Phase>>> {
        if names.is_empty() {
            return Err(DistDiffError::NoPhases);
        }
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.factories
                    .get(name)
                    .map(|factory| factory(config))
                    .ok_or_else(|| DistDiffError::UnknownPhase {
                        name: name.to_string(),
                    })
            })
            .collect()
    }
}

impl std::fmt::Debug for PhaseRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseRegistry")
            .field("phases", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::context::DiffContext;

    #[test]
    fn test_builtin_names() {
        let registry = PhaseRegistry::with_builtin();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "changed-only",
                "jar-version",
                "module-summary",
                "patch-overlay",
                "sort"
            ]
        );
    }

    #[test]
    fn test_instantiate_preserves_order() {
        let registry = PhaseRegistry::with_builtin();
        let config = DiffConfig::new("/a", "/b");
        let phases = registry
            .instantiate(&["sort", "changed-only"], &config)
            .unwrap();
        let names: Vec<&str> = phases.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["sort", "changed-only"]);
    }

    #[test]
    fn test_unknown_and_empty_lists_are_configuration_errors() {
        let registry = PhaseRegistry::with_builtin();
        let config = DiffConfig::new("/a", "/b");

        let err = registry.instantiate(&["nope"], &config).err().unwrap();
        assert_eq!(
            err,
            DistDiffError::UnknownPhase {
                name: "nope".to_string()
            }
        );
        assert!(err.is_configuration());

        let empty: [&str; 0] = [];
        let err = registry.instantiate(&empty, &config).err().unwrap();
        assert_eq!(err, DistDiffError::NoPhases);
    }

    struct Tag(&'static str);

    impl Phase for Tag {
        fn name(&self) -> &str {
            self.0
        }

        fn process(&mut self, ctx: &mut DiffContext) -> Result<()> {
            ctx.layers.push(self.0.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_external_phase_registration() {
        let mut registry = PhaseRegistry::new();
        registry.register("tag", |_| Box::new(Tag("tag")));
        assert!(registry.contains("tag"));
        assert!(!registry.contains("sort"));

        let config = DiffConfig::new("/a", "/b");
        let mut phases = registry.instantiate(&["tag", "tag"], &config).unwrap();
        let mut ctx = DiffContext::new(config, Vec::new());
        for phase in &mut phases {
            phase.process(&mut ctx).unwrap();
        }
        assert_eq!(ctx.layers, vec!["tag", "tag"]);
    }
}
