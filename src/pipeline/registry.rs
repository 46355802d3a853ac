//! Step registry
//!
//! Maps step names to their definitions. A registry is built once, by
//! explicit [`StepRegistry::register`] calls, and only read afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::pipeline::steps;
use crate::pipeline::PipelineContext;

/// Callback implementing a step. Returns the number of failed invocations.
pub type StepFn = fn(&mut PipelineContext, &dyn Executor) -> Result<usize>;

/// Name of the aggregate step.
pub const ALL_STEP: &str = "all";

/// What running a step does.
#[derive(Debug, Clone)]
pub enum StepAction {
    /// Invoke a callback.
    Run(StepFn),
    /// Run other registered steps, in this literal order.
    Sequence(Vec<String>),
}

/// A registered step. Immutable once registered.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub name: String,
    pub help: String,
    /// External executables that must be on `PATH` before the step runs.
    pub requirements: Vec<String>,
    pub action: StepAction,
}

/// Handle returned by [`StepRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepId(usize);

/// Registry of pipeline steps, keyed by unique name.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Vec<StepDefinition>,
    index: HashMap<String, usize>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry holding every built-in step.
    pub fn with_default_steps() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(
            "archive",
            "Put current state in archive",
            &["tar"],
            StepAction::Run(steps::archive),
        )?;
        registry.register(
            "strip",
            "Run 'opt -strip' on all .bc files",
            &["opt"],
            StepAction::Run(steps::strip),
        )?;
        registry.register(
            "disassemble",
            "Run 'llvm-dis' on all .bc files",
            &["llvm-dis"],
            StepAction::Run(steps::disassemble),
        )?;
        registry.register(
            "analyze",
            "Run google/souper on all .bc files to get potential candidates",
            &["souper"],
            StepAction::Run(steps::analyze),
        )?;
        registry.register(
            "optimize",
            "Run optimizer for each optimization level. See --opt-levels.",
            &["opt"],
            StepAction::Run(steps::optimize),
        )?;
        registry.register(
            ALL_STEP,
            "Run all steps once",
            &[],
            StepAction::Sequence(
                steps::ALL_SEQUENCE
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        )?;
        Ok(registry)
    }

    /// Register a step.
    ///
    /// Duplicate names are rejected. A sequence may only reference steps
    /// that are already registered, which rules out cycles.
    pub fn register(
        &mut self,
        name: &str,
        help: &str,
        requirements: &[&str],
        action: StepAction,
    ) -> Result<StepId> {
        if self.index.contains_key(name) {
            return Err(Error::DuplicateStep {
                name: name.to_string(),
            });
        }
        if let StepAction::Sequence(members) = &action {
            if let Some(unknown) = members.iter().find(|m| !self.index.contains_key(*m)) {
                return Err(Error::UnknownStep {
                    name: unknown.clone(),
                });
            }
        }

        let id = self.steps.len();
        self.steps.push(StepDefinition {
            name: name.to_string(),
            help: help.to_string(),
            requirements: requirements.iter().map(|r| r.to_string()).collect(),
            action,
        });
        self.index.insert(name.to_string(), id);
        Ok(StepId(id))
    }

    pub fn lookup(&self, name: &str) -> Result<&StepDefinition> {
        self.index
            .get(name)
            .map(|&id| &self.steps[id])
            .ok_or_else(|| Error::UnknownStep {
                name: name.to_string(),
            })
    }

    pub fn get(&self, id: StepId) -> Option<&StepDefinition> {
        self.steps.get(id.0)
    }

    /// Step names and their help text, sorted by name.
    pub fn list(&self) -> BTreeMap<&str, &str> {
        self.steps
            .iter()
            .map(|s| (s.name.as_str(), s.help.as_str()))
            .collect()
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Render the step list for `--help`.
    pub fn help_text(&self) -> String {
        let mut text = String::from("Steps to execute. Available options:");
        for (name, help) in self.list() {
            text.push_str(&format!("\n* {:<11}: {}", name, help));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut PipelineContext, _: &dyn Executor) -> Result<usize> {
        Ok(0)
    }

    #[test]
    fn test_default_steps_registered() {
        let registry = StepRegistry::with_default_steps().unwrap();
        let names: Vec<&str> = registry.names().into_iter().collect();
        assert_eq!(
            names,
            vec!["all", "analyze", "archive", "disassemble", "optimize", "strip"]
        );
    }

    #[test]
    fn test_default_requirements() {
        let registry = StepRegistry::with_default_steps().unwrap();
        assert_eq!(registry.lookup("strip").unwrap().requirements, vec!["opt"]);
        assert_eq!(registry.lookup("optimize").unwrap().requirements, vec!["opt"]);
        assert_eq!(
            registry.lookup("disassemble").unwrap().requirements,
            vec!["llvm-dis"]
        );
        assert_eq!(registry.lookup("analyze").unwrap().requirements, vec!["souper"]);
        assert_eq!(registry.lookup("archive").unwrap().requirements, vec!["tar"]);
        assert!(registry.lookup("all").unwrap().requirements.is_empty());
    }

    #[test]
    fn test_all_is_fixed_sequence() {
        let registry = StepRegistry::with_default_steps().unwrap();
        match &registry.lookup(ALL_STEP).unwrap().action {
            StepAction::Sequence(members) => assert_eq!(
                members,
                &["strip", "optimize", "disassemble", "analyze", "archive"]
            ),
            StepAction::Run(_) => panic!("'all' must be a sequence"),
        }
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = StepRegistry::new();
        registry.register("x", "first", &[], StepAction::Run(noop)).unwrap();
        let err = registry
            .register("x", "second", &[], StepAction::Run(noop))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateStep { .. }));
        assert_eq!(registry.lookup("x").unwrap().help, "first");
    }

    #[test]
    fn test_sequence_needs_registered_members() {
        let mut registry = StepRegistry::new();
        let err = registry
            .register("both", "", &[], StepAction::Sequence(vec!["a".into(), "b".into()]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownStep { ref name } if name == "a"));
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = StepRegistry::new();
        assert!(matches!(
            registry.lookup("nope"),
            Err(Error::UnknownStep { .. })
        ));
    }

    #[test]
    fn test_register_returns_usable_id() {
        let mut registry = StepRegistry::new();
        let id = registry
            .register("a", "help a", &["tool"], StepAction::Run(noop))
            .unwrap();
        assert_eq!(registry.get(id).unwrap().name, "a");
    }

    #[test]
    fn test_help_text_lists_every_step_sorted() {
        let registry = StepRegistry::with_default_steps().unwrap();
        let help = registry.help_text();
        let all_pos = help.find("* all").unwrap();
        let strip_pos = help.find("* strip").unwrap();
        assert!(all_pos < strip_pos);
        assert!(help.contains("Run all steps once"));
        assert!(help.contains("See --opt-levels."));
    }
}
