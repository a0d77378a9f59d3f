//! The generation step contract and its uniform runner.
//!
//! A step declares the components it requires, validates its own
//! configuration, and implements a resumable body as an explicit state
//! machine: each [`GenerationStep::advance`] call performs one bounded stage
//! of work and yields control back to the driver. Execution is
//! single-threaded and cooperative; no step ever runs concurrently with
//! another.
pub mod generator;

use std::any::{type_name, TypeId};

use rand::RngCore;
use tracing::{debug, info};

use crate::context::GenerationContext;
use crate::error::{Error, Result};

/// Outcome of one stage of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// A stage finished but more work remains.
    Yielded,
    /// The stage that just ran completed the step.
    Complete,
}

/// A (component type, optional tag) pair that must exist in the context
/// before a step's body runs. The type may be a concrete component type or an
/// abstract view registered through a caster.
#[derive(Clone, Debug)]
pub struct ComponentRequirement {
    type_id: TypeId,
    type_name: &'static str,
    tag: Option<String>,
}

impl ComponentRequirement {
    pub fn of<T: ?Sized + 'static>(tag: Option<&str>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            tag: tag.map(str::to_owned),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn satisfied_by(&self, ctx: &GenerationContext) -> bool {
        ctx.components
            .contains_type_id(self.type_id, self.tag.as_deref())
    }
}

/// One unit of map-generation logic.
///
/// Implementors only write the body; requirement checking and configuration
/// validation run uniformly in [`StepRunner`] before the first stage, so a
/// failed check leaves the context untouched.
pub trait GenerationStep {
    /// Step name used for provenance and error messages.
    fn name(&self) -> &str;

    /// Components that must already exist in the context. Checked before the
    /// first stage; a miss is fatal and never retried.
    fn required_components(&self) -> Vec<ComponentRequirement> {
        Vec::new()
    }

    /// Validate tunable parameters. Runs before the first stage, after the
    /// requirement check.
    fn validate_configuration(&self) -> Result<()> {
        Ok(())
    }

    /// Perform one stage of work. Return [`Progress::Yielded`] while work
    /// remains, [`Progress::Complete`] from the stage that finishes the step.
    fn advance(&mut self, ctx: &mut GenerationContext, rng: &mut dyn RngCore)
        -> Result<Progress>;
}

/// Wraps a boxed step and enforces the shared execution contract: requirement
/// and configuration checks before the first stage, then stage sequencing
/// until completion.
pub struct StepRunner {
    step: Box<dyn GenerationStep>,
    started: bool,
    finished: bool,
    stages_run: usize,
}

impl StepRunner {
    pub fn new(step: Box<dyn GenerationStep>) -> Self {
        Self {
            step,
            started: false,
            finished: false,
            stages_run: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.step.name()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stages completed so far.
    pub fn stages_run(&self) -> usize {
        self.stages_run
    }

    /// Run one stage. The first call performs the requirement and
    /// configuration checks; if either fails, the step never starts and the
    /// context is left exactly as it was, so a retry fails identically.
    pub fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        rng: &mut dyn RngCore,
    ) -> Result<Progress> {
        if self.finished {
            return Err(Error::StagesExhausted);
        }
        if !self.started {
            for requirement in self.step.required_components() {
                if !requirement.satisfied_by(ctx) {
                    return Err(Error::MissingComponent {
                        step: self.step.name().to_owned(),
                        type_name: requirement.type_name(),
                        tag: requirement.tag().map(str::to_owned),
                    });
                }
            }
            self.step.validate_configuration()?;
            info!(step = %self.step.name(), "starting generation step");
            self.started = true;
        }

        let progress = self.step.advance(ctx, rng)?;
        self.stages_run += 1;
        if progress == Progress::Complete {
            self.finished = true;
            debug!(
                step = %self.step.name(),
                stages = self.stages_run,
                "generation step complete"
            );
        }
        Ok(progress)
    }

    /// Run all remaining stages; returns the number of stages executed.
    pub fn run_to_completion(
        &mut self,
        ctx: &mut GenerationContext,
        rng: &mut dyn RngCore,
    ) -> Result<usize> {
        let mut stages = 0;
        loop {
            let progress = self.advance(ctx, rng)?;
            stages += 1;
            if progress == Progress::Complete {
                return Ok(stages);
            }
        }
    }
}
