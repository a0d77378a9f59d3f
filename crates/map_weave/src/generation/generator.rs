//! The generator driver: owns a context and an ordered step list, and runs
//! them to completion or one cooperative stage at a time.
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress, StepRunner};

/// Lifecycle of a [`Generator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorState {
    /// Steps are being added; nothing has run.
    Created,
    /// At least one stage has run and stages remain.
    Running,
    /// Every step has completed. Add steps (or build a new generator) to
    /// generate again.
    Completed,
}

/// Description of one executed stage, returned by [`Stages::advance`].
#[derive(Clone, Debug)]
pub struct StageInfo {
    /// Index of the step in the generator's step list.
    pub step_index: usize,
    /// Name of the step that ran.
    pub step_name: String,
    /// Zero-based stage number within that step.
    pub stage: usize,
    /// Whether the stage finished its step.
    pub progress: Progress,
}

/// Drives an ordered list of generation steps over one shared context.
///
/// The generator owns a seeded RNG threaded into every stage, so a full run
/// is deterministic in the seed and the step configuration; there is no
/// ambient global randomness.
pub struct Generator {
    context: GenerationContext,
    runners: Vec<StepRunner>,
    rng: StdRng,
    seed: u64,
    state: GeneratorState,
    current: usize,
}

impl Generator {
    /// New generator with a seed drawn from thread-local entropy. The drawn
    /// seed is recorded and can be read back for reproduction.
    pub fn new(width: u32, height: u32) -> Self {
        Self::new_seeded(width, height, rand::random::<u64>())
    }

    pub fn new_seeded(width: u32, height: u32, seed: u64) -> Self {
        Self {
            context: GenerationContext::new(width, height),
            runners: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            state: GeneratorState::Created,
            current: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn step_count(&self) -> usize {
        self.runners.len()
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    /// Mutable context access, e.g. to register caller-supplied components
    /// (a custom grid view, pre-seeded item lists) before generating.
    pub fn context_mut(&mut self) -> &mut GenerationContext {
        &mut self.context
    }

    pub fn into_context(self) -> GenerationContext {
        self.context
    }

    /// Append a step. Valid before a run starts or after one completes;
    /// adding to a completed generator re-opens it for another run.
    pub fn add_step(&mut self, step: impl GenerationStep + 'static) -> Result<&mut Self> {
        self.add_boxed_step(Box::new(step))
    }

    pub fn add_boxed_step(&mut self, step: Box<dyn GenerationStep>) -> Result<&mut Self> {
        if self.state == GeneratorState::Running {
            return Err(Error::Other(
                "cannot add steps while the generator is running".into(),
            ));
        }
        self.state = GeneratorState::Created;
        self.runners.push(StepRunner::new(step));
        Ok(self)
    }

    pub fn add_steps(
        &mut self,
        steps: impl IntoIterator<Item = Box<dyn GenerationStep>>,
    ) -> Result<&mut Self> {
        for step in steps {
            self.add_boxed_step(step)?;
        }
        Ok(self)
    }

    /// Consuming variant of [`Generator::add_step`], for assembling a
    /// pipeline in one expression.
    pub fn with_step(mut self, step: impl GenerationStep + 'static) -> Result<Self> {
        self.add_boxed_step(Box::new(step))?;
        Ok(self)
    }

    /// Run every remaining step to completion, in order. On the first step
    /// failure, execution stops immediately: no further step runs, and the
    /// context keeps the mutations of all prior successful steps (there is
    /// no rollback).
    pub fn generate(&mut self) -> Result<&mut Self> {
        info!(
            width = self.context.width(),
            height = self.context.height(),
            seed = self.seed,
            steps = self.runners.len(),
            "generating map"
        );
        {
            let mut stages = self.stages();
            while stages.advance()?.is_some() {}
        }
        Ok(self)
    }

    /// The remaining stages of all steps as one flattened lazy sequence.
    /// Finite and not restartable: once exhausted, add steps or build a new
    /// generator.
    pub fn stages(&mut self) -> Stages<'_> {
        Stages { generator: self }
    }
}

/// Single-stepping handle over a [`Generator`], for callers (e.g. a
/// visualizer) that want to advance one stage at a time and inspect the
/// context in between.
pub struct Stages<'a> {
    generator: &'a mut Generator,
}

impl Stages<'_> {
    /// Run the next stage. Returns `Ok(None)` once all steps have completed.
    pub fn advance(&mut self) -> Result<Option<StageInfo>> {
        let generator = &mut *self.generator;
        loop {
            if generator.current >= generator.runners.len() {
                generator.state = GeneratorState::Completed;
                return Ok(None);
            }
            let runner = &mut generator.runners[generator.current];
            if runner.is_finished() {
                generator.current += 1;
                continue;
            }
            generator.state = GeneratorState::Running;
            let stage = runner.stages_run();
            let progress = runner.advance(&mut generator.context, &mut generator.rng)?;
            let info = StageInfo {
                step_index: generator.current,
                step_name: runner.name().to_owned(),
                stage,
                progress,
            };
            if progress == Progress::Complete {
                generator.current += 1;
                if generator.current >= generator.runners.len() {
                    generator.state = GeneratorState::Completed;
                }
            }
            return Ok(Some(info));
        }
    }

    /// Inspect the context between stages.
    pub fn context(&self) -> &GenerationContext {
        &self.generator.context
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use glam::IVec2;
    use rand::RngCore;

    use super::*;
    use crate::context::items::ItemList;
    use crate::error::Error;
    use crate::generation::{GenerationStep, Progress};
    use crate::geometry::Rect;
    use crate::grid::{Grid, GridView};
    use crate::steps::{tags, AreaDetection, ClosestAreaConnection, RoomPlacement};

    struct RandomNumbers {
        remaining: usize,
    }

    impl GenerationStep for RandomNumbers {
        fn name(&self) -> &str {
            "RandomNumbers"
        }

        fn advance(
            &mut self,
            ctx: &mut GenerationContext,
            rng: &mut dyn RngCore,
        ) -> crate::error::Result<Progress> {
            ctx.components
                .get_first_or_new(Some("Numbers"), ItemList::<u32>::new)
                .add(rng.next_u32(), self.name());
            self.remaining -= 1;
            if self.remaining == 0 {
                Ok(Progress::Complete)
            } else {
                Ok(Progress::Yielded)
            }
        }
    }

    #[test]
    fn state_machine_transitions() {
        let mut generator = Generator::new_seeded(10, 10, 7);
        assert_eq!(generator.state(), GeneratorState::Created);
        generator.add_step(RandomNumbers { remaining: 2 }).unwrap();

        let mut stages = generator.stages();
        stages.advance().unwrap().unwrap();
        drop(stages);
        assert_eq!(generator.state(), GeneratorState::Running);

        // Adding steps mid-run is rejected.
        assert!(matches!(
            generator.add_step(RandomNumbers { remaining: 1 }),
            Err(Error::Other(_))
        ));

        generator.generate().unwrap();
        assert_eq!(generator.state(), GeneratorState::Completed);
    }

    #[test]
    fn with_step_builds_a_pipeline_in_one_expression() {
        let mut generator = Generator::new_seeded(10, 10, 7)
            .with_step(RandomNumbers { remaining: 1 })
            .unwrap()
            .with_step(RandomNumbers { remaining: 2 })
            .unwrap();
        assert_eq!(generator.step_count(), 2);
        generator.generate().unwrap();
        let list = generator
            .context()
            .components
            .get_first::<ItemList<u32>>(Some("Numbers"))
            .unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn stage_sequence_is_finite_and_not_restartable() {
        let mut generator = Generator::new_seeded(10, 10, 7);
        generator.add_step(RandomNumbers { remaining: 3 }).unwrap();

        let mut stages = generator.stages();
        let mut seen = 0;
        while let Some(info) = stages.advance().unwrap() {
            assert_eq!(info.step_index, 0);
            assert_eq!(info.stage, seen);
            seen += 1;
        }
        assert_eq!(seen, 3);
        assert!(stages.advance().unwrap().is_none());
    }

    #[test]
    fn context_is_inspectable_between_stages() {
        let mut generator = Generator::new_seeded(10, 10, 7);
        generator.add_step(RandomNumbers { remaining: 2 }).unwrap();

        let mut stages = generator.stages();
        stages.advance().unwrap();
        let list = stages
            .context()
            .components
            .get_first::<ItemList<u32>>(Some("Numbers"))
            .unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn seeded_runs_are_deterministic() {
        let run = |seed: u64| -> Vec<u32> {
            let mut generator = Generator::new_seeded(10, 10, seed);
            generator.add_step(RandomNumbers { remaining: 8 }).unwrap();
            generator.generate().unwrap();
            generator
                .context()
                .components
                .get_first::<ItemList<u32>>(Some("Numbers"))
                .unwrap()
                .items()
                .copied()
                .collect()
        };
        assert_eq!(run(99), run(99));
        assert_ne!(run(99), run(100));
    }

    fn rooms_pipeline(seed: u64) -> Generator {
        let mut generator = Generator::new_seeded(50, 50, seed);
        generator
            .add_step(RoomPlacement::new().with_room_count(4, 4).with_room_size(3, 7))
            .unwrap();
        generator.add_step(AreaDetection::new()).unwrap();
        generator.add_step(ClosestAreaConnection::new()).unwrap();
        generator
            .add_step(AreaDetection::new().with_areas_tag("Connected"))
            .unwrap();
        generator.generate().unwrap();
        generator
    }

    #[test]
    fn rooms_connection_scenario() {
        let generator = rooms_pipeline(1234);
        let ctx = generator.context();

        let rooms = ctx
            .components
            .get_first::<ItemList<Rect>>(Some(tags::ROOMS))
            .unwrap();
        assert_eq!(rooms.len(), 4);
        for room in rooms.items() {
            assert!(room.width >= 3 && room.height >= 3);
        }

        let areas = ctx
            .components
            .get_first::<ItemList<crate::area::Area>>(Some(tags::AREAS))
            .unwrap();
        assert_eq!(areas.len(), 4);

        // After connection, the whole floor is one component.
        let connected = ctx
            .components
            .get_first::<ItemList<crate::area::Area>>(Some("Connected"))
            .unwrap();
        assert_eq!(connected.len(), 1);

        // N areas need exactly N-1 tunnels.
        let tunnels = ctx
            .components
            .get_first::<ItemList<crate::area::Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert_eq!(tunnels.len(), 3);

        // Floor count equals the union of room and tunnel cells: no
        // double-counted overlap.
        let mut expected: HashSet<IVec2> = HashSet::new();
        for room in rooms.items() {
            expected.extend(room.positions());
        }
        for tunnel in tunnels.items() {
            expected.extend(tunnel.iter());
        }
        let grid = ctx
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        assert_eq!(grid.count(true), expected.len());
        assert!(expected.iter().all(|p| grid.get(*p)));
    }

    #[test]
    fn full_pipeline_is_deterministic_per_seed() {
        let a = rooms_pipeline(42);
        let b = rooms_pipeline(42);

        let grid_a = a
            .context()
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        let grid_b = b
            .context()
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        assert_eq!(grid_a, grid_b);

        let rooms_a: Vec<Rect> = a
            .context()
            .components
            .get_first::<ItemList<Rect>>(Some(tags::ROOMS))
            .unwrap()
            .items()
            .copied()
            .collect();
        let rooms_b: Vec<Rect> = b
            .context()
            .components
            .get_first::<ItemList<Rect>>(Some(tags::ROOMS))
            .unwrap()
            .items()
            .copied()
            .collect();
        assert_eq!(rooms_a, rooms_b);
    }
}
