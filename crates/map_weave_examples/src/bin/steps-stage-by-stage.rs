use map_weave::prelude::*;
use map_weave_examples::{init_tracing, render_map, RenderConfig};

/// Drives a spiral arena one stage at a time through the `Stages` handle,
/// printing what each stage did; the kind of loop a visualizer would run.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut generator = Generator::new_seeded(41, 25, 7);
    generator
        .add_step(SpiralCarve::new().with_gap(2))?
        .add_step(ParallelogramCarve::new().with_position(glam::IVec2::new(3, 3)).with_size(6, 4))?
        .add_step(AreaDetection::new().with_areas_tag("Regions"))?
        .add_step(ClosestAreaConnection::new().with_areas_tag("Regions"))?;

    let mut stages = generator.stages();
    while let Some(info) = stages.advance()? {
        println!(
            "step {} ({}) ran stage {} -> {:?}",
            info.step_index, info.step_name, info.stage, info.progress
        );
    }

    println!("{}", render_map(generator.context(), &RenderConfig::new()));
    Ok(())
}
