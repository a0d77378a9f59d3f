use map_weave::prelude::*;
use map_weave::steps::tags;
use map_weave_examples::{init_tracing, render_map, RenderConfig};

/// Organic caves: random noise smoothed by cellular automata, then the
/// surviving pockets are detected and tunneled together.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut generator = Generator::new_seeded(70, 40, 0xCAFE);
    generator
        .add_step(RandomFill::new().with_fill_percent(55))?
        .add_step(CellularAutomataSmooth::new())?
        .add_step(AreaDetection::new())?
        .add_step(ClosestAreaConnection::new().with_distance(Distance::Euclidean))?;
    generator.generate()?;

    let ctx = generator.context();
    println!("seed: {}", generator.seed());
    println!("{}", render_map(ctx, &RenderConfig::new()));

    let caves = ctx
        .components
        .get_first::<ItemList<Area>>(Some(tags::AREAS));
    let tunnels = ctx
        .components
        .get_first::<ItemList<Area>>(Some(tags::TUNNELS));
    println!(
        "caves: {}, connecting tunnels: {}",
        caves.map_or(0, ItemList::len),
        tunnels.map_or(0, ItemList::len)
    );
    Ok(())
}
