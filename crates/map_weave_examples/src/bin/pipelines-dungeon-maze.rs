use map_weave::prelude::*;
use map_weave::steps::tags;
use map_weave_examples::{init_tracing, render_map, RenderConfig};

/// Classic rooms-and-mazes dungeon: place rooms, flood the remaining space
/// with corridors, trim most dead ends back, then cut doorways into the
/// room walls.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut generator = Generator::new_seeded(61, 35, 2025);
    generator
        .add_step(
            RoomPlacement::new()
                .with_room_count(6, 9)
                .with_room_size(3, 9),
        )?
        .add_step(MazeCarve::new())?
        .add_step(
            DeadEndTrim::new()
                .with_save_dead_end_chance(20)
                .with_max_trim_iterations(INFINITE_TRIM_ITERATIONS),
        )?
        .add_step(AreaDetection::new())?
        .add_step(ClosestAreaConnection::new())?
        .add_step(DoorPlacement::new())?;
    generator.generate()?;

    let ctx = generator.context();
    println!("seed: {}", generator.seed());
    println!("{}", render_map(ctx, &RenderConfig::new()));

    let rooms = ctx
        .components
        .get_first::<ItemList<Rect>>(Some(tags::ROOMS));
    let doors = ctx
        .components
        .get_first::<ItemList<glam::IVec2>>(Some(tags::DOORS));
    println!(
        "rooms: {}, doors: {}",
        rooms.map_or(0, ItemList::len),
        doors.map_or(0, ItemList::len)
    );
    Ok(())
}
