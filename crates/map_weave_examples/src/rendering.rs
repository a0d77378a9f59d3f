use glam::IVec2;
use map_weave::prelude::{GenerationContext, Grid, GridView, ItemList};
use map_weave::steps::tags;
use tracing_subscriber::EnvFilter;

/// Initializes a fmt subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Glyphs used by [`render_map`].
#[derive(Clone, Copy, Debug)]
pub struct RenderConfig {
    pub wall: char,
    pub floor: char,
    pub door: char,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wall: '#',
            floor: '.',
            door: '+',
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyphs(mut self, wall: char, floor: char, door: char) -> Self {
        self.wall = wall;
        self.floor = floor;
        self.door = door;
        self
    }
}

/// Renders the context's wall-floor grid as ASCII rows, overlaying any door
/// positions recorded under the conventional doors tag.
pub fn render_map(ctx: &GenerationContext, config: &RenderConfig) -> String {
    let grid = ctx
        .components
        .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR));
    let doors: Vec<IVec2> = ctx
        .components
        .get_first::<ItemList<IVec2>>(Some(tags::DOORS))
        .map(|list| list.items().copied().collect())
        .unwrap_or_default();

    let mut out = String::new();
    for y in 0..ctx.height() as i32 {
        for x in 0..ctx.width() as i32 {
            let pos = IVec2::new(x, y);
            let glyph = if doors.contains(&pos) {
                config.door
            } else if grid.is_some_and(|g| g.get(pos)) {
                config.floor
            } else {
                config.wall
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
