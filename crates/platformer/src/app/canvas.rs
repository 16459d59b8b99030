use serde::Serialize;
use tilecore::{Sheet, Tile, TileRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct Sprite {
    pub(crate) frame: u32,
    pub(crate) x: i32,
    pub(crate) y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct RenderStats {
    pub(crate) frames: u32,
    pub(crate) tiles_drawn: u64,
    pub(crate) sprites_drawn: u64,
    pub(crate) last_frame_tiles: u32,
    pub(crate) last_sprite: Option<Sprite>,
}

/// Headless render target: records what a frame would draw.
#[derive(Debug, Default)]
pub(crate) struct Canvas {
    stats: RenderStats,
}

impl Canvas {
    pub(crate) fn begin_frame(&mut self) {
        self.stats.frames += 1;
        self.stats.last_frame_tiles = 0;
    }

    pub(crate) fn draw_sprite(&mut self, frame: u32, x: i32, y: i32) {
        self.stats.sprites_drawn += 1;
        self.stats.last_sprite = Some(Sprite { frame, x, y });
    }

    pub(crate) fn stats(&self) -> &RenderStats {
        &self.stats
    }
}

impl TileRenderer for Canvas {
    fn render_tile(&mut self, _tile: &Tile, _sheet: Option<&Sheet>, _x: i32, _y: i32) {
        self.stats.tiles_drawn += 1;
        self.stats.last_frame_tiles += 1;
    }
}
