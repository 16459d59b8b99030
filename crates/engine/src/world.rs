use tracing::info;

use crate::camera::Camera;
use crate::collision::TileCollision;
use crate::config::EngineConfig;
use crate::handler::{Handler, Keyed, Renderable, Updatable};
use crate::map::{MapTile, TileRenderer};

/// What an entity sees while updating: the map it walks on, the camera of
/// the previous frame, and the collision rules of the map.
pub struct Frame<'a> {
    pub map: &'a MapTile,
    pub camera: &'a Camera,
    pub collision: &'a TileCollision,
}

/// One level: map, camera and the entities living in it.
pub struct World<E: Keyed> {
    map: MapTile,
    camera: Camera,
    collision: TileCollision,
    handler: Handler<E>,
}

impl<E: Keyed> World<E> {
    pub fn new(config: &EngineConfig) -> Self {
        let mut camera = Camera::default();
        let view = &config.view;
        camera.set_view(view.x, view.y, view.width, view.height, view.screen_height);
        camera.set_intervals(
            config.camera.interval_horizontal,
            config.camera.interval_vertical,
        );
        Self {
            map: MapTile::new(),
            camera,
            collision: TileCollision::default(),
            handler: Handler::default(),
        }
    }

    /// Replaces the map and bounds the camera by it.
    pub fn set_map(&mut self, map: MapTile) {
        self.map = map;
        if self.map.is_created() {
            self.camera.set_limits_tiled(&self.map);
        }
        info!(
            width = self.map.in_tile_width(),
            height = self.map.in_tile_height(),
            tiles = self.map.tiles_number(),
            "world_map_set"
        );
    }

    pub fn set_collision(&mut self, collision: TileCollision) {
        self.collision = collision;
    }

    pub fn map(&self) -> &MapTile {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapTile {
        &mut self.map
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn collision(&self) -> &TileCollision {
        &self.collision
    }

    pub fn handler(&self) -> &Handler<E> {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut Handler<E> {
        &mut self.handler
    }

    pub fn update(&mut self, extrp: f64)
    where
        E: for<'a> Updatable<Frame<'a>>,
    {
        self.camera.backup();
        let mut frame = Frame {
            map: &self.map,
            camera: &self.camera,
            collision: &self.collision,
        };
        self.handler.update(extrp, &mut frame);
    }

    /// Visible tiles first, then entities on top.
    pub fn render<R>(&self, target: &mut R)
    where
        R: TileRenderer,
        E: Renderable<R>,
    {
        self.map.render(&self.camera, target);
        self.handler.render(&self.camera, target);
    }
}
