use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use tilecore::{
    Axis, CameraSettings, EngineConfig, FrameClock, Localizable, Tile, TileCollidableListener,
    Viewer, World,
};
use tracing::{debug, info};

use super::canvas::{Canvas, RenderStats};
use super::level;
use super::mario::{Mario, MarioState, Pilot, MARIO_KEY};
use super::{AppError, Settings};

const SPAWN_X: f64 = 40.0;
const SPAWN_Y: f64 = 48.0;
const PILOT_START_TICK: u32 = 30;
const PILOT_TURN_X: f64 = 900.0;
const PILOT_RETURN_TICKS: u32 = 60;
const PROGRESS_EVERY_TICKS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) ticks: u32,
    pub(crate) state: Option<MarioState>,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) grounded: bool,
    pub(crate) state_changes: u32,
    pub(crate) tile_contacts: u32,
    pub(crate) camera_x: f64,
    pub(crate) camera_y: f64,
    pub(crate) render: RenderStats,
}

struct ContactCounter(Rc<Cell<u32>>);

impl TileCollidableListener for ContactCounter {
    fn notify_tile_collided(&mut self, _tile: &Tile, _axis: Axis) {
        self.0.set(self.0.get().saturating_add(1));
    }
}

/// Engine defaults with a horizontal dead-zone for side scrolling.
fn default_config() -> EngineConfig {
    EngineConfig {
        camera: CameraSettings {
            interval_horizontal: 16,
            interval_vertical: 0,
        },
        ..EngineConfig::default()
    }
}

pub(crate) fn run(settings: &Settings) -> Result<RunSummary, AppError> {
    let config = match &settings.config_path {
        Some(path) => EngineConfig::load(path)?,
        None => default_config(),
    };
    let map = match &settings.level_path {
        Some(path) => level::load_level(path)?,
        None => level::build_level()?,
    };

    let mut world = World::<Mario>::new(&config);
    world.set_map(map);
    world.set_collision(level::build_collision()?);

    let contacts = Rc::new(Cell::new(0));
    let pilot = Pilot::new(PILOT_START_TICK, PILOT_TURN_X, PILOT_RETURN_TICKS);
    let mut mario = Mario::new(&level::animations()?, pilot, SPAWN_X, SPAWN_Y)?;
    mario.add_collision_listener(Box::new(ContactCounter(Rc::clone(&contacts))));
    let camera = world.camera_mut();
    camera.center(&mario);
    camera.move_location(1.0, 0.0, 0.0);
    world.handler_mut().add(mario);

    let clock = FrameClock::new(&config.frame_loop);
    let mut canvas = Canvas::default();
    info!(
        ticks = settings.ticks,
        target_rate = config.frame_loop.target_rate,
        "run_started"
    );
    let ticks = clock.run_steps(settings.ticks, |tick, extrp| {
        world.update(extrp);
        let (dx, dy) = world
            .handler()
            .get(&MARIO_KEY)
            .map(Mario::movement)
            .ok_or(AppError::MissingPlayer { key: MARIO_KEY })?;
        world.camera_mut().move_location(1.0, dx, dy);

        canvas.begin_frame();
        world.render(&mut canvas);

        if tick % PROGRESS_EVERY_TICKS == 0 {
            debug!(
                tick,
                camera_x = world.camera().x(),
                tiles = canvas.stats().last_frame_tiles,
                "run_progress"
            );
        }
        Ok::<(), AppError>(())
    })?;

    let mario = world
        .handler()
        .get(&MARIO_KEY)
        .ok_or(AppError::MissingPlayer { key: MARIO_KEY })?;
    let summary = RunSummary {
        ticks,
        state: mario.state(),
        x: mario.x(),
        y: mario.y(),
        grounded: mario.is_grounded(),
        state_changes: mario.state_changes(),
        tile_contacts: contacts.get(),
        camera_x: world.camera().x(),
        camera_y: world.camera().y(),
        render: canvas.stats().clone(),
    };
    info!(
        ticks,
        state = ?summary.state,
        x = summary.x,
        contacts = summary.tile_contacts,
        "run_finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tilecore::{save_map, ConfigError};

    use super::*;

    fn settings(ticks: u32) -> Settings {
        Settings {
            ticks,
            ..Settings::default()
        }
    }

    #[test]
    fn short_run_lands_and_idles() {
        let summary = run(&settings(20)).expect("run");
        assert_eq!(summary.ticks, 20);
        assert_eq!(summary.state, Some(MarioState::Idle));
        assert!(summary.grounded);
        assert_eq!(summary.y, 16.0);
        assert_eq!(summary.render.frames, 20);
        assert_eq!(summary.render.sprites_drawn, 20);
        assert!(summary.render.last_frame_tiles > 0);
    }

    #[test]
    fn camera_follows_the_walk() {
        let summary = run(&settings(300)).expect("run");
        assert!(summary.x > 400.0);
        assert!(summary.camera_x > 0.0);
        assert!(summary.x - summary.camera_x <= 320.0);
        assert!(summary.state_changes >= 4);
        assert!(summary.tile_contacts > 0);
    }

    #[test]
    fn full_run_turns_back_and_stops() {
        let summary = run(&Settings::default()).expect("run");
        assert_eq!(summary.state, Some(MarioState::Idle));
        assert!(summary.x < PILOT_TURN_X);
        assert!(summary.grounded);
    }

    #[test]
    fn saved_level_and_config_are_used() {
        let temp = TempDir::new().expect("temp");
        let level_path = temp.path().join("level.map");
        save_map(&level::build_level().expect("level"), &level_path).expect("save");
        let config_path = temp.path().join("engine.json");
        fs::write(
            &config_path,
            r#"{ "view": { "width": 160, "height": 120, "screen_height": 120 } }"#,
        )
        .expect("write");

        let summary = run(&Settings {
            config_path: Some(config_path),
            level_path: Some(level_path),
            ticks: 10,
        })
        .expect("run");
        assert!(summary.render.last_frame_tiles <= 11 * 9);
        assert!(summary.render.last_frame_tiles > 0);
    }

    #[test]
    fn bad_config_fails_the_run() {
        let temp = TempDir::new().expect("temp");
        let config_path = temp.path().join("engine.json");
        fs::write(&config_path, r#"{ "loop": { "target_rate": "fast" } }"#).expect("write");
        let err = run(&Settings {
            config_path: Some(config_path),
            ..Settings::default()
        })
        .expect_err("config");
        assert!(matches!(err, AppError::Config(ConfigError::Json { .. })));
    }
}
