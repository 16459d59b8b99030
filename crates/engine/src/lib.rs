//! Tile-based 2D engine core: tile grid and sheets, elastic camera, keyed
//! entity handler, entity state machines and tile collision formulas.
//!
//! Nothing here draws pixels. Rendering goes through [`TileRenderer`] and
//! [`Renderable`], which receive screen coordinates and leave the drawing to
//! the caller.

pub mod camera;
pub mod clock;
pub mod collision;
pub mod config;
pub mod geom;
pub mod handler;
pub mod listener;
pub mod map;
pub mod media;
pub mod mover;
pub mod state;
pub mod world;
mod xml;

pub use camera::{Camera, Viewer};
pub use clock::{FrameClock, StepPlan};
pub use collision::{
    Axis, CollisionConstraint, CollisionFormula, CollisionFunction, CollisionRange,
    FormulaConfig, Orientation, TileCollidable, TileCollidableListener, TileCollision, TileHit,
};
pub use config::{CameraSettings, ConfigError, EngineConfig, LoopSettings, ViewSettings};
pub use geom::{Force, Localizable, Rect, Shape, Surface, SurfaceTile, Vec2};
pub use handler::{Handler, Keyed, Pending, Renderable, Updatable};
pub use listener::{Listenable, ListenerId};
pub use map::{
    load_map, load_sheets, save_map, MapFile, MapFileError, MapTile, MapTileError, Sheet,
    SheetError, Tile, TileRenderer, TileSetListener, TileSheetsConfig,
};
pub use media::{Media, MediaError, Medias, RESOURCES_ENV_VAR};
pub use mover::Mover;
pub use state::{
    AnimState, Animation, AnimationConfig, Animator, Resolution, State, StateAnimationBased,
    StateChecker, StateError, StateFactory, StateHandler, StateTransitions, Target,
};
pub use world::{Frame, World};
pub use xml::XmlError;
