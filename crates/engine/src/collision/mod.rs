mod formula;
mod tile;

pub use formula::{
    Axis, CollisionConstraint, CollisionFormula, CollisionFunction, CollisionRange, FormulaConfig,
    Orientation,
};
pub use tile::{TileCollidable, TileCollidableListener, TileCollision, TileHit};
