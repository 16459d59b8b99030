use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ConfigError;
use crate::geom::{Localizable, SegmentWalk};
use crate::listener::{Listenable, ListenerId};
use crate::map::{MapTile, Tile};

use super::formula::{Axis, CollisionFormula, FormulaConfig};

/// A formula that fired on a tile: `position` is the corrected coordinate on
/// `axis`.
#[derive(Debug, Clone, PartialEq)]
pub struct TileHit {
    pub tx: u32,
    pub ty: u32,
    pub axis: Axis,
    pub position: f64,
    pub formula: String,
}

pub trait TileCollidableListener {
    fn notify_tile_collided(&mut self, tile: &Tile, axis: Axis);
}

/// Tile groups and the formulas each group applies. Shared by every entity
/// colliding with one map.
#[derive(Debug, Clone, Default)]
pub struct TileCollision {
    formulas: FormulaConfig,
    groups: BTreeMap<u32, String>,
    group_formulas: BTreeMap<String, Vec<String>>,
}

impl TileCollision {
    pub fn new(formulas: FormulaConfig) -> Self {
        Self {
            formulas,
            ..Self::default()
        }
    }

    /// Puts `numbers` in `group` and makes the group apply `formulas`, in that
    /// order. Unknown formula names are rejected.
    pub fn add_group<I>(&mut self, group: &str, numbers: I, formulas: &[&str]) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = u32>,
    {
        if let Some(missing) = formulas
            .iter()
            .find(|name| self.formulas.formula(name).is_none())
        {
            return Err(ConfigError::Invalid {
                kind: "tile group",
                name: group.to_string(),
                message: format!("unknown formula '{missing}'"),
            });
        }
        for number in numbers {
            self.groups.insert(number, group.to_string());
        }
        self.group_formulas.insert(
            group.to_string(),
            formulas.iter().map(|name| name.to_string()).collect(),
        );
        Ok(())
    }

    pub fn group_of(&self, tile: &Tile) -> Option<&str> {
        self.groups.get(&tile.number()).map(String::as_str)
    }

    pub fn formulas_of(&self, tile: &Tile) -> impl Iterator<Item = &CollisionFormula> {
        self.group_of(tile)
            .and_then(|group| self.group_formulas.get(group))
            .into_iter()
            .flatten()
            .filter_map(|name| self.formulas.formula(name))
    }

    pub fn formulas(&self) -> &FormulaConfig {
        &self.formulas
    }

    /// Walks from `(ox, oy)` to `(x, y)` and returns the hits at the first
    /// sample point where any formula applies, in formula order. Empty when the
    /// path is clear.
    pub fn resolve(&self, map: &MapTile, ox: f64, oy: f64, x: f64, y: f64) -> Vec<TileHit> {
        for (px, py) in SegmentWalk::new(ox, oy, x, y) {
            let Some(tile) = map.get_tile_at(px, py) else {
                continue;
            };
            let hits = self.hits_at(map, tile, px, py);
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }

    fn hits_at(&self, map: &MapTile, tile: &Tile, px: f64, py: f64) -> Vec<TileHit> {
        let local_x = px - tile.x();
        let local_y = py - tile.y();
        let mut hits = Vec::new();
        for formula in self.formulas_of(tile) {
            let range = formula.range();
            if !range.contains(local_x, local_y) || self.is_constrained(map, tile, formula) {
                continue;
            }
            if hits.iter().any(|hit: &TileHit| hit.axis == range.output) {
                continue;
            }
            let input = match range.source {
                Axis::X => local_x,
                Axis::Y => local_y,
            };
            let base = match range.output {
                Axis::X => tile.x(),
                Axis::Y => tile.y(),
            };
            hits.push(TileHit {
                tx: tile.in_tile_x(),
                ty: tile.in_tile_y(),
                axis: range.output,
                position: base + formula.function().compute(input),
                formula: formula.name().to_string(),
            });
        }
        hits
    }

    fn is_constrained(&self, map: &MapTile, tile: &Tile, formula: &CollisionFormula) -> bool {
        let constraint = formula.constraint();
        constraint.orientations().any(|orientation| {
            let (ox, oy) = orientation.offset();
            map.get_tile(tile.in_tile_x() as i32 + ox, tile.in_tile_y() as i32 + oy)
                .and_then(|neighbor| self.group_of(neighbor))
                .is_some_and(|group| {
                    constraint
                        .excluded(orientation)
                        .iter()
                        .any(|excluded| excluded == group)
                })
        })
    }
}

/// Per-entity collision checker with its own listeners.
#[derive(Default)]
pub struct TileCollidable {
    listeners: Listenable<dyn TileCollidableListener>,
}

impl TileCollidable {
    pub fn add_listener(&mut self, listener: Box<dyn TileCollidableListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    /// Resolves the motion and notifies every listener once per hit.
    pub fn update(
        &mut self,
        map: &MapTile,
        collision: &TileCollision,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Vec<TileHit> {
        let hits = collision.resolve(map, from.0, from.1, to.0, to.1);
        for hit in &hits {
            if let Some(tile) = map.get_tile(hit.tx as i32, hit.ty as i32) {
                debug!(
                    tx = hit.tx,
                    ty = hit.ty,
                    axis = ?hit.axis,
                    position = hit.position,
                    "tile_collided"
                );
                self.listeners
                    .notify(|listener| listener.notify_tile_collided(tile, hit.axis));
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use super::*;

    const GROUND: u32 = 0;

    fn formulas() -> FormulaConfig {
        FormulaConfig::parse(
            Path::new("formulas.xml"),
            r#"<formulas>
                <formula name="ground_top">
                    <range output="Y" source="X" minX="0" maxX="15" minY="0" maxY="15"/>
                    <function type="linear" a="0" b="16"/>
                    <constraint orientation="top" group="ground"/>
                </formula>
                <formula name="block_left">
                    <range output="X" source="Y" minX="0" maxX="7" minY="0" maxY="13"/>
                    <function type="linear" a="0" b="0"/>
                    <constraint orientation="left" group="ground"/>
                </formula>
            </formulas>"#,
        )
        .expect("formulas")
    }

    fn world() -> (MapTile, TileCollision) {
        let mut map = MapTile::new();
        map.create(16, 16, 8, 4).expect("create");
        for tx in 0..8 {
            map.set_tile(tx, 0, GROUND).expect("floor");
        }
        map.set_tile(5, 1, GROUND).expect("step");
        map.set_tile(5, 2, GROUND).expect("wall");

        let mut collision = TileCollision::new(formulas());
        collision
            .add_group("ground", [GROUND], &["ground_top", "block_left"])
            .expect("group");
        (map, collision)
    }

    #[test]
    fn falling_lands_on_top_surface() {
        let (map, collision) = world();
        let hits = collision.resolve(&map, 20.0, 24.0, 20.0, 10.0);
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].tx, hits[0].ty), (1, 0));
        assert_eq!(hits[0].axis, Axis::Y);
        assert_eq!(hits[0].position, 16.0);
        assert_eq!(hits[0].formula, "ground_top");
    }

    #[test]
    fn covered_tile_top_is_constrained() {
        let (map, collision) = world();
        let covered = *map.get_tile(5, 1).expect("tile");
        let top = collision.formulas().formula("ground_top").expect("formula");
        assert!(collision.is_constrained(&map, &covered, top));
        let exposed = *map.get_tile(5, 2).expect("tile");
        assert!(!collision.is_constrained(&map, &exposed, top));
    }

    #[test]
    fn walking_into_wall_hits_left_edge() {
        let (map, collision) = world();
        let hits = collision.resolve(&map, 60.0, 20.0, 90.0, 20.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].axis, Axis::X);
        assert_eq!(hits[0].position, 80.0);
        assert_eq!((hits[0].tx, hits[0].ty), (5, 1));
    }

    #[test]
    fn clear_path_has_no_hits() {
        let (map, collision) = world();
        assert!(collision.resolve(&map, 10.0, 30.0, 60.0, 30.0).is_empty());
    }

    #[test]
    fn unknown_formula_in_group_is_rejected() {
        let mut collision = TileCollision::new(formulas());
        assert!(matches!(
            collision.add_group("water", [3], &["swim"]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    struct Counter(Rc<RefCell<Vec<Axis>>>);

    impl TileCollidableListener for Counter {
        fn notify_tile_collided(&mut self, _tile: &Tile, axis: Axis) {
            self.0.borrow_mut().push(axis);
        }
    }

    #[test]
    fn collidable_notifies_listeners() {
        let (map, collision) = world();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut collidable = TileCollidable::default();
        collidable.add_listener(Box::new(Counter(seen.clone())));

        let hits = collidable.update(&map, &collision, (20.0, 20.0), (20.0, 12.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(*seen.borrow(), vec![Axis::Y]);
    }
}
