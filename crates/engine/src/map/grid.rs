use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::camera::Viewer;
use crate::geom::{Localizable, SegmentWalk, Surface, SurfaceTile};
use crate::listener::{Listenable, ListenerId};
use crate::media::{Media, Medias};

use super::sheets::{self, Sheet, SheetError};
use super::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapTileError {
    #[error(
        "map dimensions must be strictly positive: tile {tile_width}x{tile_height}, grid {width}x{height}"
    )]
    InvalidDimension {
        tile_width: u32,
        tile_height: u32,
        width: u32,
        height: u32,
    },
    #[error("tile ({tx}, {ty}) is outside the {width}x{height} grid")]
    OutOfBounds {
        tx: u32,
        ty: u32,
        width: u32,
        height: u32,
    },
    #[error("cannot shrink map from {width}x{height} to {new_width}x{new_height}")]
    ShrinkUnsupported {
        width: u32,
        height: u32,
        new_width: u32,
        new_height: u32,
    },
    #[error("map has not been created")]
    NotCreated,
}

/// Notified synchronously each time a tile is set.
pub trait TileSetListener {
    fn on_tile_set(&mut self, tile: &Tile);
}

/// Receives every visible tile during [`MapTile::render`], already in screen
/// coordinates.
pub trait TileRenderer {
    fn render_tile(&mut self, tile: &Tile, sheet: Option<&Sheet>, x: i32, y: i32);
}

/// Rectangular grid of optional tiles, stored row-major with row 0 at the
/// bottom of the world.
pub struct MapTile {
    tile_width: u32,
    tile_height: u32,
    width: u32,
    height: u32,
    radius: u32,
    tiles: Vec<Option<Tile>>,
    sheets: Vec<Sheet>,
    tiles_per_sheet: Option<u32>,
    sheets_config: Option<Media>,
    listeners: Listenable<dyn TileSetListener>,
}

impl fmt::Debug for MapTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapTile")
            .field("tile_width", &self.tile_width)
            .field("tile_height", &self.tile_height)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tiles", &self.tiles_number())
            .field("sheets", &self.sheets.len())
            .finish_non_exhaustive()
    }
}

impl Default for MapTile {
    fn default() -> Self {
        Self::new()
    }
}

impl MapTile {
    pub fn new() -> Self {
        Self {
            tile_width: 0,
            tile_height: 0,
            width: 0,
            height: 0,
            radius: 0,
            tiles: Vec::new(),
            sheets: Vec::new(),
            tiles_per_sheet: None,
            sheets_config: None,
            listeners: Listenable::default(),
        }
    }

    /// Allocates an empty grid, dropping any previous tiles.
    pub fn create(
        &mut self,
        tile_width: u32,
        tile_height: u32,
        width: u32,
        height: u32,
    ) -> Result<(), MapTileError> {
        if tile_width == 0 || tile_height == 0 || width == 0 || height == 0 {
            return Err(MapTileError::InvalidDimension {
                tile_width,
                tile_height,
                width,
                height,
            });
        }
        self.clear();
        self.tile_width = tile_width;
        self.tile_height = tile_height;
        self.width = width;
        self.height = height;
        self.radius = radius_of(width, height);
        self.tiles = vec![None; width as usize * height as usize];

        info!(tile_width, tile_height, width, height, "map_created");
        Ok(())
    }

    /// Installs `sheets` as the map's tile sources. They must agree with each
    /// other, and with the map's tile size when the grid already exists.
    pub fn load_sheets(&mut self, sheets: Vec<Sheet>) -> Result<(), SheetError> {
        let metrics = sheets::check_consistency(&sheets)?;
        if let Some(metrics) = metrics {
            if self.is_created() {
                if let Some(first) = sheets.first() {
                    sheets::check_tile_size(first, self.tile_width, self.tile_height)?;
                }
            } else {
                self.tile_width = metrics.tile_width;
                self.tile_height = metrics.tile_height;
            }
        }
        self.sheets = sheets;
        self.tiles_per_sheet = metrics.map(|metrics| metrics.tiles_per_sheet);

        if let Some(tiles_per_sheet) = self.tiles_per_sheet.filter(|count| *count > 0) {
            for tile in self.tiles.iter_mut().flatten() {
                let number = tile.number();
                tile.set(number, number / tiles_per_sheet);
            }
        }
        debug!(
            sheets = self.sheets.len(),
            tiles_per_sheet = self.tiles_per_sheet.unwrap_or(0),
            "map_sheets_loaded"
        );
        Ok(())
    }

    /// Loads the sheets config and its images, remembering the config for
    /// [`super::file::save_map`].
    pub fn load_sheets_config(&mut self, medias: &Medias, config: &Media) -> Result<(), SheetError> {
        let sheets = sheets::load_sheets(medias, config)?;
        self.load_sheets(sheets)?;
        self.sheets_config = Some(config.clone());
        Ok(())
    }

    pub fn set_sheets_config(&mut self, config: Media) {
        self.sheets_config = Some(config);
    }

    /// Drops all tiles. Tile size and sheets are kept.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.width = 0;
        self.height = 0;
        self.radius = 0;
    }

    pub fn add_listener(&mut self, listener: Box<dyn TileSetListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    /// Sets the tile number at grid coordinates, creating the cell on first use.
    pub fn set_tile(&mut self, tx: u32, ty: u32, number: u32) -> Result<(), MapTileError> {
        let index = self.index_of(tx, ty).ok_or(MapTileError::OutOfBounds {
            tx,
            ty,
            width: self.width,
            height: self.height,
        })?;
        let sheet = match self.tiles_per_sheet {
            Some(count) if count > 0 => number / count,
            _ => 0,
        };
        let (tile_width, tile_height) = (self.tile_width, self.tile_height);
        let cell = &mut self.tiles[index];
        let tile = cell.get_or_insert(Tile::new(number, sheet, tx, ty, tile_width, tile_height));
        tile.set(number, sheet);
        let tile = *tile;
        self.listeners.notify(|listener| listener.on_tile_set(&tile));
        Ok(())
    }

    /// Stores a tile with an explicit sheet index, without notifying listeners.
    pub(crate) fn put_tile(
        &mut self,
        tx: u32,
        ty: u32,
        number: u32,
        sheet: u32,
    ) -> Result<(), MapTileError> {
        let index = self.index_of(tx, ty).ok_or(MapTileError::OutOfBounds {
            tx,
            ty,
            width: self.width,
            height: self.height,
        })?;
        self.tiles[index] = Some(Tile::new(
            number,
            sheet,
            tx,
            ty,
            self.tile_width,
            self.tile_height,
        ));
        Ok(())
    }

    /// Removes the tile at grid coordinates. Returns whether a tile was there.
    pub fn remove_tile(&mut self, tx: u32, ty: u32) -> bool {
        self.index_of(tx, ty)
            .and_then(|index| self.tiles[index].take())
            .is_some()
    }

    pub fn get_tile(&self, tx: i32, ty: i32) -> Option<&Tile> {
        let tx = u32::try_from(tx).ok()?;
        let ty = u32::try_from(ty).ok()?;
        let index = self.index_of(tx, ty)?;
        self.tiles[index].as_ref()
    }

    /// Tile containing the world point, `None` outside the grid or on an empty cell.
    pub fn get_tile_at(&self, x: f64, y: f64) -> Option<&Tile> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return None;
        }
        let tx = (x / f64::from(self.tile_width)).floor();
        let ty = (y / f64::from(self.tile_height)).floor();
        self.get_tile(tx as i32, ty as i32)
    }

    pub fn get_tile_of(
        &self,
        localizable: &dyn Localizable,
        offset_x: i32,
        offset_y: i32,
    ) -> Option<&Tile> {
        self.get_tile_at(
            localizable.x() + f64::from(offset_x),
            localizable.y() + f64::from(offset_y),
        )
    }

    /// Non-empty cells among the eight surrounding `tile`.
    pub fn get_neighbors(&self, tile: &Tile) -> Vec<&Tile> {
        let tx = tile.in_tile_x() as i32;
        let ty = tile.in_tile_y() as i32;
        let mut neighbors = Vec::with_capacity(8);
        for ox in -1..=1 {
            for oy in -1..=1 {
                if ox == 0 && oy == 0 {
                    continue;
                }
                if let Some(neighbor) = self.get_tile(tx + ox, ty + oy) {
                    neighbors.push(neighbor);
                }
            }
        }
        neighbors
    }

    /// Tiles crossed when moving from `(ox, oy)` to `(x, y)`, in traversal order
    /// and without duplicates.
    ///
    /// The segment is walked one unit along the dominant axis per step; each
    /// step samples after the vertical advance and again after the horizontal
    /// one, rounding toward the direction of travel.
    pub fn get_tiles_hit(&self, ox: f64, oy: f64, x: f64, y: f64) -> Vec<&Tile> {
        let mut found: Vec<&Tile> = Vec::new();
        for (px, py) in SegmentWalk::new(ox, oy, x, y) {
            if let Some(tile) = self.get_tile_at(px, py) {
                if !found.iter().any(|known| known.coords() == tile.coords()) {
                    found.push(tile);
                }
            }
        }
        found
    }

    pub fn in_tile_x(&self, localizable: &dyn Localizable) -> i32 {
        if self.tile_width == 0 {
            return 0;
        }
        (localizable.x() / f64::from(self.tile_width)).floor() as i32
    }

    pub fn in_tile_y(&self, localizable: &dyn Localizable) -> i32 {
        if self.tile_height == 0 {
            return 0;
        }
        (localizable.y() / f64::from(self.tile_height)).floor() as i32
    }

    /// Grows the grid, keeping every tile at its coordinates.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), MapTileError> {
        if !self.is_created() {
            return Err(MapTileError::NotCreated);
        }
        if width < self.width || height < self.height {
            return Err(MapTileError::ShrinkUnsupported {
                width: self.width,
                height: self.height,
                new_width: width,
                new_height: height,
            });
        }
        if width == self.width && height == self.height {
            return Ok(());
        }

        let mut tiles = vec![None; width as usize * height as usize];
        for ty in 0..self.height {
            let old_row = (ty * self.width) as usize;
            let new_row = (ty * width) as usize;
            let len = self.width as usize;
            tiles[new_row..new_row + len].copy_from_slice(&self.tiles[old_row..old_row + len]);
        }
        self.tiles = tiles;
        self.width = width;
        self.height = height;
        self.radius = radius_of(width, height);

        debug!(width, height, "map_resized");
        Ok(())
    }

    /// Copies every tile of `other` into this map at the given tile offset,
    /// growing the grid when `other` overflows it.
    pub fn append(&mut self, other: &MapTile, offset_x: u32, offset_y: u32) -> Result<(), MapTileError> {
        if !other.is_created() {
            return Ok(());
        }
        if !self.is_created() {
            self.create(
                other.tile_width,
                other.tile_height,
                offset_x + other.width,
                offset_y + other.height,
            )?;
        } else {
            let width = self.width.max(offset_x + other.width);
            let height = self.height.max(offset_y + other.height);
            self.resize(width, height)?;
        }

        for tile in other.tiles.iter().flatten() {
            self.set_tile(
                offset_x + tile.in_tile_x(),
                offset_y + tile.in_tile_y(),
                tile.number(),
            )?;
        }
        Ok(())
    }

    /// Hands every tile intersecting the viewer rectangle to `renderer`.
    /// The visited range is clamped to the grid, so an unbounded view costs
    /// no more than the grid itself.
    pub fn render(&self, viewer: &dyn Viewer, renderer: &mut dyn TileRenderer) {
        if !self.is_created() {
            return;
        }
        let tile_width = i64::from(self.tile_width);
        let tile_height = i64::from(self.tile_height);
        let sx = viewer.x().ceil() as i64;
        let sy = viewer.y().ceil() as i64;
        let in_width = (f64::from(viewer.width()) / f64::from(self.tile_width)).ceil() as i64;
        let in_height = (f64::from(viewer.height()) / f64::from(self.tile_height)).ceil() as i64;
        let first_tx = (sx + i64::from(viewer.view_x())) / tile_width;
        let first_ty = (sy - i64::from(viewer.view_y())) / tile_height;

        let columns = first_tx.max(0)..=(first_tx + in_width).min(i64::from(self.width) - 1);
        let rows = first_ty.max(0)..=(first_ty + in_height).min(i64::from(self.height) - 1);
        for ty in rows {
            for tx in columns.clone() {
                if let Some(tile) = self.get_tile(tx as i32, ty as i32) {
                    let x = i64::from(tile.pixel_x()) - sx;
                    let y = -i64::from(tile.pixel_y()) - tile_height
                        + sy
                        + i64::from(viewer.height());
                    renderer.render_tile(tile, self.sheet(tile.sheet()), screen(x), screen(y));
                }
            }
        }
    }

    /// All tiles, row by row from the bottom.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn tiles_number(&self) -> usize {
        self.tiles.iter().flatten().count()
    }

    pub fn is_created(&self) -> bool {
        !self.tiles.is_empty()
    }

    pub fn in_tile_width(&self) -> u32 {
        self.width
    }

    pub fn in_tile_height(&self) -> u32 {
        self.height
    }

    /// Grid diagonal in tiles, rounded up.
    pub fn in_tile_radius(&self) -> u32 {
        self.radius
    }

    pub fn sheet(&self, id: u32) -> Option<&Sheet> {
        self.sheets.get(id as usize)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheets_number(&self) -> usize {
        self.sheets.len()
    }

    pub fn tiles_per_sheet(&self) -> Option<u32> {
        self.tiles_per_sheet
    }

    pub fn sheets_config(&self) -> Option<&Media> {
        self.sheets_config.as_ref()
    }

    fn index_of(&self, tx: u32, ty: u32) -> Option<usize> {
        if tx >= self.width || ty >= self.height {
            return None;
        }
        Some(ty as usize * self.width as usize + tx as usize)
    }
}

fn radius_of(width: u32, height: u32) -> u32 {
    let (w, h) = (f64::from(width), f64::from(height));
    (w * w + h * h).sqrt().ceil() as u32
}

impl Surface for MapTile {
    fn width(&self) -> i32 {
        (self.width * self.tile_width) as i32
    }

    fn height(&self) -> i32 {
        (self.height * self.tile_height) as i32
    }
}

impl SurfaceTile for MapTile {
    fn tile_width(&self) -> i32 {
        self.tile_width as i32
    }

    fn tile_height(&self) -> i32 {
        self.tile_height as i32
    }
}

fn screen(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::camera::Camera;
    use crate::geom::Vec2;

    fn map_10x10() -> MapTile {
        let mut map = MapTile::new();
        map.create(16, 16, 10, 10).expect("create");
        map.load_sheets(vec![Sheet::new("0.png", 16, 16, 2, 2)])
            .expect("sheets");
        map
    }

    fn coords(tiles: &[&Tile]) -> Vec<(u32, u32)> {
        tiles.iter().map(|tile| tile.coords()).collect()
    }

    #[test]
    fn create_rejects_zero_dimensions() {
        let mut map = MapTile::new();
        assert!(matches!(
            map.create(16, 0, 4, 4),
            Err(MapTileError::InvalidDimension { .. })
        ));
        assert!(!map.is_created());
        map.create(16, 16, 3, 4).expect("create");
        assert!(map.is_created());
        assert_eq!(map.in_tile_radius(), 5);
        assert_eq!((Surface::width(&map), Surface::height(&map)), (48, 64));
    }

    #[test]
    fn set_tile_derives_sheet_index() {
        let mut map = MapTile::new();
        map.create(16, 16, 4, 4).expect("create");
        map.load_sheets(vec![
            Sheet::new("0.png", 16, 16, 2, 2),
            Sheet::new("1.png", 16, 16, 4, 1),
        ])
        .expect("sheets");

        map.set_tile(1, 2, 6).expect("set");
        let tile = map.get_tile(1, 2).expect("tile");
        assert_eq!(tile.number(), 6);
        assert_eq!(tile.sheet(), 1);
        assert_eq!(tile.number_in_sheet(4), 2);
        assert_eq!((tile.pixel_x(), tile.pixel_y()), (16, 32));

        map.set_tile(1, 2, 3).expect("overwrite");
        assert_eq!(map.get_tile(1, 2).map(Tile::sheet), Some(0));
        assert_eq!(map.tiles_number(), 1);
    }

    #[test]
    fn out_of_bounds_is_soft_for_get_and_hard_for_set() {
        let mut map = map_10x10();
        assert!(map.get_tile(-1, 0).is_none());
        assert!(map.get_tile(10, 0).is_none());
        assert!(map.get_tile(0, 10).is_none());
        assert_eq!(
            map.set_tile(10, 3, 0),
            Err(MapTileError::OutOfBounds {
                tx: 10,
                ty: 3,
                width: 10,
                height: 10,
            })
        );
        assert_eq!(map.tiles_number(), 0);
    }

    #[test]
    fn scenario_diagonal_sweep() {
        let mut map = map_10x10();
        map.set_tile(0, 0, 0).expect("set");
        map.set_tile(9, 9, 3).expect("set");

        assert!(map.get_tile(5, 5).is_none());
        assert!(map.get_tile_at(80.0, 80.0).is_none());
        assert_eq!(map.get_tile_at(5.0, 5.0).map(Tile::coords), Some((0, 0)));
        assert_eq!(map.get_tile_at(0.0, 0.0).map(Tile::number), Some(0));

        let hit = map.get_tiles_hit(0.0, 0.0, 144.0, 144.0);
        assert_eq!(coords(&hit), vec![(0, 0), (9, 9)]);
    }

    #[test]
    fn tiles_hit_keeps_traversal_order() {
        let mut map = map_10x10();
        for tx in 0..10 {
            map.set_tile(tx, 1, 1).expect("set");
        }
        let hit = map.get_tiles_hit(40.0, 20.0, 8.0, 20.0);
        assert_eq!(coords(&hit), vec![(2, 1), (1, 1), (0, 1)]);
        assert!(map.get_tiles_hit(3.0, 3.0, 3.0, 3.0).is_empty());
    }

    #[test]
    fn neighbors_skip_empty_and_self() {
        let mut map = map_10x10();
        map.set_tile(0, 0, 0).expect("set");
        map.set_tile(1, 0, 0).expect("set");
        map.set_tile(1, 1, 0).expect("set");
        map.set_tile(3, 3, 0).expect("set");

        let center = *map.get_tile(0, 0).expect("tile");
        let mut around = coords(&map.get_neighbors(&center));
        around.sort_unstable();
        assert_eq!(around, vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn tile_of_localizable_uses_offset() {
        let mut map = map_10x10();
        map.set_tile(2, 1, 0).expect("set");
        let at = Vec2::new(30.0, 10.0);
        assert_eq!(
            map.get_tile_of(&at, 4, 8).map(Tile::coords),
            Some((2, 1))
        );
        assert!(map.get_tile_of(&at, 0, 0).is_none());
        assert_eq!((map.in_tile_x(&at), map.in_tile_y(&at)), (1, 0));
    }

    #[test]
    fn resize_grows_and_keeps_tiles() {
        let mut map = map_10x10();
        map.set_tile(9, 9, 2).expect("set");
        map.resize(12, 15).expect("grow");
        assert_eq!(map.get_tile(9, 9).map(Tile::number), Some(2));
        assert_eq!((map.in_tile_width(), map.in_tile_height()), (12, 15));
        map.set_tile(11, 14, 1).expect("set in new area");

        assert!(matches!(
            map.resize(11, 15),
            Err(MapTileError::ShrinkUnsupported { .. })
        ));
        assert_eq!(MapTile::new().resize(2, 2), Err(MapTileError::NotCreated));
    }

    #[test]
    fn append_grows_to_fit_other_map() {
        let mut map = MapTile::new();
        map.create(16, 16, 4, 4).expect("create");
        map.set_tile(0, 0, 1).expect("set");

        let mut other = MapTile::new();
        other.create(16, 16, 3, 2).expect("create");
        other.set_tile(2, 1, 5).expect("set");

        map.append(&other, 3, 1).expect("append");
        assert_eq!((map.in_tile_width(), map.in_tile_height()), (6, 4));
        assert_eq!(map.get_tile(5, 2).map(Tile::number), Some(5));
        assert_eq!(map.get_tile(0, 0).map(Tile::number), Some(1));
        assert_eq!(map.tiles_number(), 2);
    }

    #[test]
    fn clear_drops_tiles_and_keeps_sheets() {
        let mut map = map_10x10();
        map.set_tile(1, 1, 0).expect("set");
        map.clear();
        assert!(!map.is_created());
        assert!(map.get_tile(1, 1).is_none());
        assert_eq!(map.sheets_number(), 1);
        assert!(map.set_tile(0, 0, 0).is_err());
    }

    #[test]
    fn load_sheets_checks_existing_tile_size() {
        let mut map = map_10x10();
        let err = map
            .load_sheets(vec![Sheet::new("big.png", 32, 32, 2, 2)])
            .expect_err("size mismatch");
        assert!(matches!(err, SheetError::TileSizeMismatch { .. }));

        let mut fresh = MapTile::new();
        fresh
            .load_sheets(vec![Sheet::new("a.png", 8, 12, 4, 4)])
            .expect("sheets first");
        assert_eq!((SurfaceTile::tile_width(&fresh), SurfaceTile::tile_height(&fresh)), (8, 12));
        assert_eq!(fresh.tiles_per_sheet(), Some(16));
    }

    struct Recorder(Rc<RefCell<Vec<(u32, u32, u32)>>>);

    impl TileSetListener for Recorder {
        fn on_tile_set(&mut self, tile: &Tile) {
            self.0
                .borrow_mut()
                .push((tile.in_tile_x(), tile.in_tile_y(), tile.number()));
        }
    }

    #[test]
    fn listeners_observe_set_tile() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut map = map_10x10();
        let id = map.add_listener(Box::new(Recorder(seen.clone())));
        map.set_tile(2, 3, 1).expect("set");
        map.remove_listener(id);
        map.set_tile(4, 4, 2).expect("set");
        assert_eq!(*seen.borrow(), vec![(2, 3, 1)]);
    }

    #[derive(Default)]
    struct Collect(Vec<((u32, u32), i32, i32)>);

    impl TileRenderer for Collect {
        fn render_tile(&mut self, tile: &Tile, sheet: Option<&Sheet>, x: i32, y: i32) {
            assert!(sheet.is_some());
            self.0.push((tile.coords(), x, y));
        }
    }

    #[test]
    fn render_visits_visible_tiles_in_screen_space() {
        let mut map = map_10x10();
        map.set_tile(0, 0, 0).expect("set");
        map.set_tile(2, 0, 0).expect("set");
        map.set_tile(9, 9, 0).expect("set");

        let mut camera = Camera::default();
        camera.set_view(0, 0, 32, 32, 32);
        camera.teleport(16.0, 0.0);

        let mut out = Collect::default();
        map.render(&camera, &mut out);
        assert_eq!(out.0, vec![((2, 0), 16, 16)]);
    }

    #[test]
    fn debug_output_summarises_the_grid() {
        let mut map = map_10x10();
        map.set_tile(1, 1, 0).expect("set");
        let text = format!("{map:?}");
        assert!(text.starts_with("MapTile {"));
        assert!(text.contains("width: 10"));
        assert!(text.contains("tiles: 1"));
    }

    #[test]
    fn render_with_unbounded_view_visits_only_the_grid() {
        let mut map = MapTile::new();
        map.create(16, 16, 4, 4).expect("create");
        map.load_sheets(vec![Sheet::new("tiles.png", 16, 16, 4, 4)])
            .expect("sheets");
        map.set_tile(0, 0, 0).expect("set");
        map.set_tile(3, 3, 0).expect("set");

        let mut out = Collect::default();
        map.render(&Camera::default(), &mut out);
        assert_eq!(
            out.0,
            vec![((0, 0), 0, i32::MAX - 16), ((3, 3), 48, i32::MAX - 64)]
        );

        let mut raised = Camera::default();
        raised.set_view(0, 100, i32::MAX, i32::MAX, 0);
        let mut out = Collect::default();
        map.render(&raised, &mut out);
        assert_eq!(out.0, vec![((0, 0), 0, i32::MAX), ((3, 3), 48, i32::MAX)]);
    }
}
