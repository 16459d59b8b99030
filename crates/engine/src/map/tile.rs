use crate::geom::{Localizable, Shape};

/// One grid cell. `number` is the global tile number across all sheets and
/// `sheet` the sheet it lives in; pixel coordinates derive from the grid
/// coordinates and the map's tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    number: u32,
    sheet: u32,
    tx: u32,
    ty: u32,
    width: u32,
    height: u32,
}

impl Tile {
    pub(crate) fn new(number: u32, sheet: u32, tx: u32, ty: u32, width: u32, height: u32) -> Self {
        Self {
            number,
            sheet,
            tx,
            ty,
            width,
            height,
        }
    }

    pub(crate) fn set(&mut self, number: u32, sheet: u32) {
        self.number = number;
        self.sheet = sheet;
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn sheet(&self) -> u32 {
        self.sheet
    }

    /// Index inside its sheet.
    pub fn number_in_sheet(&self, tiles_per_sheet: u32) -> u32 {
        if tiles_per_sheet == 0 {
            return self.number;
        }
        self.number % tiles_per_sheet
    }

    pub fn in_tile_x(&self) -> u32 {
        self.tx
    }

    pub fn in_tile_y(&self) -> u32 {
        self.ty
    }

    pub fn coords(&self) -> (u32, u32) {
        (self.tx, self.ty)
    }

    pub fn pixel_x(&self) -> i32 {
        (self.tx * self.width) as i32
    }

    pub fn pixel_y(&self) -> i32 {
        (self.ty * self.height) as i32
    }

    pub fn tile_width(&self) -> u32 {
        self.width
    }

    pub fn tile_height(&self) -> u32 {
        self.height
    }
}

impl Localizable for Tile {
    fn x(&self) -> f64 {
        f64::from(self.pixel_x())
    }

    fn y(&self) -> f64 {
        f64::from(self.pixel_y())
    }
}

impl Shape for Tile {
    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_position_follows_grid() {
        let tile = Tile::new(5, 1, 3, 2, 16, 8);
        assert_eq!((tile.pixel_x(), tile.pixel_y()), (48, 16));
        assert_eq!(tile.number_in_sheet(4), 1);
        assert_eq!(tile.x(), 48.0);
    }
}
