use crate::geom::Localizable;

/// Position with a remembered previous location. The previous location only
/// changes on `backup` and `teleport*`, so deltas span a whole frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mover {
    x: f64,
    y: f64,
    old_x: f64,
    old_y: f64,
}

impl Mover {
    pub fn backup(&mut self) {
        self.old_x = self.x;
        self.old_y = self.y;
    }

    pub fn move_location(&mut self, extrp: f64, vx: f64, vy: f64) {
        self.move_location_x(extrp, vx);
        self.move_location_y(extrp, vy);
    }

    pub fn move_location_x(&mut self, extrp: f64, vx: f64) {
        self.x += vx * extrp;
    }

    pub fn move_location_y(&mut self, extrp: f64, vy: f64) {
        self.y += vy * extrp;
    }

    pub fn teleport(&mut self, x: f64, y: f64) {
        self.teleport_x(x);
        self.teleport_y(y);
    }

    pub fn teleport_x(&mut self, x: f64) {
        self.x = x;
        self.old_x = x;
    }

    pub fn teleport_y(&mut self, y: f64) {
        self.y = y;
        self.old_y = y;
    }

    pub fn old_x(&self) -> f64 {
        self.old_x
    }

    pub fn old_y(&self) -> f64 {
        self.old_y
    }
}

impl Localizable for Mover {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}
