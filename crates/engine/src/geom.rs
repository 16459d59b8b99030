#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Anything with a world location (ascending Y up).
pub trait Localizable {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

/// A localizable with an extent; `x`/`y` is its reference point.
pub trait Shape: Localizable {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
}

pub trait Surface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
}

pub trait SurfaceTile: Surface {
    fn tile_width(&self) -> i32;
    fn tile_height(&self) -> i32;
}

impl Localizable for Vec2 {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: i32,
    pub height: i32,
}

impl Localizable for Rect {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl Shape for Rect {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }
}

/// Per-axis direction scaled by the dominant component, plus the dominant magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Force {
    pub direction_horizontal: f64,
    pub direction_vertical: f64,
    pub velocity: f64,
}

impl Force {
    pub fn from_vector(ox: f64, oy: f64, x: f64, y: f64) -> Self {
        let dh = x - ox;
        let dv = y - oy;
        let norm = dh.abs().max(dv.abs());
        if norm == 0.0 {
            return Self::default();
        }
        Self {
            direction_horizontal: dh / norm,
            direction_vertical: dv / norm,
            velocity: norm,
        }
    }
}

/// Probe points along a segment: one unit of the dominant axis per step, each
/// step yielding the point after the vertical advance and again after the
/// horizontal one, rounded toward the direction of travel.
#[derive(Debug, Clone)]
pub struct SegmentWalk {
    force: Force,
    h: f64,
    v: f64,
    step: f64,
    vertical_done: bool,
}

impl SegmentWalk {
    pub fn new(ox: f64, oy: f64, x: f64, y: f64) -> Self {
        Self {
            force: Force::from_vector(ox, oy, x, y),
            h: ox,
            v: oy,
            step: 0.0,
            vertical_done: false,
        }
    }
}

impl Iterator for SegmentWalk {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<(f64, f64)> {
        if self.vertical_done {
            self.h += self.force.direction_horizontal;
            self.vertical_done = false;
            self.step += 1.0;
        } else {
            if self.step >= self.force.velocity {
                return None;
            }
            self.v += self.force.direction_vertical;
            self.vertical_done = true;
        }
        Some((
            round_toward(self.force.direction_horizontal, self.h),
            round_toward(self.force.direction_vertical, self.v),
        ))
    }
}

/// Rounds toward the moving direction: ceil when `speed >= 0`, floor otherwise.
pub fn round_toward(speed: f64, value: f64) -> f64 {
    if speed < 0.0 {
        value.floor()
    } else {
        value.ceil()
    }
}

/// Largest multiple of `step` not above `value`.
pub fn rounded(value: f64, step: i32) -> i32 {
    if step == 0 {
        return value as i32;
    }
    ((value / f64::from(step)).floor() as i64 * i64::from(step)) as i32
}

/// Smallest multiple of `step` not below `value`.
pub fn rounded_ceil(value: i64, step: i32) -> i64 {
    if step == 0 {
        return value;
    }
    let step = i64::from(step);
    (value + step - 1).div_euclid(step) * step
}
