use tracing::debug;

use crate::geom::{rounded, rounded_ceil, Localizable, Shape, Surface, SurfaceTile};
use crate::mover::Mover;

/// Read side of a camera: world to viewpoint transforms and culling.
///
/// Viewpoint space is screen space: X grows right, Y grows down. World space
/// has Y growing up, hence the flip in [`Viewer::viewpoint_y`].
pub trait Viewer {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn view_x(&self) -> i32;
    fn view_y(&self) -> i32;
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn screen_height(&self) -> i32;

    fn viewpoint_x(&self, x: f64) -> f64 {
        x - self.x()
    }

    fn viewpoint_y(&self, y: f64) -> f64 {
        self.y() + f64::from(self.height()) - y
    }

    fn is_viewable(&self, localizable: &dyn Localizable, radius_x: i32, radius_y: i32) -> bool {
        let (rx, ry) = (f64::from(radius_x), f64::from(radius_y));
        let (left, top) = (f64::from(self.view_x()), f64::from(self.view_y()));
        let outside = self.viewpoint_x(localizable.x() + rx) < left
            || self.viewpoint_x(localizable.x() - rx) > left + f64::from(self.width())
            || self.viewpoint_y(localizable.y() - ry) < top
            || self.viewpoint_y(localizable.y() + ry) > top + f64::from(self.height());
        !outside
    }

    fn is_viewable_shape(&self, shape: &dyn Shape, radius_x: i32, radius_y: i32) -> bool {
        let (w, h) = (f64::from(shape.width()), f64::from(shape.height()));
        let (rx, ry) = (f64::from(radius_x), f64::from(radius_y));
        let (left, top) = (f64::from(self.view_x()), f64::from(self.view_y()));
        let outside = self.viewpoint_x(shape.x() + w + rx) < left
            || self.viewpoint_x(shape.x() - w - rx) > left + f64::from(self.width())
            || self.viewpoint_y(shape.y() - h - ry) < top
            || self.viewpoint_y(shape.y() + h + ry) > top + f64::from(self.height());
        !outside
    }
}

/// Camera with an elastic dead-zone.
///
/// `offset` absorbs movement until it reaches `±interval` on an axis; only then
/// does `mover` (the committed position) translate. The dead-zone is active on
/// an axis only once both limits of that axis are set.
#[derive(Debug, Clone)]
pub struct Camera {
    mover: Mover,
    offset: Mover,
    interval_horizontal: i32,
    interval_vertical: i32,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    screen_height: i32,
    limit_left: Option<i32>,
    limit_right: Option<i32>,
    limit_top: Option<i32>,
    limit_bottom: Option<i32>,
    shake: (i32, i32),
    shake2: (i32, i32),
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            mover: Mover::default(),
            offset: Mover::default(),
            interval_horizontal: 0,
            interval_vertical: 0,
            x: 0,
            y: 0,
            width: i32::MAX,
            height: i32::MAX,
            screen_height: 0,
            limit_left: None,
            limit_right: None,
            limit_top: None,
            limit_bottom: None,
            shake: (0, 0),
            shake2: (0, 0),
        }
    }
}

impl Camera {
    pub fn backup(&mut self) {
        self.mover.backup();
    }

    pub fn set_intervals(&mut self, horizontal: i32, vertical: i32) {
        self.interval_horizontal = horizontal;
        self.interval_vertical = vertical;
    }

    pub fn intervals(&self) -> (i32, i32) {
        (self.interval_horizontal, self.interval_vertical)
    }

    /// Re-centres on `localizable` with an empty dead-zone, then restores the intervals.
    pub fn reset_interval(&mut self, localizable: &dyn Localizable) {
        let (old_h, old_v) = self.intervals();
        let (old_x, old_y) = (Viewer::x(self), Viewer::y(self));

        self.set_intervals(0, 0);
        self.offset.teleport(0.0, 0.0);
        self.set_location(localizable.x(), localizable.y());

        let (new_x, new_y) = (Viewer::x(self), Viewer::y(self));
        self.move_location(1.0, old_x - new_x, old_y - new_y);
        self.move_location(1.0, new_x - old_x, new_y - old_y);

        self.set_intervals(old_h, old_v);
        self.offset.teleport(0.0, 0.0);
        self.mover.backup();
    }

    pub fn move_location(&mut self, extrp: f64, vx: f64, vy: f64) {
        self.check_horizontal_limit(extrp, vx);
        self.check_vertical_limit(extrp, vy);
    }

    pub fn set_location(&mut self, x: f64, y: f64) {
        let dx = x - (self.mover.x() + self.offset.x());
        let dy = y - (self.mover.y() + self.offset.y());
        self.move_location(1.0, dx, dy);
    }

    pub fn set_location_x(&mut self, x: f64) {
        let dx = x - (self.mover.x() + self.offset.x());
        self.check_horizontal_limit(1.0, dx);
    }

    pub fn set_location_y(&mut self, y: f64) {
        let dy = y - (self.mover.y() + self.offset.y());
        self.check_vertical_limit(1.0, dy);
    }

    /// Snaps to `(x, y)` and drops any elastic lag.
    pub fn teleport(&mut self, x: f64, y: f64) {
        self.offset.teleport(0.0, 0.0);
        self.mover.teleport(x, y);
    }

    pub fn center(&mut self, shape: &dyn Shape) {
        let x = shape.x() + f64::from(shape.width() - self.width) / 2.0;
        let y = shape.y() + f64::from(shape.height() - self.height) / 2.0;
        self.teleport(x, y);
    }

    pub fn round(&mut self, surface: &dyn SurfaceTile) {
        let th = surface.tile_height();
        let x = rounded(self.mover.x(), surface.tile_width());
        let y = rounded(self.mover.y(), th) + th;
        self.teleport(f64::from(x), f64::from(y));
    }

    pub fn set_view(&mut self, x: i32, y: i32, width: i32, height: i32, screen_height: i32) {
        self.x = x;
        self.y = y;
        self.width = width.max(0);
        self.height = height.max(0);
        self.screen_height = screen_height;
    }

    pub fn set_shake(&mut self, shake_x: i32, shake_y: i32) {
        self.shake = (shake_x, shake_y);
    }

    pub fn set_shake2(&mut self, shake_x: i32, shake_y: i32) {
        self.shake2 = (shake_x, shake_y);
    }

    /// Limits from a surface at pixel granularity. Call after [`Camera::set_view`].
    pub fn set_limits(&mut self, surface: &dyn Surface) {
        self.set_limits_grid(surface, 1, 1);
    }

    /// Limits from a tiled surface, keeping the view aligned to whole tiles.
    pub fn set_limits_tiled(&mut self, surface: &dyn SurfaceTile) {
        let (grid_h, grid_v) = (surface.tile_width(), surface.tile_height());
        self.set_limits_grid(surface, grid_h, grid_v);
    }

    pub fn set_limit_left(&mut self, limit: Option<i32>) {
        self.limit_left = limit;
    }

    pub fn set_limit_right(&mut self, limit: Option<i32>) {
        self.limit_right = limit;
    }

    pub fn set_limit_top(&mut self, limit: Option<i32>) {
        self.limit_top = limit;
    }

    pub fn set_limit_bottom(&mut self, limit: Option<i32>) {
        self.limit_bottom = limit;
    }

    /// `(left, right, bottom, top)`.
    pub fn limits(&self) -> (Option<i32>, Option<i32>, Option<i32>, Option<i32>) {
        (
            self.limit_left,
            self.limit_right,
            self.limit_bottom,
            self.limit_top,
        )
    }

    pub fn movement_horizontal(&self) -> f64 {
        self.mover.x() - self.mover.old_x()
    }

    pub fn movement_vertical(&self) -> f64 {
        self.mover.y() - self.mover.old_y()
    }

    pub fn mover(&self) -> &Mover {
        &self.mover
    }

    pub fn offset(&self) -> &Mover {
        &self.offset
    }

    fn set_limits_grid(&mut self, surface: &dyn Surface, grid_h: i32, grid_v: i32) {
        let right = if grid_h == 0 {
            0
        } else {
            let view = rounded_ceil(i64::from(self.width), grid_h);
            (i64::from(surface.width()) - view).max(0) as i32
        };
        let top = if grid_v == 0 {
            0
        } else {
            let view = rounded_ceil(i64::from(self.height), grid_v);
            (i64::from(surface.height()) - view).max(0) as i32
        };
        self.limit_left = Some(0);
        self.limit_right = Some(right);
        self.limit_bottom = Some(0);
        self.limit_top = Some(top);
        debug!(
            limit_right = right,
            limit_top = top,
            grid_h,
            grid_v,
            "camera_limits_set"
        );

        self.move_location(1.0, 0.0, 0.0);
    }

    fn check_horizontal_limit(&mut self, extrp: f64, vx: f64) {
        if let (Some(left), Some(right)) = (self.limit_left, self.limit_right) {
            let x = self.mover.x();
            if x >= f64::from(left) && x <= f64::from(right) {
                self.offset.move_location_x(extrp, vx);
                let interval = f64::from(self.interval_horizontal);
                if self.offset.x() < -interval {
                    self.offset.teleport_x(-interval);
                } else if self.offset.x() > interval {
                    self.offset.teleport_x(interval);
                }
            }
        }
        let offset = self.offset.x() as i32;
        if offset == -self.interval_horizontal || offset == self.interval_horizontal {
            self.mover.move_location_x(extrp, vx);
        }
        self.apply_horizontal_limit();
    }

    fn check_vertical_limit(&mut self, extrp: f64, vy: f64) {
        if let (Some(bottom), Some(top)) = (self.limit_bottom, self.limit_top) {
            let y = self.mover.y();
            if y >= f64::from(bottom) && y <= f64::from(top) {
                self.offset.move_location_y(extrp, vy);
                let interval = f64::from(self.interval_vertical);
                if self.offset.y() < -interval {
                    self.offset.teleport_y(-interval);
                } else if self.offset.y() > interval {
                    self.offset.teleport_y(interval);
                }
            }
        }
        let offset = self.offset.y() as i32;
        if offset == -self.interval_vertical || offset == self.interval_vertical {
            self.mover.move_location_y(extrp, vy);
        }
        self.apply_vertical_limit();
    }

    fn apply_horizontal_limit(&mut self) {
        let x = self.mover.x();
        match (self.limit_left, self.limit_right) {
            (Some(left), _) if x < f64::from(left) => self.mover.teleport_x(f64::from(left)),
            (_, Some(right)) if x > f64::from(right) => self.mover.teleport_x(f64::from(right)),
            _ => {}
        }
    }

    fn apply_vertical_limit(&mut self) {
        let y = self.mover.y();
        match (self.limit_bottom, self.limit_top) {
            (Some(bottom), _) if y < f64::from(bottom) => self.mover.teleport_y(f64::from(bottom)),
            (_, Some(top)) if y > f64::from(top) => self.mover.teleport_y(f64::from(top)),
            _ => {}
        }
    }
}

impl Viewer for Camera {
    fn x(&self) -> f64 {
        self.mover.x() - f64::from(self.x) + f64::from(self.shake.0 + self.shake2.0)
    }

    fn y(&self) -> f64 {
        self.mover.y() + f64::from(self.y) + f64::from(self.shake.1 + self.shake2.1)
    }

    fn view_x(&self) -> i32 {
        self.x
    }

    fn view_y(&self) -> i32 {
        self.y
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn screen_height(&self) -> i32 {
        self.screen_height
    }
}
