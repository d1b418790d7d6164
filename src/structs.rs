//! # Core Data Structures
//!
//! Geometry shared by every other module:
//!
//! - **Point**: 2D position on the canvas
//! - **Vector2D**: velocity, force or direction with arithmetic operations
//! - **Rect**: integer axis-aligned rectangle used for obstacles and regions
//! - **WorldBounds**: canvas extents agents are clamped into
//!
//! Positions are continuous (`f64`) while rectangles live on the pixel grid
//! (`i32`), so collision tests truncate agent hitboxes onto that grid.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// Default canvas width in world units (pixels).
pub const DEFAULT_WIDTH: f64 = 960.0;
/// Default canvas height in world units (pixels).
pub const DEFAULT_HEIGHT: f64 = 640.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (*self - *other).magnitude()
    }
}

impl Sub for Point {
    type Output = Vector2D;

    fn sub(self, other: Point) -> Vector2D {
        Vector2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Add<Vector2D> for Point {
    type Output = Point;

    fn add(self, other: Vector2D) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalize(&self) -> Vector2D {
        let mag = self.magnitude();
        if mag > 0.0 {
            Vector2D {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Vector2D::ZERO
        }
    }

    /// Rescales the vector down to `max` when it is longer, keeping direction.
    pub fn clamp_magnitude(&self, max: f64) -> Vector2D {
        let mag = self.magnitude();
        if mag > max {
            Vector2D {
                x: self.x / mag * max,
                y: self.y / mag * max,
            }
        } else {
            *self
        }
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, other: Vector2D) -> Vector2D {
        Vector2D {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, other: Vector2D) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, other: Vector2D) -> Vector2D {
        Vector2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f64> for Vector2D {
    type Output = Vector2D;

    fn mul(self, scalar: f64) -> Vector2D {
        Vector2D {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Axis-aligned rectangle on the pixel grid.
///
/// Intersection follows raster semantics: rectangles that merely share an
/// edge do not collide, and a rectangle with zero width or height collides
/// with nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.width <= 0 || self.height <= 0 || other.width <= 0 || other.height <= 0 {
            return false;
        }
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Grows the rectangle by `dx` / `dy` in total, keeping it centred.
    pub fn inflate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x - dx / 2,
            y: self.y - dy / 2,
            width: self.width + dx,
            height: self.height + dy,
        }
    }

    /// True when the disk at `center` with `radius` touches or overlaps the rect.
    pub fn hits_circle(&self, center: Point, radius: f64) -> bool {
        let closest_x = center.x.clamp(self.left() as f64, self.right() as f64);
        let closest_y = center.y.clamp(self.top() as f64, self.bottom() as f64);
        let dx = center.x - closest_x;
        let dy = center.y - closest_y;
        dx * dx + dy * dy <= radius * radius
    }

    #[cfg(test)]
    pub(crate) fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() as f64
            && p.x <= self.right() as f64
            && p.y >= self.top() as f64
            && p.y <= self.bottom() as f64
    }
}

impl From<[i32; 4]> for Rect {
    fn from(raw: [i32; 4]) -> Self {
        Rect::new(raw[0], raw[1], raw[2], raw[3])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        WorldBounds {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl WorldBounds {
    pub fn new(width: f64, height: f64) -> Self {
        WorldBounds { width, height }
    }

    /// Clamps the centre of a disk so the disk stays on the canvas.
    pub fn clamp_disk(&self, p: Point, radius: f64) -> Point {
        Point {
            x: p.x.max(radius).min(self.width - radius),
            y: p.y.max(radius).min(self.height - radius),
        }
    }

    pub fn width_px(&self) -> i32 {
        self.width as i32
    }

    pub fn height_px(&self) -> i32 {
        self.height as i32
    }
}
