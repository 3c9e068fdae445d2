use crate::constants::{X_MAX, X_MIN, Y_MAX, Y_MIN};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector for a heading in degrees (0 = east, counter-clockwise).
    pub fn from_heading(degrees: f64) -> Self {
        let radians = degrees.to_radians();
        Vector2D::new(radians.cos(), radians.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn distance(&self, other: Vector2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The rectangular playfield. Copied into every bounded entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayfieldBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlayfieldBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        PlayfieldBounds { x_min, x_max, y_min, y_max }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl Default for PlayfieldBounds {
    fn default() -> Self {
        PlayfieldBounds::new(X_MIN, X_MAX, Y_MIN, Y_MAX)
    }
}

/// Edges are inclusive: a position sitting exactly on a boundary is in bounds.
pub fn out_of_bounds(position: Vector2D, bounds: &PlayfieldBounds) -> bool {
    position.x < bounds.x_min
        || position.x > bounds.x_max
        || position.y < bounds.y_min
        || position.y > bounds.y_max
}

/// Normalizes a heading into `[0, 360)`.
pub fn normalize_heading(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}
