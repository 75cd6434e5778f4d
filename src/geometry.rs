// src/geometry.rs

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A position in internal units (mils).
pub type Point = IVec2;

/// Axis aligned box stored as origin + size, the way the editor keeps
/// item extents. A box built from two corners is always normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Point,
}

impl Rect {
    pub fn new(origin: Point, size: Point) -> Self {
        let mut rect = Rect { origin, size };
        rect.normalize();
        rect
    }

    pub fn from_corners(a: Point, b: Point) -> Self {
        Rect::new(a, b - a)
    }

    /// A zero sized box at `p`.
    pub fn at(p: Point) -> Self {
        Rect {
            origin: p,
            size: Point::ZERO,
        }
    }

    fn normalize(&mut self) {
        if self.size.x < 0 {
            self.origin.x += self.size.x;
            self.size.x = -self.size.x;
        }
        if self.size.y < 0 {
            self.origin.y += self.size.y;
            self.size.y = -self.size.y;
        }
    }

    pub fn end(&self) -> Point {
        self.origin + self.size
    }

    pub fn center(&self) -> Point {
        self.origin + self.size / 2
    }

    /// Edges are inside.
    pub fn contains(&self, p: Point) -> bool {
        let end = self.end();
        p.x >= self.origin.x && p.x <= end.x && p.y >= self.origin.y && p.y <= end.y
    }

    pub fn inflate(mut self, delta: i32) -> Self {
        self.origin -= Point::splat(delta);
        self.size += Point::splat(delta * 2);
        // Deflating past zero collapses onto the center instead of flipping.
        if self.size.x < 0 {
            self.origin.x += self.size.x / 2;
            self.size.x = 0;
        }
        if self.size.y < 0 {
            self.origin.y += self.size.y / 2;
            self.size.y = 0;
        }
        self
    }

    pub fn merge(&self, other: &Rect) -> Rect {
        let min = self.origin.min(other.origin);
        let max = self.end().max(other.end());
        Rect::from_corners(min, max)
    }
}

/// Symbol orientation matrix. Library coordinates have Y pointing up, so the
/// default transform used to place a symbol on a sheet flips the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x1: 1,
        y1: 0,
        x2: 0,
        y2: 1,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.x1 * p.x + self.y1 * p.y, self.x2 * p.x + self.y2 * p.y)
    }

    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        Rect::from_corners(self.apply(rect.origin), self.apply(rect.end()))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            x1: 1,
            y1: 0,
            x2: 0,
            y2: -1,
        }
    }
}

/// Display units for coordinates in user facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Mils,
    Inches,
    Millimetres,
}

impl Units {
    pub fn format(&self, mils: i32) -> String {
        match self {
            Units::Mils => format!("{} mils", mils),
            Units::Inches => format!("{:.3} in", mils as f64 / 1000.0),
            Units::Millimetres => format!("{:.4} mm", mils as f64 * 0.0254),
        }
    }

    pub fn format_point(&self, p: Point) -> String {
        format!("({}, {})", self.format(p.x), self.format(p.y))
    }
}

/// True when `p` lies within `accuracy` of the segment `a`-`b`.
pub fn test_segment_hit(p: Point, a: Point, b: Point, accuracy: i32) -> bool {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = (b.x as f64 - ax, b.y as f64 - ay);
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    let dist_sq = (px - cx) * (px - cx) + (py - cy) * (py - cy);
    let accuracy = accuracy.max(0) as f64;
    dist_sq <= accuracy * accuracy
}

/// Rough extent of a single line of text anchored at its lower left corner.
/// Glyph metrics belong to the renderer, so every character counts as one
/// text size wide.
pub fn text_box(pos: Point, text: &str, size: i32) -> Rect {
    let width = text.chars().count() as i32 * size;
    Rect::from_corners(pos, pos + Point::new(width, -size))
}
