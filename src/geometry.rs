// src/geometry.rs

//! Cell-space geometry: points, exclusive rectangles, viewports and
//! row-major point spans.
//!
//! All coordinates are in cells. Buffer coordinates are absolute rows of
//! the text buffer; screen (viewport-relative) coordinates have their origin
//! at the top-left of the visible viewport.

use std::ops::{Add, AddAssign, Sub};

pub type CoordType = i32;

/// A 2D point in cell space, `(column, row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: CoordType,
    pub y: CoordType,
}

impl Point {
    pub const fn new(x: CoordType, y: CoordType) -> Self {
        Self { x, y }
    }
}

// Row-major ordering, so spans compare the way text reads.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: CoordType,
    pub height: CoordType,
}

impl Size {
    pub const fn new(width: CoordType, height: CoordType) -> Self {
        Self { width, height }
    }
}

/// A rectangle with exclusive `right` and `bottom` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: CoordType,
    pub top: CoordType,
    pub right: CoordType,
    pub bottom: CoordType,
}

impl Rect {
    pub const fn new(left: CoordType, top: CoordType, right: CoordType, bottom: CoordType) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_point_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, origin.x + size.width, origin.y + size.height)
    }

    pub fn width(&self) -> CoordType {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> CoordType {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// The overlap of two rectangles, or an empty default rect if they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() {
            Rect::default()
        } else {
            r
        }
    }

    /// The smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub fn offset(&self, delta: Point) -> Rect {
        Rect::new(
            self.left + delta.x,
            self.top + delta.y,
            self.right + delta.x,
            self.bottom + delta.y,
        )
    }
}

/// The visible window onto the text buffer, in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    origin: Point,
    size: Size,
}

impl Viewport {
    pub fn from_dimensions(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size: Size::new(size.width.max(0), size.height.max(0)),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::from_dimensions(rect.origin(), Size::new(rect.width(), rect.height()))
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn left(&self) -> CoordType {
        self.origin.x
    }

    pub fn top(&self) -> CoordType {
        self.origin.y
    }

    pub fn width(&self) -> CoordType {
        self.size.width
    }

    pub fn height(&self) -> CoordType {
        self.size.height
    }

    pub fn right_exclusive(&self) -> CoordType {
        self.origin.x + self.size.width
    }

    pub fn bottom_exclusive(&self) -> CoordType {
        self.origin.y + self.size.height
    }

    pub fn right_inclusive(&self) -> CoordType {
        self.right_exclusive() - 1
    }

    pub fn bottom_inclusive(&self) -> CoordType {
        self.bottom_exclusive() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_point_size(self.origin, self.size)
    }

    pub fn is_in_bounds(&self, p: Point) -> bool {
        self.to_rect().contains(p)
    }

    pub fn intersect(&self, other: &Viewport) -> Viewport {
        Viewport::from_rect(self.to_rect().intersect(&other.to_rect()))
    }

    pub fn offset(&self, delta: Point) -> Viewport {
        Viewport::from_dimensions(self.origin + delta, self.size)
    }

    /// Clips `rect` to this viewport. Returns false (leaving `rect` empty)
    /// when nothing of it is visible.
    pub fn trim_to_viewport(&self, rect: &mut Rect) -> bool {
        *rect = rect.intersect(&self.to_rect());
        !rect.is_empty()
    }

    /// Translates a buffer-space rectangle into this viewport's origin.
    pub fn convert_to_origin(&self, rect: &Rect) -> Rect {
        rect.offset(Point::new(-self.origin.x, -self.origin.y))
    }

    /// Translates a viewport-relative rectangle back into buffer space.
    pub fn convert_from_origin(&self, rect: &Rect) -> Rect {
        rect.offset(self.origin)
    }

    /// Moves `pos` by `delta` cells in row-major order inside this viewport.
    ///
    /// Returns false and leaves `pos` clamped to the nearest edge when the
    /// walk would leave the viewport.
    pub fn walk_in_bounds(&self, pos: &mut Point, delta: isize) -> bool {
        if self.is_empty() {
            return false;
        }
        let width = self.size.width as isize;
        let linear = (pos.y - self.origin.y) as isize * width + (pos.x - self.origin.x) as isize;
        let target = linear + delta;
        let total = width * self.size.height as isize;
        if target < 0 {
            *pos = self.origin;
            return false;
        }
        if target >= total {
            *pos = Point::new(self.right_inclusive(), self.bottom_inclusive());
            return false;
        }
        *pos = Point::new(
            self.origin.x + (target % width) as CoordType,
            self.origin.y + (target / width) as CoordType,
        );
        true
    }
}

/// A row-major span of cells with an inclusive `end`, as used for
/// selections and search highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointSpan {
    pub start: Point,
    pub end: Point,
}

impl PointSpan {
    pub fn new(start: Point, end: Point) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.start <= p && p <= self.end
    }

    /// Calls `f(row, min, max)` for every row the span touches, where
    /// `[min, max)` is the covered column range on a buffer `width` wide.
    pub fn iterate_rows<F>(&self, width: CoordType, mut f: F)
    where
        F: FnMut(CoordType, CoordType, CoordType),
    {
        for row in self.start.y..=self.end.y {
            let min = if row == self.start.y { self.start.x } else { 0 };
            let max = if row == self.end.y { self.end.x + 1 } else { width };
            if min < max {
                f(row, min, max);
            }
        }
    }
}
