//! Integer positions and rectangles in pixel-grid space.

use std::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.offset(other.x, other.y)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.offset(-other.x, -other.y)
    }
}

/// Axis-aligned rectangle covering `[x, right) × [y, bottom)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub const fn contains(&self, pos: Position) -> bool {
        self.x <= pos.x && pos.x < self.right() && self.y <= pos.y && pos.y < self.bottom()
    }

    /// Overlap of `self` and `other`.
    ///
    /// Disjoint rectangles produce a zero-area rectangle at `self`'s origin, so
    /// the result never has a negative extent.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let result = Rect::from_ltrb(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        );
        if result.width >= 0 && result.height >= 0 {
            result
        } else {
            Rect::new(self.x, self.y, 0, 0)
        }
    }

    /// The rectangle shrunk by `n` cells on every side, never smaller than
    /// empty.
    pub fn inset(&self, n: i32) -> Rect {
        Rect::new(
            self.x + n,
            self.y + n,
            (self.width - 2 * n).max(0),
            (self.height - 2 * n).max(0),
        )
    }

    /// Cells on the rectangle's outline, each exactly once: top and bottom rows
    /// left to right, then the left and right columns between them.
    pub fn perimeter(&self) -> impl Iterator<Item = Position> + '_ {
        let Rect {
            x: x0,
            y: y0,
            width,
            height,
        } = *self;
        let (x1, y1) = (self.right(), self.bottom());

        let rows = (x0..x1).flat_map(move |x| {
            let top = Some(Position::new(x, y0)).filter(|_| height >= 1);
            let bottom = Some(Position::new(x, y1 - 1)).filter(|_| height >= 2);
            top.into_iter().chain(bottom)
        });
        let columns = (y0 + 1..y1 - 1).flat_map(move |y| {
            let left = Some(Position::new(x0, y));
            let right = Some(Position::new(x1 - 1, y)).filter(|_| width >= 2);
            left.into_iter().chain(right)
        });
        rows.chain(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(4, -2, 10, 5);
        assert_eq!(a.intersect(&b), Rect::new(4, 0, 6, 3));
        assert_eq!(b.intersect(&a), Rect::new(4, 0, 6, 3));
    }

    #[test]
    fn intersect_disjoint_is_empty_at_origin() {
        let a = Rect::new(3, 7, 10, 10);
        let b = Rect::new(20, 0, 5, 5);
        let result = a.intersect(&b);
        assert!(result.is_empty());
        assert_eq!(result, Rect::new(3, 7, 0, 0));
    }

    #[test]
    fn intersect_touching_edges_has_zero_width() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        let result = a.intersect(&b);
        assert!(result.is_empty());
        assert_eq!(result.width, 0);
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(Position::new(2, 3)));
        assert!(rect.contains(Position::new(5, 7)));
        assert!(!rect.contains(Position::new(6, 3)));
        assert!(!rect.contains(Position::new(2, 8)));
        assert!(!rect.contains(Position::new(1, 3)));
    }

    #[test]
    fn position_arithmetic() {
        let p = Position::new(3, -4);
        assert_eq!(p.offset(1, 1), Position::new(4, -3));
        assert_eq!(p + Position::new(2, 2), Position::new(5, -2));
        assert_eq!(p - Position::new(3, -4), Position::default());
    }

    #[test]
    fn inset_drops_the_outline() {
        let rect = Rect::new(2, 3, 6, 4);
        let inner = rect.inset(1);
        assert_eq!(inner, Rect::new(3, 4, 4, 2));
        assert!(rect.perimeter().all(|pos| !inner.contains(pos)));
        assert!(Rect::new(0, 0, 2, 9).inset(1).is_empty());
        assert!(Rect::default().inset(1).is_empty());
    }

    #[test]
    fn perimeter_visits_each_edge_cell_once() {
        let rect = Rect::new(1, 1, 4, 3);
        let cells: Vec<Position> = rect.perimeter().collect();
        assert_eq!(cells.len(), 2 * 4 + 2 * 3 - 4);

        let mut unique = cells.clone();
        unique.sort_by_key(|p| (p.y, p.x));
        unique.dedup();
        assert_eq!(unique.len(), cells.len());
        assert!(!cells.contains(&Position::new(2, 2)));
    }

    #[test]
    fn perimeter_of_thin_rects() {
        assert_eq!(Rect::new(0, 0, 5, 1).perimeter().count(), 5);
        assert_eq!(Rect::new(0, 0, 1, 5).perimeter().count(), 5);
        assert_eq!(Rect::new(0, 0, 1, 1).perimeter().count(), 1);
        assert_eq!(Rect::new(0, 0, 0, 0).perimeter().count(), 0);
    }
}
