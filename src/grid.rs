//! Two-dimensional cell buffers with an explicit row stride.
//!
//! A [`Grid`] either owns its cells or is a view into memory owned by someone
//! else (for example a display frame buffer). Only an owning grid ever frees
//! its storage; a view just borrows the slice for its lifetime.

use std::ops::{Deref, DerefMut, Index, IndexMut};

use rayon::prelude::{IndexedParallelIterator, ParallelIterator, ParallelSliceMut};
use thiserror::Error;

use crate::{
    config::MAX_LOOPS,
    geometry::{Position, Rect},
};

/// Packed value of a pixel that has not been rendered.
pub const UNRENDERED: u8 = 0;
/// Packed value of a pixel that is waiting in the frontier queue.
pub const PENDING: u8 = 1;
/// Escape-time counts are stored shifted up by this much, leaving room for the
/// two sentinels.
pub const COUNT_OFFSET: u8 = 2;

/// Escape-time grid as used by the renderer.
pub type CountGrid = Grid<'static, u8>;

/// The meaning of a packed escape-time cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Unrendered,
    Pending,
    /// Escape-time count in `[0, MAX_LOOPS]`.
    Computed(u8),
}

impl Cell {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            UNRENDERED => Cell::Unrendered,
            PENDING => Cell::Pending,
            n => Cell::Computed(n - COUNT_OFFSET),
        }
    }

    pub const fn raw(self) -> u8 {
        match self {
            Cell::Unrendered => UNRENDERED,
            Cell::Pending => PENDING,
            Cell::Computed(n) => {
                debug_assert!(n <= MAX_LOOPS);
                n + COUNT_OFFSET
            }
        }
    }

    pub const fn is_computed(raw: u8) -> bool {
        raw >= COUNT_OFFSET
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid grid size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("stride {stride} is narrower than width {width}")]
    StrideTooSmall { width: i32, stride: i32 },
    #[error("backing store holds {len} cells, {required} are needed")]
    StorageTooSmall { len: usize, required: usize },
}

enum Storage<'a, T> {
    Owned(Vec<T>),
    Borrowed(&'a mut [T]),
}

impl<'a, T> Deref for Storage<'a, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            Storage::Owned(cells) => cells,
            Storage::Borrowed(cells) => cells,
        }
    }
}

impl<'a, T> DerefMut for Storage<'a, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match self {
            Storage::Owned(cells) => cells,
            Storage::Borrowed(cells) => cells,
        }
    }
}

pub struct Grid<'a, T> {
    width: i32,
    height: i32,
    stride: i32,
    storage: Storage<'a, T>,
}

impl<T: Copy + Default> Grid<'static, T> {
    /// An owned `width × height` grid filled with `T::default()`.
    pub fn new(width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0);
        let (width, height) = (width.max(0), height.max(0));
        Grid {
            width,
            height,
            stride: width,
            storage: Storage::Owned(vec![T::default(); (width * height) as usize]),
        }
    }
}

impl<'a, T: Copy> Grid<'a, T> {
    /// A grid over `cells`, where row `y` starts at `cells[y * stride]`.
    pub fn view(width: i32, height: i32, stride: i32, cells: &'a mut [T]) -> Result<Self, GridError> {
        if width < 0 || height < 0 {
            return Err(GridError::InvalidSize { width, height });
        }
        if stride < width {
            return Err(GridError::StrideTooSmall { width, stride });
        }
        let required = if height == 0 {
            0
        } else {
            (stride * (height - 1) + width) as usize
        };
        if cells.len() < required {
            return Err(GridError::StorageTooSmall {
                len: cells.len(),
                required,
            });
        }
        Ok(Grid {
            width,
            height,
            stride,
            storage: Storage::Borrowed(cells),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn stride(&self) -> i32 {
        self.stride
    }

    /// Whether dropping this grid releases its storage.
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        (y * self.stride + x) as usize
    }

    pub fn get(&self, pos: Position) -> Option<T> {
        if self.bounds().contains(pos) {
            Some(self.storage[self.offset(pos.x, pos.y)])
        } else {
            None
        }
    }

    pub fn row(&self, y: i32) -> &[T] {
        let start = self.offset(0, y);
        &self.storage[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: i32) -> &mut [T] {
        let start = self.offset(0, y);
        let width = self.width as usize;
        &mut self.storage[start..start + width]
    }

    /// Rows paired with their `y`, for filling in parallel.
    pub fn par_rows_mut(&mut self) -> impl ParallelIterator<Item = (i32, &mut [T])>
    where
        T: Send,
    {
        let width = self.width as usize;
        let rows = self.height as usize;
        let stride = (self.stride as usize).max(1);
        self.storage
            .par_chunks_mut(stride)
            .take(rows)
            .enumerate()
            .map(move |(y, row)| (y as i32, &mut row[..width]))
    }

    /// Overwrites every cell of `rect` that lies inside the grid.
    pub fn fill(&mut self, rect: Rect, value: T) {
        let rect = rect.intersect(&self.bounds());
        let (x0, x1) = (rect.x as usize, rect.right() as usize);
        for y in rect.y..rect.bottom() {
            self.row_mut(y)[x0..x1].fill(value);
        }
    }

    /// Shifts the contents by `(dx, dy)`; positive values move them right and
    /// down.
    ///
    /// Cells moved past an edge are lost. Cells uncovered at the opposite edge
    /// keep their old values and must be overwritten by the caller.
    pub fn scroll(&mut self, dx: i32, dy: i32) {
        let copy_width = self.width - dx.abs();
        let copy_height = self.height - dy.abs();
        if (dx == 0 && dy == 0) || copy_width <= 0 || copy_height <= 0 {
            return;
        }

        let (x_src, x_dst) = if dx < 0 { (-dx, 0) } else { (0, dx) };
        let (y_src, y_dst) = if dy < 0 { (-dy, 0) } else { (0, dy) };
        let copy_width = copy_width as usize;
        let stride = self.stride as usize;
        let src = self.offset(x_src, y_src);
        let dst = self.offset(x_dst, y_dst);

        // `copy_within` picks the safe direction inside a row.
        let copy_row = |cells: &mut [T], row: usize| {
            let (src, dst) = (src + row * stride, dst + row * stride);
            cells.copy_within(src..src + copy_width, dst);
        };

        // Moving up reads rows below the destination, so go top-down; moving
        // down (or sideways) goes bottom-up.
        let rows = copy_height as usize;
        if dy < 0 {
            for row in 0..rows {
                copy_row(&mut self.storage, row);
            }
        } else {
            for row in (0..rows).rev() {
                copy_row(&mut self.storage, row);
            }
        }
    }
}

impl<'a, T: Copy + Default> Grid<'a, T> {
    pub fn clear(&mut self) {
        self.fill(self.bounds(), T::default());
    }
}

impl<'a, T: Copy> Index<Position> for Grid<'a, T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        debug_assert!(self.bounds().contains(pos), "{:?} outside grid", pos);
        &self.storage[self.offset(pos.x, pos.y)]
    }
}

impl<'a, T: Copy> IndexMut<Position> for Grid<'a, T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        debug_assert!(self.bounds().contains(pos), "{:?} outside grid", pos);
        let offset = self.offset(pos.x, pos.y);
        &mut self.storage[offset]
    }
}
