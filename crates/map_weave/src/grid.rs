//! Grid-view abstraction and the canonical array-backed grid.
//!
//! Generation steps depend only on [`GridView`] / [`GridViewMut`], so callers
//! can register their own grid implementations (e.g. a view directly over a
//! game map) in the component store. [`Grid`] is the default row-major
//! implementation created on demand when no grid was supplied.
use glam::IVec2;

use crate::context::store::ViewCaster;

/// Read-only view over a 2D grid of copyable cells.
pub trait GridView<T: Copy> {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Value at `pos`. Callers must check bounds first; implementations may
    /// panic on out-of-bounds access.
    fn get(&self, pos: IVec2) -> T;

    fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width() && (pos.y as u32) < self.height()
    }

    fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All positions, row by row.
    fn positions(&self) -> GridPositions {
        GridPositions {
            width: self.width(),
            height: self.height(),
            next: 0,
        }
    }
}

/// Mutable extension of [`GridView`].
pub trait GridViewMut<T: Copy>: GridView<T> {
    /// Set the value at `pos`. Callers must check bounds first.
    fn set(&mut self, pos: IVec2, value: T);

    fn fill(&mut self, value: T) {
        for pos in self.positions() {
            self.set(pos, value);
        }
    }
}

/// Iterator over every position of a grid, row by row.
pub struct GridPositions {
    width: u32,
    height: u32,
    next: usize,
}

impl Iterator for GridPositions {
    type Item = IVec2;

    fn next(&mut self) -> Option<IVec2> {
        if self.width == 0 || self.next >= (self.width as usize * self.height as usize) {
            return None;
        }
        let idx = self.next;
        self.next += 1;
        Some(IVec2::new(
            (idx % self.width as usize) as i32,
            (idx / self.width as usize) as i32,
        ))
    }
}

/// Row-major `Vec`-backed grid, the canonical [`GridViewMut`] implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Copy of an existing view, used to snapshot a grid before a pass that
    /// must read consistent prior state.
    pub fn from_view<V: GridView<T> + ?Sized>(view: &V) -> Self {
        let mut grid = Self::new(view.width(), view.height());
        for pos in view.positions() {
            grid.set(pos, view.get(pos));
        }
        grid
    }
}

impl<T: Copy> Grid<T> {
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }

    fn index(&self, pos: IVec2) -> usize {
        debug_assert!(
            self.contains(pos),
            "position {pos} out of bounds for {}x{} grid",
            self.width,
            self.height
        );
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Number of cells equal to `value`.
    pub fn count(&self, value: T) -> usize
    where
        T: PartialEq,
    {
        self.cells.iter().filter(|c| **c == value).count()
    }
}

impl<T: Copy> GridView<T> for Grid<T> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get(&self, pos: IVec2) -> T {
        self.cells[self.index(pos)]
    }
}

impl<T: Copy> GridViewMut<T> for Grid<T> {
    fn set(&mut self, pos: IVec2, value: T) {
        let idx = self.index(pos);
        self.cells[idx] = value;
    }
}

fn cast_ref<T: Copy + 'static>(grid: &Grid<T>) -> &(dyn GridViewMut<T> + 'static) {
    grid
}

fn cast_mut<T: Copy + 'static>(grid: &mut Grid<T>) -> &mut (dyn GridViewMut<T> + 'static) {
    grid
}

/// Caster registering a concrete [`Grid`] as retrievable by its
/// `dyn GridViewMut` view in the component store.
pub fn grid_caster<T: Copy + 'static>() -> ViewCaster<dyn GridViewMut<T>> {
    ViewCaster::of(cast_ref::<T>, cast_mut::<T>)
}
