//! Integer grid primitives shared by every overland crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::EnterMask8;

/// Location of a single grid cell expressed as signed column and row values.
///
/// Coordinates are plain values: they may lie outside any map, and callers
/// resolve them against a [`GridBounds`] before indexing dense storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i32,
    y: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row component of the coordinate. Rows grow southward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Returns the adjacent coordinate in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction8) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Largest per-axis distance between two coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Squared Euclidean distance between two coordinates.
    #[must_use]
    pub fn distance_squared(self, other: GridCoord) -> u64 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        dx * dx + dy * dy
    }
}

/// Errors raised while constructing grid primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// A width or height below zero was supplied.
    #[error("grid dimensions must be non-negative, got {width}x{height}")]
    NegativeDimension {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
}

/// Rectangular extent of a grid anchored at `(0, 0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    width: i32,
    height: i32,
}

impl GridBounds {
    /// Bounds that contain no cells. Providers report this until they are ready.
    pub const EMPTY: GridBounds = GridBounds {
        width: 0,
        height: 0,
    };

    /// Creates bounds with the provided dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NegativeDimension`] when either dimension is negative.
    pub const fn new(width: i32, height: i32) -> Result<Self, GridError> {
        if width < 0 || height < 0 {
            return Err(GridError::NegativeDimension { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn area(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.saturating_mul(height)
    }

    /// Reports whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Reports whether the coordinate lies inside the bounds.
    #[must_use]
    pub const fn contains(&self, coord: GridCoord) -> bool {
        coord.x() >= 0 && coord.y() >= 0 && coord.x() < self.width && coord.y() < self.height
    }

    /// Clamps each axis independently into `[0, dimension - 1]`.
    ///
    /// Empty bounds clamp every coordinate to the origin.
    #[must_use]
    pub fn clamp(&self, coord: GridCoord) -> GridCoord {
        if self.is_empty() {
            return GridCoord::new(0, 0);
        }
        GridCoord::new(
            coord.x().clamp(0, self.width - 1),
            coord.y().clamp(0, self.height - 1),
        )
    }

    /// Row-major index of the coordinate, if it lies inside the bounds.
    #[must_use]
    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(coord.x()).ok()?;
        let row = usize::try_from(coord.y()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Coordinate stored at the provided row-major index.
    #[must_use]
    pub fn coord_at(&self, index: usize) -> Option<GridCoord> {
        if index >= self.area() {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let x = i32::try_from(index % width).ok()?;
        let y = i32::try_from(index / width).ok()?;
        Some(GridCoord::new(x, y))
    }

    /// Iterates every coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = GridCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| GridCoord::new(x, y)))
    }
}

/// Compass directions between 8-adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction8 {
    /// Toward decreasing rows.
    North,
    /// Toward decreasing rows and increasing columns.
    NorthEast,
    /// Toward increasing columns.
    East,
    /// Toward increasing rows and increasing columns.
    SouthEast,
    /// Toward increasing rows.
    South,
    /// Toward increasing rows and decreasing columns.
    SouthWest,
    /// Toward decreasing columns.
    West,
    /// Toward decreasing rows and decreasing columns.
    NorthWest,
}

impl Direction8 {
    /// Every direction, cardinals first.
    ///
    /// This order is the pathfinder's neighbor expansion order and must stay
    /// stable for path selection to remain deterministic.
    pub const ALL: [Direction8; 8] = [
        Direction8::North,
        Direction8::East,
        Direction8::South,
        Direction8::West,
        Direction8::NorthEast,
        Direction8::SouthEast,
        Direction8::SouthWest,
        Direction8::NorthWest,
    ];

    /// Column and row delta of a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Reports whether the direction moves along both axes.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }

    /// The two orthogonal neighbors of `from` that a diagonal step passes
    /// between, or `None` for cardinal directions.
    #[must_use]
    pub const fn corners(self, from: GridCoord) -> Option<[GridCoord; 2]> {
        if !self.is_diagonal() {
            return None;
        }
        let (dx, dy) = self.delta();
        Some([from.offset(dx, 0), from.offset(0, dy)])
    }

    /// Entry mask bit matching the direction.
    #[must_use]
    pub const fn mask(self) -> EnterMask8 {
        match self {
            Self::North => EnterMask8::N,
            Self::NorthEast => EnterMask8::NE,
            Self::East => EnterMask8::E,
            Self::SouthEast => EnterMask8::SE,
            Self::South => EnterMask8::S,
            Self::SouthWest => EnterMask8::SW,
            Self::West => EnterMask8::W,
            Self::NorthWest => EnterMask8::NW,
        }
    }

    /// Direction of travel from `from` into an 8-adjacent `to`.
    #[must_use]
    pub fn between(from: GridCoord, to: GridCoord) -> Option<Direction8> {
        let dx = to.x().checked_sub(from.x())?;
        let dy = to.y().checked_sub(from.y())?;
        Self::ALL
            .into_iter()
            .find(|direction| direction.delta() == (dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_steps_name_their_corner_cells() {
        let from = GridCoord::new(2, 2);
        assert_eq!(
            Direction8::NorthEast.corners(from),
            Some([GridCoord::new(3, 2), GridCoord::new(2, 1)])
        );
        assert_eq!(
            Direction8::SouthWest.corners(from),
            Some([GridCoord::new(1, 2), GridCoord::new(2, 3)])
        );
        assert_eq!(Direction8::West.corners(from), None);
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        assert_eq!(
            GridBounds::new(-1, 4),
            Err(GridError::NegativeDimension {
                width: -1,
                height: 4
            })
        );
        assert!(GridBounds::new(0, 0).expect("zero is valid").is_empty());
    }

    #[test]
    fn clamp_limits_each_axis_independently() {
        let bounds = GridBounds::new(5, 3).expect("bounds");
        assert_eq!(bounds.clamp(GridCoord::new(-4, 1)), GridCoord::new(0, 1));
        assert_eq!(bounds.clamp(GridCoord::new(9, 9)), GridCoord::new(4, 2));
        assert_eq!(bounds.clamp(GridCoord::new(2, 2)), GridCoord::new(2, 2));
        assert_eq!(GridBounds::EMPTY.clamp(GridCoord::new(7, 7)), GridCoord::new(0, 0));
    }

    #[test]
    fn index_and_coord_are_inverse() {
        let bounds = GridBounds::new(4, 3).expect("bounds");
        assert_eq!(bounds.area(), 12);
        for (index, coord) in bounds.iter().enumerate() {
            assert_eq!(bounds.index_of(coord), Some(index));
            assert_eq!(bounds.coord_at(index), Some(coord));
        }
        assert_eq!(bounds.index_of(GridCoord::new(4, 0)), None);
        assert_eq!(bounds.coord_at(12), None);
    }

    #[test]
    fn direction_between_adjacent_cells() {
        let origin = GridCoord::new(3, 3);
        assert_eq!(
            Direction8::between(origin, GridCoord::new(3, 2)),
            Some(Direction8::North)
        );
        assert_eq!(
            Direction8::between(origin, GridCoord::new(2, 4)),
            Some(Direction8::SouthWest)
        );
        assert_eq!(Direction8::between(origin, origin), None);
        assert_eq!(Direction8::between(origin, GridCoord::new(5, 3)), None);
    }

    #[test]
    fn distances_match_expectation() {
        let a = GridCoord::new(1, 1);
        let b = GridCoord::new(4, 3);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert_eq!(a.distance_squared(b), 13);
    }
}
