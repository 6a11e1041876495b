#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fog-of-war engine tracking which cells are unknown, explored, or visible.
//!
//! The engine binds lazily to a tile provider: its per-cell state array is
//! allocated the first time a ready provider is observed and reallocated when
//! the provider's bounds change size. Operations issued before that are
//! ignored and can be retried later.

mod snapshot;

use std::collections::VecDeque;

use overland_core::{Direction8, Event, FogOfWarState, GridBounds, GridCoord, TileDataProvider};

pub use snapshot::{FogSnapshot, SnapshotError, SNAPSHOT_HEADER};

/// Per-cell visibility memory for a single observer.
#[derive(Debug, Default)]
pub struct FogOfWar {
    bounds: GridBounds,
    states: Vec<FogOfWarState>,
    stamps: Vec<u32>,
    generation: u32,
    frontier: VecDeque<GridCoord>,
}

impl FogOfWar {
    /// Creates an engine that is not bound to any map yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds of the map the engine is bound to. Empty until initialized.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Reports whether the state array has been allocated.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.bounds.is_empty()
    }

    /// Binds the engine to the provider's current bounds.
    ///
    /// The state array is allocated on the first ready provider and
    /// reallocated, discarding all visibility, when the bounds change size.
    /// Rebinding to bounds of the same size keeps the current state. Returns
    /// whether the engine is usable afterwards.
    pub fn sync_bounds<P>(&mut self, tiles: &P, out: &mut Vec<Event>) -> bool
    where
        P: TileDataProvider + ?Sized,
    {
        if !tiles.is_ready() {
            return self.is_initialized();
        }

        let bounds = tiles.bounds();
        if bounds == self.bounds {
            return true;
        }

        self.bounds = bounds;
        self.states = vec![FogOfWarState::Unknown; bounds.area()];
        self.stamps = vec![0; bounds.area()];
        self.generation = 0;
        tracing::debug!(
            width = bounds.width(),
            height = bounds.height(),
            "fog of war bound to map"
        );
        out.push(Event::FogReset { bounds });
        true
    }

    /// Reveals every cell within a circular `radius` of `center` that has an
    /// unobstructed line of sight to it.
    ///
    /// `center` is clamped into the map. The flood expands over the
    /// eight-neighborhood; a vision-blocking cell is revealed itself but the
    /// flood does not continue through it. The viewer's own cell never stops
    /// the flood.
    pub fn reveal_area<P>(&mut self, tiles: &P, center: GridCoord, radius: u32, out: &mut Vec<Event>)
    where
        P: TileDataProvider + ?Sized,
    {
        if !self.sync_bounds(tiles, out) {
            tracing::trace!(?center, "fog reveal ignored before map is ready");
            return;
        }

        let center = self.bounds.clamp(center);
        let radius_squared = u64::from(radius) * u64::from(radius);
        let generation = self.next_generation();

        self.frontier.clear();
        let _ = self.mark_seen(center, generation);
        self.frontier.push_back(center);

        while let Some(cell) = self.frontier.pop_front() {
            if cell.distance_squared(center) > radius_squared
                || !has_line_of_sight(tiles, center, cell)
            {
                continue;
            }

            self.set_state(cell, FogOfWarState::Visible, out);
            let blocks = tiles.tile(cell).map_or(true, |tile| tile.blocks_vision());
            if blocks && cell != center {
                continue;
            }

            for direction in Direction8::ALL {
                let next = cell.step(direction);
                if self.mark_seen(next, generation) {
                    self.frontier.push_back(next);
                }
            }
        }
    }

    /// Marks the listed cells visible regardless of distance or line of sight.
    ///
    /// Coordinates outside the map are clamped to its edge.
    pub fn reveal_cells<P, I>(&mut self, tiles: &P, cells: I, out: &mut Vec<Event>)
    where
        P: TileDataProvider + ?Sized,
        I: IntoIterator<Item = GridCoord>,
    {
        if !self.sync_bounds(tiles, out) {
            return;
        }

        for cell in cells {
            let cell = self.bounds.clamp(cell);
            self.set_state(cell, FogOfWarState::Visible, out);
        }
    }

    /// Downgrades every visible cell to explored.
    pub fn clear_transient_visibility<P>(&mut self, tiles: &P, out: &mut Vec<Event>)
    where
        P: TileDataProvider + ?Sized,
    {
        if !self.sync_bounds(tiles, out) {
            return;
        }

        for (index, state) in self.states.iter_mut().enumerate() {
            if *state != FogOfWarState::Visible {
                continue;
            }
            *state = FogOfWarState::Explored;
            if let Some(cell) = self.bounds.coord_at(index) {
                out.push(Event::FogStateChanged {
                    cell,
                    from: FogOfWarState::Visible,
                    to: FogOfWarState::Explored,
                });
            }
        }
    }

    /// State of the cell, or [`FogOfWarState::Unknown`] outside the map and
    /// before initialization.
    #[must_use]
    pub fn state(&self, cell: GridCoord) -> FogOfWarState {
        self.bounds
            .index_of(cell)
            .and_then(|index| self.states.get(index).copied())
            .unwrap_or_default()
    }

    /// Reports whether the cell is currently in sight.
    #[must_use]
    pub fn is_visible(&self, cell: GridCoord) -> bool {
        self.state(cell) == FogOfWarState::Visible
    }

    /// Reports whether the cell has ever been seen.
    #[must_use]
    pub fn is_explored(&self, cell: GridCoord) -> bool {
        self.state(cell) != FogOfWarState::Unknown
    }

    fn set_state(&mut self, cell: GridCoord, state: FogOfWarState, out: &mut Vec<Event>) {
        let Some(slot) = self
            .bounds
            .index_of(cell)
            .and_then(|index| self.states.get_mut(index))
        else {
            return;
        };
        if *slot == state {
            return;
        }
        let from = std::mem::replace(slot, state);
        out.push(Event::FogStateChanged {
            cell,
            from,
            to: state,
        });
    }

    fn next_generation(&mut self) -> u32 {
        if self.generation == u32::MAX {
            self.stamps.fill(0);
            self.generation = 0;
        }
        self.generation += 1;
        self.generation
    }

    /// Stamps the cell for the current flood; returns `false` when it lies
    /// outside the map or was already stamped.
    fn mark_seen(&mut self, cell: GridCoord, generation: u32) -> bool {
        let Some(stamp) = self
            .bounds
            .index_of(cell)
            .and_then(|index| self.stamps.get_mut(index))
        else {
            return false;
        };
        if *stamp == generation {
            return false;
        }
        *stamp = generation;
        true
    }
}

/// Walks a Bresenham line from `from` to `to` and reports whether no cell
/// strictly between them blocks vision.
#[must_use]
pub fn has_line_of_sight<P>(tiles: &P, from: GridCoord, to: GridCoord) -> bool
where
    P: TileDataProvider + ?Sized,
{
    let (mut x, mut y) = (from.x(), from.y());
    let (x1, y1) = (to.x(), to.y());
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x == x1 && y == y1 {
            return true;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        if x == x1 && y == y1 {
            return true;
        }
        let blocked = tiles
            .tile(GridCoord::new(x, y))
            .map_or(true, |tile| tile.blocks_vision());
        if blocked {
            return false;
        }
    }
}
