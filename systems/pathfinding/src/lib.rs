#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* pathfinder over baked tile data.
//!
//! Edge costs belong to the destination tile and differ for orthogonal and
//! diagonal entry. A step is legal only when the destination is passable,
//! accepts the direction of travel, and (unless corner cutting is allowed)
//! both orthogonal corner cells are passable as well. Neighbors are expanded
//! in [`Direction8::ALL`] order and the open set breaks ties by heuristic and
//! then insertion order, so identical inputs always yield identical paths.

use std::{cmp::Reverse, collections::BinaryHeap};

use overland_core::{Direction8, EnterMask8, GridBounds, GridCoord, TileDataProvider};

pub use overland_core::CornerCutting;

/// Configuration parameters required to construct the pathfinder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathfinderConfig {
    /// Corner-cutting policy applied to diagonal steps.
    pub corner_cutting: CornerCutting,
}

impl PathfinderConfig {
    /// Creates a configuration using the provided corner-cutting policy.
    #[must_use]
    pub const fn new(corner_cutting: CornerCutting) -> Self {
        Self { corner_cutting }
    }
}

/// Counters describing the most recent search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of nodes expanded.
    pub expanded: u32,
    /// Number of entries pushed onto the open set.
    pub pushed: u32,
}

/// A* pathfinder that reuses its scratch buffers between searches.
#[derive(Debug, Default)]
pub struct Pathfinder {
    config: PathfinderConfig,
    scratch: SearchScratch,
    last_search: SearchStats,
}

impl Pathfinder {
    /// Creates a new pathfinder using the supplied configuration.
    #[must_use]
    pub fn new(config: PathfinderConfig) -> Self {
        Self {
            config,
            scratch: SearchScratch::default(),
            last_search: SearchStats::default(),
        }
    }

    /// Configuration the pathfinder was created with.
    #[must_use]
    pub const fn config(&self) -> PathfinderConfig {
        self.config
    }

    /// Counters recorded by the most recent call to [`Pathfinder::find_path`].
    #[must_use]
    pub const fn last_search(&self) -> SearchStats {
        self.last_search
    }

    /// Finds a minimum-cost path from `start` to `goal`.
    ///
    /// The returned sequence begins with `start` and ends with `goal`. It is
    /// empty when no admissible route exists, when either endpoint is outside
    /// the map or impassable, or when the provider is not ready. A search whose
    /// endpoints coincide returns `[start]`. `allowed` restricts the directions
    /// of travel the search may use.
    pub fn find_path<P>(
        &mut self,
        tiles: &P,
        start: GridCoord,
        goal: GridCoord,
        allowed: EnterMask8,
    ) -> Vec<GridCoord>
    where
        P: TileDataProvider + ?Sized,
    {
        self.last_search = SearchStats::default();

        if !tiles.is_ready() {
            return Vec::new();
        }
        let (Some(start_tile), Some(goal_tile)) = (tiles.tile(start), tiles.tile(goal)) else {
            return Vec::new();
        };
        if start == goal {
            return vec![start];
        }
        if !start_tile.is_passable() || !goal_tile.is_passable() {
            return Vec::new();
        }

        let bounds = tiles.bounds();
        let (Some(start_index), Some(goal_index)) = (bounds.index_of(start), bounds.index_of(goal))
        else {
            return Vec::new();
        };

        let heuristic = Heuristic::for_provider(tiles, goal, allowed);
        self.scratch.prepare(bounds);
        self.scratch.open_node(start_index, None, 0, heuristic.estimate(start));
        self.last_search.pushed += 1;

        while let Some(Reverse(entry)) = self.scratch.open.pop() {
            if entry.g > self.scratch.g[entry.index] {
                continue;
            }
            if entry.index == goal_index {
                let path = self.scratch.reconstruct(bounds, goal_index);
                tracing::debug!(
                    ?start,
                    ?goal,
                    steps = path.len().saturating_sub(1),
                    cost = entry.g,
                    expanded = self.last_search.expanded,
                    "path found"
                );
                return path;
            }

            self.last_search.expanded += 1;
            let Some(cell) = bounds.coord_at(entry.index) else {
                continue;
            };

            for direction in Direction8::ALL {
                if !allowed.contains(direction.mask()) {
                    continue;
                }
                let Some(cost) = step_cost(tiles, cell, direction, self.config.corner_cutting)
                else {
                    continue;
                };
                let next = cell.step(direction);
                let Some(next_index) = bounds.index_of(next) else {
                    continue;
                };

                let tentative = entry.g.saturating_add(cost);
                if tentative < self.scratch.g[next_index] {
                    self.scratch.open_node(
                        next_index,
                        Some(entry.index),
                        tentative,
                        heuristic.estimate(next),
                    );
                    self.last_search.pushed += 1;
                }
            }
        }

        tracing::debug!(
            ?start,
            ?goal,
            expanded = self.last_search.expanded,
            "no path"
        );
        Vec::new()
    }
}

/// Movement cost of stepping from `from` in `direction`, or `None` when the
/// step is illegal.
#[must_use]
pub fn step_cost<P>(
    tiles: &P,
    from: GridCoord,
    direction: Direction8,
    corner_cutting: CornerCutting,
) -> Option<u32>
where
    P: TileDataProvider + ?Sized,
{
    let tile = tiles.tile(from.step(direction))?;
    if !tile.is_passable() || !tile.accepts_entry(direction) {
        return None;
    }

    if corner_cutting == CornerCutting::Disallow {
        if let Some(corners) = direction.corners(from) {
            let passable =
                |cell: GridCoord| tiles.tile(cell).is_some_and(|tile| tile.is_passable());
            if !corners.into_iter().all(passable) {
                return None;
            }
        }
    }

    Some(tile.move_cost(direction.is_diagonal()))
}

/// Total movement cost of a path, charging each destination tile for the kind
/// of step that enters it.
///
/// Returns `None` when two consecutive cells are not adjacent or a cell lies
/// outside the map. Single-cell and empty paths cost nothing.
#[must_use]
pub fn path_cost<P>(tiles: &P, path: &[GridCoord]) -> Option<u32>
where
    P: TileDataProvider + ?Sized,
{
    path.windows(2).try_fold(0_u32, |total, pair| {
        let direction = Direction8::between(pair[0], pair[1])?;
        let tile = tiles.tile(pair[1])?;
        Some(total.saturating_add(tile.move_cost(direction.is_diagonal())))
    })
}

/// Octile distance scaled by the cheapest step costs present on the map.
///
/// A straight run may be walked as a diagonal zig-zag, so the per-cell charge
/// for the straight part is the cheaper of the two step kinds.
#[derive(Clone, Copy, Debug)]
struct Heuristic {
    goal: GridCoord,
    straight: u32,
    diagonal: u32,
}

impl Heuristic {
    fn for_provider<P>(tiles: &P, goal: GridCoord, allowed: EnterMask8) -> Self
    where
        P: TileDataProvider + ?Sized,
    {
        let diagonal_moves = allowed.intersects(EnterMask8::DIAGONAL);
        let mut cardinal = u32::MAX;
        let mut diagonal = u32::MAX;
        for cell in tiles.bounds().iter() {
            if let Some(tile) = tiles.tile(cell).filter(|tile| tile.is_passable()) {
                cardinal = cardinal.min(tile.cardinal_cost());
                diagonal = diagonal.min(tile.diagonal_cost());
            }
        }

        let mut straight = if diagonal_moves {
            cardinal.min(diagonal)
        } else {
            cardinal
        };
        if straight == u32::MAX {
            straight = 0;
        }

        let two_straight = straight.saturating_mul(2);
        let diagonal = if diagonal_moves {
            diagonal.min(two_straight)
        } else {
            two_straight
        };

        Self {
            goal,
            straight,
            diagonal,
        }
    }

    fn estimate(&self, cell: GridCoord) -> u32 {
        let dx = cell.x().abs_diff(self.goal.x());
        let dy = cell.y().abs_diff(self.goal.y());
        let (low, high) = if dx < dy { (dx, dy) } else { (dy, dx) };
        self.straight
            .saturating_mul(high - low)
            .saturating_add(self.diagonal.saturating_mul(low))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u32,
    h: u32,
    serial: u64,
    index: usize,
    g: u32,
}

#[derive(Debug, Default)]
struct SearchScratch {
    bounds: GridBounds,
    g: Vec<u32>,
    parent: Vec<Option<usize>>,
    touched: Vec<usize>,
    open: BinaryHeap<Reverse<OpenEntry>>,
    serial: u64,
}

impl SearchScratch {
    fn prepare(&mut self, bounds: GridBounds) {
        if self.bounds != bounds || self.g.len() != bounds.area() {
            self.bounds = bounds;
            self.g = vec![u32::MAX; bounds.area()];
            self.parent = vec![None; bounds.area()];
            self.touched.clear();
        } else {
            for &index in &self.touched {
                self.g[index] = u32::MAX;
                self.parent[index] = None;
            }
            self.touched.clear();
        }
        self.open.clear();
        self.serial = 0;
    }

    fn open_node(&mut self, index: usize, parent: Option<usize>, g: u32, h: u32) {
        if self.g[index] == u32::MAX {
            self.touched.push(index);
        }
        self.g[index] = g;
        self.parent[index] = parent;
        self.open.push(Reverse(OpenEntry {
            f: g.saturating_add(h),
            h,
            serial: self.serial,
            index,
            g,
        }));
        self.serial += 1;
    }

    fn reconstruct(&self, bounds: GridBounds, goal_index: usize) -> Vec<GridCoord> {
        let mut path = Vec::new();
        let mut cursor = Some(goal_index);
        while let Some(index) = cursor {
            if let Some(cell) = bounds.coord_at(index) {
                path.push(cell);
            }
            cursor = self.parent[index];
        }
        path.reverse();
        path
    }
}
