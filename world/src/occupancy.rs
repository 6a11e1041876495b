//! Dynamic occupancy registry and the read-through blocking overlay.

use overland_core::{AgentId, GridBounds, GridCoord, OccupancyQuery, TileData, TileDataProvider};

/// Dense grid recording which agent stands on each cell.
#[derive(Clone, Debug, Default)]
pub struct OccupancyRegistry {
    bounds: GridBounds,
    cells: Vec<Option<AgentId>>,
}

impl OccupancyRegistry {
    /// Creates an empty registry covering the provided bounds.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: vec![None; bounds.area()],
        }
    }

    /// Bounds covered by the registry.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Iterates occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, AgentId)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, slot)| {
            let agent = (*slot)?;
            Some((self.bounds.coord_at(index)?, agent))
        })
    }

    pub(crate) fn can_enter(&self, cell: GridCoord) -> bool {
        self.bounds
            .index_of(cell)
            .map_or(false, |index| self.cells[index].is_none())
    }

    pub(crate) fn occupy(&mut self, agent: AgentId, cell: GridCoord) {
        if let Some(index) = self.bounds.index_of(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(agent);
            }
        }
    }

    pub(crate) fn vacate(&mut self, cell: GridCoord) {
        if let Some(index) = self.bounds.index_of(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }

    pub(crate) fn relocate(&mut self, agent: AgentId, from: GridCoord, to: GridCoord) {
        self.vacate(from);
        self.occupy(agent, to);
    }
}

impl OccupancyQuery for OccupancyRegistry {
    fn occupant(&self, coord: GridCoord) -> Option<AgentId> {
        self.bounds
            .index_of(coord)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }
}

/// Tile provider that reports occupied cells as impassable.
///
/// The overlay owns no state: every lookup reads the base provider and the
/// occupancy query, so consumers that only read [`TileData`] treat agents and
/// terrain obstacles alike.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyOverlay<P, Q> {
    base: P,
    occupancy: Q,
    exclude: Option<AgentId>,
}

impl<P, Q> OccupancyOverlay<P, Q>
where
    P: TileDataProvider,
    Q: OccupancyQuery,
{
    /// Wraps a provider so every occupied cell blocks.
    #[must_use]
    pub fn new(base: P, occupancy: Q) -> Self {
        Self {
            base,
            occupancy,
            exclude: None,
        }
    }

    /// Wraps a provider so cells occupied by anyone except `agent` block.
    #[must_use]
    pub fn excluding(base: P, occupancy: Q, agent: AgentId) -> Self {
        Self {
            base,
            occupancy,
            exclude: Some(agent),
        }
    }

    fn is_blocked(&self, coord: GridCoord) -> bool {
        match self.exclude {
            Some(agent) => self.occupancy.is_occupied_by_other(coord, agent),
            None => self.occupancy.is_occupied(coord),
        }
    }
}

impl<P, Q> TileDataProvider for OccupancyOverlay<P, Q>
where
    P: TileDataProvider,
    Q: OccupancyQuery,
{
    fn bounds(&self) -> GridBounds {
        self.base.bounds()
    }

    fn tile(&self, coord: GridCoord) -> Option<TileData> {
        let tile = self.base.tile(coord)?;
        if self.is_blocked(coord) {
            Some(TileData::IMPASSABLE)
        } else {
            Some(tile)
        }
    }

    fn is_ready(&self) -> bool {
        self.base.is_ready()
    }
}
