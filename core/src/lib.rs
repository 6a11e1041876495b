#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the overland movement engine.
//!
//! This crate defines the grid primitives, the static tile description and the
//! message surface that connects adapters, the authoritative world, and pure
//! systems. Adapters submit [`Command`] values describing occupancy mutations,
//! the world executes them via its `apply` entry point and broadcasts
//! [`Event`] values. Systems read the world through the [`TileDataProvider`]
//! and [`OccupancyQuery`] contracts and report their own observable changes
//! with further events.

mod grid;
mod tile;

use serde::{Deserialize, Serialize};

pub use grid::{Direction8, GridBounds, GridCoord, GridError};
pub use tile::{EnterMask8, TerrainKind, TileData, TileFlags};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Registers an agent on the map at the provided cell.
    PlaceAgent {
        /// Identifier of the agent being placed.
        agent: AgentId,
        /// Cell the agent should occupy.
        cell: GridCoord,
    },
    /// Moves a registered agent to a new cell.
    RelocateAgent {
        /// Identifier of the agent being moved.
        agent: AgentId,
        /// Cell the agent occupies after the move.
        to: GridCoord,
    },
    /// Removes a registered agent from the map.
    RemoveAgent {
        /// Identifier of the agent being removed.
        agent: AgentId,
    },
}

/// Events broadcast by the world and systems after processing work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The tile provider finished baking and became ready. Emitted once per map.
    MapBaked {
        /// Bounds of the baked map.
        bounds: GridBounds,
    },
    /// Confirms that an agent was registered on the map.
    AgentPlaced {
        /// Identifier of the placed agent.
        agent: AgentId,
        /// Cell the agent occupies.
        cell: GridCoord,
    },
    /// Confirms that an agent changed cells in the occupancy registry.
    AgentRelocated {
        /// Identifier of the moved agent.
        agent: AgentId,
        /// Cell the agent occupied before the move.
        from: GridCoord,
        /// Cell the agent occupies after the move.
        to: GridCoord,
    },
    /// Confirms that an agent left the map.
    AgentRemoved {
        /// Identifier of the removed agent.
        agent: AgentId,
        /// Cell the agent occupied.
        cell: GridCoord,
    },
    /// Reports that a placement or relocation request was rejected.
    PlacementRejected {
        /// Identifier of the agent named by the request.
        agent: AgentId,
        /// Cell named by the request, if any.
        cell: Option<GridCoord>,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// A path-execution agent committed a single step.
    AgentStepped {
        /// Identifier of the moving agent.
        agent: AgentId,
        /// Cell the agent left.
        from: GridCoord,
        /// Cell the agent entered.
        to: GridCoord,
        /// Movement points spent on the step.
        cost: u32,
    },
    /// A fog-of-war cell changed state.
    FogStateChanged {
        /// Cell whose state changed.
        cell: GridCoord,
        /// State before the change.
        from: FogOfWarState,
        /// State after the change.
        to: FogOfWarState,
    },
    /// The fog-of-war engine (re)allocated its state array, discarding prior visibility.
    FogReset {
        /// Bounds the engine is now bound to.
        bounds: GridBounds,
    },
}

/// Unique identifier assigned to an agent moving on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Readiness of a tile data provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Readiness {
    /// Map content has not been baked yet; bounds are empty.
    NotReady,
    /// The provider is baked and read-only for the rest of the map's lifetime.
    Ready,
}

/// Per-cell visibility classification, ordered by information content.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum FogOfWarState {
    /// Never seen.
    #[default]
    Unknown = 0,
    /// Seen before but not currently in sight.
    Explored = 1,
    /// Currently in sight.
    Visible = 2,
}

impl FogOfWarState {
    /// Byte encoding used by fog snapshots.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a snapshot byte, treating unknown values as [`FogOfWarState::Unknown`].
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Explored,
            2 => Self::Visible,
            _ => Self::Unknown,
        }
    }
}

/// Policy for diagonal steps that pass between two orthogonal neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerCutting {
    /// Diagonal steps only require the destination to be enterable.
    Allow,
    /// Diagonal steps also require both orthogonal corner cells to be passable.
    #[default]
    Disallow,
}

/// Reasons a path-execution agent stopped advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopReason {
    /// The agent had no pending path.
    NoPath,
    /// The last step of the path was committed.
    ReachedGoal,
    /// The next step costs more movement points than remain.
    InsufficientMovePoints,
    /// The next tile is missing, impassable, or refuses entry from this direction.
    BlockedByTerrain,
    /// Another agent currently occupies the next tile.
    BlockedByOccupant,
}

/// Reasons an occupancy command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The tile provider has not been baked yet.
    MapNotReady,
    /// The requested cell lies outside the map.
    OutOfBounds,
    /// Another agent already occupies the requested cell.
    Occupied,
    /// The agent is already registered.
    DuplicateAgent,
    /// No agent with the provided identifier is registered.
    MissingAgent,
}

/// Read-only source of baked tile data.
pub trait TileDataProvider {
    /// Bounds of the provider. Empty until the provider is ready.
    fn bounds(&self) -> GridBounds;

    /// Tile data for the coordinate, or `None` when it lies outside the map.
    fn tile(&self, coord: GridCoord) -> Option<TileData>;

    /// Reports whether the provider has been baked.
    fn is_ready(&self) -> bool {
        !self.bounds().is_empty()
    }
}

impl<T: TileDataProvider + ?Sized> TileDataProvider for &T {
    fn bounds(&self) -> GridBounds {
        (**self).bounds()
    }

    fn tile(&self, coord: GridCoord) -> Option<TileData> {
        (**self).tile(coord)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Dynamic occupancy of map cells by agents.
pub trait OccupancyQuery {
    /// Agent occupying the cell, if any.
    fn occupant(&self, coord: GridCoord) -> Option<AgentId>;

    /// Reports whether any agent occupies the cell.
    fn is_occupied(&self, coord: GridCoord) -> bool {
        self.occupant(coord).is_some()
    }

    /// Reports whether an agent other than `agent` occupies the cell.
    fn is_occupied_by_other(&self, coord: GridCoord, agent: AgentId) -> bool {
        self.occupant(coord)
            .is_some_and(|occupant| occupant != agent)
    }
}

impl<T: OccupancyQuery + ?Sized> OccupancyQuery for &T {
    fn occupant(&self, coord: GridCoord) -> Option<AgentId> {
        (**self).occupant(coord)
    }
}

/// Occupancy query that never reports an occupant.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOccupancy;

impl OccupancyQuery for NoOccupancy {
    fn occupant(&self, _coord: GridCoord) -> Option<AgentId> {
        None
    }
}
