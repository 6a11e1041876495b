#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative map state for the overland movement engine.
//!
//! The world owns the baked tile data and the occupancy registry. Map content
//! is baked once through [`World::bake`]; afterwards the tiles are read-only
//! and only agent placement changes through [`apply`].

mod baked;
mod catalog;
mod content;
mod occupancy;

use std::collections::BTreeMap;

use overland_core::{
    AgentId, Command, Event, GridCoord, PlacementError, Readiness, TileDataProvider,
};

pub use baked::BakedTileMap;
pub use catalog::{terrain_by_name, TerrainCatalog, TerrainOverride};
pub use content::{ContentError, MapContent, DEFAULT_LEGEND, ROAD_GLYPH};
pub use occupancy::{OccupancyOverlay, OccupancyRegistry};

/// Represents the authoritative overland map state.
#[derive(Debug, Default)]
pub struct World {
    tiles: BakedTileMap,
    occupancy: OccupancyRegistry,
    agents: BTreeMap<AgentId, GridCoord>,
}

impl World {
    /// Creates a world whose map has not been baked yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bakes the map once content becomes available.
    ///
    /// The first successful bake sizes the occupancy registry to the map and
    /// emits [`Event::MapBaked`]; later calls are no-ops.
    pub fn bake(&mut self, content: Option<&MapContent>, out_events: &mut Vec<Event>) -> Readiness {
        let was_ready = self.tiles.readiness() == Readiness::Ready;
        let readiness = self.tiles.try_bake(content, out_events);
        if !was_ready && readiness == Readiness::Ready {
            self.occupancy = OccupancyRegistry::new(self.tiles.bounds());
            self.agents.clear();
        }
        readiness
    }

    fn reject(&self, agent: AgentId, cell: Option<GridCoord>, reason: PlacementError) -> Event {
        tracing::debug!(agent = agent.get(), ?cell, ?reason, "occupancy command rejected");
        Event::PlacementRejected {
            agent,
            cell,
            reason,
        }
    }

    fn validate_target(&self, agent: AgentId, cell: GridCoord) -> Result<(), Event> {
        if !self.tiles.is_ready() {
            return Err(self.reject(agent, Some(cell), PlacementError::MapNotReady));
        }
        if !self.tiles.bounds().contains(cell) {
            return Err(self.reject(agent, Some(cell), PlacementError::OutOfBounds));
        }
        if !self.occupancy.can_enter(cell) {
            return Err(self.reject(agent, Some(cell), PlacementError::Occupied));
        }
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceAgent { agent, cell } => {
            if world.agents.contains_key(&agent) {
                out_events.push(world.reject(agent, Some(cell), PlacementError::DuplicateAgent));
                return;
            }
            if let Err(rejection) = world.validate_target(agent, cell) {
                out_events.push(rejection);
                return;
            }
            world.occupancy.occupy(agent, cell);
            let _ = world.agents.insert(agent, cell);
            out_events.push(Event::AgentPlaced { agent, cell });
        }
        Command::RelocateAgent { agent, to } => {
            let Some(from) = world.agents.get(&agent).copied() else {
                out_events.push(world.reject(agent, Some(to), PlacementError::MissingAgent));
                return;
            };
            if from == to {
                return;
            }
            if let Err(rejection) = world.validate_target(agent, to) {
                out_events.push(rejection);
                return;
            }
            world.occupancy.relocate(agent, from, to);
            let _ = world.agents.insert(agent, to);
            out_events.push(Event::AgentRelocated { agent, from, to });
        }
        Command::RemoveAgent { agent } => {
            let Some(cell) = world.agents.remove(&agent) else {
                out_events.push(world.reject(agent, None, PlacementError::MissingAgent));
                return;
            };
            world.occupancy.vacate(cell);
            out_events.push(Event::AgentRemoved { agent, cell });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use overland_core::{AgentId, GridCoord};

    use super::{BakedTileMap, OccupancyOverlay, OccupancyRegistry, World};

    /// Provides read-only access to the baked tile data.
    #[must_use]
    pub fn tiles(world: &World) -> &BakedTileMap {
        &world.tiles
    }

    /// Provides read-only access to the occupancy registry.
    #[must_use]
    pub fn occupancy(world: &World) -> &OccupancyRegistry {
        &world.occupancy
    }

    /// Tile view in which every occupied cell is impassable.
    #[must_use]
    pub fn overlay(world: &World) -> OccupancyOverlay<&BakedTileMap, &OccupancyRegistry> {
        OccupancyOverlay::new(&world.tiles, &world.occupancy)
    }

    /// Tile view in which cells occupied by anyone but `agent` are impassable.
    #[must_use]
    pub fn overlay_excluding(
        world: &World,
        agent: AgentId,
    ) -> OccupancyOverlay<&BakedTileMap, &OccupancyRegistry> {
        OccupancyOverlay::excluding(&world.tiles, &world.occupancy, agent)
    }

    /// Cell occupied by the provided agent, if it is registered.
    #[must_use]
    pub fn agent_cell(world: &World, agent: AgentId) -> Option<GridCoord> {
        world.agents.get(&agent).copied()
    }

    /// Registered agents ordered by identifier.
    #[must_use]
    pub fn agents(world: &World) -> Vec<(AgentId, GridCoord)> {
        world
            .agents
            .iter()
            .map(|(agent, cell)| (*agent, *cell))
            .collect()
    }
}
