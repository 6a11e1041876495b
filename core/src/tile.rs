//! Static per-cell tile data consumed by pathfinding, movement and vision.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Compass directions of travel through which a tile may be entered.
    ///
    /// A bit names the direction of the step itself: a tile carrying only
    /// [`EnterMask8::N`] and [`EnterMask8::S`] accepts vertical travel and
    /// rejects every horizontal or diagonal approach.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EnterMask8: u8 {
        /// Northward travel.
        const N  = 1 << 0;
        /// Southward travel.
        const S  = 1 << 1;
        /// Eastward travel.
        const E  = 1 << 2;
        /// Westward travel.
        const W  = 1 << 3;
        /// North-eastward travel.
        const NE = 1 << 4;
        /// North-westward travel.
        const NW = 1 << 5;
        /// South-eastward travel.
        const SE = 1 << 6;
        /// South-westward travel.
        const SW = 1 << 7;

        /// The four orthogonal directions.
        const CARDINAL = Self::N.bits() | Self::S.bits() | Self::E.bits() | Self::W.bits();
        /// The four diagonal directions.
        const DIAGONAL = Self::NE.bits() | Self::NW.bits() | Self::SE.bits() | Self::SW.bits();
    }
}

impl EnterMask8 {
    /// No entry permitted.
    pub const NONE: EnterMask8 = EnterMask8::empty();
    /// Omnidirectional entry.
    pub const ALL: EnterMask8 = EnterMask8::all();
}

bitflags! {
    /// Static properties of a tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TileFlags: u16 {
        /// Agents may stand on and travel through the tile.
        const PASSABLE      = 1 << 0;
        /// The tile occludes line of sight beyond itself.
        const BLOCKS_VISION = 1 << 1;
        /// Authoring marker for mountain terrain.
        const MOUNTAIN      = 1 << 2;
        /// Authoring marker for cliffs and ramps restricted by entry direction.
        const DIRECTIONAL   = 1 << 3;
        /// Authoring marker for water terrain.
        const WATER         = 1 << 4;
        /// Marks tiles substituted by the road layer during baking.
        const ROAD          = 1 << 5;
    }
}

/// Terrain categories recognised by the tile catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Open grassland.
    Grass,
    /// Bare earth.
    Dirt,
    /// Desert sand.
    Sand,
    /// Snowfield.
    Snow,
    /// Marsh.
    Swamp,
    /// Woodland that hides what lies behind it.
    Forest,
    /// Paved road.
    Road,
    /// Cliff ramp that can only be climbed along its slope.
    Ramp,
    /// Open water.
    Water,
    /// Mountain range.
    Mountain,
    /// Impassable boulders.
    Rock,
}

impl TerrainKind {
    /// Every terrain kind in catalog order.
    pub const ALL: [TerrainKind; 11] = [
        TerrainKind::Grass,
        TerrainKind::Dirt,
        TerrainKind::Sand,
        TerrainKind::Snow,
        TerrainKind::Swamp,
        TerrainKind::Forest,
        TerrainKind::Road,
        TerrainKind::Ramp,
        TerrainKind::Water,
        TerrainKind::Mountain,
        TerrainKind::Rock,
    ];
}

/// Immutable description of a single baked map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileData {
    terrain: TerrainKind,
    flags: TileFlags,
    cardinal_cost: u32,
    diagonal_cost: u32,
    enter_mask: EnterMask8,
}

impl TileData {
    /// Shared sentinel used for unresolved and dynamically blocked cells.
    pub const IMPASSABLE: TileData = TileData {
        terrain: TerrainKind::Rock,
        flags: TileFlags::empty(),
        cardinal_cost: 1,
        diagonal_cost: 1,
        enter_mask: EnterMask8::NONE,
    };

    /// Creates tile data. Zero costs are raised to one so every step costs something.
    #[must_use]
    pub fn new(
        terrain: TerrainKind,
        flags: TileFlags,
        cardinal_cost: u32,
        diagonal_cost: u32,
        enter_mask: EnterMask8,
    ) -> Self {
        Self {
            terrain,
            flags,
            cardinal_cost: cardinal_cost.max(1),
            diagonal_cost: diagonal_cost.max(1),
            enter_mask,
        }
    }

    /// Terrain category of the tile.
    #[must_use]
    pub const fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    /// Static property flags.
    #[must_use]
    pub const fn flags(&self) -> TileFlags {
        self.flags
    }

    /// Cost of entering the tile with an orthogonal step.
    #[must_use]
    pub const fn cardinal_cost(&self) -> u32 {
        self.cardinal_cost
    }

    /// Cost of entering the tile with a diagonal step.
    #[must_use]
    pub const fn diagonal_cost(&self) -> u32 {
        self.diagonal_cost
    }

    /// Directions of travel that may enter the tile.
    #[must_use]
    pub const fn enter_mask(&self) -> EnterMask8 {
        self.enter_mask
    }

    /// Reports whether agents may enter the tile at all.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        self.flags.contains(TileFlags::PASSABLE)
    }

    /// Reports whether the tile occludes line of sight.
    #[must_use]
    pub const fn blocks_vision(&self) -> bool {
        self.flags.contains(TileFlags::BLOCKS_VISION)
    }

    /// Cost of entering the tile with the given kind of step.
    #[must_use]
    pub const fn move_cost(&self, diagonal: bool) -> u32 {
        if diagonal {
            self.diagonal_cost
        } else {
            self.cardinal_cost
        }
    }

    /// Reports whether travel in the provided direction may enter the tile.
    #[must_use]
    pub const fn accepts_entry(&self, direction: crate::Direction8) -> bool {
        self.enter_mask.contains(direction.mask())
    }

    /// Returns a copy with its flags replaced.
    #[must_use]
    pub const fn with_flags(self, flags: TileFlags) -> Self {
        Self { flags, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction8;

    #[test]
    fn impassable_sentinel_rejects_everything() {
        let tile = TileData::IMPASSABLE;
        assert!(!tile.is_passable());
        assert_eq!(tile.enter_mask(), EnterMask8::NONE);
        for direction in Direction8::ALL {
            assert!(!tile.accepts_entry(direction));
        }
    }

    #[test]
    fn move_cost_distinguishes_diagonal_steps() {
        let tile = TileData::new(
            TerrainKind::Grass,
            TileFlags::PASSABLE,
            10,
            14,
            EnterMask8::ALL,
        );
        assert_eq!(tile.move_cost(false), 10);
        assert_eq!(tile.move_cost(true), 14);
    }

    #[test]
    fn directional_mask_limits_entry() {
        let ramp = TileData::new(
            TerrainKind::Ramp,
            TileFlags::PASSABLE | TileFlags::DIRECTIONAL,
            12,
            17,
            EnterMask8::N | EnterMask8::S,
        );
        assert!(ramp.accepts_entry(Direction8::North));
        assert!(ramp.accepts_entry(Direction8::South));
        assert!(!ramp.accepts_entry(Direction8::East));
        assert!(!ramp.accepts_entry(Direction8::SouthWest));
    }

    #[test]
    fn zero_costs_are_raised() {
        let tile = TileData::new(TerrainKind::Road, TileFlags::PASSABLE, 0, 0, EnterMask8::ALL);
        assert_eq!(tile.cardinal_cost(), 1);
        assert_eq!(tile.diagonal_cost(), 1);
    }
}
