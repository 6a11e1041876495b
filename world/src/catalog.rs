//! Terrain catalog mapping terrain kinds to baked tile templates.

use overland_core::{EnterMask8, TerrainKind, TileData, TileFlags};
use serde::Deserialize;

use crate::ContentError;

/// Lookup table from [`TerrainKind`] to the [`TileData`] stamped into every
/// cell of that terrain during baking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainCatalog {
    entries: [TileData; TerrainKind::ALL.len()],
}

impl TerrainCatalog {
    /// Catalog with the standard adventure-map costs.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: TerrainKind::ALL.map(standard_tile),
        }
    }

    /// Template stamped for the provided terrain.
    #[must_use]
    pub fn get(&self, kind: TerrainKind) -> TileData {
        self.entries[slot(kind)]
    }

    /// Replaces the template used for the provided terrain.
    pub fn set(&mut self, kind: TerrainKind, tile: TileData) {
        self.entries[slot(kind)] = tile;
    }

    /// Applies an authored override on top of the current template.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnknownDirection`] when the override names an
    /// entry direction that does not exist.
    pub fn apply_override(
        &mut self,
        kind: TerrainKind,
        patch: &TerrainOverride,
    ) -> Result<(), ContentError> {
        let current = self.get(kind);

        let mut flags = current.flags();
        if let Some(passable) = patch.passable {
            flags.set(TileFlags::PASSABLE, passable);
        }
        if let Some(blocks_vision) = patch.blocks_vision {
            flags.set(TileFlags::BLOCKS_VISION, blocks_vision);
        }

        let enter_mask = match &patch.enter {
            Some(names) => parse_enter_mask(names)?,
            None => current.enter_mask(),
        };

        if enter_mask != EnterMask8::ALL {
            flags.insert(TileFlags::DIRECTIONAL);
        }

        self.set(
            kind,
            TileData::new(
                kind,
                flags,
                patch.cardinal_cost.unwrap_or(current.cardinal_cost()),
                patch.diagonal_cost.unwrap_or(current.diagonal_cost()),
                enter_mask,
            ),
        );
        Ok(())
    }
}

impl Default for TerrainCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Authored adjustments to a single catalog entry. Omitted fields keep the
/// standard value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerrainOverride {
    /// Cost of an orthogonal step onto the terrain.
    pub cardinal_cost: Option<u32>,
    /// Cost of a diagonal step onto the terrain.
    pub diagonal_cost: Option<u32>,
    /// Whether agents may enter the terrain.
    pub passable: Option<bool>,
    /// Whether the terrain occludes line of sight.
    pub blocks_vision: Option<bool>,
    /// Directions of travel that may enter the terrain, e.g. `["n", "s"]`.
    pub enter: Option<Vec<String>>,
}

/// Resolves a snake_case terrain name such as `"grass"`.
#[must_use]
pub fn terrain_by_name(name: &str) -> Option<TerrainKind> {
    let kind = match name.trim().to_ascii_lowercase().as_str() {
        "grass" => TerrainKind::Grass,
        "dirt" => TerrainKind::Dirt,
        "sand" => TerrainKind::Sand,
        "snow" => TerrainKind::Snow,
        "swamp" => TerrainKind::Swamp,
        "forest" => TerrainKind::Forest,
        "road" => TerrainKind::Road,
        "ramp" => TerrainKind::Ramp,
        "water" => TerrainKind::Water,
        "mountain" => TerrainKind::Mountain,
        "rock" => TerrainKind::Rock,
        _ => return None,
    };
    Some(kind)
}

fn parse_enter_mask(names: &[String]) -> Result<EnterMask8, ContentError> {
    names.iter().try_fold(EnterMask8::NONE, |mask, name| {
        let bit = match name.trim().to_ascii_lowercase().as_str() {
            "n" => EnterMask8::N,
            "s" => EnterMask8::S,
            "e" => EnterMask8::E,
            "w" => EnterMask8::W,
            "ne" => EnterMask8::NE,
            "nw" => EnterMask8::NW,
            "se" => EnterMask8::SE,
            "sw" => EnterMask8::SW,
            "all" => EnterMask8::ALL,
            _ => return Err(ContentError::UnknownDirection(name.clone())),
        };
        Ok(mask | bit)
    })
}

fn slot(kind: TerrainKind) -> usize {
    kind as usize
}

fn standard_tile(kind: TerrainKind) -> TileData {
    let open = TileFlags::PASSABLE;
    match kind {
        TerrainKind::Grass | TerrainKind::Dirt => {
            TileData::new(kind, open, 10, 14, EnterMask8::ALL)
        }
        TerrainKind::Sand | TerrainKind::Snow => {
            TileData::new(kind, open, 15, 21, EnterMask8::ALL)
        }
        TerrainKind::Swamp => TileData::new(kind, open, 18, 25, EnterMask8::ALL),
        TerrainKind::Forest => TileData::new(
            kind,
            open | TileFlags::BLOCKS_VISION,
            15,
            21,
            EnterMask8::ALL,
        ),
        TerrainKind::Road => TileData::new(kind, open | TileFlags::ROAD, 5, 7, EnterMask8::ALL),
        TerrainKind::Ramp => TileData::new(
            kind,
            open | TileFlags::DIRECTIONAL,
            12,
            17,
            EnterMask8::N | EnterMask8::S,
        ),
        TerrainKind::Water => TileData::new(kind, TileFlags::WATER, 10, 14, EnterMask8::NONE),
        TerrainKind::Mountain => TileData::new(
            kind,
            TileFlags::MOUNTAIN | TileFlags::BLOCKS_VISION,
            10,
            14,
            EnterMask8::NONE,
        ),
        TerrainKind::Rock => TileData::new(kind, TileFlags::empty(), 10, 14, EnterMask8::NONE),
    }
}
