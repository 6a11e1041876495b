//! Baked tile data provider with a two-phase readiness lifecycle.

use overland_core::{Event, GridBounds, GridCoord, Readiness, TileData, TileDataProvider};

use crate::MapContent;

/// Dense, row-major snapshot of the authored map resolved into [`TileData`].
///
/// The provider starts [`Readiness::NotReady`] with empty bounds. The first
/// successful bake fills the tile array and announces [`Event::MapBaked`];
/// afterwards the provider is read-only and further bake attempts are no-ops.
#[derive(Clone, Debug)]
pub struct BakedTileMap {
    bounds: GridBounds,
    tiles: Vec<TileData>,
    readiness: Readiness,
}

impl BakedTileMap {
    /// Creates a provider that has not been baked yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bounds: GridBounds::EMPTY,
            tiles: Vec::new(),
            readiness: Readiness::NotReady,
        }
    }

    /// Creates a provider baked from the provided content without emitting events.
    #[must_use]
    pub fn baked(content: &MapContent) -> Self {
        let mut map = Self::new();
        map.bake_from(content);
        map
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Bakes the content if it is available and the provider is not ready yet.
    ///
    /// Absent content leaves the provider untouched so callers can retry on a
    /// later tick.
    pub fn try_bake(&mut self, content: Option<&MapContent>, out: &mut Vec<Event>) -> Readiness {
        if self.readiness == Readiness::Ready {
            return Readiness::Ready;
        }

        let Some(content) = content else {
            tracing::trace!("map content not available yet; bake deferred");
            return Readiness::NotReady;
        };

        self.bake_from(content);
        out.push(Event::MapBaked {
            bounds: self.bounds,
        });
        Readiness::Ready
    }

    /// Polls `source` up to `max_attempts` times until content becomes available.
    pub fn bake_with_retry<F>(
        &mut self,
        mut source: F,
        max_attempts: u32,
        out: &mut Vec<Event>,
    ) -> Readiness
    where
        F: FnMut() -> Option<MapContent>,
    {
        for attempt in 0..max_attempts {
            if self.readiness == Readiness::Ready {
                break;
            }
            let content = source();
            if self.try_bake(content.as_ref(), out) == Readiness::Ready {
                tracing::debug!(attempt, "map baked after retry");
            }
        }

        if self.readiness == Readiness::NotReady {
            tracing::warn!(max_attempts, "map content never became available");
        }
        self.readiness
    }

    fn bake_from(&mut self, content: &MapContent) {
        let catalog = content.catalog();
        let road = catalog.get(overland_core::TerrainKind::Road);
        let require_passable = content.roads_require_passable_base();

        self.tiles = content
            .terrain()
            .iter()
            .zip(content.roads())
            .map(|(&kind, &has_road)| {
                let base = catalog.get(kind);
                if has_road && (base.is_passable() || !require_passable) {
                    road
                } else {
                    base
                }
            })
            .collect();
        self.bounds = content.bounds();
        self.readiness = Readiness::Ready;

        tracing::debug!(
            width = self.bounds.width(),
            height = self.bounds.height(),
            "baked tile map"
        );
    }
}

impl Default for BakedTileMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TileDataProvider for BakedTileMap {
    fn bounds(&self) -> GridBounds {
        self.bounds
    }

    fn tile(&self, coord: GridCoord) -> Option<TileData> {
        self.bounds
            .index_of(coord)
            .and_then(|index| self.tiles.get(index).copied())
    }

    fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready && !self.bounds.is_empty()
    }
}
