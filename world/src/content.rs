//! Authored map content loaded from TOML map files.

use std::collections::BTreeMap;

use overland_core::{GridBounds, GridError, TerrainKind};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{terrain_by_name, TerrainCatalog, TerrainOverride};

/// Glyph marking a road cell in the road layer.
pub const ROAD_GLYPH: char = '=';

/// Glyph-to-terrain assignments used when a map file does not override them.
pub const DEFAULT_LEGEND: [(char, TerrainKind); 11] = [
    ('.', TerrainKind::Grass),
    (',', TerrainKind::Dirt),
    (':', TerrainKind::Sand),
    ('*', TerrainKind::Snow),
    ('%', TerrainKind::Swamp),
    ('T', TerrainKind::Forest),
    ('=', TerrainKind::Road),
    ('|', TerrainKind::Ramp),
    ('~', TerrainKind::Water),
    ('^', TerrainKind::Mountain),
    ('#', TerrainKind::Rock),
];

/// Errors raised while reading authored map content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The map file is not valid TOML or does not match the expected layout.
    #[error("could not parse map file: {0}")]
    Toml(#[from] toml::de::Error),
    /// The map contains no rows or no columns.
    #[error("map content contains no cells")]
    Empty,
    /// A row has a different width than the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A terrain glyph has no legend entry.
    #[error("unknown terrain glyph '{glyph}' at ({x}, {y})")]
    UnknownGlyph {
        /// Offending glyph.
        glyph: char,
        /// Column of the glyph.
        x: usize,
        /// Row of the glyph.
        y: usize,
    },
    /// A legend key is not exactly one character.
    #[error("legend key '{0}' must be a single character")]
    InvalidLegendKey(String),
    /// A terrain override names a terrain that does not exist.
    #[error("unknown terrain '{0}'")]
    UnknownTerrain(String),
    /// An entry mask names a direction that does not exist.
    #[error("unknown entry direction '{0}'")]
    UnknownDirection(String),
    /// The road layer does not have the same shape as the terrain rows.
    #[error("road layer is {found_width}x{found_height}, expected {width}x{height}")]
    RoadLayerShape {
        /// Width of the terrain layer.
        width: usize,
        /// Height of the terrain layer.
        height: usize,
        /// Width of the road layer.
        found_width: usize,
        /// Height of the road layer.
        found_height: usize,
    },
    /// The grid primitives rejected the map dimensions.
    #[error("map dimensions are out of range")]
    Dimensions(#[from] GridError),
    /// The map is too large to address with signed 32-bit coordinates.
    #[error("map dimension {0} exceeds the addressable range")]
    TooLarge(usize),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapFile {
    rows: Vec<String>,
    #[serde(default)]
    roads: Vec<String>,
    #[serde(default)]
    legend: BTreeMap<String, TerrainKind>,
    #[serde(default)]
    terrain: BTreeMap<String, TerrainOverride>,
    #[serde(default = "roads_require_passable_base_default")]
    roads_require_passable_base: bool,
}

const fn roads_require_passable_base_default() -> bool {
    true
}

/// Validated map content ready to be baked into a tile provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapContent {
    bounds: GridBounds,
    terrain: Vec<TerrainKind>,
    roads: Vec<bool>,
    roads_require_passable_base: bool,
    catalog: TerrainCatalog,
}

impl MapContent {
    /// Parses a TOML map file.
    ///
    /// ```toml
    /// rows = ["..^", ".~."]
    /// roads = ["==.", "..."]
    ///
    /// [terrain.swamp]
    /// cardinal_cost = 20
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] describing the first validation failure.
    pub fn from_toml_str(source: &str) -> Result<Self, ContentError> {
        let file: MapFile = toml::from_str(source)?;

        let mut legend: BTreeMap<char, TerrainKind> = DEFAULT_LEGEND.into_iter().collect();
        for (key, kind) in file.legend {
            let mut chars = key.chars();
            let (Some(glyph), None) = (chars.next(), chars.next()) else {
                return Err(ContentError::InvalidLegendKey(key));
            };
            let _ = legend.insert(glyph, kind);
        }

        let mut catalog = TerrainCatalog::standard();
        for (name, patch) in &file.terrain {
            let kind =
                terrain_by_name(name).ok_or_else(|| ContentError::UnknownTerrain(name.clone()))?;
            catalog.apply_override(kind, patch)?;
        }

        let mut content = Self::from_rows_with_legend(&file.rows, &legend, catalog)?;
        if !file.roads.is_empty() {
            content = content.with_roads(&file.roads)?;
        }
        content.roads_require_passable_base = file.roads_require_passable_base;
        Ok(content)
    }

    /// Builds content from glyph rows using the default legend and catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] when the rows are empty, ragged, or contain
    /// an unknown glyph.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, ContentError> {
        let legend: BTreeMap<char, TerrainKind> = DEFAULT_LEGEND.into_iter().collect();
        Self::from_rows_with_legend(rows, &legend, TerrainCatalog::standard())
    }

    /// Builds a rectangle filled with a single terrain.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Empty`] when either dimension is zero.
    pub fn uniform(width: usize, height: usize, kind: TerrainKind) -> Result<Self, ContentError> {
        if width == 0 || height == 0 {
            return Err(ContentError::Empty);
        }
        let bounds = bounds_for(width, height)?;
        Ok(Self {
            bounds,
            terrain: vec![kind; bounds.area()],
            roads: vec![false; bounds.area()],
            roads_require_passable_base: true,
            catalog: TerrainCatalog::standard(),
        })
    }

    /// Adds a road layer; `=` marks a road cell and any other glyph leaves the
    /// base terrain untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::RoadLayerShape`] when the layer does not match
    /// the terrain dimensions.
    pub fn with_roads<S: AsRef<str>>(mut self, rows: &[S]) -> Result<Self, ContentError> {
        let width = usize::try_from(self.bounds.width()).unwrap_or(0);
        let height = usize::try_from(self.bounds.height()).unwrap_or(0);
        let found_width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        let shape_matches = rows.len() == height
            && rows
                .iter()
                .all(|row| row.as_ref().chars().count() == width);
        if !shape_matches {
            return Err(ContentError::RoadLayerShape {
                width,
                height,
                found_width,
                found_height: rows.len(),
            });
        }

        self.roads = rows
            .iter()
            .flat_map(|row| row.as_ref().chars().map(|glyph| glyph == ROAD_GLYPH))
            .collect();
        Ok(self)
    }

    /// Controls whether roads may only replace passable base terrain.
    #[must_use]
    pub fn with_roads_require_passable_base(mut self, required: bool) -> Self {
        self.roads_require_passable_base = required;
        self
    }

    /// Replaces the catalog used to bake the content.
    #[must_use]
    pub fn with_catalog(mut self, catalog: TerrainCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Dimensions of the authored map.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Authored terrain in row-major order.
    #[must_use]
    pub fn terrain(&self) -> &[TerrainKind] {
        &self.terrain
    }

    /// Road layer in row-major order.
    #[must_use]
    pub fn roads(&self) -> &[bool] {
        &self.roads
    }

    /// Whether roads may only replace passable base terrain.
    #[must_use]
    pub fn roads_require_passable_base(&self) -> bool {
        self.roads_require_passable_base
    }

    /// Catalog used to resolve terrain into tile data.
    #[must_use]
    pub fn catalog(&self) -> &TerrainCatalog {
        &self.catalog
    }

    fn from_rows_with_legend<S: AsRef<str>>(
        rows: &[S],
        legend: &BTreeMap<char, TerrainKind>,
        catalog: TerrainCatalog,
    ) -> Result<Self, ContentError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if width == 0 || height == 0 {
            return Err(ContentError::Empty);
        }

        let mut terrain = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ContentError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let kind = legend
                    .get(&glyph)
                    .copied()
                    .ok_or(ContentError::UnknownGlyph { glyph, x, y })?;
                terrain.push(kind);
            }
        }

        let bounds = bounds_for(width, height)?;
        Ok(Self {
            bounds,
            roads: vec![false; terrain.len()],
            terrain,
            roads_require_passable_base: true,
            catalog,
        })
    }
}

fn bounds_for(width: usize, height: usize) -> Result<GridBounds, ContentError> {
    let columns = i32::try_from(width).map_err(|_| ContentError::TooLarge(width))?;
    let rows = i32::try_from(height).map_err(|_| ContentError::TooLarge(height))?;
    Ok(GridBounds::new(columns, rows)?)
}
