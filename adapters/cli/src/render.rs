//! ASCII rendering of baked maps for terminal output.

use std::fmt::Write as _;

use overland_core::{GridCoord, TerrainKind, TileDataProvider};
use overland_world::DEFAULT_LEGEND;

/// Glyph shown for cells the observer has never seen.
pub(crate) const UNKNOWN_GLYPH: char = '?';

/// Glyph used for a terrain kind in the default legend.
pub(crate) fn terrain_glyph(kind: TerrainKind) -> char {
    DEFAULT_LEGEND
        .iter()
        .find_map(|&(glyph, terrain)| (terrain == kind).then_some(glyph))
        .unwrap_or(UNKNOWN_GLYPH)
}

/// Renders the map row by row, letting `marker` replace the terrain glyph.
pub(crate) fn render<P, F>(tiles: &P, marker: F) -> String
where
    P: TileDataProvider + ?Sized,
    F: Fn(GridCoord) -> Option<char>,
{
    let bounds = tiles.bounds();
    let mut output = String::with_capacity(bounds.area() + bounds.height().max(0) as usize);
    for y in 0..bounds.height() {
        for x in 0..bounds.width() {
            let cell = GridCoord::new(x, y);
            let glyph = marker(cell).unwrap_or_else(|| {
                tiles
                    .tile(cell)
                    .map_or(UNKNOWN_GLYPH, |tile| terrain_glyph(tile.terrain()))
            });
            output.push(glyph);
        }
        let _ = writeln!(output);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use overland_world::{BakedTileMap, MapContent};

    #[test]
    fn renders_terrain_with_markers() {
        let map = BakedTileMap::baked(
            &MapContent::from_rows(&[".~^", "T|#"]).expect("content"),
        );

        let plain = render(&map, |_| None);
        assert_eq!(plain, ".~^\nT|#\n");

        let marked = render(&map, |cell| (cell == GridCoord::new(1, 1)).then_some('@'));
        assert_eq!(marked, ".~^\nT@#\n");
    }

    #[test]
    fn every_terrain_has_a_distinct_glyph() {
        let mut glyphs: Vec<char> = TerrainKind::ALL.iter().map(|&kind| terrain_glyph(kind)).collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), TerrainKind::ALL.len());
        assert!(!glyphs.contains(&UNKNOWN_GLYPH));
    }
}
