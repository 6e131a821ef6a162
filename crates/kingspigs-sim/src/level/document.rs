//! The external tile-map document and the grid-to-rectangle conversion.

use serde::Deserialize;

use kingspigs_core::Block;

use crate::error::LoadError;

pub const MAP_LAYER: &str = "Map";
pub const DETECTIONS_LAYER: &str = "Detections";
pub const BLOCKS: &str = "Blocks";
pub const PLATFORMS: &str = "Platforms";
pub const DOOR_NEXT: &str = "Door Next";
pub const DOOR_PREV: &str = "Door Prev";
pub const DIAMONDS: &str = "Diamonds";
pub const SMALL_CHAINS: &str = "Small Chains";
pub const BIG_CHAINS: &str = "Big Chains";
pub const CANDLES: &str = "Candles";
pub const WINDOWS: &str = "Windows";
pub const BOX: &str = "Box";

/// Root of a level document. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelDocument {
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
    #[serde(default)]
    pub layers: Vec<PrimaryLayer>,
}

/// A named group of tile layers ("Map", "Detections").
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryLayer {
    pub name: String,
    #[serde(default)]
    pub layers: Vec<SecondaryLayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecondaryLayer {
    pub name: String,
    /// Row-major tile indices; zero is empty.
    #[serde(default)]
    pub data: Vec<u32>,
    pub offsetx: Option<f32>,
    pub offsety: Option<f32>,
}

impl SecondaryLayer {
    pub fn offset(&self) -> (f32, f32) {
        (self.offsetx.unwrap_or(0.0), self.offsety.unwrap_or(0.0))
    }
}

impl LevelDocument {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))
    }

    pub fn primary(&self, name: &str) -> Option<&PrimaryLayer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

impl PrimaryLayer {
    pub fn secondary(&self, name: &str) -> Option<&SecondaryLayer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// Footprint of an emitted block.
///
/// Cells sit on a `pitch` grid; a run of `n` cells spans `(n - 1) * pitch +
/// width` so the trailing cell contributes its own footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub pitch: f32,
    pub width: f32,
    pub height: f32,
}

impl CellSize {
    pub const fn square(pitch: f32) -> Self {
        Self {
            pitch,
            width: pitch,
            height: pitch,
        }
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self::square(kingspigs_core::TILE_SIZE)
    }
}

/// Fold a 1-D tile array into rows of `width` cells.
pub fn parse_2d(layer: &str, data: &[u32], width: usize) -> Result<Vec<Vec<u32>>, LoadError> {
    if width == 0 {
        return Err(LoadError::MalformedLayer {
            layer: layer.to_string(),
            reason: "document width is zero".to_string(),
        });
    }
    if data.len() % width != 0 {
        return Err(LoadError::MalformedLayer {
            layer: layer.to_string(),
            reason: format!("{} tiles is not a multiple of width {width}", data.len()),
        });
    }
    Ok(data.chunks(width).map(<[u32]>::to_vec).collect())
}

/// Convert non-zero cells into blocks, scanning rows top to bottom.
///
/// With `merge_runs` each maximal horizontal run of non-zero cells becomes a
/// single block; otherwise every cell is its own block.
pub fn blocks_from_2d(rows: &[Vec<u32>], cell: CellSize, merge_runs: bool) -> Vec<Block> {
    let mut blocks = Vec::new();
    for (y, row) in rows.iter().enumerate() {
        let top = y as f32 * cell.pitch;
        let mut x = 0;
        while x < row.len() {
            if row[x] == 0 {
                x += 1;
                continue;
            }
            let start = x;
            x += 1;
            if merge_runs {
                while x < row.len() && row[x] != 0 {
                    x += 1;
                }
            }
            let run = (x - start) as f32;
            blocks.push(Block::new(
                start as f32 * cell.pitch,
                top,
                (run - 1.0) * cell.pitch + cell.width,
                cell.height,
            ));
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_2d_splits_rows() {
        let rows = parse_2d("Blocks", &[1, 0, 0, 0, 2, 3], 3).unwrap();
        assert_eq!(rows, vec![vec![1, 0, 0], vec![0, 2, 3]]);
    }

    #[test]
    fn parse_2d_rejects_ragged_data() {
        let err = parse_2d("Blocks", &[1, 0, 0, 0], 3).unwrap_err();
        assert!(matches!(err, LoadError::MalformedLayer { .. }));
        assert!(parse_2d("Blocks", &[], 0).is_err());
    }

    #[test]
    fn runs_merge_into_one_block() {
        let rows = vec![vec![0, 5, 5, 5, 0, 7]];
        let blocks = blocks_from_2d(&rows, CellSize::default(), true);
        assert_eq!(
            blocks,
            vec![
                Block::new(16.0, 0.0, 48.0, 16.0),
                Block::new(80.0, 0.0, 16.0, 16.0),
            ]
        );
    }

    #[test]
    fn cells_stay_separate_without_merging() {
        let rows = vec![vec![0, 0], vec![9, 9]];
        let blocks = blocks_from_2d(&rows, CellSize::default(), false);
        assert_eq!(
            blocks,
            vec![
                Block::new(0.0, 16.0, 16.0, 16.0),
                Block::new(16.0, 16.0, 16.0, 16.0),
            ]
        );
    }

    #[test]
    fn platform_cells_use_override_footprint() {
        let cell = CellSize {
            pitch: 16.0,
            width: 32.0,
            height: 10.0,
        };
        let rows = vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 1, 0]];
        let blocks = blocks_from_2d(&rows, cell, true);
        assert_eq!(blocks, vec![Block::new(16.0, 32.0, 32.0, 10.0)]);
    }

    #[test]
    fn document_lookup_ignores_unknown_fields() {
        let doc = LevelDocument::from_json(
            r#"{
                "width": 2, "height": 1, "tiledversion": "1.10",
                "layers": [
                    {"id": 1, "name": "Map", "type": "group", "visible": true,
                     "layers": [{"id": 2, "name": "Blocks", "data": [1, 1], "opacity": 1}]}
                ]
            }"#,
        )
        .unwrap();
        let blocks = doc.primary(MAP_LAYER).and_then(|m| m.secondary(BLOCKS)).unwrap();
        assert_eq!(blocks.data, vec![1, 1]);
        assert_eq!(blocks.offset(), (0.0, 0.0));
        assert!(doc.primary(DETECTIONS_LAYER).is_none());
    }

    #[test]
    fn garbage_json_is_parse_error() {
        assert!(matches!(
            LevelDocument::from_json("{not json"),
            Err(LoadError::Parse(_))
        ));
    }
}
