//! Turns a level document into a [`Level`], and fetches level assets from disk.

use std::path::{Path, PathBuf};

use kingspigs_core::{Block, DoorKind, Point};

use super::document::{self, CellSize, LevelDocument, PrimaryLayer, blocks_from_2d, parse_2d};
use super::{Decorations, Door, Level, Pickup, PickupKind};
use crate::config::LevelConfig;
use crate::error::{GeometryError, LevelError, LoadError};

/// Opaque raster bytes for the renderer. The simulation never inspects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTexture {
    pub index: u32,
    pub bytes: Vec<u8>,
}

/// Reads `level-{index}.json` / `level-{index}.png` from an assets directory.
#[derive(Debug, Clone)]
pub struct LevelLoader {
    assets_dir: PathBuf,
    config: LevelConfig,
}

impl LevelLoader {
    pub fn new(config: LevelConfig) -> Self {
        Self {
            assets_dir: config.assets_dir.clone(),
            config,
        }
    }

    pub fn document_path(&self, index: u32) -> PathBuf {
        self.assets_dir.join(format!("level-{index}.json"))
    }

    pub fn texture_path(&self, index: u32) -> PathBuf {
        self.assets_dir.join(format!("level-{index}.png"))
    }

    pub async fn load_level(&self, index: u32) -> Result<Level, LevelError> {
        let path = self.document_path(index);
        let json = read_to_string(&path).await?;
        parse_level(index, &json, &self.config)
    }

    pub async fn load_texture(&self, index: u32) -> Result<LevelTexture, LoadError> {
        let path = self.texture_path(index);
        let bytes = tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))?;
        Ok(LevelTexture { index, bytes })
    }
}

async fn read_to_string(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Parse a level document into engine geometry.
///
/// `Map` and `Detections` must exist, as must both door layers. Every other
/// sub-layer is optional and yields no blocks when absent.
pub fn parse_level(index: u32, json: &str, config: &LevelConfig) -> Result<Level, LevelError> {
    let doc = LevelDocument::from_json(json)?;
    let map = required_primary(&doc, document::MAP_LAYER)?;
    let detections = required_primary(&doc, document::DETECTIONS_LAYER)?;

    let tile = CellSize::square(config.tile_size);
    let platform = CellSize {
        pitch: config.tile_size,
        width: config.platform_width,
        height: config.platform_height,
    };
    let layer_blocks = |layer: &PrimaryLayer,
                        name: &str,
                        cell: CellSize,
                        merge: bool|
     -> Result<Vec<Block>, LoadError> {
        match layer.secondary(name) {
            Some(l) => Ok(blocks_from_2d(&parse_2d(name, &l.data, doc.width)?, cell, merge)),
            None => Ok(Vec::new()),
        }
    };

    let collision_blocks = layer_blocks(map, document::BLOCKS, tile, true)?;
    let platform_blocks = layer_blocks(map, document::PLATFORMS, platform, true)?;
    let boxes = layer_blocks(detections, document::BOX, tile, false)?;
    let items = layer_blocks(detections, document::DIAMONDS, tile, false)?
        .into_iter()
        .map(|hitbox| Pickup {
            kind: PickupKind::Diamond,
            hitbox,
        })
        .collect();
    let decorations = Decorations {
        candles: layer_blocks(detections, document::CANDLES, tile, false)?,
        small_chains: layer_blocks(detections, document::SMALL_CHAINS, tile, false)?,
        big_chains: layer_blocks(detections, document::BIG_CHAINS, tile, false)?,
        windows: layer_blocks(detections, document::WINDOWS, tile, false)?,
    };

    let door_layer = |name: &str, kind: DoorKind| -> Result<(Block, Point), LevelError> {
        let layer = detections.secondary(name).ok_or_else(|| {
            LoadError::MissingLayer(format!("{}.{name}", document::DETECTIONS_LAYER))
        })?;
        let rows = parse_2d(name, &layer.data, doc.width)?;
        let first = blocks_from_2d(&rows, tile, true)
            .into_iter()
            .next()
            .ok_or(GeometryError::MissingDoor(kind))?;
        let (dx, dy) = layer.offset();
        Ok((first, Point::new(dx, dy)))
    };
    let (prev_block, prev_offset) = door_layer(document::DOOR_PREV, DoorKind::Prev)?;
    let (next_block, next_offset) = door_layer(document::DOOR_NEXT, DoorKind::Next)?;
    let (prev, next, initial_position) =
        resolve_doors(prev_block, prev_offset, next_block, next_offset, config.spawn_nudge);

    tracing::debug!(
        index,
        blocks = collision_blocks.len(),
        platforms = platform_blocks.len(),
        "Parsed level document"
    );

    Ok(Level {
        index,
        collision_blocks,
        platform_blocks,
        boxes,
        doors: vec![next, prev],
        items,
        decorations,
        initial_position,
    })
}

fn required_primary<'a>(doc: &'a LevelDocument, name: &str) -> Result<&'a PrimaryLayer, LoadError> {
    doc.primary(name)
        .ok_or_else(|| LoadError::MissingLayer(name.to_string()))
}

/// Place both doors and the spawn point.
///
/// The spawn point is the prev door nudged horizontally; each door layer's
/// pixel offset is then applied, the prev offset also moving the spawn point.
pub fn resolve_doors(
    prev: Block,
    prev_offset: Point,
    next: Block,
    next_offset: Point,
    spawn_nudge: f32,
) -> (Door, Door, Point) {
    let initial = prev
        .position
        .offset(spawn_nudge, 0.0)
        .offset(prev_offset.x, prev_offset.y);
    let prev = Door::new(DoorKind::Prev, prev.translated(prev_offset.x, prev_offset.y));
    let next = Door::new(DoorKind::Next, next.translated(next_offset.x, next_offset.y));
    (prev, next, initial)
}
