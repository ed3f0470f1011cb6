#![allow(dead_code)]

use async_trait::async_trait;
use maplet_vector::prelude::*;
use geozero::mvt::{tile, Message, Tile};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Source that counts fetches, takes `delay` to answer and can be told to fail
pub struct MockSource {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub delay: Duration,
}

impl MockSource {
    pub fn new(delay_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay: Duration::from_millis(delay_ms),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TileSource for MockSource {
    async fn get(&self, coord: TileCoord, _tile_size: u32) -> std::result::Result<DecodedTile, TileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TileError::Network(format!("connection reset fetching {}", coord)));
        }
        let mut tile = DecodedTile::default();
        tile.insert_layer("marker", vec![point_feature(Point::new(coord.x as f64, coord.y as f64), None)]);
        Ok(tile)
    }
}

/// Source serving pre-encoded MVT bytes from memory
pub struct MemorySource {
    pub tiles: HashMap<TileCoord, Vec<u8>>,
}

#[async_trait]
impl TileSource for MemorySource {
    async fn get(&self, coord: TileCoord, tile_size: u32) -> std::result::Result<DecodedTile, TileError> {
        match self.tiles.get(&coord) {
            Some(bytes) => maplet_vector::tiles::parse_tile(bytes, tile_size),
            None => Ok(DecodedTile::default()),
        }
    }
}

pub fn point_feature(at: Point, name: Option<&str>) -> Feature {
    let mut props = HashMap::default();
    if let Some(name) = name {
        props.insert("name".to_string(), PropValue::from(name));
    }
    Feature::new(None, GeomType::Point, vec![vec![at]], props)
}

pub fn decoded(layers: Vec<(&str, Vec<Feature>)>) -> Arc<DecodedTile> {
    let mut tile = DecodedTile::default();
    for (name, features) in layers {
        tile.insert_layer(name, features);
    }
    Arc::new(tile)
}

/// Prepared data tile at scale 1 whose origin follows from its column and row
pub fn prepared(z: u8, data_tile: TileCoord, dim: f64, data: Arc<DecodedTile>) -> PreparedTile {
    PreparedTile {
        data,
        z,
        data_tile,
        scale: 1.0,
        origin: Point::new(data_tile.x as f64 * dim, data_tile.y as f64 * dim),
        dim,
    }
}

pub fn tile_map(source: &str, tiles: Vec<PreparedTile>) -> PreparedTileMap {
    let mut map = PreparedTileMap::default();
    map.insert(source.to_string(), tiles);
    map
}

fn command(id: u32, count: u32) -> u32 {
    (count << 3) | id
}

fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// One-layer MVT with named points at the given extent coordinates
pub fn encode_points(layer: &str, points: &[(i32, i32, &str)]) -> Vec<u8> {
    let mut values = Vec::new();
    let features = points
        .iter()
        .enumerate()
        .map(|(i, (x, y, name))| {
            values.push(tile::Value {
                string_value: Some(name.to_string()),
                ..Default::default()
            });
            tile::Feature {
                id: Some(i as u64),
                tags: vec![0, i as u32],
                r#type: Some(tile::GeomType::Point as i32),
                geometry: vec![command(1, 1), zigzag(*x), zigzag(*y)],
            }
        })
        .collect();
    Tile {
        layers: vec![tile::Layer {
            version: 2,
            name: layer.to_string(),
            features,
            keys: vec!["name".to_string()],
            values,
            extent: Some(4096),
        }],
    }
    .encode_to_vec()
}
