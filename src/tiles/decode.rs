//! Vector tile decoding into pixel-space features.
//!
//! Geometry is scaled by `tile_size / extent` while decoding, so a feature's
//! coordinates are already in the tile-local pixel space that rendering and
//! label placement use.

use crate::core::{bounds::Bounds, geo::Point};
use crate::prelude::HashMap;
use crate::TileError;
use geozero::mvt::{tile, Message, Tile};
use serde::{Deserialize, Serialize};

const CMD_MOVE_TO: u32 = 1;
const CMD_LINE_TO: u32 = 2;
const CMD_CLOSE_PATH: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeomType {
    Point,
    Line,
    Polygon,
}

/// Scalar feature property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: Option<u64>,
    pub geom_type: GeomType,
    /// Rings (polygons), paths (lines) or single-point parts (points)
    pub geom: Vec<Vec<Point>>,
    pub bbox: Bounds,
    pub num_vertices: usize,
    pub props: HashMap<String, PropValue>,
}

impl Feature {
    /// Builds a feature from pixel-space geometry, computing bbox and vertex count
    pub fn new(
        id: Option<u64>,
        geom_type: GeomType,
        geom: Vec<Vec<Point>>,
        props: HashMap<String, PropValue>,
    ) -> Self {
        let mut bbox = Bounds::empty();
        let mut num_vertices = 0;
        for part in &geom {
            num_vertices += part.len();
            for point in part {
                bbox.extend(point);
            }
        }
        Self {
            id,
            geom_type,
            geom,
            bbox,
            num_vertices,
            props,
        }
    }

    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }
}

/// Decoded tile: layer name to features in rendering order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedTile {
    pub layers: HashMap<String, Vec<Feature>>,
}

impl DecodedTile {
    pub fn layer(&self, name: &str) -> Option<&[Feature]> {
        self.layers.get(name).map(Vec::as_slice)
    }

    pub fn insert_layer(&mut self, name: impl Into<String>, features: Vec<Feature>) {
        self.layers.insert(name.into(), features);
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }
}

/// Decodes an MVT payload, scaling coordinates so the tile spans `tile_size` pixels.
pub fn parse_tile(bytes: &[u8], tile_size: u32) -> Result<DecodedTile, TileError> {
    let mvt = Tile::decode(bytes).map_err(|e| TileError::Decode(e.to_string()))?;
    let mut decoded = DecodedTile::default();

    for layer in &mvt.layers {
        let extent = layer.extent.unwrap_or(crate::core::constants::DEFAULT_TILE_EXTENT);
        if extent == 0 {
            return Err(TileError::Decode(format!(
                "layer {} has zero extent",
                layer.name
            )));
        }
        let scale = tile_size as f64 / extent as f64;

        let mut features = Vec::with_capacity(layer.features.len());
        for feature in &layer.features {
            let geom_type = match feature.r#type {
                Some(t) if t == tile::GeomType::Point as i32 => GeomType::Point,
                Some(t) if t == tile::GeomType::Linestring as i32 => GeomType::Line,
                Some(t) if t == tile::GeomType::Polygon as i32 => GeomType::Polygon,
                _ => {
                    log::warn!(
                        "skipping feature {:?} with unknown geometry type in layer {}",
                        feature.id,
                        layer.name
                    );
                    continue;
                }
            };
            let geom = decode_geometry(&feature.geometry, scale)?;
            let props = decode_properties(layer, feature)?;
            features.push(Feature::new(feature.id, geom_type, geom, props));
        }
        decoded.insert_layer(layer.name.clone(), features);
    }

    Ok(decoded)
}

fn zigzag(value: u32) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Decodes an MVT command stream into scaled parts.
pub fn decode_geometry(commands: &[u32], scale: f64) -> Result<Vec<Vec<Point>>, TileError> {
    let mut parts = Vec::new();
    let mut part: Vec<Point> = Vec::new();
    let (mut x, mut y) = (0_i64, 0_i64);
    let mut pos = 0;

    while pos < commands.len() {
        let header = commands[pos];
        pos += 1;
        let cmd = header & 0x7;
        let count = (header >> 3) as usize;

        match cmd {
            CMD_MOVE_TO | CMD_LINE_TO => {
                if pos + count * 2 > commands.len() {
                    return Err(TileError::Decode(format!(
                        "command {} expects {} parameter pairs, geometry truncated",
                        cmd, count
                    )));
                }
                for _ in 0..count {
                    x += zigzag(commands[pos]);
                    y += zigzag(commands[pos + 1]);
                    pos += 2;
                    if cmd == CMD_MOVE_TO && !part.is_empty() {
                        parts.push(std::mem::take(&mut part));
                    }
                    part.push(Point::new(x as f64 * scale, y as f64 * scale));
                }
            }
            CMD_CLOSE_PATH => {
                if let Some(first) = part.first().copied() {
                    part.push(first);
                }
            }
            other => {
                return Err(TileError::Decode(format!("unknown command {}", other)));
            }
        }
    }

    if !part.is_empty() {
        parts.push(part);
    }
    Ok(parts)
}

fn decode_properties(
    layer: &tile::Layer,
    feature: &tile::Feature,
) -> Result<HashMap<String, PropValue>, TileError> {
    let mut props = HashMap::default();
    for pair in feature.tags.chunks(2) {
        let [key_idx, value_idx] = pair else {
            return Err(TileError::Decode("odd number of feature tags".into()));
        };
        let key = layer.keys.get(*key_idx as usize).ok_or_else(|| {
            TileError::Decode(format!("tag key index {} out of range", key_idx))
        })?;
        let value = layer.values.get(*value_idx as usize).ok_or_else(|| {
            TileError::Decode(format!("tag value index {} out of range", value_idx))
        })?;
        if let Some(value) = to_prop_value(value) {
            props.insert(key.clone(), value);
        }
    }
    Ok(props)
}

fn to_prop_value(value: &tile::Value) -> Option<PropValue> {
    if let Some(s) = &value.string_value {
        Some(PropValue::String(s.clone()))
    } else if let Some(f) = value.float_value {
        Some(PropValue::Number(f as f64))
    } else if let Some(d) = value.double_value {
        Some(PropValue::Number(d))
    } else if let Some(i) = value.int_value.or(value.sint_value) {
        Some(PropValue::Number(i as f64))
    } else if let Some(u) = value.uint_value {
        Some(PropValue::Number(u as f64))
    } else {
        value.bool_value.map(PropValue::Bool)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn command(id: u32, count: u32) -> u32 {
        (count << 3) | id
    }

    pub(crate) fn zz(value: i32) -> u32 {
        ((value << 1) ^ (value >> 31)) as u32
    }

    fn sample_tile() -> Vec<u8> {
        let tile = Tile {
            layers: vec![tile::Layer {
                version: 2,
                name: "roads".into(),
                features: vec![
                    tile::Feature {
                        id: Some(7),
                        tags: vec![0, 0, 1, 1],
                        r#type: Some(tile::GeomType::Linestring as i32),
                        geometry: vec![
                            command(1, 1),
                            zz(0),
                            zz(0),
                            command(2, 2),
                            zz(4096),
                            zz(0),
                            zz(0),
                            zz(2048),
                        ],
                    },
                    tile::Feature {
                        id: Some(8),
                        tags: vec![],
                        r#type: Some(tile::GeomType::Unknown as i32),
                        geometry: vec![command(1, 1), zz(1), zz(1)],
                    },
                ],
                keys: vec!["name".into(), "lanes".into()],
                values: vec![
                    tile::Value {
                        string_value: Some("Main St".into()),
                        ..Default::default()
                    },
                    tile::Value {
                        int_value: Some(4),
                        ..Default::default()
                    },
                ],
                extent: Some(4096),
            }],
        };
        tile.encode_to_vec()
    }

    #[test]
    fn test_parse_tile_scales_geometry() {
        let decoded = parse_tile(&sample_tile(), 512).unwrap();
        let roads = decoded.layer("roads").unwrap();
        assert_eq!(roads.len(), 1);

        let road = &roads[0];
        assert_eq!(road.id, Some(7));
        assert_eq!(road.geom_type, GeomType::Line);
        assert_eq!(
            road.geom,
            vec![vec![
                Point::new(0.0, 0.0),
                Point::new(512.0, 0.0),
                Point::new(512.0, 256.0)
            ]]
        );
        assert_eq!(road.num_vertices, 3);
        assert_eq!(road.bbox, Bounds::from_coords(0.0, 0.0, 512.0, 256.0));
        assert_eq!(road.prop("name").and_then(PropValue::as_str), Some("Main St"));
        assert_eq!(road.prop("lanes").and_then(PropValue::as_f64), Some(4.0));
    }

    #[test]
    fn test_polygon_close_path() {
        let geom = decode_geometry(
            &[
                command(1, 1),
                zz(0),
                zz(0),
                command(2, 2),
                zz(10),
                zz(0),
                zz(0),
                zz(10),
                command(7, 1),
                command(1, 1),
                zz(5),
                zz(5),
            ],
            1.0,
        )
        .unwrap();
        assert_eq!(geom.len(), 2);
        assert_eq!(geom[0].len(), 4);
        assert_eq!(geom[0][0], geom[0][3]);
        assert_eq!(geom[1], vec![Point::new(15.0, 15.0)]);
    }

    #[test]
    fn test_multipoint_splits_parts() {
        let geom =
            decode_geometry(&[command(1, 2), zz(1), zz(1), zz(2), zz(-1)], 2.0).unwrap();
        assert_eq!(geom, vec![vec![Point::new(2.0, 2.0)], vec![Point::new(6.0, 0.0)]]);
    }

    #[test]
    fn test_unknown_command_is_fatal() {
        let err = decode_geometry(&[command(3, 1), zz(0), zz(0)], 1.0).unwrap_err();
        assert!(matches!(err, TileError::Decode(_)));
    }

    #[test]
    fn test_truncated_geometry_is_fatal() {
        let err = decode_geometry(&[command(2, 2), zz(0), zz(0), zz(1)], 1.0).unwrap_err();
        assert!(matches!(err, TileError::Decode(_)));
    }

    #[test]
    fn test_garbage_bytes_are_fatal() {
        assert!(parse_tile(&[0xff, 0xff, 0xff], 256).is_err());
    }
}
