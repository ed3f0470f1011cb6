//! Collision-aware label layout, one [`Labeler`] per display zoom.

use crate::core::{
    bounds::Bounds,
    constants::{MAX_ZOOM, TILE_SIZE},
    geo::TileCoord,
};
use crate::prelude::{Arc, HashMap, HashSet, Instant};
use crate::spatial::index::SpatialIndex;
use crate::style::{measure::TextMeasurer, rule::LabelRule, symbolizer::LayoutContext};
use crate::tiles::{
    decode::Feature,
    view::{transform_geom, PreparedTile, PreparedTileMap},
};
use std::fmt;

/// Receives display tiles whose already-painted labels went stale
pub type InvalidationCallback = Arc<dyn Fn(&HashSet<TileCoord>) + Send + Sync>;

/// Display tile touched by a bbox, with the `"x:y:z"` of its data tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Covered {
    pub display: TileCoord,
    pub data_key: String,
}

/// Display tiles at `display_zoom` touched by `bbox`, for data tiles that
/// span `dim` pixels. Columns wrap around the antimeridian; rows outside
/// the world are skipped.
pub fn covering(display_zoom: u8, dim: f64, bbox: &Bounds) -> Vec<Covered> {
    let res = TILE_SIZE as f64;
    let f = dim / res;
    let level_diff = f.log2().round() as i32;
    let data_zoom = (display_zoom as i32 - level_diff).max(0) as u8;
    let world = 1_i64 << display_zoom.min(MAX_ZOOM);

    let min_x = (bbox.min.x / res).floor() as i64;
    let min_y = (bbox.min.y / res).floor() as i64;
    let max_x = (bbox.max.x / res).floor() as i64;
    let max_y = (bbox.max.y / res).floor() as i64;

    let mut covered = Vec::new();
    for x in min_x..=max_x {
        let wrapped_x = x.rem_euclid(world);
        for y in (min_y..=max_y).filter(|y| (0..world).contains(y)) {
            covered.push(Covered {
                display: TileCoord::new(wrapped_x as u32, y as u32, display_zoom),
                data_key: format!(
                    "{}:{}:{}",
                    (wrapped_x as f64 / f).floor() as i64,
                    (y as f64 / f).floor() as i64,
                    data_zoom
                ),
            });
        }
    }
    covered
}

fn tile_key(tile: &PreparedTile, source: &str) -> String {
    format!("{}:{}", tile.data_tile.key(), source)
}

/// Display tiles around `bbox` that show labels from other data tiles
fn find_invalidated_tiles(
    index: &SpatialIndex,
    z: u8,
    dim: f64,
    bbox: &Bounds,
    own_data_key: &str,
    invalidated: &mut HashSet<TileCoord>,
) {
    for covered in covering(z, dim, bbox) {
        if covered.data_key != own_data_key && index.has_prefix(&covered.data_key) {
            invalidated.insert(covered.display);
        }
    }
}

fn crosses_footprint(bbox: &Bounds, tile: &PreparedTile) -> bool {
    bbox.max.x > tile.origin.x + tile.dim
        || bbox.min.x < tile.origin.x
        || bbox.min.y < tile.origin.y
        || bbox.max.y > tile.origin.y + tile.dim
}

pub struct Labeler {
    pub index: SpatialIndex,
    pub z: u8,
    measurer: Arc<dyn TextMeasurer>,
    label_rules: Arc<Vec<LabelRule>>,
    callback: Option<InvalidationCallback>,
}

impl Labeler {
    pub fn new(
        z: u8,
        measurer: Arc<dyn TextMeasurer>,
        label_rules: Arc<Vec<LabelRule>>,
        max_labeled_tiles: usize,
        callback: Option<InvalidationCallback>,
    ) -> Self {
        Self {
            index: SpatialIndex::new(z, max_labeled_tiles),
            z,
            measurer,
            label_rules,
            callback,
        }
    }

    /// Lays out labels for every tile not yet indexed and returns the
    /// elapsed time in milliseconds.
    pub fn layout(&mut self, prepared: &PreparedTileMap) -> f64 {
        let start = Instant::now();

        let mut keys_adding = Vec::new();
        for (source, tiles) in prepared {
            for tile in tiles {
                let key = tile_key(tile, source);
                if !self.index.has(&key) {
                    self.index.make_entry(&key);
                    keys_adding.push(key);
                }
            }
        }
        let adding: HashSet<&str> = keys_adding.iter().map(String::as_str).collect();

        let rules = Arc::clone(&self.label_rules);
        let mut invalidated = HashSet::default();
        let mut placed = 0usize;

        for (order, rule) in rules.iter().enumerate() {
            if !rule.applies_at(self.z) {
                continue;
            }
            let source = rule.source_name();
            let Some(tiles) = prepared.get(source) else {
                continue;
            };

            for tile in tiles {
                let key = tile_key(tile, source);
                if !adding.contains(key.as_str()) {
                    continue;
                }
                let Some(layer) = tile.data.layer(&rule.data_layer) else {
                    continue;
                };

                let mut features: Vec<&Feature> = layer.iter().collect();
                if let Some(sort) = &rule.sort {
                    features.sort_by(|a, b| sort(*a, *b));
                }

                let own_data_key = tile.data_tile.key();
                let overzoom = self.z.saturating_sub(tile.data_tile.z);

                for feature in features {
                    if !rule.accepts(self.z, feature) {
                        continue;
                    }
                    let geom = transform_geom(&feature.geom, tile.scale, tile.origin);
                    let labels = {
                        let ctx = LayoutContext {
                            index: &self.index,
                            zoom: self.z,
                            measurer: self.measurer.as_ref(),
                            order,
                            overzoom,
                        };
                        rule.symbolizer.place(&ctx, &geom, feature)
                    };
                    let Some(labels) = labels else {
                        continue;
                    };

                    for label in labels {
                        if self.index.deduplication_collides(&label) {
                            continue;
                        }

                        let added = if self.index.label_collides(&label, usize::MAX) {
                            if self.index.label_collides(&label, order) {
                                false
                            } else {
                                for conflict in self.index.search_label(&label, usize::MAX) {
                                    for bbox in self.index.remove_label(conflict) {
                                        find_invalidated_tiles(
                                            &self.index,
                                            self.z,
                                            tile.dim,
                                            &bbox,
                                            &own_data_key,
                                            &mut invalidated,
                                        );
                                    }
                                }
                                true
                            }
                        } else {
                            true
                        };
                        if !added {
                            continue;
                        }

                        let bboxes = label.bboxes.clone();
                        self.index.insert(label, order, &key);
                        placed += 1;
                        for bbox in bboxes.iter().filter(|b| crosses_footprint(b, tile)) {
                            find_invalidated_tiles(
                                &self.index,
                                self.z,
                                tile.dim,
                                bbox,
                                &own_data_key,
                                &mut invalidated,
                            );
                        }
                    }
                }
            }
        }

        for key in &keys_adding {
            self.index.prune_or_noop(key);
        }

        if !invalidated.is_empty() {
            if let Some(callback) = &self.callback {
                callback(&invalidated);
            }
        }

        let elapsed = start.elapsed().as_secs_f64() * 1000.0;
        log::debug!(
            "z{}: placed {} labels from {} new tiles in {:.2}ms",
            self.z,
            placed,
            keys_adding.len(),
            elapsed
        );
        elapsed
    }

    /// Lays out `prepared` unless every tile in it is already indexed, in
    /// which case this returns 0 without touching the index.
    pub fn add(&mut self, prepared: &PreparedTileMap) -> f64 {
        let all_added = prepared
            .iter()
            .all(|(source, tiles)| tiles.iter().all(|tile| self.index.has(&tile_key(tile, source))));
        if all_added {
            return 0.0;
        }
        self.layout(prepared)
    }
}

impl fmt::Debug for Labeler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Labeler")
            .field("z", &self.z)
            .field("index", &self.index)
            .field("rules", &self.label_rules.len())
            .finish()
    }
}

/// Per-zoom labelers sharing one rule set
pub struct Labelers {
    labelers: HashMap<u8, Labeler>,
    measurer: Arc<dyn TextMeasurer>,
    label_rules: Arc<Vec<LabelRule>>,
    max_labeled_tiles: usize,
    callback: Option<InvalidationCallback>,
}

impl Labelers {
    pub fn new(
        measurer: Arc<dyn TextMeasurer>,
        label_rules: Vec<LabelRule>,
        max_labeled_tiles: usize,
        callback: Option<InvalidationCallback>,
    ) -> Self {
        Self {
            labelers: HashMap::default(),
            measurer,
            label_rules: Arc::new(label_rules),
            max_labeled_tiles,
            callback,
        }
    }

    /// Lays out `prepared` at display zoom `z`. Zooms deeper than
    /// [`MAX_ZOOM`] are not labeled.
    pub fn add(&mut self, z: u8, prepared: &PreparedTileMap) -> f64 {
        if z > MAX_ZOOM {
            log::warn!("not labeling zoom {} (deepest is {})", z, MAX_ZOOM);
            return 0.0;
        }
        let labeler = self.labelers.entry(z).or_insert_with(|| {
            Labeler::new(
                z,
                Arc::clone(&self.measurer),
                Arc::clone(&self.label_rules),
                self.max_labeled_tiles,
                self.callback.clone(),
            )
        });
        labeler.add(prepared)
    }

    pub fn get_index(&self, z: u8) -> Option<&SpatialIndex> {
        self.labelers.get(&z).map(|labeler| &labeler.index)
    }

    pub fn rules(&self) -> &[LabelRule] {
        &self.label_rules
    }
}

impl fmt::Debug for Labelers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Labelers")
            .field("zooms", &self.labelers.keys().collect::<Vec<_>>())
            .field("max_labeled_tiles", &self.max_labeled_tiles)
            .finish()
    }
}
