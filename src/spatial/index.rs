use crate::core::{bounds::Bounds, constants::TILE_SIZE, geo::Point};
use crate::prelude::{HashMap, HashSet};
use crate::style::{draw::DrawFn, symbolizer::Label};

use rstar::{RTree, RTreeObject, AABB};
use std::fmt;

pub type LabelId = u64;

/// A placed label
#[derive(Clone)]
pub struct IndexedLabel {
    pub anchor: Point,
    pub bboxes: Vec<Bounds>,
    pub draw: DrawFn,
    /// Rule position; lower wins
    pub order: usize,
    /// `"x:y:z:source"` of the data tile the label came from
    pub tile_key: String,
    pub deduplication_key: Option<String>,
    pub deduplication_distance: Option<f64>,
    /// Copy shifted one world width across the antimeridian
    pub twin: Option<LabelId>,
}

impl fmt::Debug for IndexedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedLabel")
            .field("anchor", &self.anchor)
            .field("bboxes", &self.bboxes)
            .field("order", &self.order)
            .field("tile_key", &self.tile_key)
            .field("deduplication_key", &self.deduplication_key)
            .field("twin", &self.twin)
            .finish()
    }
}

/// One bbox of one label, as stored in the R-tree
#[derive(Debug, Clone, Copy, PartialEq)]
struct LabelEntry {
    bbox: Bounds,
    label: LabelId,
}

// --- rstar integration -------------------------------------------------------------------------

impl RTreeObject for LabelEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox.to_aabb()
    }
}

/// Splits `"x:y:z:source"`. The source name may itself contain colons.
fn parse_tile_key(key: &str) -> Option<(i64, i64, &str)> {
    let mut parts = key.splitn(4, ':');
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let _z = parts.next()?;
    Some((x, y, parts.next().unwrap_or_default()))
}

/// Placed labels for one display zoom.
///
/// Labels live in an arena keyed by [`LabelId`]; the R-tree holds one
/// entry per label bbox and `current` groups ids by the data tile they were
/// laid out from.
pub struct SpatialIndex {
    tree: RTree<LabelEntry>,
    labels: HashMap<LabelId, IndexedLabel>,
    current: HashMap<String, HashSet<LabelId>>,
    next_id: LabelId,
    /// Width of the world in pixels at this zoom
    dim: f64,
    max_labeled_tiles: usize,
}

impl SpatialIndex {
    pub fn new(z: u8, max_labeled_tiles: usize) -> Self {
        Self {
            tree: RTree::new(),
            labels: HashMap::default(),
            current: HashMap::default(),
            next_id: 0,
            dim: TILE_SIZE as f64 * 2_f64.powi(z as i32),
            max_labeled_tiles,
        }
    }

    pub fn dim(&self) -> f64 {
        self.dim
    }

    pub fn has(&self, tile_key: &str) -> bool {
        self.current.contains_key(tile_key)
    }

    /// True if any tile key belongs to the data tile `"x:y:z"`
    pub fn has_prefix(&self, data_tile_key: &str) -> bool {
        let prefix = format!("{}:", data_tile_key);
        self.current.keys().any(|key| key.starts_with(&prefix))
    }

    /// Number of tile keys
    pub fn size(&self) -> usize {
        self.current.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.current.keys()
    }

    /// Number of labels, twins included
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, id: LabelId) -> Option<&IndexedLabel> {
        self.labels.get(&id)
    }

    /// Labels under a tile key
    pub fn labels_for_key(&self, tile_key: &str) -> Vec<LabelId> {
        let mut ids: Vec<_> = self
            .current
            .get(tile_key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    fn matches(&self, bbox: &Bounds, order: usize) -> impl Iterator<Item = LabelId> + '_ {
        let labels = &self.labels;
        self.tree
            .locate_in_envelope_intersecting(&bbox.to_aabb())
            .map(|entry| entry.label)
            .filter(move |id| labels.get(id).map_or(false, |label| label.order <= order))
    }

    /// Labels of priority `order` or higher touching `bbox`
    pub fn search_bbox(&self, bbox: &Bounds, order: usize) -> HashSet<LabelId> {
        self.matches(bbox, order).collect()
    }

    pub fn search_label(&self, label: &Label, order: usize) -> HashSet<LabelId> {
        label
            .bboxes
            .iter()
            .flat_map(|bbox| self.matches(bbox, order))
            .collect()
    }

    pub fn bbox_collides(&self, bbox: &Bounds, order: usize) -> bool {
        self.matches(bbox, order).next().is_some()
    }

    pub fn label_collides(&self, label: &Label, order: usize) -> bool {
        label
            .bboxes
            .iter()
            .any(|bbox| self.bbox_collides(bbox, order))
    }

    /// True if a label with the same deduplication key is anchored closer
    /// than the candidate's deduplication distance.
    pub fn deduplication_collides(&self, label: &Label) -> bool {
        let (Some(key), Some(dist)) = (&label.deduplication_key, label.deduplication_distance) else {
            return false;
        };
        if dist <= 0.0 {
            return false;
        }
        let query = Bounds::around(label.anchor, dist);
        self.tree
            .locate_in_envelope_intersecting(&query.to_aabb())
            .filter_map(|entry| self.labels.get(&entry.label))
            .any(|other| {
                other.deduplication_key.as_deref() == Some(key.as_str())
                    && other.anchor.distance_to(&label.anchor) < dist
            })
    }

    pub fn make_entry(&mut self, tile_key: &str) {
        if self.current.contains_key(tile_key) {
            log::warn!("tile key {} already indexed", tile_key);
            return;
        }
        self.current.insert(tile_key.to_string(), HashSet::default());
    }

    fn add(&mut self, label: IndexedLabel) -> LabelId {
        let id = self.next_id;
        self.next_id += 1;
        for bbox in &label.bboxes {
            self.tree.insert(LabelEntry { bbox: *bbox, label: id });
        }
        self.current
            .entry(label.tile_key.clone())
            .or_default()
            .insert(id);
        self.labels.insert(id, label);
        id
    }

    /// Places `label`. A label crossing either world edge also gets a twin
    /// shifted one world width so it collides on the other side.
    pub fn insert(&mut self, label: Label, order: usize, tile_key: &str) -> LabelId {
        let wraps_left = label.bboxes.iter().any(|b| b.min.x < 0.0);
        let wraps_right = label.bboxes.iter().any(|b| b.max.x > self.dim);

        let twin = (wraps_left || wraps_right).then(|| {
            let shift = if wraps_left { self.dim } else { -self.dim };
            IndexedLabel {
                anchor: Point::new(label.anchor.x + shift, label.anchor.y),
                bboxes: label.bboxes.iter().map(|b| b.shifted_x(shift)).collect(),
                draw: label.draw.clone(),
                order,
                tile_key: tile_key.to_string(),
                deduplication_key: None,
                deduplication_distance: None,
                twin: None,
            }
        });

        let id = self.add(IndexedLabel {
            anchor: label.anchor,
            bboxes: label.bboxes,
            draw: label.draw,
            order,
            tile_key: tile_key.to_string(),
            deduplication_key: label.deduplication_key,
            deduplication_distance: label.deduplication_distance,
            twin: None,
        });

        if let Some(mut twin) = twin {
            twin.twin = Some(id);
            let twin_id = self.add(twin);
            if let Some(original) = self.labels.get_mut(&id) {
                original.twin = Some(twin_id);
            }
        }
        id
    }

    fn remove_one(&mut self, id: LabelId) -> Option<IndexedLabel> {
        let label = self.labels.remove(&id)?;
        for bbox in &label.bboxes {
            self.tree.remove(&LabelEntry { bbox: *bbox, label: id });
        }
        if let Some(ids) = self.current.get_mut(&label.tile_key) {
            ids.remove(&id);
        }
        Some(label)
    }

    /// Evicts a label and its twin, returning every bbox they occupied.
    pub fn remove_label(&mut self, id: LabelId) -> Vec<Bounds> {
        let Some(label) = self.remove_one(id) else {
            return Vec::new();
        };
        let mut bboxes = label.bboxes;
        if let Some(twin) = label.twin.and_then(|twin| self.remove_one(twin)) {
            bboxes.extend(twin.bboxes);
        }
        bboxes
    }

    /// Drops a tile key and every label laid out under it.
    pub fn prune_key(&mut self, tile_key: &str) {
        let Some(ids) = self.current.remove(tile_key) else {
            return;
        };
        for id in ids {
            if let Some(label) = self.labels.remove(&id) {
                for bbox in &label.bboxes {
                    self.tree.remove(&LabelEntry { bbox: *bbox, label: id });
                }
            }
        }
        log::debug!("pruned labels of {}", tile_key);
    }

    /// After adding `key_added`, prunes the same source's tile key farthest
    /// from it once the source holds more than the allowed number of keys.
    pub fn prune_or_noop(&mut self, key_added: &str) {
        let Some((ax, ay, source)) = parse_tile_key(key_added) else {
            return;
        };

        let mut keys_for_source = 0;
        let mut farthest: Option<(&String, f64)> = None;
        for key in self.current.keys() {
            let Some((x, y, other)) = parse_tile_key(key) else {
                continue;
            };
            if other != source {
                continue;
            }
            keys_for_source += 1;
            let dist = (((x - ax).pow(2) + (y - ay).pow(2)) as f64).sqrt();
            if dist > farthest.map_or(0.0, |(_, d)| d) {
                farthest = Some((key, dist));
            }
        }

        if keys_for_source > self.max_labeled_tiles {
            if let Some((key, _)) = farthest {
                let key = key.clone();
                self.prune_key(&key);
            }
        }
    }

    /// Distinct labels touching `region`, in priority order
    pub fn labels_in(&self, region: &Bounds) -> Vec<&IndexedLabel> {
        let mut ids: Vec<LabelId> = self.search_bbox(region, usize::MAX).into_iter().collect();
        ids.sort_unstable_by_key(|id| (self.labels[id].order, *id));
        ids.iter().map(|id| &self.labels[id]).collect()
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("dim", &self.dim)
            .field("keys", &self.current.len())
            .field("labels", &self.labels.len())
            .finish()
    }
}
