use crate::core::constants::DEFAULT_CACHE_CAPACITY;
use crate::core::geo::{LatLng, Point, TileCoord};
use crate::prelude::{Arc, HashMap, Instant, Mutex};
use crate::tiles::decode::{DecodedTile, Feature, GeomType};
use crate::tiles::query::{point_in_polygon, point_min_dist_to_lines, point_min_dist_to_points};
use crate::tiles::source::TileSource;
use crate::TileError;
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::MutexGuard;

type TileResult = Result<Arc<DecodedTile>, TileError>;

/// One fetch, shared by every caller that asks for its coordinate
type SharedFetch = Shared<BoxFuture<'static, TileResult>>;

struct CacheEntry {
    data: Arc<DecodedTile>,
    last_used: Instant,
}

struct CacheState {
    entries: LruCache<TileCoord, CacheEntry>,
    /// Coordinates being fetched
    inflight: HashMap<TileCoord, SharedFetch>,
    hits: u64,
    misses: u64,
    coalesced: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    /// Fetches issued to the source
    pub misses: u64,
    /// Requests that joined a fetch already in flight
    pub coalesced: u64,
    pub size: usize,
}

/// Feature returned by a hit-test query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFeature {
    pub feature: Feature,
    pub layer_name: String,
}

/// Bounded LRU cache of decoded tiles over a [`TileSource`].
///
/// Concurrent requests for the same coordinate share a single fetch. Failed
/// fetches are never cached.
#[derive(Clone)]
pub struct TileCache {
    source: Arc<dyn TileSource>,
    tile_size: u32,
    state: Arc<Mutex<CacheState>>,
}

impl TileCache {
    /// Create a new tile cache with the default capacity (64 tiles)
    pub fn new(source: Arc<dyn TileSource>, tile_size: u32) -> Self {
        Self::with_capacity(source, tile_size, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(source: Arc<dyn TileSource>, tile_size: u32, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            tile_size,
            state: Arc::new(Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                inflight: HashMap::default(),
                hits: 0,
                misses: 0,
                coalesced: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Decoded tile for `coord`, fetching it at most once however many
    /// callers ask concurrently.
    ///
    /// The fetch does not belong to the caller that started it: dropping any
    /// caller's future leaves the others waiting on the same outcome.
    pub async fn get(&self, coord: TileCoord) -> TileResult {
        let (fetch, started) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            if let Some(entry) = state.entries.get_mut(&coord) {
                entry.last_used = Instant::now();
                state.hits += 1;
                return Ok(Arc::clone(&entry.data));
            }
            if let Some(fetch) = state.inflight.get(&coord) {
                state.coalesced += 1;
                log::debug!("joining in-flight fetch of {}", coord);
                (fetch.clone(), false)
            } else {
                state.misses += 1;
                let fetch = self.fetch(coord);
                state.inflight.insert(coord, fetch.clone());
                (fetch, true)
            }
        };

        #[cfg(feature = "tokio-runtime")]
        {
            // Drive the fetch to completion even if every caller goes away.
            if started {
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(fetch.clone());
                }
            }
        }
        #[cfg(not(feature = "tokio-runtime"))]
        let _ = started;

        fetch.await
    }

    fn fetch(&self, coord: TileCoord) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let tile_size = self.tile_size;
        async move {
            let result = source.get(coord, tile_size).await.map(Arc::new);
            settle(&state, coord, &result);
            result
        }
        .boxed()
        .shared()
    }

    /// Features of the cached tile under (`lng`, `lat`) at `zoom` that lie
    /// within `radius` pixels of the point. Does not touch the LRU order.
    pub fn query_features(&self, lng: f64, lat: f64, zoom: u8, radius: f64) -> Vec<QueryFeature> {
        let on_zoom = LatLng::new(lat, lng)
            .to_normalized()
            .multiply((1_u64 << zoom) as f64);
        let tile = on_zoom.floor();
        let coord = TileCoord::wrapped(tile.x as i64, tile.y as i64, zoom);

        let state = self.lock();
        let Some(entry) = state.entries.peek(&coord) else {
            return Vec::new();
        };

        let size = self.tile_size as f64;
        let center = Point::new((on_zoom.x - tile.x) * size, (on_zoom.y - tile.y) * size);

        let mut results = Vec::new();
        for (layer_name, features) in &entry.data.layers {
            for feature in features {
                let hit = match feature.geom_type {
                    GeomType::Point => point_min_dist_to_points(&center, &feature.geom) < radius,
                    GeomType::Line => point_min_dist_to_lines(&center, &feature.geom) < radius,
                    GeomType::Polygon => point_in_polygon(&center, &feature.geom),
                };
                if hit {
                    results.push(QueryFeature {
                        feature: feature.clone(),
                        layer_name: layer_name.clone(),
                    });
                }
            }
        }
        results
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            coalesced: state.coalesced,
            size: state.entries.len(),
        }
    }

    /// When `coord` was last served from the cache
    pub fn last_used(&self, coord: &TileCoord) -> Option<Instant> {
        self.lock().entries.peek(coord).map(|entry| entry.last_used)
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.lock().entries.contains(coord)
    }

    pub fn is_inflight(&self, coord: &TileCoord) -> bool {
        self.lock().inflight.contains_key(coord)
    }

    /// Drops every cached tile. Fetches in flight are unaffected.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().entries.cap().get()
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache")
            .field("tile_size", &self.tile_size)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Records the outcome of a fetch: success is cached, failure is not, and
/// either way the coordinate stops being in flight.
fn settle(state: &Mutex<CacheState>, coord: TileCoord, result: &TileResult) {
    let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
    state.inflight.remove(&coord);
    match result {
        Ok(data) => {
            let entry = CacheEntry {
                data: Arc::clone(data),
                last_used: Instant::now(),
            };
            if let Some((evicted, _)) = state.entries.push(coord, entry) {
                if evicted != coord {
                    log::debug!("evicted tile {} from cache", evicted);
                }
            }
        }
        Err(err) => log::debug!("fetch of {} failed: {}", coord, err),
    }
}
