//! Display tile to data tile resolution.
//!
//! A display tile at zoom `z` is drawn from the data tile `level_diff`
//! zooms above it. Below `level_diff` everything comes from the root tile
//! scaled down; above `level_diff + max_data_level` the deepest data tile is
//! overzoomed.

use crate::core::{
    bounds::Bounds,
    config::{MapOptions, SourceOptions, TileLoadingConfig},
    constants::TILE_SIZE,
    geo::{wrap, Point, TileCoord},
};
use crate::prelude::{Arc, HashMap};
use crate::tiles::{
    cache::{QueryFeature, TileCache},
    decode::DecodedTile,
    pmtiles::PmtilesSource,
    source::{TileSource, ZxySource},
};
use crate::{Result, TileError};

/// Where a data tile lands in zoom-global pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataTileDescriptor {
    pub data_tile: TileCoord,
    pub origin: Point,
    pub scale: f64,
    pub dim: f64,
}

/// Decoded data tile positioned for one display zoom
#[derive(Debug, Clone)]
pub struct PreparedTile {
    pub data: Arc<DecodedTile>,
    /// Display zoom (ceiled for fractional bbox requests)
    pub z: u8,
    pub data_tile: TileCoord,
    pub scale: f64,
    pub origin: Point,
    pub dim: f64,
}

/// Prepared tiles keyed by data source name
pub type PreparedTileMap = HashMap<String, Vec<PreparedTile>>;

/// Scales tile-local geometry and moves it to `translate`.
pub fn transform_geom(geom: &[Vec<Point>], scale: f64, translate: Point) -> Vec<Vec<Point>> {
    geom.iter()
        .map(|part| {
            part.iter()
                .map(|p| p.multiply(scale).add(&translate))
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct View {
    cache: TileCache,
    max_data_level: u8,
    level_diff: u8,
}

impl View {
    pub fn new(cache: TileCache, max_data_level: u8, level_diff: u8) -> Self {
        Self {
            cache,
            max_data_level,
            level_diff,
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn max_data_level(&self) -> u8 {
        self.max_data_level
    }

    pub fn level_diff(&self) -> u8 {
        self.level_diff
    }

    pub fn resolve_tile(&self, display: TileCoord) -> DataTileDescriptor {
        let tile_size = self.cache.tile_size() as f64;
        let base = TILE_SIZE as f64;
        let ld = self.level_diff;

        if display.z < ld {
            let scale = 1.0 / (1_u64 << (ld - display.z)) as f64;
            return DataTileDescriptor {
                data_tile: TileCoord::new(0, 0, 0),
                origin: Point::new(0.0, 0.0),
                scale,
                dim: tile_size * scale,
            };
        }

        let f = (1_u64 << ld) as f64;
        if display.z <= ld.saturating_add(self.max_data_level) {
            let z = display.z - ld;
            let x = (display.x as f64 / f).floor();
            let y = (display.y as f64 / f).floor();
            DataTileDescriptor {
                data_tile: TileCoord::wrapped(x as i64, y as i64, z),
                origin: Point::new(x * f * base, y * f * base),
                scale: 1.0,
                dim: tile_size,
            }
        } else {
            let scale = (1_u64 << (display.z - self.max_data_level - ld)) as f64;
            let x = (display.x as f64 / f / scale).floor();
            let y = (display.y as f64 / f / scale).floor();
            DataTileDescriptor {
                data_tile: TileCoord::wrapped(x as i64, y as i64, self.max_data_level),
                origin: Point::new(x * f * scale * base, y * f * scale * base),
                scale,
                dim: tile_size * scale,
            }
        }
    }

    /// Data tiles covering `bounds` (zoom-global pixels) at a possibly
    /// fractional `zoom`, edges inclusive, x-major.
    pub fn resolve_bounds(&self, zoom: f64, bounds: &Bounds) -> Vec<DataTileDescriptor> {
        let ceiled = zoom.ceil().max(0.0);
        let fractional = 2_f64.powf(zoom) / 2_f64.powf(ceiled);
        let ceiled = ceiled as u8;
        let tile_size = self.cache.tile_size() as f64;
        let ld = self.level_diff;

        if ceiled < ld {
            let scale = fractional / (1_u64 << (ld - ceiled)) as f64;
            return vec![DataTileDescriptor {
                data_tile: TileCoord::new(0, 0, 0),
                origin: Point::new(0.0, 0.0),
                scale,
                dim: tile_size * scale,
            }];
        }

        let f = (1_u64 << ld) as f64;
        let (data_zoom, scale, span) = if ceiled <= ld.saturating_add(self.max_data_level) {
            (ceiled - ld, fractional, TILE_SIZE as f64 * fractional)
        } else {
            let scale = (1_u64 << (ceiled - self.max_data_level - ld)) as f64 * fractional;
            (self.max_data_level, scale, TILE_SIZE as f64 * scale)
        };

        let min_x = (bounds.min.x / f / span).floor() as i64;
        let min_y = (bounds.min.y / f / span).floor() as i64;
        let max_x = (bounds.max.x / f / span).floor() as i64;
        let max_y = (bounds.max.y / f / span).floor() as i64;

        let mut needed = Vec::new();
        for tx in min_x..=max_x {
            for ty in min_y..=max_y {
                needed.push(DataTileDescriptor {
                    data_tile: TileCoord::new(wrap(tx, data_zoom), wrap(ty, data_zoom), data_zoom),
                    origin: Point::new(tx as f64 * f * span, ty as f64 * f * span),
                    scale,
                    dim: tile_size * scale,
                });
            }
        }
        needed
    }

    pub async fn get_display_tile(&self, display: TileCoord) -> std::result::Result<PreparedTile, TileError> {
        let descriptor = self.resolve_tile(display);
        let data = self.cache.get(descriptor.data_tile).await?;
        Ok(prepared(data, display.z, &descriptor))
    }

    /// Fetches every data tile under `bounds` concurrently, preserving order.
    pub async fn get_bbox(
        &self,
        zoom: f64,
        bounds: &Bounds,
    ) -> std::result::Result<Vec<PreparedTile>, TileError> {
        let needed = self.resolve_bounds(zoom, bounds);
        let data = futures::future::try_join_all(
            needed.iter().map(|descriptor| self.cache.get(descriptor.data_tile)),
        )
        .await?;
        let z = zoom.ceil().max(0.0) as u8;
        Ok(data
            .into_iter()
            .zip(needed.iter())
            .map(|(data, descriptor)| prepared(data, z, descriptor))
            .collect())
    }

    /// Hit-test cached data under a geographic point at a display zoom.
    /// `brush` is in display pixels.
    pub fn query_features(&self, lng: f64, lat: f64, display_zoom: f64, brush: f64) -> Vec<QueryFeature> {
        let rounded = display_zoom.round().max(0.0) as i32;
        let data_zoom = (rounded - self.level_diff as i32)
            .min(self.max_data_level as i32)
            .max(0);
        let brush_at_zoom = brush / 2_f64.powi(rounded - data_zoom);
        self.cache
            .query_features(lng, lat, data_zoom as u8, brush_at_zoom)
    }
}

fn prepared(data: Arc<DecodedTile>, z: u8, descriptor: &DataTileDescriptor) -> PreparedTile {
    PreparedTile {
        data,
        z,
        data_tile: descriptor.data_tile,
        scale: descriptor.scale,
        origin: descriptor.origin,
        dim: descriptor.dim,
    }
}

fn source_for(options: &SourceOptions, loading: &TileLoadingConfig) -> Result<Arc<dyn TileSource>> {
    if options.url.is_empty() {
        return Err(crate::MapError::InvalidSource("empty url".into()));
    }
    if options.is_pmtiles() {
        let path = options
            .url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        Ok(Arc::new(PmtilesSource::open(path, options.cancel_stale_zooms)?))
    } else {
        Ok(Arc::new(ZxySource::from_options(options, loading)))
    }
}

/// One [`View`] per configured data source, keyed by source name.
pub fn sources_to_views(options: &MapOptions) -> Result<HashMap<String, View>> {
    let mut views = HashMap::default();
    for (name, source_options) in options.resolved_sources()? {
        let source = source_for(&source_options, &options.tile_loading)?;
        let cache = TileCache::with_capacity(
            source,
            source_options.tile_size(),
            options.tile_loading.cache_size,
        );
        log::info!(
            "source {:?}: {} (level diff {}, max data zoom {})",
            name,
            source_options.url,
            source_options.level_diff,
            source_options.max_data_zoom
        );
        views.insert(
            name,
            View::new(cache, source_options.max_data_zoom, source_options.level_diff),
        );
    }
    Ok(views)
}
