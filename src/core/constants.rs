//! Core constants derived from protomaps/Leaflet defaults and common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Square size of one display tile in CSS pixels.
pub const TILE_SIZE: u32 = 256;

/// Number of decoded tiles a `TileCache` keeps before evicting the least recently used.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Vector tile extent assumed when a layer does not declare one.
pub const DEFAULT_TILE_EXTENT: u32 = 4096;

/// Zoom offset between display tiles and stored data tiles.
pub const DEFAULT_LEVEL_DIFF: u8 = 1;

/// Deepest zoom a vector source is assumed to carry data for.
pub const DEFAULT_MAX_DATA_ZOOM: u8 = 15;

/// Largest accepted level diff (data tiles of 65536 pixels).
pub const MAX_LEVEL_DIFF: u8 = 8;

/// Deepest zoom labels are laid out at; also bounds configured data zooms.
pub const MAX_ZOOM: u8 = 30;

/// Labeled data tiles kept per data source before the farthest one is pruned.
pub const DEFAULT_MAX_LABELED_TILES: usize = 16;

/// Features whose bbox is smaller than this in both directions get no line label.
pub const MIN_LABELABLE_DIM: f64 = 20.0;

/// Overzoom above which line-label repeat distance starts doubling.
pub const LINE_LABEL_OVERZOOM_THRESHOLD: u8 = 4;

/// Web Mercator sphere radius in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which Web Mercator is clipped.
pub const MAX_LATITUDE: f64 = 85.0511287798;
