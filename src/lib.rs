//! # maplet-vector
//!
//! Vector tile plumbing for maplet: resolves display tiles into stored data
//! tiles, fetches and decodes them through a coalescing LRU cache, and places
//! non-overlapping labels with priority-based eviction and deduplication.
//!
//! Rasterization is left to the host; this crate only decides what is placed
//! and where.

pub mod core;
pub mod prelude;
pub mod spatial;
pub mod style;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    config::{LabelingConfig, MapOptions, SourceOptions, TileLoadingConfig},
    geo::{LatLng, Point, TileCoord},
    map::Map,
};

pub use tiles::{
    cache::{QueryFeature, TileCache},
    decode::{DecodedTile, Feature, GeomType, PropValue},
    pmtiles::PmtilesSource,
    source::{TileSource, ZxySource},
    view::{sources_to_views, DataTileDescriptor, PreparedTile, PreparedTileMap, View},
};

pub use spatial::{
    index::{IndexedLabel, LabelId, SpatialIndex},
    labeler::{Labeler, Labelers},
};

pub use style::{
    attr::{Attr, FontAttr, TextAttr},
    draw::{paint_labels, DrawCommand, DrawSurface, RecordingSurface},
    rule::LabelRule,
    symbolizer::{Label, LabelSymbolizer, LayoutContext},
};

/// Failure of a single tile fetch.
///
/// Cloneable so that every caller waiting on a coalesced request receives
/// the same outcome.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TileError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Tile request aborted")]
    Aborted,
}

impl From<reqwest::Error> for TileError {
    fn from(err: reqwest::Error) -> Self {
        TileError::Network(err.to_string())
    }
}

impl From<std::io::Error> for TileError {
    fn from(err: std::io::Error) -> Self {
        TileError::Io(err.to_string())
    }
}

/// Installs an `env_logger` that honours `RUST_LOG`, defaulting to info for
/// this crate. Repeated calls are no-ops.
#[cfg(feature = "debug")]
pub fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("maplet_vector=info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tile error: {0}")]
    Tile(#[from] TileError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid source: {0}")]
    InvalidSource(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;
