pub mod cache;
pub mod decode;
pub mod loader;
pub mod pmtiles;
pub mod query;
pub mod source;
pub mod view;

// Re-exports for convenience
pub use cache::{CacheStats, QueryFeature, TileCache};
pub use decode::{parse_tile, DecodedTile, Feature, GeomType, PropValue};
pub use pmtiles::PmtilesSource;
pub use source::{TileSource, ZxySource};
pub use view::{sources_to_views, DataTileDescriptor, PreparedTile, PreparedTileMap, View};
