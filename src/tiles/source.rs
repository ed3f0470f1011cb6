use crate::core::config::{SourceOptions, TileLoadingConfig};
use crate::core::geo::TileCoord;
use crate::tiles::decode::{parse_tile, DecodedTile};
use crate::tiles::loader::{fetch_bytes, ZoomAborts};
use crate::TileError;
use async_trait::async_trait;
use futures::future::Abortable;

/// Anything that can produce decoded vector tiles for a coordinate.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch and decode `coord`, scaling geometry so the tile spans `tile_size` pixels.
    async fn get(&self, coord: TileCoord, tile_size: u32) -> Result<DecodedTile, TileError>;
}

/// Vector tiles served from a `{z}/{x}/{y}` URL template.
pub struct ZxySource {
    url: String,
    zoom_aborts: ZoomAborts,
    loading: TileLoadingConfig,
}

impl ZxySource {
    pub fn new(url: impl Into<String>, cancel_stale_zooms: bool) -> Self {
        Self {
            url: url.into(),
            zoom_aborts: ZoomAborts::new(cancel_stale_zooms),
            loading: TileLoadingConfig::default(),
        }
    }

    pub fn from_options(options: &SourceOptions, loading: &TileLoadingConfig) -> Self {
        Self::new(options.url.clone(), options.cancel_stale_zooms).with_loading(loading.clone())
    }

    pub fn with_loading(mut self, loading: TileLoadingConfig) -> Self {
        self.loading = loading;
        self
    }

    /// Build a URL for the requested `coord`.
    pub fn url(&self, coord: TileCoord) -> String {
        self.url
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }
}

#[async_trait]
impl TileSource for ZxySource {
    async fn get(&self, coord: TileCoord, tile_size: u32) -> Result<DecodedTile, TileError> {
        let url = self.url(coord);
        let ticket = self.zoom_aborts.begin(coord.z);
        let fetched = Abortable::new(fetch_bytes(&url, &self.loading), ticket.registration).await;
        self.zoom_aborts.finish(ticket.id);

        match fetched {
            Err(_aborted) => {
                log::debug!("fetch of {} aborted by a zoom change", coord);
                Err(TileError::Aborted)
            }
            Ok(Ok(Some(bytes))) => {
                log::debug!("downloaded tile {} ({} bytes)", coord, bytes.len());
                parse_tile(&bytes, tile_size)
            }
            Ok(Ok(None)) => Ok(DecodedTile::default()),
            Ok(Err(err)) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_template() {
        let source = ZxySource::new("https://tiles.example.com/{z}/{x}/{y}.mvt?key=abc", true);
        assert_eq!(
            source.url(TileCoord::new(5, 11, 4)),
            "https://tiles.example.com/4/5/11.mvt?key=abc"
        );
    }
}
