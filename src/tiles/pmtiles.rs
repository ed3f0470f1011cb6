//! Vector tiles from a local PMTiles v3 archive.
//!
//! Directory lookup is done by `pmtiles2`; this module adds tile
//! decompression, stale-zoom cancellation and MVT decoding on top.

use crate::core::geo::TileCoord;
use crate::prelude::{Arc, Mutex};
use crate::tiles::decode::{parse_tile, DecodedTile};
use crate::tiles::loader::ZoomAborts;
use crate::tiles::source::TileSource;
use crate::TileError;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use futures::future::Abortable;
use pmtiles2::{Compression as PmtilesCompression, PMTiles};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

type Archive = PMTiles<BufReader<File>>;

fn decompress(bytes: Vec<u8>, compression: PmtilesCompression) -> Result<Vec<u8>, TileError> {
    match compression {
        PmtilesCompression::None | PmtilesCompression::Unknown => Ok(bytes),
        PmtilesCompression::GZip => {
            let mut out = Vec::new();
            GzDecoder::new(bytes.as_slice()).read_to_end(&mut out)?;
            Ok(out)
        }
        other => Err(TileError::Archive(format!(
            "unsupported tile compression {:?}",
            other
        ))),
    }
}

fn read_tile(archive: &Mutex<Archive>, coord: TileCoord) -> Result<Option<Vec<u8>>, TileError> {
    let mut archive = archive.lock().unwrap_or_else(|e| e.into_inner());
    archive
        .get_tile(coord.x as u64, coord.y as u64, coord.z)
        .map_err(|e| TileError::Archive(format!("reading {}: {}", coord, e)))
}

/// Vector tiles from a local PMTiles v3 archive.
pub struct PmtilesSource {
    archive: Arc<Mutex<Archive>>,
    tile_compression: PmtilesCompression,
    min_zoom: u8,
    max_zoom: u8,
    zoom_aborts: ZoomAborts,
}

impl PmtilesSource {
    pub fn open(path: impl AsRef<Path>, cancel_stale_zooms: bool) -> Result<Self, TileError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let archive = PMTiles::from_reader(reader)
            .map_err(|e| TileError::Archive(format!("{}: {}", path.display(), e)))?;
        log::info!(
            "opened {} (zooms {}-{}, tile compression {:?})",
            path.display(),
            archive.min_zoom,
            archive.max_zoom,
            archive.tile_compression
        );

        Ok(Self {
            tile_compression: archive.tile_compression,
            min_zoom: archive.min_zoom,
            max_zoom: archive.max_zoom,
            archive: Arc::new(Mutex::new(archive)),
            zoom_aborts: ZoomAborts::new(cancel_stale_zooms),
        })
    }

    /// Zoom levels the archive header declares
    pub fn zoom_range(&self) -> (u8, u8) {
        (self.min_zoom, self.max_zoom)
    }

    /// Raw (still tile-compressed) bytes for `coord`, or `None` if absent
    async fn tile_bytes(&self, coord: TileCoord) -> Result<Option<Vec<u8>>, TileError> {
        if coord.z < self.min_zoom || coord.z > self.max_zoom {
            return Ok(None);
        }
        let archive = Arc::clone(&self.archive);
        let read = move || read_tile(&archive, coord);

        #[cfg(feature = "tokio-runtime")]
        {
            if tokio::runtime::Handle::try_current().is_ok() {
                return tokio::task::spawn_blocking(read)
                    .await
                    .map_err(|e| TileError::Io(e.to_string()))?;
            }
        }

        read()
    }
}

#[async_trait]
impl TileSource for PmtilesSource {
    async fn get(&self, coord: TileCoord, tile_size: u32) -> Result<DecodedTile, TileError> {
        let ticket = self.zoom_aborts.begin(coord.z);
        let fetched = Abortable::new(self.tile_bytes(coord), ticket.registration).await;
        self.zoom_aborts.finish(ticket.id);

        match fetched {
            Err(_aborted) => {
                log::debug!("read of {} aborted by a zoom change", coord);
                Err(TileError::Aborted)
            }
            Ok(Ok(Some(bytes))) => {
                let bytes = decompress(bytes, self.tile_compression)?;
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
    use crate::tiles::decode::tests::{command, zz};
    use flate2::write::GzEncoder;
    use geozero::mvt::{tile, Message, Tile};
    use pmtiles2::{util::tile_id, TileType};
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn point_tile() -> Vec<u8> {
        Tile {
            layers: vec![tile::Layer {
                version: 2,
                name: "places".into(),
                features: vec![tile::Feature {
                    id: Some(1),
                    tags: vec![],
                    r#type: Some(tile::GeomType::Point as i32),
                    geometry: vec![command(1, 1), zz(2048), zz(2048)],
                }],
                keys: vec![],
                values: vec![],
                extent: Some(4096),
            }],
        }
        .encode_to_vec()
    }

    fn write_archive(path: &Path) {
        let mut archive = PMTiles::new(TileType::Mvt, PmtilesCompression::GZip);
        archive.min_zoom = 0;
        archive.max_zoom = 4;
        archive.add_tile(tile_id(1, 1, 0), gzip(&point_tile())).unwrap();

        let mut file = File::create(path).unwrap();
        archive.to_writer(&mut file).unwrap();
    }

    #[test]
    fn test_decompress_passthrough_and_gzip() {
        let raw = point_tile();
        assert_eq!(decompress(raw.clone(), PmtilesCompression::None).unwrap(), raw);
        assert_eq!(decompress(gzip(&raw), PmtilesCompression::GZip).unwrap(), raw);
        assert!(matches!(
            decompress(raw, PmtilesCompression::Brotli),
            Err(TileError::Archive(_))
        ));
    }

    #[tokio::test]
    async fn test_read_archive_tile() {
        let path = std::env::temp_dir().join(format!("maplet-vector-{}.pmtiles", std::process::id()));
        write_archive(&path);

        let source = PmtilesSource::open(&path, true).unwrap();

        let tile = source.get(TileCoord::new(1, 0, 1), 512).await.unwrap();
        let places = tile.layer("places").unwrap();
        assert_eq!(places[0].geom[0][0], crate::core::geo::Point::new(256.0, 256.0));

        let missing = source.get(TileCoord::new(0, 0, 1), 512).await.unwrap();
        assert!(missing.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_open_rejects_non_archive() {
        let path = std::env::temp_dir().join(format!("maplet-vector-bad-{}.pmtiles", std::process::id()));
        std::fs::write(&path, b"definitely not a pmtiles archive").unwrap();

        assert!(PmtilesSource::open(&path, false).is_err());

        let _ = std::fs::remove_file(&path);
    }
}
