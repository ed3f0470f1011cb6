mod common;

use async_trait::async_trait;
use common::{init_logging, MockSource};
use futures::future::{join_all, try_join_all, Abortable};
use maplet_vector::prelude::*;
use maplet_vector::tiles::loader::ZoomAborts;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers `failing` quickly with an error and every other tile slowly
struct MixedSource {
    failing: TileCoord,
    calls: AtomicUsize,
}

#[async_trait]
impl TileSource for MixedSource {
    async fn get(&self, coord: TileCoord, _tile_size: u32) -> std::result::Result<DecodedTile, TileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if coord == self.failing {
            tokio::time::sleep(Duration::from_millis(5)).await;
            return Err(TileError::Network(format!("{} unavailable", coord)));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(DecodedTile::default())
    }
}

/// Slow source that sheds requests for zooms the viewer has left
struct ZoomAwareSource {
    aborts: ZoomAborts,
    calls: AtomicUsize,
}

#[async_trait]
impl TileSource for ZoomAwareSource {
    async fn get(&self, coord: TileCoord, _tile_size: u32) -> std::result::Result<DecodedTile, TileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ticket = self.aborts.begin(coord.z);
        let fetched = Abortable::new(
            tokio::time::sleep(Duration::from_millis(100)),
            ticket.registration,
        )
        .await;
        self.aborts.finish(ticket.id);
        match fetched {
            Ok(()) => Ok(DecodedTile::default()),
            Err(_) => Err(TileError::Aborted),
        }
    }
}

#[cfg(test)]
mod tile_cache_tests {
    use super::*;

    fn cache_over(source: &Arc<MockSource>) -> TileCache {
        TileCache::new(source.clone() as Arc<dyn TileSource>, 512)
    }

    /// Concurrent requests for one coordinate share a single fetch
    #[tokio::test]
    async fn test_concurrent_gets_fetch_once() {
        init_logging();
        let source = MockSource::new(50);
        let cache = cache_over(&source);
        let coord = TileCoord::new(3, 2, 4);

        let results = join_all((0..5).map(|_| cache.get(coord))).await;

        assert_eq!(source.calls(), 1);
        let first = results[0].as_ref().expect("fetch should succeed").clone();
        for result in &results {
            let tile = result.as_ref().expect("every waiter gets the tile");
            assert!(Arc::ptr_eq(tile, &first));
        }
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.coalesced, 4);
        assert_eq!(stats.size, 1);

        // Cached now: no further fetch
        cache.get(coord).await.expect("cached tile");
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    /// A failed fetch reaches every waiter, is not cached, and the next get retries
    #[tokio::test]
    async fn test_failure_is_shared_and_not_cached() {
        init_logging();
        let source = MockSource::new(30);
        source.set_failing(true);
        let cache = cache_over(&source);
        let coord = TileCoord::new(1, 1, 2);

        let results = join_all((0..3).map(|_| cache.get(coord))).await;
        assert_eq!(source.calls(), 1);
        for result in &results {
            assert!(matches!(result, Err(TileError::Network(_))));
        }
        assert_eq!(results[0], results[2]);
        assert!(!cache.contains(&coord));
        assert!(!cache.is_inflight(&coord));

        source.set_failing(false);
        let tile = cache.get(coord).await.expect("retry succeeds");
        assert_eq!(tile.feature_count(), 1);
        assert_eq!(source.calls(), 2);
        assert!(cache.contains(&coord));
    }

    /// Cancelling the task that started a fetch does not fail the other waiters
    #[tokio::test]
    async fn test_cancelled_caller_leaves_fetch_running() {
        init_logging();
        let source = MockSource::new(200);
        let cache = cache_over(&source);
        let coord = TileCoord::new(0, 0, 1);

        let driver = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get(coord).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.is_inflight(&coord));

        let waiter = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get(coord).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        driver.abort();
        let tile = waiter.await.expect("waiter task completes").expect("fetch still succeeds");
        assert_eq!(tile.feature_count(), 1);
        assert!(cache.contains(&coord));
        assert!(!cache.is_inflight(&coord));
        assert_eq!(source.calls(), 1);
    }

    /// A failing sibling in a batch does not cancel the shared fetch of another tile
    #[tokio::test]
    async fn test_failed_batch_keeps_sibling_fetch() {
        init_logging();
        let good = TileCoord::new(0, 0, 2);
        let bad = TileCoord::new(1, 0, 2);
        let source = Arc::new(MixedSource {
            failing: bad,
            calls: AtomicUsize::new(0),
        });
        let cache = TileCache::new(source.clone() as Arc<dyn TileSource>, 512);

        let batch = tokio::spawn({
            let cache = cache.clone();
            async move { try_join_all(vec![cache.get(good), cache.get(bad)]).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let independent = cache.get(good).await;
        assert!(independent.is_ok());

        let batch = batch.await.expect("batch task completes");
        assert!(matches!(batch, Err(TileError::Network(_))));
        assert!(cache.contains(&good));
        assert!(!cache.contains(&bad));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    /// A request at a new zoom aborts the old zoom's fetch and every caller waiting on it
    #[tokio::test]
    async fn test_stale_zoom_fetch_rejects_cleanly() {
        init_logging();
        let source = Arc::new(ZoomAwareSource {
            aborts: ZoomAborts::new(true),
            calls: AtomicUsize::new(0),
        });
        let cache = TileCache::new(source.clone() as Arc<dyn TileSource>, 512);
        let stale = TileCoord::new(2, 3, 3);
        let fresh = TileCoord::new(4, 6, 4);

        let waiters = tokio::spawn({
            let cache = cache.clone();
            async move { join_all(vec![cache.get(stale), cache.get(stale)]).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.is_inflight(&stale));

        cache.get(fresh).await.expect("current zoom loads");

        let results = waiters.await.expect("waiter task completes");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(r, Err(TileError::Aborted))));
        assert!(!cache.is_inflight(&stale));
        assert!(!cache.contains(&stale));
        assert!(cache.contains(&fresh));

        cache.get(stale).await.expect("retry fetches again");
        assert!(cache.contains(&stale));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(source.aborts.pending(), 0);
    }

    /// Caching a 65th tile evicts the least recently used one
    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        init_logging();
        let source = MockSource::new(0);
        let cache = cache_over(&source);
        assert_eq!(cache.capacity(), 64);

        for x in 0..64 {
            cache.get(TileCoord::new(x, 0, 7)).await.expect("fetch");
        }
        assert_eq!(cache.len(), 64);

        // Touch the oldest so the second oldest becomes the victim
        cache.get(TileCoord::new(0, 0, 7)).await.expect("hit");
        cache.get(TileCoord::new(64, 0, 7)).await.expect("fetch");

        assert_eq!(cache.len(), 64);
        assert!(cache.contains(&TileCoord::new(0, 0, 7)));
        assert!(!cache.contains(&TileCoord::new(1, 0, 7)));
        assert!(cache.contains(&TileCoord::new(64, 0, 7)));
        assert_eq!(source.calls(), 65);
    }

    /// Views map display tiles onto data tiles with level diff 1 and max data zoom 14
    #[tokio::test]
    async fn test_view_maps_display_tiles() {
        init_logging();
        let source = MockSource::new(0);
        let view = View::new(cache_over(&source), 14, 1);

        let z0 = view.get_display_tile(TileCoord::new(0, 0, 0)).await.expect("z0");
        assert_eq!(z0.data_tile, TileCoord::new(0, 0, 0));
        assert_eq!(z0.scale, 0.5);
        assert_eq!(z0.dim, 256.0);

        let z1 = view.get_display_tile(TileCoord::new(1, 1, 1)).await.expect("z1");
        assert_eq!(z1.data_tile, TileCoord::new(0, 0, 0));
        assert_eq!(z1.scale, 1.0);
        assert_eq!(z1.origin, Point::new(0.0, 0.0));
        assert_eq!(z1.dim, 512.0);

        let z16 = view
            .get_display_tile(TileCoord::new(100, 100, 16))
            .await
            .expect("z16");
        assert_eq!(z16.data_tile, TileCoord::new(25, 25, 14));
        assert_eq!(z16.scale, 2.0);
        assert_eq!(z16.origin, Point::new(25.0 * 1024.0, 25.0 * 1024.0));
        assert_eq!(z16.dim, 1024.0);

        // z0 and z1 share one data tile
        assert_eq!(source.calls(), 2);
    }
}
