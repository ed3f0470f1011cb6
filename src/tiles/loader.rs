use crate::core::config::TileLoadingConfig;
use crate::prelude::Mutex;
use crate::TileError;
use futures::future::{AbortHandle, AbortRegistration};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Shared async HTTP client for tile fetching. Building the client once
/// avoids the cost of TLS and connection pool setup for every tile.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("maplet-vector/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(16)
        .build()
        .unwrap_or_else(|err| {
            log::error!("failed to build tuned HTTP client, using defaults: {}", err);
            reqwest::Client::new()
        })
});

/// Fetches `url`, retrying transport failures.
///
/// `Ok(None)` means the server has no tile at this address (204 or 404).
pub async fn fetch_bytes(
    url: &str,
    config: &TileLoadingConfig,
) -> Result<Option<Vec<u8>>, TileError> {
    let attempts = config.max_retries + 1;
    let mut attempt = 1;
    loop {
        log::debug!("fetch {} attempt {}", url, attempt);
        let result = async {
            let resp = HTTP_CLIENT.get(url).send().await?;
            let status = resp.status();
            if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::NO_CONTENT
            {
                return Ok(None);
            }
            if !status.is_success() {
                return Err(TileError::Http(status.as_u16()));
            }
            Ok(Some(resp.bytes().await?.to_vec()))
        }
        .await;

        match result {
            Ok(bytes) => return Ok(bytes),
            // Server answers are not retried, only transport failures.
            Err(err @ TileError::Http(_)) => return Err(err),
            Err(err) if attempt >= attempts => {
                log::error!("giving up on {} after {} attempts: {}", url, attempt, err);
                return Err(err);
            }
            Err(err) => {
                log::warn!("{} failed on attempt {}: {}", url, attempt, err);
                let backoff = config.retry_delay_ms * 2_u64.pow(attempt - 1);
                async_delay(Duration::from_millis(backoff)).await;
                attempt += 1;
            }
        }
    }
}

/// Async delay that works with or without the tokio runtime
pub async fn async_delay(duration: Duration) {
    #[cfg(feature = "tokio-runtime")]
    {
        tokio::time::sleep(duration).await;
    }

    #[cfg(not(feature = "tokio-runtime"))]
    {
        // Without a timer we retry immediately rather than block the executor.
        let _ = duration;
    }
}

/// Tracks pending fetches by zoom so a source can shed work for zooms the
/// viewer has already left.
#[derive(Debug)]
pub struct ZoomAborts {
    enabled: bool,
    next_id: AtomicU64,
    pending: Mutex<Vec<PendingFetch>>,
}

#[derive(Debug)]
struct PendingFetch {
    id: u64,
    z: u8,
    handle: AbortHandle,
}

/// Registration for one fetch; pass `registration` to
/// `futures::future::Abortable` and call [`ZoomAborts::finish`] afterwards.
pub struct ZoomTicket {
    pub id: u64,
    pub registration: AbortRegistration,
}

impl ZoomAborts {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            next_id: AtomicU64::new(0),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registers a fetch at zoom `z`, first aborting pending fetches of every
    /// other zoom when cancellation is enabled.
    pub fn begin(&self, z: u8) -> ZoomTicket {
        let (handle, registration) = AbortHandle::new_pair();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if self.enabled {
            pending.retain(|fetch| {
                if fetch.z != z {
                    log::debug!("aborting stale fetch at zoom {} for zoom {}", fetch.z, z);
                    fetch.handle.abort();
                    false
                } else {
                    true
                }
            });
        }
        pending.push(PendingFetch { id, z, handle });
        ZoomTicket { id, registration }
    }

    pub fn finish(&self, id: u64) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|fetch| fetch.id != id);
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}
