//! Configuration for vector sources, tile loading and label placement
//!
//! Options deserialize from the same JSON shape a host page would pass in:
//! either a single source (`url`, `levelDiff`, `maxDataZoom`) or a named
//! `sources` map.

use crate::core::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_LEVEL_DIFF, DEFAULT_MAX_DATA_ZOOM, DEFAULT_MAX_LABELED_TILES,
    MAX_LEVEL_DIFF, MAX_ZOOM,
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum MapPerformanceProfile {
    Balanced,
    LowResource,
    HighPerformance,
    Custom(TileLoadingConfig, LabelingConfig),
}

impl MapPerformanceProfile {
    pub fn resolve(&self) -> (TileLoadingConfig, LabelingConfig) {
        match self {
            Self::Balanced => (TileLoadingConfig::default(), LabelingConfig::default()),
            Self::LowResource => (
                TileLoadingConfig::low_resource(),
                LabelingConfig {
                    max_labeled_tiles: 8,
                },
            ),
            Self::HighPerformance => (
                TileLoadingConfig::high_performance(),
                LabelingConfig {
                    max_labeled_tiles: 32,
                },
            ),
            Self::Custom(tiles, labels) => (tiles.clone(), labels.clone()),
        }
    }
}

impl Default for MapPerformanceProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// One vector data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOptions {
    /// `{z}/{x}/{y}` URL template or path to a `.pmtiles` archive
    pub url: String,
    #[serde(default = "default_level_diff")]
    pub level_diff: u8,
    #[serde(default = "default_max_data_zoom")]
    pub max_data_zoom: u8,
    /// Abort pending fetches of other zooms when a new zoom starts loading
    #[serde(default = "default_true")]
    pub cancel_stale_zooms: bool,
}

impl SourceOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            level_diff: DEFAULT_LEVEL_DIFF,
            max_data_zoom: DEFAULT_MAX_DATA_ZOOM,
            cancel_stale_zooms: true,
        }
    }

    /// Pixel size of one decoded data tile
    pub fn tile_size(&self) -> u32 {
        crate::core::constants::TILE_SIZE << self.level_diff
    }

    /// Rejects a level diff or data zoom the tile math cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.level_diff > MAX_LEVEL_DIFF {
            return Err(MapError::InvalidSource(format!(
                "{}: levelDiff {} exceeds {}",
                self.url, self.level_diff, MAX_LEVEL_DIFF
            )));
        }
        if self.max_data_zoom > MAX_ZOOM {
            return Err(MapError::InvalidSource(format!(
                "{}: maxDataZoom {} exceeds {}",
                self.url, self.max_data_zoom, MAX_ZOOM
            )));
        }
        Ok(())
    }

    /// True when the URL points at a PMTiles archive
    pub fn is_pmtiles(&self) -> bool {
        let path = self
            .url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        path.ends_with(".pmtiles")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TileLoadingConfig {
    pub cache_size: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Unified configuration presets for TileLoadingConfig
impl TileLoadingConfig {
    pub fn low_resource() -> Self {
        Self {
            cache_size: 32,
            max_retries: 1,
            retry_delay_ms: 250,
        }
    }

    pub fn high_performance() -> Self {
        Self {
            cache_size: 256,
            max_retries: 3,
            retry_delay_ms: 50,
        }
    }

    pub fn for_testing() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_CAPACITY,
            max_retries: 0,
            retry_delay_ms: 0,
        }
    }
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_CAPACITY,
            max_retries: 2,
            retry_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelingConfig {
    /// Labeled data tiles kept per data source and zoom
    pub max_labeled_tiles: usize,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            max_labeled_tiles: DEFAULT_MAX_LABELED_TILES,
        }
    }
}

/// Top-level options for a [`crate::Map`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub level_diff: Option<u8>,
    #[serde(default)]
    pub max_data_zoom: Option<u8>,
    #[serde(default)]
    pub sources: Option<BTreeMap<String, SourceOptions>>,
    #[serde(default)]
    pub tile_loading: TileLoadingConfig,
    #[serde(default)]
    pub labeling: LabelingConfig,
}

impl MapOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_profile(mut self, profile: MapPerformanceProfile) -> Self {
        let (tile_loading, labeling) = profile.resolve();
        self.tile_loading = tile_loading;
        self.labeling = labeling;
        self
    }

    /// Named sources in key order. A single top-level `url` becomes the
    /// unnamed source `""`. Out-of-range zoom settings are rejected.
    pub fn resolved_sources(&self) -> Result<Vec<(String, SourceOptions)>> {
        if let Some(sources) = &self.sources {
            return sources
                .iter()
                .map(|(name, options)| {
                    options.validate()?;
                    Ok((name.clone(), options.clone()))
                })
                .collect();
        }

        let url = self
            .url
            .clone()
            .ok_or_else(|| MapError::InvalidSource("no url or sources configured".into()))?;
        let mut options = SourceOptions::new(url);
        if let Some(level_diff) = self.level_diff {
            options.level_diff = level_diff;
        }
        if let Some(max_data_zoom) = self.max_data_zoom {
            options.max_data_zoom = max_data_zoom;
        }
        options.validate()?;
        Ok(vec![(String::new(), options)])
    }
}

fn default_level_diff() -> u8 {
    DEFAULT_LEVEL_DIFF
}

fn default_max_data_zoom() -> u8 {
    DEFAULT_MAX_DATA_ZOOM
}

fn default_true() -> bool {
    true
}
