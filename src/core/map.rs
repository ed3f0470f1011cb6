use crate::{
    core::{
        bounds::Bounds,
        config::{LabelingConfig, MapOptions},
        geo::TileCoord,
    },
    prelude::{Arc, HashMap},
    spatial::{
        index::SpatialIndex,
        labeler::{InvalidationCallback, Labelers},
    },
    style::{
        draw::{paint_labels, DrawSurface},
        measure::TextMeasurer,
        rule::LabelRule,
    },
    tiles::{
        cache::QueryFeature,
        view::{sources_to_views, PreparedTileMap, View},
    },
    Result,
};
use futures::future::try_join_all;

/// One map instance: a view per data source and the labelers for its rules.
pub struct Map {
    views: HashMap<String, View>,
    labelers: Labelers,
}

impl Map {
    pub fn new(
        options: &MapOptions,
        label_rules: Vec<LabelRule>,
        measurer: Arc<dyn TextMeasurer>,
        callback: Option<InvalidationCallback>,
    ) -> Result<Self> {
        let views = sources_to_views(options)?;
        Ok(Self::with_views(
            views,
            label_rules,
            measurer,
            &options.labeling,
            callback,
        ))
    }

    /// Builds a map over views whose sources were set up by the caller
    pub fn with_views(
        views: HashMap<String, View>,
        label_rules: Vec<LabelRule>,
        measurer: Arc<dyn TextMeasurer>,
        labeling: &LabelingConfig,
        callback: Option<InvalidationCallback>,
    ) -> Self {
        log::info!(
            "map with {} sources and {} label rules",
            views.len(),
            label_rules.len()
        );
        Self {
            views,
            labelers: Labelers::new(measurer, label_rules, labeling.max_labeled_tiles, callback),
        }
    }

    pub fn view(&self, source: &str) -> Option<&View> {
        self.views.get(source)
    }

    pub fn views(&self) -> impl Iterator<Item = (&String, &View)> {
        self.views.iter()
    }

    pub fn labelers(&self) -> &Labelers {
        &self.labelers
    }

    /// Data for one display tile from every source, fetched concurrently
    pub async fn prepare_display_tile(&self, tile: TileCoord) -> Result<PreparedTileMap> {
        let fetches = self.views.values().map(|view| view.get_display_tile(tile));
        let tiles = try_join_all(fetches).await?;
        Ok(self
            .views
            .keys()
            .cloned()
            .zip(tiles.into_iter().map(|tile| vec![tile]))
            .collect())
    }

    /// Data under a pixel region at a possibly fractional zoom, from every source
    pub async fn prepare_bbox(&self, zoom: f64, bounds: &Bounds) -> Result<PreparedTileMap> {
        let fetches = self.views.values().map(|view| view.get_bbox(zoom, bounds));
        let tiles = try_join_all(fetches).await?;
        Ok(self.views.keys().cloned().zip(tiles).collect())
    }

    /// Places labels for `prepared` at display zoom `z`; see [`Labelers::add`].
    pub fn layout(&mut self, z: u8, prepared: &PreparedTileMap) -> f64 {
        self.labelers.add(z, prepared)
    }

    pub fn get_index(&self, z: u8) -> Option<&SpatialIndex> {
        self.labelers.get_index(z)
    }

    /// Hit-test every source's cached data, keyed by source name
    pub fn query_features(
        &self,
        lng: f64,
        lat: f64,
        display_zoom: f64,
        brush: f64,
    ) -> HashMap<String, Vec<QueryFeature>> {
        self.views
            .iter()
            .map(|(name, view)| {
                (
                    name.clone(),
                    view.query_features(lng, lat, display_zoom, brush),
                )
            })
            .collect()
    }

    /// Paints the labels placed at zoom `z` that touch `region`
    pub fn paint_labels(&self, z: u8, surface: &mut dyn DrawSurface, region: &Bounds) -> usize {
        self.get_index(z)
            .map_or(0, |index| paint_labels(surface, index, region))
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("sources", &self.views.keys().collect::<Vec<_>>())
            .field("labelers", &self.labelers)
            .finish()
    }
}
