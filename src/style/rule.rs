use crate::prelude::Arc;
use crate::style::symbolizer::LabelSymbolizer;
use crate::tiles::decode::Feature;
use std::cmp::Ordering;
use std::fmt;

pub type FeatureFilter = Arc<dyn Fn(u8, &Feature) -> bool + Send + Sync>;
pub type FeatureSort = Arc<dyn Fn(&Feature, &Feature) -> Ordering + Send + Sync>;

/// Which features of a layer get labels, and how. A rule's position in the
/// rule list is its priority: earlier rules win collisions.
#[derive(Clone)]
pub struct LabelRule {
    /// Source name; `None` is the unnamed default source
    pub data_source: Option<String>,
    pub data_layer: String,
    pub symbolizer: Arc<dyn LabelSymbolizer>,
    pub visible: bool,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub filter: Option<FeatureFilter>,
    pub sort: Option<FeatureSort>,
}

impl LabelRule {
    pub fn new(data_layer: impl Into<String>, symbolizer: Arc<dyn LabelSymbolizer>) -> Self {
        Self {
            data_source: None,
            data_layer: data_layer.into(),
            symbolizer,
            visible: true,
            min_zoom: None,
            max_zoom: None,
            filter: None,
            sort: None,
        }
    }

    pub fn with_data_source(mut self, name: impl Into<String>) -> Self {
        self.data_source = Some(name.into());
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: Option<u8>, max_zoom: Option<u8>) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(u8, &Feature) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_sort(
        mut self,
        sort: impl Fn(&Feature, &Feature) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.sort = Some(Arc::new(sort));
        self
    }

    pub fn source_name(&self) -> &str {
        self.data_source.as_deref().unwrap_or_default()
    }

    /// Visible and inside the zoom range
    pub fn applies_at(&self, zoom: u8) -> bool {
        self.visible
            && self.min_zoom.map_or(true, |min| zoom >= min)
            && self.max_zoom.map_or(true, |max| zoom <= max)
    }

    pub fn accepts(&self, zoom: u8, feature: &Feature) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(zoom, feature))
    }
}

impl fmt::Debug for LabelRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelRule")
            .field("data_source", &self.data_source)
            .field("data_layer", &self.data_layer)
            .field("visible", &self.visible)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::symbolizer::CircleSymbolizer;

    #[test]
    fn test_zoom_range() {
        let rule = LabelRule::new("places", Arc::new(CircleSymbolizer::default()))
            .with_zoom_range(Some(4), Some(10));
        assert!(!rule.applies_at(3));
        assert!(rule.applies_at(4));
        assert!(rule.applies_at(10));
        assert!(!rule.applies_at(11));
        assert!(!rule.clone().with_visible(false).applies_at(5));
        assert_eq!(rule.source_name(), "");
    }
}
