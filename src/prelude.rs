//! Prelude module for common maplet-vector types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maplet_vector::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{LabelingConfig, MapOptions, SourceOptions, TileLoadingConfig},
    geo::{LatLng, Point, TileCoord},
    map::Map,
};

pub use crate::tiles::{
    cache::{CacheStats, QueryFeature, TileCache},
    decode::{DecodedTile, Feature, GeomType, PropValue},
    pmtiles::PmtilesSource,
    source::{TileSource, ZxySource},
    view::{DataTileDescriptor, PreparedTile, PreparedTileMap, View},
};

pub use crate::spatial::{
    index::{IndexedLabel, LabelId, SpatialIndex},
    labeler::{InvalidationCallback, Labeler, Labelers},
};

pub use crate::style::{
    attr::{Attr, FontAttr, TextAttr, TextTransform},
    draw::{paint_labels, DrawCommand, DrawFn, DrawSurface, RecordingSurface},
    measure::{ApproximateTextMeasurer, TextMeasurer, TextMetrics},
    rule::LabelRule,
    symbolizer::{
        CircleSymbolizer, Label, LabelSymbolizer, LayoutContext, LineLabelPlacement,
        LineLabelSymbolizer, PaddedSymbolizer, ShieldSymbolizer, TextSymbolizer,
    },
};

pub use crate::{Error as MapError, Result, TileError};

pub use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

pub use instant::Instant;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};

pub use futures::Future;
