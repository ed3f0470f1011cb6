pub mod attr;
pub mod draw;
pub mod measure;
pub mod rule;
pub mod symbolizer;

pub use attr::{Attr, FontAttr, TextAttr, TextTransform};
pub use draw::{paint_labels, DrawCommand, DrawFn, DrawSurface, RecordingSurface};
pub use measure::{ApproximateTextMeasurer, TextMeasurer, TextMetrics};
pub use rule::LabelRule;
pub use symbolizer::{
    CircleSymbolizer, Label, LabelSymbolizer, LayoutContext, LineLabelPlacement,
    LineLabelSymbolizer, PaddedSymbolizer, ShieldSymbolizer, TextSymbolizer,
};
