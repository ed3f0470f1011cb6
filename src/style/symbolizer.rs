//! Label symbolizers: turn a feature's geometry into candidate labels.
//!
//! Geometry handed to [`LabelSymbolizer::place`] is already in zoom-global
//! pixels. Every candidate's anchor lies inside or on one of its bboxes,
//! which deduplication relies on.

use crate::core::{
    bounds::Bounds,
    constants::{LINE_LABEL_OVERZOOM_THRESHOLD, MIN_LABELABLE_DIM},
    geo::Point,
};
use crate::prelude::Arc;
use crate::spatial::index::SpatialIndex;
use crate::style::{
    attr::{Attr, FontAttr, TextAttr},
    draw::{DrawFn, DrawSurface},
    measure::TextMeasurer,
};
use crate::tiles::decode::Feature;
use std::fmt;

/// Largest direction change, in radians, still treated as a straight run
const MAX_RUN_TURN: f64 = 0.1;

/// Candidate label produced by a symbolizer
#[derive(Clone)]
pub struct Label {
    pub anchor: Point,
    pub bboxes: Vec<Bounds>,
    pub draw: DrawFn,
    pub deduplication_key: Option<String>,
    pub deduplication_distance: Option<f64>,
}

impl Label {
    pub fn new(anchor: Point, bboxes: Vec<Bounds>, draw: DrawFn) -> Self {
        Self {
            anchor,
            bboxes,
            draw,
            deduplication_key: None,
            deduplication_distance: None,
        }
    }

    pub fn with_deduplication(mut self, key: impl Into<String>, distance: f64) -> Self {
        self.deduplication_key = Some(key.into());
        self.deduplication_distance = Some(distance);
        self
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Label")
            .field("anchor", &self.anchor)
            .field("bboxes", &self.bboxes)
            .field("deduplication_key", &self.deduplication_key)
            .field("deduplication_distance", &self.deduplication_distance)
            .finish()
    }
}

/// Read-only view of the layout in progress
pub struct LayoutContext<'a> {
    pub index: &'a SpatialIndex,
    pub zoom: u8,
    pub measurer: &'a dyn TextMeasurer,
    /// Rule position; lower wins collisions
    pub order: usize,
    /// Display zoom minus data zoom
    pub overzoom: u8,
}

pub trait LabelSymbolizer: Send + Sync {
    fn place(&self, ctx: &LayoutContext<'_>, geom: &[Vec<Point>], feature: &Feature)
        -> Option<Vec<Label>>;
}

fn first_point(geom: &[Vec<Point>]) -> Option<Point> {
    geom.first()?.first().copied()
}

pub struct CircleSymbolizer {
    pub radius: Attr<f64>,
    pub fill: Attr<String>,
    pub stroke: Attr<String>,
    pub width: Attr<f64>,
    pub opacity: Attr<f64>,
}

impl Default for CircleSymbolizer {
    fn default() -> Self {
        Self {
            radius: 3.0.into(),
            fill: "black".into(),
            stroke: "white".into(),
            width: 0.0.into(),
            opacity: 1.0.into(),
        }
    }
}

impl CircleSymbolizer {
    pub fn new(radius: impl Into<Attr<f64>>) -> Self {
        Self {
            radius: radius.into(),
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, fill: impl Into<Attr<String>>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn with_stroke(mut self, stroke: impl Into<Attr<String>>, width: impl Into<Attr<f64>>) -> Self {
        self.stroke = stroke.into();
        self.width = width.into();
        self
    }
}

impl LabelSymbolizer for CircleSymbolizer {
    fn place(&self, ctx: &LayoutContext<'_>, geom: &[Vec<Point>], feature: &Feature) -> Option<Vec<Label>> {
        let anchor = first_point(geom)?;
        let z = ctx.zoom;
        let radius = self.radius.get(z, feature);
        let width = self.width.get(z, feature);
        let opacity = self.opacity.get(z, feature);
        let fill = self.fill.get(z, feature);
        let stroke = self.stroke.get(z, feature);

        let draw: DrawFn = Arc::new(move |surface: &mut dyn DrawSurface| {
            surface.set_global_alpha(opacity);
            if width > 0.0 {
                surface.set_stroke_style(&stroke);
                surface.set_line_width(width);
                surface.stroke_circle(0.0, 0.0, radius + width / 2.0);
            }
            surface.set_fill_style(&fill);
            surface.fill_circle(0.0, 0.0, radius);
        });
        Some(vec![Label::new(anchor, vec![Bounds::around(anchor, radius)], draw)])
    }
}

/// Text on a filled background box, centered on the anchor
pub struct ShieldSymbolizer {
    pub font: FontAttr,
    pub text: TextAttr,
    pub fill: Attr<String>,
    pub background: Attr<String>,
    pub padding: Attr<f64>,
}

impl Default for ShieldSymbolizer {
    fn default() -> Self {
        Self {
            font: FontAttr::default(),
            text: TextAttr::default(),
            fill: "black".into(),
            background: "white".into(),
            padding: 0.0.into(),
        }
    }
}

impl ShieldSymbolizer {
    pub fn new(text: TextAttr, font: FontAttr) -> Self {
        Self {
            text,
            font,
            ..Self::default()
        }
    }

    pub fn with_padding(mut self, padding: impl Into<Attr<f64>>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn with_colors(mut self, fill: impl Into<Attr<String>>, background: impl Into<Attr<String>>) -> Self {
        self.fill = fill.into();
        self.background = background.into();
        self
    }
}

impl LabelSymbolizer for ShieldSymbolizer {
    fn place(&self, ctx: &LayoutContext<'_>, geom: &[Vec<Point>], feature: &Feature) -> Option<Vec<Label>> {
        let z = ctx.zoom;
        let text = self.text.get(z, feature)?;
        let anchor = first_point(geom)?;
        let font = self.font.get(z, feature);
        let metrics = ctx.measurer.measure(&font, &text);
        let (width, ascent, descent) = (metrics.width, metrics.ascent, metrics.descent);
        let p = self.padding.get(z, feature);
        let bbox = Bounds::from_coords(
            anchor.x - width / 2.0 - p,
            anchor.y - ascent - p,
            anchor.x + width / 2.0 + p,
            anchor.y + descent + p,
        );

        let fill = self.fill.get(z, feature);
        let background = self.background.get(z, feature);
        let draw: DrawFn = Arc::new(move |surface: &mut dyn DrawSurface| {
            surface.set_global_alpha(1.0);
            surface.set_fill_style(&background);
            surface.fill_rect(
                -width / 2.0 - p,
                -ascent - p,
                width + 2.0 * p,
                ascent + descent + 2.0 * p,
            );
            surface.set_fill_style(&fill);
            surface.set_font(&font);
            surface.fill_text(&text, -width / 2.0, 0.0);
        });
        Some(vec![Label::new(anchor, vec![bbox], draw)])
    }
}

/// Breaks `text` on spaces into lines of at most `max_chars` characters.
/// A single word longer than that keeps a line to itself.
pub fn linebreak(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Multi-line text centered on the anchor
pub struct TextSymbolizer {
    pub font: FontAttr,
    pub text: TextAttr,
    pub fill: Attr<String>,
    pub stroke: Attr<String>,
    /// Halo width; 0 draws no halo
    pub width: Attr<f64>,
    /// In ems
    pub line_height: Attr<f64>,
    pub max_line_chars: Attr<usize>,
}

impl Default for TextSymbolizer {
    fn default() -> Self {
        Self {
            font: FontAttr::default(),
            text: TextAttr::default(),
            fill: "black".into(),
            stroke: "black".into(),
            width: 0.0.into(),
            line_height: 1.0.into(),
            max_line_chars: 15.into(),
        }
    }
}

impl TextSymbolizer {
    pub fn new(text: TextAttr, font: FontAttr) -> Self {
        Self {
            text,
            font,
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, fill: impl Into<Attr<String>>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn with_halo(mut self, stroke: impl Into<Attr<String>>, width: impl Into<Attr<f64>>) -> Self {
        self.stroke = stroke.into();
        self.width = width.into();
        self
    }

    pub fn with_max_line_chars(mut self, max: impl Into<Attr<usize>>) -> Self {
        self.max_line_chars = max.into();
        self
    }
}

impl LabelSymbolizer for TextSymbolizer {
    fn place(&self, ctx: &LayoutContext<'_>, geom: &[Vec<Point>], feature: &Feature) -> Option<Vec<Label>> {
        let z = ctx.zoom;
        let text = self.text.get(z, feature)?;
        let anchor = first_point(geom)?;
        let font = self.font.get(z, feature);

        let lines = linebreak(&text, self.max_line_chars.get(z, feature));
        if lines.is_empty() {
            return None;
        }
        let widths: Vec<f64> = lines
            .iter()
            .map(|line| ctx.measurer.measure(&font, line).width)
            .collect();
        let longest = lines
            .iter()
            .max_by_key(|line| line.chars().count())
            .map(String::as_str)
            .unwrap_or_default();
        let metrics = ctx.measurer.measure(&font, longest);
        let width = widths.iter().copied().fold(metrics.width, f64::max);
        let line_height = metrics.height() * self.line_height.get(z, feature);
        let height = metrics.height() + (lines.len() - 1) as f64 * line_height;

        let bbox = Bounds::from_coords(
            anchor.x - width / 2.0,
            anchor.y - height / 2.0,
            anchor.x + width / 2.0,
            anchor.y + height / 2.0,
        );

        let fill = self.fill.get(z, feature);
        let stroke = self.stroke.get(z, feature);
        let halo = self.width.get(z, feature);
        let first_baseline = -height / 2.0 + metrics.ascent;
        let draw: DrawFn = Arc::new(move |surface: &mut dyn DrawSurface| {
            surface.set_global_alpha(1.0);
            surface.set_font(&font);
            surface.set_fill_style(&fill);
            let mut y = first_baseline;
            for (line, line_width) in lines.iter().zip(&widths) {
                let x = -line_width / 2.0;
                if halo > 0.0 {
                    surface.set_line_width(halo * 2.0);
                    surface.set_stroke_style(&stroke);
                    surface.stroke_text(line, x, y);
                }
                surface.fill_text(line, x, y);
                y += line_height;
            }
        });
        Some(vec![Label::new(anchor, vec![bbox], draw)])
    }
}

/// Where text sits relative to the line it follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineLabelPlacement {
    #[default]
    Above,
    Center,
    Below,
}

/// Straight stretch of a line long enough to carry a label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelCandidate {
    pub start: Point,
    pub end: Point,
}

fn turn(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % (2.0 * std::f64::consts::PI);
    diff.min(2.0 * std::f64::consts::PI - diff)
}

/// Positions along each line where a label of `min_length` fits on a nearly
/// straight run, at least `repeat_distance` apart along the line.
pub fn simple_label(geom: &[Vec<Point>], min_length: f64, repeat_distance: f64) -> Vec<LabelCandidate> {
    let mut candidates = Vec::new();
    if min_length <= 0.0 {
        return candidates;
    }
    let step = repeat_distance.max(min_length);

    for line in geom {
        let mut travelled = 0.0;
        let mut last_labeled: Option<f64> = None;
        let mut run: Option<(Point, f64, f64)> = None;

        for segment in line.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let length = a.distance_to(&b);
            if length == 0.0 {
                continue;
            }
            let angle = (b.y - a.y).atan2(b.x - a.x);
            let (run_start, run_start_at) = match run {
                Some((start, at, run_angle)) if turn(run_angle, angle) <= MAX_RUN_TURN => (start, at),
                _ => {
                    run = Some((a, travelled, angle));
                    (a, travelled)
                }
            };
            travelled += length;

            let chord = run_start.distance_to(&b);
            if chord == 0.0 {
                continue;
            }
            let dir = b.subtract(&run_start).multiply(1.0 / chord);
            loop {
                let start_at = last_labeled.map_or(run_start_at, |l| run_start_at.max(l + step));
                let offset = start_at - run_start_at;
                if offset + min_length > chord {
                    break;
                }
                let start = run_start.add(&dir.multiply(offset));
                candidates.push(LabelCandidate {
                    start,
                    end: start.add(&dir.multiply(min_length)),
                });
                last_labeled = Some(start_at);
            }
        }
    }
    candidates
}

/// Cell centers every `spacing` pixels from `a` toward `b`, covering `length`
pub fn line_cells(a: Point, b: Point, length: f64, spacing: f64) -> Vec<Point> {
    let dist = a.distance_to(&b);
    if dist == 0.0 || spacing <= 0.0 {
        return vec![a];
    }
    let delta = b.subtract(&a);
    let mut cells = Vec::new();
    let mut i = 0.0;
    while i < length + spacing {
        cells.push(a.add(&delta.multiply(i / dist)));
        i += spacing;
    }
    cells
}

/// Text following straight runs of a line, repeated along it
pub struct LineLabelSymbolizer {
    pub font: FontAttr,
    pub text: TextAttr,
    pub fill: Attr<String>,
    pub stroke: Attr<String>,
    pub width: Attr<f64>,
    pub offset: Attr<f64>,
    pub position: LineLabelPlacement,
    pub max_label_chars: Attr<usize>,
    pub repeat_distance: Attr<f64>,
}

impl Default for LineLabelSymbolizer {
    fn default() -> Self {
        Self {
            font: FontAttr::default(),
            text: TextAttr::default(),
            fill: "black".into(),
            stroke: "black".into(),
            width: 0.0.into(),
            offset: 0.0.into(),
            position: LineLabelPlacement::Above,
            max_label_chars: 40.into(),
            repeat_distance: 1000.0.into(),
        }
    }
}

impl LineLabelSymbolizer {
    pub fn new(text: TextAttr, font: FontAttr) -> Self {
        Self {
            text,
            font,
            ..Self::default()
        }
    }

    pub fn with_repeat_distance(mut self, distance: impl Into<Attr<f64>>) -> Self {
        self.repeat_distance = distance.into();
        self
    }

    pub fn with_position(mut self, position: LineLabelPlacement) -> Self {
        self.position = position;
        self
    }

    pub fn with_halo(mut self, stroke: impl Into<Attr<String>>, width: impl Into<Attr<f64>>) -> Self {
        self.stroke = stroke.into();
        self.width = width.into();
        self
    }
}

impl LabelSymbolizer for LineLabelSymbolizer {
    fn place(&self, ctx: &LayoutContext<'_>, geom: &[Vec<Point>], feature: &Feature) -> Option<Vec<Label>> {
        let z = ctx.zoom;
        let name = self.text.get(z, feature)?;
        if name.chars().count() > self.max_label_chars.get(z, feature) {
            return None;
        }
        if feature.bbox.width() < MIN_LABELABLE_DIM && feature.bbox.height() < MIN_LABELABLE_DIM {
            return None;
        }

        let font = self.font.get(z, feature);
        let metrics = ctx.measurer.measure(&font, &name);
        let width = metrics.width;
        let height = metrics.height();
        if height <= 0.0 {
            return None;
        }

        let mut repeat_distance = self.repeat_distance.get(z, feature);
        if ctx.overzoom > LINE_LABEL_OVERZOOM_THRESHOLD {
            repeat_distance *= (1_u64 << (ctx.overzoom - LINE_LABEL_OVERZOOM_THRESHOLD)) as f64;
        }
        let cell_size = height * 2.0;

        let candidates = simple_label(geom, width, repeat_distance);
        if candidates.is_empty() {
            return None;
        }

        let fill = self.fill.get(z, feature);
        let stroke = self.stroke.get(z, feature);
        let line_width = self.width.get(z, feature);
        let offset = self.offset.get(z, feature);
        let height_placement = match self.position {
            LineLabelPlacement::Above => 0.0,
            LineLabelPlacement::Center => height / 2.0,
            LineLabelPlacement::Below => height,
        };

        let labels = candidates
            .into_iter()
            .map(|candidate| {
                let dx = candidate.end.x - candidate.start.x;
                let dy = candidate.end.y - candidate.start.y;
                let bboxes = line_cells(candidate.start, candidate.end, width, cell_size / 2.0)
                    .into_iter()
                    .map(|cell| Bounds::around(cell, cell_size / 2.0))
                    .collect();

                let key = name.clone();
                let (name, font, fill, stroke) = (name.clone(), font.clone(), fill.clone(), stroke.clone());
                let draw: DrawFn = Arc::new(move |surface: &mut dyn DrawSurface| {
                    surface.set_global_alpha(1.0);
                    surface.rotate(dy.atan2(dx));
                    // Keep text upright on westward runs.
                    if dx < 0.0 {
                        surface.scale(-1.0, -1.0);
                        surface.translate(-width, 0.0);
                    }
                    surface.translate(0.0, height_placement - offset);
                    surface.set_font(&font);
                    if line_width > 0.0 {
                        surface.set_line_width(line_width);
                        surface.set_stroke_style(&stroke);
                        surface.stroke_text(&name, 0.0, 0.0);
                    }
                    surface.set_fill_style(&fill);
                    surface.fill_text(&name, 0.0, 0.0);
                });
                Label::new(candidate.start, bboxes, draw).with_deduplication(key, repeat_distance)
            })
            .collect();
        Some(labels)
    }
}

/// Grows every bbox of the inner symbolizer's labels by `padding`
pub struct PaddedSymbolizer {
    pub padding: Attr<f64>,
    pub inner: Arc<dyn LabelSymbolizer>,
}

impl PaddedSymbolizer {
    pub fn new(padding: impl Into<Attr<f64>>, inner: Arc<dyn LabelSymbolizer>) -> Self {
        Self {
            padding: padding.into(),
            inner,
        }
    }
}

impl LabelSymbolizer for PaddedSymbolizer {
    fn place(&self, ctx: &LayoutContext<'_>, geom: &[Vec<Point>], feature: &Feature) -> Option<Vec<Label>> {
        let mut labels = self.inner.place(ctx, geom, feature)?;
        if labels.is_empty() {
            return None;
        }
        let padding = self.padding.get(ctx.zoom, feature);
        for label in &mut labels {
            for bbox in &mut label.bboxes {
                *bbox = bbox.expanded(padding);
            }
        }
        Some(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::HashMap;
    use crate::style::draw::{DrawCommand, RecordingSurface};
    use crate::style::measure::ApproximateTextMeasurer;
    use crate::tiles::decode::{GeomType, PropValue};

    fn named(geom_type: GeomType, geom: Vec<Vec<Point>>, name: &str) -> Feature {
        let mut props = HashMap::default();
        props.insert("name".to_string(), PropValue::from(name));
        Feature::new(None, geom_type, geom, props)
    }

    fn place(
        symbolizer: &dyn LabelSymbolizer,
        overzoom: u8,
        geom: &[Vec<Point>],
        feature: &Feature,
    ) -> Option<Vec<Label>> {
        let index = SpatialIndex::new(0, 16);
        let measurer = ApproximateTextMeasurer::default();
        let ctx = LayoutContext {
            index: &index,
            zoom: 14,
            measurer: &measurer,
            order: 0,
            overzoom,
        };
        symbolizer.place(&ctx, geom, feature)
    }

    fn straight(length: f64) -> Vec<Vec<Point>> {
        vec![vec![Point::new(0.0, 100.0), Point::new(length, 100.0)]]
    }

    #[test]
    fn test_circle_bbox_and_draw() {
        let point = vec![vec![Point::new(10.0, 20.0)]];
        let feature = named(GeomType::Point, point.clone(), "x");
        let labels = place(&CircleSymbolizer::new(4.0).with_fill("red"), 0, &point, &feature).unwrap();
        assert_eq!(labels[0].bboxes, vec![Bounds::from_coords(6.0, 16.0, 14.0, 24.0)]);

        let mut surface = RecordingSurface::new();
        (labels[0].draw)(&mut surface);
        assert!(surface.commands.contains(&DrawCommand::FillStyle("red".into())));
        assert!(surface.commands.contains(&DrawCommand::FillCircle {
            x: 0.0,
            y: 0.0,
            radius: 4.0
        }));
    }

    #[test]
    fn test_text_needs_a_label_property() {
        let point = vec![vec![Point::new(0.0, 0.0)]];
        let feature = Feature::new(None, GeomType::Point, point.clone(), HashMap::default());
        assert!(place(&TextSymbolizer::default(), 0, &point, &feature).is_none());
    }

    #[test]
    fn test_text_is_centered_on_anchor() {
        let point = vec![vec![Point::new(100.0, 100.0)]];
        let feature = named(GeomType::Point, point.clone(), "Paris");
        let symbolizer = TextSymbolizer::new(TextAttr::default(), FontAttr::sized("serif", 10.0));
        let labels = place(&symbolizer, 0, &point, &feature).unwrap();
        let bbox = labels[0].bboxes[0];
        assert_eq!(bbox.center(), Point::new(100.0, 100.0));
        assert!((bbox.width() - 30.0).abs() < 1e-9);
        assert!(bbox.contains(&labels[0].anchor));
    }

    #[test]
    fn test_linebreak() {
        assert_eq!(linebreak("Rio de Janeiro", 8), vec!["Rio de", "Janeiro"]);
        assert_eq!(linebreak("Llanfairpwllgwyngyll", 5), vec!["Llanfairpwllgwyngyll"]);
        assert!(linebreak("   ", 5).is_empty());
    }

    #[test]
    fn test_line_labels_repeat_along_straight_line() {
        let geom = straight(300.0);
        let feature = named(GeomType::Line, geom.clone(), "Main St");
        let symbolizer = LineLabelSymbolizer::new(TextAttr::default(), FontAttr::sized("sans-serif", 10.0))
            .with_repeat_distance(100.0);
        let labels = place(&symbolizer, 0, &geom, &feature).unwrap();

        let anchors: Vec<f64> = labels.iter().map(|l| l.anchor.x).collect();
        assert_eq!(anchors, vec![0.0, 100.0, 200.0]);
        for label in &labels {
            assert!(!label.bboxes.is_empty());
            assert!(label.bboxes.iter().any(|b| b.contains(&label.anchor)));
            assert_eq!(label.deduplication_key.as_deref(), Some("Main St"));
            assert_eq!(label.deduplication_distance, Some(100.0));
        }
        // 42px of text, cells every 10px
        assert_eq!(labels[0].bboxes.len(), 6);
    }

    #[test]
    fn test_line_label_repeat_grows_with_overzoom() {
        let geom = straight(300.0);
        let feature = named(GeomType::Line, geom.clone(), "Main St");
        let symbolizer = LineLabelSymbolizer::new(TextAttr::default(), FontAttr::sized("sans-serif", 10.0))
            .with_repeat_distance(100.0);
        let labels = place(&symbolizer, 6, &geom, &feature).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].deduplication_distance, Some(400.0));
    }

    #[test]
    fn test_line_label_skips_tiny_features() {
        let geom = vec![vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]];
        let feature = named(GeomType::Line, geom.clone(), "Alley");
        assert!(place(&LineLabelSymbolizer::default(), 0, &geom, &feature).is_none());
    }

    #[test]
    fn test_bent_line_splits_runs() {
        let geom = vec![vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 200.0),
        ]];
        let candidates = simple_label(&geom, 50.0, 1000.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].start, Point::new(30.0, 0.0));
        assert_eq!(candidates[0].end, Point::new(30.0, 50.0));
    }

    #[test]
    fn test_padding_grows_bboxes() {
        let point = vec![vec![Point::new(0.0, 0.0)]];
        let feature = named(GeomType::Point, point.clone(), "x");
        let padded = PaddedSymbolizer::new(2.0, Arc::new(CircleSymbolizer::new(3.0)));
        let labels = place(&padded, 0, &point, &feature).unwrap();
        assert_eq!(labels[0].bboxes[0], Bounds::from_coords(-5.0, -5.0, 5.0, 5.0));
    }
}
