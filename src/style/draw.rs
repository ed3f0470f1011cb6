//! Drawing surface that placed labels paint onto.
//!
//! The crate never rasterizes: a label's draw callback issues commands
//! against a [`DrawSurface`] the host provides, with the origin moved to the
//! label anchor.

use crate::core::{bounds::Bounds, geo::Point};
use crate::prelude::Arc;
use crate::spatial::index::SpatialIndex;
use serde::{Deserialize, Serialize};

/// Paints one label with the surface origin at its anchor
pub type DrawFn = Arc<dyn Fn(&mut dyn DrawSurface) + Send + Sync>;

/// Subset of a 2D canvas context used by label symbolizers
pub trait DrawSurface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_font(&mut self, font: &str);
    fn set_fill_style(&mut self, style: &str);
    fn set_stroke_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn stroke_text(&mut self, text: &str, x: f64, y: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);
    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate { x: f64, y: f64 },
    Rotate { radians: f64 },
    Scale { x: f64, y: f64 },
    GlobalAlpha(f64),
    Font(String),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    FillText { text: String, x: f64, y: f64 },
    StrokeText { text: String, x: f64, y: f64 },
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    FillCircle { x: f64, y: f64, radius: f64 },
    StrokeCircle { x: f64, y: f64, radius: f64 },
}

/// Surface that records every call, for tests and for replaying onto a
/// real backend later
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of every `fill_text` call, in order
    pub fn filled_text(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(&self.commands)?)
    }
}

impl DrawSurface for RecordingSurface {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, radians: f64) {
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Scale { x, y });
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_string()));
    }

    fn set_fill_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::FillStyle(style.to_string()));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::StrokeStyle(style.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::StrokeText {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.commands.push(DrawCommand::FillCircle { x, y, radius });
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.commands.push(DrawCommand::StrokeCircle { x, y, radius });
    }
}

/// Paints every placed label touching `region` (zoom-global pixels), with
/// the surface origin at the region's top-left corner. Returns the number
/// of labels drawn.
pub fn paint_labels(surface: &mut dyn DrawSurface, index: &SpatialIndex, region: &Bounds) -> usize {
    let labels = index.labels_in(region);
    for label in &labels {
        let at: Point = label.anchor.subtract(&region.min);
        surface.save();
        surface.translate(at.x, at.y);
        (label.draw)(surface);
        surface.restore();
    }
    labels.len()
}
