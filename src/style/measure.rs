/// Extent of a run of text set in a given font
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    /// Distance from the baseline up to the top of the glyphs
    pub ascent: f64,
    /// Distance from the baseline down to the bottom of the glyphs
    pub descent: f64,
}

impl TextMetrics {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Measures text for label placement. Hosts with a real font stack
/// implement this over their shaper.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, font: &str, text: &str) -> TextMetrics;
}

/// Width-per-character estimate from the pixel size in a CSS font string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateTextMeasurer {
    pub char_width: f64,
    pub ascent: f64,
    pub descent: f64,
    pub fallback_size: f64,
}

impl Default for ApproximateTextMeasurer {
    fn default() -> Self {
        Self {
            char_width: 0.6,
            ascent: 0.8,
            descent: 0.2,
            fallback_size: 12.0,
        }
    }
}

impl ApproximateTextMeasurer {
    /// Pixel size from a font like `"italic 600 14px Noto Sans"`
    pub fn font_size(&self, font: &str) -> f64 {
        font.split_whitespace()
            .find_map(|token| token.strip_suffix("px")?.parse::<f64>().ok())
            .unwrap_or(self.fallback_size)
    }
}

impl TextMeasurer for ApproximateTextMeasurer {
    fn measure(&self, font: &str, text: &str) -> TextMetrics {
        let size = self.font_size(font);
        TextMetrics {
            width: text.chars().count() as f64 * size * self.char_width,
            ascent: size * self.ascent,
            descent: size * self.descent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_parsing() {
        let measurer = ApproximateTextMeasurer::default();
        assert_eq!(measurer.font_size("italic 600 14px Noto Sans"), 14.0);
        assert_eq!(measurer.font_size("bold serif"), 12.0);
    }

    #[test]
    fn test_measure_scales_with_length() {
        let measurer = ApproximateTextMeasurer::default();
        let metrics = measurer.measure("10px sans-serif", "Main");
        assert!((metrics.width - 24.0).abs() < 1e-9);
        assert!((metrics.height() - 10.0).abs() < 1e-9);
    }
}
