//! Style values that are either fixed or computed per zoom and feature.

use crate::prelude::Arc;
use crate::tiles::decode::{Feature, PropValue};
use std::fmt;

/// A constant, or a function of (zoom, feature)
pub enum Attr<T> {
    Constant(T),
    Computed(Arc<dyn Fn(u8, &Feature) -> T + Send + Sync>),
}

impl<T: Clone> Attr<T> {
    pub fn computed(f: impl Fn(u8, &Feature) -> T + Send + Sync + 'static) -> Self {
        Attr::Computed(Arc::new(f))
    }

    pub fn get(&self, zoom: u8, feature: &Feature) -> T {
        match self {
            Attr::Constant(value) => value.clone(),
            Attr::Computed(f) => f(zoom, feature),
        }
    }

    pub fn is_per_feature(&self) -> bool {
        matches!(self, Attr::Computed(_))
    }
}

impl<T> From<T> for Attr<T> {
    fn from(value: T) -> Self {
        Attr::Constant(value)
    }
}

impl From<&str> for Attr<String> {
    fn from(value: &str) -> Self {
        Attr::Constant(value.to_string())
    }
}

impl<T: Clone> Clone for Attr<T> {
    fn clone(&self) -> Self {
        match self {
            Attr::Constant(value) => Attr::Constant(value.clone()),
            Attr::Computed(f) => Attr::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Attr::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransform {
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => text
                .to_lowercase()
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Label text: the first string property found among `label_props`
#[derive(Debug, Clone)]
pub struct TextAttr {
    pub label_props: Attr<Vec<String>>,
    pub text_transform: Option<Attr<TextTransform>>,
}

impl Default for TextAttr {
    fn default() -> Self {
        Self {
            label_props: Attr::Constant(vec!["name".to_string()]),
            text_transform: None,
        }
    }
}

impl TextAttr {
    pub fn new(label_props: &[&str]) -> Self {
        Self {
            label_props: Attr::Constant(label_props.iter().map(|p| p.to_string()).collect()),
            text_transform: None,
        }
    }

    pub fn with_transform(mut self, transform: impl Into<Attr<TextTransform>>) -> Self {
        self.text_transform = Some(transform.into());
        self
    }

    pub fn get(&self, zoom: u8, feature: &Feature) -> Option<String> {
        let text = self
            .label_props
            .get(zoom, feature)
            .iter()
            .find_map(|prop| match feature.prop(prop) {
                Some(PropValue::String(s)) => Some(s.clone()),
                _ => None,
            })?;
        match &self.text_transform {
            Some(transform) => Some(transform.get(zoom, feature).apply(&text)),
            None => Some(text),
        }
    }
}

/// CSS font shorthand, either given outright or composed from parts
#[derive(Debug, Clone)]
pub enum FontAttr {
    Font(Attr<String>),
    Parts {
        family: Attr<String>,
        size: Attr<f64>,
        weight: Option<Attr<String>>,
        style: Option<Attr<String>>,
    },
}

impl Default for FontAttr {
    fn default() -> Self {
        FontAttr::Parts {
            family: "sans-serif".into(),
            size: 12.0.into(),
            weight: None,
            style: None,
        }
    }
}

impl FontAttr {
    pub fn font(font: impl Into<Attr<String>>) -> Self {
        FontAttr::Font(font.into())
    }

    pub fn sized(family: impl Into<Attr<String>>, size: impl Into<Attr<f64>>) -> Self {
        FontAttr::Parts {
            family: family.into(),
            size: size.into(),
            weight: None,
            style: None,
        }
    }

    /// Sets the weight; ignored for an explicit font
    pub fn with_weight(self, value: impl Into<Attr<String>>) -> Self {
        match self {
            FontAttr::Parts {
                family,
                size,
                style,
                ..
            } => FontAttr::Parts {
                family,
                size,
                weight: Some(value.into()),
                style,
            },
            font => font,
        }
    }

    /// Sets the style; ignored for an explicit font
    pub fn with_style(self, value: impl Into<Attr<String>>) -> Self {
        match self {
            FontAttr::Parts {
                family,
                size,
                weight,
                ..
            } => FontAttr::Parts {
                family,
                size,
                weight,
                style: Some(value.into()),
            },
            font => font,
        }
    }

    pub fn get(&self, zoom: u8, feature: &Feature) -> String {
        match self {
            FontAttr::Font(font) => font.get(zoom, feature),
            FontAttr::Parts {
                family,
                size,
                weight,
                style,
            } => {
                let mut font = String::new();
                if let Some(style) = style {
                    font.push_str(&style.get(zoom, feature));
                    font.push(' ');
                }
                if let Some(weight) = weight {
                    font.push_str(&weight.get(zoom, feature));
                    font.push(' ');
                }
                font.push_str(&format!(
                    "{}px {}",
                    size.get(zoom, feature),
                    family.get(zoom, feature)
                ));
                font
            }
        }
    }
}
