//! Raster style descriptors attached to impact layers.

use serde::{Deserialize, Serialize};

use crate::classification::{create_classes, create_label, humanize_class};
use crate::config::{
    HIGH_CLASS_INDEX, IMPACT_COLOURS, LOW_CLASS_INDEX, MEDIUM_CLASS_INDEX, RASTER_STYLE_TYPE,
    STYLE_CLASS_COUNT, STYLE_TRANSPARENCY,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleClass {
    pub label: String,
    /// Upper bound of the class.
    pub quantity: f64,
    /// 0 (opaque) to 100 (invisible).
    pub transparency: u8,
    /// `#RRGGBB`.
    pub colour: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleInfo {
    pub target_field: Option<String>,
    pub style_classes: Vec<StyleClass>,
    pub style_type: String,
}

impl StyleInfo {
    pub fn raster(style_classes: Vec<StyleClass>) -> Self {
        Self {
            target_field: None,
            style_classes,
            style_type: RASTER_STYLE_TYPE.to_string(),
        }
    }
}

fn severity_word(index: usize) -> Option<&'static str> {
    match index {
        LOW_CLASS_INDEX => Some("Low"),
        MEDIUM_CLASS_INDEX => Some("Medium"),
        HIGH_CLASS_INDEX => Some("High"),
        _ => None,
    }
}

/// Eight-class impact style over the non-zero values of `impact`.
///
/// The severity words are tied to ramp positions, not to which thresholds
/// were enabled.
pub fn impact_style(impact: &[f64]) -> StyleInfo {
    let classes = create_classes(impact, STYLE_CLASS_COUNT);
    let intervals = humanize_class(&classes);
    let style_classes = IMPACT_COLOURS
        .iter()
        .enumerate()
        .map(|(i, colour)| StyleClass {
            label: create_label(&intervals[i], severity_word(i)),
            quantity: classes[i],
            transparency: STYLE_TRANSPARENCY,
            colour: (*colour).to_string(),
        })
        .collect();
    StyleInfo::raster(style_classes)
}
