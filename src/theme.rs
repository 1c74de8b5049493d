use crate::ir::StyleCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fill used for a group of related fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default)]
    pub hatched: bool,
}

impl FieldStyle {
    pub fn filled(fill: impl Into<String>) -> Self {
        Self {
            fill: Some(fill.into()),
            hatched: false,
        }
    }

    pub fn hatched() -> Self {
        Self {
            fill: None,
            hatched: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_weight: String,
    pub text_color: String,
    pub stroke_color: String,
    pub stroke_width: f32,
    pub tick_color: String,
    pub lane_label_color: String,
    pub hatch_color: String,
    pub background: String,
    /// Style for reserved fields that carry no style code.
    pub reserved: FieldStyle,
    pub palette: BTreeMap<StyleCode, FieldStyle>,
}

// Hue per style code, shared by the classic palette.
const CLASSIC_HUES: [(u8, u16); 6] = [(2, 0), (3, 80), (4, 170), (5, 45), (6, 126), (7, 215)];

impl Theme {
    pub fn classic() -> Self {
        let mut palette = BTreeMap::new();
        palette.insert(StyleCode(1), FieldStyle::hatched());
        for (code, hue) in CLASSIC_HUES {
            palette.insert(
                StyleCode(code),
                FieldStyle::filled(format!("hsl({hue}, 100%, 88%)")),
            );
        }
        Self {
            font_family: "sans-serif".to_string(),
            font_weight: "normal".to_string(),
            text_color: "#000000".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 1.0,
            tick_color: "#000000".to_string(),
            lane_label_color: "#555555".to_string(),
            hatch_color: "#9E9E9E".to_string(),
            background: "none".to_string(),
            reserved: FieldStyle::hatched(),
            palette,
        }
    }

    /// Print-friendly variant: no fills, reserved bits stay hatched.
    pub fn mono() -> Self {
        let mut palette = BTreeMap::new();
        palette.insert(StyleCode(1), FieldStyle::hatched());
        Self {
            font_family: "monospace".to_string(),
            background: "#FFFFFF".to_string(),
            hatch_color: "#000000".to_string(),
            lane_label_color: "#000000".to_string(),
            palette,
            ..Self::classic()
        }
    }

    /// Resolves the visual style of a field. An explicit code found in the
    /// palette wins; reserved fields fall back to `reserved`; anything else
    /// is left unfilled.
    pub fn field_style(&self, style: Option<StyleCode>, reserved: bool) -> FieldStyle {
        if let Some(found) = style.and_then(|code| self.palette.get(&code)) {
            return found.clone();
        }
        if reserved {
            self.reserved.clone()
        } else {
            FieldStyle::default()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
