use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::{LabelOrientation, LabelPlacement, Rect};

pub(super) fn text_width(text: &str, font_size: f32, theme: &Theme, config: &LayoutConfig) -> f32 {
    if !config.fast_text_metrics
        && let Some(width) =
            text_metrics::measure_text_width(text, font_size, theme.font_family.as_str())
    {
        return width;
    }
    estimate_width(text, font_size)
}

pub(super) fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Advance of a glyph in ems, approximating a Helvetica-like sans face.
pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.278,
        '.' | ',' | ':' | ';' | '!' | '|' | '\'' => 0.278,
        '(' | ')' | '[' | ']' | '{' | '}' | '/' | '\\' | '-' => 0.333,
        '¹' | '²' | '³' | '⁴' | '⁵' | '⁶' | '⁷' | '⁸' | '⁹' | '⁰' => 0.333,
        'I' => 0.278,
        'J' => 0.5,
        'M' => 0.833,
        'W' => 0.944,
        'i' | 'j' | 'l' => 0.222,
        'f' | 't' | 'r' => 0.333,
        'm' => 0.833,
        'w' => 0.722,
        '_' | '?' | '#' | '$' | '*' | '+' | '=' => 0.584,
        '0'..='9' => 0.556,
        'A'..='Z' => 0.667,
        'a'..='z' => 0.556,
        _ => 0.6,
    }
}

/// Fits `text` inside `rect`: horizontal when it fits, rotated when only the
/// lane height is long enough, otherwise shrunk along the longer side.
pub(super) fn place_label(
    text: &str,
    rect: &Rect,
    font_size: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> LabelPlacement {
    let (x, y) = rect.center();
    let pad = config.label_padding * 2.0;
    let room_x = (rect.width - pad).max(0.0);
    let room_y = (rect.height - pad).max(0.0);
    let width = text_width(text, font_size, theme, config);

    let (orientation, size) = if width <= room_x {
        (LabelOrientation::Horizontal, font_size)
    } else if width <= room_y && font_size <= room_x {
        (LabelOrientation::Vertical, font_size)
    } else {
        let (orientation, room) = if room_y > room_x {
            (LabelOrientation::Vertical, room_y)
        } else {
            (LabelOrientation::Horizontal, room_x)
        };
        let scaled = if width > 0.0 {
            font_size * room / width
        } else {
            font_size
        };
        (
            orientation,
            scaled.min(font_size).max(config.min_label_font_size),
        )
    };

    LabelPlacement {
        text: text.to_string(),
        x,
        y,
        font_size: size,
        orientation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(width: f32, height: f32) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    #[test]
    fn short_label_stays_horizontal() {
        let placement = place_label(
            "CRC16",
            &rect(640.0, 80.0),
            10.0,
            &Theme::classic(),
            &LayoutConfig::default(),
        );
        assert_eq!(placement.orientation, LabelOrientation::Horizontal);
        assert_eq!(placement.font_size, 10.0);
        assert_eq!((placement.x, placement.y), (320.0, 40.0));
    }

    #[test]
    fn long_label_in_single_bit_is_rotated() {
        // ~55px of text against a 40px wide, 80px tall cell.
        let placement = place_label(
            "BEATSYNC",
            &rect(40.0, 80.0),
            10.0,
            &Theme::classic(),
            &LayoutConfig::default(),
        );
        assert_eq!(placement.orientation, LabelOrientation::Vertical);
        assert_eq!(placement.font_size, 10.0);
    }

    #[test]
    fn oversized_label_shrinks_but_respects_minimum() {
        let config = LayoutConfig::default();
        let placement = place_label(
            "SUBUCOM_MAJOR_REVISION_WITH_A_VERY_LONG_SUFFIX",
            &rect(80.0, 80.0),
            10.0,
            &Theme::classic(),
            &config,
        );
        assert!(placement.font_size < 10.0);
        assert!(placement.font_size >= config.min_label_font_size);
    }

    #[test]
    fn estimate_grows_with_text() {
        assert!(estimate_width("MM", 10.0) > estimate_width("II", 10.0));
        assert_eq!(estimate_width("", 10.0), 0.0);
    }
}
