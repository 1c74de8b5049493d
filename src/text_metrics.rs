//! Label width measurement backed by system fonts.
//!
//! Faces are resolved once per font family and kept in a process-wide memo.
//! Callers fall back to the estimate table in `layout::text` when no font
//! can be found.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width in pixels of `text` set in `font_family` at `font_size`, or `None`
/// when no matching face is installed.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = normalize_family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(&key);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        face.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    // Advance per char in font units; `None` when the face lacks the glyph.
    advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let units_per_em = Face::parse(&data, index).ok()?.units_per_em().max(1);
        Some(Self {
            data,
            index,
            units_per_em: f32::from(units_per_em),
            advances: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !self.advances.contains_key(ch))
            .collect();
        if !missing.is_empty() {
            let face = Face::parse(&self.data, self.index).ok()?;
            for ch in missing {
                let advance = face
                    .glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph));
                self.advances.insert(ch, advance);
            }
        }

        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| match self.advances.get(&ch).copied().flatten() {
                Some(advance) if advance > 0 => f32::from(advance) * scale,
                _ => fallback,
            })
            .sum::<f32>();
        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 10.0, "sans-serif"), Some(0.0));
        assert_eq!(measure_text_width("ABC", 0.0, "sans-serif"), Some(0.0));
    }

    #[test]
    fn wider_text_measures_wider_when_fonts_exist() {
        // Headless CI images may not ship fonts at all.
        let Some(short) = measure_text_width("AB", 10.0, "sans-serif") else {
            return;
        };
        let long = measure_text_width("ABABAB", 10.0, "sans-serif").unwrap_or(0.0);
        assert!(long > short);
    }

    #[test]
    fn family_key_defaults_to_sans() {
        assert_eq!(normalize_family_key("  "), "sans-serif");
        assert_eq!(normalize_family_key(" Inter "), "Inter");
    }
}
