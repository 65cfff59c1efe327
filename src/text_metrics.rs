use crate::config::TextConfig;
#[cfg(feature = "fonts")]
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
#[cfg(feature = "fonts")]
use std::collections::HashMap;
#[cfg(feature = "fonts")]
use ttf_parser::Face;

/// Collision box of a label, already swapped for rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub width: f32,
    pub height: f32,
    pub half_width: f32,
    pub half_height: f32,
}

/// Source of unrotated `(width, height)` text extents.
pub trait TextMeasure {
    fn measure(&self, word: &str, font_size: f32) -> (f32, f32);
}

/// Glyph-free estimate: every character is `char_width_factor` em wide and
/// the line is `char_height_factor` em tall. Deliberately overestimates.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMetrics {
    pub char_width_factor: f32,
    pub char_height_factor: f32,
}

impl Default for EstimatedMetrics {
    fn default() -> Self {
        Self::from(&TextConfig::default())
    }
}

impl From<&TextConfig> for EstimatedMetrics {
    fn from(config: &TextConfig) -> Self {
        Self {
            char_width_factor: config.char_width_factor,
            char_height_factor: config.char_height_factor,
        }
    }
}

impl TextMeasure for EstimatedMetrics {
    fn measure(&self, word: &str, font_size: f32) -> (f32, f32) {
        let avg_char_width = font_size * self.char_width_factor;
        let char_height = font_size * self.char_height_factor;
        (word.chars().count() as f32 * avg_char_width, char_height)
    }
}

pub fn estimate_dimensions(
    word: &str,
    font_size: f32,
    rotated: bool,
    metrics: &dyn TextMeasure,
) -> TextBox {
    let (text_width, text_height) = metrics.measure(word, font_size);
    let (width, height) = if rotated {
        (text_height, text_width)
    } else {
        (text_width, text_height)
    };
    TextBox {
        width,
        height,
        half_width: width / 2.0,
        half_height: height / 2.0,
    }
}

/// Advance-width measurement against an installed system font.
///
/// Advances are read once at load time (ASCII plus Latin-1/Extended-A) and
/// stored in em units; other characters fall back to the mean ASCII advance.
/// Height keeps the estimator's factor since glyph extents vary per word.
#[cfg(feature = "fonts")]
#[derive(Debug, Clone)]
pub struct FontMetrics {
    family: String,
    ascii_advances: [f32; 128],
    extended_advances: HashMap<char, f32>,
    fallback_advance: f32,
    char_height_factor: f32,
}

#[cfg(feature = "fonts")]
impl FontMetrics {
    pub fn load(font_family: &str, char_height_factor: f32) -> Option<Self> {
        let mut db = Database::new();
        db.load_system_fonts();

        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|&name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query)?;
        let mut loaded = None;
        db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                loaded = Some(Self::from_face(&face, font_family, char_height_factor));
            }
        });
        let metrics = loaded?;
        tracing::debug!(family = %metrics.family, "loaded font metrics");
        Some(metrics)
    }

    fn from_face(face: &Face<'_>, family: &str, char_height_factor: f32) -> Self {
        let units_per_em = face.units_per_em().max(1) as f32;
        let advance_em = |ch: char| -> Option<f32> {
            let glyph = face.glyph_index(ch)?;
            let advance = face.glyph_hor_advance(glyph)?;
            (advance > 0).then(|| advance as f32 / units_per_em)
        };

        let mut ascii_advances = [0.0f32; 128];
        let mut total = 0.0f32;
        let mut found = 0usize;
        for byte in 0x20u8..0x7f {
            if let Some(advance) = advance_em(byte as char) {
                ascii_advances[byte as usize] = advance;
                total += advance;
                found += 1;
            }
        }
        let fallback_advance = if found == 0 { 0.56 } else { total / found as f32 };

        let extended_advances = (0xA0u32..0x180)
            .filter_map(char::from_u32)
            .filter_map(|ch| advance_em(ch).map(|advance| (ch, advance)))
            .collect();

        Self {
            family: family.to_string(),
            ascii_advances,
            extended_advances,
            fallback_advance,
            char_height_factor,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}

#[cfg(feature = "fonts")]
impl TextMeasure for FontMetrics {
    fn measure(&self, word: &str, font_size: f32) -> (f32, f32) {
        let mut em = 0.0f32;
        for ch in word.chars() {
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else {
                self.extended_advances.get(&ch).copied().unwrap_or(0.0)
            };
            em += if advance > 0.0 {
                advance
            } else {
                self.fallback_advance
            };
        }
        (em * font_size, font_size * self.char_height_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_uses_char_multipliers() {
        let metrics = EstimatedMetrics::default();
        let text = estimate_dimensions("hello", 20.0, false, &metrics);
        assert!((text.width - 5.0 * 20.0 * 0.58).abs() < 1e-4);
        assert!((text.height - 20.0 * 0.98).abs() < 1e-4);
        assert!((text.half_width * 2.0 - text.width).abs() < 1e-4);
    }

    #[test]
    fn rotation_swaps_extents() {
        let metrics = EstimatedMetrics::default();
        let flat = estimate_dimensions("rotate", 30.0, false, &metrics);
        let turned = estimate_dimensions("rotate", 30.0, true, &metrics);
        assert_eq!(flat.width, turned.height);
        assert_eq!(flat.height, turned.width);
        assert_eq!(flat.half_width, turned.half_height);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let metrics = EstimatedMetrics::default();
        let ascii = estimate_dimensions("cafe", 10.0, false, &metrics);
        let accented = estimate_dimensions("café", 10.0, false, &metrics);
        assert_eq!(ascii.width, accented.width);
    }
}
