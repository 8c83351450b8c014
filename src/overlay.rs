//! Timestamp label rendering.
//!
//! Labels use the 8x8 public-domain bitmap font from `font8x8`, scaled by an
//! integer factor derived from the requested font size. The label sits in a
//! translucent box anchored to the bottom-left corner of the frame.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Pixel, Rgba, RgbaImage};
use tracing::debug;

use crate::config::OverlayConfig;
use crate::error::{Result, SnapshotError};
use crate::timestamp::Timestamp;

const GLYPH_SIZE: u32 = 8;

/// Placement and colors of a label
#[derive(Debug, Clone, Copy)]
pub struct LabelStyle {
    pub font_size: u32,
    pub margin: u32,
    pub text_color: Rgba<u8>,
    pub background_color: Rgba<u8>,
}

impl LabelStyle {
    pub fn from_config(config: &OverlayConfig, font_size: Option<u32>) -> Self {
        Self {
            font_size: font_size.unwrap_or(config.default_font_size),
            margin: config.margin,
            text_color: Rgba(config.text_color),
            background_color: Rgba(config.background_color),
        }
    }

    /// Integer glyph scale for the font size, never below 1
    pub fn scale(&self) -> u64 {
        ((self.font_size as f64 / GLYPH_SIZE as f64).round() as u64).max(1)
    }

    fn padding(&self) -> u64 {
        self.scale() * 2
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default(), None)
    }
}

/// Pixel rectangle covered by a label, including its background box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a label of `char_count` characters lands in an image of the given size.
/// Fails when the label (plus margin) does not fit.
pub fn label_bounds(char_count: usize, style: &LabelStyle, image_width: u32, image_height: u32) -> Result<LabelBounds> {
    let glyph = GLYPH_SIZE as u64 * style.scale();
    let padding = style.padding();
    let margin = style.margin as u64;

    let box_width = (char_count as u64)
        .checked_mul(glyph)
        .and_then(|w| w.checked_add(2 * padding))
        .unwrap_or(u64::MAX);
    let box_height = glyph + 2 * padding;
    let needed_width = box_width.saturating_add(2 * margin);
    let needed_height = box_height + 2 * margin;
    if needed_width > image_width as u64 || needed_height > image_height as u64 {
        return Err(SnapshotError::Overlay(format!(
            "label needs {}x{} pixels but the frame is {}x{}",
            needed_width, needed_height, image_width, image_height
        )));
    }

    // Everything fits inside the image, so the narrowing casts are lossless
    Ok(LabelBounds {
        x: style.margin,
        y: image_height - style.margin - box_height as u32,
        width: box_width as u32,
        height: box_height as u32,
    })
}

/// Draw `prefix` followed by the rendered `timestamp` onto a copy of `image`.
pub fn draw_timestamp_label(
    timestamp: Timestamp,
    prefix: Option<&str>,
    style: &LabelStyle,
    image: &RgbaImage,
) -> Result<RgbaImage> {
    let text = format!("{}{}", prefix.unwrap_or_default(), timestamp.label());
    draw_label(&text, style, image)
}

/// Draw arbitrary text at the label anchor onto a copy of `image`.
pub fn draw_label(text: &str, style: &LabelStyle, image: &RgbaImage) -> Result<RgbaImage> {
    let chars: Vec<char> = text.chars().collect();
    let bounds = label_bounds(chars.len(), style, image.width(), image.height())?;
    debug!("Drawing label \"{}\" at {:?}", text, bounds);

    let mut canvas = image.clone();

    for y in bounds.y..bounds.y + bounds.height {
        for x in bounds.x..bounds.x + bounds.width {
            canvas.get_pixel_mut(x, y).blend(&style.background_color);
        }
    }

    let scale = style.scale() as u32;
    let padding = style.padding() as u32;
    let origin_x = bounds.x + padding;
    let origin_y = bounds.y + padding;

    for (index, ch) in chars.iter().enumerate() {
        let glyph = glyph_for(*ch);
        let glyph_x = origin_x + index as u32 * GLYPH_SIZE * scale;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // Bit 0 is the leftmost pixel of the row
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                let px = glyph_x + col * scale;
                let py = origin_y + row as u32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        canvas.get_pixel_mut(px + dx, py + dy).blend(&style.text_color);
                    }
                }
            }
        }
    }

    Ok(canvas)
}

fn glyph_for(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_scale_from_font_size() {
        let mut style = LabelStyle::default();
        assert_eq!(style.scale(), 3);
        style.font_size = 1;
        assert_eq!(style.scale(), 1);
        style.font_size = 16;
        assert_eq!(style.scale(), 2);
    }

    #[test]
    fn test_bounds_anchor_bottom_left() {
        let style = LabelStyle { font_size: 8, margin: 10, ..LabelStyle::default() };
        let bounds = label_bounds(12, &style, 320, 240).unwrap();
        assert_eq!(bounds.x, 10);
        // 8px glyph + 2px padding above and below
        assert_eq!(bounds.height, 12);
        assert_eq!(bounds.y, 240 - 10 - 12);
        assert_eq!(bounds.width, 12 * 8 + 4);
    }

    #[test]
    fn test_label_changes_anchor_region_only() {
        let source = white(640, 360);
        let style = LabelStyle::default();
        let timestamp = Timestamp::from_secs(12.5).unwrap();
        let stamped = draw_timestamp_label(timestamp, Some("T "), &style, &source).unwrap();

        assert_eq!(stamped.dimensions(), source.dimensions());
        // Source untouched
        assert_eq!(source.get_pixel(15, 345), &Rgba([255, 255, 255, 255]));

        let bounds = label_bounds("T 00:00:12.500".len(), &style, 640, 360).unwrap();
        assert_ne!(stamped.get_pixel(bounds.x, bounds.y), source.get_pixel(bounds.x, bounds.y));
        // Top-right corner is outside the label
        assert_eq!(stamped.get_pixel(639, 0), source.get_pixel(639, 0));
    }

    #[test]
    fn test_text_pixels_use_text_color() {
        let source = white(200, 60);
        let style = LabelStyle { font_size: 8, margin: 0, ..LabelStyle::default() };
        let stamped = draw_label("|", &style, &source).unwrap();
        let text_pixels = stamped
            .pixels()
            .filter(|p| **p == Rgba([255, 255, 255, 255]))
            .count();
        let box_pixels = stamped.pixels().filter(|p| p[0] < 255).count();
        assert!(box_pixels > 0);
        // Everything outside the box stays white, plus the glyph strokes inside it
        assert!(text_pixels > 200 * 60 - 12 * 12);
    }

    #[test]
    fn test_label_too_large_is_error() {
        let source = white(40, 20);
        let timestamp = Timestamp::from_secs(1.0).unwrap();
        let err = draw_timestamp_label(timestamp, None, &LabelStyle::default(), &source).unwrap_err();
        assert!(matches!(err, SnapshotError::Overlay(_)));
    }

    #[test]
    fn test_unknown_glyph_falls_back() {
        assert_eq!(glyph_for('\u{1F3AC}'), glyph_for('?'));
        assert_ne!(glyph_for('0'), [0; 8]);
    }

    #[test]
    fn test_huge_font_size_is_overlay_error() {
        let style = LabelStyle { font_size: u32::MAX, ..LabelStyle::default() };
        let err = label_bounds(20, &style, 1920, 1080).unwrap_err();
        assert!(matches!(err, SnapshotError::Overlay(_)));

        let err = label_bounds(usize::MAX, &LabelStyle::default(), 1920, 1080).unwrap_err();
        assert!(matches!(err, SnapshotError::Overlay(_)));
    }

    #[test]
    fn test_translucent_box_darkens() {
        let source = white(200, 60);
        let style = LabelStyle { font_size: 8, margin: 0, ..LabelStyle::default() };
        let stamped = draw_label(" ", &style, &source).unwrap();
        let pixel = stamped.get_pixel(1, 59);
        assert!(pixel[0] > 60 && pixel[0] < 140);
        assert_eq!(pixel[3], 255);
    }
}
