//! Image metadata extraction.
//!
//! Recovers pixel dimensions from rendered artifacts without decoding
//! them: the PNG IHDR header for raster output, the root `<svg>` element's
//! attributes for vector output. Failure to determine dimensions is never
//! fatal — the caller simply omits size attributes.

use std::sync::LazyLock;

use regex::Regex;

use crate::variant::DiagramFormat;

/// Matches the root `<svg ...>` start tag.
static SVG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg[^>]*>").unwrap());

/// Dimension attribute with an optional CSS unit, e.g. `width="210mm"`.
static SVG_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bwidth\s*=\s*"\s*([0-9]+(?:\.[0-9]+)?)\s*(px|pt|pc|mm|cm|in)?\s*""#).unwrap()
});
static SVG_HEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bheight\s*=\s*"\s*([0-9]+(?:\.[0-9]+)?)\s*(px|pt|pc|mm|cm|in)?\s*""#).unwrap()
});

/// `viewBox="min-x min-y width height"`, comma or whitespace separated.
static SVG_VIEWBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bviewBox\s*=\s*"\s*[-0-9.]+[\s,]+[-0-9.]+[\s,]+([0-9]+(?:\.[0-9]+)?)[\s,]+([0-9]+(?:\.[0-9]+)?)\s*""#,
    )
    .unwrap()
});

/// Extract pixel dimensions from a rendered artifact.
///
/// Returns `None` for the literal format and whenever the artifact does
/// not declare usable dimensions.
#[must_use]
pub fn extract(bytes: &[u8], format: DiagramFormat) -> Option<(u32, u32)> {
    match format {
        DiagramFormat::Png => png_dimensions(bytes),
        DiagramFormat::Svg => svg_dimensions(bytes),
        DiagramFormat::Txt => None,
    }
}

/// Read width/height from the PNG IHDR chunk.
///
/// PNG layout: 8-byte signature, 4-byte chunk length, `IHDR` type, then
/// big-endian width and height at bytes 16..24.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 {
        return None;
    }
    if &data[0..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

/// CSS absolute-unit to pixel ratio (96 px per inch).
fn unit_to_px(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        None | Some("px") => value,
        Some("pt") => value * 96.0 / 72.0,
        Some("pc") => value * 16.0,
        Some("mm") => value * 96.0 / 25.4,
        Some("cm") => value * 96.0 / 2.54,
        Some("in") => value * 96.0,
        Some(_) => value,
    }
}

/// Read declared dimensions from the root `<svg>` tag.
///
/// Prefers explicit `width`/`height` attributes (with unit conversion);
/// falls back to the `viewBox` extent; returns `None` when neither is
/// declared rather than guessing.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn svg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let text = String::from_utf8_lossy(data);
    let tag = SVG_TAG.find(&text)?.as_str();

    let dim = |re: &Regex| -> Option<f64> {
        let caps = re.captures(tag)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        Some(unit_to_px(value, caps.get(2).map(|m| m.as_str())))
    };

    if let (Some(w), Some(h)) = (dim(&SVG_WIDTH), dim(&SVG_HEIGHT)) {
        return Some((w.round() as u32, h.round() as u32));
    }

    let caps = SVG_VIEWBOX.captures(tag)?;
    let w: f64 = caps.get(1)?.as_str().parse().ok()?;
    let h: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some((w.round() as u32, h.round() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal PNG header with the given dimensions.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"\x89PNG\r\n\x1a\n");
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(
            extract(&png_bytes(100, 50), DiagramFormat::Png),
            Some((100, 50))
        );
    }

    #[test]
    fn test_png_bad_signature() {
        assert_eq!(extract(b"not a png at all, sorry", DiagramFormat::Png), None);
    }

    #[test]
    fn test_png_truncated() {
        assert_eq!(extract(b"\x89PNG\r\n\x1a\n", DiagramFormat::Png), None);
    }

    #[test]
    fn test_svg_pixel_attributes() {
        let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="136px" height="210px"><rect/></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), Some((136, 210)));
    }

    #[test]
    fn test_svg_unitless_attributes() {
        let svg = br#"<svg width="320" height="200"></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), Some((320, 200)));
    }

    #[test]
    fn test_svg_point_units_converted() {
        // 72pt = 96px, 36pt = 48px
        let svg = br#"<svg width="72pt" height="36pt"></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), Some((96, 48)));
    }

    #[test]
    fn test_svg_metric_units_converted() {
        // 25.4mm = 1in = 96px; 2.54cm = 1in = 96px
        let svg = br#"<svg width="25.4mm" height="2.54cm"></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), Some((96, 96)));
    }

    #[test]
    fn test_svg_viewbox_fallback() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300"><g/></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), Some((400, 300)));
    }

    #[test]
    fn test_svg_viewbox_with_commas() {
        let svg = br#"<svg viewBox="0, 0, 120.5, 60"></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), Some((121, 60)));
    }

    #[test]
    fn test_svg_width_height_preferred_over_viewbox() {
        let svg = br#"<svg width="100" height="50" viewBox="0 0 400 300"></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), Some((100, 50)));
    }

    #[test]
    fn test_svg_without_dimensions_returns_none() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#;
        assert_eq!(extract(svg, DiagramFormat::Svg), None);
    }

    #[test]
    fn test_svg_not_svg_returns_none() {
        assert_eq!(extract(b"<html></html>", DiagramFormat::Svg), None);
    }

    #[test]
    fn test_txt_always_none() {
        assert_eq!(extract(b"A -> B", DiagramFormat::Txt), None);
    }
}
