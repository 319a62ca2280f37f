//! Glyph layout: places glyph outlines along a baseline
//!
//! Converts a string into one scaled, positioned `lyon` path per visible
//! glyph. Lines break on `\n`; there is no wrapping or justification.

use lyon_path::math::{point, Point};
use lyon_path::Path;

use super::font::{FontData, Glyph, OutlineCommand};

/// Character substituted for glyphs the font lacks
pub const FALLBACK_GLYPH: char = '?';

/// A laid-out glyph outline in world units
#[derive(Debug, Clone)]
pub struct GlyphPath {
    /// Character the outline was taken from (after fallback)
    pub ch: char,
    /// Closed contours, already scaled and offset
    pub path: Path,
}

/// Lay out `text` at `size` world units per em
///
/// Glyphs without outlines (whitespace) only advance the pen.
pub fn layout_text(font: &FontData, text: &str, size: f32) -> Vec<GlyphPath> {
    let scale = size / font.units_per_em();
    let line_height = font.line_height() * scale;

    let mut paths = Vec::new();
    let mut pen_x = 0.0f32;
    let mut pen_y = 0.0f32;

    for ch in text.chars() {
        if ch == '\n' {
            pen_x = 0.0;
            pen_y -= line_height;
            continue;
        }

        let Some((used, glyph)) = resolve_glyph(font, ch) else {
            log::warn!("Character {ch:?} missing from font '{}' and no fallback glyph", font.family());
            continue;
        };

        if !glyph.commands.is_empty() {
            paths.push(GlyphPath {
                ch: used,
                path: build_path(&glyph.commands, scale, point(pen_x, pen_y)),
            });
        }
        pen_x += glyph.advance * scale;
    }

    paths
}

fn resolve_glyph(font: &FontData, ch: char) -> Option<(char, &Glyph)> {
    if let Some(glyph) = font.glyph(ch) {
        return Some((ch, glyph));
    }
    log::debug!("Character {ch:?} missing from font '{}', using {FALLBACK_GLYPH:?}", font.family());
    font.glyph(FALLBACK_GLYPH).map(|glyph| (FALLBACK_GLYPH, glyph))
}

fn build_path(commands: &[OutlineCommand], scale: f32, offset: Point) -> Path {
    let place = |p: Point| point(offset.x + p.x * scale, offset.y + p.y * scale);

    let mut builder = Path::builder();
    let mut open = false;

    for command in commands {
        match *command {
            OutlineCommand::MoveTo(to) => {
                if open {
                    builder.end(true);
                }
                builder.begin(place(to));
                open = true;
            }
            OutlineCommand::LineTo(to) => {
                if open {
                    builder.line_to(place(to));
                } else {
                    builder.begin(place(to));
                    open = true;
                }
            }
            OutlineCommand::QuadTo { ctrl, to } => {
                if open {
                    builder.quadratic_bezier_to(place(ctrl), place(to));
                } else {
                    builder.begin(place(to));
                    open = true;
                }
            }
            OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                if open {
                    builder.cubic_bezier_to(place(ctrl1), place(ctrl2), place(to));
                } else {
                    builder.begin(place(to));
                    open = true;
                }
            }
            OutlineCommand::Close => {
                if open {
                    builder.end(true);
                    open = false;
                }
            }
        }
    }
    if open {
        builder.end(true);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::font::tests::box_font;
    use approx::assert_relative_eq;

    fn first_point(path: &Path) -> Point {
        match path.iter().next() {
            Some(lyon_path::Event::Begin { at }) => at,
            other => panic!("path starts with {other:?}"),
        }
    }

    #[test]
    fn test_advance_and_scale() {
        let font = box_font();
        let glyphs = layout_text(&font, "AA", 2.0);
        assert_eq!(glyphs.len(), 2);
        // 700 units advance at 2/1000 scale
        assert_relative_eq!(first_point(&glyphs[1].path).x, 1.4);
    }

    #[test]
    fn test_whitespace_only_advances() {
        let font = box_font();
        assert!(layout_text(&font, "   ", 1.0).is_empty());

        let glyphs = layout_text(&font, " A", 1.0);
        assert_eq!(glyphs.len(), 1);
        assert_relative_eq!(first_point(&glyphs[0].path).x, 0.3);
    }

    #[test]
    fn test_missing_glyph_uses_fallback() {
        let font = box_font();
        let glyphs = layout_text(&font, "Z", 1.0);
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].ch, FALLBACK_GLYPH);
    }

    #[test]
    fn test_newline_moves_down_one_line() {
        let font = box_font();
        let glyphs = layout_text(&font, "A\nA", 1.0);
        assert_eq!(glyphs.len(), 2);
        let second = first_point(&glyphs[1].path);
        assert_relative_eq!(second.x, 0.0);
        assert_relative_eq!(second.y, -1.05);
    }
}
