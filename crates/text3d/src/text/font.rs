//! Parsed glyph outline data
//!
//! Fonts arrive either as typeface JSON (glyph outlines pre-extracted into
//! command strings) or as TrueType/OpenType binaries read with `ttf-parser`.
//! Both are normalized into [`FontData`]: per-character outline commands in
//! font units plus the metrics layout needs.

use std::collections::HashMap;
use std::path::Path;

use lyon_path::math::{point, Point};
use serde::Deserialize;
use ttf_parser::{Face, OutlineBuilder};

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Errors that can occur during font operations
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// Failed to read font bytes from their source
    #[error("Failed to read font '{location}': {source}")]
    Io {
        /// Resource location that was requested
        location: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No font registered under this location
    #[error("Font not found: {0}")]
    NotFound(String),

    /// Bytes were fetched but could not be parsed
    #[error("Failed to parse font '{location}': {reason}")]
    Parse {
        /// Resource location that was parsed
        location: String,
        /// Parser message
        reason: String,
    },

    /// Extension does not map to a known font format
    #[error("Unsupported font format: {0}")]
    UnsupportedFormat(String),
}

/// On-disk font encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    /// Typeface JSON with `glyphs`/`resolution`/`boundingBox`
    TypefaceJson,
    /// TrueType or OpenType binary
    OpenType,
}

impl FontFormat {
    /// Pick the format from a resource location's extension
    pub fn from_location(location: &str) -> FontResult<Self> {
        let ext = Path::new(location)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::TypefaceJson),
            Some("ttf" | "otf") => Ok(Self::OpenType),
            _ => Err(FontError::UnsupportedFormat(location.to_string())),
        }
    }
}

/// One outline drawing command in font units (y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineCommand {
    /// Start a new contour
    MoveTo(Point),
    /// Straight edge
    LineTo(Point),
    /// Quadratic Bézier edge
    QuadTo {
        /// Control point
        ctrl: Point,
        /// End point
        to: Point,
    },
    /// Cubic Bézier edge
    CubicTo {
        /// First control point
        ctrl1: Point,
        /// Second control point
        ctrl2: Point,
        /// End point
        to: Point,
    },
    /// Close the current contour
    Close,
}

/// Outline and advance of a single character
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub advance: f32,
    /// Outline commands; empty for whitespace
    pub commands: Vec<OutlineCommand>,
}

/// Glyph outlines for one font, ready for layout
#[derive(Debug, Clone)]
pub struct FontData {
    family: String,
    units_per_em: f32,
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

impl FontData {
    /// Assemble font data from already-extracted glyphs
    pub fn new(
        family: impl Into<String>,
        units_per_em: f32,
        line_height: f32,
        glyphs: HashMap<char, Glyph>,
    ) -> Self {
        Self {
            family: family.into(),
            units_per_em,
            line_height,
            glyphs,
        }
    }

    /// Parse font bytes, choosing the decoder from `location`'s extension
    pub fn parse(location: &str, bytes: &[u8]) -> FontResult<Self> {
        let font = match FontFormat::from_location(location)? {
            FontFormat::TypefaceJson => Self::from_typeface_json(location, bytes)?,
            FontFormat::OpenType => Self::from_opentype(location, bytes)?,
        };
        log::debug!(
            "Parsed font '{}' from {}: {} glyphs, {} units/em",
            font.family,
            location,
            font.glyphs.len(),
            font.units_per_em
        );
        Ok(font)
    }

    /// Decode typeface JSON
    pub fn from_typeface_json(location: &str, bytes: &[u8]) -> FontResult<Self> {
        let parse_err = |reason: String| FontError::Parse {
            location: location.to_string(),
            reason,
        };

        let raw: TypefaceJson = serde_json::from_slice(bytes).map_err(|e| parse_err(e.to_string()))?;
        if raw.resolution <= 0.0 {
            return Err(parse_err(format!("resolution must be positive, got {}", raw.resolution)));
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                log::trace!("Skipping multi-character glyph key {key:?} in {location}");
                continue;
            };
            let commands = match glyph.o.as_deref() {
                Some(outline) => parse_outline(outline).map_err(|reason| parse_err(format!("glyph {key:?}: {reason}")))?,
                None => Vec::new(),
            };
            glyphs.insert(ch, Glyph { advance: glyph.ha, commands });
        }

        let bbox = raw.bounding_box;
        let line_height = bbox.y_max - bbox.y_min + raw.underline_thickness;

        Ok(Self::new(
            raw.family_name.unwrap_or_else(|| location.to_string()),
            raw.resolution,
            line_height,
            glyphs,
        ))
    }

    /// Decode a TrueType/OpenType binary
    ///
    /// Every character reachable through a Unicode cmap subtable is outlined
    /// up front so the result no longer borrows the font bytes.
    pub fn from_opentype(location: &str, bytes: &[u8]) -> FontResult<Self> {
        let face = Face::parse(bytes, 0).map_err(|e| FontError::Parse {
            location: location.to_string(),
            reason: e.to_string(),
        })?;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|code_point| {
                    let Some(ch) = char::from_u32(code_point) else { return };
                    if glyphs.contains_key(&ch) {
                        return;
                    }
                    let Some(id) = subtable.glyph_index(code_point) else { return };
                    let mut sink = CommandSink::default();
                    // Outline-less glyphs (space) still get an advance
                    let _ = face.outline_glyph(id, &mut sink);
                    glyphs.insert(
                        ch,
                        Glyph {
                            advance: f32::from(face.glyph_hor_advance(id).unwrap_or(0)),
                            commands: sink.commands,
                        },
                    );
                });
            }
        }

        let family = face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
            .and_then(|name| name.to_string())
            .unwrap_or_else(|| location.to_string());
        let line_height =
            f32::from(face.ascender()) - f32::from(face.descender()) + f32::from(face.line_gap());

        Ok(Self::new(family, f32::from(face.units_per_em()), line_height, glyphs))
    }

    /// Family name, or the source location when the font has none
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Font units per em (typeface `resolution`)
    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    /// Baseline-to-baseline distance in font units
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Look up a character
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    /// Number of characters with glyph data
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypefaceJson {
    glyphs: HashMap<String, TypefaceGlyph>,
    resolution: f32,
    bounding_box: TypefaceBounds,
    #[serde(default)]
    underline_thickness: f32,
    #[serde(default)]
    family_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypefaceGlyph {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypefaceBounds {
    y_min: f32,
    y_max: f32,
}

/// Parse a typeface outline command string
///
/// `q` and `b` list the end point before their control points.
fn parse_outline(outline: &str) -> Result<Vec<OutlineCommand>, String> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();

    while let Some(op) = tokens.next() {
        let command = match op {
            "m" => OutlineCommand::MoveTo(next_point(&mut tokens, op)?),
            "l" => OutlineCommand::LineTo(next_point(&mut tokens, op)?),
            "q" => {
                let to = next_point(&mut tokens, op)?;
                let ctrl = next_point(&mut tokens, op)?;
                OutlineCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = next_point(&mut tokens, op)?;
                let ctrl1 = next_point(&mut tokens, op)?;
                let ctrl2 = next_point(&mut tokens, op)?;
                OutlineCommand::CubicTo { ctrl1, ctrl2, to }
            }
            "z" => OutlineCommand::Close,
            other => return Err(format!("unknown outline command {other:?}")),
        };
        commands.push(command);
    }

    Ok(commands)
}

fn next_point(tokens: &mut std::str::SplitWhitespace<'_>, op: &str) -> Result<Point, String> {
    let mut coord = || -> Result<f32, String> {
        let token = tokens.next().ok_or_else(|| format!("'{op}' is missing coordinates"))?;
        token.parse::<f32>().map_err(|_| format!("bad coordinate {token:?} after '{op}'"))
    };
    let x = coord()?;
    let y = coord()?;
    Ok(point(x, y))
}

#[derive(Default)]
struct CommandSink {
    commands: Vec<OutlineCommand>,
}

impl OutlineBuilder for CommandSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(OutlineCommand::MoveTo(point(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(OutlineCommand::LineTo(point(x, y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.commands.push(OutlineCommand::QuadTo {
            ctrl: point(x1, y1),
            to: point(x, y),
        });
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.commands.push(OutlineCommand::CubicTo {
            ctrl1: point(x1, y1),
            ctrl2: point(x2, y2),
            to: point(x, y),
        });
    }

    fn close(&mut self) {
        self.commands.push(OutlineCommand::Close);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-glyph typeface font: a 600x700 box `A`, a box `I` with a
    /// square hole, a whitespace glyph and a `?` fallback. Resolution 1000.
    pub(crate) const BOX_FONT_JSON: &str = r#"{
        "familyName": "Box Sans",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "xMin": 0, "xMax": 800, "yMin": -200, "yMax": 800 },
        "glyphs": {
            "A": { "ha": 700, "x_min": 0, "x_max": 600, "o": "m 0 0 l 600 0 l 600 700 l 0 700 z" },
            "I": { "ha": 400, "x_min": 0, "x_max": 300, "o": "m 0 0 l 300 0 l 300 700 l 0 700 z m 100 100 l 100 300 l 200 300 l 200 100 z" },
            "O": { "ha": 700, "x_min": 0, "x_max": 600, "o": "m 300 0 q 600 0 600 350 q 600 700 300 700 q 0 700 0 350 q 0 0 300 0" },
            "?": { "ha": 500, "x_min": 0, "x_max": 400, "o": "m 0 0 l 400 0 l 400 400 l 0 400 z" },
            " ": { "ha": 300, "x_min": 0, "x_max": 0, "o": "" }
        }
    }"#;

    pub(crate) fn box_font() -> FontData {
        FontData::parse("fonts/box.json", BOX_FONT_JSON.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_typeface_metrics() {
        let font = box_font();
        assert_eq!(font.family(), "Box Sans");
        assert_eq!(font.units_per_em(), 1000.0);
        assert_eq!(font.line_height(), 1050.0);
        assert_eq!(font.glyph_count(), 5);
        assert!(font.glyph(' ').unwrap().commands.is_empty());
        assert_eq!(font.glyph('A').unwrap().advance, 700.0);
    }

    #[test]
    fn test_outline_end_point_comes_first() {
        let commands = parse_outline("m 0 0 q 10 0 5 5 b 20 0 12 3 16 3").unwrap();
        assert_eq!(
            commands[1],
            OutlineCommand::QuadTo { ctrl: point(5.0, 5.0), to: point(10.0, 0.0) }
        );
        assert_eq!(
            commands[2],
            OutlineCommand::CubicTo {
                ctrl1: point(12.0, 3.0),
                ctrl2: point(16.0, 3.0),
                to: point(20.0, 0.0),
            }
        );
    }

    #[test]
    fn test_outline_errors() {
        assert!(parse_outline("m 0").is_err());
        assert!(parse_outline("m 0 x").is_err());
        assert!(parse_outline("k 1 2").is_err());
    }

    #[test]
    fn test_format_from_location() {
        assert_eq!(FontFormat::from_location("fonts/a.json").unwrap(), FontFormat::TypefaceJson);
        assert_eq!(FontFormat::from_location("fonts/a.TTF").unwrap(), FontFormat::OpenType);
        assert!(matches!(
            FontFormat::from_location("fonts/a.woff2"),
            Err(FontError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = FontData::parse("fonts/bad.json", b"{ not json").unwrap_err();
        assert!(matches!(err, FontError::Parse { .. }));
    }

    #[test]
    fn test_garbage_opentype_is_parse_error() {
        let err = FontData::parse("fonts/bad.ttf", &[0u8; 16]).unwrap_err();
        assert!(matches!(err, FontError::Parse { .. }));
    }
}
