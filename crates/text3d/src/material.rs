//! Surface materials for text meshes
//!
//! Mirrors the two shading models the title scene uses: a lit standard
//! material (the default) and a textured Phong material for overrides.

use serde::{Deserialize, Serialize};

/// Color of the default text material
pub const DEFAULT_TEXT_COLOR: Color = Color::from_rgb8(0xdd, 0xdd, 0xdd);

/// RGB color with components in 0.0-1.0
///
/// Serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Color {
    /// Pure white
    pub const WHITE: Self = Self::from_rgb8(0xff, 0xff, 0xff);

    /// Build a color from 8-bit channels
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorParseError(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError(hex.to_string()))
        };
        Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as `#rrggbb`
    pub fn to_hex(self) -> String {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Color string was not `#rrggbb`
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid color '{0}', expected #rrggbb")]
pub struct ColorParseError(pub String);

/// Texture reference resolved by the host renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    /// Image path relative to the asset root
    pub path: String,
    /// UV repeat in U and V (texture wraps with repeat addressing)
    #[serde(default = "TextureRef::default_repeat")]
    pub repeat: [f32; 2],
}

impl TextureRef {
    /// Texture at `path` with no repeat
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            repeat: Self::default_repeat(),
        }
    }

    /// Set UV repeat
    pub fn with_repeat(mut self, u: f32, v: f32) -> Self {
        self.repeat = [u, v];
        self
    }

    fn default_repeat() -> [f32; 2] {
        [1.0, 1.0]
    }
}

/// Shading model and parameters applied to a text mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceMaterial {
    /// Physically based lit material
    Standard {
        /// Base color
        color: Color,
        /// Roughness factor (0.0 = mirror, 1.0 = completely rough)
        roughness: f32,
        /// Metalness factor (0.0 = dielectric, 1.0 = metallic)
        metalness: f32,
    },
    /// Blinn-Phong material with an optional color map
    Phong {
        /// Diffuse color, multiplied with the texture when present
        color: Color,
        /// Specular exponent
        shininess: f32,
        /// Color map
        #[serde(default)]
        texture: Option<TextureRef>,
    },
}

impl SurfaceMaterial {
    /// Standard material with the given color
    pub fn standard(color: Color) -> Self {
        Self::Standard {
            color,
            roughness: 1.0,
            metalness: 0.0,
        }
    }

    /// White Phong material sampling `texture`
    pub fn textured_phong(texture: TextureRef) -> Self {
        Self::Phong {
            color: Color::WHITE,
            shininess: 30.0,
            texture: Some(texture),
        }
    }

    /// Base color regardless of shading model
    pub fn color(&self) -> Color {
        match self {
            Self::Standard { color, .. } | Self::Phong { color, .. } => *color,
        }
    }
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self::standard(DEFAULT_TEXT_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hex_parse() {
        let color = Color::from_hex("#dddddd").unwrap();
        assert_relative_eq!(color.r, 221.0 / 255.0);
        assert_eq!(color, DEFAULT_TEXT_COLOR);
        assert_eq!(Color::from_hex("ff0000").unwrap().to_hex(), "#ff0000");
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Color::from_hex("#ddd").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("#ddddd\u{e9}").is_err());
    }

    #[test]
    fn test_default_is_standard_neutral() {
        match SurfaceMaterial::default() {
            SurfaceMaterial::Standard { color, .. } => assert_eq!(color.to_hex(), "#dddddd"),
            other => panic!("unexpected default material {other:?}"),
        }
    }

    #[test]
    fn test_material_from_toml() {
        let material: SurfaceMaterial = toml::from_str(
            r##"
kind = "phong"
color = "#ffffff"
shininess = 10.0

[texture]
path = "textures/blueprint.jpg"
"##,
        )
        .unwrap();
        let SurfaceMaterial::Phong { texture: Some(texture), .. } = material else {
            panic!("expected textured phong");
        };
        assert_eq!(texture.path, "textures/blueprint.jpg");
        assert_eq!(texture.repeat, [1.0, 1.0]);
    }
}
