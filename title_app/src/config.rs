//! Title application settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use text3d::config::{Config, ConfigError};
use text3d::foundation::math::constants::{HALF_PI, QUARTER_PI};
use text3d::foundation::math::Vec3;
use text3d::material::{SurfaceMaterial, TextureRef};
use text3d::text::{TextMeshOptions, TransformHooks};

/// One live text line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextConfig {
    /// Initial text
    pub text: String,
    /// Catalog font name
    pub font: String,
    /// Shape and material
    pub options: TextMeshOptions,
    /// Euler rotation applied to every generated geometry (radians)
    pub rotation: Vec3,
    /// Offset applied after the rotation
    pub translation: Vec3,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: "minecrafter".to_string(),
            options: TextMeshOptions::new(1.0, 0.4),
            rotation: Vec3::zeros(),
            translation: Vec3::zeros(),
        }
    }
}

impl TextConfig {
    /// Hooks that place the generated geometry
    pub fn hooks(&self) -> TransformHooks {
        TransformHooks::rotation(self.rotation).with_translation(self.translation)
    }

    fn validate(&self, label: &str) -> Result<(), ConfigError> {
        let options = &self.options;
        if options.size <= 0.0 || options.depth < 0.0 || options.curve_segments == 0 {
            return Err(ConfigError::Invalid(format!(
                "{label}: size must be positive, depth non-negative and curve_segments at least 1"
            )));
        }
        Ok(())
    }
}

/// Top-level settings
///
/// Files are read as overrides on top of [`TitleAppConfig::default`], field
/// by field, so a partial `[subtitle]` section keeps the subtitle's own
/// placement and material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TitleAppFile")]
pub struct TitleAppConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Root that font locations are resolved against
    pub assets_dir: PathBuf,
    /// Sleep between frames
    pub frame_interval_ms: u64,
    /// Main title line
    pub title: TextConfig,
    /// Line below the title
    pub subtitle: TextConfig,
}

impl Default for TitleAppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            assets_dir: PathBuf::from("resources"),
            frame_interval_ms: 16,
            title: TextConfig {
                text: "minecraft".to_string(),
                rotation: Vec3::new(-QUARTER_PI, 0.0, 0.0),
                ..TextConfig::default()
            },
            subtitle: TextConfig {
                text: "subtitle".to_string(),
                options: TextMeshOptions::new(1.0, 0.4).with_material(SurfaceMaterial::textured_phong(
                    TextureRef::new("textures/blueprint.jpg").with_repeat(1.0, 1.0),
                )),
                rotation: Vec3::new(-QUARTER_PI + HALF_PI, 0.0, 0.0),
                translation: Vec3::new(0.0, -0.58, -0.98),
                ..TextConfig::default()
            },
        }
    }
}

impl Config for TitleAppConfig {}

/// On-disk shape of [`TitleAppConfig`]; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TitleAppFile {
    log_level: Option<String>,
    assets_dir: Option<PathBuf>,
    frame_interval_ms: Option<u64>,
    title: TextOverrides,
    subtitle: TextOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextOverrides {
    text: Option<String>,
    font: Option<String>,
    options: OptionOverrides,
    rotation: Option<Vec3>,
    translation: Option<Vec3>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OptionOverrides {
    size: Option<f32>,
    depth: Option<f32>,
    curve_segments: Option<u32>,
    material: Option<SurfaceMaterial>,
}

impl TextOverrides {
    fn apply(self, mut line: TextConfig) -> TextConfig {
        let options = self.options;
        line.text = self.text.unwrap_or(line.text);
        line.font = self.font.unwrap_or(line.font);
        line.options.size = options.size.unwrap_or(line.options.size);
        line.options.depth = options.depth.unwrap_or(line.options.depth);
        line.options.curve_segments = options.curve_segments.unwrap_or(line.options.curve_segments);
        line.options.material = options.material.or(line.options.material);
        line.rotation = self.rotation.unwrap_or(line.rotation);
        line.translation = self.translation.unwrap_or(line.translation);
        line
    }
}

impl From<TitleAppFile> for TitleAppConfig {
    fn from(file: TitleAppFile) -> Self {
        let defaults = Self::default();
        Self {
            log_level: file.log_level.unwrap_or(defaults.log_level),
            assets_dir: file.assets_dir.unwrap_or(defaults.assets_dir),
            frame_interval_ms: file.frame_interval_ms.unwrap_or(defaults.frame_interval_ms),
            title: file.title.apply(defaults.title),
            subtitle: file.subtitle.apply(defaults.subtitle),
        }
    }
}

impl TitleAppConfig {
    /// Reject values the controllers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame_interval_ms must be at least 1".into()));
        }
        self.title.validate("title")?;
        self.subtitle.validate("subtitle")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_title_scene() {
        let config = TitleAppConfig::default();
        assert_eq!(config.title.text, "minecraft");
        assert_eq!(config.subtitle.text, "subtitle");
        assert_relative_eq!(config.title.rotation.x, -QUARTER_PI);
        assert_relative_eq!(config.subtitle.rotation.x, QUARTER_PI);
        assert_relative_eq!(config.subtitle.translation.z, -0.98);
        assert_relative_eq!(config.title.options.depth, 0.4);
        assert!(config.title.options.material.is_none());
        match &config.subtitle.options.material {
            Some(SurfaceMaterial::Phong { texture: Some(texture), .. }) => {
                assert_eq!(texture.path, "textures/blueprint.jpg");
                assert_eq!(texture.repeat, [1.0, 1.0]);
            }
            other => panic!("unexpected subtitle material {other:?}"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TitleAppConfig::default();
        config.title.font = "minecrafter-alt".into();

        for file in ["title.toml", "title.ron"] {
            let path = dir.path().join(file);
            config.save_to_file(&path).unwrap();
            assert_eq!(TitleAppConfig::load_from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("title.toml");
        std::fs::write(&path, "log_level = \"debug\"\n\n[title]\ntext = \"hello\"\n").unwrap();

        let config = TitleAppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.title.text, "hello");
        assert_eq!(config.title.font, "minecrafter");
        assert_eq!(config.subtitle, TitleAppConfig::default().subtitle);
    }

    #[test]
    fn test_partial_sections_keep_line_placement() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = TitleAppConfig::default();

        let path = dir.path().join("title.toml");
        std::fs::write(
            &path,
            "[title]\ntext = \"hello\"\n\n[subtitle]\ntext = \"world\"\n\n[subtitle.options]\nsize = 2.0\n",
        )
        .unwrap();
        let config = TitleAppConfig::load_from_file(&path).unwrap();

        assert_eq!(config.title.text, "hello");
        assert_eq!(config.title.rotation, defaults.title.rotation);
        assert_eq!(config.subtitle.text, "world");
        assert_eq!(config.subtitle.rotation, defaults.subtitle.rotation);
        assert_eq!(config.subtitle.translation, defaults.subtitle.translation);
        assert_relative_eq!(config.subtitle.options.size, 2.0);
        assert_relative_eq!(config.subtitle.options.depth, 0.4);
        assert_eq!(config.subtitle.options.material, defaults.subtitle.options.material);

        let path = dir.path().join("title.ron");
        std::fs::write(&path, "(subtitle: (text: \"world\", font: \"minecrafter-alt\"))").unwrap();
        let config = TitleAppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.subtitle.font, "minecrafter-alt");
        assert_eq!(config.subtitle.translation, defaults.subtitle.translation);
        assert_eq!(config.title, defaults.title);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = TitleAppConfig::default();
        config.subtitle.options.size = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = TitleAppConfig { frame_interval_ms: 0, ..TitleAppConfig::default() };
        assert!(config.validate().is_err());
    }
}
