//! Title scene host
//!
//! Owns the scene and both text controllers, applies console commands and
//! polls the controllers once per frame.

use std::rc::Rc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use text3d::config::ConfigError;
use text3d::scene::{self, Scene, SceneGraph, SharedScene};
use text3d::text::{ControllerEvent, FsFontSource, TextMeshController, TextMeshError, ThreadedFontLoader};

use crate::commands::{Command, Target};
use crate::config::{TextConfig, TitleAppConfig};

/// Host-level failures
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Settings could not be loaded or were rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Initial text could not be applied
    #[error("Text mesh error: {0}")]
    TextMesh(#[from] TextMeshError),

    /// Console reader could not be started
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The title screen: two live text lines in one scene
pub struct TitleApp {
    scene: SharedScene<Scene>,
    title: TextMeshController<Scene>,
    subtitle: TextMeshController<Scene>,
    frame_interval: Duration,
    frame: u64,
}

impl TitleApp {
    /// Build the scene and start loading both fonts
    pub fn new(config: &TitleAppConfig) -> Result<Self, AppError> {
        config.validate()?;
        log::info!("Assets from {}", config.assets_dir.display());

        let scene = scene::shared(Scene::new());
        let source = FsFontSource::new(&config.assets_dir);
        let title = Self::create_line(&scene, "title", &config.title, source.clone())?;
        let subtitle = Self::create_line(&scene, "subtitle", &config.subtitle, source)?;

        Ok(Self {
            scene,
            title,
            subtitle,
            frame_interval: Duration::from_millis(config.frame_interval_ms),
            frame: 0,
        })
    }

    fn create_line(
        scene: &SharedScene<Scene>,
        name: &str,
        line: &TextConfig,
        source: FsFontSource,
    ) -> Result<TextMeshController<Scene>, AppError> {
        let mut controller =
            TextMeshController::new(Rc::clone(scene), line.options.clone(), ThreadedFontLoader::new(source))
                .with_name(name)
                .with_hooks(line.hooks());

        if controller.font() != line.font {
            controller.set_font(&line.font);
        }
        controller.set_text(line.text.as_str())?;
        Ok(controller)
    }

    /// Shared scene handle
    pub fn scene(&self) -> &SharedScene<Scene> {
        &self.scene
    }

    fn controller_mut(&mut self, target: Target) -> &mut TextMeshController<Scene> {
        match target {
            Target::Title => &mut self.title,
            Target::Subtitle => &mut self.subtitle,
        }
    }

    /// Apply one command; returns false on quit
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::SetText { target, text } => {
                if let Err(e) = self.controller_mut(target).set_text(text) {
                    log::error!("[{}] {}", target, e);
                }
            }
            Command::SetFont { target, name } => {
                let selection = self.controller_mut(target).set_font(&name);
                log::info!("[{}] Font -> {}", target, selection.descriptor().name);
            }
            Command::ListFonts => {
                for font in self.title.catalog().iter() {
                    log::info!("{} ({})", font.name, font.source_location);
                }
            }
            Command::DumpScene => self.dump_scene(),
            Command::Quit => return false,
        }
        true
    }

    /// Poll both controllers and log what changed
    pub fn frame(&mut self) -> Vec<ControllerEvent> {
        self.frame += 1;
        let mut events = Vec::new();
        for controller in [&mut self.title, &mut self.subtitle] {
            for event in controller.poll() {
                match &event {
                    ControllerEvent::MeshReplaced { node } => {
                        log::info!("[{}] {:?} -> {:?}", controller.name(), controller.text(), node);
                    }
                    ControllerEvent::MeshCleared => log::info!("[{}] Cleared", controller.name()),
                    ControllerEvent::RegenerationFailed { error } => {
                        log::error!("[{}] {}", controller.name(), error);
                    }
                    other => log::debug!("[{}] {:?}", controller.name(), other),
                }
                events.push(event);
            }
        }
        events
    }

    fn dump_scene(&self) {
        let Ok(scene) = self.scene.try_borrow() else {
            log::warn!("Scene busy");
            return;
        };
        log::info!("Scene: {} node(s), background {}", scene.len(), scene.background.to_hex());
        if let Some(bounds) = scene.world_bounds() {
            log::info!(
                "  bounds ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
                bounds.min.x,
                bounds.min.y,
                bounds.min.z,
                bounds.max.x,
                bounds.max.y,
                bounds.max.z
            );
        }
        for (key, mesh) in scene.iter() {
            log::info!(
                "  {:?} '{}': {} vertices, {} triangles, x offset {:.3}, {:?}",
                key,
                mesh.name,
                mesh.geometry.vertex_count(),
                mesh.geometry.triangle_count(),
                mesh.transform.position.x,
                mesh.material.color().to_hex()
            );
        }
    }

    /// Frame loop fed by console lines until `quit` or the input closes
    pub fn run(&mut self, lines: &Receiver<String>) {
        log::info!("Commands: title <text>, subtitle <text>, title-font <name>, subtitle-font <name>, fonts, scene, quit");
        loop {
            loop {
                match lines.try_recv() {
                    Ok(line) => match Command::parse(&line) {
                        Ok(Some(command)) => {
                            if !self.handle(command) {
                                log::info!("Quit after {} frames", self.frame);
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => log::warn!("{}", e),
                    },
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        log::info!("Input closed after {} frames", self.frame);
                        return;
                    }
                }
            }

            self.frame();
            thread::sleep(self.frame_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const FONT_JSON: &str = r#"{
        "familyName": "Block",
        "resolution": 1000,
        "underlineThickness": 0,
        "boundingBox": { "xMin": 0, "xMax": 500, "yMin": 0, "yMax": 500 },
        "glyphs": {
            "?": { "ha": 600, "x_min": 0, "x_max": 500, "o": "m 0 0 l 500 0 l 500 500 l 0 500 z" },
            " ": { "ha": 300, "x_min": 0, "x_max": 0, "o": "" }
        }
    }"#;

    fn assets() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();
        for name in ["minecrafter", "minecrafter-alt"] {
            std::fs::write(dir.path().join(format!("fonts/{name}.json")), FONT_JSON).unwrap();
        }
        dir
    }

    fn settle(app: &mut TitleApp) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while (app.title.is_loading() || app.subtitle.is_loading()) && Instant::now() < deadline {
            app.frame();
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_title_scene_builds_two_meshes() {
        let dir = assets();
        let config = TitleAppConfig { assets_dir: dir.path().to_path_buf(), ..TitleAppConfig::default() };
        let mut app = TitleApp::new(&config).unwrap();
        settle(&mut app);

        assert_eq!(app.scene().borrow().len(), 2);
        assert!(app.title.mesh().is_some());
        assert!(app.subtitle.mesh().is_some());

        // both lines are centered on x = 0 and the subtitle sits below the title
        let scene = app.scene().borrow();
        let bounds = scene.world_bounds().unwrap();
        assert!((bounds.min.x + bounds.max.x).abs() < 1e-4);
        let title = scene.get(app.title.mesh().unwrap()).and_then(|m| m.world_bounds()).unwrap();
        let subtitle = scene.get(app.subtitle.mesh().unwrap()).and_then(|m| m.world_bounds()).unwrap();
        assert!(subtitle.min.y < title.min.y);
        drop(scene);
        assert!(app.handle(Command::DumpScene));
    }

    #[test]
    fn test_commands_drive_controllers() {
        let dir = assets();
        let config = TitleAppConfig { assets_dir: dir.path().to_path_buf(), ..TitleAppConfig::default() };
        let mut app = TitleApp::new(&config).unwrap();
        settle(&mut app);

        assert!(app.handle(Command::SetText { target: Target::Title, text: String::new() }));
        assert_eq!(app.scene().borrow().len(), 1);

        assert!(app.handle(Command::SetFont { target: Target::Subtitle, name: "minecrafter-alt".into() }));
        settle(&mut app);
        assert_eq!(app.subtitle.font(), "minecrafter-alt");
        assert_eq!(app.scene().borrow().len(), 1);

        assert!(!app.handle(Command::Quit));
    }

    #[test]
    fn test_missing_assets_keep_running() {
        let dir = tempfile::tempdir().unwrap();
        let config = TitleAppConfig { assets_dir: dir.path().to_path_buf(), ..TitleAppConfig::default() };
        let mut app = TitleApp::new(&config).unwrap();
        settle(&mut app);

        assert!(app.scene().borrow().is_empty());
        assert!(!app.title.is_loading());
    }
}
