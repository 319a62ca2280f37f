//! # text3d
//!
//! Extruded 3D text meshes for a shared scene graph.
//!
//! A [`TextMeshController`](text::TextMeshController) owns one mesh in a
//! host-supplied scene and keeps it in step with a text string and a font
//! chosen from a small catalog. Fonts load off the caller's thread; results
//! are applied on [`poll`](text::TextMeshController::poll) and only the
//! latest request ever wins.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use text3d::prelude::*;
//!
//! let scene = scene::shared(Scene::new());
//! let loader = ThreadedFontLoader::new(FsFontSource::new("resources"));
//! let mut title = TextMeshController::new(scene.clone(), TextMeshOptions::new(1.0, 0.4), loader);
//!
//! title.set_text("minecraft")?;
//! loop {
//!     for event in title.poll() {
//!         log::info!("{:?}", event);
//!     }
//!     if !title.is_loading() {
//!         break;
//!     }
//! }
//! assert_eq!(scene.borrow().len(), 1);
//! # Ok::<(), text3d::text::TextMeshError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod text;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Mat4, Transform, Vec3},
        geometry::{extrude_text, ExtrudeOptions, GeometryError, TextGeometry},
        material::{Color, SurfaceMaterial, TextureRef},
        scene::{self, NodeKey, Scene, SceneGraph, SceneMesh, SharedScene, AABB},
        text::{
            ControllerEvent, FontCatalog, FontData, FontError, FsFontSource, ImmediateFontLoader, MeshHooks,
            TextMeshController, TextMeshError, TextMeshOptions, ThreadedFontLoader, TransformHooks,
        },
    };
}
