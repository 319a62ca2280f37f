//! Reactive text mesh controller
//!
//! Keeps exactly one live mesh in a shared scene in step with a text string
//! and a font selection. Text changes regenerate synchronously with the font
//! already loaded; font changes start a new load whose completion is picked
//! up by [`TextMeshController::poll`].
//!
//! # Ordering
//!
//! Each font request carries a [`LoadTicket`] with a monotonically
//! increasing generation. Only the completion matching the latest issued
//! ticket may touch controller state; anything older is discarded, so a
//! slow load for a font the user has already switched away from can never
//! overwrite newer output.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::{FontCatalog, FontDescriptor, FontSelection};
use super::font::{FontData, FontError};
use super::hooks::{MeshHooks, NoHooks};
use super::loader::{FontLoader, LoadTicket};
use crate::geometry::{extrude_text, ExtrudeOptions, GeometryError, TextGeometry};
use crate::material::SurfaceMaterial;
use crate::scene::{NodeKey, SceneGraph, SceneMesh, SharedScene};

/// Errors returned by controller updates
#[derive(Debug, thiserror::Error)]
pub enum TextMeshError {
    /// Extrusion failed; the previous mesh is left in place
    #[error("Failed to build text geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// The scene was already borrowed by the host
    #[error("Scene is borrowed elsewhere; mesh swap skipped")]
    SceneBusy,
}

/// Construction options for a [`TextMeshController`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMeshOptions {
    /// World-space text height
    pub size: f32,
    /// Extrusion depth along the text normal
    pub depth: f32,
    /// Curve subdivision quality
    pub curve_segments: u32,
    /// Material override; the neutral standard material when absent
    pub material: Option<SurfaceMaterial>,
}

impl Default for TextMeshOptions {
    fn default() -> Self {
        let shape = ExtrudeOptions::default();
        Self {
            size: shape.size,
            depth: shape.depth,
            curve_segments: shape.curve_segments,
            material: None,
        }
    }
}

impl TextMeshOptions {
    /// Options with the given size and depth
    pub fn new(size: f32, depth: f32) -> Self {
        Self {
            size,
            depth,
            ..Default::default()
        }
    }

    /// Override the material
    pub fn with_material(mut self, material: SurfaceMaterial) -> Self {
        self.material = Some(material);
        self
    }

    /// Shape parameters passed to the extrusion routine
    pub fn extrude_options(&self) -> ExtrudeOptions {
        ExtrudeOptions {
            size: self.size,
            depth: self.depth,
            curve_segments: self.curve_segments,
        }
    }
}

/// What a [`TextMeshController::poll`] call changed
#[derive(Debug)]
pub enum ControllerEvent {
    /// The selected font finished loading
    FontLoaded {
        /// Catalog name
        font: &'static str,
        /// Family reported by the font data
        family: String,
    },
    /// The selected font failed to load; the previous mesh is kept
    FontLoadFailed {
        /// Catalog name
        font: &'static str,
        /// Reason
        error: FontError,
    },
    /// A completion for a superseded request was dropped
    StaleLoadDiscarded {
        /// Catalog name of the superseded request
        font: &'static str,
        /// Generation of the superseded request
        generation: u64,
    },
    /// A new mesh now sits in the scene
    MeshReplaced {
        /// Key of the new node
        node: NodeKey,
    },
    /// Regeneration produced nothing to draw (empty text)
    MeshCleared,
    /// The font loaded but the mesh could not be rebuilt
    RegenerationFailed {
        /// Reason
        error: TextMeshError,
    },
}

/// Owns the mapping from (text, font, shape options) to one scene mesh
pub struct TextMeshController<S: SceneGraph> {
    name: String,
    scene: SharedScene<S>,
    catalog: FontCatalog,
    loader: Box<dyn FontLoader>,
    hooks: Box<dyn MeshHooks>,
    options: TextMeshOptions,

    text: String,
    selected_font: &'static FontDescriptor,
    loaded_font: Option<Arc<FontData>>,
    geometry: Option<Arc<TextGeometry>>,
    material: Option<Arc<SurfaceMaterial>>,
    mesh: Option<NodeKey>,

    generation: u64,
    pending: Option<LoadTicket>,
    load_failed: bool,
}

impl<S: SceneGraph> TextMeshController<S> {
    /// Controller over the built-in font catalog
    ///
    /// Starts loading the default font right away; call [`poll`](Self::poll)
    /// once per frame to pick up the result.
    pub fn new(scene: SharedScene<S>, options: TextMeshOptions, loader: impl FontLoader + 'static) -> Self {
        Self::with_catalog(scene, options, loader, FontCatalog::builtin())
    }

    /// Controller over a host-supplied catalog
    pub fn with_catalog(
        scene: SharedScene<S>,
        options: TextMeshOptions,
        loader: impl FontLoader + 'static,
        catalog: FontCatalog,
    ) -> Self {
        let mut controller = Self {
            name: "text".to_string(),
            scene,
            catalog,
            loader: Box::new(loader),
            hooks: Box::new(NoHooks),
            options,
            text: String::new(),
            selected_font: catalog.default_font(),
            loaded_font: None,
            geometry: None,
            material: None,
            mesh: None,
            generation: 0,
            pending: None,
            load_failed: false,
        };
        controller.begin_font_load();
        controller
    }

    /// Set the name given to scene nodes (builder style)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Install geometry/material hooks (builder style)
    pub fn with_hooks(mut self, hooks: impl MeshHooks + 'static) -> Self {
        self.set_hooks(hooks);
        self
    }

    /// Replace the hooks; they apply from the next regeneration on
    pub fn set_hooks(&mut self, hooks: impl MeshHooks + 'static) {
        self.hooks = Box::new(hooks);
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last text passed to [`set_text`](Self::set_text)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the text and rebuild the mesh with the currently loaded font
    ///
    /// Without a loaded font the text is only stored (the pending load
    /// renders it) and `Ok(None)` is returned; any current mesh stays put.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<Option<NodeKey>, TextMeshError> {
        self.text = text.into();
        self.regenerate()
    }

    /// Name of the selected font (which may still be loading)
    pub fn font(&self) -> &'static str {
        self.selected_font.name
    }

    /// Select a font by catalog name and start loading it
    ///
    /// Unknown names select the catalog's first font. The previously loaded
    /// font data is dropped; the mesh is rebuilt once the new load lands.
    pub fn set_font(&mut self, name: &str) -> FontSelection {
        let selection = self.catalog.resolve(name);
        if selection.is_fallback() {
            log::warn!(
                "[{}] Unknown font '{}', falling back to '{}'",
                self.name,
                name,
                selection.descriptor().name
            );
        }

        self.selected_font = selection.descriptor();
        self.loaded_font = None;
        self.begin_font_load();
        selection
    }

    /// Key of the live mesh node, if one is in the scene
    pub fn mesh(&self) -> Option<NodeKey> {
        self.mesh
    }

    /// Run `f` against the live mesh node
    pub fn with_mesh<R>(&self, f: impl FnOnce(&SceneMesh) -> R) -> Option<R> {
        let key = self.mesh?;
        let scene = self.scene.try_borrow().ok()?;
        scene.get(key).map(f)
    }

    /// Geometry from the last successful regeneration
    pub fn geometry(&self) -> Option<&Arc<TextGeometry>> {
        self.geometry.as_ref()
    }

    /// Material from the last successful regeneration
    pub fn material(&self) -> Option<&Arc<SurfaceMaterial>> {
        self.material.as_ref()
    }

    /// Font data currently usable for regeneration
    pub fn loaded_font(&self) -> Option<&Arc<FontData>> {
        self.loaded_font.as_ref()
    }

    /// Font catalog this controller selects from
    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    /// Shape and material options
    pub fn options(&self) -> &TextMeshOptions {
        &self.options
    }

    /// True while the latest font request has not completed
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Generation of the latest font request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when the latest font request completed with an error
    ///
    /// Text changes are stored but not rendered until the next
    /// [`set_font`](Self::set_font) succeeds.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Apply finished font loads; call once per frame
    pub fn poll(&mut self) -> Vec<ControllerEvent> {
        let mut events = Vec::new();

        for completion in self.loader.poll() {
            if self.pending != Some(completion.ticket) {
                log::warn!(
                    "[{}] Discarding stale load of '{}' (generation {}, latest {})",
                    self.name,
                    completion.descriptor.name,
                    completion.ticket.generation,
                    self.generation
                );
                events.push(ControllerEvent::StaleLoadDiscarded {
                    font: completion.descriptor.name,
                    generation: completion.ticket.generation,
                });
                continue;
            }
            self.pending = None;

            let font = completion.descriptor.name;
            match completion.result {
                Ok(data) => {
                    log::info!("[{}] Loaded font '{}' ({})", self.name, font, data.family());
                    events.push(ControllerEvent::FontLoaded {
                        font,
                        family: data.family().to_string(),
                    });
                    self.loaded_font = Some(Arc::new(data));

                    events.push(match self.regenerate() {
                        Ok(Some(node)) => ControllerEvent::MeshReplaced { node },
                        Ok(None) => ControllerEvent::MeshCleared,
                        Err(error) => ControllerEvent::RegenerationFailed { error },
                    });
                }
                Err(error) => {
                    log::error!("[{}] Failed to load font '{}': {}", self.name, font, error);
                    self.load_failed = true;
                    events.push(ControllerEvent::FontLoadFailed { font, error });
                }
            }
        }

        events
    }

    fn begin_font_load(&mut self) {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
        };
        self.pending = Some(ticket);
        self.load_failed = false;
        log::debug!(
            "[{}] Loading font '{}' from {} (generation {})",
            self.name,
            self.selected_font.name,
            self.selected_font.source_location,
            ticket.generation
        );
        self.loader.begin(ticket, self.selected_font);
    }

    /// Rebuild geometry, material and mesh from the current state
    fn regenerate(&mut self) -> Result<Option<NodeKey>, TextMeshError> {
        let Some(font) = self.loaded_font.clone() else {
            if self.load_failed {
                log::warn!(
                    "[{}] Font '{}' failed to load; {:?} will not render until a font loads",
                    self.name,
                    self.selected_font.name,
                    self.text
                );
            } else {
                log::debug!("[{}] No font loaded yet, deferring {:?}", self.name, self.text);
            }
            return Ok(None);
        };

        let mut geometry = extrude_text(&font, &self.text, &self.options.extrude_options()).map_err(|e| {
            log::error!("[{}] Geometry for {:?} failed: {}", self.name, self.text, e);
            e
        })?;
        self.hooks.on_geometry_change(&mut geometry);

        let mut material = self.options.material.clone().unwrap_or_default();
        self.hooks.on_material_change(&mut geometry, &mut material);

        let bounds = geometry.compute_bounding_box();
        let geometry = Arc::new(geometry);
        let material = Arc::new(material);

        let node = bounds.filter(|_| !geometry.is_empty()).map(|bounds| {
            let mut mesh = SceneMesh::new(self.name.clone(), Arc::clone(&geometry), Arc::clone(&material));
            mesh.transform.position.x = -(bounds.min.x + bounds.max.x) * 0.5;
            mesh
        });

        {
            let mut scene = self.scene.try_borrow_mut().map_err(|_| TextMeshError::SceneBusy)?;
            if let Some(previous) = self.mesh.take() {
                scene.remove(previous);
            }
            self.mesh = node.map(|mesh| scene.add(mesh));
        }

        self.geometry = Some(geometry);
        self.material = Some(material);

        log::debug!("[{}] Regenerated {:?} -> {:?}", self.name, self.text, self.mesh);
        Ok(self.mesh)
    }
}

impl<S: SceneGraph> Drop for TextMeshController<S> {
    fn drop(&mut self) {
        if let Some(key) = self.mesh.take() {
            match self.scene.try_borrow_mut() {
                Ok(mut scene) => {
                    scene.remove(key);
                }
                Err(_) => log::warn!("[{}] Scene busy on drop; node {:?} left in the scene", self.name, key),
            }
        }
    }
}

impl<S: SceneGraph> fmt::Debug for TextMeshController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextMeshController")
            .field("name", &self.name)
            .field("text", &self.text)
            .field("font", &self.selected_font.name)
            .field("loaded", &self.loaded_font.as_ref().map(|font| font.family().to_string()))
            .field("mesh", &self.mesh)
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .field("load_failed", &self.load_failed)
            .finish_non_exhaustive()
    }
}
