//! Text to mesh pipeline
//!
//! - [`FontCatalog`]: named fonts a controller may select
//! - [`FontData`]: parsed glyph outlines (typeface JSON or OpenType)
//! - [`FontLoader`]: deferred fetch-and-parse with ticketed completions
//! - [`MeshHooks`]: caller adjustments to fresh geometry and material
//! - [`TextMeshController`]: keeps one scene mesh in sync with text and font

pub mod catalog;
pub mod font;
pub mod hooks;
pub mod layout;
pub mod loader;

mod controller;

pub use catalog::{FontCatalog, FontDescriptor, FontSelection, BUILTIN_FONTS};
pub use controller::{ControllerEvent, TextMeshController, TextMeshError, TextMeshOptions};
pub use font::{FontData, FontError, FontFormat, FontResult};
pub use hooks::{FnHooks, MeshHooks, NoHooks, TransformHooks};
pub use loader::{
    FontLoadCompletion, FontLoader, FontSource, FsFontSource, ImmediateFontLoader, LoadTicket, MemoryFontSource,
    ThreadedFontLoader,
};
