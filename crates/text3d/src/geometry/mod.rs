//! Geometry generation for 3D text
//!
//! - [`TextGeometry`]: vertex/index container with bounds and transforms
//! - [`extrude_text`]: glyph outlines to an extruded solid

mod extrude;
mod text_geometry;

pub use extrude::{extrude_path, extrude_text, ExtrudeOptions};
pub use text_geometry::{TextGeometry, Vertex};

/// Result type for geometry operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors raised while building geometry
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeometryError {
    /// Shape options cannot produce a solid
    #[error("Invalid extrusion options: {0}")]
    InvalidOptions(String),

    /// Outline could not be triangulated
    #[error("Tessellation failed: {0}")]
    Tessellation(String),
}
