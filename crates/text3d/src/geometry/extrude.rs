//! Text extrusion: glyph outlines to a closed triangle mesh
//!
//! Each glyph path is tessellated into a front cap at `z = depth` and a back
//! cap at `z = 0`; flattened contour edges become the side walls.

use lyon_geom::{CubicBezierSegment, LineSegment, QuadraticBezierSegment};
use lyon_path::math::Point;
use lyon_path::{Event, Path};
use lyon_tessellation::{BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers};
use serde::{Deserialize, Serialize};

use super::{GeometryError, GeometryResult, TextGeometry, Vertex};
use crate::text::layout::layout_text;
use crate::text::FontData;

/// Shape parameters for extruded text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrudeOptions {
    /// World-space text height (one em)
    pub size: f32,
    /// Extrusion depth along +Z
    pub depth: f32,
    /// Curve subdivision quality; higher is smoother
    pub curve_segments: u32,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 0.75,
            curve_segments: 12,
        }
    }
}

impl ExtrudeOptions {
    /// Check the options describe a buildable solid
    pub fn validate(&self) -> GeometryResult<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(GeometryError::InvalidOptions(format!(
                "size must be positive and finite, got {}",
                self.size
            )));
        }
        if !self.depth.is_finite() || self.depth < 0.0 {
            return Err(GeometryError::InvalidOptions(format!(
                "depth must be non-negative and finite, got {}",
                self.depth
            )));
        }
        if self.curve_segments == 0 {
            return Err(GeometryError::InvalidOptions(
                "curve_segments must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Flattening tolerance in world units
    pub fn tolerance(&self) -> f32 {
        self.size / (self.curve_segments as f32 * 4.0)
    }
}

/// Extrude `text` set in `font`
///
/// Empty and whitespace-only strings produce an empty geometry.
pub fn extrude_text(font: &FontData, text: &str, options: &ExtrudeOptions) -> GeometryResult<TextGeometry> {
    options.validate()?;

    let mut geometry = TextGeometry::default();
    for glyph in layout_text(font, text, options.size) {
        let solid = extrude_path(&glyph.path, options).map_err(|e| match e {
            GeometryError::Tessellation(reason) => {
                GeometryError::Tessellation(format!("glyph {:?}: {reason}", glyph.ch))
            }
            other => other,
        })?;
        geometry.merge(solid);
    }

    log::debug!(
        "Extruded {:?}: {} vertices, {} triangles",
        text,
        geometry.vertex_count(),
        geometry.triangle_count()
    );
    Ok(geometry)
}

/// Extrude one closed path (typically one glyph)
pub fn extrude_path(path: &Path, options: &ExtrudeOptions) -> GeometryResult<TextGeometry> {
    let tolerance = options.tolerance();
    let depth = options.depth;

    let mut cap: VertexBuffers<Point, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            path,
            &FillOptions::tolerance(tolerance).with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut cap, |vertex: FillVertex| vertex.position()),
        )
        .map_err(|e| GeometryError::Tessellation(format!("{e:?}")))?;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Front cap faces +Z
    push_cap(&mut vertices, &mut indices, &cap, depth, 1.0);
    if depth > 0.0 {
        push_cap(&mut vertices, &mut indices, &cap, 0.0, -1.0);

        let contours = flatten_contours(path, tolerance);
        let outer_is_ccw = contours
            .iter()
            .map(|contour| signed_area(contour))
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .map_or(true, |area| area >= 0.0);

        for contour in &contours {
            push_walls(&mut vertices, &mut indices, contour, depth, outer_is_ccw);
        }
    }

    Ok(TextGeometry::new(vertices, indices))
}

fn push_cap(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    cap: &VertexBuffers<Point, u32>,
    z: f32,
    facing: f32,
) {
    let base = vertices.len() as u32;
    vertices.extend(
        cap.vertices
            .iter()
            .map(|p| Vertex::new([p.x, p.y, z], [0.0, 0.0, facing], [p.x, p.y])),
    );

    for tri in cap.indices.chunks_exact(3) {
        let (a, b, c) = (cap.vertices[tri[0] as usize], cap.vertices[tri[1] as usize], cap.vertices[tri[2] as usize]);
        let ccw = (b - a).cross(c - a) >= 0.0;
        // Wind counter-clockwise as seen from the side the cap faces
        if ccw == (facing > 0.0) {
            indices.extend_from_slice(&[base + tri[0], base + tri[1], base + tri[2]]);
        } else {
            indices.extend_from_slice(&[base + tri[0], base + tri[2], base + tri[1]]);
        }
    }
}

fn push_walls(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    contour: &[Point],
    depth: f32,
    outer_is_ccw: bool,
) {
    if contour.len() < 2 {
        return;
    }

    let mut distance = 0.0f32;
    for (i, &p0) in contour.iter().enumerate() {
        let p1 = contour[(i + 1) % contour.len()];
        let edge = p1 - p0;
        let len = edge.length();
        if len < 1e-6 {
            continue;
        }

        let right = [edge.y / len, -edge.x / len, 0.0];
        let normal = if outer_is_ccw { right } else { [-right[0], -right[1], 0.0] };
        let (u0, u1) = (distance, distance + len);
        distance = u1;

        let base = vertices.len() as u32;
        vertices.extend_from_slice(&[
            Vertex::new([p0.x, p0.y, 0.0], normal, [u0, 0.0]),
            Vertex::new([p1.x, p1.y, 0.0], normal, [u1, 0.0]),
            Vertex::new([p1.x, p1.y, depth], normal, [u1, depth]),
            Vertex::new([p0.x, p0.y, depth], normal, [u0, depth]),
        ]);
        // (v1 - v0) x (v2 - v0) points along `right`
        if outer_is_ccw {
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        } else {
            indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }
    }
}

/// Flatten every sub-path into a closed polyline (no repeated end point)
fn flatten_contours(path: &Path, tolerance: f32) -> Vec<Vec<Point>> {
    let mut contours = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for event in path.iter() {
        match event {
            Event::Begin { at } => {
                current = vec![at];
            }
            Event::Line { to, .. } => current.push(to),
            Event::Quadratic { from, ctrl, to } => {
                QuadraticBezierSegment { from, ctrl, to }
                    .for_each_flattened(tolerance, &mut |segment: &LineSegment<f32>| current.push(segment.to));
            }
            Event::Cubic { from, ctrl1, ctrl2, to } => {
                CubicBezierSegment { from, ctrl1, ctrl2, to }
                    .for_each_flattened(tolerance, &mut |segment: &LineSegment<f32>| current.push(segment.to));
            }
            Event::End { .. } => {
                let mut contour = std::mem::take(&mut current);
                if contour.len() > 1 && contour.first() == contour.last() {
                    contour.pop();
                }
                if contour.len() >= 3 {
                    contours.push(contour);
                }
            }
        }
    }

    contours
}

/// Shoelace area; positive for counter-clockwise contours (y up)
fn signed_area(contour: &[Point]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}
