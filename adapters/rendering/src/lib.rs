#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Batched mesh building and frame submission for grid overlays.
//!
//! [`BatchMeshBuilder`] turns any [`ZoomGridProvider`] into quads packed into
//! fixed-capacity [`GeometryBatch`] values. [`OverlayRenderer`] owns those
//! batches, rebuilds them only when marked dirty, and hands them to a
//! [`RenderSink`] together with a material obtained from a
//! [`MaterialFactory`].

mod mesh;
mod renderer;

use glam::Vec3;
use thiserror::Error;
use wealth_overlay_core::Color;

pub use mesh::{BatchMeshBuilder, RebuildSummary};
pub use renderer::{FrameOutcome, OverlayRenderer, RendererConfig};
pub use wealth_overlay_core::ZoomGridProvider;

/// Largest number of quads a single batch may hold.
///
/// Four vertices per quad keeps each batch under the sink's 65535 vertex limit.
pub const MAX_QUADS_PER_BATCH: usize = 16_383;

/// Render-order key handed to the sink when none is configured.
pub const DEFAULT_RENDER_QUEUE: i32 = 3600;

/// Height at which overlay quads are laid above the map plane.
pub const DEFAULT_ELEVATION: f32 = 0.5;

/// One renderable unit of overlay geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBatch {
    vertices: Vec<Vec3>,
    triangles: Vec<u32>,
    colors: Vec<Color>,
}

impl GeometryBatch {
    /// Vertex positions in world space.
    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Triangle list indexing into [`vertices`](Self::vertices), three per triangle.
    #[must_use]
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// Per-vertex colors, parallel to [`vertices`](Self::vertices).
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of quads stored in the batch.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Returns `true` when the batch holds no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.colors.clear();
    }
}

/// Creates translucent solid-color materials.
///
/// Material creation is assumed to be expensive; [`OverlayRenderer`] caches
/// every material it receives.
pub trait MaterialFactory {
    /// Opaque handle identifying a created material.
    type Material;

    /// Creates a material tinted with `color`.
    ///
    /// When `vertex_colors` is `true` the material must blend per-vertex colors;
    /// otherwise they may be ignored.
    fn solid_color_material(&mut self, color: Color, vertex_colors: bool) -> Self::Material;
}

/// Destination for finished overlay geometry.
pub trait RenderSink<M> {
    /// Draws `batch` with `material` at the given render-order key.
    fn draw_batch(&mut self, batch: &GeometryBatch, material: &M, render_queue: i32);
}

/// Errors that can occur when configuring overlay rendering.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// Batch capacity must lie within `1..=MAX_QUADS_PER_BATCH`.
    #[error(
        "quads_per_batch must lie within 1..={} (received {quads_per_batch})",
        MAX_QUADS_PER_BATCH
    )]
    InvalidBatchCapacity {
        /// Requested number of quads per batch.
        quads_per_batch: usize,
    },
}
