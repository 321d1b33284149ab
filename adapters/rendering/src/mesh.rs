//! Converts a grid provider into capacity-bounded quad batches.

use glam::Vec3;
use wealth_overlay_core::{Color, ZoomGridProvider};

use crate::{GeometryBatch, RenderingError, DEFAULT_ELEVATION, MAX_QUADS_PER_BATCH};

/// Result of a single [`BatchMeshBuilder::rebuild`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Number of batches written.
    pub batches: usize,
    /// Number of quads emitted across all batches.
    pub quads: usize,
    /// Whether any emitted vertex color differs from opaque white.
    pub vertex_colors: bool,
}

/// Builds overlay quads into reusable working buffers before copying them into batches.
///
/// The working buffers are drained into a batch every time it is finalized, so
/// a single builder serves any number of batches and rebuilds without
/// reallocating.
#[derive(Clone, Debug)]
pub struct BatchMeshBuilder {
    quads_per_batch: usize,
    elevation: f32,
    vertices: Vec<Vec3>,
    triangles: Vec<u32>,
    colors: Vec<Color>,
}

impl Default for BatchMeshBuilder {
    fn default() -> Self {
        Self {
            quads_per_batch: MAX_QUADS_PER_BATCH,
            elevation: DEFAULT_ELEVATION,
            vertices: Vec::new(),
            triangles: Vec::new(),
            colors: Vec::new(),
        }
    }
}

impl BatchMeshBuilder {
    /// Creates a builder that packs at most `quads_per_batch` quads into each batch.
    ///
    /// Returns an error when the capacity is zero or exceeds [`MAX_QUADS_PER_BATCH`].
    pub fn new(quads_per_batch: usize, elevation: f32) -> Result<Self, RenderingError> {
        if quads_per_batch == 0 || quads_per_batch > MAX_QUADS_PER_BATCH {
            return Err(RenderingError::InvalidBatchCapacity { quads_per_batch });
        }

        Ok(Self {
            quads_per_batch,
            elevation,
            ..Self::default()
        })
    }

    /// Maximum number of quads stored in one batch.
    #[must_use]
    pub const fn quads_per_batch(&self) -> usize {
        self.quads_per_batch
    }

    /// Height of the emitted quads.
    #[must_use]
    pub const fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Regenerates `batches` from the provider's active cells.
    ///
    /// Cells are visited with x in the outer loop and z in the inner loop, so
    /// identical grids always pack identically. Existing batches are reused and
    /// surplus ones dropped; zero active cells leave `batches` empty.
    pub fn rebuild<P>(&mut self, provider: &P, batches: &mut Vec<GeometryBatch>) -> RebuildSummary
    where
        P: ZoomGridProvider + ?Sized,
    {
        self.clear_working_buffers();

        let (width, height) = provider.dimensions();
        let scale = provider.scale() as f32;
        let mut summary = RebuildSummary::default();
        let mut in_batch = 0;

        for x in 0..width {
            for z in 0..height {
                if !provider.cell_active(x, z) {
                    continue;
                }

                let color = provider.cell_color(x, z);
                if !color.is_opaque_white() {
                    summary.vertex_colors = true;
                }
                self.push_quad(x as f32 * scale, z as f32 * scale, scale, color);
                summary.quads += 1;
                in_batch += 1;

                if in_batch >= self.quads_per_batch {
                    self.finalize_into(batches, summary.batches);
                    summary.batches += 1;
                    in_batch = 0;
                }
            }
        }

        if in_batch > 0 {
            self.finalize_into(batches, summary.batches);
            summary.batches += 1;
        }
        batches.truncate(summary.batches);

        summary
    }

    fn push_quad(&mut self, x1: f32, z1: f32, size: f32, color: Color) {
        let x2 = x1 + size;
        let z2 = z1 + size;
        let y = self.elevation;
        let base = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&[
            Vec3::new(x1, y, z1),
            Vec3::new(x1, y, z2),
            Vec3::new(x2, y, z2),
            Vec3::new(x2, y, z1),
        ]);
        self.colors.extend_from_slice(&[color; 4]);
        self.triangles
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn finalize_into(&mut self, batches: &mut Vec<GeometryBatch>, slot: usize) {
        if batches.len() <= slot {
            batches.push(GeometryBatch::default());
        }
        let batch = &mut batches[slot];
        batch.clear();
        batch.vertices.extend_from_slice(&self.vertices);
        batch.triangles.extend_from_slice(&self.triangles);
        batch.colors.extend_from_slice(&self.colors);
        self.clear_working_buffers();
    }

    fn clear_working_buffers(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.colors.clear();
    }
}
