//! Headless material factory and render sink that summarise submitted geometry.

use glam::Vec3;
use wealth_overlay_core::Color;
use wealth_overlay_rendering::{GeometryBatch, MaterialFactory, RenderSink};

/// Handle returned by [`HeadlessMaterials`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MaterialHandle {
    pub(crate) id: usize,
    pub(crate) color: Color,
    pub(crate) vertex_colors: bool,
}

/// Material factory that only hands out sequential identifiers.
#[derive(Debug, Default)]
pub(crate) struct HeadlessMaterials {
    created: usize,
}

impl HeadlessMaterials {
    /// Number of materials created so far.
    pub(crate) const fn created(&self) -> usize {
        self.created
    }
}

impl MaterialFactory for HeadlessMaterials {
    type Material = MaterialHandle;

    fn solid_color_material(&mut self, color: Color, vertex_colors: bool) -> MaterialHandle {
        let handle = MaterialHandle {
            id: self.created,
            color,
            vertex_colors,
        };
        self.created += 1;
        handle
    }
}

/// Summary of everything drawn during one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FrameReport {
    pub(crate) batches: usize,
    pub(crate) quads: usize,
    pub(crate) material: Option<MaterialHandle>,
    pub(crate) render_queue: Option<i32>,
    pub(crate) min: Vec3,
    pub(crate) max: Vec3,
}

impl Default for FrameReport {
    fn default() -> Self {
        Self {
            batches: 0,
            quads: 0,
            material: None,
            render_queue: None,
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }
}

/// Render sink that accumulates a [`FrameReport`] instead of drawing.
#[derive(Debug, Default)]
pub(crate) struct SummarySink {
    report: FrameReport,
}

impl SummarySink {
    /// Returns the report gathered since the previous call and starts a new one.
    pub(crate) fn take_report(&mut self) -> FrameReport {
        std::mem::take(&mut self.report)
    }
}

impl RenderSink<MaterialHandle> for SummarySink {
    fn draw_batch(&mut self, batch: &GeometryBatch, material: &MaterialHandle, render_queue: i32) {
        let report = &mut self.report;
        report.batches += 1;
        report.quads += batch.quad_count();
        report.material = Some(*material);
        report.render_queue = Some(render_queue);
        for vertex in batch.vertices() {
            report.min = report.min.min(*vertex);
            report.max = report.max.max(*vertex);
        }
    }
}
