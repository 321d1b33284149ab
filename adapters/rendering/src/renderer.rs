//! Frame-driven owner of overlay batches and their material.

use std::collections::HashMap;

use wealth_overlay_core::{Color, ZoomGridProvider, DEFAULT_OPACITY};

use crate::{
    BatchMeshBuilder, GeometryBatch, MaterialFactory, RenderSink, RenderingError,
    DEFAULT_ELEVATION, DEFAULT_RENDER_QUEUE, MAX_QUADS_PER_BATCH,
};

/// Static configuration of an [`OverlayRenderer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererConfig {
    /// Multiplier applied to the provider color's alpha when creating the material.
    pub opacity: f32,
    /// Render-order key handed to the sink with every batch.
    pub render_queue: i32,
    /// Height of the emitted quads.
    pub elevation: f32,
    /// Maximum number of quads per batch.
    pub quads_per_batch: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_OPACITY,
            render_queue: DEFAULT_RENDER_QUEUE,
            elevation: DEFAULT_ELEVATION,
            quads_per_batch: MAX_QUADS_PER_BATCH,
        }
    }
}

/// What happened during one [`OverlayRenderer::update`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Whether the batches were regenerated.
    pub rebuilt: bool,
    /// Number of batches handed to the sink.
    pub submitted: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MaterialKey {
    rgba: [u32; 4],
    vertex_colors: bool,
}

impl MaterialKey {
    fn new(color: Color, vertex_colors: bool) -> Self {
        Self {
            rgba: [
                color.red.to_bits(),
                color.green.to_bits(),
                color.blue.to_bits(),
                color.alpha.to_bits(),
            ],
            vertex_colors,
        }
    }
}

/// Keeps "is stale" and "should be drawn" as separate flags.
///
/// Registrations only flip `dirty`; the surrounding system calls
/// [`mark_wants_draw`](Self::mark_wants_draw) once per frame and then
/// [`update`](Self::update), which rebuilds at most once no matter how many
/// registrations happened in between.
#[derive(Debug)]
pub struct OverlayRenderer<M> {
    config: RendererConfig,
    builder: BatchMeshBuilder,
    batches: Vec<GeometryBatch>,
    dirty: bool,
    wants_draw: bool,
    rebuild_count: u64,
    materials: HashMap<MaterialKey, M>,
    active_material: Option<MaterialKey>,
}

impl<M> OverlayRenderer<M> {
    /// Creates a renderer with no batches that rebuilds on its first drawn frame.
    pub fn new(config: RendererConfig) -> Result<Self, RenderingError> {
        let builder = BatchMeshBuilder::new(config.quads_per_batch, config.elevation)?;
        Ok(Self {
            config,
            builder,
            batches: Vec::new(),
            dirty: true,
            wants_draw: false,
            rebuild_count: 0,
            materials: HashMap::new(),
            active_material: None,
        })
    }

    /// Configuration supplied at construction.
    #[must_use]
    pub const fn config(&self) -> RendererConfig {
        self.config
    }

    /// Requests that the overlay be drawn on the next [`update`](Self::update).
    pub fn mark_wants_draw(&mut self) {
        self.wants_draw = true;
    }

    /// Marks the batches as stale.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the batches must be rebuilt before the next submission.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a draw was requested for the current frame.
    #[must_use]
    pub const fn wants_draw(&self) -> bool {
        self.wants_draw
    }

    /// Batches produced by the most recent rebuild.
    #[must_use]
    pub fn batches(&self) -> &[GeometryBatch] {
        &self.batches
    }

    /// Number of rebuilds performed since construction.
    #[must_use]
    pub const fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Material currently used for submissions, if one was created.
    #[must_use]
    pub fn active_material(&self) -> Option<&M> {
        self.active_material
            .as_ref()
            .and_then(|key| self.materials.get(key))
    }

    /// Runs one frame.
    ///
    /// Does nothing unless a draw was requested. Otherwise rebuilds when dirty,
    /// submits every batch to `sink`, and clears the draw request.
    pub fn update<P, F, S>(&mut self, provider: &P, factory: &mut F, sink: &mut S) -> FrameOutcome
    where
        P: ZoomGridProvider + ?Sized,
        F: MaterialFactory<Material = M>,
        S: RenderSink<M> + ?Sized,
    {
        if !self.wants_draw {
            return FrameOutcome::default();
        }

        let mut outcome = FrameOutcome::default();
        if self.dirty {
            self.rebuild(provider, factory);
            outcome.rebuilt = true;
        }

        if let Some(material) = self.active_material() {
            for batch in &self.batches {
                sink.draw_batch(batch, material, self.config.render_queue);
            }
            outcome.submitted = self.batches.len();
        }

        self.wants_draw = false;
        outcome
    }

    /// Regenerates the batches immediately and clears the dirty flag.
    pub fn rebuild<P, F>(&mut self, provider: &P, factory: &mut F)
    where
        P: ZoomGridProvider + ?Sized,
        F: MaterialFactory<Material = M>,
    {
        let summary = self.builder.rebuild(provider, &mut self.batches);
        self.select_material(provider.color(), summary.vertex_colors, factory);
        self.rebuild_count += 1;
        self.dirty = false;

        tracing::debug!(
            target: "wealth_overlay::rendering",
            batches = summary.batches,
            quads = summary.quads,
            vertex_colors = summary.vertex_colors,
            "overlay.rebuilt"
        );
    }

    /// Releases every batch and marks the renderer dirty.
    ///
    /// Cached materials survive so a later rebuild can reuse them.
    pub fn clear(&mut self) {
        self.batches = Vec::new();
        self.dirty = true;
    }

    fn select_material<F>(&mut self, base: Color, vertex_colors: bool, factory: &mut F)
    where
        F: MaterialFactory<Material = M>,
    {
        let color = base.with_alpha(base.alpha * self.config.opacity);
        let key = MaterialKey::new(color, vertex_colors);
        if self.active_material == Some(key) {
            return;
        }

        if !self.materials.contains_key(&key) {
            tracing::debug!(
                target: "wealth_overlay::rendering",
                vertex_colors,
                alpha = color.alpha,
                "overlay.material_created"
            );
            let material = factory.solid_color_material(color, vertex_colors);
            let _ = self.materials.insert(key, material);
        }
        self.active_material = Some(key);
    }
}
