use std::cell::Cell;

use wealth_overlay_core::Color;
use wealth_overlay_rendering::{
    GeometryBatch, MaterialFactory, OverlayRenderer, RenderSink, RendererConfig, ZoomGridProvider,
};

struct MaskProvider {
    width: u32,
    height: u32,
    active: Vec<bool>,
    tint: Color,
    active_queries: Cell<usize>,
}

impl MaskProvider {
    fn new(width: u32, height: u32, tint: Color) -> Self {
        Self {
            width,
            height,
            active: vec![false; (width * height) as usize],
            tint,
            active_queries: Cell::new(0),
        }
    }

    fn activate_first(mut self, count: usize) -> Self {
        for slot in self.active.iter_mut().take(count) {
            *slot = true;
        }
        self
    }
}

impl ZoomGridProvider for MaskProvider {
    fn color(&self) -> Color {
        Color::YELLOW
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn scale(&self) -> u32 {
        1
    }

    fn cell_active(&self, x: u32, z: u32) -> bool {
        self.active_queries.set(self.active_queries.get() + 1);
        self.active[(z * self.width + x) as usize]
    }

    fn cell_color(&self, _x: u32, _z: u32) -> Color {
        self.tint
    }
}

#[derive(Default)]
struct CountingFactory {
    created: Vec<(Color, bool)>,
}

impl MaterialFactory for CountingFactory {
    type Material = usize;

    fn solid_color_material(&mut self, color: Color, vertex_colors: bool) -> usize {
        self.created.push((color, vertex_colors));
        self.created.len() - 1
    }
}

#[derive(Default)]
struct RecordingSink {
    draws: Vec<(usize, usize, i32)>,
}

impl RenderSink<usize> for RecordingSink {
    fn draw_batch(&mut self, batch: &GeometryBatch, material: &usize, render_queue: i32) {
        self.draws
            .push((batch.quad_count(), *material, render_queue));
    }
}

fn renderer(quads_per_batch: usize) -> OverlayRenderer<usize> {
    OverlayRenderer::new(RendererConfig {
        quads_per_batch,
        ..RendererConfig::default()
    })
    .expect("valid renderer configuration")
}

#[test]
fn update_without_draw_request_does_nothing() {
    let provider = MaskProvider::new(4, 4, Color::YELLOW).activate_first(3);
    let mut renderer = renderer(16);
    let mut factory = CountingFactory::default();
    let mut sink = RecordingSink::default();

    let outcome = renderer.update(&provider, &mut factory, &mut sink);

    assert!(!outcome.rebuilt);
    assert!(sink.draws.is_empty());
    assert!(renderer.is_dirty(), "stale batches stay stale until drawn");
    assert_eq!(provider.active_queries.get(), 0);
}

#[test]
fn second_update_reuses_cached_batches() {
    let provider = MaskProvider::new(4, 4, Color::YELLOW).activate_first(5);
    let mut renderer = renderer(16);
    let mut factory = CountingFactory::default();
    let mut sink = RecordingSink::default();

    renderer.mark_wants_draw();
    let first = renderer.update(&provider, &mut factory, &mut sink);
    renderer.mark_wants_draw();
    let second = renderer.update(&provider, &mut factory, &mut sink);

    assert!(first.rebuilt);
    assert!(!second.rebuilt, "no registration happened between frames");
    assert_eq!(renderer.rebuild_count(), 1);
    assert_eq!(
        provider.active_queries.get(),
        16,
        "grid scanned exactly once"
    );
    assert_eq!(sink.draws.len(), 2, "batches submitted on both frames");
    assert!(!renderer.wants_draw(), "draw request consumed every frame");
}

#[test]
fn dirty_flag_triggers_single_rebuild_per_frame() {
    let provider = MaskProvider::new(4, 4, Color::YELLOW).activate_first(5);
    let mut renderer = renderer(16);
    let mut factory = CountingFactory::default();
    let mut sink = RecordingSink::default();

    renderer.mark_wants_draw();
    let _ = renderer.update(&provider, &mut factory, &mut sink);
    for _ in 0..10 {
        renderer.set_dirty();
    }
    renderer.mark_wants_draw();
    let outcome = renderer.update(&provider, &mut factory, &mut sink);

    assert!(outcome.rebuilt);
    assert_eq!(renderer.rebuild_count(), 2);
}

#[test]
fn batch_count_is_ceiling_of_active_cells_over_capacity() {
    for (active, capacity) in [(1, 4), (4, 4), (5, 4), (17, 3), (64, 64), (63, 8)] {
        let provider = MaskProvider::new(8, 8, Color::YELLOW).activate_first(active);
        let mut renderer = renderer(capacity);
        let mut factory = CountingFactory::default();
        let mut sink = RecordingSink::default();

        renderer.mark_wants_draw();
        let outcome = renderer.update(&provider, &mut factory, &mut sink);

        let expected = (active + capacity - 1) / capacity;
        assert_eq!(
            outcome.submitted, expected,
            "{active} cells at capacity {capacity}"
        );
        assert!(renderer
            .batches()
            .iter()
            .all(|batch| batch.quad_count() <= capacity && !batch.is_empty()));
        let quads: usize = renderer
            .batches()
            .iter()
            .map(GeometryBatch::quad_count)
            .sum();
        assert_eq!(quads, active);
    }
}

#[test]
fn zero_active_cells_produce_zero_batches() {
    let provider = MaskProvider::new(4, 4, Color::YELLOW);
    let mut renderer = renderer(16);
    let mut factory = CountingFactory::default();
    let mut sink = RecordingSink::default();

    renderer.mark_wants_draw();
    let outcome = renderer.update(&provider, &mut factory, &mut sink);

    assert!(outcome.rebuilt);
    assert_eq!(outcome.submitted, 0);
    assert!(renderer.batches().is_empty());
    assert!(sink.draws.is_empty());
}

#[test]
fn material_uses_translucent_base_color_and_render_queue() {
    let provider = MaskProvider::new(2, 2, Color::YELLOW).activate_first(1);
    let mut renderer = OverlayRenderer::new(RendererConfig {
        opacity: 0.5,
        render_queue: 42,
        ..RendererConfig::default()
    })
    .expect("valid renderer configuration");
    let mut factory = CountingFactory::default();
    let mut sink = RecordingSink::default();

    renderer.mark_wants_draw();
    let _ = renderer.update(&provider, &mut factory, &mut sink);

    assert_eq!(factory.created, vec![(Color::YELLOW.with_alpha(0.5), true)]);
    assert_eq!(sink.draws, vec![(1, 0, 42)]);
}

#[test]
fn material_is_recreated_only_when_vertex_color_usage_changes() {
    let tinted = MaskProvider::new(2, 2, Color::YELLOW).activate_first(2);
    let white = MaskProvider::new(2, 2, Color::WHITE).activate_first(2);
    let mut renderer = renderer(16);
    let mut factory = CountingFactory::default();
    let mut sink = RecordingSink::default();

    for provider in [&tinted, &tinted, &white, &white, &tinted] {
        renderer.set_dirty();
        renderer.mark_wants_draw();
        let _ = renderer.update(provider, &mut factory, &mut sink);
    }

    let modes: Vec<bool> = factory.created.iter().map(|(_, mode)| *mode).collect();
    assert_eq!(
        modes,
        vec![true, false],
        "each mode created once and cached"
    );
    assert_eq!(renderer.active_material(), Some(&0));
}

#[test]
fn clear_discards_batches_and_forces_rebuild() {
    let provider = MaskProvider::new(4, 4, Color::YELLOW).activate_first(4);
    let mut renderer = renderer(16);
    let mut factory = CountingFactory::default();
    let mut sink = RecordingSink::default();

    renderer.mark_wants_draw();
    let _ = renderer.update(&provider, &mut factory, &mut sink);
    renderer.clear();

    assert!(renderer.batches().is_empty());
    assert!(renderer.is_dirty());
}
