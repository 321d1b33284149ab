use wealth_overlay_core::{
    CellCoord, Color, Command, Event, MapSize, OverlayError, OverlaySettings, OverlayStyle, Zoom,
};
use wealth_overlay_map::{apply, query, OverlayPhase, WealthOverlay};
use wealth_overlay_rendering::{GeometryBatch, MaterialFactory, RenderSink, RendererConfig};

#[derive(Default)]
struct Materials {
    created: Vec<Color>,
}

impl MaterialFactory for Materials {
    type Material = Color;

    fn solid_color_material(&mut self, color: Color, _vertex_colors: bool) -> Color {
        self.created.push(color);
        color
    }
}

#[derive(Default)]
struct Quads {
    drawn: usize,
}

impl RenderSink<Color> for Quads {
    fn draw_batch(&mut self, batch: &GeometryBatch, _material: &Color, _render_queue: i32) {
        self.drawn += batch.quad_count();
    }
}

fn loaded_overlay(size: MapSize) -> (WealthOverlay<Color>, Vec<Event>) {
    let mut overlay = WealthOverlay::new(size, OverlayStyle::default(), RendererConfig::default())
        .expect("default renderer config is valid");
    let mut events = Vec::new();
    overlay
        .load(OverlaySettings::default(), &mut events)
        .expect("fresh overlay loads");
    (overlay, events)
}

fn recount(overlay: &mut WealthOverlay<Color>, cells: &[(f32, CellCoord)]) -> Vec<Event> {
    let mut events = Vec::new();
    overlay.begin_recount().expect("overlay accepts a recount");
    for &(value, cell) in cells {
        overlay.register(value, cell).expect("cell inside map");
    }
    overlay
        .finish_recount(&mut events)
        .expect("overlay finishes the recount");
    events
}

#[test]
fn overlay_draws_after_a_full_cycle() {
    let (mut overlay, events) = loaded_overlay(MapSize::new(20, 20));
    assert_eq!(events, vec![Event::RecountRequested]);

    let events = recount(
        &mut overlay,
        &[(4.0, CellCoord::new(1, 1)), (2.0, CellCoord::new(19, 0))],
    );
    assert_eq!(events, vec![Event::RecountCompleted { total: 6.0 }]);

    let mut materials = Materials::default();
    let mut quads = Quads::default();
    let outcome = overlay.update_drawer(&mut materials, &mut quads);

    assert!(outcome.rebuilt);
    assert_eq!(quads.drawn, 2);
    assert_eq!(materials.created.len(), 1);
}

#[test]
fn zooming_out_then_recounting_keeps_the_total() {
    let (mut overlay, _) = loaded_overlay(MapSize::new(20, 20));
    let cells = [
        (4.0, CellCoord::new(1, 1)),
        (2.0, CellCoord::new(2, 2)),
        (1.0, CellCoord::new(19, 19)),
    ];
    let _ = recount(&mut overlay, &cells);

    let mut events = Vec::new();
    apply(
        &mut overlay,
        Command::SetZoom {
            zoom: Zoom::new(4).expect("valid zoom"),
        },
        &mut events,
    )
    .expect("zoom applies");

    assert_eq!(query::phase(&overlay), OverlayPhase::Resetting);
    assert_eq!(query::total_wealth(&overlay), 0.0);
    assert!(events.contains(&Event::RecountRequested));

    let _ = recount(&mut overlay, &cells);
    let mut quads = Quads::default();
    let _ = overlay.update_drawer(&mut Materials::default(), &mut quads);

    assert_eq!(query::phase(&overlay), OverlayPhase::Active);
    assert_eq!(query::total_wealth(&overlay), 7.0);
    assert_eq!(quads.drawn, 2, "two nearby cells share one bucket");
}

#[test]
fn destroyed_overlay_rejects_everything() {
    let (mut overlay, _) = loaded_overlay(MapSize::new(4, 4));
    let mut events = Vec::new();
    apply(&mut overlay, Command::Destroy, &mut events).expect("first destroy succeeds");

    assert_eq!(events, vec![Event::OverlayDestroyed]);
    assert_eq!(
        overlay.register(1.0, CellCoord::new(0, 0)),
        Err(OverlayError::Destroyed)
    );
    assert_eq!(
        apply(&mut overlay, Command::ForceRecount, &mut events),
        Err(OverlayError::Destroyed)
    );
    assert_eq!(
        overlay.load(OverlaySettings::default(), &mut events),
        Err(OverlayError::Destroyed)
    );

    let mut quads = Quads::default();
    let outcome = overlay.update_drawer(&mut Materials::default(), &mut quads);
    assert!(!outcome.rebuilt);
    assert_eq!(quads.drawn, 0);
}
