#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-map wealth overlay component.
//!
//! [`WealthOverlay`] owns the accumulation grid and the renderer that draws
//! it. Contributions land in the grid through [`WealthOverlay::register`] and
//! friends, each marking the renderer dirty. Lifecycle changes go through
//! [`apply`], which answers with [`Event`] values; the host must run a full
//! recount whenever [`Event::RecountRequested`] is emitted.

use wealth_overlay_core::{
    CellCoord, Command, Event, MapSize, OverlayError, OverlaySettings, OverlayStyle, Zoom,
};
use wealth_overlay_grid::AccumulationGrid;
use wealth_overlay_rendering::{
    FrameOutcome, MaterialFactory, OverlayRenderer, RenderSink, RendererConfig, RenderingError,
};

/// Lifecycle phase of a [`WealthOverlay`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayPhase {
    /// No grid exists yet.
    Uninitialized,
    /// The grid reflects the last completed recount plus later registrations.
    Active,
    /// The grid was emptied and waits for a full recount to repopulate it.
    Resetting,
    /// Grid and batches were released together with the map.
    Destroyed,
}

/// Wealth accumulator and overlay drawer attached to one host map.
#[derive(Debug)]
pub struct WealthOverlay<M> {
    map_size: MapSize,
    style: OverlayStyle,
    settings: OverlaySettings,
    phase: OverlayPhase,
    grid: Option<AccumulationGrid>,
    renderer: OverlayRenderer<M>,
}

impl<M> WealthOverlay<M> {
    /// Creates an uninitialized overlay for a map of the provided size.
    ///
    /// The renderer inherits its opacity from `style`.
    pub fn new(
        map_size: MapSize,
        style: OverlayStyle,
        renderer: RendererConfig,
    ) -> Result<Self, RenderingError> {
        let renderer = OverlayRenderer::new(RendererConfig {
            opacity: style.opacity,
            ..renderer
        })?;

        Ok(Self {
            map_size,
            style,
            settings: OverlaySettings::default(),
            phase: OverlayPhase::Uninitialized,
            grid: None,
            renderer,
        })
    }

    /// Allocates the grid at the persisted zoom and requests the first recount.
    ///
    /// Loading again reconstructs the grid from scratch.
    pub fn load(
        &mut self,
        settings: OverlaySettings,
        out_events: &mut Vec<Event>,
    ) -> Result<(), OverlayError> {
        if self.phase == OverlayPhase::Destroyed {
            return Err(OverlayError::Destroyed);
        }

        self.settings = settings;
        self.grid = Some(AccumulationGrid::new(
            self.map_size,
            settings.zoom,
            self.style,
        ));
        self.renderer.clear();
        self.phase = OverlayPhase::Active;
        out_events.push(Event::RecountRequested);
        Ok(())
    }

    /// Adds a contribution at a native cell.
    pub fn register(&mut self, value: f32, cell: CellCoord) -> Result<(), OverlayError> {
        self.grid_mut()?.register(value, cell)?;
        self.renderer.set_dirty();
        Ok(())
    }

    /// Adds a contribution at a native linear index.
    pub fn register_native(&mut self, value: f32, index: usize) -> Result<(), OverlayError> {
        self.grid_mut()?.register_native(value, index)?;
        self.renderer.set_dirty();
        Ok(())
    }

    /// Empties the grid ahead of a full recount.
    pub fn begin_recount(&mut self) -> Result<(), OverlayError> {
        self.grid_mut()?.clear();
        self.renderer.set_dirty();
        self.phase = OverlayPhase::Resetting;
        Ok(())
    }

    /// Marks the grid as populated and reports the recounted total.
    pub fn finish_recount(&mut self, out_events: &mut Vec<Event>) -> Result<(), OverlayError> {
        let total = self.grid_mut()?.total();
        self.phase = OverlayPhase::Active;

        tracing::info!(
            target: "wealth_overlay::map",
            total,
            zoom = self.settings.zoom.get(),
            "recount.completed"
        );
        out_events.push(Event::RecountCompleted { total });
        Ok(())
    }

    /// Draws the overlay for the current frame.
    ///
    /// Requests a draw, refreshes the cached maximum and lets the renderer
    /// rebuild if anything changed since the last frame.
    pub fn update_drawer<F, S>(&mut self, factory: &mut F, sink: &mut S) -> FrameOutcome
    where
        F: MaterialFactory<Material = M>,
        S: RenderSink<M> + ?Sized,
    {
        let Some(grid) = self.grid.as_mut() else {
            return FrameOutcome::default();
        };

        self.renderer.mark_wants_draw();
        let _ = grid.refresh_max();
        self.renderer.update(&*grid, factory, sink)
    }

    fn set_zoom(&mut self, zoom: Zoom, out_events: &mut Vec<Event>) -> Result<(), OverlayError> {
        let grid = self.grid_mut()?;
        let from = grid.zoom();
        if !grid.set_zoom(zoom) {
            return Ok(());
        }

        tracing::info!(
            target: "wealth_overlay::map",
            from = from.get(),
            to = zoom.get(),
            "zoom.changed"
        );
        self.settings.zoom = zoom;
        self.renderer.clear();
        self.phase = OverlayPhase::Resetting;
        out_events.push(Event::ZoomChanged { from, to: zoom });
        out_events.push(Event::RecountRequested);
        Ok(())
    }

    fn destroy(&mut self, out_events: &mut Vec<Event>) -> Result<(), OverlayError> {
        if self.phase == OverlayPhase::Destroyed {
            return Err(OverlayError::Destroyed);
        }

        self.grid = None;
        self.renderer.clear();
        self.phase = OverlayPhase::Destroyed;
        out_events.push(Event::OverlayDestroyed);
        Ok(())
    }

    fn grid_mut(&mut self) -> Result<&mut AccumulationGrid, OverlayError> {
        match self.phase {
            OverlayPhase::Uninitialized => Err(OverlayError::Uninitialized),
            OverlayPhase::Destroyed => Err(OverlayError::Destroyed),
            OverlayPhase::Active | OverlayPhase::Resetting => {
                self.grid.as_mut().ok_or(OverlayError::Uninitialized)
            }
        }
    }
}

/// Applies a lifecycle command, broadcasting the resulting events.
pub fn apply<M>(
    overlay: &mut WealthOverlay<M>,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), OverlayError> {
    match command {
        Command::SetZoom { zoom } => overlay.set_zoom(zoom, out_events),
        Command::ForceRecount => {
            overlay.begin_recount()?;
            out_events.push(Event::RecountRequested);
            Ok(())
        }
        Command::Destroy => overlay.destroy(out_events),
    }
}

/// Query functions that provide read-only access to the overlay state.
pub mod query {
    use super::{OverlayPhase, WealthOverlay};
    use wealth_overlay_core::{MapSize, OverlaySettings, Zoom};
    use wealth_overlay_grid::AccumulationGrid;
    use wealth_overlay_rendering::OverlayRenderer;

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase<M>(overlay: &WealthOverlay<M>) -> OverlayPhase {
        overlay.phase
    }

    /// Settings that should be persisted with the map.
    #[must_use]
    pub fn settings<M>(overlay: &WealthOverlay<M>) -> OverlaySettings {
        overlay.settings
    }

    /// Zoom level currently in effect.
    #[must_use]
    pub fn zoom<M>(overlay: &WealthOverlay<M>) -> Zoom {
        overlay.settings.zoom
    }

    /// Dimensions of the host map.
    #[must_use]
    pub fn map_size<M>(overlay: &WealthOverlay<M>) -> MapSize {
        overlay.map_size
    }

    /// Read-only access to the accumulation grid, if one exists.
    #[must_use]
    pub fn grid<M>(overlay: &WealthOverlay<M>) -> Option<&AccumulationGrid> {
        overlay.grid.as_ref()
    }

    /// Read-only access to the renderer and its cached batches.
    #[must_use]
    pub fn renderer<M>(overlay: &WealthOverlay<M>) -> &OverlayRenderer<M> {
        &overlay.renderer
    }

    /// Sum of every bucket; zero when no grid exists.
    #[must_use]
    pub fn total_wealth<M>(overlay: &WealthOverlay<M>) -> f32 {
        overlay.grid.as_ref().map_or(0.0, AccumulationGrid::total)
    }
}
