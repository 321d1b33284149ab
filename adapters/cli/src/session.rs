//! Turn loop tying the simulated host, the overlay and the zoom system together.

use anyhow::{Context, Result};
use wealth_overlay_core::Event;
use wealth_overlay_map::{self as map, query, WealthOverlay};
use wealth_overlay_system_recount::ContributionRouter;
use wealth_overlay_system_zoom::{ZoomAction, ZoomControl};

use crate::{
    config::OverlayConfig,
    host::HostMap,
    sink::{FrameReport, HeadlessMaterials, MaterialHandle, SummarySink},
};

/// Running overlay session over one host map.
pub(crate) struct Session {
    host: HostMap,
    overlay: WealthOverlay<MaterialHandle>,
    zoom: ZoomControl,
    materials: HeadlessMaterials,
    sink: SummarySink,
    events: Vec<Event>,
    host_total: f32,
}

impl Session {
    /// Creates the overlay for `host` and runs the initial recount.
    pub(crate) fn new(host: HostMap, config: &OverlayConfig) -> Result<Self> {
        let mut overlay = WealthOverlay::new(host.size(), config.style(), config.renderer())
            .context("invalid renderer configuration")?;
        let mut events = Vec::new();
        overlay
            .load(config.settings(), &mut events)
            .context("failed to load overlay settings")?;

        let mut session = Self {
            host,
            overlay,
            zoom: ZoomControl::new(config.zoom),
            materials: HeadlessMaterials::default(),
            sink: SummarySink::default(),
            events,
            host_total: 0.0,
        };
        session.settle()?;
        Ok(session)
    }

    /// Overlay driven by the session.
    pub(crate) fn overlay(&self) -> &WealthOverlay<MaterialHandle> {
        &self.overlay
    }

    /// Host total reported by the most recent recount.
    pub(crate) const fn host_total(&self) -> f32 {
        self.host_total
    }

    /// Number of materials the overlay asked for so far.
    pub(crate) const fn materials_created(&self) -> usize {
        self.materials.created()
    }

    /// Runs one frame: applies zoom actions, settles recounts and draws.
    pub(crate) fn frame(&mut self, actions: &[ZoomAction]) -> Result<FrameReport> {
        let events = std::mem::take(&mut self.events);
        let mut commands = Vec::new();
        self.zoom.handle(&events, actions, &mut commands);
        for command in commands {
            map::apply(&mut self.overlay, command, &mut self.events)
                .with_context(|| format!("failed to apply {command:?}"))?;
        }
        self.settle()?;

        let outcome = self
            .overlay
            .update_drawer(&mut self.materials, &mut self.sink);
        tracing::debug!(
            target: "wealth_overlay::cli",
            rebuilt = outcome.rebuilt,
            submitted = outcome.submitted,
            "frame.drawn"
        );
        Ok(self.sink.take_report())
    }

    fn settle(&mut self) -> Result<()> {
        if self
            .events
            .iter()
            .any(|event| matches!(event, Event::RecountRequested))
        {
            self.recount()?;
        }
        Ok(())
    }

    fn recount(&mut self) -> Result<()> {
        let mut router = ContributionRouter::new(&mut self.overlay);
        let host_total = self.host.force_recount(&mut router);
        let summary = router
            .finish(&mut self.events)
            .context("failed to route recount contributions")?;

        self.host_total = host_total;
        tracing::info!(
            target: "wealth_overlay::cli",
            host_total,
            overlay_total = query::total_wealth(&self.overlay),
            routed = summary.routed,
            "recount.routed"
        );
        Ok(())
    }
}
