#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Contribution router that taps the host's wealth recount.
//!
//! The router is handed to the host recount as a [`RecountObserver`]. It
//! never feeds anything back into the host: every hook only forwards the
//! contribution to the overlay's accumulation grid.

use wealth_overlay_core::{Event, OverlayError, Positioned, RecountObserver};
use wealth_overlay_map::WealthOverlay;

/// Counts gathered while routing one recount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecountSummary {
    /// Contributions forwarded to the grid.
    pub routed: usize,
}

/// Forwards every contribution of a host recount into a [`WealthOverlay`].
///
/// The grid is emptied when the recount starts, so each recount rebuilds the
/// overlay from scratch. The first contribution that cannot be placed stops
/// routing and leaves the overlay resetting, so a partial grid is never
/// reported as complete. The error is surfaced by [`finish`](Self::finish).
#[derive(Debug)]
pub struct ContributionRouter<'a, M> {
    overlay: &'a mut WealthOverlay<M>,
    summary: RecountSummary,
    error: Option<OverlayError>,
    events: Vec<Event>,
}

impl<'a, M> ContributionRouter<'a, M> {
    /// Creates a router targeting the provided overlay.
    #[must_use]
    pub fn new(overlay: &'a mut WealthOverlay<M>) -> Self {
        Self {
            overlay,
            summary: RecountSummary::default(),
            error: None,
            events: Vec::new(),
        }
    }

    /// Consumes the router, forwarding overlay events and reporting the outcome.
    pub fn finish(self, out_events: &mut Vec<Event>) -> Result<RecountSummary, OverlayError> {
        out_events.extend(self.events);
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.summary),
        }
    }

    fn route<F>(&mut self, register: F)
    where
        F: FnOnce(&mut WealthOverlay<M>) -> Result<(), OverlayError>,
    {
        if self.error.is_some() {
            return;
        }

        match register(&mut *self.overlay) {
            Ok(()) => self.summary.routed += 1,
            Err(error) => {
                tracing::warn!(
                    target: "wealth_overlay::recount",
                    error = %error,
                    "contribution.rejected"
                );
                self.error = Some(error);
            }
        }
    }

    fn fail(&mut self, error: OverlayError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

impl<M> RecountObserver for ContributionRouter<'_, M> {
    fn recount_started(&mut self) {
        if let Err(error) = self.overlay.begin_recount() {
            self.fail(error);
        }
    }

    fn item_counted(&mut self, value: f32, item: &dyn Positioned) {
        let cell = item.position_held();
        self.route(|overlay| overlay.register(value, cell));
    }

    fn pawn_counted(&mut self, value: f32, pawn: &dyn Positioned) {
        let cell = pawn.position_held();
        self.route(|overlay| overlay.register(value, cell));
    }

    fn floor_counted(&mut self, value: f32, index: usize) {
        self.route(|overlay| overlay.register_native(value, index));
    }

    fn recount_finished(&mut self) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.overlay.finish_recount(&mut self.events) {
            self.fail(error);
        }
    }
}
