#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure zoom system translating user actions into zoom commands.

use wealth_overlay_core::{Command, Event, Zoom};

/// Discrete zoom actions exposed to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomAction {
    /// Decreases the scale, floored at one native cell per bucket.
    Finer,
    /// Increases the scale without an upper bound.
    Coarser,
}

/// Zoom system that tracks the active zoom and emits `SetZoom` commands.
#[derive(Debug, Clone)]
pub struct ZoomControl {
    zoom: Zoom,
}

impl Default for ZoomControl {
    fn default() -> Self {
        Self::new(Zoom::NATIVE)
    }
}

impl ZoomControl {
    /// Creates a zoom system starting at the provided zoom.
    #[must_use]
    pub const fn new(zoom: Zoom) -> Self {
        Self { zoom }
    }

    /// Zoom the system believes is in effect.
    #[must_use]
    pub const fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Consumes overlay events and user actions to emit zoom commands.
    ///
    /// All actions of one call collapse into at most one command. Nothing is
    /// emitted when the actions cancel out or hit the floor.
    pub fn handle(&mut self, events: &[Event], actions: &[ZoomAction], out: &mut Vec<Command>) {
        for event in events {
            if let Event::ZoomChanged { to, .. } = event {
                self.zoom = *to;
            }
        }

        let requested = actions.iter().fold(self.zoom, |zoom, action| match action {
            ZoomAction::Finer => zoom.finer(),
            ZoomAction::Coarser => zoom.coarser(),
        });

        if requested != self.zoom {
            self.zoom = requested;
            out.push(Command::SetZoom { zoom: requested });
        }
    }
}
