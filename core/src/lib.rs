#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the wealth overlay crates.
//!
//! This crate defines the vocabulary that connects the host map, the
//! accumulation grid, the overlay renderer and the pure systems. Hosts feed
//! contributions through the [`RecountObserver`] hooks, adapters submit
//! [`Command`] values describing lifecycle changes, and the overlay component
//! answers with [`Event`] values the host reacts to (most importantly
//! [`Event::RecountRequested`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGBA color used for overlay materials and per-vertex tints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Fully opaque white. Vertex tints equal to this color are ignored by materials.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque yellow used as the default wealth tint.
    pub const YELLOW: Self = Self::new(1.0, 0.92, 0.016, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the same color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }

    /// Returns `true` when the color is exactly opaque white.
    #[must_use]
    pub fn is_opaque_white(&self) -> bool {
        *self == Self::WHITE
    }
}

/// Location of a single host-grid cell.
///
/// The host map is laid out on the horizontal plane, so the second axis is
/// named `z` rather than `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    z: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }
}

/// Dimensions of the host map measured in native cells.
///
/// Also provides the host's linear index mapping: index = `z * width + x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSize {
    width: u32,
    height: u32,
}

impl MapSize {
    /// Creates a new map size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of native cells along the x axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of native cells along the z axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of native cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reports whether the cell lies inside the map.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.width && cell.z() < self.height
    }

    /// Converts a cell into its native linear index.
    ///
    /// Returns `None` for cells outside the map.
    #[must_use]
    pub fn cell_to_index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let z = usize::try_from(cell.z()).ok()?;
        let x = usize::try_from(cell.x()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(z * width + x)
    }

    /// Converts a native linear index back into a cell.
    ///
    /// Returns `None` when the index lies past the last cell.
    #[must_use]
    pub fn index_to_cell(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let x = u32::try_from(index % width).ok()?;
        let z = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(x, z))
    }
}

/// Number of native cells covered by one accumulator bucket edge.
///
/// Always at least one. Serialized as a bare integer so persisted settings
/// stay readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Zoom(u32);

impl Zoom {
    /// Native resolution: one bucket per host cell.
    pub const NATIVE: Self = Self(1);

    /// Creates a zoom level, rejecting zero.
    pub fn new(scale: u32) -> Result<Self, OverlayError> {
        if scale == 0 {
            return Err(OverlayError::InvalidZoom { zoom: scale });
        }
        Ok(Self(scale))
    }

    /// Retrieves the scale factor.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Next finer level, floored at [`Zoom::NATIVE`].
    #[must_use]
    pub const fn finer(self) -> Self {
        if self.0 > 1 {
            Self(self.0 - 1)
        } else {
            Self::NATIVE
        }
    }

    /// Next coarser level.
    #[must_use]
    pub const fn coarser(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::NATIVE
    }
}

impl TryFrom<u32> for Zoom {
    type Error = OverlayError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Zoom> for u32 {
    fn from(zoom: Zoom) -> Self {
        zoom.get()
    }
}

/// State that survives a save/load cycle of the host map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Active zoom level of the accumulation grid.
    #[serde(default)]
    pub zoom: Zoom,
}

impl OverlaySettings {
    /// Creates settings with the provided zoom level.
    #[must_use]
    pub const fn new(zoom: Zoom) -> Self {
        Self { zoom }
    }
}

/// Default fraction of the base alpha applied to the overlay material.
pub const DEFAULT_OPACITY: f32 = 0.33;

/// Tint and translucency shared by the grid's vertex colors and the overlay material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Base tint of the overlay.
    pub color: Color,
    /// Multiplier applied to the base alpha, in the range 0.0..=1.0.
    pub opacity: f32,
}

impl OverlayStyle {
    /// Creates a style from a base color and opacity.
    #[must_use]
    pub const fn new(color: Color, opacity: f32) -> Self {
        Self { color, opacity }
    }

    /// Base color with its alpha multiplied by the opacity.
    #[must_use]
    pub fn translucent_color(&self) -> Color {
        self.color.with_alpha(self.color.alpha * self.opacity)
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::new(Color::YELLOW, DEFAULT_OPACITY)
    }
}

/// Errors surfaced by the overlay crates.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum OverlayError {
    /// A zoom level must be at least one.
    #[error("zoom must be at least 1 (received {zoom})")]
    InvalidZoom {
        /// Rejected zoom value.
        zoom: u32,
    },
    /// A contribution referenced a cell outside the host map.
    #[error(
        "cell ({}, {}) lies outside the {}x{} map",
        .cell.x(),
        .cell.z(),
        .size.width(),
        .size.height()
    )]
    CellOutOfBounds {
        /// Offending cell.
        cell: CellCoord,
        /// Dimensions of the host map.
        size: MapSize,
    },
    /// A contribution referenced a native index past the end of the host map.
    #[error("native index {index} is out of range for a map with {len} cells")]
    IndexOutOfBounds {
        /// Offending native index.
        index: usize,
        /// Number of cells in the host map.
        len: usize,
    },
    /// The overlay has no grid yet.
    #[error("overlay has not been loaded")]
    Uninitialized,
    /// The overlay was torn down together with its map.
    #[error("overlay has been destroyed")]
    Destroyed,
}

/// Read-only capability view consumed by the batch mesh builder.
///
/// Any grid-like provider can be drawn by implementing these queries. Cell
/// coordinates are expressed in provider cells, which cover
/// [`scale`](ZoomGridProvider::scale) native cells along each edge.
pub trait ZoomGridProvider {
    /// Base tint of the overlay material.
    fn color(&self) -> Color;

    /// Provider dimensions as `(width, height)` in provider cells.
    fn dimensions(&self) -> (u32, u32);

    /// Native cells per provider cell edge.
    fn scale(&self) -> u32;

    /// Reports whether the cell should be drawn.
    fn cell_active(&self, x: u32, z: u32) -> bool;

    /// Vertex tint for the cell, carrying its relative intensity in alpha.
    fn cell_color(&self, x: u32, z: u32) -> Color;
}

/// Host entity whose current location can be queried.
pub trait Positioned {
    /// Cell the entity occupies, or the cell of whatever holds it.
    fn position_held(&self) -> CellCoord;
}

/// Hooks invoked by the host's wealth recount.
///
/// The host calls `recount_started` once, then one hook per contribution in
/// whatever order it enumerates them, then `recount_finished`. Observers must
/// not influence the host's own totals. All hooks default to doing nothing so
/// `()` can be passed when nobody listens.
pub trait RecountObserver {
    /// A full recount is about to enumerate every contribution.
    fn recount_started(&mut self) {}

    /// Value of a stored item, attributed to where the item is held.
    fn item_counted(&mut self, _value: f32, _item: &dyn Positioned) {}

    /// Value of a pawn, attributed to where the pawn stands.
    fn pawn_counted(&mut self, _value: f32, _pawn: &dyn Positioned) {}

    /// Value of a floor tile, attributed to its native cell index.
    fn floor_counted(&mut self, _value: f32, _index: usize) {}

    /// The recount enumerated every contribution.
    fn recount_finished(&mut self) {}
}

impl RecountObserver for () {}

/// Commands that express all permissible overlay lifecycle mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Changes the accumulation grid resolution.
    SetZoom {
        /// Requested zoom level.
        zoom: Zoom,
    },
    /// Discards accumulated values and asks the host for a full recount.
    ForceRecount,
    /// Tears the overlay down together with its map.
    Destroy,
}

/// Events broadcast by the overlay after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// The accumulation grid switched to a new resolution.
    ZoomChanged {
        /// Previous zoom level.
        from: Zoom,
        /// Zoom level now in effect.
        to: Zoom,
    },
    /// The grid is empty and the host must run a full recount.
    RecountRequested,
    /// A recount finished populating the grid.
    RecountCompleted {
        /// Sum of every bucket after the recount.
        total: f32,
    },
    /// The overlay released its grid and batches.
    OverlayDestroyed,
}
