#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resolution-aware accumulation grid for the wealth overlay.
//!
//! Contributions are deposited into square buckets covering `zoom × zoom`
//! native cells. Changing the zoom cannot be derived from the existing bucket
//! totals, so [`AccumulationGrid::set_zoom`] reallocates an empty grid and the
//! owner is expected to replay a full recount.

use wealth_overlay_core::{
    CellCoord, Color, MapSize, OverlayError, OverlayStyle, Zoom, ZoomGridProvider,
};

/// Per-bucket scalar accumulator laid over the host map.
#[derive(Clone, Debug)]
pub struct AccumulationGrid {
    map_size: MapSize,
    style: OverlayStyle,
    zoom: Zoom,
    width: u32,
    height: u32,
    cells: Vec<f32>,
    max_value: f32,
    max_stale: bool,
}

impl AccumulationGrid {
    /// Allocates an empty grid covering `map_size` at the provided zoom.
    #[must_use]
    pub fn new(map_size: MapSize, zoom: Zoom, style: OverlayStyle) -> Self {
        let (width, height) = bucket_dimensions(map_size, zoom);
        Self {
            map_size,
            style,
            zoom,
            width,
            height,
            cells: allocate_cells(width, height),
            max_value: 0.0,
            max_stale: false,
        }
    }

    /// Dimensions of the host map the grid covers.
    #[must_use]
    pub const fn map_size(&self) -> MapSize {
        self.map_size
    }

    /// Zoom level currently in effect.
    #[must_use]
    pub const fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Number of buckets along the x axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of buckets along the z axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Style used to derive vertex colors.
    #[must_use]
    pub const fn style(&self) -> OverlayStyle {
        self.style
    }

    /// Bucket values in row-major order (`z * width + x`).
    #[must_use]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Adds `value` to the bucket covering the native cell.
    ///
    /// Cells outside the host map are rejected without touching the grid.
    pub fn register(&mut self, value: f32, cell: CellCoord) -> Result<(), OverlayError> {
        if !self.map_size.contains(cell) {
            return Err(OverlayError::CellOutOfBounds {
                cell,
                size: self.map_size,
            });
        }

        let zoom = self.zoom.get();
        let index = self.bucket_index(cell.x() / zoom, cell.z() / zoom);
        match index.and_then(|index| self.cells.get_mut(index)) {
            Some(bucket) => {
                *bucket += value;
                self.max_stale = true;
                Ok(())
            }
            None => Err(OverlayError::CellOutOfBounds {
                cell,
                size: self.map_size,
            }),
        }
    }

    /// Adds `value` to the bucket covering the native linear index.
    pub fn register_native(&mut self, value: f32, index: usize) -> Result<(), OverlayError> {
        let cell =
            self.map_size
                .index_to_cell(index)
                .ok_or_else(|| OverlayError::IndexOutOfBounds {
                    index,
                    len: self.map_size.cell_count(),
                })?;
        self.register(value, cell)
    }

    /// Switches to a new zoom level.
    ///
    /// Returns `false` without touching the grid when the zoom is unchanged.
    /// Otherwise the buckets are reallocated at the new resolution with every
    /// value reset to zero.
    pub fn set_zoom(&mut self, zoom: Zoom) -> bool {
        if zoom == self.zoom {
            return false;
        }

        let (width, height) = bucket_dimensions(self.map_size, zoom);
        tracing::debug!(
            target: "wealth_overlay::grid",
            from = self.zoom.get(),
            to = zoom.get(),
            width,
            height,
            "grid.reallocated"
        );
        self.zoom = zoom;
        self.width = width;
        self.height = height;
        self.cells = allocate_cells(width, height);
        self.max_value = 0.0;
        self.max_stale = false;
        true
    }

    /// Resets every bucket to zero, keeping the current resolution.
    pub fn clear(&mut self) {
        self.cells.fill(0.0);
        self.max_value = 0.0;
        self.max_stale = false;
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.cells.iter().sum()
    }

    /// Cached maximum bucket value as of the last [`refresh_max`](Self::refresh_max).
    #[must_use]
    pub const fn max_cell(&self) -> f32 {
        self.max_value
    }

    /// Recomputes the cached maximum if registrations happened since the last call.
    pub fn refresh_max(&mut self) -> f32 {
        if self.max_stale {
            self.max_value = self.cells.iter().copied().fold(0.0, f32::max);
            self.max_stale = false;
        }
        self.max_value
    }

    /// Value held by the bucket, or `None` outside the grid.
    #[must_use]
    pub fn value_at(&self, x: u32, z: u32) -> Option<f32> {
        self.bucket_index(x, z)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the bucket holds value and the grid is not all zero.
    #[must_use]
    pub fn is_active(&self, x: u32, z: u32) -> bool {
        self.max_value > 0.0 && self.value_at(x, z).map_or(false, |value| value > 0.0)
    }

    /// Base color with alpha scaled by the bucket's share of the maximum.
    #[must_use]
    pub fn intensity_color(&self, x: u32, z: u32) -> Color {
        let base = self.style.translucent_color();
        if self.max_value <= 0.0 {
            return base.with_alpha(0.0);
        }

        let ratio = self.value_at(x, z).unwrap_or(0.0) / self.max_value;
        base.with_alpha(base.alpha * ratio)
    }

    fn bucket_index(&self, x: u32, z: u32) -> Option<usize> {
        if x < self.width && z < self.height {
            let z = usize::try_from(z).ok()?;
            let x = usize::try_from(x).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(z * width + x)
        } else {
            None
        }
    }
}

impl ZoomGridProvider for AccumulationGrid {
    fn color(&self) -> Color {
        self.style.color
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn scale(&self) -> u32 {
        self.zoom.get()
    }

    fn cell_active(&self, x: u32, z: u32) -> bool {
        self.is_active(x, z)
    }

    fn cell_color(&self, x: u32, z: u32) -> Color {
        self.intensity_color(x, z)
    }
}

/// Bucket grid dimensions for a map at the provided zoom.
///
/// Native zoom maps one bucket per cell. Coarser zooms add a padding bucket
/// along each axis to absorb the remainder of the integer division.
#[must_use]
pub const fn bucket_dimensions(map_size: MapSize, zoom: Zoom) -> (u32, u32) {
    let scale = zoom.get();
    if scale == 1 {
        return (map_size.width(), map_size.height());
    }
    (map_size.width() / scale + 1, map_size.height() / scale + 1)
}

fn allocate_cells(width: u32, height: u32) -> Vec<f32> {
    vec![0.0; width as usize * height as usize]
}
