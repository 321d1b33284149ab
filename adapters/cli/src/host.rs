//! Simulated host map used to drive the overlay from the command line.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wealth_overlay_core::{CellCoord, MapSize, Positioned, RecountObserver};

/// Stored item, optionally carried by a pawn.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Item {
    cell: CellCoord,
    carrier: Option<usize>,
    market_value: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Pawn {
    cell: CellCoord,
    market_value: f32,
}

struct HeldItem<'a> {
    item: &'a Item,
    pawns: &'a [Pawn],
}

impl Positioned for HeldItem<'_> {
    fn position_held(&self) -> CellCoord {
        self.item
            .carrier
            .and_then(|carrier| self.pawns.get(carrier))
            .map_or(self.item.cell, |pawn| pawn.cell)
    }
}

impl Positioned for Pawn {
    fn position_held(&self) -> CellCoord {
        self.cell
    }
}

/// Host map with items, pawns and floors worth something.
#[derive(Clone, Debug)]
pub(crate) struct HostMap {
    size: MapSize,
    items: Vec<Item>,
    pawns: Vec<Pawn>,
    floors: Vec<f32>,
}

impl HostMap {
    /// Generates a deterministic map from the provided seed.
    pub(crate) fn generate(size: MapSize, seed: u64, items: usize, pawns: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let random_cell = |rng: &mut ChaCha8Rng| {
            CellCoord::new(
                rng.gen_range(0..size.width().max(1)),
                rng.gen_range(0..size.height().max(1)),
            )
        };

        let pawns: Vec<Pawn> = (0..pawns)
            .map(|_| Pawn {
                cell: random_cell(&mut rng),
                market_value: rng.gen_range(500.0..3_000.0),
            })
            .collect();
        let items = (0..items)
            .map(|_| Item {
                cell: random_cell(&mut rng),
                carrier: if !pawns.is_empty() && rng.gen_bool(0.1) {
                    Some(rng.gen_range(0..pawns.len()))
                } else {
                    None
                },
                market_value: rng.gen_range(1.0..250.0),
            })
            .collect();
        let floors = (0..size.cell_count())
            .map(|_| {
                if rng.gen_bool(0.3) {
                    rng.gen_range(0.5..8.0)
                } else {
                    0.0
                }
            })
            .collect();

        Self {
            size,
            items,
            pawns,
            floors,
        }
    }

    /// Dimensions of the map.
    pub(crate) const fn size(&self) -> MapSize {
        self.size
    }

    /// Recomputes the map's total wealth, reporting every contribution to `observer`.
    pub(crate) fn force_recount(&self, observer: &mut dyn RecountObserver) -> f32 {
        observer.recount_started();

        let mut items_total = 0.0;
        for item in &self.items {
            items_total += item.market_value;
            observer.item_counted(
                item.market_value,
                &HeldItem {
                    item,
                    pawns: &self.pawns,
                },
            );
        }

        let mut pawns_total = 0.0;
        for pawn in &self.pawns {
            pawns_total += pawn.market_value;
            observer.pawn_counted(pawn.market_value, pawn);
        }

        let mut floors_total = 0.0;
        for (index, &value) in self.floors.iter().enumerate() {
            if value > 0.0 {
                floors_total += value;
                observer.floor_counted(value, index);
            }
        }

        observer.recount_finished();
        items_total + pawns_total + floors_total
    }
}
