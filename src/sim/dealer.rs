//! Seeded randomness and identity allocation
//!
//! Every random decision in a round (fresh tiles, previews, targets, rewards)
//! goes through one `Dealer`, so a seed plus a command sequence replays exactly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::cell::{Cell, CellId, Operator};
use crate::consts::{MAX_TILE_VALUE, MIN_TILE_VALUE};

#[derive(Debug, Clone)]
pub struct Dealer {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    next_id: u32,
}

impl Dealer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new cell/item identity
    pub fn next_id(&mut self) -> CellId {
        let id = CellId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Mint a number tile with a uniform value in 1..=9
    pub fn number_cell(&mut self) -> Cell {
        let value = self.rng.random_range(MIN_TILE_VALUE..=MAX_TILE_VALUE);
        let id = self.next_id();
        Cell::number(id, value)
    }

    pub fn number_cell_with(&mut self, value: i64) -> Cell {
        let id = self.next_id();
        Cell::number(id, value)
    }

    pub fn operator_cell(&mut self, op: Operator) -> Cell {
        let id = self.next_id();
        Cell::operator(id, op)
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}
