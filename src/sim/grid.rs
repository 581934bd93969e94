//! Grid engine: the 3-column tile layout and the item storage buffer
//!
//! Layout invariants after every completed synthesis:
//! - Number columns (0 and 2) hold 0..=3 cells, empty slots first (top-padded)
//! - The operator column holds exactly one cell per operator and never changes

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellId, Operator, Position, StorageItem};
use super::dealer::Dealer;
use crate::consts::{MIN_NUMBERS_TO_CONTINUE, NUM_HEIGHT, OP_HEIGHT, OPERATOR_COLUMN};

/// A number column, index 0 is the top (where new tiles enter)
pub type NumberColumn = [Option<Cell>; NUM_HEIGHT];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    left: NumberColumn,
    operators: [Cell; OP_HEIGHT],
    right: NumberColumn,
}

impl Grid {
    /// Fresh grid: both number columns full, operators in fixed order
    pub fn new(dealer: &mut Dealer) -> Self {
        let operators = Operator::ALL.map(|op| dealer.operator_cell(op));
        Self {
            left: full_column(dealer),
            operators,
            right: full_column(dealer),
        }
    }

    /// Build a grid with explicit number values (top to bottom)
    pub fn from_values(
        left: [Option<i64>; NUM_HEIGHT],
        right: [Option<i64>; NUM_HEIGHT],
        dealer: &mut Dealer,
    ) -> Self {
        let operators = Operator::ALL.map(|op| dealer.operator_cell(op));
        Self {
            left: left.map(|v| v.map(|v| dealer.number_cell_with(v))),
            operators,
            right: right.map(|v| v.map(|v| dealer.number_cell_with(v))),
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col == OPERATOR_COLUMN {
            return self.operators.get(row);
        }
        self.column(col)?.get(row)?.as_ref()
    }

    /// Number column 0 or 2
    pub fn column(&self, col: usize) -> Option<&NumberColumn> {
        match col {
            0 => Some(&self.left),
            2 => Some(&self.right),
            _ => None,
        }
    }

    fn column_mut(&mut self, col: usize) -> Option<&mut NumberColumn> {
        match col {
            0 => Some(&mut self.left),
            2 => Some(&mut self.right),
            _ => None,
        }
    }

    pub fn operators(&self) -> &[Cell; OP_HEIGHT] {
        &self.operators
    }

    pub fn operator_at(&self, row: usize) -> Option<Operator> {
        self.operators.get(row).and_then(Cell::as_operator)
    }

    pub fn number_at(&self, col: usize, row: usize) -> Option<i64> {
        self.column(col)?.get(row)?.as_ref()?.as_number()
    }

    /// Number tiles across both number columns
    pub fn number_count(&self) -> usize {
        self.left.iter().chain(self.right.iter()).flatten().count()
    }

    /// Row of the cell with `id` in number column `col`
    pub fn row_of(&self, col: usize, id: CellId) -> Option<usize> {
        self.column(col)?
            .iter()
            .position(|c| c.is_some_and(|c| c.id == id))
    }

    /// True if every number column is top-padded (no cell above an empty slot)
    pub fn is_settled(&self) -> bool {
        [&self.left, &self.right].iter().all(|col| {
            let first_cell = col.iter().position(Option::is_some).unwrap_or(NUM_HEIGHT);
            col[first_cell..].iter().all(Option::is_some)
        })
    }

    /// Regenerate both number columns with fresh random tiles
    pub fn refresh(&mut self, dealer: &mut Dealer) {
        self.left = full_column(dealer);
        self.right = full_column(dealer);
    }
}

fn full_column(dealer: &mut Dealer) -> NumberColumn {
    std::array::from_fn(|_| Some(dealer.number_cell()))
}

/// Fixed-capacity item buffer. Occupied slots never move; only explicit
/// consumption empties a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    slots: Vec<Option<StorageItem>>,
}

impl Storage {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<StorageItem>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&StorageItem> {
        self.slots.get(index)?.as_ref()
    }

    pub fn take(&mut self, index: usize) -> Option<StorageItem> {
        self.slots.get_mut(index)?.take()
    }

    /// Overwrite a slot. Out-of-range indices are ignored.
    pub fn put(&mut self, index: usize, item: StorageItem) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(item);
        }
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn has_room(&self) -> bool {
        self.first_empty().is_some()
    }

    /// Place `item` in the first empty slot; `None` if storage is full
    pub fn insert(&mut self, item: StorageItem) -> Option<usize> {
        let index = self.first_empty()?;
        self.slots[index] = Some(item);
        Some(index)
    }

    pub fn number_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item.number_value().is_some())
            .count()
    }

    pub fn number_at(&self, index: usize) -> Option<i64> {
        self.get(index)?.item.number_value()
    }
}

/// Upcoming tile per number column, shown before it enters the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Previews {
    pub left: Cell,
    pub right: Cell,
}

impl Previews {
    pub fn new(dealer: &mut Dealer) -> Self {
        Self {
            left: dealer.number_cell(),
            right: dealer.number_cell(),
        }
    }

    /// Hand out the preview for `col` and queue a fresh one behind it
    fn take(&mut self, col: usize, dealer: &mut Dealer) -> Cell {
        let slot = if col == 0 { &mut self.left } else { &mut self.right };
        std::mem::replace(slot, dealer.number_cell())
    }
}

/// Value of the number at `pos`, if any
pub fn operand_value(grid: &Grid, storage: &Storage, pos: Position) -> Option<i64> {
    match pos {
        Position::Grid { col, row } => grid.number_at(col, row),
        Position::Storage { index } => storage.number_at(index),
    }
}

/// Result of settling one synthesis
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub grid: Grid,
    pub storage: Storage,
    /// Identity of the newly created result tile (non-match only)
    pub result_id: Option<CellId>,
    /// Where the result tile ended up after settling (non-match only)
    pub result_position: Option<Position>,
    /// Fewer than two number-bearing entities remain (non-match only)
    pub exhausted: bool,
}

/// Apply a validated synthesis to copies of `grid` and `storage`.
///
/// `first` is always consumed. `second` is consumed on a match, otherwise it
/// is replaced in place by a new tile holding `result`. Number columns are
/// then compacted and either refilled (match) or top-padded (no match).
pub fn apply_synthesis(
    grid: &Grid,
    storage: &Storage,
    first: Position,
    second: Position,
    result: i64,
    is_match: bool,
    previews: &mut Previews,
    dealer: &mut Dealer,
) -> SynthesisOutcome {
    let mut grid = grid.clone();
    let mut storage = storage.clone();

    remove_at(&mut grid, &mut storage, first);

    let mut result_id = None;
    if is_match {
        remove_at(&mut grid, &mut storage, second);
    } else {
        match second {
            Position::Grid { col, row } => {
                let cell = dealer.number_cell_with(result);
                if let Some(slot) = grid.column_mut(col).and_then(|c| c.get_mut(row)) {
                    *slot = Some(cell);
                    result_id = Some(cell.id);
                }
            }
            Position::Storage { index } => {
                let item = StorageItem::number(dealer.next_id(), result);
                if index < storage.capacity() {
                    storage.put(index, item);
                    result_id = Some(item.id);
                }
            }
        }
    }

    for col in [0, 2] {
        let Some(column) = grid.column_mut(col) else {
            continue;
        };
        let mut kept: Vec<Cell> = column.iter().flatten().copied().collect();
        if is_match && kept.len() < NUM_HEIGHT {
            // Preview sits next to the survivors, random fill above it
            kept.insert(0, previews.take(col, dealer));
            while kept.len() < NUM_HEIGHT {
                kept.insert(0, dealer.number_cell());
            }
        }
        let pad = NUM_HEIGHT - kept.len();
        *column = std::array::from_fn(|i| if i < pad { None } else { Some(kept[i - pad]) });
    }

    let (result_position, exhausted) = if is_match {
        (None, false)
    } else {
        let remaining = grid.number_count() + storage.number_count();
        let position = result_id.and_then(|id| match second {
            Position::Grid { col, .. } => grid.row_of(col, id).map(|row| Position::grid(col, row)),
            Position::Storage { index } => Some(Position::storage(index)),
        });
        (position, remaining < MIN_NUMBERS_TO_CONTINUE)
    };

    SynthesisOutcome {
        grid,
        storage,
        result_id,
        result_position,
        exhausted,
    }
}

fn remove_at(grid: &mut Grid, storage: &mut Storage, pos: Position) {
    match pos {
        Position::Grid { col, row } => {
            if let Some(slot) = grid.column_mut(col).and_then(|c| c.get_mut(row)) {
                *slot = None;
            }
        }
        Position::Storage { index } => {
            storage.take(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cell::Item;

    fn setup() -> (Dealer, Previews) {
        let mut dealer = Dealer::new(1234);
        let previews = Previews::new(&mut dealer);
        (dealer, previews)
    }

    #[test]
    fn test_new_grid_is_full() {
        let mut dealer = Dealer::new(1);
        let grid = Grid::new(&mut dealer);
        assert_eq!(grid.number_count(), 6);
        assert!(grid.is_settled());
        let ops: Vec<_> = grid.operators().iter().filter_map(Cell::as_operator).collect();
        assert_eq!(ops, Operator::ALL.to_vec());
    }

    #[test]
    fn test_non_match_replaces_second_in_place() {
        let (mut dealer, mut previews) = setup();
        let grid = Grid::from_values([Some(3), Some(5), Some(7)], [Some(1), Some(2), Some(8)], &mut dealer);
        let storage = Storage::new(4);
        let old_id = grid.cell(2, 0).map(|c| c.id);

        let out = apply_synthesis(
            &grid,
            &storage,
            Position::grid(0, 0),
            Position::grid(2, 0),
            4,
            false,
            &mut previews,
            &mut dealer,
        );

        // Left column lost its top tile and was top-padded
        let left: Vec<_> = out.grid.column(0).unwrap().iter().map(|c| c.and_then(|c| c.as_number())).collect();
        assert_eq!(left, vec![None, Some(5), Some(7)]);
        // Result replaced the right column's top tile with a new identity
        assert_eq!(out.grid.number_at(2, 0), Some(4));
        assert_ne!(out.grid.cell(2, 0).map(|c| c.id), old_id);
        assert_eq!(out.result_position, Some(Position::grid(2, 0)));
        assert!(!out.exhausted);
        assert!(out.grid.is_settled());
    }

    #[test]
    fn test_non_match_same_column_repacks() {
        let (mut dealer, mut previews) = setup();
        let grid = Grid::from_values([Some(3), Some(5), Some(7)], [Some(1), Some(2), Some(8)], &mut dealer);
        let storage = Storage::new(4);

        let out = apply_synthesis(
            &grid,
            &storage,
            Position::grid(0, 2),
            Position::grid(0, 0),
            10,
            false,
            &mut previews,
            &mut dealer,
        );

        let left: Vec<_> = out.grid.column(0).unwrap().iter().map(|c| c.and_then(|c| c.as_number())).collect();
        assert_eq!(left, vec![None, Some(10), Some(5)]);
        assert_eq!(out.result_position, Some(Position::grid(0, 1)));
    }

    #[test]
    fn test_match_refills_with_preview() {
        let (mut dealer, mut previews) = setup();
        let left_preview = previews.left;
        let right_preview = previews.right;
        let grid = Grid::from_values([Some(4), Some(5), Some(7)], [Some(6), Some(2), Some(8)], &mut dealer);
        let storage = Storage::new(4);

        let out = apply_synthesis(
            &grid,
            &storage,
            Position::grid(0, 0),
            Position::grid(2, 0),
            24,
            true,
            &mut previews,
            &mut dealer,
        );

        assert_eq!(out.grid.number_count(), 6);
        assert_eq!(out.grid.cell(0, 0), Some(&left_preview));
        assert_eq!(out.grid.cell(2, 0), Some(&right_preview));
        assert_eq!(out.grid.number_at(0, 1), Some(5));
        assert_ne!(previews.left, left_preview);
        assert_eq!(out.result_id, None);
        assert!(!out.exhausted);
    }

    #[test]
    fn test_match_refill_short_by_two() {
        let (mut dealer, mut previews) = setup();
        let left_preview = previews.left;
        let grid = Grid::from_values([None, Some(4), Some(6)], [Some(1), Some(2), Some(8)], &mut dealer);
        let storage = Storage::new(4);

        let out = apply_synthesis(
            &grid,
            &storage,
            Position::grid(0, 1),
            Position::grid(0, 2),
            24,
            true,
            &mut previews,
            &mut dealer,
        );

        let column = out.grid.column(0).unwrap();
        assert!(column.iter().all(Option::is_some));
        // Preview goes last (nearest the bottom), random tile above it
        assert_eq!(column[2], Some(left_preview));
        // Right column untouched
        assert_eq!(out.grid.number_at(2, 0), Some(1));
    }

    #[test]
    fn test_storage_operands() {
        let (mut dealer, mut previews) = setup();
        let grid = Grid::from_values([Some(3), Some(5), Some(7)], [Some(1), Some(2), Some(8)], &mut dealer);
        let mut storage = Storage::new(4);
        storage.put(1, StorageItem::number(dealer.next_id(), 9));
        storage.put(3, StorageItem::number(dealer.next_id(), 2));

        let out = apply_synthesis(
            &grid,
            &storage,
            Position::storage(1),
            Position::storage(3),
            18,
            false,
            &mut previews,
            &mut dealer,
        );

        assert!(out.storage.get(1).is_none());
        assert_eq!(out.storage.get(3).map(|s| s.item), Some(Item::Number(18)));
        assert_eq!(out.result_position, Some(Position::storage(3)));
        // Grid untouched
        assert_eq!(out.grid, grid);
    }

    #[test]
    fn test_exhaustion_counts_storage_numbers() {
        let (mut dealer, mut previews) = setup();
        let grid = Grid::from_values([None, None, Some(3)], [None, None, Some(1)], &mut dealer);
        let storage = Storage::new(4);

        let out = apply_synthesis(
            &grid,
            &storage,
            Position::grid(0, 2),
            Position::grid(2, 2),
            4,
            false,
            &mut previews,
            &mut dealer,
        );
        assert!(out.exhausted);

        let mut storage = Storage::new(4);
        storage.put(0, StorageItem::number(dealer.next_id(), 5));
        let out = apply_synthesis(
            &grid,
            &storage,
            Position::grid(0, 2),
            Position::grid(2, 2),
            4,
            false,
            &mut previews,
            &mut dealer,
        );
        assert!(!out.exhausted);
    }

    #[test]
    fn test_inputs_not_mutated() {
        let (mut dealer, mut previews) = setup();
        let grid = Grid::from_values([Some(3), Some(5), Some(7)], [Some(1), Some(2), Some(8)], &mut dealer);
        let storage = Storage::new(4);
        let before = grid.clone();
        let _ = apply_synthesis(
            &grid,
            &storage,
            Position::grid(0, 0),
            Position::grid(2, 1),
            5,
            false,
            &mut previews,
            &mut dealer,
        );
        assert_eq!(grid, before);
    }

    #[test]
    fn test_storage_slots_stay_put() {
        let mut dealer = Dealer::new(5);
        let mut storage = Storage::new(4);
        assert_eq!(storage.insert(StorageItem::number(dealer.next_id(), 1)), Some(0));
        assert_eq!(storage.insert(StorageItem::number(dealer.next_id(), 2)), Some(1));
        storage.take(0);
        assert_eq!(storage.number_at(1), Some(2));
        assert_eq!(storage.first_empty(), Some(0));
        for _ in 0..3 {
            storage.insert(StorageItem::number(dealer.next_id(), 3));
        }
        assert!(!storage.has_room());
        assert_eq!(storage.insert(StorageItem::number(dealer.next_id(), 4)), None);
    }
}
