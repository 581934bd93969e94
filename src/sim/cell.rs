//! Tile and storage-item value types
//!
//! Cells are immutable from an identity standpoint: whenever a value changes a
//! new `CellId` is minted and the old cell is replaced, never edited in place.

use serde::{Deserialize, Serialize};

/// Opaque per-instance identity for a tile or storage item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

/// The fixed operator set (one cell per symbol in the middle column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Column order of the operator cells
    pub const ALL: [Self; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '×',
            Operator::Div => '÷',
        }
    }
}

/// What a grid cell carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Number(i64),
    Operator(Operator),
}

/// A single tile on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub value: CellValue,
}

impl Cell {
    pub fn number(id: CellId, value: i64) -> Self {
        Self {
            id,
            value: CellValue::Number(value),
        }
    }

    pub fn operator(id: CellId, op: Operator) -> Self {
        Self {
            id,
            value: CellValue::Operator(op),
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.value {
            CellValue::Number(n) => Some(n),
            CellValue::Operator(_) => None,
        }
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self.value {
            CellValue::Operator(op) => Some(op),
            CellValue::Number(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self.value, CellValue::Number(_))
    }
}

/// Reward item kinds (also the key for "seen item" flags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    Score,
    Number,
    Timer,
    Refresh,
}

impl ItemKind {
    /// The gacha pool, drawn uniformly
    pub const ALL: [Self; 4] = [Self::Score, Self::Number, Self::Timer, Self::Refresh];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Score => "score",
            ItemKind::Number => "number",
            ItemKind::Timer => "timer",
            ItemKind::Refresh => "refresh",
        }
    }
}

/// Payload of a reward or storage item. Only numbers carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    /// Instant score pack, never stored
    Score,
    /// Usable as a synthesis operand
    Number(i64),
    /// Extends the countdown ceiling and remaining time
    Timer,
    /// Regenerates both number columns
    Refresh,
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Score => ItemKind::Score,
            Item::Number(_) => ItemKind::Number,
            Item::Timer => ItemKind::Timer,
            Item::Refresh => ItemKind::Refresh,
        }
    }

    pub fn number_value(&self) -> Option<i64> {
        match self {
            Item::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageItem {
    pub id: CellId,
    pub item: Item,
}

impl StorageItem {
    pub fn number(id: CellId, value: i64) -> Self {
        Self {
            id,
            item: Item::Number(value),
        }
    }
}

/// Where a selected operand or operator lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Grid { col: usize, row: usize },
    Storage { index: usize },
}

impl Position {
    pub fn grid(col: usize, row: usize) -> Self {
        Position::Grid { col, row }
    }

    pub fn storage(index: usize) -> Self {
        Position::Storage { index }
    }
}
