//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (`Game::tick` is driven by the host clock)
//! - Seeded RNG only
//! - Delayed effects carry a generation token and no-op when stale
//! - No rendering, audio or persistence dependencies

pub mod catalog;
pub mod cell;
pub mod controller;
pub mod dealer;
pub mod gacha;
pub mod grid;
pub mod state;
pub mod synthesis;
pub mod tick;
pub mod timer;

pub use catalog::{Bucket, DifficultyTier, TARGET_CATALOG, TargetData, bucket_for_index, select_target};
pub use cell::{Cell, CellId, CellValue, Item, ItemKind, Operator, Position, StorageItem};
pub use controller::{Command, Game};
pub use dealer::Dealer;
pub use gacha::{apply_reward, draw};
pub use grid::{Grid, Previews, Storage, SynthesisOutcome, apply_synthesis, operand_value};
pub use state::{
    Checkpoint, DrawState, EndReason, GameEvent, GamePhase, RoundState, Selection, Snapshot,
};
pub use synthesis::{SynthesisError, evaluate};
pub use timer::Countdown;
