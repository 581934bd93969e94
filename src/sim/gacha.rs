//! Reward (gacha) draws
//!
//! A draw picks uniformly from the item pool. Score packs pay out immediately,
//! everything else lands in the first empty storage slot or is discarded.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::cell::{Item, ItemKind, StorageItem};
use super::dealer::Dealer;
use super::state::RoundState;
use crate::consts::{MAX_TILE_VALUE, MIN_TILE_VALUE};
use crate::settings::Settings;

/// Draw one reward
pub fn draw(dealer: &mut Dealer) -> StorageItem {
    let kind = ItemKind::ALL
        .choose(dealer.rng())
        .copied()
        .unwrap_or(ItemKind::Score);
    let item = match kind {
        ItemKind::Score => Item::Score,
        ItemKind::Number => Item::Number(dealer.rng().random_range(MIN_TILE_VALUE..=MAX_TILE_VALUE)),
        ItemKind::Timer => Item::Timer,
        ItemKind::Refresh => Item::Refresh,
    };
    StorageItem {
        id: dealer.next_id(),
        item,
    }
}

/// Apply a drawn reward to the round.
///
/// Returns the storage slot the item landed in, if it was stored. Every draw
/// resets the numbers-used counter and counts toward the selector schedule.
pub fn apply_reward(round: &mut RoundState, reward: StorageItem, settings: &Settings) -> Option<usize> {
    let slot = match reward.item {
        Item::Score => {
            round.score += settings.score_pack_points;
            None
        }
        _ => {
            let slot = round.storage.insert(reward);
            if slot.is_none() {
                log::info!("Storage full, discarding {:?}", reward.item);
            }
            slot
        }
    };
    round.numbers_used = 0;
    round.total_draws += 1;
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cell::CellId;
    use std::collections::HashSet;

    #[test]
    fn test_draw_covers_pool() {
        let mut dealer = Dealer::new(77);
        let mut seen = HashSet::new();
        for _ in 0..400 {
            let reward = draw(&mut dealer);
            if let Item::Number(n) = reward.item {
                assert!((1..=9).contains(&n));
            }
            seen.insert(reward.item.kind());
        }
        assert_eq!(seen.len(), ItemKind::ALL.len());
    }

    #[test]
    fn test_score_pack_skips_storage() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(3);
        let mut round = RoundState::new(&settings, &mut dealer);
        round.numbers_used = 12;

        let slot = apply_reward(&mut round, StorageItem { id: CellId(900), item: Item::Score }, &settings);
        assert_eq!(slot, None);
        assert_eq!(round.score, settings.score_pack_points);
        assert_eq!(round.storage.first_empty(), Some(0));
        assert_eq!(round.numbers_used, 0);
        assert_eq!(round.total_draws, 1);
    }

    #[test]
    fn test_items_fill_first_empty_slot() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(3);
        let mut round = RoundState::new(&settings, &mut dealer);
        round.storage.put(0, StorageItem { id: CellId(901), item: Item::Timer });

        let slot = apply_reward(&mut round, StorageItem { id: CellId(902), item: Item::Number(6) }, &settings);
        assert_eq!(slot, Some(1));
        assert_eq!(round.storage.number_at(1), Some(6));
    }

    #[test]
    fn test_full_storage_discards_but_counts_draw() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(3);
        let mut round = RoundState::new(&settings, &mut dealer);
        for i in 0..settings.storage_size {
            round.storage.put(i, StorageItem { id: CellId(910 + i as u32), item: Item::Refresh });
        }

        let slot = apply_reward(&mut round, StorageItem { id: CellId(999), item: Item::Timer }, &settings);
        assert_eq!(slot, None);
        assert_eq!(round.total_draws, 1);
        assert!(round.storage.slots().iter().all(|s| s.is_some_and(|s| s.item == Item::Refresh)));
    }
}
