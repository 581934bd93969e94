//! Target catalog and the scheduled target selector
//!
//! The catalog is a static table partitioned by difficulty tier. Selection is
//! uniform within a bucket; which bucket is used is a deterministic function of
//! the target's absolute index in the round and the number of completed draws.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::consts::{LONG_CYCLE_DRAW_LIMIT, WARMUP_TARGETS};

/// Target difficulty, scaling both score and time budget via `core_base`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy = 0,
    Normal = 1,
    Hard = 2,
    Expert = 3,
    Master = 4,
    Legend = 5,
}

impl DifficultyTier {
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Display label key
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "EASY",
            DifficultyTier::Normal => "NORMAL",
            DifficultyTier::Hard => "HARD",
            DifficultyTier::Expert => "EXPERT",
            DifficultyTier::Master => "MASTER",
            DifficultyTier::Legend => "LEGEND",
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetData {
    pub value: i64,
    pub tier: DifficultyTier,
    /// Scales the match score and the per-target countdown
    pub core_base: u32,
}

const fn t(value: i64, tier: DifficultyTier, core_base: u32) -> TargetData {
    TargetData {
        value,
        tier,
        core_base,
    }
}

use DifficultyTier::*;

/// Targets 11-200. Tiers are contiguous by intent, not enforced.
pub static TARGET_CATALOG: &[TargetData] = &[
    // Easy
    t(12, Easy, 2), t(20, Easy, 2), t(24, Easy, 2), t(30, Easy, 2),
    t(36, Easy, 2), t(40, Easy, 2), t(48, Easy, 2), t(50, Easy, 2),
    t(60, Easy, 2), t(72, Easy, 2), t(80, Easy, 2), t(84, Easy, 2),
    t(90, Easy, 2), t(100, Easy, 3), t(120, Easy, 3), t(140, Easy, 3),
    t(144, Easy, 3), t(150, Easy, 3), t(160, Easy, 3), t(180, Easy, 3),
    t(200, Easy, 3),
    // Normal
    t(14, Normal, 4), t(15, Normal, 4), t(16, Normal, 4), t(18, Normal, 4),
    t(21, Normal, 4), t(22, Normal, 4), t(25, Normal, 5), t(26, Normal, 5),
    t(27, Normal, 5), t(28, Normal, 5), t(32, Normal, 5), t(33, Normal, 5),
    t(34, Normal, 5), t(35, Normal, 5), t(38, Normal, 5), t(39, Normal, 5),
    t(42, Normal, 5), t(44, Normal, 5), t(45, Normal, 5), t(46, Normal, 5),
    t(49, Normal, 5), t(52, Normal, 5), t(54, Normal, 5), t(55, Normal, 5),
    t(56, Normal, 5), t(63, Normal, 5), t(64, Normal, 5), t(65, Normal, 5),
    t(66, Normal, 5), t(70, Normal, 5), t(75, Normal, 5), t(77, Normal, 5),
    t(78, Normal, 5), t(81, Normal, 5), t(85, Normal, 5), t(88, Normal, 5),
    t(91, Normal, 5), t(92, Normal, 5), t(95, Normal, 5), t(96, Normal, 5),
    t(98, Normal, 5), t(99, Normal, 5),
    // Hard
    t(11, Hard, 6), t(13, Hard, 6), t(17, Hard, 6), t(19, Hard, 6),
    t(23, Hard, 6), t(29, Hard, 6), t(31, Hard, 6), t(37, Hard, 6),
    t(41, Hard, 6), t(43, Hard, 6), t(47, Hard, 6), t(51, Hard, 6),
    t(53, Hard, 6), t(57, Hard, 6), t(58, Hard, 6), t(59, Hard, 6),
    t(61, Hard, 6), t(62, Hard, 6), t(67, Hard, 6), t(68, Hard, 6),
    t(69, Hard, 6), t(71, Hard, 6), t(73, Hard, 6), t(74, Hard, 6),
    t(76, Hard, 6), t(79, Hard, 6), t(82, Hard, 6), t(83, Hard, 6),
    t(86, Hard, 6), t(87, Hard, 6), t(89, Hard, 6), t(93, Hard, 6),
    t(94, Hard, 6), t(97, Hard, 6),
    // Expert
    t(102, Expert, 8), t(104, Expert, 8), t(105, Expert, 8), t(106, Expert, 8),
    t(108, Expert, 8), t(110, Expert, 8), t(111, Expert, 8), t(112, Expert, 8),
    t(114, Expert, 8), t(115, Expert, 8), t(116, Expert, 8), t(117, Expert, 8),
    t(118, Expert, 8), t(119, Expert, 8), t(121, Expert, 8), t(122, Expert, 8),
    t(123, Expert, 8), t(124, Expert, 8), t(125, Expert, 8), t(126, Expert, 8),
    t(128, Expert, 8), t(129, Expert, 8), t(130, Expert, 8), t(132, Expert, 8),
    t(133, Expert, 8), t(134, Expert, 8), t(135, Expert, 8), t(136, Expert, 8),
    t(138, Expert, 8), t(141, Expert, 8), t(142, Expert, 8), t(143, Expert, 8),
    t(145, Expert, 8), t(146, Expert, 8), t(147, Expert, 8), t(148, Expert, 8),
    t(152, Expert, 8), t(153, Expert, 8), t(154, Expert, 8), t(155, Expert, 8),
    t(156, Expert, 8), t(158, Expert, 8),
    // Master
    t(101, Master, 10), t(103, Master, 10), t(107, Master, 10), t(109, Master, 10),
    t(113, Master, 10), t(127, Master, 10), t(131, Master, 10), t(137, Master, 10),
    t(139, Master, 10), t(149, Master, 10), t(151, Master, 10), t(157, Master, 10),
    t(159, Master, 10), t(161, Master, 10), t(162, Master, 10), t(164, Master, 10),
    t(165, Master, 10), t(166, Master, 10), t(168, Master, 10), t(170, Master, 10),
    t(171, Master, 10), t(172, Master, 10), t(174, Master, 10), t(175, Master, 10),
    t(176, Master, 10), t(177, Master, 10), t(178, Master, 10),
    // Legend
    t(163, Legend, 12), t(167, Legend, 12), t(169, Legend, 12), t(173, Legend, 12),
    t(179, Legend, 12), t(181, Legend, 12), t(182, Legend, 12), t(183, Legend, 12),
    t(184, Legend, 12), t(185, Legend, 12), t(186, Legend, 12), t(187, Legend, 12),
    t(188, Legend, 12), t(189, Legend, 12), t(190, Legend, 12), t(191, Legend, 12),
    t(192, Legend, 12), t(193, Legend, 12), t(194, Legend, 12), t(195, Legend, 12),
    t(196, Legend, 12), t(197, Legend, 12), t(198, Legend, 12), t(199, Legend, 12),
];

/// Selector buckets over the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bucket {
    /// Small, easy values for the opening targets
    Warmup,
    Low,
    Medium,
    High,
    Legend,
}

impl Bucket {
    pub fn contains(&self, target: &TargetData) -> bool {
        match self {
            Bucket::Warmup => target.value < 40 && target.tier <= Normal,
            Bucket::Low => target.tier <= Hard,
            Bucket::Medium => target.tier == Expert,
            Bucket::High => target.tier == Master,
            Bucket::Legend => target.tier == DifficultyTier::Legend,
        }
    }

    pub fn members(&self) -> Vec<&'static TargetData> {
        TARGET_CATALOG.iter().filter(|t| self.contains(t)).collect()
    }
}

/// Bucket schedule for the target at `index` (0-based within the round).
///
/// After the warmup the schedule repeats: a 6-slot cycle (low, low, low,
/// medium, high, legend) until two draws are completed, then a 5-slot cycle
/// (low, low, medium, high, legend).
pub fn bucket_for_index(index: u32, total_draws: u32) -> Bucket {
    if index < WARMUP_TARGETS {
        return Bucket::Warmup;
    }
    let relative = index - WARMUP_TARGETS;
    if total_draws < LONG_CYCLE_DRAW_LIMIT {
        match relative % 6 {
            0..=2 => Bucket::Low,
            3 => Bucket::Medium,
            4 => Bucket::High,
            _ => Bucket::Legend,
        }
    } else {
        match relative % 5 {
            0 | 1 => Bucket::Low,
            2 => Bucket::Medium,
            3 => Bucket::High,
            _ => Bucket::Legend,
        }
    }
}

/// Pick the target for `index`, uniformly within its scheduled bucket
pub fn select_target<R: Rng + ?Sized>(index: u32, total_draws: u32, rng: &mut R) -> TargetData {
    let bucket = bucket_for_index(index, total_draws);
    let members = bucket.members();
    match members.choose(rng) {
        Some(target) => **target,
        None => {
            log::warn!("Empty target bucket {:?}, falling back to first catalog entry", bucket);
            TARGET_CATALOG[0]
        }
    }
}
