//! Immutable reward tables: the 12-tier level table and the 15-deep referral table.
//!
//! Both tables are fixed at ledger construction and never mutated afterwards.
//! Levels and depths are 1-indexed throughout the public API.

use crate::amount::{BgpAmount, UsdtAmount};
use crate::error::TypesError;
use serde::{Deserialize, Serialize};

/// Number of level tiers.
pub const MAX_LEVEL: u8 = 12;

/// Maximum depth of referral fan-out.
pub const MAX_REFERRAL_DEPTH: usize = 15;

/// One level tier: contribution threshold and its one-time rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTier {
    pub threshold: u64,
    pub usdt_reward: UsdtAmount,
    pub bgp_reward: BgpAmount,
}

/// The level table. Thresholds are strictly increasing; rewards never decrease.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTable {
    tiers: [LevelTier; MAX_LEVEL as usize],
}

impl LevelTable {
    /// Build a table, rejecting non-monotonic tiers.
    pub fn new(tiers: [LevelTier; MAX_LEVEL as usize]) -> Result<Self, TypesError> {
        if tiers[0].threshold == 0 {
            return Err(TypesError::InvalidTable(
                "level 1 threshold must be positive".into(),
            ));
        }
        for (idx, pair) in tiers.windows(2).enumerate() {
            let (lower, upper) = (&pair[0], &pair[1]);
            let level = idx + 2;
            if upper.threshold <= lower.threshold {
                return Err(TypesError::InvalidTable(format!(
                    "level {level} threshold {} not above level {} threshold {}",
                    upper.threshold,
                    level - 1,
                    lower.threshold
                )));
            }
            if upper.usdt_reward < lower.usdt_reward || upper.bgp_reward < lower.bgp_reward {
                return Err(TypesError::InvalidTable(format!(
                    "level {level} rewards are below level {}",
                    level - 1
                )));
            }
        }
        Ok(Self { tiers })
    }

    /// The production table (V1..V12).
    pub fn standard() -> Self {
        const fn tier(threshold: u64, usdt_tenths: u128, bgp: u128) -> LevelTier {
            LevelTier {
                threshold,
                usdt_reward: UsdtAmount::from_ratio(usdt_tenths, 10),
                bgp_reward: BgpAmount::from_whole(bgp),
            }
        }
        Self {
            tiers: [
                tier(10, 1, 200),
                tier(50, 5, 200),
                tier(100, 10, 200),
                tier(500, 50, 2_000),
                tier(3_000, 200, 8_000),
                tier(10_000, 1_000, 10_000),
                tier(30_000, 2_000, 30_000),
                tier(50_000, 3_000, 50_000),
                tier(100_000, 5_000, 100_000),
                tier(300_000, 10_000, 300_000),
                tier(500_000, 20_000, 500_000),
                tier(1_000_000, 100_000, 1_000_000),
            ],
        }
    }

    /// Tier for a 1-indexed level.
    pub fn tier(&self, level: u8) -> Option<&LevelTier> {
        if level == 0 {
            return None;
        }
        self.tiers.get(level as usize - 1)
    }

    /// Highest level whose threshold `contribution` meets; 0 below level 1.
    pub fn compute_level(&self, contribution: u64) -> u8 {
        self.tiers
            .iter()
            .take_while(|t| contribution >= t.threshold)
            .count() as u8
    }

    /// The first level not yet reached, with its tier.
    pub fn next_requirement(&self, contribution: u64) -> Option<(u8, &LevelTier)> {
        let reached = self.compute_level(contribution);
        self.tier(reached + 1).map(|t| (reached + 1, t))
    }

    /// Iterate `(level, tier)` pairs from level 1.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &LevelTier)> {
        self.tiers.iter().enumerate().map(|(i, t)| (i as u8 + 1, t))
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Reward paid to the ancestor at one referral depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralTier {
    pub bgp_reward: BgpAmount,
    pub contribution_credit: u64,
}

/// Depth-indexed referral rewards (depth 1 = direct referrer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralDepthTable {
    tiers: [ReferralTier; MAX_REFERRAL_DEPTH],
}

impl ReferralDepthTable {
    pub fn new(tiers: [ReferralTier; MAX_REFERRAL_DEPTH]) -> Self {
        Self { tiers }
    }

    /// The production table: 800/400/200 BGP for the first three generations, 100 after.
    pub fn standard() -> Self {
        let mut tiers = [ReferralTier {
            bgp_reward: BgpAmount::from_whole(100),
            contribution_credit: 1,
        }; MAX_REFERRAL_DEPTH];
        tiers[0] = ReferralTier {
            bgp_reward: BgpAmount::from_whole(800),
            contribution_credit: 8,
        };
        tiers[1] = ReferralTier {
            bgp_reward: BgpAmount::from_whole(400),
            contribution_credit: 4,
        };
        tiers[2] = ReferralTier {
            bgp_reward: BgpAmount::from_whole(200),
            contribution_credit: 2,
        };
        Self { tiers }
    }

    /// Tier for a 1-indexed depth.
    pub fn tier(&self, depth: usize) -> Option<&ReferralTier> {
        if depth == 0 {
            return None;
        }
        self.tiers.get(depth - 1)
    }

    pub fn depth(&self) -> usize {
        self.tiers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ReferralTier)> {
        self.tiers.iter().enumerate().map(|(i, t)| (i + 1, t))
    }
}

impl Default for ReferralDepthTable {
    fn default() -> Self {
        Self::standard()
    }
}
