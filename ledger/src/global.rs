use bela_sybil::RegistryStats;
use bela_types::NativeAmount;
use serde::{Deserialize, Serialize};

/// Process-wide counters and switches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Account records ever created.
    pub total_participants: u64,
    pub total_interactions: u64,
    /// Early-bonus grants so far.
    pub total_registered: u64,
    pub paused: bool,
    pub auto_level_check_enabled: bool,
    /// Interaction fees received and not yet swept to the treasury.
    pub fee_pool: NativeAmount,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            total_participants: 0,
            total_interactions: 0,
            total_registered: 0,
            paused: false,
            auto_level_check_enabled: true,
            fee_pool: NativeAmount::ZERO,
        }
    }
}

/// Read-only summary returned by `global_stats`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_participants: u64,
    pub total_interactions: u64,
    pub total_registered: u64,
    pub early_bird_remaining: u64,
    pub paused: bool,
    pub auto_level_check_enabled: bool,
    pub fee_pool: NativeAmount,
    pub registry: RegistryStats,
}
