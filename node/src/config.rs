//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use bela_ledger::LedgerRoles;
use bela_types::{AccountAddress, LedgerParams, PublicKey, UsdtAmount};

use crate::NodeError;

/// Configuration for a BelaChain ledger node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Amounts that exceed TOML's
/// 64-bit integers are given in whole units and scaled on conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Administrator address.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Receiver of emergency withdrawals.
    #[serde(default = "default_treasury")]
    pub treasury: String,

    /// Account holding the ledger's BGP and USDT balances.
    #[serde(default = "default_pool")]
    pub pool: String,

    /// Hex-encoded Ed25519 key of the trusted identity attester.
    /// Without one, every attestation is rejected.
    #[serde(default)]
    pub attester_public_key: Option<String>,

    /// Where `save_snapshot` writes the ledger state.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Accounts eligible for the one-time early bonus.
    #[serde(default = "default_early_bird_limit")]
    pub early_bird_limit: u64,

    /// Accounts allowed per network identity.
    #[serde(default = "default_max_accounts_per_identity")]
    pub max_accounts_per_identity: u32,

    /// Interaction fee target in USD micro-units.
    #[serde(default = "default_fee_target_usd_micros")]
    pub fee_target_usd_micros: u64,

    /// Oracle rates older than this many seconds are refused.
    #[serde(default = "default_oracle_max_age_secs")]
    pub oracle_max_age_secs: u64,

    /// Whether interacting requires a bound network identity.
    #[serde(default = "default_true")]
    pub require_identity: bool,

    /// Seconds an attestation stays valid.
    #[serde(default = "default_attestation_validity_secs")]
    pub attestation_validity_secs: u64,

    /// Minimum USDT withdrawal in whole USDT.
    #[serde(default = "default_min_usdt_withdrawal")]
    pub min_usdt_withdrawal: u64,

    /// Fixed native-per-USD rate used by the static oracle,
    /// as `numerator / denominator` raw native units per whole USD.
    #[serde(default = "default_native_per_usd_numerator")]
    pub native_per_usd_numerator: u64,

    #[serde(default = "default_native_per_usd_denominator")]
    pub native_per_usd_denominator: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_owner() -> String {
    format!("0x{:040x}", 1)
}

fn default_treasury() -> String {
    format!("0x{:040x}", 2)
}

fn default_pool() -> String {
    format!("0x{:040x}", 3)
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("./bela_data/ledger.snapshot")
}

fn default_early_bird_limit() -> u64 {
    1_000
}

fn default_max_accounts_per_identity() -> u32 {
    3
}

fn default_fee_target_usd_micros() -> u64 {
    700_000
}

fn default_oracle_max_age_secs() -> u64 {
    3_600
}

fn default_true() -> bool {
    true
}

fn default_attestation_validity_secs() -> u64 {
    300
}

fn default_min_usdt_withdrawal() -> u64 {
    10
}

fn default_native_per_usd_numerator() -> u64 {
    // 4000 USD per native unit of 18 decimals.
    250_000_000_000_000
}

fn default_native_per_usd_denominator() -> u64 {
    1
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Ledger parameters: production defaults with this file's overrides.
    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams {
            early_bird_limit: self.early_bird_limit,
            max_accounts_per_identity: self.max_accounts_per_identity,
            interaction_fee_usd_micros: u128::from(self.fee_target_usd_micros),
            oracle_max_age_secs: self.oracle_max_age_secs,
            require_identity: self.require_identity,
            attestation_validity_secs: self.attestation_validity_secs,
            min_usdt_withdrawal: UsdtAmount::from_whole(u128::from(self.min_usdt_withdrawal)),
            ..LedgerParams::default()
        }
    }

    pub fn roles(&self) -> Result<LedgerRoles, NodeError> {
        Ok(LedgerRoles {
            owner: AccountAddress::parse(&self.owner)?,
            treasury: AccountAddress::parse(&self.treasury)?,
            pool: AccountAddress::parse(&self.pool)?,
        })
    }

    pub fn attester_key(&self) -> Result<Option<PublicKey>, NodeError> {
        self.attester_public_key
            .as_deref()
            .map(PublicKey::from_hex)
            .transpose()
            .map_err(NodeError::from)
    }

    /// The static oracle's rate, refusing a zero denominator up front.
    pub fn native_per_usd(&self) -> Result<(u128, u128), NodeError> {
        if self.native_per_usd_numerator == 0 || self.native_per_usd_denominator == 0 {
            return Err(NodeError::Config(
                "native_per_usd_numerator and native_per_usd_denominator must be non-zero".into(),
            ));
        }
        Ok((
            u128::from(self.native_per_usd_numerator),
            u128::from(self.native_per_usd_denominator),
        ))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            treasury: default_treasury(),
            pool: default_pool(),
            attester_public_key: None,
            snapshot_path: default_snapshot_path(),
            early_bird_limit: default_early_bird_limit(),
            max_accounts_per_identity: default_max_accounts_per_identity(),
            fee_target_usd_micros: default_fee_target_usd_micros(),
            oracle_max_age_secs: default_oracle_max_age_secs(),
            require_identity: default_true(),
            attestation_validity_secs: default_attestation_validity_secs(),
            min_usdt_withdrawal: default_min_usdt_withdrawal(),
            native_per_usd_numerator: default_native_per_usd_numerator(),
            native_per_usd_denominator: default_native_per_usd_denominator(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().expect("serializable");
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.early_bird_limit, 1_000);
        assert_eq!(config.max_accounts_per_identity, 3);
        assert_eq!(config.log_format, "human");
        assert!(config.require_identity);
        assert_eq!(config.ledger_params(), LedgerParams::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            early_bird_limit = 5
            require_identity = false
            min_usdt_withdrawal = 25
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        let params = config.ledger_params();
        assert_eq!(params.early_bird_limit, 5);
        assert!(!params.require_identity);
        assert_eq!(params.min_usdt_withdrawal, UsdtAmount::from_whole(25));
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn roles_parse_default_addresses() {
        let roles = NodeConfig::default().roles().expect("valid defaults");
        assert_ne!(roles.owner, roles.pool);
        assert_ne!(roles.treasury, roles.pool);
    }

    #[test]
    fn bad_owner_is_rejected() {
        let config = NodeConfig {
            owner: "not-an-address".into(),
            ..NodeConfig::default()
        };
        assert!(matches!(config.roles(), Err(NodeError::Types(_))));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let config = NodeConfig {
            native_per_usd_denominator: 0,
            ..NodeConfig::default()
        };
        assert!(matches!(config.native_per_usd(), Err(NodeError::Config(_))));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/bela.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
