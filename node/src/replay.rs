//! Scripted replay: drive a [`LedgerService`] from JSON lines.
//!
//! Each input line is one [`ScriptOp`], e.g.
//!
//! ```text
//! {"op":"register","account":"0x01…","ip":"10.0.0.1"}
//! {"op":"interact","account":"0x01…"}
//! {"op":"advance","secs":43200}
//! ```
//!
//! Time comes from a manual clock that only `advance` moves, and identity
//! attestations are signed by a replay-local attester key, so a script
//! replays identically every time. Ledger errors are part of the output;
//! only malformed lines abort the run.

use crate::config::NodeConfig;
use crate::service::LedgerService;
use crate::NodeError;
use bela_crypto::keypair_from_seed;
use bela_ledger::{Asset, ErrorClass, LedgerError, LedgerEvent, Token};
use bela_nullables::NullClock;
use bela_sybil::{sign_attestation, IdentityAttestation};
use bela_types::{AccountAddress, KeyPair, NativeAmount, NetworkIdentity};
use serde::{Deserialize, Serialize};
use serde_json::value::{to_raw_value, RawValue};
use serde_json::json;
use std::io::BufRead;
use std::sync::{Arc, Mutex, PoisonError};

/// One scripted operation.
///
/// Amounts are decimal strings, since JSON numbers cannot carry every `u128`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    Advance {
        secs: u64,
    },
    FundPool {
        token: Token,
        amount: String,
    },
    Register {
        account: AccountAddress,
        #[serde(default)]
        referrer: Option<AccountAddress>,
        /// Network address to attest and bind during registration.
        #[serde(default)]
        ip: Option<String>,
    },
    BindIdentity {
        account: AccountAddress,
        ip: String,
    },
    Interact {
        account: AccountAddress,
        /// Fee paid in raw native units; the current minimum when absent.
        #[serde(default)]
        fee: Option<String>,
    },
    ClaimLevel {
        account: AccountAddress,
        level: u8,
    },
    WithdrawUsdt {
        account: AccountAddress,
    },
    WithdrawLevelBgp {
        account: AccountAddress,
    },
    Pause {
        caller: AccountAddress,
    },
    Unpause {
        caller: AccountAddress,
    },
    SetAutoLevelCheck {
        caller: AccountAddress,
        enabled: bool,
    },
    EmergencyWithdraw {
        caller: AccountAddress,
        asset: Asset,
    },
    BlacklistAddress {
        caller: AccountAddress,
        account: AccountAddress,
    },
    RemoveFromBlacklist {
        caller: AccountAddress,
        account: AccountAddress,
    },
    BlacklistIdentity {
        caller: AccountAddress,
        ip: String,
    },
    PauseRegistry {
        caller: AccountAddress,
    },
    UnpauseRegistry {
        caller: AccountAddress,
    },
    SetIdentityCap {
        caller: AccountAddress,
        cap: u32,
    },
    Account {
        account: AccountAddress,
    },
    Status {
        account: AccountAddress,
    },
    Stats,
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::Advance { .. } => "advance",
            ScriptOp::FundPool { .. } => "fund_pool",
            ScriptOp::Register { .. } => "register",
            ScriptOp::BindIdentity { .. } => "bind_identity",
            ScriptOp::Interact { .. } => "interact",
            ScriptOp::ClaimLevel { .. } => "claim_level",
            ScriptOp::WithdrawUsdt { .. } => "withdraw_usdt",
            ScriptOp::WithdrawLevelBgp { .. } => "withdraw_level_bgp",
            ScriptOp::Pause { .. } => "pause",
            ScriptOp::Unpause { .. } => "unpause",
            ScriptOp::SetAutoLevelCheck { .. } => "set_auto_level_check",
            ScriptOp::EmergencyWithdraw { .. } => "emergency_withdraw",
            ScriptOp::BlacklistAddress { .. } => "blacklist_address",
            ScriptOp::RemoveFromBlacklist { .. } => "remove_from_blacklist",
            ScriptOp::BlacklistIdentity { .. } => "blacklist_identity",
            ScriptOp::PauseRegistry { .. } => "pause_registry",
            ScriptOp::UnpauseRegistry { .. } => "unpause_registry",
            ScriptOp::SetIdentityCap { .. } => "set_identity_cap",
            ScriptOp::Account { .. } => "account",
            ScriptOp::Status { .. } => "status",
            ScriptOp::Stats => "stats",
        }
    }
}

/// The result of one script line.
///
/// `result` is kept as encoded JSON so 128-bit amounts survive intact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepOutcome {
    pub line: usize,
    pub op: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    /// Events the operation emitted, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<LedgerEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepError {
    pub class: ErrorClass,
    pub message: String,
}

impl From<&LedgerError> for StepError {
    fn from(err: &LedgerError) -> Self {
        Self {
            class: err.class(),
            message: err.to_string(),
        }
    }
}

/// A ledger service on a manual clock with a local attester.
pub struct Replay {
    service: LedgerService,
    clock: Arc<NullClock>,
    attester: KeyPair,
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl Replay {
    /// Build a fresh ledger from `config`, starting the clock at `start_secs`.
    /// The configured attester key is replaced by one derived from `attester_seed`.
    pub fn new(config: &NodeConfig, start_secs: u64, attester_seed: [u8; 32]) -> Result<Self, NodeError> {
        let attester = keypair_from_seed(&attester_seed);
        let config = NodeConfig {
            attester_public_key: Some(attester.public.to_hex()),
            ..config.clone()
        };
        let clock = Arc::new(NullClock::new(start_secs));
        let mut service = LedgerService::from_config(&config, clock.clone())?;
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        service.subscribe(move |event| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        });
        Ok(Self {
            service,
            clock,
            attester,
            events,
        })
    }

    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    /// Run every line of `input`, in order. Blank lines and `#` comments
    /// are skipped.
    pub fn run(&self, input: impl BufRead) -> Result<Vec<StepOutcome>, NodeError> {
        let mut outcomes = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let op: ScriptOp = serde_json::from_str(trimmed).map_err(|e| NodeError::Script {
                line: line_no,
                reason: e.to_string(),
            })?;
            outcomes.push(self.step(line_no, op)?);
        }
        Ok(outcomes)
    }

    /// Apply one operation.
    pub fn step(&self, line: usize, op: ScriptOp) -> Result<StepOutcome, NodeError> {
        let name = op.name().to_string();
        let applied = self.apply(line, op)?;
        let events = std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner));
        let outcome = match applied {
            Ok(result) => StepOutcome {
                line,
                op: name,
                ok: true,
                result: Some(result),
                error: None,
                events,
            },
            Err(err) => {
                tracing::debug!(line, op = %name, error = %err, "scripted operation refused");
                StepOutcome {
                    line,
                    op: name,
                    ok: false,
                    result: None,
                    error: Some(StepError::from(&err)),
                    events,
                }
            }
        };
        Ok(outcome)
    }

    fn attest(&self, line: usize, account: &AccountAddress, ip: &str) -> Result<IdentityAttestation, NodeError> {
        let identity = parse_identity(line, ip)?;
        Ok(sign_attestation(
            account.clone(),
            identity,
            self.clock.now(),
            &self.attester.private,
        ))
    }

    fn apply(&self, line: usize, op: ScriptOp) -> Result<Result<Box<RawValue>, LedgerError>, NodeError> {
        let svc = &self.service;
        let result = match op {
            ScriptOp::Advance { secs } => {
                self.clock.advance(secs);
                Ok(to_json(json!({ "now": self.clock.now().as_secs() })))
            }
            ScriptOp::FundPool { token, amount } => {
                let amount = parse_amount(line, &amount)?;
                svc.tokens()
                    .fund_pool(token, amount)
                    .map_err(LedgerError::from)
                    .map(|()| to_json(json!({ "pool_balance": svc.token_balance(token, svc.tokens().pool()).to_string() })))
            }
            ScriptOp::Register { account, referrer, ip } => {
                let att = ip.map(|ip| self.attest(line, &account, &ip)).transpose()?;
                svc.register(&account, referrer.as_ref(), att.as_ref()).map(|()| null())
            }
            ScriptOp::BindIdentity { account, ip } => {
                let att = self.attest(line, &account, &ip)?;
                svc.bind_identity(&account, &att).map(to_json)
            }
            ScriptOp::Interact { account, fee } => {
                let fee = match fee {
                    Some(raw) => Ok(NativeAmount::new(parse_amount(line, &raw)?)),
                    None => svc.minimum_fee(),
                };
                fee.and_then(|fee| svc.interact(&account, fee)).map(to_json)
            }
            ScriptOp::ClaimLevel { account, level } => svc.claim_level_reward(&account, level).map(to_json),
            ScriptOp::WithdrawUsdt { account } => svc.withdraw_usdt(&account).map(to_json),
            ScriptOp::WithdrawLevelBgp { account } => svc.withdraw_level_bgp(&account).map(to_json),
            ScriptOp::Pause { caller } => svc.pause(&caller).map(|()| null()),
            ScriptOp::Unpause { caller } => svc.unpause(&caller).map(|()| null()),
            ScriptOp::SetAutoLevelCheck { caller, enabled } => {
                svc.set_auto_level_check(&caller, enabled).map(|()| null())
            }
            ScriptOp::EmergencyWithdraw { caller, asset } => svc
                .emergency_withdraw(&caller, asset)
                .map(|amount| to_json(json!({ "amount": amount.to_string() }))),
            ScriptOp::BlacklistAddress { caller, account } => {
                svc.blacklist_address(&caller, &account).map(|()| null())
            }
            ScriptOp::RemoveFromBlacklist { caller, account } => {
                svc.remove_from_blacklist(&caller, &account).map(|()| null())
            }
            ScriptOp::BlacklistIdentity { caller, ip } => {
                let identity = parse_identity(line, &ip)?;
                svc.blacklist_identity(&caller, identity).map(|()| null())
            }
            ScriptOp::PauseRegistry { caller } => svc.pause_registry(&caller).map(|()| null()),
            ScriptOp::UnpauseRegistry { caller } => svc.unpause_registry(&caller).map(|()| null()),
            ScriptOp::SetIdentityCap { caller, cap } => {
                svc.set_max_accounts_per_identity(&caller, cap).map(|()| null())
            }
            ScriptOp::Account { account } => Ok(svc.get_account(&account).map_or_else(null, to_json)),
            ScriptOp::Status { account } => Ok(to_json(svc.check_interaction_status(&account))),
            ScriptOp::Stats => Ok(to_json(svc.global_stats())),
        };
        Ok(result)
    }
}

fn to_json<T: Serialize>(value: T) -> Box<RawValue> {
    to_raw_value(&value).unwrap_or_else(|e| unserializable(&e))
}

fn null() -> Box<RawValue> {
    to_json(())
}

fn unserializable(err: &serde_json::Error) -> Box<RawValue> {
    let text = json!({ "unserializable": err.to_string() }).to_string();
    RawValue::from_string(text).unwrap_or_default()
}

fn parse_amount(line: usize, raw: &str) -> Result<u128, NodeError> {
    raw.parse().map_err(|e| NodeError::Script {
        line,
        reason: format!("bad amount {raw:?}: {e}"),
    })
}

fn parse_identity(line: usize, raw: &str) -> Result<NetworkIdentity, NodeError> {
    NetworkIdentity::parse(raw).map_err(|e| NodeError::Script {
        line,
        reason: e.to_string(),
    })
}
