//! BelaChain daemon: command-line entry point for the reward ledger.

use anyhow::Context;
use bela_crypto::{generate_keypair, keypair_from_private, keypair_from_seed};
use bela_ledger::LedgerSnapshot;
use bela_node::{init_logging, LogFormat, NodeConfig, Replay};
use bela_sybil::sign_attestation;
use bela_types::{AccountAddress, NetworkIdentity, PrivateKey, Timestamp};
use clap::Parser;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bela-daemon", about = "BelaChain reward ledger daemon")]
struct Cli {
    /// Path to a TOML configuration file. Missing keys take their defaults.
    #[arg(long, env = "BELA_CONFIG")]
    config: Option<PathBuf>,

    /// Log format: "human" or "json". Overrides the config file.
    #[arg(long, env = "BELA_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level filter. Overrides the config file; `RUST_LOG` overrides both.
    #[arg(long, env = "BELA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    Config,

    /// Print the effective ledger parameters as JSON.
    Params,

    /// Generate an attester key pair.
    Keygen {
        /// Derive the key from a 32-byte hex seed instead of the OS RNG.
        #[arg(long)]
        seed: Option<String>,
    },

    /// Sign an identity attestation for an account.
    Attest {
        /// Attester private key, hex.
        #[arg(long, env = "BELA_ATTESTER_KEY", hide_env_values = true)]
        private_key: String,

        /// Account the identity is bound to.
        #[arg(long)]
        account: String,

        /// Observed network address of the account's session.
        #[arg(long)]
        ip: String,

        /// Issue time in Unix seconds; now when omitted.
        #[arg(long)]
        issued_at: Option<u64>,
    },

    /// Run a JSON-lines operation script against a fresh in-memory ledger.
    Replay {
        /// Script path, or "-" for stdin.
        #[arg(long, default_value = "-")]
        script: String,

        /// Clock start in Unix seconds; now when omitted.
        #[arg(long)]
        start: Option<u64>,

        /// 32-byte hex seed for the replay attester key.
        #[arg(long)]
        attester_seed: Option<String>,

        /// Write a snapshot to the configured path once the script finishes.
        #[arg(long)]
        save_snapshot: bool,
    },

    /// Verify a snapshot file and print its summary.
    InspectSnapshot {
        /// Snapshot path; the configured path when omitted.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Config => {
            write!(out, "{}", config.to_toml_string()?)?;
        }
        Command::Params => {
            serde_json::to_writer_pretty(&mut out, &config.ledger_params())?;
            writeln!(out)?;
        }
        Command::Keygen { seed } => {
            let keypair = match seed {
                Some(seed) => keypair_from_seed(&parse_seed(&seed)?),
                None => generate_keypair(),
            };
            let keys = serde_json::json!({
                "public_key": keypair.public.to_hex(),
                "private_key": hex::encode(keypair.private.0),
            });
            serde_json::to_writer_pretty(&mut out, &keys)?;
            writeln!(out)?;
        }
        Command::Attest {
            private_key,
            account,
            ip,
            issued_at,
        } => {
            let keypair = keypair_from_private(PrivateKey::from_hex(&private_key)?);
            let account = AccountAddress::parse(&account)?;
            let identity = NetworkIdentity::parse(&ip)?;
            let issued_at = issued_at.map_or_else(Timestamp::now, Timestamp::new);
            let attestation = sign_attestation(account, identity, issued_at, &keypair.private);
            tracing::info!(
                account = %attestation.subject,
                identity = %attestation.identity,
                attester = %keypair.public.to_hex(),
                "attestation signed"
            );
            serde_json::to_writer_pretty(&mut out, &attestation)?;
            writeln!(out)?;
        }
        Command::Replay {
            script,
            start,
            attester_seed,
            save_snapshot,
        } => {
            let seed = match attester_seed {
                Some(seed) => parse_seed(&seed)?,
                None => [0u8; 32],
            };
            let start = start.unwrap_or_else(|| Timestamp::now().as_secs());
            let replay = Replay::new(&config, start, seed)?;

            let input: Box<dyn BufRead> = if script == "-" {
                Box::new(BufReader::new(std::io::stdin()))
            } else {
                let file = std::fs::File::open(&script)
                    .with_context(|| format!("opening script {script}"))?;
                Box::new(BufReader::new(file))
            };
            let outcomes = replay.run(input)?;
            let failed = outcomes.iter().filter(|o| !o.ok).count();
            for outcome in &outcomes {
                serde_json::to_writer(&mut out, outcome)?;
                writeln!(out)?;
            }
            tracing::info!(steps = outcomes.len(), failed, "replay finished");

            if save_snapshot {
                replay.service().save_snapshot()?;
            }
        }
        Command::InspectSnapshot { path } => {
            let path = path.unwrap_or_else(|| config.snapshot_path.clone());
            let bytes = std::fs::read(&path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
            snapshot.verify()?;
            let global = &snapshot.state.global;
            let summary = serde_json::json!({
                "version": snapshot.version,
                "created_at": snapshot.created_at.as_secs(),
                "hash": snapshot.hash_hex(),
                "accounts": snapshot.account_count(),
                "total_participants": global.total_participants,
                "total_interactions": global.total_interactions,
                "total_registered": global.total_registered,
                "paused": global.paused,
                "registry": snapshot.state.registry.stats(),
            });
            serde_json::to_writer_pretty(&mut out, &summary)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn parse_seed(raw: &str) -> anyhow::Result<[u8; 32]> {
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).context("seed is not hex")?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| anyhow::anyhow!("seed must be 32 bytes, got {}", v.len()))
}
