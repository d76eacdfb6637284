use alloy_primitives::{Address, B256, U256};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::chains::ChainSlug;
use crate::config::{RunConfig, DEFAULT_CAPACITOR_TYPE, DEFAULT_MAX_PACKET_LENGTH};
use crate::coordinator::{ConfigureRequest, SealRequest};
use crate::packet::parse_capacitor;
use crate::registry::roles;
use crate::rpc::RpcEndpoints;
use crate::strategy::IntegrationType;

/// Prefix of per-chain endpoint environment variables (`RPC_URL_80001=...`)
pub const RPC_ENV_PREFIX: &str = "RPC_URL_";

/// CLI arguments for the switchboard coordinator
#[derive(Parser, Debug)]
#[command(
    name = "switchboard-coordinator",
    about = "Configure cross-chain switchboards and seal outbound packets"
)]
pub struct Cli {
    /// Path of the deployment address registry (JSON).
    ///
    /// Read at startup; configuration runs write every completed chain back to it.
    #[arg(long, env = "ADDRESSES_FILE", default_value = "addresses.json", global = true)]
    pub addresses: PathBuf,

    /// RPC endpoint for a chain, as `<slug>=<url>`. Repeat for each chain.
    ///
    /// Chains without a flag fall back to the `RPC_URL_<slug>` environment variable.
    /// Example: `--rpc 5=https://goerli.example --rpc 80001=https://mumbai.example`
    #[arg(long = "rpc", value_name = "SLUG=URL", value_parser = parse_rpc_arg, global = true)]
    pub rpc: Vec<(ChainSlug, String)>,

    /// Signer private key (hex, with or without 0x prefix).
    /// Can also be set via SIGNER_KEY environment variable.
    #[arg(long, env = "SIGNER_KEY", hide_env_values = true, global = true)]
    pub signer_key: Option<String>,

    /// Enable structured JSON logging instead of human-readable output.
    ///
    /// When enabled, all log output is emitted as newline-delimited JSON.
    /// `RUST_LOG` controls the filter in both modes.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register siblings on every target chain's switchboards and wire the Socket
    /// managers. Safe to re-run.
    Configure(ConfigureArgs),

    /// Seal the packets recorded in a source transaction.
    Seal(SealArgs),

    /// Pack or unpack a packet id offline.
    #[command(subcommand)]
    PacketId(PacketIdCommand),
}

/// Confirmation wait bounds shared by `configure` and `seal`
#[derive(Args, Debug, Clone, Copy)]
pub struct ConfirmationArgs {
    /// Upper bound, in seconds, for one confirmation wait.
    ///
    /// Applies per transaction, not to the whole run.
    #[arg(long, default_value = "600")]
    pub confirmation_timeout_secs: u64,

    /// Delay between receipt polls in milliseconds.
    #[arg(long, default_value = "2000")]
    pub poll_interval_ms: u64,
}

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Comma-separated chain slugs to configure.
    #[arg(long, value_delimiter = ',', required = true)]
    pub chains: Vec<ChainSlug>,

    /// Comma-separated sibling chain slugs. Defaults to `--chains`.
    #[arg(long, value_delimiter = ',')]
    pub siblings: Vec<ChainSlug>,

    /// Integration types to configure (native, fast, optimistic). Repeatable.
    ///
    /// Defaults to all three; they always run in the order native, fast, optimistic.
    #[arg(long = "integration", value_delimiter = ',')]
    pub integrations: Vec<IntegrationType>,

    /// `capacitorType` passed to `registerSiblingSlug`.
    #[arg(long, default_value_t = DEFAULT_CAPACITOR_TYPE)]
    pub capacitor_type: u64,

    /// `maxPacketLength` passed to `registerSiblingSlug`.
    #[arg(long, default_value_t = DEFAULT_MAX_PACKET_LENGTH)]
    pub max_packet_length: u64,

    /// Registry role of the execution manager the Socket should point at.
    ///
    /// Use a versioned role such as `ExecutionManagerDF` to switch versions.
    #[arg(long, default_value = roles::EXECUTION_MANAGER)]
    pub execution_manager: String,

    /// Route transactions through the chain's Safe when the registry names one.
    #[arg(long)]
    pub use_safe: bool,

    /// Multisig relay service URL (requires --use-safe).
    #[arg(long, env = "RELAY_URL")]
    pub relay_url: Option<String>,

    /// API key sent to the relay service.
    #[arg(long, env = "RELAY_API_KEY", hide_env_values = true)]
    pub relay_api_key: Option<String>,

    #[command(flatten)]
    pub confirmation: ConfirmationArgs,

    /// Stop starting new steps after this many seconds.
    ///
    /// In-flight transactions still finish; unfinished chains report as incomplete.
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct SealArgs {
    /// Chain the packets were created on.
    #[arg(long)]
    pub chain: ChainSlug,

    /// Destination chain of the packets.
    #[arg(long)]
    pub remote: ChainSlug,

    /// Hash of the transaction that emitted the capacitor events.
    #[arg(long)]
    pub tx: B256,

    /// Integration type whose capacitor and notary are used.
    #[arg(long, default_value = "fast")]
    pub integration: IntegrationType,

    /// Notary address, overriding the registry.
    #[arg(long)]
    pub notary: Option<Address>,

    /// Capacitor address, overriding the registry.
    #[arg(long, value_parser = parse_capacitor)]
    pub capacitor: Option<Address>,

    /// Capacitor event signature, overriding `MessageAdded(uint256,bytes32)`.
    #[arg(long)]
    pub event_signature: Option<String>,

    #[command(flatten)]
    pub confirmation: ConfirmationArgs,
}

#[derive(Subcommand, Debug)]
pub enum PacketIdCommand {
    /// Pack chain slug, capacitor and counter into one id.
    Pack {
        #[arg(long)]
        chain: ChainSlug,
        #[arg(long, value_parser = parse_capacitor)]
        capacitor: Address,
        #[arg(long)]
        counter: u64,
    },

    /// Split a packed id (decimal or 0x hex) into its fields.
    Unpack {
        #[arg(value_parser = parse_packed_id)]
        id: U256,
    },
}

impl Cli {
    /// Endpoints for `slugs`: `--rpc` flags first, then `lookup("RPC_URL_<slug>")`.
    pub fn endpoints(
        &self,
        slugs: &[ChainSlug],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> RpcEndpoints {
        let mut endpoints = RpcEndpoints::new();
        for slug in slugs {
            if let Some(url) = lookup(&format!("{RPC_ENV_PREFIX}{slug}")) {
                endpoints.insert(*slug, url);
            }
        }
        for (slug, url) in &self.rpc {
            endpoints.insert(*slug, url.clone());
        }
        endpoints
    }
}

impl ConfigureArgs {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            capacitor_type: self.capacitor_type,
            max_packet_length: self.max_packet_length,
            use_safe: self.use_safe,
            execution_manager_role: self.execution_manager.clone(),
            ..RunConfig::default()
        }
        .with_integrations(&self.integrations)
        .with_confirmation(
            self.confirmation.confirmation_timeout_secs,
            self.confirmation.poll_interval_ms,
        )
    }

    pub fn request(&self) -> ConfigureRequest {
        ConfigureRequest {
            chains: self.chains.clone(),
            siblings: self.siblings.clone(),
        }
    }

    /// Every chain the run may open.
    pub fn all_slugs(&self) -> Vec<ChainSlug> {
        let mut slugs = self.chains.clone();
        for slug in &self.siblings {
            if !slugs.contains(slug) {
                slugs.push(*slug);
            }
        }
        slugs
    }
}

impl SealArgs {
    pub fn run_config(&self) -> RunConfig {
        RunConfig::default().with_confirmation(
            self.confirmation.confirmation_timeout_secs,
            self.confirmation.poll_interval_ms,
        )
    }

    pub fn request(&self) -> SealRequest {
        SealRequest {
            chain: self.chain,
            remote: self.remote,
            tx_hash: self.tx,
            integration: self.integration,
            notary: self.notary,
            capacitor: self.capacitor,
            event_signature: self.event_signature.clone(),
        }
    }
}

fn parse_rpc_arg(input: &str) -> Result<(ChainSlug, String), String> {
    let (slug, url) = input
        .split_once('=')
        .ok_or_else(|| format!("expected <slug>=<url>, got {input:?}"))?;
    let slug = slug.parse::<ChainSlug>().map_err(|e| e.to_string())?;
    let url = url.trim();
    if url.is_empty() {
        return Err(format!("empty URL for chain {slug}"));
    }
    Ok((slug, url.to_string()))
}

fn parse_packed_id(input: &str) -> Result<U256, String> {
    let input = input.trim();
    let parsed = match input.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(input, 10),
    };
    parsed.map_err(|e| format!("invalid packet id {input:?}: {e}"))
}
