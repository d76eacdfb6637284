//! Verification strategies
//!
//! A chain verifies packets from a sibling through one of three switchboard kinds.
//! Configuring a chain means registering each requested sibling on the local
//! switchboard of each requested kind, so the Socket deploys a capacitor/decapacitor
//! pair for the link. Before that, the Socket's manager slots are pointed at the
//! registry's contracts.
//!
//! Every step reads on-chain state first and only sends a transaction when the state
//! differs, so re-running a configuration is a no-op.

pub mod bridge;
pub mod errors;
pub mod managers;
pub mod switchboard;

pub use errors::ChainConfigurationError;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::abi::{encode_address, encode_call, encode_u256, encode_u64, selectors, Token};
use crate::chains::ChainSlug;
use crate::config::RunConfig;
use crate::context::ChainContext;
use crate::coordinator::CancelFlag;
use crate::registry::{roles, AddressRegistry, ChainAddresses, StepAction, StepRecord};

/// Switchboard kind verifying a chain pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntegrationType {
    /// Canonical bridge of the pair (Polygon fx tunnels, Arbitrum/Optimism messengers)
    #[serde(rename = "NATIVE_BRIDGE")]
    Native,
    /// Watcher attestations with a short timeout
    #[serde(rename = "FAST")]
    Fast,
    /// Accepted after a challenge window
    #[serde(rename = "OPTIMISTIC")]
    Optimistic,
}

impl IntegrationType {
    /// Run order: native first, then fast, then optimistic.
    pub const ALL: [IntegrationType; 3] = [
        IntegrationType::Native,
        IntegrationType::Fast,
        IntegrationType::Optimistic,
    ];

    /// Registry key of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            IntegrationType::Native => "NATIVE_BRIDGE",
            IntegrationType::Fast => "FAST",
            IntegrationType::Optimistic => "OPTIMISTIC",
        }
    }

    /// Chain-level role holding the shared switchboard of this kind, if any.
    /// Native switchboards are deployed per sibling and have none.
    pub const fn switchboard_role(self) -> Option<&'static str> {
        match self {
            IntegrationType::Native => None,
            IntegrationType::Fast => Some(roles::FAST_SWITCHBOARD),
            IntegrationType::Optimistic => Some(roles::OPTIMISTIC_SWITCHBOARD),
        }
    }
}

impl fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegrationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "native_bridge" => Ok(IntegrationType::Native),
            "fast" => Ok(IntegrationType::Fast),
            "optimistic" => Ok(IntegrationType::Optimistic),
            other => Err(format!(
                "unknown integration type {other:?} (expected native, fast or optimistic)"
            )),
        }
    }
}

/// Parameters of one sibling registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchboardConfig {
    pub chain: ChainSlug,
    pub sibling: ChainSlug,
    pub integration_type: IntegrationType,
    /// Local switchboard the sibling is registered on
    pub switchboard: Address,
    /// The sibling's switchboard for the reverse direction
    pub sibling_switchboard: Address,
    pub capacitor_type: u64,
    pub max_packet_length: u64,
}

impl SwitchboardConfig {
    /// `registerSiblingSlug(uint32 siblingChainSlug, uint256 maxPacketLength,
    /// uint256 capacitorType, address siblingSwitchboard)`
    pub fn registration_call(&self) -> Bytes {
        encode_call(
            selectors::register_sibling_slug(),
            &[
                Token::Word(encode_u64(u64::from(self.sibling.get()))),
                Token::Word(encode_u256(U256::from(self.max_packet_length))),
                Token::Word(encode_u256(U256::from(self.capacitor_type))),
                Token::Word(encode_address(self.sibling_switchboard)),
            ],
        )
    }
}

/// Steps run on one chain, and whether the run was cut short.
#[derive(Debug, Default)]
pub struct ChainProgress {
    pub steps: Vec<StepRecord>,
    pub cancelled: bool,
}

/// Drives every configuration step of one chain, in order, against a working copy
/// of that chain's record.
pub struct ChainConfigurator<'a> {
    ctx: &'a ChainContext,
    registry: &'a AddressRegistry,
    config: &'a RunConfig,
    cancel: &'a CancelFlag,
}

impl<'a> ChainConfigurator<'a> {
    pub fn new(
        ctx: &'a ChainContext,
        registry: &'a AddressRegistry,
        config: &'a RunConfig,
        cancel: &'a CancelFlag,
    ) -> Self {
        Self {
            ctx,
            registry,
            config,
            cancel,
        }
    }

    /// Manager wiring, then every requested integration type for every sibling.
    pub async fn run(&self, working: &mut ChainAddresses, siblings: &[ChainSlug]) -> ChainProgress {
        let mut progress = ChainProgress::default();

        let wired = managers::wire_managers(
            self.ctx,
            working,
            self.config,
            self.cancel,
            &mut progress.steps,
        )
        .await;
        if !wired {
            progress.cancelled = true;
            return progress;
        }

        for kind in &self.config.integrations {
            for sibling in siblings.iter().filter(|s| **s != self.ctx.meta.slug) {
                if self.cancel.is_cancelled() {
                    warn!(
                        target: "strategy",
                        chain = %self.ctx.meta.slug,
                        "Cancelled before all siblings were configured"
                    );
                    progress.cancelled = true;
                    return progress;
                }
                let outcome = switchboard::register_sibling(
                    self.ctx,
                    working,
                    self.registry,
                    *sibling,
                    *kind,
                    self.config,
                )
                .await;
                info!(
                    target: "strategy",
                    chain = %self.ctx.meta.slug,
                    %sibling,
                    integration = %kind,
                    %outcome,
                    "Sibling step"
                );
                progress.steps.push(StepRecord::new(
                    StepAction::RegisterSibling {
                        sibling: *sibling,
                        integration: *kind,
                    },
                    outcome,
                ));
            }
        }

        progress
    }
}
