use alloy_primitives::Address;
use tracing::{info, warn};

use super::{IntegrationType, SwitchboardConfig};
use crate::abi::{encode_address, encode_call, encode_u64, selectors, Token};
use crate::chains::ChainSlug;
use crate::config::RunConfig;
use crate::context::{ChainCallError, ChainContext};
use crate::registry::{roles, AddressRegistry, ChainAddresses, SkipReason, StepOutcome};

/// Register `sibling` on this chain's switchboard of type `kind`.
///
/// The local entry comes from the working snapshot; the sibling's switchboard comes
/// from the sibling's own record, mirrored under this chain. On success the
/// snapshot's entry holds the switchboard, capacitor and decapacitor the Socket
/// reports.
pub async fn register_sibling(
    ctx: &ChainContext,
    working: &mut ChainAddresses,
    registry: &AddressRegistry,
    sibling: ChainSlug,
    kind: IntegrationType,
    config: &RunConfig,
) -> StepOutcome {
    let chain = ctx.meta.slug;

    let Some(entry) = working.integration(sibling, kind) else {
        return StepOutcome::Skipped(SkipReason::NoLocalIntegration);
    };
    let local = entry
        .switchboard
        .or_else(|| kind.switchboard_role().and_then(|role| working.address(role)));
    let Some(switchboard) = local else {
        return StepOutcome::Skipped(SkipReason::NoLocalIntegration);
    };
    let Some(sibling_switchboard) = registry.sibling_switchboard(chain, sibling, kind) else {
        return StepOutcome::Skipped(SkipReason::SiblingNotReady);
    };
    let Some(socket) = working.address(roles::SOCKET) else {
        return StepOutcome::Failed(format!("missing {} address", roles::SOCKET));
    };

    let switchboard_config = SwitchboardConfig {
        chain,
        sibling,
        integration_type: kind,
        switchboard,
        sibling_switchboard,
        capacitor_type: config.capacitor_type,
        max_packet_length: config.max_packet_length,
    };

    match apply(ctx, socket, &switchboard_config).await {
        Ok((outcome, capacitor, decapacitor)) => {
            let entry = working.integration_mut(sibling, kind);
            entry.switchboard = Some(switchboard);
            entry.capacitor = Some(capacitor);
            entry.decapacitor = Some(decapacitor);
            outcome
        }
        Err(err) => {
            warn!(
                target: "strategy",
                %chain,
                %sibling,
                integration = %kind,
                %err,
                "Sibling registration failed"
            );
            StepOutcome::Failed(err.to_string())
        }
    }
}

async fn apply(
    ctx: &ChainContext,
    socket: Address,
    config: &SwitchboardConfig,
) -> Result<(StepOutcome, Address, Address), ChainCallError> {
    let (capacitor, decapacitor) = read_registration(ctx, socket, config).await?;
    if capacitor != Address::ZERO {
        return Ok((StepOutcome::AlreadyRegistered, capacitor, decapacitor));
    }

    let receipt = ctx.transact(config.switchboard, config.registration_call()).await?;
    info!(
        target: "strategy",
        chain = %config.chain,
        sibling = %config.sibling,
        integration = %config.integration_type,
        tx_hash = %receipt.transaction_hash,
        "Registered sibling"
    );

    let (capacitor, decapacitor) = read_registration(ctx, socket, config).await?;
    if capacitor == Address::ZERO {
        return Err(ChainCallError::BadReturnData {
            to: socket,
            data: "no capacitor after registration".to_string(),
        });
    }
    Ok((
        StepOutcome::Applied {
            tx: receipt.transaction_hash,
        },
        capacitor,
        decapacitor,
    ))
}

/// Capacitor and decapacitor the Socket holds for (switchboard, sibling).
async fn read_registration(
    ctx: &ChainContext,
    socket: Address,
    config: &SwitchboardConfig,
) -> Result<(Address, Address), ChainCallError> {
    let args = [
        Token::Word(encode_address(config.switchboard)),
        Token::Word(encode_u64(u64::from(config.sibling.get()))),
    ];
    let capacitor = ctx
        .read_address(socket, encode_call(selectors::capacitors(), &args))
        .await?;
    let decapacitor = ctx
        .read_address(socket, encode_call(selectors::decapacitors(), &args))
        .await?;
    Ok((capacitor, decapacitor))
}
