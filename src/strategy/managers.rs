use alloy_primitives::Address;
use tracing::{info, warn};

use crate::abi::{encode_address, encode_call, selectors, Token};
use crate::config::RunConfig;
use crate::context::{ChainCallError, ChainContext};
use crate::coordinator::CancelFlag;
use crate::registry::{roles, ChainAddresses, SkipReason, StepAction, StepOutcome, StepRecord};

/// A Socket slot holding a manager contract.
struct ManagerSlot {
    role: String,
    getter: [u8; 4],
    setter: [u8; 4],
}

fn slots(config: &RunConfig) -> [ManagerSlot; 2] {
    [
        ManagerSlot {
            role: config.execution_manager_role.clone(),
            getter: selectors::execution_manager(),
            setter: selectors::set_execution_manager(),
        },
        ManagerSlot {
            role: roles::TRANSMIT_MANAGER.to_string(),
            getter: selectors::transmit_manager(),
            setter: selectors::set_transmit_manager(),
        },
    ]
}

/// Point the Socket's execution and transmit manager slots at the registry's
/// contracts. Returns `false` when cancelled before finishing.
pub async fn wire_managers(
    ctx: &ChainContext,
    working: &ChainAddresses,
    config: &RunConfig,
    cancel: &CancelFlag,
    steps: &mut Vec<StepRecord>,
) -> bool {
    for slot in slots(config) {
        if cancel.is_cancelled() {
            return false;
        }
        let outcome = wire_slot(ctx, working, &slot).await;
        info!(
            target: "strategy",
            chain = %ctx.meta.slug,
            role = %slot.role,
            %outcome,
            "Manager step"
        );
        steps.push(StepRecord::new(StepAction::SetManager { role: slot.role }, outcome));
    }
    true
}

async fn wire_slot(
    ctx: &ChainContext,
    working: &ChainAddresses,
    slot: &ManagerSlot,
) -> StepOutcome {
    let Some(expected) = working.address(&slot.role) else {
        return StepOutcome::Skipped(SkipReason::MissingRole(slot.role.clone()));
    };
    let Some(socket) = working.address(roles::SOCKET) else {
        return StepOutcome::Skipped(SkipReason::MissingRole(roles::SOCKET.to_string()));
    };
    match set_if_different(ctx, socket, expected, slot).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(
                target: "strategy",
                chain = %ctx.meta.slug,
                role = %slot.role,
                %err,
                "Manager update failed"
            );
            StepOutcome::Failed(err.to_string())
        }
    }
}

async fn set_if_different(
    ctx: &ChainContext,
    socket: Address,
    expected: Address,
    slot: &ManagerSlot,
) -> Result<StepOutcome, ChainCallError> {
    let current = ctx.read_address(socket, encode_call(slot.getter, &[])).await?;
    if current == expected {
        return Ok(StepOutcome::AlreadyRegistered);
    }
    let receipt = ctx
        .transact(socket, encode_call(slot.setter, &[Token::Word(encode_address(expected))]))
        .await?;
    Ok(StepOutcome::Applied {
        tx: receipt.transaction_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ChainSlug;
    use crate::strategy::IntegrationType;
    use crate::testing::{context, linked_registry, Manager, MockChain};

    const GOERLI: ChainSlug = ChainSlug(5);

    fn setup() -> (MockChain, ChainAddresses) {
        let registry = linked_registry(&[(GOERLI, ChainSlug(80001))], &[IntegrationType::Fast]);
        let chain = MockChain::new();
        chain.install_registry(GOERLI, &registry);
        (chain, registry.chain(GOERLI).cloned().unwrap())
    }

    #[tokio::test]
    async fn test_sets_managers_once() {
        let (chain, working) = setup();
        let ctx = context(GOERLI, &chain);
        let config = RunConfig::default();
        let socket = working.address(roles::SOCKET).unwrap();

        let mut steps = Vec::new();
        assert!(wire_managers(&ctx, &working, &config, &CancelFlag::never(), &mut steps).await);
        assert!(steps.iter().all(|s| matches!(s.outcome, StepOutcome::Applied { .. })));
        assert_eq!(
            chain.manager(socket, Manager::Execution),
            working.address(roles::EXECUTION_MANAGER)
        );
        assert_eq!(
            chain.manager(socket, Manager::Transmit),
            working.address(roles::TRANSMIT_MANAGER)
        );

        let mut again = Vec::new();
        wire_managers(&ctx, &working, &config, &CancelFlag::never(), &mut again).await;
        assert!(again.iter().all(|s| s.outcome == StepOutcome::AlreadyRegistered));
        assert_eq!(chain.sent_transactions().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_role_is_skipped() {
        let (chain, mut working) = setup();
        working.contracts.remove(roles::TRANSMIT_MANAGER);
        let ctx = context(GOERLI, &chain);

        let mut steps = Vec::new();
        let config = RunConfig::default();
        wire_managers(&ctx, &working, &config, &CancelFlag::never(), &mut steps).await;
        assert_eq!(
            steps[1].outcome,
            StepOutcome::Skipped(SkipReason::MissingRole(roles::TRANSMIT_MANAGER.to_string()))
        );
        assert_eq!(chain.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_execution_manager_role_is_configurable() {
        let (chain, mut working) = setup();
        let df = Address::repeat_byte(0xdf);
        working.set_address("ExecutionManagerDF", df);
        let config = RunConfig {
            execution_manager_role: "ExecutionManagerDF".to_string(),
            ..RunConfig::default()
        };
        let ctx = context(GOERLI, &chain);

        let mut steps = Vec::new();
        wire_managers(&ctx, &working, &config, &CancelFlag::never(), &mut steps).await;
        let socket = working.address(roles::SOCKET).unwrap();
        assert_eq!(chain.manager(socket, Manager::Execution), Some(df));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (chain, working) = setup();
        let ctx = context(GOERLI, &chain);
        let (handle, cancel) = CancelFlag::new();
        handle.cancel();

        let mut steps = Vec::new();
        assert!(!wire_managers(&ctx, &working, &RunConfig::default(), &cancel, &mut steps).await);
        assert!(steps.is_empty());
    }
}
