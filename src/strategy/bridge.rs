//! Canonical bridge constants and the Polygon fx-tunnel wiring step.

use alloy_primitives::{address, Address};
use tracing::{info, warn};

use crate::abi::{encode_address, encode_call, selectors, Token};
use crate::chains::table::{
    ARBITRUM, ARBITRUM_GOERLI, GOERLI, MAINNET, POLYGON_MAINNET, POLYGON_MUMBAI,
};
use crate::chains::ChainSlug;
use crate::context::{ChainCallError, ChainContext};
use crate::registry::{AddressRegistry, SkipReason, StepAction, StepOutcome, StepRecord};
use crate::strategy::IntegrationType;

/// An Ethereum ↔ Polygon fx-portal route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonRoute {
    /// Ethereum-side chain
    pub root: ChainSlug,
    /// Polygon-side chain
    pub child: ChainSlug,
    pub fx_root: Address,
    pub fx_child: Address,
    pub checkpoint_manager: Address,
}

pub const POLYGON_ROUTES: [PolygonRoute; 2] = [
    PolygonRoute {
        root: MAINNET,
        child: POLYGON_MAINNET,
        fx_root: address!("fe5e5D361b2ad62c541bAb87C45a0B9B018389a2"),
        fx_child: address!("8397259c983751DAf40400790063935a11afa28a"),
        checkpoint_manager: address!("86e4dc95c7fbdbf52e33d563bbdb00823894c287"),
    },
    PolygonRoute {
        root: GOERLI,
        child: POLYGON_MUMBAI,
        fx_root: address!("3d1d3E34f7fB6D26245E6640E1c50710eFFf15bA"),
        fx_child: address!("Cf73231F28B7331BBe3124B907840A94851f9f11"),
        checkpoint_manager: address!("2890bA17EfE978480615e330ecB65333b880928e"),
    },
];

/// Arbitrum delayed inbox on the L1 side. The L2 side has none.
pub fn arbitrum_inbox(slug: ChainSlug) -> Option<Address> {
    match slug {
        MAINNET => Some(address!("4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f")),
        GOERLI => Some(address!("6BEbC4925716945D46F0Ec336D5C2564F419682C")),
        ARBITRUM | ARBITRUM_GOERLI => Some(Address::ZERO),
        _ => None,
    }
}

/// Routes whose root chain is `slug`.
pub fn routes_from(slug: ChainSlug) -> impl Iterator<Item = &'static PolygonRoute> {
    POLYGON_ROUTES.iter().filter(move |route| route.root == slug)
}

/// Make the root-chain native switchboard tunnel to the child-chain switchboard.
///
/// The tunnel can only be set once; a tunnel already pointing elsewhere is reported
/// as a failure rather than overwritten.
pub async fn wire_native_bridge(
    root: &ChainContext,
    registry: &AddressRegistry,
    route: &PolygonRoute,
) -> StepRecord {
    let action = StepAction::WireNativeBridge {
        root: route.root,
        child: route.child,
    };

    let Some(root_switchboard) = registry
        .chain(route.root)
        .and_then(|r| r.switchboard(route.child, IntegrationType::Native))
    else {
        return StepRecord::new(action, StepOutcome::Skipped(SkipReason::NoLocalIntegration));
    };
    let child_switchboard =
        registry.sibling_switchboard(route.root, route.child, IntegrationType::Native);
    let Some(child_switchboard) = child_switchboard else {
        return StepRecord::new(action, StepOutcome::Skipped(SkipReason::SiblingNotReady));
    };

    let outcome = match set_child_tunnel(root, root_switchboard, child_switchboard).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(
                target: "strategy",
                root = %route.root,
                child = %route.child,
                %err,
                "Native bridge wiring failed"
            );
            StepOutcome::Failed(err.to_string())
        }
    };
    info!(
        target: "strategy",
        root = %route.root,
        child = %route.child,
        %outcome,
        "Native bridge step"
    );
    StepRecord::new(action, outcome)
}

async fn set_child_tunnel(
    root: &ChainContext,
    root_switchboard: Address,
    child_switchboard: Address,
) -> Result<StepOutcome, ChainCallError> {
    let current = root
        .read_address(root_switchboard, encode_call(selectors::fx_child_tunnel(), &[]))
        .await?;
    if current == child_switchboard {
        return Ok(StepOutcome::AlreadyRegistered);
    }
    if current != Address::ZERO {
        return Ok(StepOutcome::Failed(format!(
            "child tunnel already set to {current}, expected {child_switchboard}"
        )));
    }
    let receipt = root
        .transact(
            root_switchboard,
            encode_call(
                selectors::set_fx_child_tunnel(),
                &[Token::Word(encode_address(child_switchboard))],
            ),
        )
        .await?;
    Ok(StepOutcome::Applied {
        tx: receipt.transaction_hash,
    })
}
