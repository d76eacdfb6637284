//! Run orchestration
//!
//! A configuration run spawns one task per target chain. Each task opens its chain,
//! picks a signer, and runs every step against its own copy of the chain's record.
//! Finished tasks are merged into the registry by the single [`Reconciler`] as they
//! complete, so one chain's failure never blocks or rolls back another's progress.
//! Cross-chain steps (native bridge wiring) run once after every task has finished.

pub mod cancel;

pub use cancel::{CancelFlag, CancelHandle};

use alloy_primitives::{Address, B256};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::capacitor::{CapacitorEventDecoder, DEFAULT_EVENT_SIGNATURE};
use crate::chains::{ChainError, ChainMeta, ChainRegistry, ChainSlug};
use crate::config::RunConfig;
use crate::context::ChainContext;
use crate::output;
use crate::registry::{
    AddressRegistry, ChainAddresses, ChainReport, Reconciler, RegistryStore, StepAction,
    StepOutcome, StepRecord,
};
use crate::rpc::{ProviderSource, RpcError};
use crate::seal::{notary_for, PacketReport, PacketSealer, SealError};
use crate::signer::{SignerError, SignerSource};
use crate::strategy::bridge::{routes_from, wire_native_bridge};
use crate::strategy::{ChainConfigurator, IntegrationType};

/// Errors that abort a whole run
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Chain {0} has no record in the address registry")]
    MissingChain(ChainSlug),

    /// An address the operation needs is neither in the registry nor given
    #[error("No {what} for chain {chain} (remote {remote}, {integration})")]
    MissingAddress {
        what: &'static str,
        chain: ChainSlug,
        remote: ChainSlug,
        integration: IntegrationType,
    },

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Seal(#[from] SealError),
}

/// Failure opening a chain for a run
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The endpoint serves a different network than the slug names
    #[error("Endpoint for chain {chain} reports chain id {actual}, expected {expected}")]
    ChainIdMismatch {
        chain: ChainSlug,
        expected: u64,
        actual: u64,
    },
}

/// Chains to configure and the siblings to link them with.
#[derive(Debug, Clone, Default)]
pub struct ConfigureRequest {
    pub chains: Vec<ChainSlug>,
    /// Defaults to `chains` when empty
    pub siblings: Vec<ChainSlug>,
}

/// One seal invocation.
#[derive(Debug, Clone)]
pub struct SealRequest {
    /// Chain the packet was created on
    pub chain: ChainSlug,
    /// Destination chain
    pub remote: ChainSlug,
    /// Transaction that emitted the capacitor event
    pub tx_hash: B256,
    pub integration: IntegrationType,
    pub notary: Option<Address>,
    pub capacitor: Option<Address>,
    pub event_signature: Option<String>,
}

/// Shared dependencies of every run.
pub struct Coordinator {
    chains: ChainRegistry,
    providers: Arc<dyn ProviderSource>,
    signers: Arc<dyn SignerSource>,
    config: Arc<RunConfig>,
    run_id: Uuid,
}

impl Coordinator {
    pub fn new(
        chains: ChainRegistry,
        providers: Arc<dyn ProviderSource>,
        signers: Arc<dyn SignerSource>,
        config: RunConfig,
    ) -> Self {
        Self {
            chains,
            providers,
            signers,
            config: Arc::new(config),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Configure every requested chain concurrently and merge each result as it
    /// arrives. Only unknown chain slugs abort the run; a registry write failure
    /// fails the chain being merged.
    pub async fn configure<S: RegistryStore>(
        &self,
        reconciler: &mut Reconciler<S>,
        request: &ConfigureRequest,
        cancel: CancelFlag,
    ) -> Result<(), CoordinatorError> {
        let targets = self.chains.resolve_all(&request.chains)?;
        let siblings = if request.siblings.is_empty() {
            request.chains.clone()
        } else {
            self.chains.resolve_all(&request.siblings)?;
            request.siblings.clone()
        };
        let siblings = Arc::new(siblings);
        let registry = Arc::new(reconciler.registry().clone());

        info!(
            target: "coordinator",
            run = %self.run_id,
            chains = targets.len(),
            "Starting configuration run"
        );

        let mut tasks = FuturesUnordered::new();
        for &meta in &targets {
            let Some(record) = registry.chain(meta.slug).cloned() else {
                warn!(
                    target: "coordinator",
                    chain = %meta.slug,
                    "Chain missing from address registry, skipping"
                );
                let report = ChainReport::missing(meta.slug);
                output::print_chain_report(&report);
                reconciler.merge(report);
                continue;
            };

            let task = ChainTask {
                meta,
                record,
                registry: registry.clone(),
                siblings: siblings.clone(),
                providers: self.providers.clone(),
                signers: self.signers.clone(),
                config: self.config.clone(),
                cancel: cancel.clone(),
            };
            let span = info_span!("chain", chain = %meta.slug, run = %self.run_id);
            let slug = meta.slug;
            let handle = tokio::spawn(task.run().instrument(span));
            tasks.push(async move { (slug, handle.await) });
        }

        while let Some((slug, joined)) = tasks.next().await {
            let report = match joined {
                Ok(report) => report,
                Err(err) => ChainReport::failed(slug, format!("chain task aborted: {err}")),
            };
            reconciler.merge(report);
            if let Some(merged) = reconciler.last_report() {
                output::print_chain_report(merged);
            }
        }

        if self.config.integrations.contains(&IntegrationType::Native) {
            let steps = self.wire_native_bridges(reconciler.registry(), &targets, &cancel).await;
            reconciler.merge_aggregate(steps, Vec::new());
        }

        Ok(())
    }

    async fn wire_native_bridges(
        &self,
        registry: &AddressRegistry,
        targets: &[&'static ChainMeta],
        cancel: &CancelFlag,
    ) -> Vec<StepRecord> {
        let mut steps = Vec::new();
        for &meta in targets {
            for route in routes_from(meta.slug) {
                if cancel.is_cancelled() {
                    return steps;
                }
                let Some(root) = registry.chain(route.root) else {
                    continue;
                };
                let opened = open_chain(
                    self.providers.as_ref(),
                    self.signers.as_ref(),
                    meta,
                    root,
                    &self.config,
                )
                .await;
                let step = match opened {
                    Ok(ctx) => wire_native_bridge(&ctx, registry, route).await,
                    Err(err) => StepRecord::new(
                        StepAction::WireNativeBridge {
                            root: route.root,
                            child: route.child,
                        },
                        StepOutcome::Failed(err.to_string()),
                    ),
                };
                output::print_step(route.root, &step);
                steps.push(step);
            }
        }
        steps
    }

    /// Seal every packet recorded in a source transaction.
    pub async fn seal(
        &self,
        registry: &AddressRegistry,
        request: &SealRequest,
    ) -> Result<Vec<PacketReport>, CoordinatorError> {
        let meta = self.chains.lookup(request.chain)?;
        self.chains.lookup(request.remote)?;
        let record = registry
            .chain(request.chain)
            .ok_or(CoordinatorError::MissingChain(request.chain))?;

        let missing = |what| CoordinatorError::MissingAddress {
            what,
            chain: request.chain,
            remote: request.remote,
            integration: request.integration,
        };
        let capacitor = request
            .capacitor
            .or_else(|| {
                record
                    .integration(request.remote, request.integration)
                    .and_then(|entry| entry.capacitor)
            })
            .ok_or_else(|| missing("capacitor"))?;
        let notary = request
            .notary
            .or_else(|| notary_for(record, request.remote, request.integration))
            .ok_or_else(|| missing("notary"))?;

        let decoder = CapacitorEventDecoder::new(
            request.event_signature.as_deref().unwrap_or(DEFAULT_EVENT_SIGNATURE),
            self.config.packet_layout,
        );
        let ctx = open_chain(
            self.providers.as_ref(),
            self.signers.as_ref(),
            meta,
            record,
            &self.config,
        )
        .await?;

        info!(
            target: "coordinator",
            run = %self.run_id,
            chain = %request.chain,
            remote = %request.remote,
            %capacitor,
            %notary,
            "Sealing packets"
        );
        let reports = PacketSealer::new(&ctx, notary)
            .seal_transaction(request.tx_hash, capacitor, &decoder, request.remote)
            .await?;
        Ok(reports)
    }
}

/// Connect to a chain, check it is the network the slug names, and pick its signer.
pub async fn open_chain(
    providers: &dyn ProviderSource,
    signers: &dyn SignerSource,
    meta: &'static ChainMeta,
    record: &ChainAddresses,
    config: &RunConfig,
) -> Result<ChainContext, SetupError> {
    let rpc = providers.provider(meta.slug)?;
    let actual = rpc.chain_id().await?;
    if actual != meta.chain_id {
        return Err(SetupError::ChainIdMismatch {
            chain: meta.slug,
            expected: meta.chain_id,
            actual,
        });
    }
    let signer = signers.signer_for(meta, record, rpc.clone())?;
    Ok(ChainContext::new(meta, rpc, signer, config.confirmation))
}

/// Everything one chain task owns.
struct ChainTask {
    meta: &'static ChainMeta,
    record: ChainAddresses,
    registry: Arc<AddressRegistry>,
    siblings: Arc<Vec<ChainSlug>>,
    providers: Arc<dyn ProviderSource>,
    signers: Arc<dyn SignerSource>,
    config: Arc<RunConfig>,
    cancel: CancelFlag,
}

impl ChainTask {
    async fn run(self) -> ChainReport {
        let slug = self.meta.slug;
        if self.cancel.is_cancelled() {
            return ChainReport::incomplete(slug);
        }

        let ctx = match open_chain(
            self.providers.as_ref(),
            self.signers.as_ref(),
            self.meta,
            &self.record,
            &self.config,
        )
        .await
        {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(target: "coordinator", chain = %slug, %err, "Could not open chain");
                return ChainReport::failed(slug, err);
            }
        };
        output::print_chain_started(self.meta, ctx.signer.address(), ctx.signer.mode());

        let mut working = self.record.clone();
        let progress = ChainConfigurator::new(&ctx, &self.registry, &self.config, &self.cancel)
            .run(&mut working, &self.siblings)
            .await;
        ChainReport::from_steps(slug, progress.steps, working, progress.cancelled)
    }
}
