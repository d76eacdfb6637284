use tracing::{info, warn};

use super::{
    AddressRegistry, ChainAddresses, ChainReport, ChainStatus, RegistryError, RegistryStore,
    RunReport, StepRecord,
};
use crate::chains::ChainSlug;
use crate::strategy::ChainConfigurationError;

/// Single writer for the address registry.
///
/// Chain tasks never touch the registry; they hand back a [`ChainReport`] carrying
/// their working snapshot. A completed chain's snapshot replaces that chain's whole
/// record and the document is flushed before the next report is merged. Any other
/// status keeps the prior record.
///
/// Every report is recorded. If flushing a chain's record fails, the in-memory
/// registry goes back to what the store holds and the chain is reported as failed.
pub struct Reconciler<S> {
    store: S,
    registry: AddressRegistry,
    report: RunReport,
}

impl<S: RegistryStore> Reconciler<S> {
    /// Load the initial registry from `store`.
    pub fn load(store: S) -> Result<Self, RegistryError> {
        let registry = store.load()?;
        Ok(Self {
            store,
            registry,
            report: RunReport::default(),
        })
    }

    /// Current merged registry.
    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Merge one chain's outcome. Returns whether the stored document changed.
    pub fn merge(&mut self, mut report: ChainReport) -> bool {
        let chain = report.chain;
        let changed = match report.snapshot.take() {
            Some(snapshot) if report.status.is_success() => match self.commit(chain, snapshot) {
                Ok(changed) => changed,
                Err(err) => {
                    warn!(
                        target: "registry",
                        %chain,
                        %err,
                        "Registry write failed, keeping prior record"
                    );
                    report.status = ChainStatus::Failed(ChainConfigurationError {
                        chain,
                        failures: vec![format!("registry write failed: {err}")],
                    });
                    false
                }
            },
            Some(_) => {
                warn!(
                    target: "registry",
                    %chain,
                    status = %report.status,
                    "Keeping prior record"
                );
                false
            }
            None => false,
        };
        self.report.chains.push(report);
        changed
    }

    /// Merge cross-chain results once every chain task has finished.
    ///
    /// A failed flush restores the prior records and is recorded in the run report.
    pub fn merge_aggregate(
        &mut self,
        steps: Vec<StepRecord>,
        updates: Vec<(ChainSlug, ChainAddresses)>,
    ) -> bool {
        self.report.aggregate.extend(steps);
        let prior = self.registry.clone();
        let mut changed = false;
        for (chain, record) in updates {
            if self.registry.chain(chain) != Some(&record) {
                self.registry.replace(chain, record);
                changed = true;
            }
        }
        if !changed {
            return false;
        }
        if let Err(err) = self.store.persist(&self.registry) {
            warn!(target: "registry", %err, "Registry write failed, keeping prior records");
            self.registry = prior;
            self.report.write_failures.push(err.to_string());
            return false;
        }
        true
    }

    /// Most recently merged chain report, with its final status.
    pub fn last_report(&self) -> Option<&ChainReport> {
        self.report.chains.last()
    }

    /// Finish the run.
    pub fn finish(self) -> RunReport {
        self.report
    }

    fn commit(
        &mut self,
        chain: ChainSlug,
        snapshot: ChainAddresses,
    ) -> Result<bool, RegistryError> {
        if self.registry.chain(chain) == Some(&snapshot) {
            return Ok(false);
        }
        let prior = self.registry.replace(chain, snapshot);
        if let Err(err) = self.store.persist(&self.registry) {
            match prior {
                Some(record) => {
                    self.registry.replace(chain, record);
                }
                None => {
                    self.registry.remove(chain);
                }
            }
            return Err(err);
        }
        info!(target: "registry", %chain, "Merged chain addresses");
        Ok(true)
    }
}
