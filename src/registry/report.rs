//! Run reporting

use alloy_primitives::B256;
use std::fmt;

use super::ChainAddresses;
use crate::chains::ChainSlug;
use crate::strategy::{ChainConfigurationError, IntegrationType};

/// A unit of configuration work on one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Point a Socket manager slot at the registry's contract
    SetManager { role: String },
    /// Register a sibling chain on a local switchboard
    RegisterSibling {
        sibling: ChainSlug,
        integration: IntegrationType,
    },
    /// Set the child tunnel of a root-chain native switchboard
    WireNativeBridge { root: ChainSlug, child: ChainSlug },
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepAction::SetManager { role } => write!(f, "set {role}"),
            StepAction::RegisterSibling {
                sibling,
                integration,
            } => write!(f, "register {integration} sibling {sibling}"),
            StepAction::WireNativeBridge { root, child } => {
                write!(f, "wire native bridge {root} -> {child}")
            }
        }
    }
}

/// Why a step did not run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// This chain has no integration entry of the requested type for the sibling
    NoLocalIntegration,
    /// The sibling has not deployed its side of the integration yet
    SiblingNotReady,
    /// A contract role the step needs is absent from the chain's record
    MissingRole(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoLocalIntegration => write!(f, "no local integration"),
            SkipReason::SiblingNotReady => write!(f, "sibling not ready"),
            SkipReason::MissingRole(role) => write!(f, "missing {role} address"),
        }
    }
}

/// Result of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A transaction was sent and confirmed
    Applied { tx: B256 },
    /// On-chain state already matched; no transaction was sent
    AlreadyRegistered,
    Skipped(SkipReason),
    Failed(String),
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Applied { tx } => write!(f, "applied in {tx}"),
            StepOutcome::AlreadyRegistered => write!(f, "already registered"),
            StepOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            StepOutcome::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub action: StepAction,
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn new(action: StepAction, outcome: StepOutcome) -> Self {
        Self { action, outcome }
    }
}

/// Terminal state of one chain in a run
#[derive(Debug)]
pub enum ChainStatus {
    /// Every step applied, already registered, or skipped
    Completed,
    /// At least one step failed
    Failed(ChainConfigurationError),
    /// Cancelled before all steps ran
    Incomplete,
    /// Chain has no record in the address registry
    Missing,
}

impl ChainStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ChainStatus::Completed)
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStatus::Completed => write!(f, "completed"),
            ChainStatus::Failed(err) => write!(f, "{err}"),
            ChainStatus::Incomplete => write!(f, "incomplete"),
            ChainStatus::Missing => write!(f, "skipped: not in address registry"),
        }
    }
}

/// Outcome of one chain task.
#[derive(Debug)]
pub struct ChainReport {
    pub chain: ChainSlug,
    pub status: ChainStatus,
    pub steps: Vec<StepRecord>,
    /// Working snapshot after the task ran; merged only for completed chains
    pub snapshot: Option<ChainAddresses>,
}

impl ChainReport {
    /// Build a report, deriving the status from the steps.
    pub fn from_steps(
        chain: ChainSlug,
        steps: Vec<StepRecord>,
        snapshot: ChainAddresses,
        cancelled: bool,
    ) -> Self {
        let failures: Vec<String> = steps
            .iter()
            .filter_map(|step| match &step.outcome {
                StepOutcome::Failed(error) => Some(format!("{}: {error}", step.action)),
                _ => None,
            })
            .collect();

        let status = if !failures.is_empty() {
            ChainStatus::Failed(ChainConfigurationError { chain, failures })
        } else if cancelled {
            ChainStatus::Incomplete
        } else {
            ChainStatus::Completed
        };

        Self {
            chain,
            status,
            steps,
            snapshot: Some(snapshot),
        }
    }

    /// A chain that failed before any step ran.
    pub fn failed(chain: ChainSlug, error: impl fmt::Display) -> Self {
        Self {
            chain,
            status: ChainStatus::Failed(ChainConfigurationError {
                chain,
                failures: vec![error.to_string()],
            }),
            steps: Vec::new(),
            snapshot: None,
        }
    }

    pub fn missing(chain: ChainSlug) -> Self {
        Self {
            chain,
            status: ChainStatus::Missing,
            steps: Vec::new(),
            snapshot: None,
        }
    }

    pub fn incomplete(chain: ChainSlug) -> Self {
        Self {
            chain,
            status: ChainStatus::Incomplete,
            steps: Vec::new(),
            snapshot: None,
        }
    }
}

/// Aggregated result of a configuration run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub chains: Vec<ChainReport>,
    /// Cross-chain steps run after every chain task finished
    pub aggregate: Vec<StepRecord>,
    /// Registry writes of aggregate results that did not reach the store
    pub write_failures: Vec<String>,
}

impl RunReport {
    pub fn chain(&self, slug: ChainSlug) -> Option<&ChainReport> {
        self.chains.iter().find(|r| r.chain == slug)
    }

    /// Every step across chains and aggregate steps.
    pub fn steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.chains
            .iter()
            .flat_map(|c| c.steps.iter())
            .chain(self.aggregate.iter())
    }

    /// Chains that failed, with their errors.
    pub fn failures(&self) -> Vec<&ChainConfigurationError> {
        self.chains
            .iter()
            .filter_map(|c| match &c.status {
                ChainStatus::Failed(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    /// Every requested unit completed or was skipped.
    pub fn is_success(&self) -> bool {
        self.chains
            .iter()
            .all(|c| matches!(c.status, ChainStatus::Completed | ChainStatus::Missing))
            && !self.aggregate.iter().any(|s| s.outcome.is_failure())
            && self.write_failures.is_empty()
    }

    /// Count of (applied, already registered, skipped, failed) steps.
    pub fn tally(&self) -> (usize, usize, usize, usize) {
        self.steps().fold((0, 0, 0, 0), |(a, r, s, f), step| match step.outcome {
            StepOutcome::Applied { .. } => (a + 1, r, s, f),
            StepOutcome::AlreadyRegistered => (a, r + 1, s, f),
            StepOutcome::Skipped(_) => (a, r, s + 1, f),
            StepOutcome::Failed(_) => (a, r, s, f + 1),
        })
    }
}
