//! Run configuration handed from the CLI to the core.

use std::time::Duration;

use crate::packet::PacketIdLayout;
use crate::registry::roles;
use crate::rpc::ConfirmationPolicy;
use crate::strategy::IntegrationType;

/// Default `capacitorType` passed to `registerSiblingSlug` (single-message capacitor)
pub const DEFAULT_CAPACITOR_TYPE: u64 = 1;

/// Default `maxPacketLength` passed to `registerSiblingSlug`
pub const DEFAULT_MAX_PACKET_LENGTH: u64 = 1;

/// Options shared by every chain task in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Integration types to configure, in run order
    pub integrations: Vec<IntegrationType>,
    pub capacitor_type: u64,
    pub max_packet_length: u64,
    /// Route transactions through the chain's Safe when it has one
    pub use_safe: bool,
    /// Registry role of the execution manager the Socket should use
    /// (`ExecutionManager` or a versioned variant such as `ExecutionManagerDF`)
    pub execution_manager_role: String,
    pub confirmation: ConfirmationPolicy,
    pub packet_layout: PacketIdLayout,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            integrations: IntegrationType::ALL.to_vec(),
            capacitor_type: DEFAULT_CAPACITOR_TYPE,
            max_packet_length: DEFAULT_MAX_PACKET_LENGTH,
            use_safe: false,
            execution_manager_role: roles::EXECUTION_MANAGER.to_string(),
            confirmation: ConfirmationPolicy::default(),
            packet_layout: PacketIdLayout::DEFAULT,
        }
    }
}

impl RunConfig {
    /// Confirmation policy from a timeout in seconds and a poll interval in
    /// milliseconds.
    pub fn with_confirmation(mut self, timeout_secs: u64, poll_interval_ms: u64) -> Self {
        self.confirmation = ConfirmationPolicy {
            timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_millis(poll_interval_ms),
        };
        self
    }

    /// Integration types, deduplicated and in run order (native, fast, optimistic).
    pub fn with_integrations(mut self, requested: &[IntegrationType]) -> Self {
        if !requested.is_empty() {
            self.integrations = IntegrationType::ALL
                .into_iter()
                .filter(|kind| requested.contains(kind))
                .collect();
        }
        self
    }
}
