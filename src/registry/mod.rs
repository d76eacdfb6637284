//! Address Registry
//!
//! The deployment address document: one record per chain, keyed by contract role,
//! plus a nested `integrations` map keyed by sibling chain and integration type.
//!
//! ```json
//! {
//!   "5": {
//!     "Socket": "0x…",
//!     "ExecutionManager": "0x…",
//!     "integrations": {
//!       "80001": {
//!         "NATIVE_BRIDGE": { "switchboard": "0x…", "capacitor": "0x…", "decapacitor": "0x…" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Unknown roles and fields are carried through untouched.

pub mod errors;
pub mod reconciler;
pub mod report;
pub mod store;

pub use errors::RegistryError;
pub use reconciler::Reconciler;
pub use report::{
    ChainReport, ChainStatus, RunReport, SkipReason, StepAction, StepOutcome, StepRecord,
};
pub use store::{JsonFileStore, MemoryStore, RegistryStore};

use alloy_primitives::Address;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::chains::ChainSlug;
use crate::strategy::IntegrationType;

/// Well-known contract role keys.
pub mod roles {
    pub const SOCKET: &str = "Socket";
    pub const SOCKET_BATCHER: &str = "SocketBatcher";
    pub const EXECUTION_MANAGER: &str = "ExecutionManager";
    pub const TRANSMIT_MANAGER: &str = "TransmitManager";
    pub const FAST_SWITCHBOARD: &str = "FastSwitchboard";
    pub const OPTIMISTIC_SWITCHBOARD: &str = "OptimisticSwitchboard";
    pub const NOTARY: &str = "Notary";
    pub const SAFE: &str = "Safe";
    pub const MULTISIG_WRAPPER: &str = "MultiSigWrapper";
}

const INTEGRATIONS_KEY: &str = "integrations";

/// Addresses of one sibling integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationAddresses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switchboard: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacitor: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decapacitor: Option<Address>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Per sibling, per integration type.
pub type Integrations = BTreeMap<ChainSlug, BTreeMap<IntegrationType, IntegrationAddresses>>;

/// One chain's record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>")]
pub struct ChainAddresses {
    /// Contract roles (and any other top-level field), as raw JSON
    pub contracts: BTreeMap<String, Value>,
    /// Sibling integrations
    pub integrations: Integrations,
}

impl TryFrom<BTreeMap<String, Value>> for ChainAddresses {
    type Error = serde_json::Error;

    fn try_from(mut contracts: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        let integrations = match contracts.remove(INTEGRATIONS_KEY) {
            Some(value) => serde_json::from_value(value)?,
            None => Integrations::new(),
        };
        Ok(Self {
            contracts,
            integrations,
        })
    }
}

impl Serialize for ChainAddresses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.contracts {
            map.serialize_entry(key, value)?;
        }
        if !self.integrations.is_empty() {
            map.serialize_entry(INTEGRATIONS_KEY, &self.integrations)?;
        }
        map.end()
    }
}

impl ChainAddresses {
    /// Address stored under a role, if present and well-formed.
    pub fn address(&self, role: &str) -> Option<Address> {
        self.contracts.get(role)?.as_str()?.parse().ok()
    }

    /// Store an address under a role.
    pub fn set_address(&mut self, role: &str, address: Address) {
        self.contracts
            .insert(role.to_string(), Value::String(address.to_checksum(None)));
    }

    /// Integration entry for a sibling and type.
    pub fn integration(
        &self,
        sibling: ChainSlug,
        kind: IntegrationType,
    ) -> Option<&IntegrationAddresses> {
        self.integrations.get(&sibling)?.get(&kind)
    }

    /// Integration entry, created empty if missing.
    pub fn integration_mut(
        &mut self,
        sibling: ChainSlug,
        kind: IntegrationType,
    ) -> &mut IntegrationAddresses {
        self.integrations
            .entry(sibling)
            .or_default()
            .entry(kind)
            .or_default()
    }

    /// Switchboard of a sibling integration.
    pub fn switchboard(&self, sibling: ChainSlug, kind: IntegrationType) -> Option<Address> {
        self.integration(sibling, kind)?.switchboard
    }

    /// Siblings that have an entry of the given type.
    pub fn siblings_with(&self, kind: IntegrationType) -> Vec<ChainSlug> {
        self.integrations
            .iter()
            .filter(|(_, by_type)| by_type.contains_key(&kind))
            .map(|(sibling, _)| *sibling)
            .collect()
    }
}

/// The full multi-chain document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressRegistry {
    chains: BTreeMap<ChainSlug, ChainAddresses>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record of one chain.
    pub fn chain(&self, slug: ChainSlug) -> Option<&ChainAddresses> {
        self.chains.get(&slug)
    }

    /// Whether a chain has a record.
    pub fn contains(&self, slug: ChainSlug) -> bool {
        self.chains.contains_key(&slug)
    }

    /// Replace a chain's whole record, returning the previous one.
    pub fn replace(&mut self, slug: ChainSlug, record: ChainAddresses) -> Option<ChainAddresses> {
        self.chains.insert(slug, record)
    }

    /// Drop a chain's record.
    pub fn remove(&mut self, slug: ChainSlug) -> Option<ChainAddresses> {
        self.chains.remove(&slug)
    }

    /// Chains with a record.
    pub fn slugs(&self) -> impl Iterator<Item = ChainSlug> + '_ {
        self.chains.keys().copied()
    }

    /// The switchboard `sibling` uses for its side of the `chain` link
    /// (`registry[sibling].integrations[chain][kind].switchboard`).
    pub fn sibling_switchboard(
        &self,
        chain: ChainSlug,
        sibling: ChainSlug,
        kind: IntegrationType,
    ) -> Option<Address> {
        self.chain(sibling)?.switchboard(chain, kind)
    }

    /// Parse a registry document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the registry as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const DOC: &str = r#"{
        "5": {
            "Socket": "0x0000000000000000000000000000000000000501",
            "startBlock": 8000000,
            "integrations": {
                "80001": {
                    "NATIVE_BRIDGE": {
                        "switchboard": "0x0000000000000000000000000000000000000502",
                        "capacitor": "0x0000000000000000000000000000000000000503",
                        "decapacitor": "0x0000000000000000000000000000000000000504",
                        "notary": "0x0000000000000000000000000000000000000505"
                    },
                    "FAST": {}
                }
            }
        },
        "80001": {
            "Socket": "0x0000000000000000000000000000000000008001",
            "integrations": {
                "5": {
                    "NATIVE_BRIDGE": {
                        "switchboard": "0x0000000000000000000000000000000000008002"
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_document() {
        let registry = AddressRegistry::from_json(DOC).unwrap();
        let goerli = registry.chain(ChainSlug(5)).unwrap();

        assert_eq!(
            goerli.address(roles::SOCKET),
            Some(address!("0000000000000000000000000000000000000501"))
        );
        assert_eq!(goerli.address("startBlock"), None);
        assert_eq!(
            goerli.switchboard(ChainSlug(80001), IntegrationType::Native),
            Some(address!("0000000000000000000000000000000000000502"))
        );
        assert_eq!(goerli.switchboard(ChainSlug(80001), IntegrationType::Fast), None);
        assert!(goerli.integration(ChainSlug(80001), IntegrationType::Fast).is_some());
        assert_eq!(
            goerli.siblings_with(IntegrationType::Native),
            vec![ChainSlug(80001)]
        );
        assert!(goerli.siblings_with(IntegrationType::Optimistic).is_empty());
    }

    #[test]
    fn test_sibling_switchboard_is_mirrored() {
        let registry = AddressRegistry::from_json(DOC).unwrap();
        assert_eq!(
            registry.sibling_switchboard(ChainSlug(5), ChainSlug(80001), IntegrationType::Native),
            Some(address!("0000000000000000000000000000000000008002"))
        );
        assert_eq!(
            registry.sibling_switchboard(ChainSlug(80001), ChainSlug(5), IntegrationType::Native),
            Some(address!("0000000000000000000000000000000000000502"))
        );
        assert_eq!(
            registry.sibling_switchboard(ChainSlug(5), ChainSlug(421613), IntegrationType::Native),
            None
        );
    }

    #[test]
    fn test_roundtrip_preserves_unknown_fields() {
        let registry = AddressRegistry::from_json(DOC).unwrap();
        let json = registry.to_json_pretty().unwrap();
        let reparsed = AddressRegistry::from_json(&json).unwrap();
        assert_eq!(reparsed, registry);

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["5"]["startBlock"], 8000000);
        assert_eq!(
            value["5"]["integrations"]["80001"]["NATIVE_BRIDGE"]["notary"],
            "0x0000000000000000000000000000000000000505"
        );
    }

    #[test]
    fn test_integration_mut_creates_entry() {
        let mut record = ChainAddresses::default();
        record.integration_mut(ChainSlug(10), IntegrationType::Optimistic).switchboard =
            Some(Address::repeat_byte(1));
        assert_eq!(
            record.switchboard(ChainSlug(10), IntegrationType::Optimistic),
            Some(Address::repeat_byte(1))
        );
        assert!(record.integration(ChainSlug(10), IntegrationType::Fast).is_none());
    }

    #[test]
    fn test_empty_integrations_not_serialized() {
        let mut record = ChainAddresses::default();
        record.set_address(roles::SOCKET, Address::repeat_byte(0xab));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get(INTEGRATIONS_KEY).is_none());
        assert_eq!(record.address(roles::SOCKET), Some(Address::repeat_byte(0xab)));
    }
}
