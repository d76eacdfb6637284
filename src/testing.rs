//! In-memory chain, signer and network used by unit tests.
//!
//! [`MockChain`] understands just enough of the Socket, switchboard and notary ABIs
//! to make registration, manager wiring, tunnel wiring and sealing observable. Every
//! mined transaction advances the head far enough to satisfy any confirmation depth.

use alloy_consensus::{TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::abi::{
    decode_address, decode_bytes_at, decode_u64, encode_address, selectors, split_selector, word_at,
};
use crate::chains::{ChainMeta, ChainRegistry, ChainSlug};
use crate::context::ChainContext;
use crate::coordinator::CancelHandle;
use crate::registry::{
    roles, AddressRegistry, ChainAddresses, MemoryStore, RegistryError, RegistryStore,
};
use crate::rpc::{
    CallRequest, ChainRpc, ConfirmationPolicy, Log, ProviderSource, RpcError, TransactionReceipt,
};
use crate::signer::dev::DEV_PRIVATE_KEYS;
use crate::signer::{
    parse_private_key, sign_digest_with, ChainSigner, SignerError, SignerMode, SignerSource,
    TxRequest,
};
use crate::strategy::IntegrationType;

/// Blocks added on top of every mined transaction
const CONFIRMATION_PADDING: u64 = 300;

/// Revert payload for calls the mock is told to reject
const MOCK_REVERT: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

/// A Socket manager slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manager {
    Execution,
    Transmit,
}

#[derive(Debug, Default)]
struct State {
    chain_id: u64,
    head: u64,
    account_nonce: u64,
    mined: u64,
    raw: Vec<TxLegacy>,
    sent: Vec<TxRequest>,
    receipts: HashMap<B256, TransactionReceipt>,
    reverting: HashMap<Address, Bytes>,
    revert_mined: bool,
    withhold_receipts: bool,
    rejected_capacitors: HashSet<Address>,
    seals: HashSet<(Address, Address, Bytes)>,
    socket_of: HashMap<Address, Address>,
    registrations: HashMap<(Address, Address, ChainSlug), (Address, Address)>,
    managers: HashMap<(Address, Manager), Address>,
    tunnels: HashMap<Address, Address>,
    cancel_after: Option<(usize, CancelHandle)>,
}

impl State {
    /// Revert the call would raise, if any.
    fn check(&self, to: Address, data: &[u8]) -> Result<(), RpcError> {
        if let Some(data) = self.reverting.get(&to) {
            return Err(revert("mock revert", data.clone()));
        }
        let Some((selector, params)) = split_selector(data) else {
            return Ok(());
        };

        if selector == selectors::register_sibling_slug() {
            if !self.socket_of.contains_key(&to) {
                return Err(revert("unknown switchboard", Bytes::new()));
            }
        } else if selector == selectors::set_fx_child_tunnel() {
            if self.tunnels.get(&to).is_some_and(|t| *t != Address::ZERO) {
                return Err(revert("fxChildTunnel already set", Bytes::new()));
            }
        } else if selector == selectors::seal() {
            let capacitor = word_at(params, 0).and_then(decode_address).unwrap_or_default();
            if self.rejected_capacitors.contains(&capacitor) {
                return Err(revert("mock revert", Bytes::from_static(&MOCK_REVERT)));
            }
            let signature = decode_bytes_at(params, 2).unwrap_or_default();
            if self.seals.contains(&(to, capacitor, signature)) {
                return Err(revert(
                    "AlreadyAttested()",
                    Bytes::copy_from_slice(&selectors::already_attested()),
                ));
            }
        }
        Ok(())
    }

    /// Apply the effects of a successful transaction.
    fn apply(&mut self, to: Address, data: &[u8]) {
        let Some((selector, params)) = split_selector(data) else {
            return;
        };
        let address_arg = |index| {
            word_at(params, index)
                .and_then(decode_address)
                .unwrap_or_default()
        };

        if selector == selectors::register_sibling_slug() {
            let sibling = word_at(params, 0).and_then(decode_u64).unwrap_or_default();
            let sibling = ChainSlug(sibling as u32);
            if let Some(socket) = self.socket_of.get(&to).copied() {
                self.registrations
                    .entry((socket, to, sibling))
                    .or_insert_with(|| deployed(socket, to, sibling));
            }
        } else if selector == selectors::set_execution_manager() {
            self.managers.insert((to, Manager::Execution), address_arg(0));
        } else if selector == selectors::set_transmit_manager() {
            self.managers.insert((to, Manager::Transmit), address_arg(0));
        } else if selector == selectors::set_fx_child_tunnel() {
            self.tunnels.insert(to, address_arg(0));
        } else if selector == selectors::seal() {
            let signature = decode_bytes_at(params, 2).unwrap_or_default();
            self.seals.insert((to, address_arg(0), signature));
        }
    }

    /// `eth_call` output.
    fn read(&self, to: Address, data: &[u8]) -> Bytes {
        let Some((selector, params)) = split_selector(data) else {
            return Bytes::new();
        };
        let registration = || {
            let switchboard = word_at(params, 0).and_then(decode_address).unwrap_or_default();
            let sibling = word_at(params, 1).and_then(decode_u64).unwrap_or_default();
            self.registrations.get(&(to, switchboard, ChainSlug(sibling as u32))).copied()
        };

        let address = if selector == selectors::capacitors() {
            registration().map(|(capacitor, _)| capacitor)
        } else if selector == selectors::decapacitors() {
            registration().map(|(_, decapacitor)| decapacitor)
        } else if selector == selectors::execution_manager() {
            self.managers.get(&(to, Manager::Execution)).copied()
        } else if selector == selectors::transmit_manager() {
            self.managers.get(&(to, Manager::Transmit)).copied()
        } else if selector == selectors::fx_child_tunnel() {
            self.tunnels.get(&to).copied()
        } else {
            return Bytes::new();
        };
        Bytes::from(encode_address(address.unwrap_or_default()).to_vec())
    }

    /// Mine a transaction into its own block.
    fn mine(&mut self, logs: Vec<Log>, executed: bool) -> B256 {
        self.mined += 1;
        self.head += 1;
        let mut seed = self.chain_id.to_be_bytes().to_vec();
        seed.extend_from_slice(&self.mined.to_be_bytes());
        let tx_hash = keccak256(seed);

        let receipt = TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(self.head),
            status: Some(u64::from(executed)),
            logs,
        };
        self.receipts.insert(tx_hash, receipt);
        self.head += CONFIRMATION_PADDING;
        tx_hash
    }

    /// Record, execute and mine a transaction that passed simulation.
    fn execute(&mut self, request: TxRequest) -> B256 {
        let executed = !self.revert_mined;
        if executed {
            self.apply(request.to, &request.data);
        }
        self.sent.push(request);
        let tx_hash = self.mine(Vec::new(), executed);
        if let Some((count, handle)) = &self.cancel_after {
            if self.sent.len() == *count {
                handle.cancel();
            }
        }
        tx_hash
    }
}

fn revert(message: &str, data: Bytes) -> RpcError {
    RpcError::Reverted {
        message: message.to_string(),
        data,
    }
}

fn derive_address(label: &str, parts: &[&[u8]]) -> Address {
    let mut seed = label.as_bytes().to_vec();
    for part in parts {
        seed.extend_from_slice(part);
    }
    Address::from_word(keccak256(seed))
}

/// Capacitor and decapacitor a Socket deploys for one registration.
fn deployed(socket: Address, switchboard: Address, sibling: ChainSlug) -> (Address, Address) {
    let sibling = sibling.get().to_be_bytes();
    let parts: [&[u8]; 3] = [socket.as_slice(), switchboard.as_slice(), &sibling];
    (derive_address("capacitor", &parts), derive_address("decapacitor", &parts))
}

/// In-memory EVM chain.
#[derive(Debug, Clone)]
pub struct MockChain {
    state: Arc<Mutex<State>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub const GAS_ESTIMATE: u64 = 100_000;
    pub const GAS_PRICE: u128 = 1_000_000_000;

    pub fn new() -> Self {
        let state = State {
            chain_id: 5,
            head: 1,
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Short waits for tests that expect a timeout.
    pub fn fast_policy() -> ConfirmationPolicy {
        ConfirmationPolicy {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(5),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.state().chain_id = chain_id;
    }

    pub fn set_account_nonce(&self, nonce: u64) {
        self.state().account_nonce = nonce;
    }

    /// Raw transactions received through `eth_sendRawTransaction`.
    pub fn raw_transactions(&self) -> Vec<TxLegacy> {
        self.state().raw.clone()
    }

    /// Every transaction sent, by any signer.
    pub fn sent_transactions(&self) -> Vec<TxRequest> {
        self.state().sent.clone()
    }

    /// Make every call to `to` revert with `data`.
    pub fn revert_calls_to(&self, to: Address, data: Bytes) {
        self.state().reverting.insert(to, data);
    }

    /// Mine transactions with a failed status instead of executing them.
    pub fn revert_mined_transactions(&self, revert: bool) {
        self.state().revert_mined = revert;
    }

    /// Hide every receipt, as if nothing was ever mined.
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state().withhold_receipts = withhold;
    }

    /// Raise `handle` once the `count`-th transaction has been mined.
    pub fn cancel_after_transactions(&self, count: usize, handle: CancelHandle) {
        self.state().cancel_after = Some((count, handle));
    }

    /// Make seals of packets from `capacitor` revert.
    pub fn revert_seals_for(&self, capacitor: Address) {
        self.state().rejected_capacitors.insert(capacitor);
    }

    /// Mine a transaction that emitted `logs`.
    pub fn mine_receipt(&self, logs: Vec<Log>) -> B256 {
        self.state().mine(logs, true)
    }

    /// Deploy the chain's contracts from its registry record: every switchboard it
    /// names is bound to its Socket.
    pub fn install_registry(&self, slug: ChainSlug, registry: &AddressRegistry) {
        let Some(record) = registry.chain(slug) else {
            return;
        };
        let Some(socket) = record.address(roles::SOCKET) else {
            return;
        };
        let mut state = self.state();
        let role_switchboards = [roles::FAST_SWITCHBOARD, roles::OPTIMISTIC_SWITCHBOARD]
            .into_iter()
            .filter_map(|role| record.address(role));
        let entry_switchboards = record
            .integrations
            .values()
            .flat_map(|by_kind| by_kind.values())
            .filter_map(|entry| entry.switchboard);
        for switchboard in role_switchboards.chain(entry_switchboards) {
            state.socket_of.insert(switchboard, socket);
        }
    }

    /// Capacitor and decapacitor the Socket holds for (switchboard, sibling).
    pub fn registration(
        &self,
        socket: Address,
        switchboard: Address,
        sibling: ChainSlug,
    ) -> Option<(Address, Address)> {
        self.state().registrations.get(&(socket, switchboard, sibling)).copied()
    }

    /// Register a sibling without going through a transaction.
    pub fn register_directly(
        &self,
        socket: Address,
        switchboard: Address,
        sibling: ChainSlug,
    ) -> (Address, Address) {
        *self
            .state()
            .registrations
            .entry((socket, switchboard, sibling))
            .or_insert_with(|| deployed(socket, switchboard, sibling))
    }

    pub fn manager(&self, socket: Address, slot: Manager) -> Option<Address> {
        self.state().managers.get(&(socket, slot)).copied()
    }

    pub fn fx_child_tunnel(&self, switchboard: Address) -> Option<Address> {
        self.state().tunnels.get(&switchboard).copied()
    }

    pub fn set_fx_child_tunnel(&self, switchboard: Address, tunnel: Address) {
        self.state().tunnels.insert(switchboard, tunnel);
    }

    /// Simulate, then execute, a transaction on behalf of a signer.
    pub fn submit(&self, request: TxRequest) -> Result<B256, RpcError> {
        let mut state = self.state();
        state.check(request.to, &request.data)?;
        Ok(state.execute(request))
    }

    /// Mine a transaction without simulating it first; one that would revert is
    /// mined with a failed status.
    pub fn submit_unsimulated(&self, request: TxRequest) -> B256 {
        let mut state = self.state();
        if state.check(request.to, &request.data).is_ok() {
            return state.execute(request);
        }
        state.sent.push(request);
        state.mine(Vec::new(), false)
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        Ok(self.state().chain_id)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(self.state().head)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let state = self.state();
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(&tx_hash).cloned())
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, RpcError> {
        let state = self.state();
        state.check(request.to, &request.data)?;
        Ok(state.read(request.to, &request.data))
    }

    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, RpcError> {
        self.state().check(request.to, &request.data)?;
        Ok(Self::GAS_ESTIMATE)
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        Ok(Self::GAS_PRICE)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, RpcError> {
        Ok(self.state().account_nonce)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, RpcError> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        let tx = envelope
            .as_legacy()
            .map(|signed| signed.tx().clone())
            .ok_or_else(|| RpcError::InvalidResponse("expected a legacy transaction".to_string()))?;
        let to = tx
            .to
            .to()
            .copied()
            .ok_or_else(|| RpcError::InvalidResponse("contract creation".to_string()))?;

        let mut state = self.state();
        state.check(to, &tx.input)?;
        let request = TxRequest {
            to,
            data: tx.input.clone(),
            value: tx.value,
        };
        state.raw.push(tx);
        Ok(state.execute(request))
    }
}

/// Signer that executes straight against a [`MockChain`].
pub struct MockSigner {
    key: PrivateKeySigner,
    chain: MockChain,
}

impl MockSigner {
    pub fn new(chain: MockChain) -> Self {
        Self {
            key: parse_private_key(DEV_PRIVATE_KEYS[0]).unwrap(),
            chain,
        }
    }
}

#[async_trait]
impl ChainSigner for MockSigner {
    fn address(&self) -> Address {
        self.key.address()
    }

    fn mode(&self) -> SignerMode {
        SignerMode::Direct
    }

    async fn sign_digest(&self, digest: B256) -> Result<Bytes, SignerError> {
        sign_digest_with(&self.key, digest).await
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<B256, SignerError> {
        Ok(self.chain.submit(tx)?)
    }
}

/// Context for `slug` backed by `chain`.
pub fn context(slug: ChainSlug, chain: &MockChain) -> ChainContext {
    let meta = ChainRegistry::default().lookup(slug).unwrap();
    ChainContext::new(
        meta,
        Arc::new(chain.clone()),
        Arc::new(MockSigner::new(chain.clone())),
        MockChain::fast_policy(),
    )
}

/// Registry where every pair of chains has a switchboard of each `kind` on both
/// sides, plus a Socket and both managers per chain. Nothing is registered yet.
pub fn linked_registry(
    pairs: &[(ChainSlug, ChainSlug)],
    kinds: &[IntegrationType],
) -> AddressRegistry {
    let mut registry = AddressRegistry::new();
    let base = |slug: ChainSlug| {
        let bytes = slug.get().to_be_bytes();
        let mut record = ChainAddresses::default();
        for role in [roles::SOCKET, roles::EXECUTION_MANAGER, roles::TRANSMIT_MANAGER] {
            record.set_address(role, derive_address(role, &[bytes.as_slice()]));
        }
        record
    };

    for (a, b) in pairs {
        for (chain, sibling) in [(*a, *b), (*b, *a)] {
            let mut record = registry.chain(chain).cloned().unwrap_or_else(|| base(chain));
            for kind in kinds {
                let switchboard = derive_address(
                    kind.as_str(),
                    &[chain.get().to_be_bytes().as_slice(), sibling.get().to_be_bytes().as_slice()],
                );
                record.integration_mut(sibling, *kind).switchboard = Some(switchboard);
            }
            registry.replace(chain, record);
        }
    }
    registry
}

/// One [`MockChain`] per chain of a registry, with contracts installed.
#[derive(Debug, Clone)]
pub struct MockNetwork {
    chains: Arc<HashMap<ChainSlug, MockChain>>,
}

impl MockNetwork {
    pub fn new(registry: &AddressRegistry) -> Self {
        let table = ChainRegistry::default();
        let chains = registry
            .slugs()
            .map(|slug| {
                let chain = MockChain::new();
                if let Ok(meta) = table.lookup(slug) {
                    chain.set_chain_id(meta.chain_id);
                }
                chain.install_registry(slug, registry);
                (slug, chain)
            })
            .collect();
        Self {
            chains: Arc::new(chains),
        }
    }

    pub fn chain(&self, slug: ChainSlug) -> MockChain {
        self.chains[&slug].clone()
    }

    /// Transactions sent across every chain.
    pub fn sent_count(&self) -> usize {
        self.chains.values().map(|chain| chain.sent_transactions().len()).sum()
    }
}

impl ProviderSource for MockNetwork {
    fn provider(&self, slug: ChainSlug) -> Result<Arc<dyn ChainRpc>, RpcError> {
        self.chains
            .get(&slug)
            .map(|chain| Arc::new(chain.clone()) as Arc<dyn ChainRpc>)
            .ok_or(RpcError::MissingEndpoint(slug))
    }
}

impl SignerSource for MockNetwork {
    fn signer_for(
        &self,
        meta: &ChainMeta,
        _addresses: &ChainAddresses,
        _rpc: Arc<dyn ChainRpc>,
    ) -> Result<Arc<dyn ChainSigner>, SignerError> {
        let chain = self.chains.get(&meta.slug).ok_or(RpcError::MissingEndpoint(meta.slug))?;
        Ok(Arc::new(MockSigner::new(chain.clone())))
    }
}

/// [`MemoryStore`] whose first `failures` persists fail with an I/O error.
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(registry: AddressRegistry, failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(registry),
            failures: AtomicUsize::new(failures),
        }
    }

    /// Current stored registry.
    pub fn snapshot(&self) -> AddressRegistry {
        self.inner.snapshot()
    }
}

impl RegistryStore for FlakyStore {
    fn load(&self) -> Result<AddressRegistry, RegistryError> {
        self.inner.load()
    }

    fn persist(&self, registry: &AddressRegistry) -> Result<(), RegistryError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RegistryError::Io {
                path: "addresses.json".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.persist(registry)
    }
}
