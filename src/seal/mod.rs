//! Packet sealing
//!
//! Sealing attests a packet's root to the destination: the digest of
//! (destination, packed packet id, root) is signed and submitted to the notary with
//! `seal(address capacitor, bytes[] bridgeParams, bytes signature)`.
//!
//! A packet moves through [`SealState`] strictly forward:
//! `Observed → DigestComputed → Signed → Submitted → Confirmed`.

pub mod digest;
pub mod errors;

pub use digest::seal_digest;
pub use errors::SealError;

use alloy_primitives::{Address, Bytes, B256};
use serde_json::Value;
use tracing::{info, warn};

use crate::abi::{encode_address, encode_call, selectors, Token};
use crate::capacitor::{CapacitorEventDecoder, EventError, RootCommitment};
use crate::chains::ChainSlug;
use crate::context::ChainContext;
use crate::packet::PacketId;
use crate::registry::{roles, ChainAddresses};
use crate::rpc::{wait_for_confirmations, CallRequest, ConfirmationError};
use crate::signer::{SignerError, TxRequest};
use crate::strategy::IntegrationType;

/// Position in the sealing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SealStage {
    Observed,
    DigestComputed,
    Signed,
    Submitted,
    Confirmed,
}

/// A packet's sealing progress, carrying everything accumulated so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SealState {
    Observed {
        commitment: RootCommitment,
        destination: ChainSlug,
    },
    DigestComputed {
        commitment: RootCommitment,
        destination: ChainSlug,
        digest: B256,
    },
    Signed {
        commitment: RootCommitment,
        digest: B256,
        signature: Bytes,
    },
    Submitted {
        commitment: RootCommitment,
        signature: Bytes,
        tx_hash: B256,
    },
    Confirmed {
        commitment: RootCommitment,
        tx_hash: B256,
        block_number: Option<u64>,
    },
}

impl SealState {
    pub fn observed(commitment: RootCommitment, destination: ChainSlug) -> Self {
        SealState::Observed {
            commitment,
            destination,
        }
    }

    pub fn stage(&self) -> SealStage {
        match self {
            SealState::Observed { .. } => SealStage::Observed,
            SealState::DigestComputed { .. } => SealStage::DigestComputed,
            SealState::Signed { .. } => SealStage::Signed,
            SealState::Submitted { .. } => SealStage::Submitted,
            SealState::Confirmed { .. } => SealStage::Confirmed,
        }
    }

    pub fn commitment(&self) -> &RootCommitment {
        match self {
            SealState::Observed { commitment, .. }
            | SealState::DigestComputed { commitment, .. }
            | SealState::Signed { commitment, .. }
            | SealState::Submitted { commitment, .. }
            | SealState::Confirmed { commitment, .. } => commitment,
        }
    }

    fn invalid(&self, to: SealStage) -> SealError {
        SealError::InvalidTransition {
            from: self.stage(),
            to,
        }
    }
}

/// Terminal success of a seal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealOutcome {
    /// Seal transaction reached the chain's confirmation depth
    Confirmed {
        tx_hash: B256,
        block_number: Option<u64>,
    },
    /// The notary already held this seal
    AlreadySealed,
}

/// Result of sealing one packet.
#[derive(Debug)]
pub struct PacketReport {
    /// `None` when the capacitor event could not be decoded into a packet
    pub packet_id: Option<PacketId>,
    pub result: Result<SealOutcome, SealError>,
}

impl PacketReport {
    /// Sealed now or before.
    pub fn is_satisfied(&self) -> bool {
        self.result.is_ok()
    }

    /// Packet id, or the log position of an event that did not decode.
    pub fn label(&self) -> String {
        match (&self.packet_id, &self.result) {
            (Some(packet_id), _) => packet_id.to_string(),
            (None, Err(SealError::Event(EventError::Decode { log_index: Some(index), .. }))) => {
                format!("log #{index}")
            }
            (None, _) => "unknown packet".to_string(),
        }
    }
}

/// Seals packets of one source chain through its notary.
pub struct PacketSealer<'a> {
    ctx: &'a ChainContext,
    notary: Address,
    bridge_params: Vec<Bytes>,
}

impl<'a> PacketSealer<'a> {
    pub fn new(ctx: &'a ChainContext, notary: Address) -> Self {
        Self {
            ctx,
            notary,
            bridge_params: Vec::new(),
        }
    }

    /// Extra bridge parameters forwarded with each seal.
    pub fn with_bridge_params(mut self, params: Vec<Bytes>) -> Self {
        self.bridge_params = params;
        self
    }

    pub fn compute_digest(&self, state: SealState) -> Result<SealState, SealError> {
        let (commitment, destination) = match state {
            SealState::Observed {
                commitment,
                destination,
            } => (commitment, destination),
            other => return Err(other.invalid(SealStage::DigestComputed)),
        };
        let digest = seal_digest(destination, commitment.packed_id, commitment.root_hash);
        Ok(SealState::DigestComputed {
            commitment,
            destination,
            digest,
        })
    }

    pub async fn sign(&self, state: SealState) -> Result<SealState, SealError> {
        let (commitment, digest) = match state {
            SealState::DigestComputed {
                commitment, digest, ..
            } => (commitment, digest),
            other => return Err(other.invalid(SealStage::Signed)),
        };
        let signature = self.ctx.signer.sign_digest(digest).await?;
        Ok(SealState::Signed {
            commitment,
            digest,
            signature,
        })
    }

    /// Send the seal transaction. A revert carrying the notary's "already sealed"
    /// error yields [`SealError::AlreadySealed`].
    pub async fn submit(&self, state: SealState) -> Result<SealState, SealError> {
        let (commitment, signature) = match state {
            SealState::Signed {
                commitment,
                signature,
                ..
            } => (commitment, signature),
            other => return Err(other.invalid(SealStage::Submitted)),
        };

        let call = self.seal_call(&commitment, &signature);
        let sent = self
            .ctx
            .signer
            .send_transaction(TxRequest::call(self.notary, call))
            .await;
        let tx_hash = match sent {
            Ok(tx_hash) => tx_hash,
            Err(err) if is_already_sealed(&err) => {
                return Err(SealError::AlreadySealed(commitment.packet_id));
            }
            Err(err) => return Err(err.into()),
        };
        info!(
            target: "seal",
            packet = %commitment.packet_id,
            %tx_hash,
            notary = %self.notary,
            "Submitted seal"
        );

        Ok(SealState::Submitted {
            commitment,
            signature,
            tx_hash,
        })
    }

    /// Wait for the seal to reach the chain's depth. A mined revert is replayed against
    /// the notary; if the replay fails with the "already sealed" error the packet was
    /// sealed by someone else first and [`SealError::AlreadySealed`] is returned.
    pub async fn confirm(&self, state: SealState) -> Result<SealState, SealError> {
        let (commitment, signature, tx_hash) = match state {
            SealState::Submitted {
                commitment,
                signature,
                tx_hash,
            } => (commitment, signature, tx_hash),
            other => return Err(other.invalid(SealStage::Confirmed)),
        };
        let waited = wait_for_confirmations(
            self.ctx.rpc.as_ref(),
            tx_hash,
            self.ctx.meta.confirmations,
            self.ctx.policy,
        )
        .await;
        let receipt = match waited {
            Ok(receipt) => receipt,
            Err(ConfirmationError::Reverted(tx))
                if self.sealed_elsewhere(&commitment, &signature).await =>
            {
                info!(
                    target: "seal",
                    packet = %commitment.packet_id,
                    %tx,
                    "Seal reverted, packet already sealed"
                );
                return Err(SealError::AlreadySealed(commitment.packet_id));
            }
            Err(reason) => return Err(SealError::NotConfirmed { tx: tx_hash, reason }),
        };

        Ok(SealState::Confirmed {
            commitment,
            tx_hash,
            block_number: receipt.block_number,
        })
    }

    /// Run one packet through every stage.
    pub async fn seal(
        &self,
        commitment: RootCommitment,
        destination: ChainSlug,
    ) -> Result<SealOutcome, SealError> {
        let state = self.compute_digest(SealState::observed(commitment, destination))?;
        let state = self.sign(state).await?;
        let confirmed = match self.submit(state).await {
            Ok(state) => self.confirm(state).await,
            Err(err) => Err(err),
        };
        match confirmed {
            Ok(SealState::Confirmed {
                tx_hash,
                block_number,
                ..
            }) => Ok(SealOutcome::Confirmed {
                tx_hash,
                block_number,
            }),
            Ok(other) => Err(other.invalid(SealStage::Confirmed)),
            Err(SealError::AlreadySealed(packet_id)) => {
                info!(target: "seal", packet = %packet_id, "Packet already sealed");
                Ok(SealOutcome::AlreadySealed)
            }
            Err(err) => Err(err),
        }
    }

    async fn seal_one(&self, commitment: RootCommitment, destination: ChainSlug) -> PacketReport {
        let result = self.seal(commitment, destination).await;
        if let Err(err) = &result {
            warn!(target: "seal", packet = %commitment.packet_id, %err, "Seal failed");
        }
        PacketReport {
            packet_id: Some(commitment.packet_id),
            result,
        }
    }

    /// Seal packets one after another; a failure only affects its own packet.
    pub async fn seal_packets(
        &self,
        commitments: &[RootCommitment],
        destination: ChainSlug,
    ) -> Vec<PacketReport> {
        let mut reports = Vec::with_capacity(commitments.len());
        for commitment in commitments {
            reports.push(self.seal_one(*commitment, destination).await);
        }
        reports
    }

    /// Wait for the source transaction to be final, decode every capacitor event in
    /// it, and seal each packet. An event that does not decode is reported as a failed
    /// packet; the others are still sealed.
    pub async fn seal_transaction(
        &self,
        tx_hash: B256,
        capacitor: Address,
        decoder: &CapacitorEventDecoder,
        destination: ChainSlug,
    ) -> Result<Vec<PacketReport>, SealError> {
        let receipt = wait_for_confirmations(
            self.ctx.rpc.as_ref(),
            tx_hash,
            self.ctx.meta.confirmations,
            self.ctx.policy,
        )
        .await
        .map_err(|reason| SealError::SourceNotConfirmed { tx: tx_hash, reason })?;
        let events = decoder.decode_all(&receipt, capacitor, self.ctx.meta.slug)?;

        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            match event {
                Ok(commitment) => reports.push(self.seal_one(commitment, destination).await),
                Err(err) => {
                    warn!(target: "seal", %tx_hash, %err, "Skipping undecodable capacitor event");
                    reports.push(PacketReport {
                        packet_id: None,
                        result: Err(err.into()),
                    });
                }
            }
        }
        Ok(reports)
    }

    fn seal_call(&self, commitment: &RootCommitment, signature: &Bytes) -> Bytes {
        encode_call(
            selectors::seal(),
            &[
                Token::Word(encode_address(commitment.packet_id.capacitor)),
                Token::BytesArray(self.bridge_params.clone()),
                Token::Bytes(signature.clone()),
            ],
        )
    }

    /// Replay the seal call and check for the notary's "already sealed" revert.
    async fn sealed_elsewhere(&self, commitment: &RootCommitment, signature: &Bytes) -> bool {
        let request = CallRequest::new(self.notary, self.seal_call(commitment, signature))
            .with_from(self.ctx.signer.address());
        match self.ctx.rpc.call(request).await {
            Err(err) => err.is_revert_with(&already_sealed_selectors()),
            Ok(_) => false,
        }
    }
}

fn already_sealed_selectors() -> [[u8; 4]; 2] {
    [selectors::already_attested(), selectors::already_sealed()]
}

fn is_already_sealed(err: &SignerError) -> bool {
    err.rpc()
        .is_some_and(|rpc| rpc.is_revert_with(&already_sealed_selectors()))
}

/// Notary for packets sent to `remote` over `kind`.
///
/// Looked up, in order, on the integration entry (`notary` field), then under the
/// `Notary` role either as one address or as a map keyed by remote slug.
pub fn notary_for(
    record: &ChainAddresses,
    remote: ChainSlug,
    kind: IntegrationType,
) -> Option<Address> {
    let from_entry = record
        .integration(remote, kind)
        .and_then(|entry| entry.extra.get("notary"))
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok());
    if from_entry.is_some() {
        return from_entry;
    }
    match record.contracts.get(roles::NOTARY)? {
        Value::String(address) => address.parse().ok(),
        Value::Object(by_remote) => by_remote.get(&remote.to_string())?.as_str()?.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{decode_bytes_at, split_selector, word_at};
    use crate::capacitor::DEFAULT_EVENT_SIGNATURE;
    use crate::packet::PacketIdLayout;
    use crate::rpc::{ConfirmationError, Log};
    use crate::chains::ChainRegistry;
    use crate::signer::dev::DEV_PRIVATE_KEYS;
    use crate::signer::{
        bytes_to_signature, parse_private_key, sign_digest_with, ChainSigner, RelayRequest,
        RelayService, RelayedSigner, SignerMode,
    };
    use crate::testing::{context, MockChain};
    use alloy_primitives::{address, U256};
    use alloy_signer_local::PrivateKeySigner;
    use async_trait::async_trait;
    use std::sync::Arc;

    const GOERLI: ChainSlug = ChainSlug(5);
    const MUMBAI: ChainSlug = ChainSlug(80001);
    const NOTARY: Address = address!("00000000000000000000000000000000000000a0");
    const CAPACITOR: Address = address!("00000000000000000000000000000000000000c1");

    /// Relay that executes Safe transactions straight on a mock chain.
    struct ChainRelay(MockChain);

    #[async_trait]
    impl RelayService for ChainRelay {
        async fn submit(&self, request: RelayRequest) -> Result<B256, SignerError> {
            let tx = TxRequest {
                to: request.to,
                data: request.data,
                value: request.value,
            };
            self.0.submit(tx).map_err(SignerError::Relay)
        }
    }

    /// Signer whose transactions reach the chain without a prior simulation.
    struct UnsimulatedSigner {
        key: PrivateKeySigner,
        chain: MockChain,
    }

    #[async_trait]
    impl ChainSigner for UnsimulatedSigner {
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
            Ok(self.chain.submit_unsimulated(tx))
        }
    }

    fn context_with(chain: &MockChain, signer: Arc<dyn ChainSigner>) -> ChainContext {
        ChainContext::new(
            ChainRegistry::default().lookup(GOERLI).unwrap(),
            Arc::new(chain.clone()),
            signer,
            MockChain::fast_policy(),
        )
    }

    fn event_data(counter: u64) -> Bytes {
        let mut bytes = U256::from(counter).to_be_bytes::<32>().to_vec();
        bytes.extend_from_slice(B256::repeat_byte(counter as u8).as_slice());
        Bytes::from(bytes)
    }

    fn commitment(counter: u64) -> RootCommitment {
        let packet_id = PacketId::new(GOERLI, CAPACITOR, counter);
        RootCommitment {
            packet_id,
            packed_id: packet_id.pack().unwrap(),
            root_hash: B256::repeat_byte(0x42),
            tx_hash: B256::repeat_byte(0x01),
        }
    }

    #[tokio::test]
    async fn test_seal_confirms_and_signs_digest() {
        let chain = MockChain::new();
        let ctx = context(GOERLI, &chain);
        let sealer = PacketSealer::new(&ctx, NOTARY);

        let outcome = sealer.seal(commitment(7), MUMBAI).await.unwrap();
        assert!(matches!(outcome, SealOutcome::Confirmed { .. }));

        let sent = chain.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, NOTARY);
        let (selector, params) = split_selector(&sent[0].data).unwrap();
        assert_eq!(selector, selectors::seal());
        assert_eq!(&word_at(params, 0).unwrap()[12..], CAPACITOR.as_slice());

        let signature = bytes_to_signature(&decode_bytes_at(params, 2).unwrap()).unwrap();
        let digest = seal_digest(MUMBAI, commitment(7).packed_id, commitment(7).root_hash);
        assert_eq!(
            signature.recover_address_from_msg(digest.as_slice()).unwrap(),
            ctx.signer.address()
        );
    }

    #[tokio::test]
    async fn test_second_seal_is_already_sealed() {
        let chain = MockChain::new();
        let ctx = context(GOERLI, &chain);
        let sealer = PacketSealer::new(&ctx, NOTARY);

        let reports = sealer.seal_packets(&[commitment(7), commitment(7)], MUMBAI).await;
        assert!(matches!(reports[0].result, Ok(SealOutcome::Confirmed { .. })));
        assert!(matches!(reports[1].result, Ok(SealOutcome::AlreadySealed)));
        assert!(reports.iter().all(PacketReport::is_satisfied));
        assert_eq!(chain.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_mined_revert_is_not_confirmed() {
        let chain = MockChain::new();
        chain.revert_mined_transactions(true);
        let ctx = context(GOERLI, &chain);

        let err = PacketSealer::new(&ctx, NOTARY)
            .seal(commitment(7), MUMBAI)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SealError::NotConfirmed {
                reason: ConfirmationError::Reverted(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unmined_seal_times_out() {
        let chain = MockChain::new();
        chain.withhold_receipts(true);
        let ctx = context(GOERLI, &chain);

        let err = PacketSealer::new(&ctx, NOTARY)
            .seal(commitment(7), MUMBAI)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SealError::NotConfirmed {
                reason: ConfirmationError::Timeout { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_packet() {
        let chain = MockChain::new();
        let ctx = context(GOERLI, &chain);
        let sealer = PacketSealer::new(&ctx, NOTARY);

        let mut bad = commitment(9);
        bad.packet_id.capacitor = Address::repeat_byte(0xee);
        chain.revert_seals_for(Address::repeat_byte(0xee));

        let reports = sealer.seal_packets(&[bad, commitment(10)], MUMBAI).await;
        assert!(matches!(reports[0].result, Err(SealError::Signer(_))));
        assert!(reports[1].is_satisfied());
    }

    #[tokio::test]
    async fn test_states_only_move_forward() {
        let chain = MockChain::new();
        let ctx = context(GOERLI, &chain);
        let sealer = PacketSealer::new(&ctx, NOTARY);

        let observed = SealState::observed(commitment(1), MUMBAI);
        let err = sealer.sign(observed.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            SealError::InvalidTransition {
                from: SealStage::Observed,
                to: SealStage::Signed
            }
        ));

        let computed = sealer.compute_digest(observed).unwrap();
        assert_eq!(computed.stage(), SealStage::DigestComputed);
        assert!(sealer.compute_digest(computed.clone()).is_err());
        assert!(sealer.confirm(computed.clone()).await.is_err());

        let signed = sealer.sign(computed).await.unwrap();
        assert_eq!(signed.stage(), SealStage::Signed);
        assert_eq!(signed.commitment(), &commitment(1));
        assert!(chain.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_seal_transaction_decodes_every_event() {
        let chain = MockChain::new();
        let decoder = CapacitorEventDecoder::new(DEFAULT_EVENT_SIGNATURE, PacketIdLayout::DEFAULT);
        let logs = vec![
            Log {
                address: CAPACITOR,
                topics: vec![decoder.topic()],
                data: event_data(3),
                log_index: Some(0),
            },
            Log {
                address: CAPACITOR,
                topics: vec![decoder.topic()],
                data: event_data(4),
                log_index: Some(1),
            },
        ];
        let source_tx = chain.mine_receipt(logs);
        let ctx = context(GOERLI, &chain);

        let reports = PacketSealer::new(&ctx, NOTARY)
            .seal_transaction(source_tx, CAPACITOR, &decoder, MUMBAI)
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].packet_id.unwrap().counter, 3);
        assert_eq!(reports[1].packet_id.unwrap().counter, 4);
        assert!(reports.iter().all(PacketReport::is_satisfied));
    }

    #[tokio::test]
    async fn test_undecodable_event_does_not_block_other_packets() {
        let chain = MockChain::new();
        let decoder = CapacitorEventDecoder::default();
        let logs = vec![
            Log {
                address: CAPACITOR,
                topics: vec![decoder.topic()],
                data: event_data(3),
                log_index: Some(0),
            },
            Log {
                address: CAPACITOR,
                topics: vec![decoder.topic()],
                data: Bytes::from_static(&[0u8; 32]),
                log_index: Some(1),
            },
        ];
        let source_tx = chain.mine_receipt(logs);
        let ctx = context(GOERLI, &chain);

        let reports = PacketSealer::new(&ctx, NOTARY)
            .seal_transaction(source_tx, CAPACITOR, &decoder, MUMBAI)
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].packet_id.unwrap().counter, 3);
        assert!(matches!(reports[0].result, Ok(SealOutcome::Confirmed { .. })));
        assert_eq!(reports[1].packet_id, None);
        assert!(matches!(
            reports[1].result,
            Err(SealError::Event(EventError::Decode { log_index: Some(1), .. }))
        ));
        assert_eq!(reports[1].label(), "log #1");
        assert_eq!(chain.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_source_without_events_is_not_found() {
        let chain = MockChain::new();
        let source_tx = chain.mine_receipt(Vec::new());
        let ctx = context(GOERLI, &chain);

        let err = PacketSealer::new(&ctx, NOTARY)
            .seal_transaction(source_tx, CAPACITOR, &CapacitorEventDecoder::default(), MUMBAI)
            .await
            .unwrap_err();
        assert!(matches!(err, SealError::Event(EventError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_relayed_reseal_is_already_sealed() {
        let chain = MockChain::new();
        let key = parse_private_key(DEV_PRIVATE_KEYS[0]).unwrap();
        let relay = Arc::new(ChainRelay(chain.clone()));
        let signer = RelayedSigner::new(key, relay, 5, Address::repeat_byte(0x5a), None);
        let ctx = context_with(&chain, Arc::new(signer));
        let sealer = PacketSealer::new(&ctx, NOTARY);

        let reports = sealer.seal_packets(&[commitment(7), commitment(7)], MUMBAI).await;
        assert!(matches!(reports[0].result, Ok(SealOutcome::Confirmed { .. })));
        assert!(matches!(reports[1].result, Ok(SealOutcome::AlreadySealed)));
        assert_eq!(chain.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_mined_revert_of_sealed_packet_is_already_sealed() {
        let chain = MockChain::new();
        let first = context(GOERLI, &chain);
        PacketSealer::new(&first, NOTARY)
            .seal(commitment(7), MUMBAI)
            .await
            .unwrap();

        let signer = UnsimulatedSigner {
            key: parse_private_key(DEV_PRIVATE_KEYS[0]).unwrap(),
            chain: chain.clone(),
        };
        let ctx = context_with(&chain, Arc::new(signer));
        let outcome = PacketSealer::new(&ctx, NOTARY)
            .seal(commitment(7), MUMBAI)
            .await
            .unwrap();
        assert_eq!(outcome, SealOutcome::AlreadySealed);
        assert_eq!(chain.sent_transactions().len(), 2);

        let other = PacketSealer::new(&ctx, NOTARY);
        chain.revert_seals_for(CAPACITOR);
        let err = other.seal(commitment(8), MUMBAI).await.unwrap_err();
        assert!(matches!(
            err,
            SealError::NotConfirmed {
                reason: ConfirmationError::Reverted(_),
                ..
            }
        ));
    }

    #[test]
    fn test_notary_lookup() {
        let mut record = ChainAddresses::default();
        assert_eq!(notary_for(&record, MUMBAI, IntegrationType::Fast), None);

        record.contracts.insert(
            roles::NOTARY.to_string(),
            serde_json::json!({ "80001": "0x00000000000000000000000000000000000000b1" }),
        );
        assert_eq!(
            notary_for(&record, MUMBAI, IntegrationType::Fast),
            Some(address!("00000000000000000000000000000000000000b1"))
        );
        assert_eq!(notary_for(&record, ChainSlug(420), IntegrationType::Fast), None);

        record.integration_mut(MUMBAI, IntegrationType::Fast).extra.insert(
            "notary".to_string(),
            Value::String("0x00000000000000000000000000000000000000b2".to_string()),
        );
        assert_eq!(
            notary_for(&record, MUMBAI, IntegrationType::Fast),
            Some(address!("00000000000000000000000000000000000000b2"))
        );

        record.set_address(roles::NOTARY, NOTARY);
        assert_eq!(notary_for(&record, ChainSlug(420), IntegrationType::Fast), Some(NOTARY));
    }
}
