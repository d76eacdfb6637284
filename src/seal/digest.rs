use alloy_primitives::{keccak256, B256, U256};

use crate::abi::{encode_params, encode_u256, encode_u64, Token};
use crate::chains::ChainSlug;

/// Digest a notary verifies before accepting a seal:
/// `keccak256(abi.encode(uint256 dstSlug, uint256 packedPacketId, bytes32 root))`.
pub fn seal_digest(destination: ChainSlug, packed_packet_id: U256, root: B256) -> B256 {
    keccak256(encode_params(&[
        Token::Word(encode_u64(u64::from(destination.get()))),
        Token::Word(encode_u256(packed_packet_id)),
        Token::Word(root),
    ]))
}
