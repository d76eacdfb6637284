//! Minimal Solidity ABI support
//!
//! Only what the coordinator needs to talk to sockets, switchboards and notaries:
//! selectors, 32-byte word helpers and a head/tail encoder for calls that carry
//! `bytes` or `bytes[]` arguments.

pub mod selectors;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};

pub use selectors::function_selector;

/// One ABI-encoded argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any static value already padded to a word (address, uint, bytes32)
    Word(B256),
    /// Dynamic `bytes`
    Bytes(Bytes),
    /// Dynamic `bytes[]`
    BytesArray(Vec<Bytes>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        !matches!(self, Token::Word(_))
    }
}

/// Topic hash of an event signature (`keccak256("MessageAdded(uint256,bytes32)")`).
pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// Left-pad an address into a word.
pub fn encode_address(addr: Address) -> B256 {
    addr.into_word()
}

/// Encode an unsigned integer into a word.
pub fn encode_u256(value: U256) -> B256 {
    B256::from(value.to_be_bytes())
}

/// Encode a u64 into a word.
pub fn encode_u64(value: u64) -> B256 {
    encode_u256(U256::from(value))
}

/// Decode an address word, rejecting dirty high bytes.
pub fn decode_address(word: &[u8]) -> Option<Address> {
    if word.len() != 32 || word[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(Address::from_slice(&word[12..32]))
}

/// Decode a word as a u64, rejecting values that do not fit.
pub fn decode_u64(word: &[u8]) -> Option<u64> {
    if word.len() != 32 {
        return None;
    }
    u64::try_from(U256::from_be_slice(word)).ok()
}

fn pad_len(len: usize) -> usize {
    len.div_ceil(32) * 32
}

fn encode_bytes_tail(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(encode_u64(data.len() as u64).as_slice());
    out.extend_from_slice(data);
    out.resize(out.len() + pad_len(data.len()) - data.len(), 0);
}

fn encode_tail(token: &Token) -> Vec<u8> {
    let mut out = Vec::new();
    match token {
        Token::Word(_) => {}
        Token::Bytes(data) => encode_bytes_tail(&mut out, data),
        Token::BytesArray(items) => {
            out.extend_from_slice(encode_u64(items.len() as u64).as_slice());
            let tails: Vec<Vec<u8>> = items
                .iter()
                .map(|item| {
                    let mut tail = Vec::new();
                    encode_bytes_tail(&mut tail, item);
                    tail
                })
                .collect();
            let mut offset = 32 * items.len();
            for tail in &tails {
                out.extend_from_slice(encode_u64(offset as u64).as_slice());
                offset += tail.len();
            }
            for tail in tails {
                out.extend_from_slice(&tail);
            }
        }
    }
    out
}

/// ABI-encode a parameter list (`abi.encode(...)`).
pub fn encode_params(tokens: &[Token]) -> Vec<u8> {
    let head_len = 32 * tokens.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Word(word) => head.extend_from_slice(word.as_slice()),
            dynamic => {
                debug_assert!(dynamic.is_dynamic());
                head.extend_from_slice(encode_u64((head_len + tail.len()) as u64).as_slice());
                tail.extend_from_slice(&encode_tail(dynamic));
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// ABI-encode a function call: selector followed by the encoded parameters.
pub fn encode_call(selector: [u8; 4], tokens: &[Token]) -> Bytes {
    let mut data = selector.to_vec();
    data.extend_from_slice(&encode_params(tokens));
    data.into()
}

/// Split calldata into its selector and argument bytes.
pub fn split_selector(data: &[u8]) -> Option<([u8; 4], &[u8])> {
    if data.len() < 4 {
        return None;
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&data[..4]);
    Some((selector, &data[4..]))
}

/// Read the `index`-th head word of an encoded parameter list.
pub fn word_at(params: &[u8], index: usize) -> Option<&[u8]> {
    params.get(32 * index..32 * (index + 1))
}

/// Decode a dynamic `bytes` parameter whose head sits at `index`.
pub fn decode_bytes_at(params: &[u8], index: usize) -> Option<Bytes> {
    let offset = decode_u64(word_at(params, index)?)? as usize;
    let len = decode_u64(params.get(offset..offset + 32)?)? as usize;
    let start = offset + 32;
    params.get(start..start + len).map(|slice| Bytes::copy_from_slice(slice))
}
