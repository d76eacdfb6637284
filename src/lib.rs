//! # Switchboard Coordinator
//!
//! Off-chain coordinator for a cross-chain messaging protocol. It wires each chain's
//! Socket to its switchboards for every sibling chain, keeps the deployment address
//! registry in sync with what is on chain, and seals outbound packets by signing
//! their attestation digest and submitting it to the notary.

pub mod abi;
pub mod capacitor;
pub mod chains;
pub mod cli;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod output;
pub mod packet;
pub mod registry;
pub mod rpc;
pub mod seal;
pub mod signer;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;
