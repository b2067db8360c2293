//! Transaction-admission core for a UTXO asset chain.
//!
//! Decides whether a candidate transaction may enter the node's pending pool:
//! structural self-consistency, asset-precision and value-balance rules,
//! issuance caps, and double-spend freedom against both committed history and
//! everything currently pending. Networking, persistent storage and consensus
//! live outside this crate and reach it through [`pool::TxPool`] and the
//! [`ledger`] traits.

pub mod types; // Data model: values, identifiers, transactions, assets, blocks, errors.
pub mod ledger; // Injected collaborator traits for chain state and signatures.
pub mod validation; // The stateless per-transaction validation pipeline.
pub mod pool; // The concurrent pending-transaction pool.

#[cfg(test)]
pub(crate) mod testutil;

// Re-export the surface collaborators actually touch.
pub use ledger::{LedgerReader, SignatureVerifier};
pub use pool::TxPool;
pub use types::*;
pub use validation::Validator;
