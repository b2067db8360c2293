//! Injected collaborator contracts.
//!
//! The admission core never owns committed chain state or the signature
//! primitive; both are reached through these traits. Handing them in as
//! capabilities keeps the validator a pure function of its inputs and lets
//! tests supply deterministic fakes.

use crate::{Asset, AssetId, Fixed8, Program, Transaction, TxHash};

/// Read-only view of committed chain state.
pub trait LedgerReader: Send + Sync {
    /// Metadata of a registered asset, or `None` if the asset is unknown.
    fn get_asset(&self, id: &AssetId) -> Option<Asset>;

    /// A committed transaction by hash, or `None` if not on chain.
    fn get_transaction(&self, hash: &TxHash) -> Option<Transaction>;

    /// Total quantity of the asset already issued on chain. Errors are
    /// opaque storage failures, not a statement about the asset.
    fn quantity_issued(&self, id: &AssetId) -> anyhow::Result<Fixed8>;

    /// Whether any input of `tx` is already spent in committed history.
    fn is_double_spend(&self, tx: &Transaction) -> bool;
}

/// Authorization check over a transaction's signable payload.
pub trait SignatureVerifier: Send + Sync {
    /// Returns whether the attached programs authorize the payload. An error
    /// counts as a failed verification for admission purposes.
    fn verify(&self, signable: &[u8], programs: &[Program]) -> anyhow::Result<bool>;
}
