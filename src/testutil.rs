//! Deterministic fakes and transaction builders shared by the unit tests.

use crate::ledger::{LedgerReader, SignatureVerifier};
use crate::types::{
    Address, Asset, AssetId, Fixed8, Program, Transaction, TxAttribute, TxHash, TxInput, TxOutput,
    TxPayload,
};
use crate::validation::Validator;
use anyhow::anyhow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// In-memory stand-in for the committed ledger. Built up mutably, then
/// wrapped in an `Arc` and injected.
#[derive(Default)]
pub struct MemoryLedger {
    assets: HashMap<AssetId, Asset>,
    transactions: HashMap<TxHash, Transaction>,
    issued: HashMap<AssetId, Fixed8>,
    spent: HashSet<TxInput>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits a RegisterAsset transaction and the asset metadata it
    /// declares; returns the asset id (the registration hash).
    pub fn register_asset(&mut self, name: &str, amount: Fixed8, precision: u8) -> AssetId {
        let tx = Transaction {
            payload: TxPayload::RegisterAsset {
                name: name.to_string(),
                amount,
                precision,
            },
            inputs: vec![],
            outputs: vec![],
            attributes: vec![],
            programs: vec![],
        };
        let hash = tx.hash();
        let id = AssetId(hash.0);
        self.assets.insert(
            id,
            Asset {
                id,
                name: name.to_string(),
                amount,
                precision,
            },
        );
        self.transactions.insert(hash, tx);
        id
    }

    /// Commits a transaction producing one spendable output of the asset and
    /// returns an input referencing it. `salt` keeps hashes distinct.
    pub fn fund(&mut self, asset_id: AssetId, value: Fixed8, salt: u8) -> TxInput {
        let tx = Transaction {
            payload: TxPayload::IssueAsset,
            inputs: vec![],
            outputs: vec![output(asset_id, value)],
            attributes: vec![TxAttribute {
                usage: 0,
                data: vec![salt],
            }],
            programs: vec![],
        };
        let hash = tx.hash();
        self.transactions.insert(hash, tx);
        TxInput {
            prev_hash: hash,
            index: 0,
        }
    }

    pub fn insert_transaction(&mut self, tx: Transaction) -> TxHash {
        let hash = tx.hash();
        self.transactions.insert(hash, tx);
        hash
    }

    pub fn set_issued(&mut self, id: AssetId, amount: Fixed8) {
        self.issued.insert(id, amount);
    }

    pub fn mark_spent(&mut self, input: TxInput) {
        self.spent.insert(input);
    }
}

impl LedgerReader for MemoryLedger {
    fn get_asset(&self, id: &AssetId) -> Option<Asset> {
        self.assets.get(id).cloned()
    }

    fn get_transaction(&self, hash: &TxHash) -> Option<Transaction> {
        self.transactions.get(hash).cloned()
    }

    fn quantity_issued(&self, id: &AssetId) -> anyhow::Result<Fixed8> {
        Ok(self.issued.get(id).copied().unwrap_or(Fixed8::ZERO))
    }

    fn is_double_spend(&self, tx: &Transaction) -> bool {
        tx.inputs.iter().any(|input| self.spent.contains(input))
    }
}

/// Verifier that authorizes everything.
pub struct AcceptAll;

impl SignatureVerifier for AcceptAll {
    fn verify(&self, _signable: &[u8], _programs: &[Program]) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Verifier that authorizes nothing.
pub struct RejectAll;

impl SignatureVerifier for RejectAll {
    fn verify(&self, _signable: &[u8], _programs: &[Program]) -> anyhow::Result<bool> {
        Ok(false)
    }
}

/// Verifier whose primitive itself fails.
pub struct BrokenVerifier;

impl SignatureVerifier for BrokenVerifier {
    fn verify(&self, _signable: &[u8], _programs: &[Program]) -> anyhow::Result<bool> {
        Err(anyhow!("signature backend unavailable"))
    }
}

/// Validator over the given ledger that accepts all authorizations.
pub fn validator(ledger: Arc<MemoryLedger>) -> Validator {
    Validator::new(ledger, Arc::new(AcceptAll))
}

pub fn output(asset_id: AssetId, value: Fixed8) -> TxOutput {
    TxOutput {
        asset_id,
        value,
        recipient: Address::default(),
    }
}

pub fn transfer(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Transaction {
    Transaction {
        payload: TxPayload::TransferAsset,
        inputs,
        outputs,
        attributes: vec![],
        programs: vec![],
    }
}

/// Issue transaction for one asset. `salt` keeps hashes distinct when a test
/// needs several otherwise-identical issuances.
pub fn issue(asset_id: AssetId, value: Fixed8, salt: u8) -> Transaction {
    Transaction {
        payload: TxPayload::IssueAsset,
        inputs: vec![],
        outputs: vec![output(asset_id, value)],
        attributes: vec![TxAttribute {
            usage: 0,
            data: vec![salt],
        }],
        programs: vec![],
    }
}

pub fn bookkeeping() -> Transaction {
    Transaction {
        payload: TxPayload::BookKeeping,
        inputs: vec![],
        outputs: vec![],
        attributes: vec![],
        programs: vec![],
    }
}
