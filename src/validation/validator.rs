use crate::ledger::{LedgerReader, SignatureVerifier};
use crate::types::{
    Asset, AssetId, Fixed8, Transaction, TxHash, TxOutput, TxPayload, ValidationError,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Stateless validation pipeline over a single transaction.
///
/// The validator holds no mutable state of its own; every entry point is a
/// pure function of the transaction, the injected ledger view and, for the
/// pool-relative check, an explicit snapshot of the pending set.
pub struct Validator {
    ledger: Arc<dyn LedgerReader>,
    signatures: Arc<dyn SignatureVerifier>,
}

impl Validator {
    pub fn new(ledger: Arc<dyn LedgerReader>, signatures: Arc<dyn SignatureVerifier>) -> Self {
        Self { ledger, signatures }
    }

    /// Self-consistency pipeline, short-circuiting on the first failure.
    pub fn verify_transaction(&self, tx: &Transaction) -> Result<(), ValidationError> {
        // 1. No two inputs may reference the same output
        check_duplicate_input(tx)?;

        // 2. Output values must respect each asset's registered precision
        self.check_asset_precision(tx)?;

        // 3. Resolved inputs and outputs must balance per asset
        self.check_balance(tx)?;

        // 4. Attribute policy (accept-all extension point)
        check_attribute_program(tx)?;

        // 5. Authorization programs must verify against the signable payload
        self.check_contracts(tx)?;

        Ok(())
    }

    /// Pool-relative check against a frozen snapshot of the pending set.
    ///
    /// The snapshot must not contain `tx` itself; `TxPool::append` calls this
    /// under its exclusive lock before inserting.
    pub fn verify_with_pool(
        &self,
        tx: &Transaction,
        snapshot: &HashMap<TxHash, Transaction>,
    ) -> Result<(), ValidationError> {
        self.check_duplicate_with_pool(tx, snapshot)?;

        if tx.is_issue() {
            self.check_issuance_cap(tx, snapshot)?;
        }

        Ok(())
    }

    /// Ledger-relative check: none of the inputs may already be spent in
    /// committed history.
    pub fn verify_with_ledger(&self, tx: &Transaction) -> Result<(), ValidationError> {
        if self.ledger.is_double_spend(tx) {
            return Err(ValidationError::LedgerDoubleSpend(tx.hash()));
        }
        Ok(())
    }

    /// Every output value must be a multiple of 10^(8 - precision) for its
    /// asset.
    fn check_asset_precision(&self, tx: &Transaction) -> Result<(), ValidationError> {
        // Group outputs by asset so each asset is fetched once
        let mut by_asset: HashMap<AssetId, Vec<&TxOutput>> = HashMap::new();
        for output in &tx.outputs {
            by_asset.entry(output.asset_id).or_default().push(output);
        }

        for (asset_id, outputs) in by_asset {
            let asset = self
                .ledger
                .get_asset(&asset_id)
                .ok_or(ValidationError::AssetNotFound(asset_id))?;
            let precision = u32::from(asset.precision.min(Asset::MAX_PRECISION));
            let modulus = 10_i64.pow(Fixed8::DECIMALS - precision);
            for output in outputs {
                if output.value.raw() % modulus != 0 {
                    return Err(ValidationError::PrecisionViolation {
                        asset_id,
                        value: output.value,
                    });
                }
            }
        }

        Ok(())
    }

    /// The net of resolved input values minus output values must be zero for
    /// every asset the transaction touches.
    ///
    /// Minting kinds (bookkeeping, registration, issuance) are exempt: their
    /// outputs exist precisely to create value, and the issuance-cap and
    /// ledger checks bound what they may create.
    fn check_balance(&self, tx: &Transaction) -> Result<(), ValidationError> {
        if tx.payload.mints_value() {
            return Ok(());
        }

        for (asset_id, net) in self.transaction_results(tx)? {
            if !net.is_zero() {
                let tx_hash = tx.hash();
                debug!(%asset_id, %tx_hash, %net, "input/output values do not balance");
                return Err(ValidationError::BalanceMismatch { asset_id, tx_hash });
            }
        }

        Ok(())
    }

    /// Per-asset net effect: resolved input values added, output values
    /// subtracted. Spend resolution goes through the ledger's committed
    /// transactions.
    fn transaction_results(
        &self,
        tx: &Transaction,
    ) -> Result<HashMap<AssetId, Fixed8>, ValidationError> {
        let mut results: HashMap<AssetId, Fixed8> = HashMap::new();

        for input in &tx.inputs {
            let producer = self
                .ledger
                .get_transaction(&input.prev_hash)
                .ok_or(ValidationError::UnknownInput(*input))?;
            let spent = producer
                .outputs
                .get(input.index as usize)
                .ok_or(ValidationError::UnknownInput(*input))?;
            *results.entry(spent.asset_id).or_insert(Fixed8::ZERO) += spent.value;
        }

        for output in &tx.outputs {
            *results.entry(output.asset_id).or_insert(Fixed8::ZERO) -= output.value;
        }

        Ok(results)
    }

    /// Delegate authorization to the injected verifier. A `false` result and
    /// a verifier error both reject the transaction.
    fn check_contracts(&self, tx: &Transaction) -> Result<(), ValidationError> {
        match self.signatures.verify(&tx.signable_bytes(), &tx.programs) {
            Ok(true) => Ok(()),
            Ok(false) => Err(ValidationError::SignatureInvalid),
            Err(err) => {
                debug!(tx_hash = %tx.hash(), error = %err, "signature verifier failed");
                Err(ValidationError::SignatureInvalid)
            }
        }
    }

    /// Reject a hash already pending, and any input already claimed by a
    /// distinct pending transaction.
    fn check_duplicate_with_pool(
        &self,
        tx: &Transaction,
        snapshot: &HashMap<TxHash, Transaction>,
    ) -> Result<(), ValidationError> {
        let hash = tx.hash();
        if snapshot.contains_key(&hash) {
            return Err(ValidationError::DuplicatePoolHash(hash));
        }

        // Same-hash entries were rejected above, so every remaining snapshot
        // member is a distinct transaction
        let claimed: HashSet<_> = snapshot
            .values()
            .flat_map(|pending| pending.inputs.iter().copied())
            .collect();
        for input in &tx.inputs {
            if claimed.contains(input) {
                return Err(ValidationError::DuplicateUtxoInPool(*input));
            }
        }

        Ok(())
    }

    /// For an issuance: already-issued quantity plus everything pending
    /// (including this transaction's own outputs) must stay within the
    /// registered cap of each issued asset.
    fn check_issuance_cap(
        &self,
        tx: &Transaction,
        snapshot: &HashMap<TxHash, Transaction>,
    ) -> Result<(), ValidationError> {
        for (asset_id, own) in tx.output_totals() {
            // The asset id is the hash of its registering transaction
            let reg_hash = TxHash::from(asset_id);
            let registration = self
                .ledger
                .get_transaction(&reg_hash)
                .ok_or(ValidationError::AssetNotFound(asset_id))?;
            let declared = match registration.payload {
                TxPayload::RegisterAsset { amount, .. } => amount,
                _ => return Err(ValidationError::IllegalTxType(reg_hash)),
            };

            // Negative declared amount: unlimited issuance
            if declared.is_negative() {
                continue;
            }

            let issued = self
                .ledger
                .quantity_issued(&asset_id)
                .map_err(ValidationError::Ledger)?;

            // Pending issuance for this asset: every issue-typed transaction
            // already in the snapshot, plus this submission's own outputs
            let mut pending = own;
            for member in snapshot.values() {
                if member.is_issue() {
                    if let Some(value) = member.output_totals().get(&asset_id) {
                        pending += *value;
                    }
                }
            }

            if declared - issued < pending {
                return Err(ValidationError::IssuanceCapExceeded { asset_id });
            }
        }

        Ok(())
    }
}

/// Pairwise scan of a transaction's own inputs. Input counts are small per
/// transaction, so the quadratic scan is fine.
fn check_duplicate_input(tx: &Transaction) -> Result<(), ValidationError> {
    for (i, input) in tx.inputs.iter().enumerate() {
        if tx.inputs[..i].contains(input) {
            return Err(ValidationError::DuplicateInput);
        }
    }
    Ok(())
}

/// Attribute/program structural policy. Accepts everything today; kept as a
/// named step so a policy can slot in without reshaping the pipeline.
fn check_attribute_program(_tx: &Transaction) -> Result<(), ValidationError> {
    Ok(())
}
