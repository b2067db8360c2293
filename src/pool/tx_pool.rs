use crate::types::{Transaction, TxHash, ValidationError};
use crate::validation::Validator;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// The pending set: transaction hash to transaction, plus a count mirror.
/// Only ever touched with the pool lock held.
#[derive(Default)]
struct PoolInner {
    entries: HashMap<TxHash, Transaction>,
    count: u64,
}

/// Concurrent pool of admitted-but-unconfirmed transactions.
///
/// One read/write lock guards the map: many concurrent readers or one
/// exclusive writer. The expensive validation work (ledger lookups,
/// signature verification) runs before the lock is taken, so a slow
/// submission never blocks readers; the pool-relative check is then re-run
/// under the exclusive lock against the state current at insertion time.
pub struct TxPool {
    validator: Validator,
    inner: RwLock<PoolInner>,
}

impl TxPool {
    /// Creates an empty pool admitting through the given validator.
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            inner: RwLock::new(PoolInner::default()),
        }
    }

    /// Read-locked lookup of a pending transaction.
    pub fn get(&self, hash: &TxHash) -> Option<Transaction> {
        self.inner.read().entries.get(hash).cloned()
    }

    /// Number of pending transactions.
    pub fn len(&self) -> u64 {
        self.inner.read().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The admission entry point: validate, then insert if everything holds.
    ///
    /// Returns whether the transaction was admitted; the specific rejection
    /// is logged. Callers that need the error kind use [`TxPool::try_append`].
    pub fn append(&self, tx: Transaction) -> bool {
        let hash = tx.hash();
        match self.try_append(tx) {
            Ok(()) => true,
            Err(err) => {
                warn!(tx_hash = %hash, error = %err, "transaction rejected");
                false
            }
        }
    }

    /// Same admission path as [`TxPool::append`], surfacing the rejection.
    ///
    /// Two phases: the self-consistency and ledger checks run without the
    /// pool lock; the pool-relative check then runs under the exclusive
    /// lock, against the live map, immediately before insertion. Re-checking
    /// under the same hold closes the race between validation and insertion.
    pub fn try_append(&self, tx: Transaction) -> Result<(), ValidationError> {
        self.validator.verify_transaction(&tx)?;
        self.validator.verify_with_ledger(&tx)?;

        let mut inner = self.inner.write();
        self.validator.verify_with_pool(&tx, &inner.entries)?;
        inner.entries.insert(tx.hash(), tx);
        inner.count += 1;
        Ok(())
    }

    /// Value copy of the current pending set, for block assembly. With
    /// `clear` the pool is reset to empty before the lock is released, so
    /// the copy and the reset are one atomic step.
    pub fn snapshot(&self, clear: bool) -> HashMap<TxHash, Transaction> {
        let mut inner = self.inner.write();
        let copy = inner.entries.clone();
        if clear {
            inner.entries.clear();
            inner.count = 0;
        }
        copy
    }

    /// Drops every pending transaction confirmed by a committed block.
    ///
    /// Index 0 is the block's bookkeeping transaction and is skipped. A
    /// removal count that does not match the block is only a diagnostic:
    /// the block is already committed and irreversible, so the pool's
    /// bookkeeping stays best-effort.
    pub fn clean_confirmed(&self, confirmed: &[Transaction]) {
        let mut inner = self.inner.write();

        let mut cleaned = 0usize;
        for tx in confirmed.iter().skip(1) {
            if inner.entries.remove(&tx.hash()).is_some() {
                cleaned += 1;
            }
        }
        inner.count = inner.entries.len() as u64;

        if confirmed.len().saturating_sub(cleaned) != 1 {
            info!(
                confirmed = confirmed.len(),
                cleaned, "cleanup count mismatch: block carried transactions the pool never held"
            );
        }
        debug!(
            confirmed = confirmed.len(),
            cleaned,
            remaining = inner.count,
            "removed confirmed transactions from pool"
        );
    }
}
