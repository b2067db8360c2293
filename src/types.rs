//! Core data types shared across the admission layer: fixed-point values,
//! identifiers, transactions, assets, blocks and the validation error taxonomy.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

/// Fixed-point value: an integer amount scaled by 10^8.
///
/// All asset values on outputs use this representation so that decimal
/// quantities never touch floating point. Negative values are legal; a
/// negative declared amount on a RegisterAsset payload means unlimited
/// issuance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fixed8(i64);

impl Fixed8 {
    pub const ZERO: Fixed8 = Fixed8(0);
    /// One whole unit: 10^8.
    pub const ONE: Fixed8 = Fixed8(100_000_000);
    /// Number of decimal digits carried below the unit.
    pub const DECIMALS: u32 = 8;

    /// Wrap an already-scaled raw amount.
    pub const fn from_raw(raw: i64) -> Self {
        Fixed8(raw)
    }

    /// Scale a whole-unit amount up by 10^8.
    pub const fn from_units(units: i64) -> Self {
        Fixed8(units * Fixed8::ONE.0)
    }

    /// The underlying scaled integer.
    pub const fn raw(&self) -> i64 {
        self.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for Fixed8 {
    type Output = Fixed8;
    fn add(self, rhs: Fixed8) -> Fixed8 {
        Fixed8(self.0 + rhs.0)
    }
}

impl AddAssign for Fixed8 {
    fn add_assign(&mut self, rhs: Fixed8) {
        self.0 += rhs.0;
    }
}

impl Sub for Fixed8 {
    type Output = Fixed8;
    fn sub(self, rhs: Fixed8) -> Fixed8 {
        Fixed8(self.0 - rhs.0)
    }
}

impl SubAssign for Fixed8 {
    fn sub_assign(&mut self, rhs: Fixed8) {
        self.0 -= rhs.0;
    }
}

impl Neg for Fixed8 {
    type Output = Fixed8;
    fn neg(self) -> Fixed8 {
        Fixed8(-self.0)
    }
}

impl Sum for Fixed8 {
    fn sum<I: Iterator<Item = Fixed8>>(iter: I) -> Fixed8 {
        iter.fold(Fixed8::ZERO, Add::add)
    }
}

impl fmt::Display for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:08}",
            sign,
            abs / Fixed8::ONE.0 as u64,
            abs % Fixed8::ONE.0 as u64
        )
    }
}

/// Content hash identifying a transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

/// Identifier of a registered asset.
///
/// By construction an asset id equals the hash of the RegisterAsset
/// transaction that created the asset, so the issuance-cap check can look the
/// registration up through [`TxHash::from`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub [u8; 32]);

/// Recipient program hash carried on an output.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl From<AssetId> for TxHash {
    fn from(id: AssetId) -> TxHash {
        TxHash(id.0)
    }
}

macro_rules! hex_display {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }
    };
}

hex_display!(TxHash);
hex_display!(AssetId);
hex_display!(Address);

/// Reference to a previously produced output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxInput {
    /// Hash of the producing transaction.
    pub prev_hash: TxHash,
    /// Position of the output in the producing transaction.
    pub index: u16,
}

impl fmt::Display for TxInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prev_hash, self.index)
    }
}

/// Output created by a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub asset_id: AssetId,
    pub value: Fixed8,
    pub recipient: Address,
}

/// Free-form transaction attribute, consumed by the attribute-policy
/// extension point of the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAttribute {
    pub usage: u8,
    pub data: Vec<u8>,
}

/// Authorization program attached to a transaction. Only the injected
/// signature verifier interprets these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub code: Vec<u8>,
    pub parameter: Vec<u8>,
}

/// Type-specific payload. The closed set of transaction kinds is matched
/// exhaustively everywhere, so a payload can never be interpreted under the
/// wrong kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPayload {
    /// Block bookkeeping/generation transaction; first in every block.
    BookKeeping,
    /// Declares a new asset. A negative `amount` means unlimited issuance;
    /// `precision` is the number of significant decimal digits (0..=8).
    RegisterAsset {
        name: String,
        amount: Fixed8,
        precision: u8,
    },
    /// Mints outputs of an already-registered asset, bounded by its cap.
    IssueAsset,
    /// Plain value transfer.
    TransferAsset,
}

impl TxPayload {
    /// Whether this kind creates value out of nothing. Minting kinds are
    /// exempt from the zero-net balance requirement; the issuance-cap and
    /// ledger checks bound them instead.
    pub fn mints_value(&self) -> bool {
        matches!(
            self,
            TxPayload::BookKeeping | TxPayload::RegisterAsset { .. } | TxPayload::IssueAsset
        )
    }
}

/// A transaction as submitted for admission. Immutable once constructed;
/// identified by the content hash of its signable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub payload: TxPayload,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub attributes: Vec<TxAttribute>,
    pub programs: Vec<Program>,
}

impl Transaction {
    /// Content hash: double SHA-256 over the signable byte encoding.
    pub fn hash(&self) -> TxHash {
        let first = Sha256::digest(self.signable_bytes());
        let second = Sha256::digest(first);
        TxHash(second.into())
    }

    /// Canonical byte encoding of every field except the authorization
    /// programs. This is both the hashing preimage and the payload the
    /// signature verifier checks the programs against.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();

        // Payload tag, then payload fields
        match &self.payload {
            TxPayload::BookKeeping => data.push(0x00),
            TxPayload::IssueAsset => data.push(0x01),
            TxPayload::TransferAsset => data.push(0x10),
            TxPayload::RegisterAsset {
                name,
                amount,
                precision,
            } => {
                data.push(0x40);
                push_bytes(&mut data, name.as_bytes());
                data.extend_from_slice(&amount.raw().to_be_bytes());
                data.push(*precision);
            }
        }

        // Attributes
        data.extend_from_slice(&(self.attributes.len() as u32).to_be_bytes());
        for attr in &self.attributes {
            data.push(attr.usage);
            push_bytes(&mut data, &attr.data);
        }

        // Inputs
        data.extend_from_slice(&(self.inputs.len() as u32).to_be_bytes());
        for input in &self.inputs {
            data.extend_from_slice(&input.prev_hash.0);
            data.extend_from_slice(&input.index.to_be_bytes());
        }

        // Outputs
        data.extend_from_slice(&(self.outputs.len() as u32).to_be_bytes());
        for output in &self.outputs {
            data.extend_from_slice(&output.asset_id.0);
            data.extend_from_slice(&output.value.raw().to_be_bytes());
            data.extend_from_slice(&output.recipient.0);
        }

        data
    }

    /// Merged per-asset output value. The issuance-cap check sums these over
    /// the pending pool.
    pub fn output_totals(&self) -> HashMap<AssetId, Fixed8> {
        let mut totals = HashMap::new();
        for output in &self.outputs {
            *totals.entry(output.asset_id).or_insert(Fixed8::ZERO) += output.value;
        }
        totals
    }

    pub fn is_issue(&self) -> bool {
        matches!(self.payload, TxPayload::IssueAsset)
    }

    pub fn is_bookkeeping(&self) -> bool {
        matches!(self.payload, TxPayload::BookKeeping)
    }
}

/// Length-prefixed byte-string encoding used by `signable_bytes`.
fn push_bytes(data: &mut Vec<u8>, bytes: &[u8]) {
    data.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    data.extend_from_slice(bytes);
}

/// Registered asset metadata as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    /// Declared issuance cap; negative means unlimited.
    pub amount: Fixed8,
    /// Significant decimal digits, 0..=8. Output values of the asset must be
    /// multiples of 10^(8 - precision).
    pub precision: u8,
}

impl Asset {
    pub const MAX_PRECISION: u8 = 8;
}

/// Committed block, as handed to the pool for cleanup. The transaction at
/// index 0 is the bookkeeping transaction and is never expected to have been
/// pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub transactions: Vec<Transaction>,
}

/// Reasons a transaction is refused admission.
///
/// Every check fails fast with one of these; a failed submission never
/// mutates the pool and is never retried internally. The cleanup count
/// mismatch after a block commit is deliberately not represented here: it is
/// a log-only diagnostic, not a rejection.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("two inputs reference the same output")]
    DuplicateInput,

    #[error("asset {0} is not registered on the ledger")]
    AssetNotFound(AssetId),

    #[error("output value {value} breaks the precision of asset {asset_id}")]
    PrecisionViolation { asset_id: AssetId, value: Fixed8 },

    #[error("inputs and outputs of asset {asset_id} do not balance in transaction {tx_hash}")]
    BalanceMismatch { asset_id: AssetId, tx_hash: TxHash },

    #[error("input {0} does not resolve to a known output")]
    UnknownInput(TxInput),

    #[error("authorization programs failed verification")]
    SignatureInvalid,

    #[error("transaction {0} registered the asset but is not a RegisterAsset")]
    IllegalTxType(TxHash),

    #[error("issuing would exceed the registered cap of asset {asset_id}")]
    IssuanceCapExceeded { asset_id: AssetId },

    #[error("transaction {0} is already pending in the pool")]
    DuplicatePoolHash(TxHash),

    #[error("input {0} is already spent by a pending transaction")]
    DuplicateUtxoInPool(TxInput),

    #[error("transaction {0} spends an output already spent on chain")]
    LedgerDoubleSpend(TxHash),

    #[error("ledger query failed")]
    Ledger(#[source] anyhow::Error),
}
