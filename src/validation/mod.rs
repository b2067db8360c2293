//! Transaction Validation Module
//!
//! Stateless checks a transaction must pass before entering the pool:
//! - self-consistency (duplicate inputs, asset precision, value balance,
//!   attributes, authorization)
//! - ledger-relative (committed double spends)
//! - pool-relative (duplicate hash, pending double spends, issuance caps)

mod validator;


pub use validator::Validator;
