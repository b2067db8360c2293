//! Transaction Pool Module
//!
//! The only mutable shared state in the admission core: the set of
//! transactions admitted but not yet confirmed in a block. Submissions,
//! peer lookups, block assembly and post-commit cleanup all go through the
//! pool's operations; nothing else touches the map.

mod tx_pool;


pub use tx_pool::TxPool;
