// src/models/mod.rs
pub mod response;
pub mod transaction;

pub use response::ApiResponse;
pub use transaction::{
    CanonicalTransaction,
    TransactionBatch,
    TransactionSummary,
    TxStatus,
    TxType,
};
