pub mod awaken_csv;
pub mod transaction_history;

// Re-export for convenience
pub use awaken_csv::{export_file_name, to_csv};
pub use transaction_history::TransactionHistoryService;
