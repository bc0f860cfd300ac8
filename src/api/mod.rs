// src/api/mod.rs

pub mod chains;
pub mod health;
pub mod transactions;

use std::sync::Arc;

use crate::config::Config;
use crate::services::TransactionHistoryService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub history: Arc<TransactionHistoryService>,
}
