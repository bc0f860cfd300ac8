use std::sync::Arc;

use chrono::Utc;

use crate::{
    chains::{self, ChainEndpoints, ChainId, NormalizeContext, RequestContext},
    error::{AppError, Result},
    integrations::HttpTransport,
    models::{CanonicalTransaction, TransactionBatch, TransactionSummary, TxStatus, TxType},
    utils::clamp_page_limit,
};

/// Keep only records of the given type; `None` means "All".
pub fn filter_by_type(
    transactions: &[CanonicalTransaction],
    tx_type: Option<TxType>,
) -> Vec<CanonicalTransaction> {
    match tx_type {
        None => transactions.to_vec(),
        Some(wanted) => transactions
            .iter()
            .filter(|tx| tx.tx_type == wanted)
            .cloned()
            .collect(),
    }
}

/// Badge counts plus the distinct types in first-seen order.
pub fn summarize(transactions: &[CanonicalTransaction]) -> TransactionSummary {
    let mut types = Vec::new();
    for tx in transactions {
        if !types.contains(&tx.tx_type) {
            types.push(tx.tx_type);
        }
    }
    let succeeded = transactions
        .iter()
        .filter(|tx| tx.status == TxStatus::Success)
        .count();

    TransactionSummary {
        total: transactions.len(),
        succeeded,
        failed: transactions.len() - succeeded,
        types,
    }
}

pub struct TransactionHistoryService {
    transport: Arc<dyn HttpTransport>,
    endpoints: ChainEndpoints,
    page_limit: u32,
}

impl TransactionHistoryService {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: ChainEndpoints, page_limit: u32) -> Self {
        Self {
            transport,
            endpoints,
            page_limit: clamp_page_limit(page_limit),
        }
    }

    pub fn endpoints(&self) -> &ChainEndpoints {
        &self.endpoints
    }

    /// Fetch and normalize the most recent page of history for `address`.
    ///
    /// # Arguments
    /// * `chain` - registry key of the network to query.
    /// * `address` - wallet address; trimmed, never validated locally.
    ///
    /// # Returns
    /// * `Ok(records)` newest first, at most one page.
    /// * `Err(AppError)` with `Network`, `Upstream`, `EmptyResult` or `UnsupportedChain`.
    ///
    /// # Notes
    /// * Unsupported chains fail before any network call. No retries.
    pub async fn fetch(&self, chain: ChainId, address: &str) -> Result<Vec<CanonicalTransaction>> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::BadRequest("Wallet address is required".to_string()));
        }

        let descriptor = chains::descriptor(chain);
        let request_ctx = RequestContext {
            descriptor,
            endpoint: (descriptor.endpoint)(&self.endpoints),
            address,
            limit: self.page_limit,
        };
        let request = (descriptor.build_request)(&request_ctx)?;

        tracing::info!(
            "Fetching {} history for {} via {}",
            descriptor.name,
            address,
            request.source()
        );
        let raw = self.transport.execute(request).await.inspect_err(|e| {
            tracing::warn!("{} fetch failed: {}", descriptor.name, e);
        })?;

        let normalize_ctx = NormalizeContext::new(descriptor, address, Utc::now());
        let transactions = (descriptor.normalize)(&raw, &normalize_ctx)?;
        tracing::debug!(
            "Normalized {} {} transactions",
            transactions.len(),
            descriptor.ticker
        );

        Ok(transactions)
    }

    /// `fetch` plus the summary and type filter the results view needs.
    pub async fn fetch_batch(
        &self,
        chain: ChainId,
        address: &str,
        tx_type: Option<TxType>,
    ) -> Result<TransactionBatch> {
        let transactions = self.fetch(chain, address).await?;
        let descriptor = chains::descriptor(chain);

        Ok(TransactionBatch {
            chain: chain.to_string(),
            ticker: descriptor.ticker.to_string(),
            address: address.trim().to_string(),
            summary: summarize(&transactions),
            transactions: filter_by_type(&transactions, tx_type),
        })
    }
}
