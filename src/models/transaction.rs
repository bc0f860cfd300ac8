use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== TYPE / STATUS ====================

/// Closed vocabulary of transaction kinds shown in the UI and the CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    Send,
    Receive,
    Swap,
    Delegate,
    Undelegate,
    #[serde(rename = "Claim Rewards")]
    ClaimRewards,
    #[serde(rename = "IBC Transfer")]
    IbcTransfer,
    Transfer,
    #[serde(rename = "Failed Tx")]
    FailedTx,
}

impl TxType {
    pub const ALL: [TxType; 9] = [
        TxType::Send,
        TxType::Receive,
        TxType::Swap,
        TxType::Delegate,
        TxType::Undelegate,
        TxType::ClaimRewards,
        TxType::IbcTransfer,
        TxType::Transfer,
        TxType::FailedTx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Send => "Send",
            TxType::Receive => "Receive",
            TxType::Swap => "Swap",
            TxType::Delegate => "Delegate",
            TxType::Undelegate => "Undelegate",
            TxType::ClaimRewards => "Claim Rewards",
            TxType::IbcTransfer => "IBC Transfer",
            TxType::Transfer => "Transfer",
            TxType::FailedTx => "Failed Tx",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TxType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown transaction type: {}", wanted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Failed,
}

impl TxStatus {
    pub fn from_success(ok: bool) -> Self {
        if ok {
            TxStatus::Success
        } else {
            TxStatus::Failed
        }
    }
}

// ==================== TRANSACTION ====================

/// The record every chain-specific response is normalized into.
///
/// All nine fields are always populated; placeholders stand in for data the
/// upstream does not expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    /// Empty when the upstream omits it.
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub token: String,
    pub fee: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub status: TxStatus,
}

// ==================== BATCH ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Distinct types in first-seen order, used for the filter pills.
    pub types: Vec<TxType>,
}

/// One search result. `chain` and `address` are echoed back so a client
/// can drop a response that belongs to an older search.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionBatch {
    pub chain: String,
    pub ticker: String,
    pub address: String,
    pub summary: TransactionSummary,
    pub transactions: Vec<CanonicalTransaction>,
}
