use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    chains::{self, ChainId},
    error::{AppError, Result},
    models::{ApiResponse, CanonicalTransaction, TransactionBatch, TxStatus, TxType},
    services::{export_file_name, to_csv},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub chain: String,
    pub address: String,
    #[serde(default)]
    pub transactions: Vec<ExportRecord>,
}

/// A record as the client holds it. `type` stays free-form so kinds outside
/// the known vocabulary still export, tagged as a plain outbound transfer.
#[derive(Debug, Deserialize)]
pub struct ExportRecord {
    #[serde(default)]
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub fee: String,
    #[serde(rename = "type", default)]
    pub tx_type: String,
    pub status: TxStatus,
}

impl From<ExportRecord> for CanonicalTransaction {
    fn from(record: ExportRecord) -> Self {
        CanonicalTransaction {
            hash: record.hash,
            timestamp: record.timestamp,
            from: record.from,
            to: record.to,
            amount: record.amount,
            token: record.token,
            fee: record.fee,
            tx_type: TxType::from_str(&record.tx_type).unwrap_or(TxType::Transfer),
            status: record.status,
        }
    }
}

// "All" and an empty value both mean no filter.
fn parse_type_filter(raw: Option<&str>) -> Result<Option<TxType>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => TxType::from_str(value).map(Some).map_err(AppError::BadRequest),
    }
}

/// GET /api/v1/chains/{chain}/transactions/{address}
pub async fn get_history(
    State(state): State<AppState>,
    Path((chain, address)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<TransactionBatch>>> {
    let chain = ChainId::from_str(&chain)?;
    let tx_type = parse_type_filter(query.tx_type.as_deref())?;

    let batch = state.history.fetch_batch(chain, &address, tx_type).await?;
    Ok(Json(ApiResponse::success(batch)))
}

/// POST /api/v1/transactions/export
///
/// Renders the records the client currently holds; nothing is re-fetched.
pub async fn export_csv(
    State(_state): State<AppState>,
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let chain = ChainId::from_str(&request.chain)?;
    let descriptor = chains::descriptor(chain);

    let transactions: Vec<CanonicalTransaction> =
        request.transactions.into_iter().map(Into::into).collect();
    let csv = to_csv(&transactions);
    let file_name = export_file_name(descriptor.ticker, &request.address);
    tracing::debug!(
        "Exporting {} {} records as {}",
        transactions.len(),
        descriptor.ticker,
        file_name
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_filter_all_or_missing_is_none() {
        // Memastikan "All" dan kosong tidak memfilter
        assert_eq!(parse_type_filter(None).unwrap(), None);
        assert_eq!(parse_type_filter(Some("")).unwrap(), None);
        assert_eq!(parse_type_filter(Some("All")).unwrap(), None);
    }

    #[test]
    fn type_filter_parses_display_names() {
        assert_eq!(
            parse_type_filter(Some("claim rewards")).unwrap(),
            Some(TxType::ClaimRewards)
        );
        assert_eq!(parse_type_filter(Some("Send")).unwrap(), Some(TxType::Send));
    }

    #[test]
    fn export_record_with_unknown_type_becomes_transfer() {
        // Memastikan tipe di luar kosakata diekspor sebagai Transfer
        let record: ExportRecord = serde_json::from_value(serde_json::json!({
            "hash": "0xmint",
            "timestamp": "2024-01-01T00:00:00Z",
            "amount": "1.000000",
            "token": "BNB",
            "type": "Mint",
            "status": "Success"
        }))
        .unwrap();
        let tx = CanonicalTransaction::from(record);
        assert_eq!(tx.tx_type, TxType::Transfer);
        assert_eq!(tx.fee, "");

        let known: ExportRecord = serde_json::from_value(serde_json::json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "type": "IBC Transfer",
            "status": "Failed"
        }))
        .unwrap();
        assert_eq!(CanonicalTransaction::from(known).tx_type, TxType::IbcTransfer);
    }

    #[test]
    fn type_filter_rejects_unknown_type() {
        // Memastikan tipe tidak dikenal menjadi BadRequest
        assert!(matches!(
            parse_type_filter(Some("Mint")),
            Err(AppError::BadRequest(_))
        ));
    }
}
