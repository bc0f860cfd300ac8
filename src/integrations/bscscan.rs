//! BscScan `account/txlist`. Usable only with a caller-supplied API key.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::{
    chains::{NormalizeContext, RequestContext},
    constants::{DISPLAY_FRACTION_DIGITS, PLACEHOLDER_DASH},
    error::{AppError, Result},
    integrations::http::ChainRequest,
    models::{CanonicalTransaction, TxStatus, TxType},
    utils::{format_base_units, parse_timestamp_value},
};

const SOURCE: &str = "BscScan";

pub const MISSING_KEY_MESSAGE: &str = "BscScan requires your own API key. Get a free one at https://bscscan.com/apis, then set BSCSCAN_API_KEY and restart the server.";

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: Option<String>,
    message: Option<String>,
    result: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvmTx {
    hash: Option<String>,
    time_stamp: Option<Value>,
    from: Option<String>,
    to: Option<String>,
    value: Option<String>,
    gas_used: Option<String>,
    gas_price: Option<String>,
    is_error: Option<String>,
    #[serde(rename = "txreceipt_status")]
    receipt_status: Option<String>,
}

pub fn build_request(ctx: &RequestContext<'_>) -> Result<ChainRequest> {
    let api_key = ctx
        .endpoint
        .api_key
        .ok_or_else(|| AppError::UnsupportedChain(MISSING_KEY_MESSAGE.to_string()))?;

    let mut url = Url::parse(ctx.endpoint.base_url.trim())
        .map_err(|e| AppError::Internal(format!("Invalid BscScan URL: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("module", "account")
        .append_pair("action", "txlist")
        .append_pair("address", ctx.address)
        .append_pair("startblock", "0")
        .append_pair("endblock", "99999999")
        .append_pair("page", "1")
        .append_pair("offset", &ctx.limit.to_string())
        .append_pair("sort", "desc")
        .append_pair("apikey", api_key);

    Ok(ChainRequest::Get {
        source: SOURCE,
        url,
    })
}

pub fn normalize(raw: &Value, ctx: &NormalizeContext<'_>) -> Result<Vec<CanonicalTransaction>> {
    let response = TxListResponse::deserialize(raw).map_err(|e| {
        AppError::Upstream(format!("{} returned an unexpected response: {}", SOURCE, e))
    })?;

    let entries: Vec<EvmTx> = match response.result {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| EvmTx::deserialize(item).unwrap_or_default())
            .collect(),
        Some(Value::String(detail)) if response.status.as_deref() == Some("0") => {
            let message = response.message.unwrap_or_default();
            if message.to_ascii_lowercase().contains("no transactions") {
                return Err(empty_result());
            }
            return Err(AppError::Upstream(format!("{}: {}", SOURCE, detail)));
        }
        _ => return Err(empty_result()),
    };

    Ok(entries.iter().map(|tx| normalize_tx(tx, ctx)).collect())
}

fn empty_result() -> AppError {
    AppError::EmptyResult(
        "No transactions found. Try a different address with activity on this chain.".to_string(),
    )
}

// gasUsed * gasPrice, in wei
fn fee_wei(tx: &EvmTx) -> Option<u128> {
    let used = tx.gas_used.as_deref()?.trim().parse::<u128>().ok()?;
    let price = tx.gas_price.as_deref()?.trim().parse::<u128>().ok()?;
    used.checked_mul(price)
}

fn normalize_tx(tx: &EvmTx, ctx: &NormalizeContext<'_>) -> CanonicalTransaction {
    let decimals = ctx.descriptor.decimals;
    let failed = tx.is_error.as_deref() == Some("1") || tx.receipt_status.as_deref() == Some("0");
    let from = tx.from.clone().unwrap_or_default();
    // EVM addresses are case-insensitive hex.
    let outgoing = from.eq_ignore_ascii_case(ctx.address);

    CanonicalTransaction {
        hash: tx.hash.clone().unwrap_or_default(),
        timestamp: tx
            .time_stamp
            .as_ref()
            .and_then(parse_timestamp_value)
            .unwrap_or(ctx.now),
        from,
        to: tx.to.clone().unwrap_or_default(),
        amount: tx
            .value
            .as_deref()
            .and_then(|raw| format_base_units(raw, decimals, DISPLAY_FRACTION_DIGITS))
            .unwrap_or_else(|| PLACEHOLDER_DASH.to_string()),
        token: ctx.descriptor.ticker.to_string(),
        fee: fee_wei(tx)
            .and_then(|wei| format_base_units(&wei.to_string(), decimals, DISPLAY_FRACTION_DIGITS))
            .unwrap_or_else(|| "0".to_string()),
        tx_type: match (failed, outgoing) {
            (true, _) => TxType::FailedTx,
            (false, true) => TxType::Send,
            (false, false) => TxType::Receive,
        },
        status: TxStatus::from_success(!failed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{descriptor, ChainId, Endpoint};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    const WALLET: &str = "0xAbC0000000000000000000000000000000000001";

    fn ctx() -> NormalizeContext<'static> {
        NormalizeContext::new(
            descriptor(ChainId::Bsc),
            WALLET,
            DateTime::<Utc>::from_timestamp(1_800_000_000, 0).unwrap(),
        )
    }

    fn request_ctx(api_key: Option<&'static str>) -> RequestContext<'static> {
        RequestContext {
            descriptor: descriptor(ChainId::Bsc),
            endpoint: Endpoint {
                base_url: "https://api.bscscan.com/api",
                api_key,
            },
            address: WALLET,
            limit: 25,
        }
    }

    #[test]
    fn build_request_without_key_is_unsupported() {
        // Memastikan tanpa API key langsung ditolak sebelum request dikirim
        match build_request(&request_ctx(None)) {
            Err(AppError::UnsupportedChain(msg)) => assert_eq!(msg, MISSING_KEY_MESSAGE),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn build_request_with_key_sets_query() {
        let ChainRequest::Get { url, .. } = build_request(&request_ctx(Some("KEY"))).unwrap() else {
            panic!("expected GET");
        };
        let query = url.query().unwrap_or_default();
        assert!(query.contains("action=txlist"));
        assert!(query.contains("offset=25"));
        assert!(query.contains("sort=desc"));
        assert!(query.contains("apikey=KEY"));
    }

    #[test]
    fn normalize_txlist_entries() {
        let raw = json!({
            "status": "1",
            "message": "OK",
            "result": [
                {
                    "hash": "0xfeed",
                    "timeStamp": "1700000000",
                    "from": "0xabc0000000000000000000000000000000000001",
                    "to": "0xdef",
                    "value": "1500000000000000000",
                    "gasUsed": "21000",
                    "gasPrice": "5000000000",
                    "isError": "0",
                    "txreceipt_status": "1"
                },
                {
                    "hash": "0xbeef",
                    "timeStamp": "1699999000",
                    "from": "0xdef",
                    "to": WALLET,
                    "value": "250000000000000000",
                    "isError": "0"
                },
                {
                    "hash": "0xdead",
                    "from": WALLET,
                    "value": "1",
                    "isError": "1"
                }
            ]
        });
        let txs = normalize(&raw, &ctx()).unwrap();
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].tx_type, TxType::Send);
        assert_eq!(txs[0].amount, "1.500000");
        assert_eq!(txs[0].fee, "0.000105");
        assert_eq!(txs[0].token, "BNB");
        assert_eq!(txs[0].timestamp, DateTime::from_timestamp(1_700_000_000, 0).unwrap());

        assert_eq!(txs[1].tx_type, TxType::Receive);
        assert_eq!(txs[1].amount, "0.250000");
        assert_eq!(txs[1].fee, "0");

        assert_eq!(txs[2].tx_type, TxType::FailedTx);
        assert_eq!(txs[2].status, TxStatus::Failed);
    }

    #[test]
    fn normalize_distinguishes_empty_from_error() {
        // Memastikan "No transactions found" dibedakan dari error API key
        let empty = json!({"status": "0", "message": "No transactions found", "result": []});
        assert!(matches!(normalize(&empty, &ctx()), Err(AppError::EmptyResult(_))));

        let bad_key = json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"});
        match normalize(&bad_key, &ctx()) {
            Err(AppError::Upstream(msg)) => assert_eq!(msg, "BscScan: Invalid API Key"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
