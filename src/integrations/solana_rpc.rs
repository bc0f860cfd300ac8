//! Solana JSON-RPC signature listing. Only signatures are available, so
//! amounts and counterparties are placeholders.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::{
    chains::{NormalizeContext, RequestContext},
    constants::PLACEHOLDER_DASH,
    error::{AppError, Result},
    integrations::http::{extract_error_message, ChainRequest},
    models::{CanonicalTransaction, TxStatus, TxType},
    utils::{format_base_units, timestamp_from_epoch, value_to_string},
};

const SOURCE: &str = "Solana RPC";
const SIGNATURES_METHOD: &str = "getSignaturesForAddress";

fn rpc_request(method: &str, params: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    })
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureInfo {
    signature: Option<String>,
    block_time: Option<i64>,
    err: Option<Value>,
    fee: Option<Value>,
}

pub fn build_request(ctx: &RequestContext<'_>) -> Result<ChainRequest> {
    let url = Url::parse(ctx.endpoint.base_url.trim())
        .map_err(|e| AppError::Internal(format!("Invalid Solana RPC URL: {}", e)))?;

    Ok(ChainRequest::PostJson {
        source: SOURCE,
        url,
        body: rpc_request(
            SIGNATURES_METHOD,
            serde_json::json!([ctx.address, { "limit": ctx.limit }]),
        ),
        headers: Vec::new(),
    })
}

pub fn normalize(raw: &Value, ctx: &NormalizeContext<'_>) -> Result<Vec<CanonicalTransaction>> {
    let response = RpcResponse::deserialize(raw).map_err(|e| {
        AppError::Upstream(format!("{} returned an unexpected response: {}", SOURCE, e))
    })?;

    if let Some(error) = response.error.filter(|e| !e.is_null()) {
        let message = extract_error_message(&serde_json::json!({ "error": error }))
            .unwrap_or_else(|| error.to_string());
        return Err(AppError::Upstream(format!("Solana RPC error: {}", message)));
    }

    let entries: Vec<SignatureInfo> = match response.result {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| SignatureInfo::deserialize(item).unwrap_or_default())
            .collect(),
        _ => {
            return Err(AppError::EmptyResult(
                "No transactions found. The address may have no activity or be invalid."
                    .to_string(),
            ))
        }
    };

    Ok(entries.iter().map(|sig| normalize_signature(sig, ctx)).collect())
}

// Internal helper that supports `normalize_signature` operations.
fn normalize_signature(sig: &SignatureInfo, ctx: &NormalizeContext<'_>) -> CanonicalTransaction {
    let failed = sig.err.as_ref().is_some_and(|e| !e.is_null());
    let decimals = ctx.descriptor.decimals;

    CanonicalTransaction {
        hash: sig.signature.clone().unwrap_or_default(),
        timestamp: sig
            .block_time
            .and_then(timestamp_from_epoch)
            .unwrap_or(ctx.now),
        from: ctx.address.to_string(),
        to: PLACEHOLDER_DASH.to_string(),
        amount: PLACEHOLDER_DASH.to_string(),
        token: ctx.descriptor.ticker.to_string(),
        fee: sig
            .fee
            .as_ref()
            .and_then(value_to_string)
            .and_then(|raw| format_base_units(&raw, decimals, decimals))
            .unwrap_or_else(|| "0".to_string()),
        tx_type: if failed {
            TxType::FailedTx
        } else {
            TxType::Transfer
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

    const WALLET: &str = "5K4wRHBqaNuNKv3RKoAgCaA6kSWsBwb9EMZpFAtVvaBE";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_800_000_000, 0).unwrap()
    }

    fn ctx() -> NormalizeContext<'static> {
        NormalizeContext::new(descriptor(ChainId::Solana), WALLET, now())
    }

    #[test]
    fn signatures_become_placeholder_records() {
        // Memastikan setiap signature menjadi satu record dengan placeholder
        let raw = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": [
                {"signature": "sig1", "slot": 1, "err": null, "memo": null, "blockTime": 1_700_000_000},
                {"signature": "sig2", "slot": 2, "err": {"InstructionError": [0, "Custom"]}, "blockTime": null, "fee": 5000}
            ]
        });
        let txs = normalize(&raw, &ctx()).unwrap();
        assert_eq!(txs.len(), 2);

        assert_eq!(txs[0].hash, "sig1");
        assert_eq!(txs[0].tx_type, TxType::Transfer);
        assert_eq!(txs[0].status, TxStatus::Success);
        assert_eq!(txs[0].amount, PLACEHOLDER_DASH);
        assert_eq!(txs[0].to, PLACEHOLDER_DASH);
        assert_eq!(txs[0].from, WALLET);
        assert_eq!(txs[0].fee, "0");
        assert_eq!(txs[0].timestamp, DateTime::from_timestamp(1_700_000_000, 0).unwrap());

        assert_eq!(txs[1].tx_type, TxType::FailedTx);
        assert_eq!(txs[1].status, TxStatus::Failed);
        assert_eq!(txs[1].fee, "0.000005000");
        assert_eq!(txs[1].timestamp, now());
    }

    #[test]
    fn rpc_error_is_upstream() {
        // Memastikan error JSON-RPC diteruskan sebagai Upstream
        let raw = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "Invalid param: WrongSize"}});
        match normalize(&raw, &ctx()) {
            Err(AppError::Upstream(msg)) => {
                assert_eq!(msg, "Solana RPC error: Invalid param: WrongSize")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_or_missing_result_is_empty_result() {
        for raw in [json!({"result": []}), json!({"result": null}), json!({})] {
            assert!(matches!(normalize(&raw, &ctx()), Err(AppError::EmptyResult(_))));
        }
    }

    #[test]
    fn build_request_uses_jsonrpc_envelope() {
        let request_ctx = RequestContext {
            descriptor: descriptor(ChainId::Solana),
            endpoint: Endpoint {
                base_url: "https://api.mainnet-beta.solana.com",
                api_key: None,
            },
            address: WALLET,
            limit: 25,
        };
        let ChainRequest::PostJson { body, .. } = build_request(&request_ctx).unwrap() else {
            panic!("expected POST");
        };
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getSignaturesForAddress",
                "params": [WALLET, {"limit": 25}]
            })
        );
    }
}
