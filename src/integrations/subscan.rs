//! Subscan transfer indexer (Polkadot).

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::{
    chains::{NormalizeContext, RequestContext},
    constants::{DISPLAY_FRACTION_DIGITS, PLACEHOLDER_DASH},
    error::{AppError, Result},
    integrations::http::ChainRequest,
    models::{CanonicalTransaction, TxStatus, TxType},
    utils::{format_base_units, parse_timestamp_value, value_to_string},
};

const SOURCE: &str = "Subscan";
const TRANSFERS_PATH: &str = "/api/v2/scan/transfers";

#[derive(Debug, Default, Deserialize)]
struct SubscanEnvelope {
    code: Option<i64>,
    message: Option<String>,
    data: Option<SubscanData>,
    // Some mirrors and fixtures return the list at the top level.
    transfers: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct SubscanData {
    transfers: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct SubscanTransfer {
    hash: Option<String>,
    block_timestamp: Option<Value>,
    from: Option<String>,
    to: Option<String>,
    amount: Option<Value>,
    fee: Option<Value>,
    success: Option<bool>,
}

/// POST `{base}/api/v2/scan/transfers` with `{address, row, page: 0}`.
pub fn build_request(ctx: &RequestContext<'_>) -> Result<ChainRequest> {
    let url = Url::parse(&format!(
        "{}{}",
        ctx.endpoint.base_url.trim_end_matches('/'),
        TRANSFERS_PATH
    ))
    .map_err(|e| {
        AppError::Internal(format!("Invalid {} Subscan URL: {}", ctx.descriptor.name, e))
    })?;

    let mut headers = Vec::new();
    if let Some(key) = ctx.endpoint.api_key {
        headers.push(("X-API-Key", key.to_string()));
    }

    Ok(ChainRequest::PostJson {
        source: SOURCE,
        url,
        body: serde_json::json!({
            "address": ctx.address,
            "row": ctx.limit,
            "page": 0,
        }),
        headers,
    })
}

pub fn normalize(raw: &Value, ctx: &NormalizeContext<'_>) -> Result<Vec<CanonicalTransaction>> {
    let envelope = SubscanEnvelope::deserialize(raw).map_err(|e| {
        AppError::Upstream(format!("{} returned an unexpected response: {}", SOURCE, e))
    })?;

    let transfers = match envelope
        .data
        .and_then(|d| d.transfers)
        .or(envelope.transfers)
    {
        Some(list) if !list.is_empty() => list,
        Some(_) => return Err(empty_result()),
        None => {
            if let (Some(message), true) = (envelope.message, envelope.code.unwrap_or(0) != 0) {
                return Err(AppError::Upstream(format!("{}: {}", SOURCE, message)));
            }
            return Err(empty_result());
        }
    };

    // A malformed entry degrades to placeholders instead of failing the page.
    Ok(transfers
        .iter()
        .map(|item| SubscanTransfer::deserialize(item).unwrap_or_default())
        .map(|t| normalize_transfer(&t, ctx))
        .collect())
}

fn empty_result() -> AppError {
    AppError::EmptyResult(
        "No transfer data returned. The address may have no transfers, or Subscan rate-limited you (wait ~10s and retry)."
            .to_string(),
    )
}

// Internal helper that supports `normalize_transfer` operations.
fn normalize_transfer(t: &SubscanTransfer, ctx: &NormalizeContext<'_>) -> CanonicalTransaction {
    let decimals = ctx.descriptor.decimals;
    let from = t.from.clone().unwrap_or_default();
    let amount = t
        .amount
        .as_ref()
        .and_then(value_to_string)
        .and_then(|raw| format_base_units(&raw, decimals, DISPLAY_FRACTION_DIGITS))
        .unwrap_or_else(|| PLACEHOLDER_DASH.to_string());
    let fee = t
        .fee
        .as_ref()
        .and_then(value_to_string)
        .and_then(|raw| format_base_units(&raw, decimals, DISPLAY_FRACTION_DIGITS))
        .unwrap_or_else(|| "0".to_string());

    CanonicalTransaction {
        hash: t.hash.clone().unwrap_or_default(),
        timestamp: t
            .block_timestamp
            .as_ref()
            .and_then(parse_timestamp_value)
            .unwrap_or(ctx.now),
        tx_type: if from == ctx.address {
            TxType::Send
        } else {
            TxType::Receive
        },
        from,
        to: t.to.clone().unwrap_or_default(),
        amount,
        token: ctx.descriptor.ticker.to_string(),
        fee,
        status: TxStatus::from_success(t.success.unwrap_or(false)),
    }
}
