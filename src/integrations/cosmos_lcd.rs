//! Cosmos-SDK LCD REST (`/cosmos/tx/v1beta1/txs`), shared by Osmosis and the Cosmos Hub.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use url::Url;

use crate::{
    chains::{NormalizeContext, RequestContext},
    constants::DISPLAY_FRACTION_DIGITS,
    error::{AppError, Result},
    integrations::http::ChainRequest,
    models::{CanonicalTransaction, TxStatus, TxType},
    utils::{format_base_units, parse_timestamp_value, value_to_string, zero_amount},
};

const SOURCE: &str = "Cosmos LCD";
const TXS_PATH: &str = "/cosmos/tx/v1beta1/txs";

// Denominations whose ticker is known regardless of the queried chain.
const KNOWN_DENOMS: &[(&str, &str)] = &[("uatom", "ATOM"), ("uosmo", "OSMO"), ("uion", "ION")];

#[derive(Debug, Default, Deserialize)]
struct LcdTxsResponse {
    txs: Option<Vec<Value>>,
    tx_responses: Option<Vec<Value>>,
    // Error bodies: {"code": 3, "message": "..."}
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LcdTx {
    body: Option<LcdBody>,
    auth_info: Option<LcdAuthInfo>,
    txhash: Option<String>,
    code: Option<i64>,
    timestamp: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct LcdTxResponse {
    txhash: Option<String>,
    code: Option<i64>,
    timestamp: Option<Value>,
    tx: Option<LcdTx>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LcdBody {
    messages: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LcdAuthInfo {
    fee: Option<LcdFee>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LcdFee {
    amount: Option<Vec<Value>>,
}

/// One transaction with body and result metadata merged from both lists.
#[derive(Debug, Default)]
struct MergedTx<'a> {
    hash: Option<&'a str>,
    code: Option<i64>,
    timestamp: Option<&'a Value>,
    first_message: Option<&'a Value>,
    fee_coin: Option<&'a Value>,
}

/// Result of classifying the first message of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageSummary {
    tx_type: TxType,
    from: String,
    to: String,
    amount: String,
    token: String,
}

/// GET `{lcd}/cosmos/tx/v1beta1/txs` filtered on `tx.signer`, newest first.
pub fn build_request(ctx: &RequestContext<'_>) -> Result<ChainRequest> {
    let mut url = Url::parse(&format!(
        "{}{}",
        ctx.endpoint.base_url.trim_end_matches('/'),
        TXS_PATH
    ))
    .map_err(|e| AppError::Internal(format!("Invalid {} LCD URL: {}", ctx.descriptor.name, e)))?;

    url.query_pairs_mut()
        .append_pair("query", &format!("tx.signer='{}'", ctx.address))
        .append_pair("limit", &ctx.limit.to_string())
        .append_pair("order_by", "ORDER_BY_DESC");

    Ok(ChainRequest::Get {
        source: SOURCE,
        url,
    })
}

pub fn normalize(raw: &Value, ctx: &NormalizeContext<'_>) -> Result<Vec<CanonicalTransaction>> {
    let response = LcdTxsResponse::deserialize(raw).map_err(|e| {
        AppError::Upstream(format!("{} returned an unexpected response: {}", SOURCE, e))
    })?;

    // Entries are decoded one by one so a malformed item degrades to placeholders.
    let txs: Vec<LcdTx> = decode_entries(response.txs.as_deref());
    let tx_responses: Vec<LcdTxResponse> = decode_entries(response.tx_responses.as_deref());
    let count = txs.len().max(tx_responses.len());

    if count == 0 {
        let has_list = response.txs.is_some() || response.tx_responses.is_some();
        if let (Some(message), false) = (response.message.as_ref(), has_list) {
            if response.code.unwrap_or(0) != 0 || !message.trim().is_empty() {
                return Err(AppError::Upstream(format!("{}: {}", SOURCE, message)));
            }
        }
        return Err(AppError::EmptyResult(
            "No transactions found. Try a different address with activity on this chain."
                .to_string(),
        ));
    }

    Ok((0..count)
        .map(|i| merge_tx(txs.get(i), tx_responses.get(i)))
        .map(|merged| normalize_tx(&merged, ctx))
        .collect())
}

fn decode_entries<T: DeserializeOwned + Default>(items: Option<&[Value]>) -> Vec<T> {
    items
        .unwrap_or_default()
        .iter()
        .map(|item| T::deserialize(item).unwrap_or_default())
        .collect()
}

// Internal helper that supports `merge_tx` operations.
fn merge_tx<'a>(tx: Option<&'a LcdTx>, response: Option<&'a LcdTxResponse>) -> MergedTx<'a> {
    let tx = tx.or_else(|| response.and_then(|r| r.tx.as_ref()));
    MergedTx {
        hash: response
            .and_then(|r| r.txhash.as_deref())
            .or_else(|| tx.and_then(|t| t.txhash.as_deref())),
        code: response
            .and_then(|r| r.code)
            .or_else(|| tx.and_then(|t| t.code)),
        timestamp: response
            .and_then(|r| r.timestamp.as_ref())
            .or_else(|| tx.and_then(|t| t.timestamp.as_ref())),
        first_message: tx
            .and_then(|t| t.body.as_ref())
            .and_then(|b| b.messages.as_ref())
            .and_then(|m| m.first()),
        fee_coin: tx
            .and_then(|t| t.auth_info.as_ref())
            .and_then(|a| a.fee.as_ref())
            .and_then(|f| f.amount.as_ref())
            .and_then(|coins| coins.first()),
    }
}

fn normalize_tx(merged: &MergedTx<'_>, ctx: &NormalizeContext<'_>) -> CanonicalTransaction {
    let summary = match merged.first_message {
        Some(msg) => classify_message(msg, ctx),
        None => fallback_summary(ctx),
    };
    let fee = merged
        .fee_coin
        .and_then(|coin| coin.get("amount"))
        .and_then(value_to_string)
        .and_then(|raw| scale(&raw, ctx))
        .unwrap_or_else(|| "0".to_string());

    CanonicalTransaction {
        hash: merged.hash.unwrap_or_default().to_string(),
        timestamp: merged
            .timestamp
            .and_then(parse_timestamp_value)
            .unwrap_or(ctx.now),
        from: summary.from,
        to: summary.to,
        amount: summary.amount,
        token: summary.token,
        fee,
        tx_type: summary.tx_type,
        status: TxStatus::from_success(merged.code.unwrap_or(0) == 0),
    }
}

fn fallback_summary(ctx: &NormalizeContext<'_>) -> MessageSummary {
    MessageSummary {
        tx_type: TxType::Transfer,
        from: ctx.address.to_string(),
        to: String::new(),
        amount: zero_amount(DISPLAY_FRACTION_DIGITS),
        token: ctx.descriptor.ticker.to_string(),
    }
}

/// Classify by substring of the message's `@type`. Only the first message
/// of a transaction is inspected.
fn classify_message(msg: &Value, ctx: &NormalizeContext<'_>) -> MessageSummary {
    let msg_type = str_field(msg, "@type").unwrap_or_default();
    let mut summary = fallback_summary(ctx);

    if msg_type.contains("MsgSend") {
        summary.from = str_field(msg, "from_address")
            .or_else(|| str_field(msg, "sender"))
            .unwrap_or(ctx.address)
            .to_string();
        summary.to = str_field(msg, "to_address")
            .or_else(|| str_field(msg, "receiver"))
            .unwrap_or_default()
            .to_string();
        let first_coin = msg
            .get("amount")
            .and_then(|v| v.as_array())
            .and_then(|coins| coins.first());
        if let Some(coin) = first_coin {
            apply_coin(&mut summary, coin, ctx);
        }
        summary.tx_type = if summary.from == ctx.address {
            TxType::Send
        } else {
            TxType::Receive
        };
    } else if msg_type.contains("MsgDelegate") {
        summary.tx_type = TxType::Delegate;
        if let Some(coin) = msg.get("amount") {
            apply_coin(&mut summary, coin, ctx);
        }
    } else if msg_type.contains("MsgUndelegate") {
        summary.tx_type = TxType::Undelegate;
        if let Some(coin) = msg.get("amount") {
            apply_coin(&mut summary, coin, ctx);
        }
    } else if msg_type.contains("MsgWithdraw") {
        summary.tx_type = TxType::ClaimRewards;
    } else if msg_type.contains("Swap") {
        summary.tx_type = TxType::Swap;
    } else if msg_type.contains("IBC") || msg_type.contains("MsgTransfer") {
        summary.tx_type = TxType::IbcTransfer;
        summary.to = str_field(msg, "receiver").unwrap_or_default().to_string();
        if let Some(coin) = msg.get("token") {
            apply_coin(&mut summary, coin, ctx);
        }
    }

    summary
}

// Read `{denom, amount}` into the summary; a malformed coin leaves it untouched.
fn apply_coin(summary: &mut MessageSummary, coin: &Value, ctx: &NormalizeContext<'_>) {
    let Some(amount) = coin
        .get("amount")
        .and_then(value_to_string)
        .and_then(|raw| scale(&raw, ctx))
    else {
        return;
    };
    summary.amount = amount;
    if let Some(denom) = str_field(coin, "denom") {
        summary.token = denom_to_ticker(denom, ctx);
    }
}

fn scale(raw: &str, ctx: &NormalizeContext<'_>) -> Option<String> {
    format_base_units(raw, ctx.descriptor.decimals, DISPLAY_FRACTION_DIGITS)
}

/// Native and well-known denominations become tickers; anything else
/// (e.g. `ibc/27394F...`) is kept verbatim.
fn denom_to_ticker(denom: &str, ctx: &NormalizeContext<'_>) -> String {
    if ctx.descriptor.native_denom == Some(denom) {
        return ctx.descriptor.ticker.to_string();
    }
    KNOWN_DENOMS
        .iter()
        .find(|(known, _)| *known == denom)
        .map(|(_, ticker)| ticker.to_string())
        .unwrap_or_else(|| denom.to_string())
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}
