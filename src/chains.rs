//! Static chain registry. Each supported network maps to one
//! `ChainDescriptor` holding its display metadata, its request builder and
//! its response normalizer; dispatch is a single table lookup.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::Config,
    constants::{BSC_DECIMALS, COSMOS_DECIMALS, POLKADOT_DECIMALS, SOLANA_DECIMALS},
    error::{AppError, Result},
    integrations::{bscscan, cosmos_lcd, http::ChainRequest, solana_rpc, subscan},
    models::CanonicalTransaction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Polkadot,
    Osmosis,
    Cosmos,
    Solana,
    Ronin,
    Bsc,
}

impl ChainId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::Polkadot => "polkadot",
            ChainId::Osmosis => "osmosis",
            ChainId::Cosmos => "cosmos",
            ChainId::Solana => "solana",
            ChainId::Ronin => "ronin",
            ChainId::Bsc => "bsc",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        REGISTRY
            .iter()
            .map(|d| d.id)
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::NotFound(format!("Unknown chain: {}", wanted)))
    }
}

/// Base URLs and API keys of every upstream, resolved from `Config`.
#[derive(Debug, Clone, Default)]
pub struct ChainEndpoints {
    pub subscan_api_url: String,
    pub subscan_api_key: Option<String>,
    pub osmosis_lcd_url: String,
    pub cosmos_lcd_url: String,
    pub solana_rpc_url: String,
    pub bscscan_api_url: String,
    pub bscscan_api_key: Option<String>,
    pub ronin_api_key: Option<String>,
}

impl From<&Config> for ChainEndpoints {
    fn from(config: &Config) -> Self {
        Self {
            subscan_api_url: config.subscan_api_url.clone(),
            subscan_api_key: config.subscan_api_key.clone(),
            osmosis_lcd_url: config.osmosis_lcd_url.clone(),
            cosmos_lcd_url: config.cosmos_lcd_url.clone(),
            solana_rpc_url: config.solana_rpc_url.clone(),
            bscscan_api_url: config.bscscan_api_url.clone(),
            bscscan_api_key: config.bscscan_api_key.clone(),
            ronin_api_key: config.ronin_api_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub base_url: &'a str,
    pub api_key: Option<&'a str>,
}

/// How a chain's history can be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Free public endpoint.
    Public,
    /// Works only when the operator configures an API key.
    ApiKey,
    /// No usable endpoint at all.
    Unavailable,
}

pub struct RequestContext<'a> {
    pub descriptor: &'a ChainDescriptor,
    pub endpoint: Endpoint<'a>,
    pub address: &'a str,
    pub limit: u32,
}

/// Everything a normalizer may read besides the raw payload. `now` is the
/// timestamp fallback for entries without one.
pub struct NormalizeContext<'a> {
    pub descriptor: &'a ChainDescriptor,
    pub address: &'a str,
    pub now: DateTime<Utc>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(descriptor: &'a ChainDescriptor, address: &'a str, now: DateTime<Utc>) -> Self {
        Self {
            descriptor,
            address,
            now,
        }
    }
}

pub type EndpointSelector = for<'a> fn(&'a ChainEndpoints) -> Endpoint<'a>;
pub type RequestBuilder = fn(&RequestContext<'_>) -> Result<ChainRequest>;
pub type Normalizer = fn(&Value, &NormalizeContext<'_>) -> Result<Vec<CanonicalTransaction>>;

pub struct ChainDescriptor {
    pub id: ChainId,
    pub name: &'static str,
    pub ticker: &'static str,
    pub color: &'static str,
    pub placeholder: &'static str,
    pub note: &'static str,
    pub decimals: u32,
    pub native_denom: Option<&'static str>,
    pub access: Access,
    pub endpoint: EndpointSelector,
    pub build_request: RequestBuilder,
    pub normalize: Normalizer,
}

impl ChainDescriptor {
    /// Whether a fetch for this chain can reach an upstream with the given endpoints.
    pub fn is_enabled(&self, endpoints: &ChainEndpoints) -> bool {
        match self.access {
            Access::Public => true,
            Access::ApiKey => (self.endpoint)(endpoints).api_key.is_some(),
            Access::Unavailable => false,
        }
    }
}

impl fmt::Debug for ChainDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainDescriptor")
            .field("id", &self.id)
            .field("ticker", &self.ticker)
            .field("access", &self.access)
            .finish()
    }
}

const RONIN_MESSAGE: &str = "Ronin has no free public transaction-history endpoint. A paid API key from https://developers.roninchain.com is needed for full results.";

fn subscan_endpoint(e: &ChainEndpoints) -> Endpoint<'_> {
    Endpoint {
        base_url: &e.subscan_api_url,
        api_key: e.subscan_api_key.as_deref(),
    }
}

fn osmosis_endpoint(e: &ChainEndpoints) -> Endpoint<'_> {
    Endpoint {
        base_url: &e.osmosis_lcd_url,
        api_key: None,
    }
}

fn cosmos_endpoint(e: &ChainEndpoints) -> Endpoint<'_> {
    Endpoint {
        base_url: &e.cosmos_lcd_url,
        api_key: None,
    }
}

fn solana_endpoint(e: &ChainEndpoints) -> Endpoint<'_> {
    Endpoint {
        base_url: &e.solana_rpc_url,
        api_key: None,
    }
}

fn bscscan_endpoint(e: &ChainEndpoints) -> Endpoint<'_> {
    Endpoint {
        base_url: &e.bscscan_api_url,
        api_key: e.bscscan_api_key.as_deref(),
    }
}

fn ronin_endpoint(e: &ChainEndpoints) -> Endpoint<'_> {
    Endpoint {
        base_url: "",
        api_key: e.ronin_api_key.as_deref(),
    }
}

fn ronin_request(_: &RequestContext<'_>) -> Result<ChainRequest> {
    Err(AppError::UnsupportedChain(RONIN_MESSAGE.to_string()))
}

fn ronin_normalize(_: &Value, _: &NormalizeContext<'_>) -> Result<Vec<CanonicalTransaction>> {
    Err(AppError::UnsupportedChain(RONIN_MESSAGE.to_string()))
}

pub static REGISTRY: [ChainDescriptor; 6] = [
    ChainDescriptor {
        id: ChainId::Polkadot,
        name: "Polkadot",
        ticker: "DOT",
        color: "#E6007A",
        placeholder: "16ZGN73lCF2uSZuacKS3mpSy3JIez8jNYdckoTuiRzdXMzS1",
        note: "Uses the Subscan transfers API. Paste a real DOT address to test.",
        decimals: POLKADOT_DECIMALS,
        native_denom: None,
        access: Access::Public,
        endpoint: subscan_endpoint,
        build_request: subscan::build_request,
        normalize: subscan::normalize,
    },
    ChainDescriptor {
        id: ChainId::Osmosis,
        name: "Osmosis",
        ticker: "OSMO",
        color: "#8D4FDF",
        placeholder: "osmo1g3525dq4fhqf5rqy2qzdmfwmvyy9w2rkfzpn3x",
        note: "Uses Osmosis LCD REST. Paste a real osmo1... address.",
        decimals: COSMOS_DECIMALS,
        native_denom: Some("uosmo"),
        access: Access::Public,
        endpoint: osmosis_endpoint,
        build_request: cosmos_lcd::build_request,
        normalize: cosmos_lcd::normalize,
    },
    ChainDescriptor {
        id: ChainId::Cosmos,
        name: "Cosmos",
        ticker: "ATOM",
        color: "#414061",
        placeholder: "cosmos1qypqxpq9qprsttsbfaesw4yz2zn0lcw0pfmx5k3",
        note: "Uses Cosmos Directory LCD REST. Paste a real cosmos1... address.",
        decimals: COSMOS_DECIMALS,
        native_denom: Some("uatom"),
        access: Access::Public,
        endpoint: cosmos_endpoint,
        build_request: cosmos_lcd::build_request,
        normalize: cosmos_lcd::normalize,
    },
    ChainDescriptor {
        id: ChainId::Solana,
        name: "Solana",
        ticker: "SOL",
        color: "#9945FF",
        placeholder: "5K4wRHBqaNuNKv3RKoAgCaA6kSWsBwb9EMZpFAtVvaBE",
        note: "Uses Solana mainnet RPC. Paste a real Solana wallet address.",
        decimals: SOLANA_DECIMALS,
        native_denom: None,
        access: Access::Public,
        endpoint: solana_endpoint,
        build_request: solana_rpc::build_request,
        normalize: solana_rpc::normalize,
    },
    ChainDescriptor {
        id: ChainId::Ronin,
        name: "Ronin",
        ticker: "RON",
        color: "#1A9FFF",
        placeholder: "0x1234...  (limited, see note)",
        note: "Ronin has no free public tx-history API. A paid key from roninchain.com is needed for full results.",
        decimals: BSC_DECIMALS,
        native_denom: None,
        access: Access::Unavailable,
        endpoint: ronin_endpoint,
        build_request: ronin_request,
        normalize: ronin_normalize,
    },
    ChainDescriptor {
        id: ChainId::Bsc,
        name: "BSC",
        ticker: "BNB",
        color: "#F3BA2F",
        placeholder: "0x1234...  (limited, see note)",
        note: "The BscScan API requires your own key. Get one free at bscscan.com/apis and set BSCSCAN_API_KEY.",
        decimals: BSC_DECIMALS,
        native_denom: None,
        access: Access::ApiKey,
        endpoint: bscscan_endpoint,
        build_request: bscscan::build_request,
        normalize: bscscan::normalize,
    },
];

pub fn all() -> &'static [ChainDescriptor] {
    &REGISTRY
}

pub fn descriptor(id: ChainId) -> &'static ChainDescriptor {
    let index = match id {
        ChainId::Polkadot => 0,
        ChainId::Osmosis => 1,
        ChainId::Cosmos => 2,
        ChainId::Solana => 3,
        ChainId::Ronin => 4,
        ChainId::Bsc => 5,
    };
    &REGISTRY[index]
}
