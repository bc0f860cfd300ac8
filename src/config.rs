use std::env;

use crate::constants::{
    DEFAULT_BSCSCAN_API_URL, DEFAULT_COSMOS_LCD_URL, DEFAULT_OSMOSIS_LCD_URL, DEFAULT_PAGE_LIMIT,
    DEFAULT_SOLANA_RPC_URL, DEFAULT_SUBSCAN_API_URL, MAX_PAGE_LIMIT,
};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Upstream explorers
    pub subscan_api_url: String,
    pub subscan_api_key: Option<String>,
    pub osmosis_lcd_url: String,
    pub cosmos_lcd_url: String,
    pub solana_rpc_url: String,
    pub bscscan_api_url: String,
    pub bscscan_api_key: Option<String>,
    pub ronin_api_key: Option<String>,

    // Fetching
    pub tx_page_limit: u32,
    pub http_timeout_secs: Option<u64>,

    // CORS
    pub cors_allowed_origins: String,
}

// Treat blank env values the same as unset ones.
fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            subscan_api_url: env::var("SUBSCAN_API_URL")
                .unwrap_or_else(|_| DEFAULT_SUBSCAN_API_URL.to_string()),
            subscan_api_key: non_empty_env("SUBSCAN_API_KEY"),
            osmosis_lcd_url: env::var("OSMOSIS_LCD_URL")
                .unwrap_or_else(|_| DEFAULT_OSMOSIS_LCD_URL.to_string()),
            cosmos_lcd_url: env::var("COSMOS_LCD_URL")
                .unwrap_or_else(|_| DEFAULT_COSMOS_LCD_URL.to_string()),
            solana_rpc_url: env::var("SOLANA_RPC_URL")
                .unwrap_or_else(|_| DEFAULT_SOLANA_RPC_URL.to_string()),
            bscscan_api_url: env::var("BSCSCAN_API_URL")
                .unwrap_or_else(|_| DEFAULT_BSCSCAN_API_URL.to_string()),
            bscscan_api_key: non_empty_env("BSCSCAN_API_KEY"),
            ronin_api_key: non_empty_env("RONIN_API_KEY"),

            tx_page_limit: env::var("TX_PAGE_LIMIT")
                .unwrap_or_else(|_| DEFAULT_PAGE_LIMIT.to_string())
                .parse()?,
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let upstreams = [
            ("SUBSCAN_API_URL", &self.subscan_api_url),
            ("OSMOSIS_LCD_URL", &self.osmosis_lcd_url),
            ("COSMOS_LCD_URL", &self.cosmos_lcd_url),
            ("SOLANA_RPC_URL", &self.solana_rpc_url),
            ("BSCSCAN_API_URL", &self.bscscan_api_url),
        ];
        for (name, value) in upstreams {
            if value.trim().is_empty() {
                anyhow::bail!("{} is empty", name);
            }
            if let Err(e) = url::Url::parse(value.trim()) {
                anyhow::bail!("{} is not a valid URL: {}", name, e);
            }
        }

        if self.tx_page_limit == 0 || self.tx_page_limit > MAX_PAGE_LIMIT {
            tracing::warn!(
                "TX_PAGE_LIMIT={} is outside 1..={}; it will be clamped",
                self.tx_page_limit,
                MAX_PAGE_LIMIT
            );
        }

        if self.bscscan_api_key.is_none() {
            tracing::warn!("BSCSCAN_API_KEY not set; BSC history will be reported as unsupported");
        }
        if self.ronin_api_key.is_some() {
            tracing::warn!("RONIN_API_KEY is set but Ronin has no supported history endpoint");
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "development".to_string(),
        subscan_api_url: "https://subscan.test".to_string(),
        subscan_api_key: None,
        osmosis_lcd_url: "https://osmosis.test".to_string(),
        cosmos_lcd_url: "https://cosmos.test/cosmos".to_string(),
        solana_rpc_url: "https://solana.test".to_string(),
        bscscan_api_url: "https://bscscan.test/api".to_string(),
        bscscan_api_key: None,
        ronin_api_key: None,
        tx_page_limit: 25,
        http_timeout_secs: None,
        cors_allowed_origins: "*".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_default_like_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_malformed_upstream_url() {
        // Memastikan URL upstream yang rusak ditolak saat startup
        let mut config = test_config();
        config.solana_rpc_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SOLANA_RPC_URL"));
    }

    #[test]
    fn validate_rejects_empty_upstream_url() {
        let mut config = test_config();
        config.subscan_api_url = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
