/// Application constants

pub const API_VERSION: &str = "v1";

// Page size for a single history request
pub const DEFAULT_PAGE_LIMIT: u32 = 25;
pub const MAX_PAGE_LIMIT: u32 = 50;

// Shown where an upstream exposes no value (e.g. signature-only history)
pub const PLACEHOLDER_DASH: &str = "—";

// Base-unit exponents
pub const POLKADOT_DECIMALS: u32 = 10; // planck
pub const COSMOS_DECIMALS: u32 = 6; // uatom / uosmo
pub const SOLANA_DECIMALS: u32 = 9; // lamports
pub const BSC_DECIMALS: u32 = 18; // wei

// Fraction digits used when rendering amounts
pub const DISPLAY_FRACTION_DIGITS: u32 = 6;

// Epoch values at or above this are milliseconds, not seconds
pub const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

// Public endpoints
pub const DEFAULT_SUBSCAN_API_URL: &str = "https://polkadot.api.subscan.io";
pub const DEFAULT_OSMOSIS_LCD_URL: &str = "https://rest.osmosis.interchain.info";
pub const DEFAULT_COSMOS_LCD_URL: &str = "https://rest.cosmos.directory/cosmos";
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_BSCSCAN_API_URL: &str = "https://api.bscscan.com/api";

// CSV export
pub const CSV_FILE_PREFIX: &str = "universal-explorer-awaken";
pub const CSV_ADDRESS_PREFIX_CHARS: usize = 10;
pub const CSV_DESCRIPTION_HASH_CHARS: usize = 12;
