pub mod bscscan;
pub mod cosmos_lcd;
pub mod http;
pub mod solana_rpc;
pub mod subscan;

pub use http::{HttpTransport, ReqwestTransport};
