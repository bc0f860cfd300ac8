use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};

/// An outbound call to one explorer, fully described before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainRequest {
    Get {
        source: &'static str,
        url: Url,
    },
    PostJson {
        source: &'static str,
        url: Url,
        body: Value,
        headers: Vec<(&'static str, String)>,
    },
}

impl ChainRequest {
    /// Human label of the upstream, used as a prefix in error messages.
    pub fn source(&self) -> &'static str {
        match self {
            ChainRequest::Get { source, .. } | ChainRequest::PostJson { source, .. } => source,
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            ChainRequest::Get { url, .. } | ChainRequest::PostJson { url, .. } => url,
        }
    }
}

#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the decoded JSON body.
    ///
    /// Transport failures map to `AppError::Network`; non-2xx answers and
    /// undecodable bodies map to `AppError::Upstream`.
    async fn execute(&self, request: ChainRequest) -> Result<Value>;
}

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the shared client. `timeout_secs = None` leaves requests unbounded.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client init failed: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ChainRequest) -> Result<Value> {
        let source = request.source();
        tracing::debug!("{} request -> {}", source, request.url());

        let builder = match request {
            ChainRequest::Get { url, .. } => self.client.get(url),
            ChainRequest::PostJson {
                url, body, headers, ..
            } => {
                let mut req = self.client.post(url).json(&body);
                for (name, value) in headers {
                    req = req.header(name, value);
                }
                req
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Network(format!("{} request failed: {}", source, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("{} response read failed: {}", source, e)))?;
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let detail = parsed
                .ok()
                .as_ref()
                .and_then(extract_error_message)
                .unwrap_or_else(|| compact_error_message(&text));
            tracing::warn!("{} returned {}: {}", source, status, detail);
            return Err(AppError::Upstream(upstream_status_message(
                source,
                status.as_u16(),
                &detail,
            )));
        }

        parsed.map_err(|e| AppError::Upstream(format!("{} returned malformed JSON: {}", source, e)))
    }
}

// Internal helper that supports `compact_error_message` operations.
fn compact_error_message(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn upstream_status_message(source: &str, status: u16, detail: &str) -> String {
    let reason = match status {
        429 => "Too Many Requests",
        _ => "",
    };
    match (detail.is_empty(), reason.is_empty()) {
        (true, true) => format!("{} returned HTTP {}", source, status),
        (true, false) => format!("{} returned HTTP {} ({})", source, status, reason),
        (false, true) => format!("{} returned HTTP {}: {}", source, status, detail),
        (false, false) => format!("{} returned HTTP {} ({}): {}", source, status, reason, detail),
    }
}

/// Pull a human-readable error out of the common error body shapes:
/// `{"message": ..}`, `{"error": ".."}`, `{"error": {"message": ..}}`.
pub fn extract_error_message(body: &Value) -> Option<String> {
    let candidates = [
        body.get("message"),
        body.get("error").filter(|v| v.is_string()),
        body.get("error").and_then(|e| e.get("message")),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned-response transport that records every request it sees.
    pub struct MockTransport {
        response: Mutex<Option<Result<Value>>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<ChainRequest>>,
    }

    impl MockTransport {
        pub fn returning(body: Value) -> Self {
            Self::with_result(Ok(body))
        }

        pub fn failing(err: AppError) -> Self {
            Self::with_result(Err(err))
        }

        fn with_result(result: Result<Value>) -> Self {
            Self {
                response: Mutex::new(Some(result)),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<ChainRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for MockTransport {
        async fn execute(&self, request: ChainRequest) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(AppError::Internal("mock already used".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_error_message_reads_common_shapes() {
        // Memastikan pesan error diambil dari beberapa bentuk body
        assert_eq!(
            extract_error_message(&json!({"message": "API rate limit exceeded"})).as_deref(),
            Some("API rate limit exceeded")
        );
        assert_eq!(
            extract_error_message(&json!({"error": {"code": -32602, "message": "Invalid param"}}))
                .as_deref(),
            Some("Invalid param")
        );
        assert_eq!(
            extract_error_message(&json!({"error": "bad address"})).as_deref(),
            Some("bad address")
        );
        assert_eq!(extract_error_message(&json!({"message": "  "})), None);
        assert_eq!(extract_error_message(&json!({"data": []})), None);
    }

    #[test]
    fn upstream_status_message_marks_rate_limit() {
        let msg = upstream_status_message("Subscan", 429, "");
        assert_eq!(msg, "Subscan returned HTTP 429 (Too Many Requests)");
        assert!(AppError::Upstream(msg).is_rate_limited());
    }

    #[test]
    fn upstream_status_message_includes_detail() {
        assert_eq!(
            upstream_status_message("Cosmos LCD", 400, "invalid address"),
            "Cosmos LCD returned HTTP 400: invalid address"
        );
        assert_eq!(
            upstream_status_message("Cosmos LCD", 503, ""),
            "Cosmos LCD returned HTTP 503"
        );
    }

    #[test]
    fn chain_request_exposes_source_and_url() {
        let url = Url::parse("https://example.test/rpc").unwrap();
        let request = ChainRequest::PostJson {
            source: "Solana RPC",
            url: url.clone(),
            body: json!({}),
            headers: Vec::new(),
        };
        assert_eq!(request.source(), "Solana RPC");
        assert_eq!(request.url(), &url);
    }
}
