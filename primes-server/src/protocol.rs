//! Wire format: one JSON object per line in each direction.

use crate::source::PrimeSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Methods a client may call, in the order `ListMethods` reports them.
pub const METHODS: [&str; 3] = ["ListMethods", "Sieve", "Stats"];

/// A client request, tagged by its `method` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    /// Every prime `<= hi`. A missing `hi` reads as 0.
    Sieve {
        /// Inclusive upper bound.
        #[serde(default)]
        hi: i64,
    },
    /// Backend counters.
    Stats,
    /// Names of the callable methods.
    ListMethods,
}

/// A server reply. Exactly one of the shapes below is sent per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// `{"p":[...]}`, the answer to `Sieve`.
    Primes {
        /// Every prime `<= hi`, ascending.
        p: Vec<u64>,
    },
    /// `{"metrics":{...}}`, the answer to `Stats`.
    Metrics {
        /// Backend counters keyed by name.
        metrics: BTreeMap<String, f64>,
    },
    /// `{"methods":[...]}`, the answer to `ListMethods`.
    Methods {
        /// Callable method names.
        methods: Vec<String>,
    },
    /// `{"error":"..."}` for malformed requests and failed computations.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

impl Response {
    /// Builds an error reply.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    /// Returns `true` for error replies.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

/// Answer a parsed request.
pub fn dispatch(source: &dyn PrimeSource, request: Request) -> Response {
    match request {
        Request::Sieve { hi } => match source.compute(hi) {
            Ok(p) => {
                debug!("Sieve(hi={hi}) -> {} primes", p.len());
                Response::Primes { p }
            }
            Err(e) => {
                warn!("Sieve(hi={hi}) failed: {e}");
                Response::error(e.to_string())
            }
        },
        Request::Stats => Response::Metrics {
            metrics: source.stats(),
        },
        Request::ListMethods => Response::Methods {
            methods: METHODS.iter().map(|m| m.to_string()).collect(),
        },
    }
}

/// Parse one request line and answer it. Malformed input yields an error
/// response rather than a failure.
pub fn handle_line(source: &dyn PrimeSource, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(source, request),
        Err(e) => {
            debug!("Rejected malformed request: {e}");
            Response::error(format!("malformed request: {e}"))
        }
    }
}
